use chrono::NaiveDate;

use super::goals_model::Installments;
use crate::utils::calendar_months_between;

/// Suggests an even monthly contribution that reaches `target_amount` by
/// `deadline`.
///
/// Empty when the deadline is today or earlier, when fewer than one calendar
/// month remains, or when the target is already met.
pub fn project_installments(
    target_amount: f64,
    current_amount: f64,
    deadline: NaiveDate,
    today: NaiveDate,
) -> Installments {
    if deadline <= today {
        return Installments::empty();
    }

    let period_count = calendar_months_between(today, deadline);
    if period_count <= 0 {
        return Installments::empty();
    }

    let remaining = target_amount - current_amount;
    if remaining <= 0.0 {
        return Installments::empty();
    }

    Installments {
        period_amount: remaining / f64::from(period_count),
        period_count,
    }
}
