//! Goal status state machine.
//!
//! Status is recomputed from scratch on every pass. `Finished` is not
//! terminal: a correcting negative entry that drops the amount below target
//! re-opens the goal (or fails it, past the deadline). This keeps the stored
//! status in step with the live ledger.

use chrono::NaiveDate;

use super::goals_model::{Goal, GoalStatus};

/// Derives the status a goal should have.
///
/// 1. `current >= target` finishes the goal, whatever the deadline says.
/// 2. Otherwise a deadline strictly before `today` fails it.
/// 3. Otherwise the goal is open: `InProgress` once it has ledger entries or
///    was already in progress, `Pending` before that.
pub fn derive_status(
    current_amount: f64,
    target_amount: f64,
    deadline: NaiveDate,
    today: NaiveDate,
    prior: GoalStatus,
    has_progress: bool,
) -> GoalStatus {
    if current_amount >= target_amount {
        return GoalStatus::Finished;
    }
    if today > deadline {
        return GoalStatus::Failed;
    }
    if has_progress || prior == GoalStatus::InProgress {
        GoalStatus::InProgress
    } else {
        GoalStatus::Pending
    }
}

/// True when an open goal has passed its deadline under target and its stored
/// status has not caught up yet.
pub fn is_expired_open(goal: &Goal, today: NaiveDate) -> bool {
    today > goal.deadline
        && goal.current_amount < goal.target_amount
        && goal.status != GoalStatus::Failed
}

/// Status shown by listings, which do not write. Expired open goals show as
/// `Failed` before `GetGoal` has materialised it.
pub fn display_status(goal: &Goal, today: NaiveDate) -> GoalStatus {
    if is_expired_open(goal, today) {
        GoalStatus::Failed
    } else {
        goal.status
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn deadline() -> NaiveDate {
        date(2024, 6, 30)
    }

    #[test]
    fn reaching_target_finishes_even_after_deadline() {
        let late = date(2024, 8, 1);
        assert_eq!(
            derive_status(500.0, 500.0, deadline(), late, GoalStatus::Failed, true),
            GoalStatus::Finished
        );
        assert_eq!(
            derive_status(650.0, 500.0, deadline(), date(2024, 1, 1), GoalStatus::Pending, true),
            GoalStatus::Finished
        );
    }

    #[test]
    fn past_deadline_under_target_fails() {
        assert_eq!(
            derive_status(40.0, 100.0, deadline(), date(2024, 7, 1), GoalStatus::InProgress, true),
            GoalStatus::Failed
        );
    }

    #[test]
    fn deadline_day_itself_is_still_open() {
        assert_eq!(
            derive_status(40.0, 100.0, deadline(), deadline(), GoalStatus::InProgress, true),
            GoalStatus::InProgress
        );
    }

    #[test]
    fn untouched_goal_stays_pending() {
        assert_eq!(
            derive_status(0.0, 100.0, deadline(), date(2024, 1, 1), GoalStatus::Pending, false),
            GoalStatus::Pending
        );
    }

    #[test]
    fn finished_reopens_when_ledger_drops_below_target() {
        assert_eq!(
            derive_status(0.0, 500.0, deadline(), date(2024, 1, 1), GoalStatus::Finished, true),
            GoalStatus::InProgress
        );
        assert_eq!(
            derive_status(0.0, 500.0, deadline(), date(2024, 9, 1), GoalStatus::Finished, true),
            GoalStatus::Failed
        );
    }

    #[test]
    fn in_progress_is_preserved_without_entries() {
        assert_eq!(
            derive_status(0.0, 100.0, deadline(), date(2024, 1, 1), GoalStatus::InProgress, false),
            GoalStatus::InProgress
        );
    }
}
