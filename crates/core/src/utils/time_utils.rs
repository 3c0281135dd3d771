use std::sync::{Arc, RwLock};

use chrono::{Datelike, NaiveDate, NaiveDateTime, Utc};

/// Source of "now" for status derivation and installment projection.
///
/// Services take an `Arc<dyn Clock>` so tests can pin the date.
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;

    /// The calendar date used when comparing against goal deadlines.
    fn today(&self) -> NaiveDate {
        self.now().date()
    }
}

/// Wall clock in UTC.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Utc::now().naive_utc()
    }
}

/// A clock that returns whatever it was last set to.
#[derive(Debug, Clone)]
pub struct FixedClock {
    now: Arc<RwLock<NaiveDateTime>>,
}

impl FixedClock {
    pub fn new(now: NaiveDateTime) -> Self {
        Self {
            now: Arc::new(RwLock::new(now)),
        }
    }

    /// Pins the clock to midnight of `date`.
    pub fn at_date(date: NaiveDate) -> Self {
        Self::new(date.and_hms_opt(0, 0, 0).unwrap_or_default())
    }

    pub fn set(&self, now: NaiveDateTime) {
        if let Ok(mut guard) = self.now.write() {
            *guard = now;
        }
    }

    pub fn set_date(&self, date: NaiveDate) {
        self.set(date.and_hms_opt(0, 0, 0).unwrap_or_default());
    }
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        match self.now.read() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}

/// Whole calendar months from `from` to `to`, counted on the year and month
/// fields only: `(to.year - from.year) * 12 + (to.month - from.month)`.
/// The day of month is ignored, so Jan 31 -> Feb 1 counts as one month.
pub fn calendar_months_between(from: NaiveDate, to: NaiveDate) -> i32 {
    let year_diff = to.year() - from.year();
    let month_diff = to.month() as i32 - from.month() as i32;
    year_diff * 12 + month_diff
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn months_between_ignores_day_of_month() {
        assert_eq!(calendar_months_between(date(2024, 1, 31), date(2024, 2, 1)), 1);
        assert_eq!(calendar_months_between(date(2024, 1, 1), date(2024, 7, 1)), 6);
        assert_eq!(calendar_months_between(date(2023, 11, 15), date(2025, 2, 1)), 15);
        assert_eq!(calendar_months_between(date(2024, 5, 1), date(2024, 5, 30)), 0);
        assert_eq!(calendar_months_between(date(2024, 5, 1), date(2024, 3, 1)), -2);
    }

    #[test]
    fn fixed_clock_can_be_moved() {
        let clock = FixedClock::at_date(date(2024, 3, 10));
        assert_eq!(clock.today(), date(2024, 3, 10));

        clock.set_date(date(2024, 4, 1));
        assert_eq!(clock.today(), date(2024, 4, 1));
    }
}
