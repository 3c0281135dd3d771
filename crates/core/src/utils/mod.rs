pub mod time_utils;

pub use time_utils::{calendar_months_between, Clock, FixedClock, SystemClock};
