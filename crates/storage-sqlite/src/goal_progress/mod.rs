//! SQLite storage implementation for goal progress ledger entries.

mod model;
mod repository;

pub use model::{GoalProgressDB, NewGoalProgressDB};
pub use repository::GoalProgressRepository;
