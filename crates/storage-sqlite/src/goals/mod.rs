//! SQLite storage implementation for goals.

mod model;
mod repository;

pub use model::{GoalChangesDB, GoalDB, NewGoalDB};
pub use repository::GoalRepository;
