use thiserror::Error;

/// Goal-domain failures that callers are expected to handle individually.
#[derive(Error, Debug)]
pub enum GoalError {
    /// Missing, soft-deleted, or owned by another user. The three cases are
    /// reported identically.
    #[error("Goal {0} not found")]
    NotFound(i64),

    #[error("Goal progress {0} not found")]
    ProgressNotFound(i64),

    #[error("A goal named '{0}' already exists")]
    DuplicateName(String),

    /// Reconciliation lost the version race on every attempt. Any ledger
    /// write that triggered it is already saved; re-fetch the goal.
    #[error("Goal {goal_id} was modified concurrently, gave up after {attempts} attempts")]
    ReconciliationConflict { goal_id: i64, attempts: u32 },
}
