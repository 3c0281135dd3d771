//! Goals module - domain models, the progress ledger, status derivation,
//! installment projection and goal reconciliation.

mod goal_progress_service;
mod goals_errors;
mod goals_installments;
mod goals_ledger;
mod goals_model;
mod goals_reconciler;
mod goals_service;
mod goals_status;
mod goals_traits;


pub use goal_progress_service::GoalProgressService;
pub use goals_errors::GoalError;
pub use goals_installments::project_installments;
pub use goals_ledger::{sum_progress, LedgerSummary};
pub use goals_model::{
    Goal, GoalDetails, GoalFilters, GoalProgress, GoalProgressUpdate, GoalSort, GoalSortColumn,
    GoalStatus, GoalUpdate, Installments, NewGoal, NewGoalProgress,
};
pub use goals_reconciler::GoalReconciler;
pub use goals_service::GoalService;
pub use goals_status::{derive_status, display_status, is_expired_open};
pub use goals_traits::{
    GoalProgressRepositoryTrait, GoalProgressServiceTrait, GoalRepositoryTrait, GoalServiceTrait,
};
