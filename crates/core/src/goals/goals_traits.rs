use async_trait::async_trait;
use chrono::NaiveDate;

use crate::errors::Result;
use crate::goals::goals_model::{
    Goal, GoalDetails, GoalFilters, GoalProgress, GoalProgressUpdate, GoalUpdate, NewGoal,
    NewGoalProgress,
};
use crate::pagination::PageMetadata;
use crate::versioning::VersionedRepositoryTrait;

/// Trait for goal repository operations.
///
/// Reads never return soft-deleted goals or goals of another user; both come
/// back as `GoalError::NotFound`.
pub trait GoalRepositoryTrait: VersionedRepositoryTrait<Goal, NewGoal> {
    fn get_goal(&self, user_id: i64, goal_id: i64) -> Result<Goal>;

    /// A status filter matches the status shown as of `today`: expired open
    /// goals count as `Failed` even before they are materialised.
    fn list_goals(
        &self,
        user_id: i64,
        filters: &GoalFilters,
        today: NaiveDate,
    ) -> Result<(Vec<Goal>, PageMetadata)>;
}

/// Trait for ledger repository operations. A ledger entry has no owner of
/// its own; ownership is checked through its goal.
pub trait GoalProgressRepositoryTrait: VersionedRepositoryTrait<GoalProgress, NewGoalProgress> {
    fn get_progress(&self, user_id: i64, progress_id: i64) -> Result<GoalProgress>;

    /// Live entries of a live goal owned by `user_id`, newest first.
    fn list_by_goal(&self, user_id: i64, goal_id: i64) -> Result<Vec<GoalProgress>>;
}

/// Trait for goal service operations
#[async_trait]
pub trait GoalServiceTrait: Send + Sync {
    async fn create_goal(&self, user_id: i64, new_goal: NewGoal) -> Result<Goal>;

    /// Materialises a pending `Failed` transition before returning.
    async fn get_goal(&self, user_id: i64, goal_id: i64) -> Result<GoalDetails>;

    fn list_goals(
        &self,
        user_id: i64,
        filters: &GoalFilters,
    ) -> Result<(Vec<GoalDetails>, PageMetadata)>;

    async fn update_goal(&self, user_id: i64, update: GoalUpdate) -> Result<Goal>;
    async fn delete_goal(&self, user_id: i64, goal_id: i64) -> Result<()>;
    async fn reconcile_goal(&self, user_id: i64, goal_id: i64) -> Result<Goal>;
}

/// Trait for ledger service operations. Every mutation reconciles the
/// owning goal before returning.
#[async_trait]
pub trait GoalProgressServiceTrait: Send + Sync {
    fn list_progress(&self, user_id: i64, goal_id: i64) -> Result<Vec<GoalProgress>>;
    fn get_progress(&self, user_id: i64, progress_id: i64) -> Result<GoalProgress>;
    async fn record_progress(
        &self,
        user_id: i64,
        new_progress: NewGoalProgress,
    ) -> Result<GoalProgress>;
    async fn update_progress(
        &self,
        user_id: i64,
        update: GoalProgressUpdate,
    ) -> Result<GoalProgress>;
    async fn delete_progress(&self, user_id: i64, progress_id: i64) -> Result<()>;
}
