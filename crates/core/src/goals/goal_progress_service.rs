use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, error};

use super::goals_model::{GoalProgress, GoalProgressUpdate, NewGoalProgress};
use super::goals_reconciler::GoalReconciler;
use super::goals_traits::{
    GoalProgressRepositoryTrait, GoalProgressServiceTrait, GoalRepositoryTrait,
};
use crate::errors::Result;
use crate::versioning::VersionedRepositoryTrait;

/// Ledger mutations followed by reconciliation of the owning goal.
///
/// The ledger write and the reconciliation are one logical operation but not
/// one transaction: when reconciliation fails the entry stays saved, the
/// error is returned, and the goal's derived fields are stale until the next
/// successful pass.
pub struct GoalProgressService {
    progress_repository: Arc<dyn GoalProgressRepositoryTrait>,
    goal_repository: Arc<dyn GoalRepositoryTrait>,
    reconciler: Arc<GoalReconciler>,
}

impl GoalProgressService {
    pub fn new(
        progress_repository: Arc<dyn GoalProgressRepositoryTrait>,
        goal_repository: Arc<dyn GoalRepositoryTrait>,
        reconciler: Arc<GoalReconciler>,
    ) -> Self {
        GoalProgressService {
            progress_repository,
            goal_repository,
            reconciler,
        }
    }

    async fn reconcile_after(&self, user_id: i64, entry: &GoalProgress, action: &str) -> Result<()> {
        match self.reconciler.reconcile(user_id, entry.goal_id).await {
            Ok(goal) => {
                debug!(
                    "Goal {} reconciled after {} of entry {}: current {}, status {}",
                    goal.id, action, entry.id, goal.current_amount, goal.status
                );
                Ok(())
            }
            Err(err) => {
                error!(
                    "Entry {} was {} but goal {} could not be reconciled: {}",
                    entry.id, action, entry.goal_id, err
                );
                Err(err)
            }
        }
    }
}

#[async_trait]
impl GoalProgressServiceTrait for GoalProgressService {
    fn list_progress(&self, user_id: i64, goal_id: i64) -> Result<Vec<GoalProgress>> {
        self.goal_repository.get_goal(user_id, goal_id)?;
        self.progress_repository.list_by_goal(user_id, goal_id)
    }

    fn get_progress(&self, user_id: i64, progress_id: i64) -> Result<GoalProgress> {
        self.progress_repository.get_progress(user_id, progress_id)
    }

    async fn record_progress(
        &self,
        user_id: i64,
        new_progress: NewGoalProgress,
    ) -> Result<GoalProgress> {
        new_progress.validate()?;
        // Ownership check: the entry itself carries no owner.
        self.goal_repository
            .get_goal(user_id, new_progress.goal_id)?;

        let entry = self.progress_repository.insert(new_progress).await?;
        self.reconcile_after(user_id, &entry, "recorded").await?;
        Ok(entry)
    }

    async fn update_progress(
        &self,
        user_id: i64,
        update: GoalProgressUpdate,
    ) -> Result<GoalProgress> {
        update.validate()?;

        let mut entry = self.progress_repository.get_progress(user_id, update.id)?;
        if let Some(version) = update.version {
            entry.version = version;
        }
        entry.amount = update.amount;
        if let Some(date) = update.date {
            entry.date = date;
        }

        self.progress_repository
            .update_in_place(user_id, &mut entry)
            .await?;
        self.reconcile_after(user_id, &entry, "updated").await?;
        Ok(entry)
    }

    async fn delete_progress(&self, user_id: i64, progress_id: i64) -> Result<()> {
        // Resolves the owning goal and checks ownership before deleting.
        let entry = self.progress_repository.get_progress(user_id, progress_id)?;

        self.progress_repository
            .soft_delete(user_id, progress_id)
            .await?;
        self.reconcile_after(user_id, &entry, "deleted").await
    }
}
