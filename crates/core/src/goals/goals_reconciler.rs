use std::sync::Arc;

use log::{debug, error};

use super::goals_errors::GoalError;
use super::goals_ledger::LedgerSummary;
use super::goals_model::Goal;
use super::goals_status::derive_status;
use super::goals_traits::{GoalProgressRepositoryTrait, GoalRepositoryTrait};
use crate::errors::Result;
use crate::utils::Clock;
use crate::versioning::{retry_on_conflict, RetryPolicy, VersionedRepositoryTrait};

/// Keeps a goal's `current_amount` and `status` in step with its ledger.
///
/// Each pass re-reads the goal (for a fresh version token) and its ledger,
/// derives the new fields and writes them with a compare-and-swap. A lost
/// race restarts the whole pass, up to the retry policy's budget.
pub struct GoalReconciler {
    goal_repository: Arc<dyn GoalRepositoryTrait>,
    progress_repository: Arc<dyn GoalProgressRepositoryTrait>,
    clock: Arc<dyn Clock>,
    retry_policy: RetryPolicy,
}

impl GoalReconciler {
    pub fn new(
        goal_repository: Arc<dyn GoalRepositoryTrait>,
        progress_repository: Arc<dyn GoalProgressRepositoryTrait>,
        clock: Arc<dyn Clock>,
        retry_policy: RetryPolicy,
    ) -> Self {
        GoalReconciler {
            goal_repository,
            progress_repository,
            clock,
            retry_policy,
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry_policy
    }

    /// Recomputes and persists the derived fields of `goal_id`.
    ///
    /// Only version conflicts are retried. Exhausting the budget yields
    /// `GoalError::ReconciliationConflict`; every other error is returned as is.
    pub async fn reconcile(&self, user_id: i64, goal_id: i64) -> Result<Goal> {
        let label = format!("reconcile goal {}", goal_id);
        retry_on_conflict(&self.retry_policy, &label, |attempt| {
            self.reconcile_once(user_id, goal_id, attempt)
        })
        .await
        .map_err(|err| {
            if err.is_conflict() {
                error!(
                    "Giving up on goal {}: derived fields stay stale until the next reconciliation",
                    goal_id
                );
                GoalError::ReconciliationConflict {
                    goal_id,
                    attempts: self.retry_policy.attempts(),
                }
                .into()
            } else {
                err
            }
        })
    }

    async fn reconcile_once(&self, user_id: i64, goal_id: i64, attempt: u32) -> Result<Goal> {
        let mut goal = self.goal_repository.get_goal(user_id, goal_id)?;
        let entries = self.progress_repository.list_by_goal(user_id, goal_id)?;
        let ledger = LedgerSummary::from_entries(&entries);

        let status = derive_status(
            ledger.total,
            goal.target_amount,
            goal.deadline,
            self.clock.today(),
            goal.status,
            ledger.has_progress(),
        );

        if goal.current_amount == ledger.total && goal.status == status {
            debug!(
                "Goal {} already consistent at version {} (attempt {})",
                goal_id, goal.version, attempt
            );
            return Ok(goal);
        }

        debug!(
            "Goal {} attempt {}: current {} -> {}, status {} -> {}",
            goal_id, attempt, goal.current_amount, ledger.total, goal.status, status
        );
        goal.current_amount = ledger.total;
        goal.status = status;
        self.goal_repository
            .update_in_place(user_id, &mut goal)
            .await?;
        Ok(goal)
    }
}
