use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, info};

use super::goals_errors::GoalError;
use super::goals_installments::project_installments;
use super::goals_ledger::LedgerSummary;
use super::goals_model::{Goal, GoalDetails, GoalFilters, GoalUpdate, NewGoal};
use super::goals_reconciler::GoalReconciler;
use super::goals_status::{derive_status, display_status, is_expired_open};
use super::goals_traits::{GoalProgressRepositoryTrait, GoalRepositoryTrait, GoalServiceTrait};
use crate::errors::{DatabaseError, Error, Result};
use crate::pagination::PageMetadata;
use crate::utils::Clock;
use crate::versioning::VersionedRepositoryTrait;

pub struct GoalService {
    goal_repository: Arc<dyn GoalRepositoryTrait>,
    progress_repository: Arc<dyn GoalProgressRepositoryTrait>,
    reconciler: Arc<GoalReconciler>,
    clock: Arc<dyn Clock>,
}

impl GoalService {
    pub fn new(
        goal_repository: Arc<dyn GoalRepositoryTrait>,
        progress_repository: Arc<dyn GoalProgressRepositoryTrait>,
        reconciler: Arc<GoalReconciler>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        GoalService {
            goal_repository,
            progress_repository,
            reconciler,
            clock,
        }
    }

    fn details(&self, goal: Goal) -> GoalDetails {
        let installments = project_installments(
            goal.target_amount,
            goal.current_amount,
            goal.deadline,
            self.clock.today(),
        );
        GoalDetails { goal, installments }
    }
}

/// Unique violations on goals can only come from the per-user name index.
fn map_duplicate_name(err: Error, name: &str) -> Error {
    match err {
        Error::Database(DatabaseError::UniqueViolation(_)) => {
            GoalError::DuplicateName(name.to_string()).into()
        }
        other => other,
    }
}

#[async_trait]
impl GoalServiceTrait for GoalService {
    async fn create_goal(&self, user_id: i64, mut new_goal: NewGoal) -> Result<Goal> {
        new_goal.validate()?;
        new_goal.user_id = user_id;
        let name = new_goal.name.clone();

        let goal = self
            .goal_repository
            .insert(new_goal)
            .await
            .map_err(|err| map_duplicate_name(err, &name))?;
        debug!("Created goal {} for user {}", goal.id, user_id);
        Ok(goal)
    }

    async fn get_goal(&self, user_id: i64, goal_id: i64) -> Result<GoalDetails> {
        let mut goal = self.goal_repository.get_goal(user_id, goal_id)?;

        if is_expired_open(&goal, self.clock.today()) {
            info!(
                "Goal {} passed its deadline {} under target, reconciling",
                goal.id, goal.deadline
            );
            goal = self.reconciler.reconcile(user_id, goal_id).await?;
        }

        Ok(self.details(goal))
    }

    fn list_goals(
        &self,
        user_id: i64,
        filters: &GoalFilters,
    ) -> Result<(Vec<GoalDetails>, PageMetadata)> {
        filters.validate()?;

        let today = self.clock.today();
        let (goals, metadata) = self.goal_repository.list_goals(user_id, filters, today)?;
        let details = goals
            .into_iter()
            .map(|mut goal| {
                goal.status = display_status(&goal, today);
                self.details(goal)
            })
            .collect();
        Ok((details, metadata))
    }

    async fn update_goal(&self, user_id: i64, update: GoalUpdate) -> Result<Goal> {
        update.validate()?;

        let mut goal = self.goal_repository.get_goal(user_id, update.id)?;
        let ledger = LedgerSummary::from_entries(
            &self.progress_repository.list_by_goal(user_id, update.id)?,
        );

        goal.name = update.name;
        goal.description = update.description;
        goal.color = update.color;
        goal.target_amount = update.target_amount;
        goal.deadline = update.deadline;
        goal.version = update.version;
        goal.status = derive_status(
            goal.current_amount,
            goal.target_amount,
            goal.deadline,
            self.clock.today(),
            goal.status,
            ledger.has_progress(),
        );

        let name = goal.name.clone();
        self.goal_repository
            .update_in_place(user_id, &mut goal)
            .await
            .map_err(|err| map_duplicate_name(err, &name))?;
        Ok(goal)
    }

    async fn delete_goal(&self, user_id: i64, goal_id: i64) -> Result<()> {
        self.goal_repository.soft_delete(user_id, goal_id).await
    }

    async fn reconcile_goal(&self, user_id: i64, goal_id: i64) -> Result<Goal> {
        self.reconciler.reconcile(user_id, goal_id).await
    }
}
