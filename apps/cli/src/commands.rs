use chrono::NaiveDate;
use clap::Subcommand;
use serde_json::{json, Value};

use goalledger_core::goals::{
    GoalFilters, GoalProgressUpdate, GoalStatus, GoalUpdate, NewGoal, NewGoalProgress,
};

use crate::main_lib::AppState;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a goal.
    CreateGoal {
        #[arg(long)]
        name: String,
        #[arg(long)]
        description: String,
        #[arg(long)]
        color: String,
        /// Target amount.
        #[arg(long)]
        target: f64,
        /// Deadline (YYYY-MM-DD). The goal fails on the day after.
        #[arg(long)]
        deadline: NaiveDate,
    },
    /// Show a goal with its suggested installments.
    GetGoal { id: i64 },
    /// List goals.
    ListGoals {
        /// Case-insensitive substring of the name.
        #[arg(long, default_value = "")]
        name: String,
        #[arg(long)]
        status: Option<GoalStatus>,
        #[arg(long, default_value_t = 1)]
        page: i64,
        #[arg(long, default_value_t = 20)]
        page_size: i64,
        /// id, name, deadline or created_at; prefix with '-' to sort descending.
        #[arg(long, default_value = "id", allow_hyphen_values = true)]
        sort: String,
    },
    /// Edit a goal. Requires the version last read.
    UpdateGoal {
        id: i64,
        #[arg(long)]
        name: String,
        #[arg(long)]
        description: String,
        #[arg(long)]
        color: String,
        #[arg(long)]
        target: f64,
        #[arg(long)]
        deadline: NaiveDate,
        #[arg(long)]
        version: i32,
    },
    /// Delete a goal.
    DeleteGoal { id: i64 },
    /// Record a contribution (or a correction, when negative).
    RecordProgress {
        goal_id: i64,
        #[arg(long, allow_negative_numbers = true)]
        amount: f64,
        /// Entry date (YYYY-MM-DD), today when omitted.
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Show one ledger entry.
    GetProgress { id: i64 },
    /// Edit a ledger entry.
    UpdateProgress {
        id: i64,
        #[arg(long, allow_negative_numbers = true)]
        amount: f64,
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Reject the edit if the entry is no longer at this version.
        #[arg(long)]
        version: Option<i32>,
    },
    /// Delete a ledger entry.
    DeleteProgress { id: i64 },
    /// List a goal's ledger entries, newest first.
    ListProgress { goal_id: i64 },
    /// Recompute a goal's amount and status from its ledger.
    Reconcile { goal_id: i64 },
}

/// Runs `command` on behalf of `owner` and returns its JSON output.
pub async fn run(state: &AppState, owner: i64, command: Command) -> anyhow::Result<Value> {
    let today = state.clock.today();
    let goals = &state.goal_service;
    let progress = &state.progress_service;

    let output = match command {
        Command::CreateGoal {
            name,
            description,
            color,
            target,
            deadline,
        } => {
            let goal = goals
                .create_goal(
                    owner,
                    NewGoal {
                        user_id: owner,
                        name,
                        description,
                        color,
                        target_amount: target,
                        deadline,
                    },
                )
                .await?;
            serde_json::to_value(goal)?
        }
        Command::GetGoal { id } => serde_json::to_value(goals.get_goal(owner, id).await?)?,
        Command::ListGoals {
            name,
            status,
            page,
            page_size,
            sort,
        } => {
            let filters = GoalFilters {
                name,
                status,
                page,
                page_size,
                sort,
            };
            let (goals, metadata) = goals.list_goals(owner, &filters)?;
            json!({ "goals": goals, "metadata": metadata })
        }
        Command::UpdateGoal {
            id,
            name,
            description,
            color,
            target,
            deadline,
            version,
        } => {
            let goal = goals
                .update_goal(
                    owner,
                    GoalUpdate {
                        id,
                        name,
                        description,
                        color,
                        target_amount: target,
                        deadline,
                        version,
                    },
                )
                .await?;
            serde_json::to_value(goal)?
        }
        Command::DeleteGoal { id } => {
            goals.delete_goal(owner, id).await?;
            json!({ "deleted": id })
        }
        Command::RecordProgress {
            goal_id,
            amount,
            date,
        } => {
            let entry = progress
                .record_progress(
                    owner,
                    NewGoalProgress {
                        goal_id,
                        amount,
                        date: date.unwrap_or(today),
                    },
                )
                .await?;
            serde_json::to_value(entry)?
        }
        Command::GetProgress { id } => serde_json::to_value(progress.get_progress(owner, id)?)?,
        Command::UpdateProgress {
            id,
            amount,
            date,
            version,
        } => {
            let entry = progress
                .update_progress(
                    owner,
                    GoalProgressUpdate {
                        id,
                        amount,
                        date,
                        version,
                    },
                )
                .await?;
            serde_json::to_value(entry)?
        }
        Command::DeleteProgress { id } => {
            progress.delete_progress(owner, id).await?;
            json!({ "deleted": id })
        }
        Command::ListProgress { goal_id } => {
            serde_json::to_value(progress.list_progress(owner, goal_id)?)?
        }
        Command::Reconcile { goal_id } => {
            serde_json::to_value(goals.reconcile_goal(owner, goal_id).await?)?
        }
    };
    Ok(output)
}
