//! Database models for goals.

use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use goalledger_core::errors::{DatabaseError, Error};
use goalledger_core::goals::{Goal, GoalStatus, NewGoal};

/// Database model for goals
#[derive(
    Queryable,
    Identifiable,
    Selectable,
    PartialEq,
    Serialize,
    Deserialize,
    Debug,
    Clone,
)]
#[diesel(table_name = crate::schema::goals)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
pub struct GoalDB {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub description: String,
    pub color: String,
    pub target_amount: f64,
    pub current_amount: f64,
    pub deadline: NaiveDate,
    pub status: i32,
    pub version: i32,
    pub deleted: bool,
    pub created_at: NaiveDateTime,
}

/// Database model for creating a new goal. The remaining columns take their
/// defaults: no progress, `Pending`, version 1.
#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::goals)]
pub struct NewGoalDB {
    pub user_id: i64,
    pub name: String,
    pub description: String,
    pub color: String,
    pub target_amount: f64,
    pub deadline: NaiveDate,
}

/// Columns written by a versioned goal update. `version` is bumped by the
/// statement itself.
#[derive(AsChangeset, Debug, Clone)]
#[diesel(table_name = crate::schema::goals)]
pub struct GoalChangesDB {
    pub name: String,
    pub description: String,
    pub color: String,
    pub target_amount: f64,
    pub current_amount: f64,
    pub deadline: NaiveDate,
    pub status: i32,
}

impl TryFrom<GoalDB> for Goal {
    type Error = Error;

    fn try_from(db: GoalDB) -> Result<Self, Self::Error> {
        let status = GoalStatus::from_code(db.status).ok_or_else(|| {
            DatabaseError::Internal(format!(
                "goal {} has unknown status code {}",
                db.id, db.status
            ))
        })?;
        Ok(Self {
            id: db.id,
            user_id: db.user_id,
            name: db.name,
            description: db.description,
            color: db.color,
            target_amount: db.target_amount,
            current_amount: db.current_amount,
            deadline: db.deadline,
            status,
            version: db.version,
            deleted: db.deleted,
            created_at: db.created_at,
        })
    }
}

impl From<NewGoal> for NewGoalDB {
    fn from(domain: NewGoal) -> Self {
        Self {
            user_id: domain.user_id,
            name: domain.name,
            description: domain.description,
            color: domain.color,
            target_amount: domain.target_amount,
            deadline: domain.deadline,
        }
    }
}

impl From<&Goal> for GoalChangesDB {
    fn from(goal: &Goal) -> Self {
        Self {
            name: goal.name.clone(),
            description: goal.description.clone(),
            color: goal.color.clone(),
            target_amount: goal.target_amount,
            current_amount: goal.current_amount,
            deadline: goal.deadline,
            status: goal.status.code(),
        }
    }
}
