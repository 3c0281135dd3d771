//! Database models for ledger entries.

use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::goals::GoalDB;
use goalledger_core::goals::{GoalProgress, NewGoalProgress};

/// Database model for goal progress entries
#[derive(
    Queryable,
    Identifiable,
    Associations,
    Selectable,
    PartialEq,
    Serialize,
    Deserialize,
    Debug,
    Clone,
)]
#[diesel(belongs_to(GoalDB, foreign_key = goal_id))]
#[diesel(table_name = crate::schema::goal_progress)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
pub struct GoalProgressDB {
    pub id: i64,
    pub goal_id: i64,
    pub amount: f64,
    pub date: NaiveDate,
    pub version: i32,
    pub deleted: bool,
    pub created_at: NaiveDateTime,
}

/// Database model for recording a new entry
#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::goal_progress)]
pub struct NewGoalProgressDB {
    pub goal_id: i64,
    pub amount: f64,
    pub date: NaiveDate,
}

impl From<GoalProgressDB> for GoalProgress {
    fn from(db: GoalProgressDB) -> Self {
        Self {
            id: db.id,
            goal_id: db.goal_id,
            amount: db.amount,
            date: db.date,
            version: db.version,
            deleted: db.deleted,
            created_at: db.created_at,
        }
    }
}

impl From<NewGoalProgress> for NewGoalProgressDB {
    fn from(domain: NewGoalProgress) -> Self {
        Self {
            goal_id: domain.goal_id,
            amount: domain.amount,
            date: domain.date,
        }
    }
}
