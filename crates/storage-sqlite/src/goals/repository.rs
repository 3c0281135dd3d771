use async_trait::async_trait;
use chrono::NaiveDate;
use diesel::dsl::{not, sql};
use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::sql_types::Text;
use diesel::sqlite::Sqlite;
use diesel::SqliteConnection;
use std::sync::Arc;

use goalledger_core::goals::{
    Goal, GoalError, GoalFilters, GoalRepositoryTrait, GoalSortColumn, GoalStatus, NewGoal,
};
use goalledger_core::pagination::PageMetadata;
use goalledger_core::versioning::VersionedRepositoryTrait;
use goalledger_core::Result;

use super::model::{GoalChangesDB, GoalDB, NewGoalDB};
use crate::db::{get_connection, WriteHandle};
use crate::errors::IntoCore;
use crate::schema::goals;
use crate::versioning::{cas_version, soft_delete_outcome};

pub struct GoalRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
    writer: WriteHandle,
}

impl GoalRepository {
    pub fn new(
        pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
        writer: WriteHandle,
    ) -> Self {
        GoalRepository { pool, writer }
    }
}

/// Live goals of `user_id` matching the name and status filters. The status
/// filter sees expired open goals as failed, the way listings show them.
fn filtered_goals<'a>(
    user_id: i64,
    filters: &GoalFilters,
    today: NaiveDate,
) -> goals::BoxedQuery<'a, Sqlite> {
    let mut query = goals::table
        .filter(goals::user_id.eq(user_id))
        .filter(goals::deleted.eq(false))
        .into_boxed();

    let name = filters.name.trim();
    if !name.is_empty() {
        // SQLite's LIKE folds ASCII case only.
        query = query.filter(
            goals::name
                .like(format!("%{}%", escape_like(name)))
                .escape('\\'),
        );
    }
    if let Some(status) = filters.status {
        let expired_open = goals::deadline
            .lt(today)
            .and(goals::current_amount.lt(goals::target_amount));
        query = if status == GoalStatus::Failed {
            query.filter(goals::status.eq(status.code()).or(expired_open))
        } else {
            query.filter(goals::status.eq(status.code()).and(not(expired_open)))
        };
    }
    query
}

/// Name ordering that folds ASCII case like the name filter does.
fn name_nocase() -> diesel::expression::SqlLiteral<Text> {
    sql::<Text>("goals.name COLLATE NOCASE")
}

fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

#[async_trait]
impl VersionedRepositoryTrait<Goal, NewGoal> for GoalRepository {
    async fn insert(&self, new_goal: NewGoal) -> Result<Goal> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Goal> {
                let new_goal_db: NewGoalDB = new_goal.into();
                let result_db = diesel::insert_into(goals::table)
                    .values(&new_goal_db)
                    .returning(GoalDB::as_returning())
                    .get_result(conn)
                    .into_core()?;
                Goal::try_from(result_db)
            })
            .await
    }

    async fn update(&self, user_id: i64, record: &Goal) -> Result<i32> {
        let goal_id = record.id;
        let expected = record.version;
        let changes = GoalChangesDB::from(record);

        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<i32> {
                let returned = diesel::update(goals::table)
                    .filter(goals::id.eq(goal_id))
                    .filter(goals::user_id.eq(user_id))
                    .filter(goals::version.eq(expected))
                    .filter(goals::deleted.eq(false))
                    .set((&changes, goals::version.eq(goals::version + 1)))
                    .returning(goals::version)
                    .get_result::<i32>(conn)
                    .optional()
                    .into_core()?;
                cas_version(returned, "goal", goal_id, expected)
            })
            .await
    }

    async fn soft_delete(&self, user_id: i64, goal_id: i64) -> Result<()> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<()> {
                let affected = diesel::update(goals::table)
                    .filter(goals::id.eq(goal_id))
                    .filter(goals::user_id.eq(user_id))
                    .filter(goals::deleted.eq(false))
                    .set(goals::deleted.eq(true))
                    .execute(conn)
                    .into_core()?;
                soft_delete_outcome(affected, || GoalError::NotFound(goal_id).into())
            })
            .await
    }
}

impl GoalRepositoryTrait for GoalRepository {
    fn get_goal(&self, user_id: i64, goal_id: i64) -> Result<Goal> {
        let mut conn = get_connection(&self.pool)?;
        let goal_db = goals::table
            .filter(goals::id.eq(goal_id))
            .filter(goals::user_id.eq(user_id))
            .filter(goals::deleted.eq(false))
            .select(GoalDB::as_select())
            .first::<GoalDB>(&mut conn)
            .optional()
            .into_core()?
            .ok_or(GoalError::NotFound(goal_id))?;
        Goal::try_from(goal_db)
    }

    fn list_goals(
        &self,
        user_id: i64,
        filters: &GoalFilters,
        today: NaiveDate,
    ) -> Result<(Vec<Goal>, PageMetadata)> {
        let mut conn = get_connection(&self.pool)?;

        let total_records = filtered_goals(user_id, filters, today)
            .count()
            .get_result::<i64>(&mut conn)
            .into_core()?;

        let mut query = filtered_goals(user_id, filters, today);
        if let Some(sort) = filters.parse_sort() {
            query = match (sort.column, sort.descending) {
                (GoalSortColumn::Id, false) => query.order_by(goals::id.asc()),
                (GoalSortColumn::Id, true) => query.order_by(goals::id.desc()),
                (GoalSortColumn::Name, false) => query.order_by(name_nocase().asc()),
                (GoalSortColumn::Name, true) => query.order_by(name_nocase().desc()),
                (GoalSortColumn::Deadline, false) => query.order_by(goals::deadline.asc()),
                (GoalSortColumn::Deadline, true) => query.order_by(goals::deadline.desc()),
                (GoalSortColumn::CreatedAt, false) => query.order_by(goals::created_at.asc()),
                (GoalSortColumn::CreatedAt, true) => query.order_by(goals::created_at.desc()),
            };
        }

        // Ties always break on id so pages are stable.
        let goals_db = query
            .then_order_by(goals::id.asc())
            .limit(filters.limit())
            .offset(filters.offset())
            .select(GoalDB::as_select())
            .load::<GoalDB>(&mut conn)
            .into_core()?;

        let goals = goals_db
            .into_iter()
            .map(Goal::try_from)
            .collect::<Result<Vec<_>>>()?;
        Ok((
            goals,
            PageMetadata::calculate(total_records, filters.page, filters.page_size),
        ))
    }
}
