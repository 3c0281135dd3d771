use async_trait::async_trait;
use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::SqliteConnection;
use std::sync::Arc;

use goalledger_core::goals::{GoalError, GoalProgress, GoalProgressRepositoryTrait, NewGoalProgress};
use goalledger_core::versioning::VersionedRepositoryTrait;
use goalledger_core::Result;

use super::model::{GoalProgressDB, NewGoalProgressDB};
use crate::db::{get_connection, WriteHandle};
use crate::errors::IntoCore;
use crate::schema::{goal_progress, goals};
use crate::versioning::{cas_version, soft_delete_outcome};

pub struct GoalProgressRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
    writer: WriteHandle,
}

impl GoalProgressRepository {
    pub fn new(
        pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
        writer: WriteHandle,
    ) -> Self {
        GoalProgressRepository { pool, writer }
    }
}

fn goal_is_live(conn: &mut SqliteConnection, goal_id: i64, user_id: Option<i64>) -> Result<bool> {
    let mut query = goals::table
        .filter(goals::id.eq(goal_id))
        .filter(goals::deleted.eq(false))
        .into_boxed();
    if let Some(user_id) = user_id {
        query = query.filter(goals::user_id.eq(user_id));
    }
    let count = query.count().get_result::<i64>(conn).into_core()?;
    Ok(count > 0)
}

#[async_trait]
impl VersionedRepositoryTrait<GoalProgress, NewGoalProgress> for GoalProgressRepository {
    async fn insert(&self, new_progress: NewGoalProgress) -> Result<GoalProgress> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<GoalProgress> {
                // Entries may only be recorded against live goals.
                if !goal_is_live(conn, new_progress.goal_id, None)? {
                    return Err(GoalError::NotFound(new_progress.goal_id).into());
                }
                let new_progress_db: NewGoalProgressDB = new_progress.into();
                let result_db = diesel::insert_into(goal_progress::table)
                    .values(&new_progress_db)
                    .returning(GoalProgressDB::as_returning())
                    .get_result(conn)
                    .into_core()?;
                Ok(GoalProgress::from(result_db))
            })
            .await
    }

    async fn update(&self, user_id: i64, record: &GoalProgress) -> Result<i32> {
        let progress_id = record.id;
        let expected = record.version;
        let amount = record.amount;
        let date = record.date;

        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<i32> {
                let owned_goals = goals::table
                    .filter(goals::user_id.eq(user_id))
                    .filter(goals::deleted.eq(false))
                    .select(goals::id);

                let returned = diesel::update(goal_progress::table)
                    .filter(goal_progress::id.eq(progress_id))
                    .filter(goal_progress::version.eq(expected))
                    .filter(goal_progress::deleted.eq(false))
                    .filter(goal_progress::goal_id.eq_any(owned_goals))
                    .set((
                        goal_progress::amount.eq(amount),
                        goal_progress::date.eq(date),
                        goal_progress::version.eq(goal_progress::version + 1),
                    ))
                    .returning(goal_progress::version)
                    .get_result::<i32>(conn)
                    .optional()
                    .into_core()?;
                cas_version(returned, "goal progress", progress_id, expected)
            })
            .await
    }

    async fn soft_delete(&self, user_id: i64, progress_id: i64) -> Result<()> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<()> {
                let owned_goals = goals::table
                    .filter(goals::user_id.eq(user_id))
                    .filter(goals::deleted.eq(false))
                    .select(goals::id);

                let affected = diesel::update(goal_progress::table)
                    .filter(goal_progress::id.eq(progress_id))
                    .filter(goal_progress::deleted.eq(false))
                    .filter(goal_progress::goal_id.eq_any(owned_goals))
                    .set(goal_progress::deleted.eq(true))
                    .execute(conn)
                    .into_core()?;
                soft_delete_outcome(affected, || GoalError::ProgressNotFound(progress_id).into())
            })
            .await
    }
}

impl GoalProgressRepositoryTrait for GoalProgressRepository {
    fn get_progress(&self, user_id: i64, progress_id: i64) -> Result<GoalProgress> {
        let mut conn = get_connection(&self.pool)?;
        let entry = goal_progress::table
            .inner_join(goals::table)
            .filter(goal_progress::id.eq(progress_id))
            .filter(goal_progress::deleted.eq(false))
            .filter(goals::user_id.eq(user_id))
            .filter(goals::deleted.eq(false))
            .select(GoalProgressDB::as_select())
            .first::<GoalProgressDB>(&mut conn)
            .optional()
            .into_core()?
            .ok_or(GoalError::ProgressNotFound(progress_id))?;
        Ok(GoalProgress::from(entry))
    }

    fn list_by_goal(&self, user_id: i64, goal_id: i64) -> Result<Vec<GoalProgress>> {
        let mut conn = get_connection(&self.pool)?;
        if !goal_is_live(&mut conn, goal_id, Some(user_id))? {
            return Err(GoalError::NotFound(goal_id).into());
        }

        let entries = goal_progress::table
            .filter(goal_progress::goal_id.eq(goal_id))
            .filter(goal_progress::deleted.eq(false))
            .order((goal_progress::date.desc(), goal_progress::id.desc()))
            .select(GoalProgressDB::as_select())
            .load::<GoalProgressDB>(&mut conn)
            .into_core()?;
        Ok(entries.into_iter().map(GoalProgress::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_pool, run_migrations, spawn_writer};
    use crate::goals::GoalRepository;
    use chrono::NaiveDate;
    use goalledger_core::goals::{Goal, GoalRepositoryTrait, NewGoal};
    use tempfile::tempdir;

    const OWNER: i64 = 1;
    const STRANGER: i64 = 2;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    async fn setup() -> (GoalRepository, GoalProgressRepository, Goal, tempfile::TempDir) {
        let temp_dir = tempdir().expect("Failed to create temp directory");
        let db_path = temp_dir.path().join("test.db");
        let pool = create_pool(&db_path.to_string_lossy()).expect("Failed to create pool");
        run_migrations(&pool).expect("Failed to run migrations");
        let writer = spawn_writer((*pool).clone());

        let goals = GoalRepository::new(Arc::clone(&pool), writer.clone());
        let progress = GoalProgressRepository::new(pool, writer);
        let goal = goals
            .insert(NewGoal {
                user_id: OWNER,
                name: "Emergency fund".to_string(),
                description: "Three months of expenses".to_string(),
                color: "#00aa55".to_string(),
                target_amount: 3000.0,
                deadline: date(2030, 1, 1),
            })
            .await
            .expect("insert goal");
        (goals, progress, goal, temp_dir)
    }

    fn entry(goal_id: i64, amount: f64, day: u32) -> NewGoalProgress {
        NewGoalProgress {
            goal_id,
            amount,
            date: date(2024, 3, day),
        }
    }

    #[tokio::test]
    async fn entries_list_newest_first_and_skip_deleted() {
        let (_goals, progress, goal, _temp_dir) = setup().await;
        let a = progress.insert(entry(goal.id, 100.0, 1)).await.unwrap();
        let b = progress.insert(entry(goal.id, 50.0, 5)).await.unwrap();
        let c = progress.insert(entry(goal.id, -20.0, 5)).await.unwrap();
        let d = progress.insert(entry(goal.id, 10.0, 2)).await.unwrap();
        assert_eq!(a.version, 1);

        progress.soft_delete(OWNER, d.id).await.unwrap();

        let ids: Vec<_> = progress
            .list_by_goal(OWNER, goal.id)
            .unwrap()
            .iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, vec![c.id, b.id, a.id]);
    }

    #[tokio::test]
    async fn update_is_a_compare_and_swap() {
        let (_goals, progress, goal, _temp_dir) = setup().await;
        let mut current = progress.insert(entry(goal.id, 100.0, 1)).await.unwrap();
        let stale = current.clone();

        current.amount = 150.0;
        progress.update_in_place(OWNER, &mut current).await.unwrap();
        assert_eq!(current.version, 2);

        let err = progress.update(OWNER, &stale).await.unwrap_err();
        assert!(err.is_conflict());
        assert_eq!(progress.get_progress(OWNER, current.id).unwrap().amount, 150.0);
    }

    #[tokio::test]
    async fn entries_are_owned_through_their_goal() {
        let (goals, progress, goal, _temp_dir) = setup().await;
        let recorded = progress.insert(entry(goal.id, 100.0, 1)).await.unwrap();

        assert!(progress
            .get_progress(STRANGER, recorded.id)
            .unwrap_err()
            .is_not_found());
        assert!(progress
            .list_by_goal(STRANGER, goal.id)
            .unwrap_err()
            .is_not_found());
        assert!(progress.update(STRANGER, &recorded).await.unwrap_err().is_conflict());
        assert!(progress
            .soft_delete(STRANGER, recorded.id)
            .await
            .unwrap_err()
            .is_not_found());

        // Deleting the goal hides its ledger and blocks new entries.
        goals.soft_delete(OWNER, goal.id).await.unwrap();
        assert!(goals.get_goal(OWNER, goal.id).unwrap_err().is_not_found());
        assert!(progress
            .get_progress(OWNER, recorded.id)
            .unwrap_err()
            .is_not_found());
        assert!(progress
            .insert(entry(goal.id, 5.0, 2))
            .await
            .unwrap_err()
            .is_not_found());
    }
}
