use std::sync::Arc;

use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use goalledger_core::goals::{
    GoalProgressService, GoalProgressServiceTrait, GoalReconciler, GoalService, GoalServiceTrait,
};
use goalledger_core::utils::{Clock, SystemClock};
use goalledger_storage_sqlite::{
    create_pool_with_config, db, goal_progress::GoalProgressRepository, goals::GoalRepository,
    run_migrations, spawn_writer, StorageConfig,
};

use crate::config::Config;

pub struct AppState {
    pub goal_service: Arc<dyn GoalServiceTrait>,
    pub progress_service: Arc<dyn GoalProgressServiceTrait>,
    pub clock: Arc<dyn Clock>,
}

pub fn init_tracing() {
    let log_format = std::env::var("GOALLEDGER_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    // stdout carries command output, so logs go to stderr.
    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_line_number(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let db_path = db::init(&config.data_dir)?;
    tracing::info!("Database path in use: {}", db_path);

    let storage = StorageConfig::new(db_path)
        .with_pool_size(config.pool_size)
        .with_op_timeout(config.op_timeout);
    let pool = create_pool_with_config(&storage)?;
    run_migrations(&pool)?;
    let writer = spawn_writer((*pool).clone()).with_timeout(storage.op_timeout);

    let goal_repository = Arc::new(GoalRepository::new(pool.clone(), writer.clone()));
    let progress_repository = Arc::new(GoalProgressRepository::new(pool, writer));
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let reconciler = Arc::new(GoalReconciler::new(
        goal_repository.clone(),
        progress_repository.clone(),
        clock.clone(),
        config.retry_policy,
    ));
    let goal_service = Arc::new(GoalService::new(
        goal_repository.clone(),
        progress_repository.clone(),
        reconciler.clone(),
        clock.clone(),
    ));
    let progress_service = Arc::new(GoalProgressService::new(
        progress_repository,
        goal_repository,
        reconciler,
    ));

    Ok(Arc::new(AppState {
        goal_service,
        progress_service,
        clock,
    }))
}
