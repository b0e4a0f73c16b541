pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod repositories;
pub mod services;

// Make test_utils available for both unit tests and integration tests
pub mod test_utils;

use anyhow::Context;
use config::AppConfig;
use repositories::user_repository::SqliteUserRepository;
use services::user_service::UserService;
use std::sync::Arc;

/// Explicit storage and service handles. Nothing in the crate reaches for a
/// global connection; callers build one of these and pass it around.
#[derive(Clone)]
pub struct AppState {
    pub user_service: Arc<UserService>,
    pub pool: sqlx::SqlitePool,
}

impl AppState {
    pub async fn init(config: &AppConfig) -> anyhow::Result<Self> {
        let pool = db::create_pool(config)
            .await
            .context("connect to database")?;
        db::run_migrations(&pool)
            .await
            .context("apply migrations")?;

        let hasher = config.build_hasher().context("configure password hasher")?;
        let repository = Arc::new(SqliteUserRepository::new(pool.clone()));
        let user_service = Arc::new(UserService::new(repository, hasher));

        Ok(Self { user_service, pool })
    }
}
