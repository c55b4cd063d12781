use crate::config::DbConfig;
use sqlx::migrate::Migrator;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use tracing::info;

pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

pub async fn init_pool(cfg: &DbConfig) -> Result<PgPool, sqlx::Error> {
    info!(
        max_connections = cfg.max_connections,
        min_connections = cfg.min_connections,
        acquire_timeout_secs = cfg.acquire_timeout_secs,
        "creating database pool"
    );

    let pool = PgPoolOptions::new()
        .max_connections(cfg.max_connections)
        .min_connections(cfg.min_connections)
        .acquire_timeout(Duration::from_secs(cfg.acquire_timeout_secs))
        .idle_timeout(Duration::from_secs(cfg.idle_timeout_secs))
        .max_lifetime(Duration::from_secs(cfg.max_lifetime_secs))
        .test_before_acquire(true)
        .connect(&cfg.database_url)
        .await?;

    MIGRATOR.run(&pool).await?;
    info!("database migrations applied");
    Ok(pool)
}
