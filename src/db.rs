use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};
use time::OffsetDateTime;
use tracing::info;

use crate::config::DbConfig;

pub async fn connect(config: &DbConfig) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .idle_timeout(config.idle_timeout)
        .acquire_timeout(config.connect_timeout)
        .connect(&config.url)
        .await
        .context("connect to database")?;
    info!(
        max_connections = config.max_connections,
        "database pool ready"
    );
    Ok(pool)
}

pub async fn run_migrations(db: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations")
        .run(db)
        .await
        .context("run migrations")?;
    Ok(())
}

/// Round-trips `SELECT NOW()` and returns the database clock.
pub async fn ping(db: &PgPool) -> Result<OffsetDateTime, sqlx::Error> {
    sqlx::query_scalar::<_, OffsetDateTime>("SELECT NOW()")
        .fetch_one(db)
        .await
}
