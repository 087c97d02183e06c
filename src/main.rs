use std::{net::SocketAddr, sync::Arc, time::Duration};

use anyhow::Context;

mod app;
mod auth;
mod config;
mod db;
mod error;
mod extract;
mod health;
mod onboarding;
mod palmistry;
mod rate_limit;
mod state;
mod user;
mod validation;
mod zodiac;

#[cfg(test)]
mod testing;

use crate::{config::AppConfig, state::AppState};

const LIMITER_SWEEP_EVERY: Duration = Duration::from_secs(5 * 60);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "ezotera_api=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let config = Arc::new(AppConfig::from_env()?);
    tracing::info!(
        env = %config.env,
        jwt_secret_len = config.jwt.secret.len(),
        secure_cookies = config.secure_cookies(),
        "configuration loaded"
    );

    let pool = db::connect(&config.db).await?;

    if let Err(e) = db::run_migrations(&pool).await {
        tracing::warn!(error = %e, "migration failed; continuing");
    }

    let state = AppState::new(pool.clone(), config.clone());
    let sweeper = state.limiter.spawn_sweeper(LIMITER_SWEEP_EVERY);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("parse listen address")?;
    let result = app::serve(app::build_app(state), addr).await;

    sweeper.abort();
    pool.close().await;
    tracing::info!("database pool closed");

    result
}
