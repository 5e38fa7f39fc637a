//! Database pool - optional, configured at startup and only probed by `/health`

use crate::core::Config;
use sqlx::MySqlPool;
use sqlx::mysql::MySqlPoolOptions;
use std::time::Duration;
use tracing::{info, warn};

/// Builds a lazy pool when `DATABASE_URL` is set.
/// No connection is opened until the pool is first used.
pub fn connect_lazy(config: &Config) -> Result<Option<MySqlPool>, sqlx::Error> {
    let Some(url) = &config.database_url else {
        info!("DATABASE_URL not set, running without database");
        return Ok(None);
    };

    let pool = MySqlPoolOptions::new()
        .max_connections(config.max_connections)
        .max_lifetime(Duration::from_secs(config.connection_lifetime_secs))
        .test_before_acquire(true)
        .connect_lazy(url)?;

    Ok(Some(pool))
}

/// Status reported by the health endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DatabaseStatus {
    NotConfigured,
    Up,
    Down,
}

pub async fn probe(pool: Option<&MySqlPool>) -> DatabaseStatus {
    let Some(pool) = pool else {
        return DatabaseStatus::NotConfigured;
    };

    match sqlx::query("SELECT 1").execute(pool).await {
        Ok(_) => DatabaseStatus::Up,
        Err(e) => {
            warn!("Database probe failed: {}", e);
            DatabaseStatus::Down
        }
    }
}
