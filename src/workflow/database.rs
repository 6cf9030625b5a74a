/// SQLite connection management for workflow storage
///
/// One database file per deployment: {data_dir}/workflows.db. Foreign keys are
/// switched on for every connection so node and edge rows cascade with their
/// workflow.

use crate::config::DatabaseConfig;
use anyhow::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;

/// Open (creating if missing) the workflow database pool
pub async fn connect(config: &DatabaseConfig) -> Result<SqlitePool> {
    std::fs::create_dir_all(&config.data_dir)
        .map_err(|e| anyhow::anyhow!("Failed to create data directory '{}': {}", config.data_dir, e))?;
    let db_path = config.database_path();

    tracing::info!("🗄️ Opening workflow database: {}", db_path.display());

    let options = SqliteConnectOptions::new()
        .filename(&db_path)
        .create_if_missing(true)
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections.max(1))
        .connect_with(options)
        .await?;

    tracing::info!("✅ Workflow database ready ({} max connections)", config.max_connections.max(1));

    Ok(pool)
}

/// Private in-memory database, used by tests and throwaway runs
///
/// Pinned to a single long-lived connection: every SQLite memory connection is
/// its own database, so a second connection would see empty tables.
pub async fn connect_in_memory() -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await?;
    Ok(pool)
}
