//! Database access for the MGNREGA service
//!
//! SQLite via sqlx; the catalog table is the source of truth for district
//! payloads, the sync_runs table is the sweep audit log.

pub mod districts;
pub mod sync_runs;

use anyhow::Result;
use sqlx::SqlitePool;
use std::path::Path;

/// Initialize database connection pool
pub async fn init_database_pool(db_path: &Path) -> Result<SqlitePool> {
    // Ensure parent directory exists
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    // Use proper SQLite URI with mode=rwc (read, write, create)
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    tracing::debug!("Connecting to database: {}", db_url);

    let pool = SqlitePool::connect(&db_url).await?;

    init_tables(&pool).await?;

    Ok(pool)
}

/// Create service tables if they don't exist
///
/// The UNIQUE constraint on (state_name, district_name) is what serializes
/// concurrent upserts for the same pair; application code never locks.
pub async fn init_tables(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS district_data (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            state_name TEXT NOT NULL,
            district_name TEXT NOT NULL,
            district_code TEXT,
            data TEXT NOT NULL,
            last_updated TEXT NOT NULL,
            UNIQUE(state_name, district_name)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS sync_runs (
            run_id TEXT PRIMARY KEY,
            status TEXT NOT NULL,
            start_time TEXT NOT NULL,
            end_time TEXT,
            records INTEGER NOT NULL DEFAULT 0,
            error TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    tracing::info!("Database tables initialized (district_data, sync_runs)");

    Ok(())
}
