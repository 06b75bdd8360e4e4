//! Sync run audit log operations
//!
//! One row per catalog sweep. A run is created in the `running` state and
//! finished exactly once with a terminal status.

use crate::models::{SyncRun, SyncStatus};
use chrono::Utc;
use mgnrega_common::Result;
use sqlx::{Pool, Sqlite};
use uuid::Uuid;

/// Create a new sync run in the `running` state, returning its id
pub async fn create_run(db: &Pool<Sqlite>) -> Result<String> {
    let run_id = Uuid::new_v4().to_string();

    sqlx::query("INSERT INTO sync_runs (run_id, status, start_time, records) VALUES (?, ?, ?, 0)")
        .bind(&run_id)
        .bind(SyncStatus::Running.as_str())
        .bind(Utc::now())
        .execute(db)
        .await?;

    Ok(run_id)
}

/// Move a run to a terminal status, setting end_time and final counts
pub async fn finish_run(
    db: &Pool<Sqlite>,
    run_id: &str,
    status: SyncStatus,
    records: i64,
    error: Option<&str>,
) -> Result<()> {
    sqlx::query(
        "UPDATE sync_runs SET status = ?, end_time = ?, records = ?, error = ? WHERE run_id = ?",
    )
    .bind(status.as_str())
    .bind(Utc::now())
    .bind(records)
    .bind(error)
    .bind(run_id)
    .execute(db)
    .await?;

    Ok(())
}

/// Record a sweep that failed before it could run to completion.
/// Best-effort: used from paths where the primary audit write already
/// failed, so its own failure is only logged by the caller.
pub async fn record_failed_run(
    db: &Pool<Sqlite>,
    records: i64,
    error: &str,
) -> Result<String> {
    let run_id = Uuid::new_v4().to_string();
    let now = Utc::now();

    sqlx::query(
        "INSERT INTO sync_runs (run_id, status, start_time, end_time, records, error) \
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(&run_id)
    .bind(SyncStatus::Failed.as_str())
    .bind(now)
    .bind(now)
    .bind(records)
    .bind(error)
    .execute(db)
    .await?;

    Ok(run_id)
}

/// Most recent sync runs, newest first
pub async fn recent_runs(db: &Pool<Sqlite>, limit: i64) -> Result<Vec<SyncRun>> {
    let runs = sqlx::query_as::<_, SyncRun>(
        "SELECT run_id, status, start_time, end_time, records, error \
         FROM sync_runs ORDER BY start_time DESC LIMIT ?",
    )
    .bind(limit)
    .fetch_all(db)
    .await?;

    Ok(runs)
}

/// Fetch a single run by id
pub async fn get_run(db: &Pool<Sqlite>, run_id: &str) -> Result<Option<SyncRun>> {
    let run = sqlx::query_as::<_, SyncRun>(
        "SELECT run_id, status, start_time, end_time, records, error \
         FROM sync_runs WHERE run_id = ?",
    )
    .bind(run_id)
    .fetch_optional(db)
    .await?;

    Ok(run)
}
