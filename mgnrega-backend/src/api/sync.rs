//! Sync trigger and audit endpoints

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};

use crate::db;
use crate::error::{ApiError, ApiResult};
use crate::models::SyncRun;
use crate::services::sync_job::SweepSummary;
use crate::AppState;

/// Most runs anyone needs for a dashboard; older rows stay queryable in SQL
const RECENT_RUNS_LIMIT: i64 = 20;

/// POST /api/sync
///
/// Runs a full catalog sweep immediately. Returns 409 if a sweep is
/// already in flight.
pub async fn trigger_sync(State(state): State<AppState>) -> ApiResult<Json<SweepSummary>> {
    match state.scheduler.try_run_sweep().await? {
        Some(summary) => Ok(Json(summary)),
        None => Err(ApiError::Conflict("A sync sweep is already running".to_string())),
    }
}

/// GET /api/sync/runs
pub async fn list_runs(State(state): State<AppState>) -> ApiResult<Json<Vec<SyncRun>>> {
    let runs = db::sync_runs::recent_runs(&state.db, RECENT_RUNS_LIMIT).await?;
    Ok(Json(runs))
}

/// Build sync routes
pub fn sync_routes() -> Router<AppState> {
    Router::new()
        .route("/api/sync", post(trigger_sync))
        .route("/api/sync/runs", get(list_runs))
}
