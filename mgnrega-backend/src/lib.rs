//! mgnrega-backend library interface
//!
//! Aggregates MGNREGA employment statistics per state/district from the
//! data.gov.in open-data API, caches them in SQLite, and serves them over
//! an HTTP JSON API. The resolution pipeline (cache, store + freshness,
//! upstream with stale fallback) lives in [`services`]; route handlers in
//! [`api`] are thin glue over it.

pub mod api;
pub mod db;
pub mod error;
pub mod models;
pub mod services;

pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::services::cache::LookAsideCache;
use crate::services::resolver::DistrictResolver;
use crate::services::sync_job::SyncScheduler;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Catalog and audit storage
    pub db: SqlitePool,
    /// Best-effort look-aside cache
    pub cache: LookAsideCache,
    /// The resolution pipeline
    pub resolver: Arc<DistrictResolver>,
    /// Catalog sweep scheduler (also serves manual triggers)
    pub scheduler: Arc<SyncScheduler>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(
        db: SqlitePool,
        cache: LookAsideCache,
        resolver: Arc<DistrictResolver>,
        scheduler: Arc<SyncScheduler>,
    ) -> Self {
        Self {
            db,
            cache,
            resolver,
            scheduler,
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
///
/// CORS is permissive; the dashboard frontend is served from a different
/// origin in every deployment this service has seen.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::district_routes())
        .merge(api::sync_routes())
        .merge(api::health_routes())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
