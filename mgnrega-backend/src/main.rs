//! mgnrega-backend - MGNREGA district statistics service
//!
//! Syncs employment-scheme statistics from the data.gov.in API into a local
//! SQLite catalog on a daily schedule and serves them to the dashboard
//! frontend over HTTP.

use anyhow::Result;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use mgnrega_backend::services::cache::LookAsideCache;
use mgnrega_backend::services::normalize::NameTable;
use mgnrega_backend::services::resolver::DistrictResolver;
use mgnrega_backend::services::sync_job::SyncScheduler;
use mgnrega_backend::services::upstream::DataGovClient;
use mgnrega_backend::AppState;
use mgnrega_common::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting mgnrega-backend");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    // Configuration: TOML file (MGNREGA_CONFIG or ./mgnrega.toml) + env overrides
    let config_path = std::env::var("MGNREGA_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("mgnrega.toml"));
    let config = Config::load(Some(&config_path))?;

    // Storage
    info!("Database: {}", config.database_path.display());
    let db_pool = mgnrega_backend::db::init_database_pool(&config.database_path).await?;
    info!("Database connection established");

    // Pipeline components
    let cache = LookAsideCache::in_memory();
    let names = Arc::new(NameTable::new(&config.aliases));
    let upstream = Arc::new(DataGovClient::new(&config)?);
    let resolver = Arc::new(DistrictResolver::new(
        db_pool.clone(),
        cache.clone(),
        upstream,
        names,
    ));

    // Scheduled catalog sweep
    let scheduler = Arc::new(SyncScheduler::new(
        db_pool.clone(),
        resolver.clone(),
        config.catalog.clone(),
        config.sync_interval_secs,
    ));
    scheduler.clone().spawn();

    // HTTP server
    let state = AppState::new(db_pool, cache, resolver, scheduler);
    let app = mgnrega_backend::build_router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
