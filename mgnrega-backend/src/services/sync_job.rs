//! Scheduled catalog sweep
//!
//! Iterates the full state/district catalog on a recurring schedule,
//! resolving every pair and recording one audit row per sweep. One pair's
//! failure never aborts the sweep; the terminal status and counts reflect
//! every attempted pair. At most one sweep runs at a time.

use crate::db;
use crate::models::SyncStatus;
use crate::services::resolver::DistrictResolver;
use mgnrega_common::Result;
use serde::Serialize;
use sqlx::{Pool, Sqlite};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;
use tracing::{error, info, warn};

/// Outcome of one finished sweep
#[derive(Debug, Clone, Serialize)]
pub struct SweepSummary {
    pub run_id: String,
    pub status: SyncStatus,
    /// Successful district updates
    pub records: i64,
    /// Pairs that resolved to nothing or errored
    pub failures: i64,
}

pub struct SyncScheduler {
    db: Pool<Sqlite>,
    resolver: Arc<DistrictResolver>,
    /// state -> districts swept each run
    catalog: BTreeMap<String, Vec<String>>,
    interval_secs: u64,
    sweep_active: AtomicBool,
}

impl SyncScheduler {
    pub fn new(
        db: Pool<Sqlite>,
        resolver: Arc<DistrictResolver>,
        catalog: BTreeMap<String, Vec<String>>,
        interval_secs: u64,
    ) -> Self {
        Self {
            db,
            resolver,
            catalog,
            interval_secs,
            sweep_active: AtomicBool::new(false),
        }
    }

    /// Spawn the recurring sweep loop. The first sweep fires one full
    /// interval after startup, matching the original cron behavior.
    pub fn spawn(self: Arc<Self>) -> tokio::task::JoinHandle<()> {
        info!(interval_secs = self.interval_secs, "Sync scheduler started");

        tokio::spawn(async move {
            let mut ticker = interval(Duration::from_secs(self.interval_secs));
            ticker.tick().await; // first tick completes immediately

            loop {
                ticker.tick().await;

                match self.try_run_sweep().await {
                    Ok(Some(summary)) => info!(
                        run_id = %summary.run_id,
                        status = summary.status.as_str(),
                        records = summary.records,
                        failures = summary.failures,
                        "Scheduled sweep finished"
                    ),
                    Ok(None) => warn!("Scheduled sweep skipped, another sweep is running"),
                    Err(e) => error!(error = %e, "Scheduled sweep failed"),
                }
            }
        })
    }

    /// Run a sweep unless one is already in flight. `Ok(None)` means the
    /// single-flight guard rejected this start.
    pub async fn try_run_sweep(&self) -> Result<Option<SweepSummary>> {
        if self
            .sweep_active
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Ok(None);
        }

        let result = self.run_sweep().await;
        self.sweep_active.store(false, Ordering::SeqCst);
        result.map(Some)
    }

    /// One full catalog sweep, guard already held
    async fn run_sweep(&self) -> Result<SweepSummary> {
        info!("Starting catalog sweep");

        let run_id = match db::sync_runs::create_run(&self.db).await {
            Ok(id) => id,
            Err(e) => {
                // Audit log unavailable; record the aborted sweep best-effort
                if let Err(log_err) =
                    db::sync_runs::record_failed_run(&self.db, 0, &e.to_string()).await
                {
                    error!(error = %log_err, "Failed to record aborted sweep");
                }
                return Err(e);
            }
        };

        let mut success_count: i64 = 0;
        let mut fail_count: i64 = 0;

        for (state, districts) in &self.catalog {
            for district in districts {
                match self.resolver.resolve(state, district).await {
                    Ok(Some(_)) => {
                        success_count += 1;
                    }
                    Ok(None) => {
                        warn!(state = %state, district = %district, "Sweep pair resolved to nothing");
                        fail_count += 1;
                    }
                    Err(e) => {
                        error!(state = %state, district = %district, error = %e, "Sweep pair failed");
                        fail_count += 1;
                    }
                }
            }
        }

        let (status, error) = if fail_count == 0 {
            (SyncStatus::Completed, None)
        } else {
            (
                SyncStatus::CompletedWithErrors,
                Some(format!("Failed to update {} districts", fail_count)),
            )
        };

        if let Err(e) =
            db::sync_runs::finish_run(&self.db, &run_id, status, success_count, error.as_deref())
                .await
        {
            error!(run_id = %run_id, error = %e, "Failed to finalize sync run");
            return Err(e);
        }

        info!(
            run_id = %run_id,
            records = success_count,
            failures = fail_count,
            "Catalog sweep complete"
        );

        Ok(SweepSummary {
            run_id,
            status,
            records: success_count,
            failures: fail_count,
        })
    }
}
