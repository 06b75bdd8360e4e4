//! Row types for the catalog and audit tables

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use sqlx::FromRow;

/// One row of district_data: the latest known metrics blob for a canonical
/// (state_name, district_name) pair.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DistrictRecord {
    pub id: i64,
    pub state_name: String,
    pub district_name: String,
    pub district_code: Option<String>,
    /// Upstream payload as JSON text; schema owned by the upstream source
    pub data: String,
    pub last_updated: DateTime<Utc>,
}

impl DistrictRecord {
    /// Parse the stored payload. A row that somehow holds unparseable text
    /// yields `Value::Null` rather than failing the read path.
    pub fn data_value(&self) -> Value {
        serde_json::from_str(&self.data).unwrap_or(Value::Null)
    }
}

/// Terminal and in-flight states of a sync sweep
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    Running,
    Completed,
    CompletedWithErrors,
    Failed,
    /// Written by manual test scripts, never by the scheduler
    Test,
}

impl SyncStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncStatus::Running => "running",
            SyncStatus::Completed => "completed",
            SyncStatus::CompletedWithErrors => "completed_with_errors",
            SyncStatus::Failed => "failed",
            SyncStatus::Test => "test",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "running" => Some(SyncStatus::Running),
            "completed" => Some(SyncStatus::Completed),
            "completed_with_errors" => Some(SyncStatus::CompletedWithErrors),
            "failed" => Some(SyncStatus::Failed),
            "test" => Some(SyncStatus::Test),
            _ => None,
        }
    }
}

/// One row of sync_runs: the audit record for a catalog sweep
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SyncRun {
    pub run_id: String,
    pub status: String,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    /// Count of successful district updates
    pub records: i64,
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sync_status_round_trips_through_text() {
        for status in [
            SyncStatus::Running,
            SyncStatus::Completed,
            SyncStatus::CompletedWithErrors,
            SyncStatus::Failed,
            SyncStatus::Test,
        ] {
            assert_eq!(SyncStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(SyncStatus::parse("bogus"), None);
    }

    #[test]
    fn unparseable_payload_reads_as_null() {
        let record = DistrictRecord {
            id: 1,
            state_name: "JHARKHAND".to_string(),
            district_name: "RANCHI".to_string(),
            district_code: None,
            data: "not json".to_string(),
            last_updated: Utc::now(),
        };
        assert_eq!(record.data_value(), Value::Null);
    }
}
