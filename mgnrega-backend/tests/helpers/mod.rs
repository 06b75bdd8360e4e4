//! Shared test fixtures: in-memory pools, programmable upstream fakes,
//! a cache backend that always fails.

// Not every test file uses every fixture
#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mgnrega_backend::services::upstream::{UpstreamError, UpstreamFetch};
use serde_json::Value;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Fresh in-memory database with the service schema.
/// Single connection so every query sees the same :memory: instance.
pub async fn test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect(":memory:")
        .await
        .unwrap();

    mgnrega_backend::db::init_tables(&pool).await.unwrap();
    pool
}

/// Backdate a stored record so it reads as stale
pub async fn set_last_updated(
    pool: &SqlitePool,
    state: &str,
    district: &str,
    when: DateTime<Utc>,
) {
    sqlx::query("UPDATE district_data SET last_updated = ? WHERE state_name = ? AND district_name = ?")
        .bind(when)
        .bind(state)
        .bind(district)
        .execute(pool)
        .await
        .unwrap();
}

/// What the fake upstream answers for a pair with no programmed response
#[derive(Clone)]
pub enum FakeResponse {
    Record(Value),
    Absent,
    Error,
}

/// Programmable upstream with a call counter
pub struct FakeUpstream {
    responses: Mutex<HashMap<(String, String), FakeResponse>>,
    default: FakeResponse,
    calls: AtomicUsize,
    delay: Option<Duration>,
}

impl FakeUpstream {
    /// Answers `Absent` for anything not programmed
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(HashMap::new()),
            default: FakeResponse::Absent,
            calls: AtomicUsize::new(0),
            delay: None,
        }
    }

    /// Simulates a dead upstream: every call errors
    pub fn failing() -> Self {
        Self {
            responses: Mutex::new(HashMap::new()),
            default: FakeResponse::Error,
            calls: AtomicUsize::new(0),
            delay: None,
        }
    }

    /// Add per-call latency, for overlap tests
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn insert(&self, state: &str, district: &str, value: Value) {
        self.responses
            .lock()
            .unwrap()
            .insert((state.to_string(), district.to_string()), FakeResponse::Record(value));
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl UpstreamFetch for FakeUpstream {
    async fn fetch_one(
        &self,
        state_name: &str,
        district_name: &str,
    ) -> Result<Option<Value>, UpstreamError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let response = self
            .responses
            .lock()
            .unwrap()
            .get(&(state_name.to_string(), district_name.to_string()))
            .cloned()
            .unwrap_or_else(|| self.default.clone());

        match response {
            FakeResponse::Record(value) => Ok(Some(value)),
            FakeResponse::Absent => Ok(None),
            FakeResponse::Error => Err(UpstreamError::Network("simulated outage".to_string())),
        }
    }
}

/// Cache backend where every operation fails
pub struct BrokenCache;

#[async_trait]
impl mgnrega_backend::services::cache::CacheBackend for BrokenCache {
    async fn get(&self, _key: &str) -> anyhow::Result<Option<String>> {
        anyhow::bail!("cache backend down")
    }

    async fn set(&self, _key: &str, _value: String, _ttl_secs: u64) -> anyhow::Result<()> {
        anyhow::bail!("cache backend down")
    }
}
