//! data.gov.in statistics API client
//!
//! Queries the open-data endpoint for a single best-match record per
//! (state, district) pair, with request shaping that respects the API's
//! rate sensitivity. The query string is built by hand because the endpoint
//! distinguishes `%20` from `+` in filter values; serde-style form encoding
//! would produce the latter.

use async_trait::async_trait;
use mgnrega_common::Config;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::Mutex;

/// Upstream client errors, distinct from a clean "no record" absence
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error {0}: {1}")]
    Api(u16, String),

    #[error("Parse error: {0}")]
    Parse(String),
}

/// Seam for fetching one district's record; production uses
/// [`DataGovClient`], tests substitute counting or failing fakes.
#[async_trait]
pub trait UpstreamFetch: Send + Sync {
    /// Fetch the single best-match record for a canonical (state, district)
    /// pair. `Ok(None)` means the upstream has no record for the query.
    async fn fetch_one(
        &self,
        state_name: &str,
        district_name: &str,
    ) -> Result<Option<Value>, UpstreamError>;
}

/// JSON envelope returned by the resource endpoint
#[derive(Debug, Deserialize)]
struct ResourceEnvelope {
    #[serde(default)]
    records: Vec<Value>,
}

/// Rate limiter enforcing a minimum interval between requests
struct RateLimiter {
    last_request: Mutex<Option<Instant>>,
    min_interval: Duration,
}

impl RateLimiter {
    fn new(min_interval_ms: u64) -> Self {
        Self {
            last_request: Mutex::new(None),
            min_interval: Duration::from_millis(min_interval_ms),
        }
    }

    /// Wait if necessary to comply with the rate limit
    async fn wait(&self) {
        let mut last = self.last_request.lock().await;

        if let Some(last_time) = *last {
            let elapsed = last_time.elapsed();
            if elapsed < self.min_interval {
                let wait_time = self.min_interval - elapsed;
                tracing::debug!("Rate limiting: waiting {:?}", wait_time);
                tokio::time::sleep(wait_time).await;
            }
        }

        *last = Some(Instant::now());
    }
}

/// data.gov.in resource endpoint client
pub struct DataGovClient {
    http_client: reqwest::Client,
    base_url: String,
    api_key: String,
    rate_limiter: Arc<RateLimiter>,
}

impl DataGovClient {
    pub fn new(config: &Config) -> mgnrega_common::Result<Self> {
        let api_key = config.require_api_key()?.to_string();

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| mgnrega_common::Error::Config(format!("HTTP client build failed: {}", e)))?;

        Ok(Self {
            http_client,
            base_url: config.api_url.clone(),
            api_key,
            rate_limiter: Arc::new(RateLimiter::new(config.upstream_min_interval_ms)),
        })
    }

    /// Build the query string by hand so spaces encode as `%20`
    fn build_query(&self, state_name: &str, district_name: &str) -> String {
        let params = [
            ("api-key", self.api_key.as_str()),
            ("format", "json"),
            ("filters[state_name]", state_name),
            ("filters[district_name]", district_name),
            ("limit", "1"),
        ];

        params
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&")
    }
}

#[async_trait]
impl UpstreamFetch for DataGovClient {
    async fn fetch_one(
        &self,
        state_name: &str,
        district_name: &str,
    ) -> Result<Option<Value>, UpstreamError> {
        self.rate_limiter.wait().await;

        let url = format!("{}?{}", self.base_url, self.build_query(state_name, district_name));

        // Never log the full URL, it carries the API key
        tracing::debug!(state = %state_name, district = %district_name, "Querying upstream API");

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| UpstreamError::Network(e.to_string()))?;

        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let snippet: String = body.chars().take(500).collect();
            return Err(UpstreamError::Api(status.as_u16(), snippet));
        }

        let envelope: ResourceEnvelope = response
            .json()
            .await
            .map_err(|e| UpstreamError::Parse(e.to_string()))?;

        let record = envelope.records.into_iter().next();

        tracing::debug!(
            state = %state_name,
            district = %district_name,
            found = record.is_some(),
            "Upstream query complete"
        );

        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> DataGovClient {
        let mut config = Config::default();
        config.api_key = Some("test-key".to_string());
        DataGovClient::new(&config).unwrap()
    }

    #[test]
    fn client_requires_api_key() {
        let config = Config::default();
        assert!(DataGovClient::new(&config).is_err());
    }

    #[test]
    fn query_encodes_spaces_as_percent_20() {
        let query = client().build_query("JHARKHAND", "EAST SINGHBUM");
        assert!(query.contains("filters%5Bdistrict_name%5D=EAST%20SINGHBUM"));
        assert!(!query.contains('+'));
        assert!(query.contains("limit=1"));
        assert!(query.contains("format=json"));
    }

    #[test]
    fn empty_envelope_deserializes() {
        let envelope: ResourceEnvelope = serde_json::from_str(r#"{"total": 0}"#).unwrap();
        assert!(envelope.records.is_empty());
    }

    #[tokio::test]
    async fn rate_limiter_spaces_requests() {
        let limiter = RateLimiter::new(200);

        let start = Instant::now();
        limiter.wait().await;
        let first_elapsed = start.elapsed();

        limiter.wait().await;
        let second_elapsed = start.elapsed();

        assert!(first_elapsed < Duration::from_millis(100));
        assert!(second_elapsed >= Duration::from_millis(180));
    }
}
