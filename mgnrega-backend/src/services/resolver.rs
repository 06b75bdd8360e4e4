//! Tiered district data resolution
//!
//! Answers "give me current data for (state, district)" by consulting, in
//! order: the look-aside cache, the catalog store (subject to the freshness
//! policy), and the upstream API. Upstream failure degrades to the best
//! available stored data; absence after exhausting canonical, alias and
//! stale-fallback paths is a valid terminal result, not an error.

use crate::db;
use crate::services::cache::{LookAsideCache, DETAIL_TTL_SECS};
use crate::services::freshness::is_fresh;
use crate::services::normalize::{normalize, NameTable};
use crate::services::upstream::UpstreamFetch;
use chrono::Utc;
use mgnrega_common::Result;
use serde_json::Value;
use sqlx::{Pool, Sqlite};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Cache key for one district's payload
fn cache_key(state_name: &str, district_name: &str) -> String {
    format!("district:{}:{}", state_name, district_name)
}

/// District code as stored upstream; arrives as either a string or a number
fn extract_district_code(data: &Value) -> Option<String> {
    match data.get("district_code") {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}

/// Composes normalization, freshness, cache, store and upstream into the
/// resolution pipeline. Holds no record state of its own; the catalog store
/// owns every row.
pub struct DistrictResolver {
    db: Pool<Sqlite>,
    cache: LookAsideCache,
    upstream: Arc<dyn UpstreamFetch>,
    names: Arc<NameTable>,
}

impl DistrictResolver {
    pub fn new(
        db: Pool<Sqlite>,
        cache: LookAsideCache,
        upstream: Arc<dyn UpstreamFetch>,
        names: Arc<NameTable>,
    ) -> Self {
        Self {
            db,
            cache,
            upstream,
            names,
        }
    }

    /// Resolve current data for a (state, district) pair.
    ///
    /// Names are canonicalized and alias-resolved first; if the canonical
    /// path produces nothing, each configured spelling variant is retried
    /// through the same pipeline in configured order. `Ok(None)` means no
    /// data after exhausting every path. Storage errors propagate; nothing
    /// else does.
    pub async fn resolve(&self, state_name: &str, district_name: &str) -> Result<Option<Value>> {
        let state = normalize(state_name);
        let district = self.names.resolve_alias(&normalize(district_name));

        if state.is_empty() || district.is_empty() {
            return Ok(None);
        }

        if let Some(data) = self.resolve_canonical(&state, &district).await? {
            return Ok(Some(data));
        }

        for variant in self.names.fallback_variants(&district) {
            debug!(state = %state, district = %district, variant = %variant, "Retrying with name variant");
            if let Some(data) = self.resolve_canonical(&state, &variant).await? {
                return Ok(Some(data));
            }
        }

        Ok(None)
    }

    /// One pass of the pipeline for an already-canonical pair
    async fn resolve_canonical(&self, state: &str, district: &str) -> Result<Option<Value>> {
        let key = cache_key(state, district);

        // Tier 1: look-aside cache, pre-validated fresh at write time
        if let Some(data) = self.cache.get_json(&key).await {
            debug!(state = %state, district = %district, "Serving from cache");
            return Ok(Some(data));
        }

        // Tier 2: catalog store; a stale row is kept as fallback
        let stored = db::districts::find_by_key(&self.db, state, district).await?;

        if let Some(record) = &stored {
            if is_fresh(record.last_updated, Utc::now()) {
                debug!(state = %state, district = %district, "Serving fresh record from store");
                let data = record.data_value();
                self.cache.set_json(&key, &data, DETAIL_TTL_SECS).await;
                return Ok(Some(data));
            }
        }

        // Tier 3: upstream refresh
        match self.upstream.fetch_one(state, district).await {
            Ok(Some(data)) => {
                let code = extract_district_code(&data);
                db::districts::upsert(&self.db, state, district, &data, code.as_deref()).await?;
                self.cache.set_json(&key, &data, DETAIL_TTL_SECS).await;
                info!(state = %state, district = %district, "Refreshed from upstream");
                Ok(Some(data))
            }
            Ok(None) => {
                if let Some(record) = stored {
                    debug!(state = %state, district = %district, "Upstream has no record, serving stale data");
                    return Ok(Some(record.data_value()));
                }
                Ok(None)
            }
            Err(e) => {
                warn!(state = %state, district = %district, error = %e, "Upstream fetch failed");
                if let Some(record) = stored {
                    info!(state = %state, district = %district, "Serving stale data after upstream failure");
                    return Ok(Some(record.data_value()));
                }
                Ok(None)
            }
        }
    }
}
