//! District and state endpoints
//!
//! Thin glue over the resolver and catalog store. List responses are
//! cached with the long aggregate TTL; absence maps to 404 with enough
//! context to debug a misspelled district name.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;

use crate::db;
use crate::error::ApiResult;
use crate::services::cache::LIST_TTL_SECS;
use crate::services::normalize::normalize;
use crate::AppState;

/// GET /api/states
pub async fn list_states(State(state): State<AppState>) -> ApiResult<Json<Vec<String>>> {
    if let Some(cached) = state.cache.get_json("states").await {
        if let Ok(states) = serde_json::from_value::<Vec<String>>(cached) {
            return Ok(Json(states));
        }
    }

    let states = db::districts::list_states(&state.db).await?;
    state
        .cache
        .set_json("states", &json!(states), LIST_TTL_SECS)
        .await;

    Ok(Json(states))
}

/// GET /api/districts/:state
pub async fn list_districts(
    State(state): State<AppState>,
    Path(state_name): Path<String>,
) -> ApiResult<Response> {
    let canonical = normalize(&state_name);
    let cache_key = format!("districts:{}", canonical);

    if let Some(cached) = state.cache.get_json(&cache_key).await {
        if let Ok(districts) = serde_json::from_value::<Vec<String>>(cached) {
            return Ok(Json(districts).into_response());
        }
    }

    let districts = db::districts::list_districts(&state.db, &canonical).await?;

    if districts.is_empty() {
        return Ok((
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": {
                    "code": "NOT_FOUND",
                    "message": format!("No districts stored for state {}", canonical),
                    "state": canonical,
                }
            })),
        )
            .into_response());
    }

    state
        .cache
        .set_json(&cache_key, &json!(districts), LIST_TTL_SECS)
        .await;

    Ok(Json(districts).into_response())
}

/// GET /api/district/:state/:district
///
/// Full resolution through the pipeline. The 404 body names the canonical
/// forms that were attempted and the districts actually available for the
/// state, mirroring what callers need to correct their query.
pub async fn district_data(
    State(state): State<AppState>,
    Path((state_name, district_name)): Path<(String, String)>,
) -> ApiResult<Response> {
    let data = state.resolver.resolve(&state_name, &district_name).await?;

    match data {
        Some(payload) => Ok(Json(payload).into_response()),
        None => {
            let canonical_state = normalize(&state_name);
            let canonical_district = normalize(&district_name);
            let available = db::districts::list_districts(&state.db, &canonical_state)
                .await
                .unwrap_or_default();

            Ok((
                StatusCode::NOT_FOUND,
                Json(json!({
                    "error": {
                        "code": "NOT_FOUND",
                        "message": "No data found after exhausting canonical and alias forms",
                        "state": canonical_state,
                        "district": canonical_district,
                        "available_districts": available,
                    }
                })),
            )
                .into_response())
        }
    }
}

/// Build district routes
pub fn district_routes() -> Router<AppState> {
    Router::new()
        .route("/api/states", get(list_states))
        .route("/api/districts/:state", get(list_districts))
        .route("/api/district/:state/:district", get(district_data))
}
