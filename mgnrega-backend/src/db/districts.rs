//! Catalog store operations
//!
//! All callers pass already-canonicalized names; nothing in this module
//! normalizes. At most one row exists per (state_name, district_name) pair,
//! enforced by the table's UNIQUE constraint.

use crate::models::DistrictRecord;
use chrono::Utc;
use mgnrega_common::Result;
use serde_json::Value;
use sqlx::{Pool, Sqlite};

/// Look up the stored record for a canonical (state, district) pair
pub async fn find_by_key(
    db: &Pool<Sqlite>,
    state_name: &str,
    district_name: &str,
) -> Result<Option<DistrictRecord>> {
    let record = sqlx::query_as::<_, DistrictRecord>(
        "SELECT id, state_name, district_name, district_code, data, last_updated \
         FROM district_data WHERE state_name = ? AND district_name = ?",
    )
    .bind(state_name)
    .bind(district_name)
    .fetch_optional(db)
    .await?;

    Ok(record)
}

/// Insert or update the record for a canonical pair, stamping last_updated
/// with the current time. A NULL incoming district_code never clobbers a
/// previously stored one.
pub async fn upsert(
    db: &Pool<Sqlite>,
    state_name: &str,
    district_name: &str,
    data: &Value,
    district_code: Option<&str>,
) -> Result<DistrictRecord> {
    let now = Utc::now();
    let payload = data.to_string();

    sqlx::query(
        r#"
        INSERT INTO district_data (state_name, district_name, district_code, data, last_updated)
        VALUES (?, ?, ?, ?, ?)
        ON CONFLICT(state_name, district_name) DO UPDATE SET
            data = excluded.data,
            last_updated = excluded.last_updated,
            district_code = COALESCE(excluded.district_code, district_data.district_code)
        "#,
    )
    .bind(state_name)
    .bind(district_name)
    .bind(district_code)
    .bind(&payload)
    .bind(now)
    .execute(db)
    .await?;

    let record = find_by_key(db, state_name, district_name).await?.ok_or_else(|| {
        mgnrega_common::Error::Internal(format!(
            "upserted row missing for {}/{}",
            state_name, district_name
        ))
    })?;

    Ok(record)
}

/// Distinct states with stored data, ascending
pub async fn list_states(db: &Pool<Sqlite>) -> Result<Vec<String>> {
    let rows = sqlx::query_scalar::<_, String>(
        "SELECT DISTINCT state_name FROM district_data ORDER BY state_name ASC",
    )
    .fetch_all(db)
    .await?;

    Ok(rows)
}

/// District names stored for a state, ascending
pub async fn list_districts(db: &Pool<Sqlite>, state_name: &str) -> Result<Vec<String>> {
    let rows = sqlx::query_scalar::<_, String>(
        "SELECT district_name FROM district_data WHERE state_name = ? \
         ORDER BY district_name ASC",
    )
    .bind(state_name)
    .fetch_all(db)
    .await?;

    Ok(rows)
}
