//! Catalog store tests: composite-key uniqueness under repeated upserts,
//! code preservation, listing order.

mod helpers;

use helpers::test_pool;
use mgnrega_backend::db::districts;
use serde_json::json;

#[tokio::test]
async fn upserting_same_pair_twice_keeps_one_row_with_latest_payload() {
    let pool = test_pool().await;

    let first = districts::upsert(&pool, "JHARKHAND", "RANCHI", &json!({"v": 1}), None)
        .await
        .unwrap();
    let second = districts::upsert(&pool, "JHARKHAND", "RANCHI", &json!({"v": 2}), None)
        .await
        .unwrap();

    let row_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM district_data")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(row_count, 1);

    assert_eq!(second.data_value()["v"], 2);
    assert!(second.last_updated >= first.last_updated);
    assert_eq!(second.id, first.id);
}

#[tokio::test]
async fn upsert_without_code_preserves_stored_code() {
    let pool = test_pool().await;

    districts::upsert(&pool, "JHARKHAND", "RANCHI", &json!({"v": 1}), Some("123"))
        .await
        .unwrap();
    let updated = districts::upsert(&pool, "JHARKHAND", "RANCHI", &json!({"v": 2}), None)
        .await
        .unwrap();

    assert_eq!(updated.district_code.as_deref(), Some("123"));
}

#[tokio::test]
async fn same_district_name_in_two_states_is_two_rows() {
    let pool = test_pool().await;

    districts::upsert(&pool, "JHARKHAND", "AURANGABAD", &json!({"s": "jh"}), None)
        .await
        .unwrap();
    districts::upsert(&pool, "BIHAR", "AURANGABAD", &json!({"s": "br"}), None)
        .await
        .unwrap();

    let jh = districts::find_by_key(&pool, "JHARKHAND", "AURANGABAD")
        .await
        .unwrap()
        .unwrap();
    let br = districts::find_by_key(&pool, "BIHAR", "AURANGABAD")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(jh.data_value()["s"], "jh");
    assert_eq!(br.data_value()["s"], "br");
}

#[tokio::test]
async fn missing_pair_reads_as_none() {
    let pool = test_pool().await;
    let record = districts::find_by_key(&pool, "JHARKHAND", "NOWHERE").await.unwrap();
    assert!(record.is_none());
}

#[tokio::test]
async fn listings_are_sorted_ascending() {
    let pool = test_pool().await;

    for (state, district) in [
        ("JHARKHAND", "RANCHI"),
        ("JHARKHAND", "BOKARO"),
        ("BIHAR", "PATNA"),
    ] {
        districts::upsert(&pool, state, district, &json!({}), None)
            .await
            .unwrap();
    }

    assert_eq!(
        districts::list_states(&pool).await.unwrap(),
        vec!["BIHAR".to_string(), "JHARKHAND".to_string()]
    );
    assert_eq!(
        districts::list_districts(&pool, "JHARKHAND").await.unwrap(),
        vec!["BOKARO".to_string(), "RANCHI".to_string()]
    );
    assert!(districts::list_districts(&pool, "KERALA").await.unwrap().is_empty());
}
