//! Integration tests for migrations and connection pooling.
//!
//! Need PostgreSQL: either `PLANSOW_TEST_PG_URL` or a Docker daemon for
//! testcontainers. Run with `cargo test -- --ignored`.

use sqlx::Row;
use uuid::Uuid;

use plansow_db::config::DbConfig;
use plansow_db::pool;
use plansow_test_utils::{TestDb, pg_url};

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn migrations_create_all_tables() {
    let db = TestDb::create().await;

    let counts = pool::table_counts(&db.pool)
        .await
        .expect("table_counts should succeed");
    let names: Vec<&str> = counts.iter().map(|(name, _)| *name).collect();
    assert_eq!(names, pool::GARDEN_TABLES);
    assert!(counts.iter().all(|(_, count)| *count == 0));

    db.cleanup().await;
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn table_counts_reports_garden_rows_and_missing_tables() {
    use plansow_test_utils::fixtures;

    let db = TestDb::create().await;
    fixtures::bed(&db.pool, "North").await;
    fixtures::bed(&db.pool, "South").await;

    let counts = pool::table_counts(&db.pool).await.expect("counts");
    assert!(counts.contains(&("beds", 2)));
    assert!(counts.contains(&("pests", 0)));

    sqlx::query("DROP TABLE plant_pests")
        .execute(&db.pool)
        .await
        .expect("drop table");
    let err = pool::table_counts(&db.pool).await.unwrap_err();
    assert!(err.to_string().contains("plant_pests"));

    db.cleanup().await;
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn migrations_are_idempotent() {
    let db = TestDb::create().await;

    pool::run_migrations(&db.pool)
        .await
        .expect("second migration run should be a no-op");

    let row = sqlx::query("SELECT COUNT(*) AS cnt FROM scheduled_events")
        .fetch_one(&db.pool)
        .await
        .expect("count events");
    let count: i64 = row.get("cnt");
    assert_eq!(count, 0);

    db.cleanup().await;
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn event_kind_check_rejects_both_references() {
    use plansow_test_utils::fixtures::{self, date};

    let db = TestDb::create().await;
    let bed = fixtures::bed(&db.pool, "North").await;
    let tomato = fixtures::plant(&db.pool, "Tomato", Some(80), Some(60)).await;
    let planting = fixtures::planting(&db.pool, bed.id, &[tomato.id], date(2024, 1, 1), None).await;
    let spray = fixtures::treatment(&db.pool, "Nettle spray", Some(7)).await;
    let water = fixtures::care_action(&db.pool, "Water", Some(2)).await;

    let result = sqlx::query(
        "INSERT INTO scheduled_events (planting_id, treatment_id, care_action_id, scheduled_date) \
         VALUES ($1, $2, $3, $4)",
    )
    .bind(planting.id)
    .bind(spray.id)
    .bind(water.id)
    .bind(date(2024, 1, 2))
    .execute(&db.pool)
    .await;
    assert!(result.is_err(), "CHECK constraint should reject the row");

    db.cleanup().await;
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn ensure_database_exists_is_idempotent() {
    let name = format!("plansow_test_{}", Uuid::new_v4().simple());
    let config = DbConfig::new(format!("{}/{name}", pg_url().await));

    pool::ensure_database_exists(&config)
        .await
        .expect("first ensure should create the database");
    pool::ensure_database_exists(&config)
        .await
        .expect("second ensure should be a no-op");

    let created = pool::create_pool(&config).await.expect("connect");
    TestDb {
        pool: created,
        name,
    }
    .cleanup()
    .await;
}
