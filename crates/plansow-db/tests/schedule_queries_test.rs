//! Integration tests for maintenance assignments and scheduled events.
//!
//! Need PostgreSQL: either `PLANSOW_TEST_PG_URL` or a Docker daemon for
//! testcontainers. Run with `cargo test -- --ignored`.

use plansow_db::models::{EventFilter, EventKind, EventStatus, NewAssignment, NewEvent};
use plansow_db::queries::{assignments, catalog, events};
use plansow_test_utils::TestDb;
use plansow_test_utils::fixtures::{self, date};

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn assignment_and_events_are_inserted_together() {
    let db = TestDb::create().await;
    let bed = fixtures::bed(&db.pool, "A").await;
    let tomato = fixtures::plant(&db.pool, "Tomato", Some(80), Some(60)).await;
    let planting = fixtures::planting(
        &db.pool,
        bed.id,
        &[tomato.id],
        date(2024, 1, 1),
        Some(date(2024, 1, 22)),
    )
    .await;
    let spray = fixtures::treatment(&db.pool, "Nettle spray", Some(7)).await;

    let dates = [
        date(2024, 1, 1),
        date(2024, 1, 8),
        date(2024, 1, 15),
        date(2024, 1, 22),
    ];
    let new = NewAssignment {
        planting_id: planting.id,
        template: EventKind::Treatment(spray.id),
        anchor_date: date(2024, 1, 1),
        frequency_days: Some(7),
        notes: None,
    };
    let (assignment, created) = assignments::insert_assignment_with_events(&db.pool, &new, &dates)
        .await
        .expect("insert");
    assert_eq!(assignment.template, EventKind::Treatment(spray.id));
    assert_eq!(created.len(), 4);
    assert!(created.iter().all(|e| e.assignment_id == Some(assignment.id)));

    // Same template and dates again: the assignment is stored, the events
    // are not duplicated.
    let (_, again) = assignments::insert_assignment_with_events(&db.pool, &new, &dates)
        .await
        .expect("insert again");
    assert!(again.is_empty());

    let listed = events::list_events(
        &db.pool,
        &EventFilter {
            planting_id: Some(planting.id),
            ..Default::default()
        },
    )
    .await
    .expect("list");
    let listed_dates: Vec<_> = listed.iter().map(|e| e.scheduled_date).collect();
    assert_eq!(listed_dates, dates);

    let all = assignments::list_assignments_for_planting(&db.pool, planting.id)
        .await
        .expect("assignments");
    assert_eq!(all.len(), 2);

    db.cleanup().await;
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn complete_event_is_one_way() {
    let db = TestDb::create().await;
    let bed = fixtures::bed(&db.pool, "B").await;
    let bean = fixtures::plant(&db.pool, "Bean", Some(60), None).await;
    let planting = fixtures::planting(&db.pool, bed.id, &[bean.id], date(2024, 3, 1), None).await;
    let water = fixtures::care_action(&db.pool, "Water", None).await;

    let created = events::insert_events(
        &db.pool,
        &[NewEvent {
            planting_id: planting.id,
            kind: EventKind::CareAction(water.id),
            scheduled_date: date(2024, 3, 5),
            notes: None,
        }],
    )
    .await
    .expect("insert events");
    let event = &created[0];

    let done = events::complete_event(&db.pool, event.id, date(2024, 3, 6))
        .await
        .expect("complete")
        .expect("was pending");
    assert!(done.completed);
    assert_eq!(done.completed_date, Some(date(2024, 3, 6)));

    let second = events::complete_event(&db.pool, event.id, date(2024, 3, 7))
        .await
        .expect("complete");
    assert!(second.is_none(), "already completed events are not updated");

    let stored = events::get_event(&db.pool, event.id)
        .await
        .expect("get")
        .expect("exists");
    assert_eq!(stored.completed_date, Some(date(2024, 3, 6)));

    db.cleanup().await;
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn list_events_filters_by_bed_status_and_range() {
    let db = TestDb::create().await;
    let north = fixtures::bed(&db.pool, "North").await;
    let south = fixtures::bed(&db.pool, "South").await;
    let leek = fixtures::plant(&db.pool, "Leek", Some(120), None).await;
    let p1 = fixtures::planting(&db.pool, north.id, &[leek.id], date(2024, 3, 1), None).await;
    let p2 = fixtures::planting(&db.pool, south.id, &[leek.id], date(2024, 3, 1), None).await;
    let water = fixtures::care_action(&db.pool, "Water", None).await;
    let kind = EventKind::CareAction(water.id);

    let mut batch = Vec::new();
    for planting in [&p1, &p2] {
        for day in [2, 10, 20] {
            batch.push(NewEvent {
                planting_id: planting.id,
                kind,
                scheduled_date: date(2024, 3, day),
                notes: None,
            });
        }
    }
    let created = events::insert_events(&db.pool, &batch).await.expect("insert");
    assert_eq!(created.len(), 6);
    events::complete_event(&db.pool, created[0].id, date(2024, 3, 2))
        .await
        .expect("complete");

    let north_pending = events::list_events(
        &db.pool,
        &EventFilter {
            bed_id: Some(north.id),
            status: Some(EventStatus::Pending),
            ..Default::default()
        },
    )
    .await
    .expect("list");
    assert_eq!(north_pending.len(), 2);
    assert!(north_pending.iter().all(|e| e.planting_id == p1.id));

    let window = events::list_events(
        &db.pool,
        &EventFilter {
            from: Some(date(2024, 3, 10)),
            to: Some(date(2024, 3, 10)),
            ..Default::default()
        },
    )
    .await
    .expect("list");
    assert_eq!(window.len(), 2);

    let template = catalog::get_template(&db.pool, kind)
        .await
        .expect("template")
        .expect("exists");
    assert_eq!(template.name, "Water");

    db.cleanup().await;
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn malformed_event_row_surfaces_kind_error() {
    let db = TestDb::create().await;
    let bed = fixtures::bed(&db.pool, "C").await;
    let leek = fixtures::plant(&db.pool, "Leek", Some(120), None).await;
    let planting = fixtures::planting(&db.pool, bed.id, &[leek.id], date(2024, 3, 1), None).await;

    // Drop the guard so a broken row can be written directly.
    sqlx::query("ALTER TABLE scheduled_events DROP CONSTRAINT chk_event_kind")
        .execute(&db.pool)
        .await
        .expect("drop constraint");
    let id: (uuid::Uuid,) = sqlx::query_as(
        "INSERT INTO scheduled_events (planting_id, scheduled_date) VALUES ($1, $2) RETURNING id",
    )
    .bind(planting.id)
    .bind(date(2024, 3, 3))
    .fetch_one(&db.pool)
    .await
    .expect("insert broken row");

    let err = events::get_event(&db.pool, id.0)
        .await
        .expect_err("decoding should fail");
    assert!(
        err.chain()
            .any(|c| c.downcast_ref::<plansow_db::models::EventKindError>().is_some())
    );

    db.cleanup().await;
}
