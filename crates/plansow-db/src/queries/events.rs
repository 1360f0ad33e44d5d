//! Database query functions for the `scheduled_events` table.
//!
//! Rows are decoded through [`ScheduledEventRow`] so a row that breaks the
//! "exactly one template" rule surfaces as an [`EventKindError`] in the
//! error chain rather than as a half-built event.
//!
//! [`EventKindError`]: crate::models::EventKindError

use anyhow::{Context, Result};
use chrono::NaiveDate;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::models::{
    EventFilter, EventKind, EventStatus, NewEvent, ScheduledEvent, ScheduledEventRow,
};

pub(crate) fn decode_event(row: ScheduledEventRow) -> Result<ScheduledEvent> {
    let id = row.id;
    ScheduledEvent::try_from(row).with_context(|| format!("scheduled event {id} is malformed"))
}

fn decode_events(rows: Vec<ScheduledEventRow>) -> Result<Vec<ScheduledEvent>> {
    rows.into_iter().map(decode_event).collect()
}

/// Insert one event on an open connection. Returns `None` when an event for
/// the same planting, template and date already exists.
pub(crate) async fn insert_event_on(
    conn: &mut PgConnection,
    planting_id: Uuid,
    assignment_id: Option<Uuid>,
    kind: EventKind,
    scheduled_date: NaiveDate,
    notes: Option<&str>,
) -> Result<Option<ScheduledEvent>> {
    let row = sqlx::query_as::<_, ScheduledEventRow>(
        "INSERT INTO scheduled_events \
             (planting_id, assignment_id, treatment_id, care_action_id, scheduled_date, notes) \
         VALUES ($1, $2, $3, $4, $5, $6) \
         ON CONFLICT DO NOTHING \
         RETURNING *",
    )
    .bind(planting_id)
    .bind(assignment_id)
    .bind(kind.treatment_id())
    .bind(kind.care_action_id())
    .bind(scheduled_date)
    .bind(notes)
    .fetch_optional(&mut *conn)
    .await
    .with_context(|| format!("failed to insert {kind} event on {scheduled_date}"))?;

    row.map(decode_event).transpose()
}

/// Insert free-standing events in one transaction, skipping dates that are
/// already scheduled. Returns only the rows actually created.
pub async fn insert_events(pool: &PgPool, events: &[NewEvent]) -> Result<Vec<ScheduledEvent>> {
    let mut tx = pool.begin().await.context("failed to begin transaction")?;

    let mut created = Vec::with_capacity(events.len());
    for event in events {
        if let Some(row) = insert_event_on(
            &mut tx,
            event.planting_id,
            None,
            event.kind,
            event.scheduled_date,
            event.notes.as_deref(),
        )
        .await?
        {
            created.push(row);
        }
    }

    tx.commit().await.context("failed to commit transaction")?;

    Ok(created)
}

pub async fn get_event(pool: &PgPool, id: Uuid) -> Result<Option<ScheduledEvent>> {
    let row = sqlx::query_as::<_, ScheduledEventRow>("SELECT * FROM scheduled_events WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("failed to fetch scheduled event")?;

    row.map(decode_event).transpose()
}

/// List events matching `filter`, ordered by date then creation time.
pub async fn list_events(pool: &PgPool, filter: &EventFilter) -> Result<Vec<ScheduledEvent>> {
    let completed = filter.status.map(|s| s == EventStatus::Completed);

    let rows = sqlx::query_as::<_, ScheduledEventRow>(
        "SELECT e.* FROM scheduled_events e \
         JOIN plantings p ON p.id = e.planting_id \
         WHERE ($1::date IS NULL OR e.scheduled_date >= $1) \
           AND ($2::date IS NULL OR e.scheduled_date <= $2) \
           AND ($3::boolean IS NULL OR e.completed = $3) \
           AND ($4::uuid IS NULL OR e.planting_id = $4) \
           AND ($5::uuid IS NULL OR p.bed_id = $5) \
         ORDER BY e.scheduled_date, e.created_at, e.id",
    )
    .bind(filter.from)
    .bind(filter.to)
    .bind(completed)
    .bind(filter.planting_id)
    .bind(filter.bed_id)
    .fetch_all(pool)
    .await
    .context("failed to list scheduled events")?;

    decode_events(rows)
}

/// Mark a pending event completed.
///
/// Guarded with `completed = false`, so `None` means the event is either
/// missing or already completed; callers distinguish with [`get_event`].
pub async fn complete_event(
    pool: &PgPool,
    id: Uuid,
    completed_date: NaiveDate,
) -> Result<Option<ScheduledEvent>> {
    let row = sqlx::query_as::<_, ScheduledEventRow>(
        "UPDATE scheduled_events \
         SET completed = true, completed_date = $2 \
         WHERE id = $1 AND completed = false \
         RETURNING *",
    )
    .bind(id)
    .bind(completed_date)
    .fetch_optional(pool)
    .await
    .context("failed to complete scheduled event")?;

    row.map(decode_event).transpose()
}
