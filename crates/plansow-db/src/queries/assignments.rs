//! Database query functions for the `maintenance_assignments` table.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{
    MaintenanceAssignment, MaintenanceAssignmentRow, NewAssignment, ScheduledEvent,
};
use crate::queries::events::insert_event_on;

/// Insert an assignment and its expanded events in one transaction.
///
/// Dates that already hold an event for the same planting and template are
/// skipped, so the returned list may be shorter than `dates`.
pub async fn insert_assignment_with_events(
    pool: &PgPool,
    new: &NewAssignment,
    dates: &[NaiveDate],
) -> Result<(MaintenanceAssignment, Vec<ScheduledEvent>)> {
    let mut tx = pool.begin().await.context("failed to begin transaction")?;

    let row = sqlx::query_as::<_, MaintenanceAssignmentRow>(
        "INSERT INTO maintenance_assignments \
             (planting_id, treatment_id, care_action_id, anchor_date, frequency_days, notes) \
         VALUES ($1, $2, $3, $4, $5, $6) \
         RETURNING *",
    )
    .bind(new.planting_id)
    .bind(new.template.treatment_id())
    .bind(new.template.care_action_id())
    .bind(new.anchor_date)
    .bind(new.frequency_days)
    .bind(&new.notes)
    .fetch_one(&mut *tx)
    .await
    .context("failed to insert maintenance assignment")?;

    let assignment = MaintenanceAssignment::try_from(row)
        .context("maintenance assignment row is malformed")?;

    let mut created = Vec::with_capacity(dates.len());
    for &date in dates {
        if let Some(event) = insert_event_on(
            &mut tx,
            new.planting_id,
            Some(assignment.id),
            new.template,
            date,
            new.notes.as_deref(),
        )
        .await?
        {
            created.push(event);
        }
    }

    // Dropping `tx` without commit rolls back on any error above.
    tx.commit().await.context("failed to commit transaction")?;

    Ok((assignment, created))
}

pub async fn list_assignments_for_planting(
    pool: &PgPool,
    planting_id: Uuid,
) -> Result<Vec<MaintenanceAssignment>> {
    let rows = sqlx::query_as::<_, MaintenanceAssignmentRow>(
        "SELECT * FROM maintenance_assignments \
         WHERE planting_id = $1 \
         ORDER BY anchor_date, created_at",
    )
    .bind(planting_id)
    .fetch_all(pool)
    .await
    .context("failed to list maintenance assignments")?;

    rows.into_iter()
        .map(|row| {
            let id = row.id;
            MaintenanceAssignment::try_from(row)
                .with_context(|| format!("maintenance assignment {id} is malformed"))
        })
        .collect()
}
