//! Database query functions for `plantings` and `planting_members`.

use anyhow::{Context, Result, bail};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{NewPlanting, Planting, PlantingMember, PlantingUpdate};

/// Insert a planting and its species members in one transaction. New
/// plantings are active; a planned end date does not deactivate them.
pub async fn insert_planting(pool: &PgPool, new: &NewPlanting) -> Result<Planting> {
    if new.members.is_empty() {
        bail!("a planting needs at least one species");
    }

    let mut tx = pool.begin().await.context("failed to begin transaction")?;

    let planting = sqlx::query_as::<_, Planting>(
        "INSERT INTO plantings (bed_id, start_date, end_date, start_type, notes) \
         VALUES ($1, $2, $3, $4, $5) \
         RETURNING *",
    )
    .bind(new.bed_id)
    .bind(new.start_date)
    .bind(new.end_date)
    .bind(new.start_type)
    .bind(&new.notes)
    .fetch_one(&mut *tx)
    .await
    .context("failed to insert planting")?;

    for member in &new.members {
        sqlx::query(
            "INSERT INTO planting_members (planting_id, plant_id, quantity_planted, quantity_grown) \
             VALUES ($1, $2, $3, $4)",
        )
        .bind(planting.id)
        .bind(member.plant_id)
        .bind(member.quantity_planted)
        .bind(member.quantity_grown)
        .execute(&mut *tx)
        .await
        .with_context(|| format!("failed to add plant {} to planting", member.plant_id))?;
    }

    tx.commit().await.context("failed to commit transaction")?;

    Ok(planting)
}

pub async fn get_planting(pool: &PgPool, id: Uuid) -> Result<Option<Planting>> {
    let planting = sqlx::query_as::<_, Planting>("SELECT * FROM plantings WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("failed to fetch planting")?;

    Ok(planting)
}

/// List plantings, newest start first.
pub async fn list_plantings(pool: &PgPool, active_only: bool) -> Result<Vec<Planting>> {
    let plantings = sqlx::query_as::<_, Planting>(
        "SELECT * FROM plantings \
         WHERE ($1 = false OR is_active) \
         ORDER BY start_date DESC, created_at DESC",
    )
    .bind(active_only)
    .fetch_all(pool)
    .await
    .context("failed to list plantings")?;

    Ok(plantings)
}

pub async fn list_plantings_for_bed(pool: &PgPool, bed_id: Uuid) -> Result<Vec<Planting>> {
    let plantings = sqlx::query_as::<_, Planting>(
        "SELECT * FROM plantings WHERE bed_id = $1 ORDER BY start_date",
    )
    .bind(bed_id)
    .fetch_all(pool)
    .await
    .context("failed to list plantings for bed")?;

    Ok(plantings)
}

pub async fn list_members(pool: &PgPool, planting_id: Uuid) -> Result<Vec<PlantingMember>> {
    let members = sqlx::query_as::<_, PlantingMember>(
        "SELECT * FROM planting_members WHERE planting_id = $1",
    )
    .bind(planting_id)
    .fetch_all(pool)
    .await
    .context("failed to list planting members")?;

    Ok(members)
}

/// Apply a [`PlantingUpdate`] under a row lock. Returns `None` when the
/// planting does not exist.
pub async fn update_planting(
    pool: &PgPool,
    id: Uuid,
    update: &PlantingUpdate,
) -> Result<Option<Planting>> {
    let mut tx = pool.begin().await.context("failed to begin transaction")?;

    let current = sqlx::query_as::<_, Planting>("SELECT * FROM plantings WHERE id = $1 FOR UPDATE")
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .context("failed to lock planting")?;

    let Some(mut planting) = current else {
        return Ok(None);
    };
    update.apply(&mut planting);

    let updated = sqlx::query_as::<_, Planting>(
        "UPDATE plantings \
         SET start_date = $2, end_date = $3, start_type = $4, notes = $5, is_active = $6 \
         WHERE id = $1 \
         RETURNING *",
    )
    .bind(id)
    .bind(planting.start_date)
    .bind(planting.end_date)
    .bind(planting.start_type)
    .bind(&planting.notes)
    .bind(planting.is_active)
    .fetch_one(&mut *tx)
    .await
    .context("failed to update planting")?;

    tx.commit().await.context("failed to commit transaction")?;

    Ok(Some(updated))
}
