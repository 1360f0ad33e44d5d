//! Database query functions for the `beds` table.

use anyhow::{Context, Result};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{Bed, NewBed};

pub async fn insert_bed(pool: &PgPool, bed: &NewBed) -> Result<Bed> {
    let bed = sqlx::query_as::<_, Bed>(
        "INSERT INTO beds (name, description, location) \
         VALUES ($1, $2, $3) \
         RETURNING *",
    )
    .bind(&bed.name)
    .bind(&bed.description)
    .bind(&bed.location)
    .fetch_one(pool)
    .await
    .with_context(|| format!("failed to insert bed {:?}", bed.name))?;

    Ok(bed)
}

pub async fn get_bed(pool: &PgPool, id: Uuid) -> Result<Option<Bed>> {
    let bed = sqlx::query_as::<_, Bed>("SELECT * FROM beds WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("failed to fetch bed")?;

    Ok(bed)
}

pub async fn get_bed_by_name(pool: &PgPool, name: &str) -> Result<Option<Bed>> {
    let bed = sqlx::query_as::<_, Bed>("SELECT * FROM beds WHERE name = $1")
        .bind(name)
        .fetch_optional(pool)
        .await
        .context("failed to fetch bed by name")?;

    Ok(bed)
}

/// List beds ordered by name.
pub async fn list_beds(pool: &PgPool) -> Result<Vec<Bed>> {
    let beds = sqlx::query_as::<_, Bed>("SELECT * FROM beds ORDER BY name")
        .fetch_all(pool)
        .await
        .context("failed to list beds")?;

    Ok(beds)
}
