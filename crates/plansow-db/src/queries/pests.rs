//! Database query functions for the pest catalog: `pests` and the
//! `plant_pests` susceptibility links.

use anyhow::{Context, Result};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{NewPest, NewPlantPest, Pest, PestExposure, PlantPest};

pub async fn insert_pest(pool: &PgPool, new: &NewPest) -> Result<Pest> {
    let pest = sqlx::query_as::<_, Pest>(
        "INSERT INTO pests (name, scientific_name, description, symptoms) \
         VALUES ($1, $2, $3, $4) \
         RETURNING *",
    )
    .bind(&new.name)
    .bind(&new.scientific_name)
    .bind(&new.description)
    .bind(&new.symptoms)
    .fetch_one(pool)
    .await
    .with_context(|| format!("failed to insert pest {:?}", new.name))?;

    Ok(pest)
}

pub async fn get_pest(pool: &PgPool, id: Uuid) -> Result<Option<Pest>> {
    let pest = sqlx::query_as::<_, Pest>("SELECT * FROM pests WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("failed to fetch pest")?;

    Ok(pest)
}

pub async fn get_pest_by_name(pool: &PgPool, name: &str) -> Result<Option<Pest>> {
    let pest = sqlx::query_as::<_, Pest>("SELECT * FROM pests WHERE name = $1")
        .bind(name)
        .fetch_optional(pool)
        .await
        .context("failed to fetch pest by name")?;

    Ok(pest)
}

pub async fn list_pests(pool: &PgPool) -> Result<Vec<Pest>> {
    let pests = sqlx::query_as::<_, Pest>("SELECT * FROM pests ORDER BY name")
        .fetch_all(pool)
        .await
        .context("failed to list pests")?;

    Ok(pests)
}

/// Record that a species is susceptible to a pest.
///
/// Linking the same pair again updates severity and notes in place.
pub async fn link_plant_to_pest(pool: &PgPool, new: &NewPlantPest) -> Result<PlantPest> {
    let link = sqlx::query_as::<_, PlantPest>(
        "INSERT INTO plant_pests (plant_id, pest_id, severity, notes) \
         VALUES ($1, $2, $3, $4) \
         ON CONFLICT (plant_id, pest_id) \
         DO UPDATE SET severity = EXCLUDED.severity, notes = EXCLUDED.notes \
         RETURNING *",
    )
    .bind(new.plant_id)
    .bind(new.pest_id)
    .bind(new.severity)
    .bind(&new.notes)
    .fetch_one(pool)
    .await
    .context("failed to link plant to pest")?;

    Ok(link)
}

/// Pests a species is susceptible to, most severe first.
pub async fn pests_for_plant(pool: &PgPool, plant_id: Uuid) -> Result<Vec<PestExposure>> {
    let pests = sqlx::query_as::<_, PestExposure>(
        "SELECT p.*, pp.severity, pp.notes AS link_notes \
         FROM plant_pests pp \
         JOIN pests p ON p.id = pp.pest_id \
         WHERE pp.plant_id = $1 \
         ORDER BY CASE pp.severity WHEN 'high' THEN 0 WHEN 'medium' THEN 1 WHEN 'low' THEN 2 ELSE 3 END, p.name",
    )
    .bind(plant_id)
    .fetch_all(pool)
    .await
    .context("failed to list pests for plant")?;

    Ok(pests)
}
