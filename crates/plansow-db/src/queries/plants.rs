//! Database query functions for the `plants` catalog.

use anyhow::{Context, Result};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{NewPlant, Plant};

pub async fn insert_plant(pool: &PgPool, plant: &NewPlant) -> Result<Plant> {
    let row = sqlx::query_as::<_, Plant>(
        "INSERT INTO plants (name, scientific_name, icon, growth_days, harvest_period_days, notes) \
         VALUES ($1, $2, $3, $4, $5, $6) \
         RETURNING *",
    )
    .bind(&plant.name)
    .bind(&plant.scientific_name)
    .bind(&plant.icon)
    .bind(plant.growth_days)
    .bind(plant.harvest_period_days)
    .bind(&plant.notes)
    .fetch_one(pool)
    .await
    .with_context(|| format!("failed to insert plant {:?}", plant.name))?;

    Ok(row)
}

pub async fn get_plant(pool: &PgPool, id: Uuid) -> Result<Option<Plant>> {
    let plant = sqlx::query_as::<_, Plant>("SELECT * FROM plants WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("failed to fetch plant")?;

    Ok(plant)
}

pub async fn get_plant_by_name(pool: &PgPool, name: &str) -> Result<Option<Plant>> {
    let plant = sqlx::query_as::<_, Plant>("SELECT * FROM plants WHERE name = $1")
        .bind(name)
        .fetch_optional(pool)
        .await
        .context("failed to fetch plant by name")?;

    Ok(plant)
}

pub async fn list_plants(pool: &PgPool) -> Result<Vec<Plant>> {
    let plants = sqlx::query_as::<_, Plant>("SELECT * FROM plants ORDER BY name")
        .fetch_all(pool)
        .await
        .context("failed to list plants")?;

    Ok(plants)
}

/// Species attached to a planting through `planting_members`.
pub async fn species_for_planting(pool: &PgPool, planting_id: Uuid) -> Result<Vec<Plant>> {
    let plants = sqlx::query_as::<_, Plant>(
        "SELECT p.* FROM plants p \
         JOIN planting_members m ON m.plant_id = p.id \
         WHERE m.planting_id = $1 \
         ORDER BY p.name",
    )
    .bind(planting_id)
    .fetch_all(pool)
    .await
    .context("failed to fetch species for planting")?;

    Ok(plants)
}
