//! Database query functions for the `seasons` table.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{NewSeason, Season};

pub async fn insert_season(pool: &PgPool, new: &NewSeason) -> Result<Season> {
    let season = sqlx::query_as::<_, Season>(
        "INSERT INTO seasons (name, start_date, end_date, description, notes) \
         VALUES ($1, $2, $3, $4, $5) \
         RETURNING *",
    )
    .bind(&new.name)
    .bind(new.start_date)
    .bind(new.end_date)
    .bind(&new.description)
    .bind(&new.notes)
    .fetch_one(pool)
    .await
    .with_context(|| format!("failed to insert season {:?}", new.name))?;

    Ok(season)
}

pub async fn get_season(pool: &PgPool, id: Uuid) -> Result<Option<Season>> {
    let season = sqlx::query_as::<_, Season>("SELECT * FROM seasons WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("failed to fetch season")?;

    Ok(season)
}

pub async fn get_season_by_name(pool: &PgPool, name: &str) -> Result<Option<Season>> {
    let season = sqlx::query_as::<_, Season>("SELECT * FROM seasons WHERE name = $1")
        .bind(name)
        .fetch_optional(pool)
        .await
        .context("failed to fetch season by name")?;

    Ok(season)
}

/// List seasons, most recent start first.
pub async fn list_seasons(pool: &PgPool) -> Result<Vec<Season>> {
    let seasons = sqlx::query_as::<_, Season>("SELECT * FROM seasons ORDER BY start_date DESC")
        .fetch_all(pool)
        .await
        .context("failed to list seasons")?;

    Ok(seasons)
}

/// Set or clear a season's end date. Returns `None` when the season does not
/// exist.
pub async fn set_season_end(
    pool: &PgPool,
    id: Uuid,
    end_date: Option<NaiveDate>,
) -> Result<Option<Season>> {
    let season = sqlx::query_as::<_, Season>(
        "UPDATE seasons SET end_date = $2 WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(end_date)
    .fetch_optional(pool)
    .await
    .context("failed to update season end date")?;

    Ok(season)
}
