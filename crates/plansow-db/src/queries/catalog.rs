//! Database query functions for the maintenance catalog: `treatments`,
//! `care_actions` and the `plant_cares` links.

use anyhow::{Context, Result};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{
    CareAction, EventKind, MaintenanceTemplate, NewCareAction, NewPlantCare, NewTreatment,
    PlantCare, Treatment,
};

pub async fn insert_treatment(pool: &PgPool, new: &NewTreatment) -> Result<Treatment> {
    let treatment = sqlx::query_as::<_, Treatment>(
        "INSERT INTO treatments (pest_id, name, description, application_method, default_frequency_days, is_ecological) \
         VALUES ($1, $2, $3, $4, $5, $6) \
         RETURNING *",
    )
    .bind(new.pest_id)
    .bind(&new.name)
    .bind(&new.description)
    .bind(&new.application_method)
    .bind(new.default_frequency_days)
    .bind(new.is_ecological)
    .fetch_one(pool)
    .await
    .with_context(|| format!("failed to insert treatment {:?}", new.name))?;

    Ok(treatment)
}

pub async fn get_treatment(pool: &PgPool, id: Uuid) -> Result<Option<Treatment>> {
    let treatment = sqlx::query_as::<_, Treatment>("SELECT * FROM treatments WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("failed to fetch treatment")?;

    Ok(treatment)
}

pub async fn get_treatment_by_name(pool: &PgPool, name: &str) -> Result<Option<Treatment>> {
    let treatment = sqlx::query_as::<_, Treatment>(
        "SELECT * FROM treatments WHERE name = $1 ORDER BY created_at LIMIT 1",
    )
    .bind(name)
    .fetch_optional(pool)
    .await
    .context("failed to fetch treatment by name")?;

    Ok(treatment)
}

pub async fn list_treatments(pool: &PgPool) -> Result<Vec<Treatment>> {
    let treatments = sqlx::query_as::<_, Treatment>("SELECT * FROM treatments ORDER BY name")
        .fetch_all(pool)
        .await
        .context("failed to list treatments")?;

    Ok(treatments)
}

/// Treatments that target `pest_id`, by name.
pub async fn treatments_for_pest(pool: &PgPool, pest_id: Uuid) -> Result<Vec<Treatment>> {
    let treatments = sqlx::query_as::<_, Treatment>(
        "SELECT * FROM treatments WHERE pest_id = $1 ORDER BY name",
    )
    .bind(pest_id)
    .fetch_all(pool)
    .await
    .context("failed to list treatments for pest")?;

    Ok(treatments)
}

pub async fn insert_care_action(pool: &PgPool, new: &NewCareAction) -> Result<CareAction> {
    let action = sqlx::query_as::<_, CareAction>(
        "INSERT INTO care_actions (name, description, action_type, default_frequency_days) \
         VALUES ($1, $2, $3, $4) \
         RETURNING *",
    )
    .bind(&new.name)
    .bind(&new.description)
    .bind(new.action_type)
    .bind(new.default_frequency_days)
    .fetch_one(pool)
    .await
    .with_context(|| format!("failed to insert care action {:?}", new.name))?;

    Ok(action)
}

pub async fn get_care_action(pool: &PgPool, id: Uuid) -> Result<Option<CareAction>> {
    let action = sqlx::query_as::<_, CareAction>("SELECT * FROM care_actions WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("failed to fetch care action")?;

    Ok(action)
}

pub async fn get_care_action_by_name(pool: &PgPool, name: &str) -> Result<Option<CareAction>> {
    let action = sqlx::query_as::<_, CareAction>("SELECT * FROM care_actions WHERE name = $1")
        .bind(name)
        .fetch_optional(pool)
        .await
        .context("failed to fetch care action by name")?;

    Ok(action)
}

pub async fn list_care_actions(pool: &PgPool) -> Result<Vec<CareAction>> {
    let actions = sqlx::query_as::<_, CareAction>("SELECT * FROM care_actions ORDER BY name")
        .fetch_all(pool)
        .await
        .context("failed to list care actions")?;

    Ok(actions)
}

/// Look up the treatment or care action behind `kind` as a schedule template.
pub async fn get_template(pool: &PgPool, kind: EventKind) -> Result<Option<MaintenanceTemplate>> {
    let template = match kind {
        EventKind::Treatment(id) => get_treatment(pool, id).await?.map(|t| MaintenanceTemplate {
            kind,
            name: t.name,
            default_frequency_days: t.default_frequency_days,
        }),
        EventKind::CareAction(id) => {
            get_care_action(pool, id)
                .await?
                .map(|c| MaintenanceTemplate {
                    kind,
                    name: c.name,
                    default_frequency_days: c.default_frequency_days,
                })
        }
    };

    Ok(template)
}

/// Link a care action to a species in the catalog.
pub async fn insert_plant_care(pool: &PgPool, new: &NewPlantCare) -> Result<PlantCare> {
    let link = sqlx::query_as::<_, PlantCare>(
        "INSERT INTO plant_cares (plant_id, care_action_id, days_after_planting, frequency_days, notes) \
         VALUES ($1, $2, $3, $4, $5) \
         RETURNING *",
    )
    .bind(new.plant_id)
    .bind(new.care_action_id)
    .bind(new.days_after_planting)
    .bind(new.frequency_days)
    .bind(&new.notes)
    .fetch_one(pool)
    .await
    .context("failed to link care action to plant")?;

    Ok(link)
}

/// Catalog care links for every species in a planting.
pub async fn care_links_for_planting(pool: &PgPool, planting_id: Uuid) -> Result<Vec<PlantCare>> {
    let links = sqlx::query_as::<_, PlantCare>(
        "SELECT pc.* FROM plant_cares pc \
         JOIN planting_members m ON m.plant_id = pc.plant_id \
         WHERE m.planting_id = $1 \
         ORDER BY pc.days_after_planting NULLS LAST, pc.id",
    )
    .bind(planting_id)
    .fetch_all(pool)
    .await
    .context("failed to fetch care links for planting")?;

    Ok(links)
}
