//! Argument resolution shared by the command handlers.
//!
//! - [`parse_date`] is the clap value parser for every date flag.
//! - The `resolve_*` functions accept either a UUID or a catalog name and
//!   return the row's id.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use plansow_db::queries::{beds, catalog, pests, plants, seasons};

/// Date format accepted on the command line.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a `YYYY-MM-DD` argument.
pub fn parse_date(input: &str) -> std::result::Result<NaiveDate, String> {
    NaiveDate::parse_from_str(input, DATE_FORMAT)
        .map_err(|e| format!("invalid date {input:?} (expected YYYY-MM-DD): {e}"))
}

/// The injected `--today`, or the local calendar date.
pub fn today(flag: Option<NaiveDate>) -> NaiveDate {
    flag.unwrap_or_else(|| chrono::Local::now().date_naive())
}

/// Parse a bare UUID argument, naming `what` in the error.
pub fn parse_id(input: &str, what: &str) -> Result<Uuid> {
    Uuid::parse_str(input).with_context(|| format!("invalid {what} ID: {input:?}"))
}

/// Parse `NAME[:QTY]` as used by `planting add --plant`.
pub fn split_quantity(input: &str) -> Result<(&str, i32)> {
    match input.rsplit_once(':') {
        Some((name, qty)) => {
            let qty: i32 = qty
                .parse()
                .with_context(|| format!("invalid quantity in {input:?}"))?;
            Ok((name, qty))
        }
        None => Ok((input, 1)),
    }
}

pub async fn resolve_bed(pool: &PgPool, input: &str) -> Result<Uuid> {
    if let Ok(id) = Uuid::parse_str(input) {
        return Ok(id);
    }
    let bed = beds::get_bed_by_name(pool, input)
        .await?
        .with_context(|| format!("bed {input:?} not found"))?;
    Ok(bed.id)
}

pub async fn resolve_plant(pool: &PgPool, input: &str) -> Result<Uuid> {
    if let Ok(id) = Uuid::parse_str(input) {
        return Ok(id);
    }
    let plant = plants::get_plant_by_name(pool, input)
        .await?
        .with_context(|| format!("plant {input:?} not found"))?;
    Ok(plant.id)
}

pub async fn resolve_treatment(pool: &PgPool, input: &str) -> Result<Uuid> {
    if let Ok(id) = Uuid::parse_str(input) {
        return Ok(id);
    }
    let treatment = catalog::get_treatment_by_name(pool, input)
        .await?
        .with_context(|| format!("treatment {input:?} not found"))?;
    Ok(treatment.id)
}

pub async fn resolve_care_action(pool: &PgPool, input: &str) -> Result<Uuid> {
    if let Ok(id) = Uuid::parse_str(input) {
        return Ok(id);
    }
    let action = catalog::get_care_action_by_name(pool, input)
        .await?
        .with_context(|| format!("care action {input:?} not found"))?;
    Ok(action.id)
}

pub async fn resolve_pest(pool: &PgPool, input: &str) -> Result<Uuid> {
    if let Ok(id) = Uuid::parse_str(input) {
        return Ok(id);
    }
    let pest = pests::get_pest_by_name(pool, input)
        .await?
        .with_context(|| format!("pest {input:?} not found"))?;
    Ok(pest.id)
}

pub async fn resolve_season(pool: &PgPool, input: &str) -> Result<Uuid> {
    if let Ok(id) = Uuid::parse_str(input) {
        return Ok(id);
    }
    let season = seasons::get_season_by_name(pool, input)
        .await?
        .with_context(|| format!("season {input:?} not found"))?;
    Ok(season.id)
}

/// Print `value` as pretty JSON on stdout.
pub fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    let out = serde_json::to_string_pretty(value).context("failed to serialize output")?;
    println!("{out}");
    Ok(())
}
