//! CLI handlers for the garden records around the scheduler.
//!
//! Implements:
//! - `plansow bed add|list`
//! - `plansow plant add|list`
//! - `plansow treatment add|list`, optionally targeting a pest
//! - `plansow care add|list|link`

use anyhow::Result;
use sqlx::PgPool;
use tracing::info;

use plansow_db::models::{NewBed, NewCareAction, NewPlant, NewPlantCare, NewTreatment};
use plansow_db::queries::{beds, catalog, plants};

use crate::resolve::{print_json, resolve_care_action, resolve_pest, resolve_plant};
use crate::{BedCommands, CareCommands, PlantCommands, TreatmentCommands};

fn days(value: Option<i32>) -> String {
    value.map_or_else(|| "-".to_string(), |d| format!("{d}d"))
}

// -----------------------------------------------------------------------
// plansow bed
// -----------------------------------------------------------------------

pub async fn run_bed_command(command: BedCommands, pool: &PgPool) -> Result<()> {
    match command {
        BedCommands::Add {
            name,
            description,
            location,
        } => {
            let bed = beds::insert_bed(
                pool,
                &NewBed {
                    name,
                    description,
                    location,
                },
            )
            .await?;
            info!(bed_id = %bed.id, name = %bed.name, "bed added");
            println!("Created bed {} ({})", bed.name, bed.id);
            Ok(())
        }
        BedCommands::List { json } => {
            let all = beds::list_beds(pool).await?;
            if json {
                return print_json(&all);
            }
            if all.is_empty() {
                println!("No beds.");
                return Ok(());
            }
            println!("{:<38} {:<24} LOCATION", "ID", "NAME");
            for bed in &all {
                println!(
                    "{:<38} {:<24} {}",
                    bed.id,
                    bed.name,
                    bed.location.as_deref().unwrap_or("-")
                );
            }
            Ok(())
        }
    }
}

// -----------------------------------------------------------------------
// plansow plant
// -----------------------------------------------------------------------

pub async fn run_plant_command(command: PlantCommands, pool: &PgPool) -> Result<()> {
    match command {
        PlantCommands::Add {
            name,
            scientific_name,
            icon,
            growth_days,
            harvest_days,
            notes,
        } => {
            let plant = plants::insert_plant(
                pool,
                &NewPlant {
                    name,
                    scientific_name,
                    icon,
                    growth_days,
                    harvest_period_days: harvest_days,
                    notes,
                },
            )
            .await?;
            info!(plant_id = %plant.id, name = %plant.name, "plant added");
            println!("Created plant {} ({})", plant.name, plant.id);
            Ok(())
        }
        PlantCommands::List { json } => {
            let all = plants::list_plants(pool).await?;
            if json {
                return print_json(&all);
            }
            if all.is_empty() {
                println!("No plants.");
                return Ok(());
            }
            println!("{:<38} {:<24} {:>8} {:>8}", "ID", "NAME", "GROWTH", "HARVEST");
            for plant in &all {
                println!(
                    "{:<38} {:<24} {:>8} {:>8}",
                    plant.id,
                    plant.name,
                    days(plant.growth_days),
                    days(plant.harvest_period_days)
                );
            }
            Ok(())
        }
    }
}

// -----------------------------------------------------------------------
// plansow treatment
// -----------------------------------------------------------------------

pub async fn run_treatment_command(command: TreatmentCommands, pool: &PgPool) -> Result<()> {
    match command {
        TreatmentCommands::Add {
            name,
            description,
            method,
            every,
            synthetic,
            pest,
        } => {
            let pest_id = match pest {
                Some(p) => Some(resolve_pest(pool, &p).await?),
                None => None,
            };
            let treatment = catalog::insert_treatment(
                pool,
                &NewTreatment {
                    pest_id,
                    name,
                    description,
                    application_method: method,
                    default_frequency_days: every,
                    is_ecological: !synthetic,
                },
            )
            .await?;
            info!(treatment_id = %treatment.id, pest_id = ?treatment.pest_id, "treatment added");
            println!("Created treatment {} ({})", treatment.name, treatment.id);
            Ok(())
        }
        TreatmentCommands::List { json } => {
            let all = catalog::list_treatments(pool).await?;
            if json {
                return print_json(&all);
            }
            if all.is_empty() {
                println!("No treatments.");
                return Ok(());
            }
            println!("{:<38} {:<24} {:>6} ECO", "ID", "NAME", "EVERY");
            for t in &all {
                println!(
                    "{:<38} {:<24} {:>6} {}",
                    t.id,
                    t.name,
                    days(t.default_frequency_days),
                    if t.is_ecological { "yes" } else { "no" }
                );
            }
            Ok(())
        }
    }
}

// -----------------------------------------------------------------------
// plansow care
// -----------------------------------------------------------------------

pub async fn run_care_command(command: CareCommands, pool: &PgPool) -> Result<()> {
    match command {
        CareCommands::Add {
            name,
            action_type,
            description,
            every,
        } => {
            let action = catalog::insert_care_action(
                pool,
                &NewCareAction {
                    name,
                    description,
                    action_type,
                    default_frequency_days: every,
                },
            )
            .await?;
            info!(care_action_id = %action.id, kind = %action.action_type, "care action added");
            println!(
                "Created care action {} [{}] ({})",
                action.name, action.action_type, action.id
            );
            Ok(())
        }
        CareCommands::List { json } => {
            let all = catalog::list_care_actions(pool).await?;
            if json {
                return print_json(&all);
            }
            if all.is_empty() {
                println!("No care actions.");
                return Ok(());
            }
            println!("{:<38} {:<24} {:<12} EVERY", "ID", "NAME", "TYPE");
            for a in &all {
                println!(
                    "{:<38} {:<24} {:<12} {}",
                    a.id,
                    a.name,
                    a.action_type.to_string(),
                    days(a.default_frequency_days)
                );
            }
            Ok(())
        }
        CareCommands::Link {
            plant,
            care,
            after_days,
            every,
            notes,
        } => {
            let plant_id = resolve_plant(pool, &plant).await?;
            let care_action_id = resolve_care_action(pool, &care).await?;
            let link = catalog::insert_plant_care(
                pool,
                &NewPlantCare {
                    plant_id,
                    care_action_id,
                    days_after_planting: after_days,
                    frequency_days: every,
                    notes,
                },
            )
            .await?;
            info!(%plant_id, %care_action_id, "care recommendation linked");
            println!(
                "Linked {care} to {plant}: {} after planting ({})",
                days(link.days_after_planting),
                link.id
            );
            Ok(())
        }
    }
}
