//! CLI handlers for `plansow pest` subcommands.
//!
//! Implements:
//! - `plansow pest add`   -- add a pest to the catalog
//! - `plansow pest list`  -- all pests, or those affecting one species
//! - `plansow pest link`  -- record a species' susceptibility
//! - `plansow pest show`  -- a pest with the treatments that target it

use anyhow::{Context, Result};
use serde::Serialize;
use sqlx::PgPool;
use tracing::info;

use plansow_db::models::{NewPest, NewPlantPest, Pest, Treatment};
use plansow_db::queries::{catalog, pests};

use crate::PestCommands;
use crate::resolve::{print_json, resolve_pest, resolve_plant};

#[derive(Serialize)]
struct PestReport {
    #[serde(flatten)]
    pest: Pest,
    treatments: Vec<Treatment>,
}

pub async fn run_pest_command(command: PestCommands, pool: &PgPool) -> Result<()> {
    match command {
        PestCommands::Add {
            name,
            scientific_name,
            description,
            symptoms,
        } => {
            let pest = pests::insert_pest(
                pool,
                &NewPest {
                    name,
                    scientific_name,
                    description,
                    symptoms,
                },
            )
            .await?;
            info!(pest_id = %pest.id, name = %pest.name, "pest added");
            println!("Created pest {} ({})", pest.name, pest.id);
            Ok(())
        }
        PestCommands::List { plant, json } => {
            let Some(plant) = plant else {
                let all = pests::list_pests(pool).await?;
                if json {
                    return print_json(&all);
                }
                if all.is_empty() {
                    println!("No pests.");
                    return Ok(());
                }
                println!("{:<38} {:<24} SCIENTIFIC NAME", "ID", "NAME");
                for p in &all {
                    println!(
                        "{:<38} {:<24} {}",
                        p.id,
                        p.name,
                        p.scientific_name.as_deref().unwrap_or("-")
                    );
                }
                return Ok(());
            };

            let plant_id = resolve_plant(pool, &plant).await?;
            let exposure = pests::pests_for_plant(pool, plant_id).await?;
            if json {
                return print_json(&exposure);
            }
            if exposure.is_empty() {
                println!("No pests recorded for {plant}.");
                return Ok(());
            }
            println!("{:<38} {:<24} SEVERITY", "ID", "NAME");
            for e in &exposure {
                println!(
                    "{:<38} {:<24} {}",
                    e.pest.id,
                    e.pest.name,
                    e.severity.map_or_else(|| "-".to_string(), |s| s.to_string())
                );
            }
            Ok(())
        }
        PestCommands::Link {
            plant,
            pest,
            severity,
            notes,
        } => {
            let plant_id = resolve_plant(pool, &plant).await?;
            let pest_id = resolve_pest(pool, &pest).await?;
            let link = pests::link_plant_to_pest(
                pool,
                &NewPlantPest {
                    plant_id,
                    pest_id,
                    severity,
                    notes,
                },
            )
            .await?;
            info!(%plant_id, %pest_id, "plant linked to pest");
            match link.severity {
                Some(s) => println!("Linked {pest} to {plant} ({s} severity)."),
                None => println!("Linked {pest} to {plant}."),
            }
            Ok(())
        }
        PestCommands::Show { pest, json } => {
            let id = resolve_pest(pool, &pest).await?;
            let found = pests::get_pest(pool, id)
                .await?
                .with_context(|| format!("pest {id} not found"))?;
            let report = PestReport {
                treatments: catalog::treatments_for_pest(pool, id).await?,
                pest: found,
            };
            if json {
                return print_json(&report);
            }

            let p = &report.pest;
            println!("Pest: {} ({})", p.name, p.id);
            if let Some(sci) = &p.scientific_name {
                println!("Scientific name: {sci}");
            }
            if let Some(desc) = &p.description {
                println!("Description: {desc}");
            }
            if let Some(symptoms) = &p.symptoms {
                println!("Symptoms: {symptoms}");
            }
            println!();
            if report.treatments.is_empty() {
                println!("No treatments target this pest.");
            } else {
                println!("Treatments:");
                for t in &report.treatments {
                    println!("  {} ({})", t.name, t.id);
                }
            }
            Ok(())
        }
    }
}
