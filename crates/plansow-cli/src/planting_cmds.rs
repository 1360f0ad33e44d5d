//! CLI handlers for plantings and their maintenance.
//!
//! Implements:
//! - `plansow planting add`    -- create a planting, warning on bed overlap
//! - `plansow planting list`   -- list plantings with today's progress
//! - `plansow planting show`   -- species, progress and assignments
//! - `plansow planting close`  -- set the end date
//! - `plansow maintain`        -- attach a treatment or care action

use anyhow::Result;
use chrono::NaiveDate;
use serde::Serialize;
use sqlx::PgPool;
use tracing::info;

use plansow_core::progress::Progress;
use plansow_core::service::{NewMaintenance, SchedulingService};
use plansow_core::store::PgStore;
use plansow_db::models::{
    EventKind, MaintenanceAssignment, NewPlanting, NewPlantingMember, Plant, Planting,
    PlantingMember,
};
use plansow_db::queries::{assignments, beds, plantings};

use crate::PlantingCommands;
use crate::resolve::{
    parse_id, print_json, resolve_bed, resolve_care_action, resolve_plant, resolve_treatment,
    split_quantity,
};

fn service(pool: &PgPool) -> SchedulingService<PgStore> {
    SchedulingService::new(PgStore::new(pool.clone()))
}

pub async fn run_planting_command(
    command: PlantingCommands,
    pool: &PgPool,
    today: NaiveDate,
) -> Result<()> {
    match command {
        PlantingCommands::Add {
            bed,
            plants,
            start,
            end,
            start_type,
            notes,
        } => {
            let bed_id = resolve_bed(pool, &bed).await?;
            let mut members = Vec::with_capacity(plants.len());
            for entry in &plants {
                let (name, qty) = split_quantity(entry)?;
                members.push(NewPlantingMember::new(resolve_plant(pool, name).await?, qty));
            }
            let new = NewPlanting {
                bed_id,
                start_date: start.unwrap_or(today),
                end_date: end,
                start_type,
                notes,
                members,
            };
            cmd_add(pool, new, today).await
        }
        PlantingCommands::List { bed, all, json } => {
            let rows = match bed {
                Some(bed) => {
                    let bed_id = resolve_bed(pool, &bed).await?;
                    plantings::list_plantings_for_bed(pool, bed_id)
                        .await?
                        .into_iter()
                        .filter(|p| all || p.is_active)
                        .collect()
                }
                None => plantings::list_plantings(pool, !all).await?,
            };
            cmd_list(pool, rows, today, json).await
        }
        PlantingCommands::Show { planting_id, json } => {
            let id = parse_id(&planting_id, "planting")?;
            cmd_show(pool, id, today, json).await
        }
        PlantingCommands::Close { planting_id, end } => {
            let id = parse_id(&planting_id, "planting")?;
            let closed = service(pool).close_planting(id, end, today).await?;
            info!(planting_id = %id, end = ?closed.end_date, "planting closed");
            let end = closed.end_date.map(|d| d.to_string()).unwrap_or_default();
            println!("Planting {id} closed on {end}.");
            Ok(())
        }
    }
}

async fn cmd_add(pool: &PgPool, new: NewPlanting, today: NaiveDate) -> Result<()> {
    let species = new.members.len();
    let created = service(pool).create_planting(new, today).await?;
    let planting = &created.value;
    info!(
        planting_id = %planting.id,
        overlaps = created.overlaps_with.len(),
        "planting created"
    );

    println!(
        "Created planting {} ({} species, {} from {})",
        planting.id, species, planting.start_type, planting.start_date
    );
    if created.has_overlap() {
        println!("Warning: overlaps active plantings in the same bed:");
        for id in &created.overlaps_with {
            println!("  {id}");
        }
    }
    Ok(())
}

#[derive(Serialize)]
struct PlantingRow {
    #[serde(flatten)]
    planting: Planting,
    progress: Progress,
}

async fn cmd_list(pool: &PgPool, rows: Vec<Planting>, today: NaiveDate, json: bool) -> Result<()> {
    let svc = service(pool);
    let mut out = Vec::with_capacity(rows.len());
    for planting in rows {
        let progress = svc.progress(planting.id, today).await?;
        out.push(PlantingRow { planting, progress });
    }

    if json {
        return print_json(&out);
    }
    if out.is_empty() {
        println!("No plantings.");
        return Ok(());
    }

    println!("{:<38} {:<12} {:<11} {:>7}", "ID", "START", "PHASE", "GROWTH");
    for row in &out {
        println!(
            "{:<38} {:<12} {:<11} {:>6}%",
            row.planting.id,
            row.planting.start_date.to_string(),
            row.progress.phase.to_string(),
            row.progress.growth_progress
        );
    }
    Ok(())
}

#[derive(Serialize)]
struct PlantingReport {
    planting: Planting,
    members: Vec<PlantingMember>,
    species: Vec<Plant>,
    progress: Progress,
    assignments: Vec<MaintenanceAssignment>,
}

async fn cmd_show(pool: &PgPool, id: uuid::Uuid, today: NaiveDate, json: bool) -> Result<()> {
    let svc = service(pool);
    let progress = svc.progress(id, today).await?;
    let species = svc.planting_species(id).await?;
    let report = PlantingReport {
        planting: plantings::get_planting(pool, id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("planting {id} not found"))?,
        members: plantings::list_members(pool, id).await?,
        species,
        progress,
        assignments: assignments::list_assignments_for_planting(pool, id).await?,
    };

    if json {
        return print_json(&report);
    }

    let p = &report.planting;
    let bed = beds::get_bed(pool, p.bed_id).await?;
    println!("Planting: {}", p.id);
    println!(
        "Bed: {}",
        bed.map(|b| b.name).unwrap_or_else(|| p.bed_id.to_string())
    );
    println!("Started: {} ({})", p.start_date, p.start_type);
    match p.end_date {
        Some(end) => println!("Ended: {end}"),
        None => println!("Ended: -"),
    }
    if let Some(notes) = &p.notes {
        println!("Notes: {notes}");
    }
    println!();

    println!("Species:");
    for plant in &report.species {
        let qty = report
            .members
            .iter()
            .find(|m| m.plant_id == plant.id)
            .map_or(0, |m| m.quantity_planted);
        println!("  {} x{}", plant.name, qty);
    }
    println!();

    let pr = &report.progress;
    println!("Phase: {} (day {})", pr.phase, pr.days_since_start);
    println!("Growth: {}%", pr.growth_progress);
    if let Some(harvest) = pr.harvest_progress {
        println!("Harvest: {harvest}%");
    }
    if let Some(days) = pr.days_to_harvest {
        println!("Days to harvest: {days}");
    }
    if let Some(days) = pr.days_to_harvest_end {
        println!("Days to harvest end: {days}");
    }

    if !report.assignments.is_empty() {
        println!();
        println!("Maintenance:");
        for a in &report.assignments {
            let every = a
                .frequency_days
                .map_or_else(|| "once".to_string(), |d| format!("every {d}d"));
            println!("  {} from {}, {every}", a.template, a.anchor_date);
        }
    }
    Ok(())
}

/// Arguments of `plansow maintain`, with the anchor already defaulted.
pub struct MaintainArgs {
    pub planting_id: String,
    pub treatment: Option<String>,
    pub care: Option<String>,
    pub anchor: NaiveDate,
    pub every: Option<i32>,
    pub notes: Option<String>,
}

pub async fn run_maintain(pool: &PgPool, args: MaintainArgs) -> Result<()> {
    let planting_id = parse_id(&args.planting_id, "planting")?;
    let template = match (&args.treatment, &args.care) {
        (Some(t), None) => EventKind::Treatment(resolve_treatment(pool, t).await?),
        (None, Some(c)) => EventKind::CareAction(resolve_care_action(pool, c).await?),
        _ => anyhow::bail!("pass exactly one of --treatment or --care"),
    };

    let mut request = NewMaintenance::on(args.anchor);
    if let Some(days) = args.every {
        request = request.every(days);
    }
    if let Some(notes) = args.notes {
        request = request.with_notes(notes);
    }

    let outcome = service(pool)
        .add_maintenance(planting_id, template, request)
        .await?;
    info!(
        assignment_id = %outcome.assignment.id,
        %planting_id,
        events = outcome.created_events.len(),
        skipped = outcome.duplicates_skipped,
        "maintenance assigned"
    );

    println!(
        "Assignment {} created: {} events scheduled",
        outcome.assignment.id,
        outcome.created_events.len()
    );
    if outcome.duplicates_skipped > 0 {
        println!(
            "  {} dates were already scheduled and were skipped",
            outcome.duplicates_skipped
        );
    }
    for event in outcome.created_events.iter().take(5) {
        println!("  {}", event.scheduled_date);
    }
    if outcome.created_events.len() > 5 {
        println!("  ...");
    }
    Ok(())
}
