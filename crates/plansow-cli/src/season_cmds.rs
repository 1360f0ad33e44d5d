//! CLI handlers for `plansow season` subcommands.

use anyhow::Result;
use chrono::NaiveDate;
use sqlx::PgPool;
use tracing::info;

use plansow_core::service::SchedulingService;
use plansow_core::store::PgStore;
use plansow_db::models::{NewSeason, Season};

use crate::SeasonCommands;
use crate::resolve::{print_json, resolve_season};

pub async fn run_season_command(
    command: SeasonCommands,
    pool: &PgPool,
    today: NaiveDate,
) -> Result<()> {
    let svc = SchedulingService::new(PgStore::new(pool.clone()));
    match command {
        SeasonCommands::Add {
            name,
            start,
            end,
            description,
            notes,
        } => {
            let new = NewSeason {
                name,
                start_date: start.unwrap_or(today),
                end_date: end,
                description,
                notes,
            };
            let created = svc.create_season(new, today).await?;
            info!(season_id = %created.value.id, "season opened");
            println!(
                "Created season {:?} ({})",
                created.value.name, created.value.id
            );
            if created.has_overlap() {
                println!(
                    "Warning: overlaps {} active season(s).",
                    created.overlaps_with.len()
                );
            }
            Ok(())
        }
        SeasonCommands::List { json } => {
            let seasons = svc.list_seasons().await?;
            if json {
                return print_json(&seasons);
            }
            if seasons.is_empty() {
                println!("No seasons.");
                return Ok(());
            }
            println!("{:<38} {:<24} {:<12} END", "ID", "NAME", "START");
            for s in &seasons {
                print_row(s);
            }
            Ok(())
        }
        SeasonCommands::Close { season, end } => {
            let id = resolve_season(pool, &season).await?;
            let closed = svc.close_season(id, end, today).await?;
            info!(season_id = %id, end = ?closed.end_date, "season closed");
            let end = closed.end_date.map(|d| d.to_string()).unwrap_or_default();
            println!("Season {:?} closed on {end}.", closed.name);
            Ok(())
        }
        SeasonCommands::Reopen { season } => {
            let id = resolve_season(pool, &season).await?;
            let reopened = svc.reopen_season(id).await?;
            info!(season_id = %id, "season reopened");
            println!("Season {:?} reopened.", reopened.name);
            Ok(())
        }
        SeasonCommands::Current { json } => {
            let current = svc.current_season(today).await?;
            if json {
                return print_json(&current);
            }
            match current {
                Some(s) => print_row(&s),
                None => println!("No active season on {today}."),
            }
            Ok(())
        }
    }
}

fn print_row(season: &Season) {
    println!(
        "{:<38} {:<24} {:<12} {}",
        season.id,
        season.name,
        season.start_date.to_string(),
        season
            .end_date
            .map_or_else(|| "open".to_string(), |d| d.to_string())
    );
}
