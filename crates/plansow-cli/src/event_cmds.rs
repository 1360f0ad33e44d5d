//! CLI handlers for `plansow events` subcommands.
//!
//! Implements:
//! - `plansow events list`      -- filtered calendar, grouped by status
//! - `plansow events complete`  -- mark one event done
//! - `plansow events seed`      -- schedule a planting's recommended care

use std::collections::{HashMap, HashSet};

use anyhow::Result;
use chrono::NaiveDate;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use plansow_core::service::{SchedulingService, group_by_status};
use plansow_core::store::PgStore;
use plansow_db::models::{EventFilter, ScheduledEvent};
use plansow_db::queries::{catalog, plantings};

use crate::EventCommands;
use crate::resolve::{parse_id, print_json, resolve_bed};

pub async fn run_event_command(
    command: EventCommands,
    pool: &PgPool,
    today: NaiveDate,
) -> Result<()> {
    let svc = SchedulingService::new(PgStore::new(pool.clone()));
    match command {
        EventCommands::List {
            from,
            to,
            status,
            planting,
            bed,
            upcoming,
            json,
        } => {
            let planting_id = match planting {
                Some(p) => Some(parse_id(&p, "planting")?),
                None => None,
            };
            let bed_id = match bed {
                Some(b) => Some(resolve_bed(pool, &b).await?),
                None => None,
            };

            let events = if upcoming {
                let in_bed: Option<HashSet<Uuid>> = match bed_id {
                    Some(id) => Some(
                        plantings::list_plantings_for_bed(pool, id)
                            .await?
                            .into_iter()
                            .map(|p| p.id)
                            .collect(),
                    ),
                    None => None,
                };
                let mut events = svc.upcoming_events(today).await?;
                retain_scope(&mut events, planting_id, in_bed.as_ref());
                events
            } else {
                let filter = EventFilter {
                    from,
                    to,
                    status,
                    planting_id,
                    bed_id,
                };
                svc.list_events(&filter).await?
            };

            let groups = group_by_status(events);
            if json {
                return print_json(&groups);
            }

            if groups.pending.is_empty() && groups.completed.is_empty() {
                println!("No events.");
                return Ok(());
            }

            let names = template_names(pool).await?;
            print_group("Pending", &groups.pending, &names);
            print_group("Completed", &groups.completed, &names);
            Ok(())
        }
        EventCommands::Complete { event_id, date } => {
            let id = parse_id(&event_id, "event")?;
            let event = svc.complete_event(id, date, today).await?;
            info!(event_id = %id, planting_id = %event.planting_id, "event completed");
            let done = event
                .completed_date
                .map(|d| d.to_string())
                .unwrap_or_default();
            println!("Event {id} completed on {done}.");
            Ok(())
        }
        EventCommands::Seed { planting_id } => {
            let id = parse_id(&planting_id, "planting")?;
            let created = svc.seed_care_calendar(id, today).await?;
            info!(planting_id = %id, created = created.len(), "care calendar seeded");
            println!("Scheduled {} care events for planting {id}.", created.len());
            Ok(())
        }
    }
}

/// Keep events of one planting and/or of the plantings in one bed.
fn retain_scope(
    events: &mut Vec<ScheduledEvent>,
    planting_id: Option<Uuid>,
    in_bed: Option<&HashSet<Uuid>>,
) {
    events.retain(|e| {
        planting_id.is_none_or(|id| e.planting_id == id)
            && in_bed.is_none_or(|ids| ids.contains(&e.planting_id))
    });
}

/// Display names for every treatment and care action.
async fn template_names(pool: &PgPool) -> Result<HashMap<Uuid, String>> {
    let mut names = HashMap::new();
    for t in catalog::list_treatments(pool).await? {
        names.insert(t.id, t.name);
    }
    for a in catalog::list_care_actions(pool).await? {
        names.insert(a.id, a.name);
    }
    Ok(names)
}

fn print_group(title: &str, events: &[ScheduledEvent], names: &HashMap<Uuid, String>) {
    if events.is_empty() {
        return;
    }
    println!("{title} ({}):", events.len());
    for event in events {
        let name = names
            .get(&event.kind.template_id())
            .map_or("?", String::as_str);
        let done = event
            .completed_date
            .map(|d| format!(" (done {d})"))
            .unwrap_or_default();
        println!(
            "  {}  {:<11} {:<24} {}{done}",
            event.scheduled_date,
            event.kind.label(),
            name,
            event.id
        );
    }
    println!();
}
