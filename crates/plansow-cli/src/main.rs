mod catalog_cmds;
mod config;
mod event_cmds;
mod pest_cmds;
mod planting_cmds;
mod resolve;
mod season_cmds;
#[cfg(test)]
mod test_util;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use plansow_core::error::ScheduleError;
use plansow_db::models::{ActionType, EventStatus, Severity, StartType};
use plansow_db::pool;

use config::PlansowConfig;

#[derive(Parser)]
#[command(name = "plansow", about = "Garden planting records and cultivation schedules")]
struct Cli {
    /// Database URL (overrides PLANSOW_DATABASE_URL env var)
    #[arg(long, global = true)]
    database_url: Option<String>,

    /// Use this date as today (YYYY-MM-DD)
    #[arg(long, global = true, value_parser = resolve::parse_date)]
    today: Option<NaiveDate>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a plansow config file (no database required)
    Init {
        /// PostgreSQL connection URL
        #[arg(long, default_value = "postgresql://localhost:5432/plansow")]
        db_url: String,
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
    /// Create and migrate the plansow database
    DbInit,
    /// Garden beds
    Bed {
        #[command(subcommand)]
        command: BedCommands,
    },
    /// Plant species catalog
    Plant {
        #[command(subcommand)]
        command: PlantCommands,
    },
    /// Treatment catalog
    Treatment {
        #[command(subcommand)]
        command: TreatmentCommands,
    },
    /// Pest catalog
    Pest {
        #[command(subcommand)]
        command: PestCommands,
    },
    /// Care action catalog
    Care {
        #[command(subcommand)]
        command: CareCommands,
    },
    /// Plantings in beds
    Planting {
        #[command(subcommand)]
        command: PlantingCommands,
    },
    /// Attach a recurring treatment or care action to a planting
    Maintain {
        /// Planting ID
        planting_id: String,
        /// Treatment name or ID
        #[arg(long, required_unless_present = "care", conflicts_with = "care")]
        treatment: Option<String>,
        /// Care action name or ID
        #[arg(long)]
        care: Option<String>,
        /// First occurrence (defaults to today)
        #[arg(long, value_parser = resolve::parse_date)]
        anchor: Option<NaiveDate>,
        /// Repeat every N days (overrides the catalog default)
        #[arg(long)]
        every: Option<i32>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Scheduled events
    Events {
        #[command(subcommand)]
        command: EventCommands,
    },
    /// Growing seasons
    Season {
        #[command(subcommand)]
        command: SeasonCommands,
    },
}

#[derive(Subcommand)]
pub enum BedCommands {
    /// Add a bed
    Add {
        name: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        location: Option<String>,
    },
    /// List beds
    List {
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
pub enum PlantCommands {
    /// Add a species
    Add {
        name: String,
        #[arg(long)]
        scientific_name: Option<String>,
        #[arg(long)]
        icon: Option<String>,
        /// Days from planting until harvest begins
        #[arg(long)]
        growth_days: Option<i32>,
        /// Length of the harvest window in days
        #[arg(long)]
        harvest_days: Option<i32>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// List species
    List {
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
pub enum TreatmentCommands {
    /// Add a treatment
    Add {
        name: String,
        #[arg(long)]
        description: Option<String>,
        /// How the treatment is applied (spray, drench, ...)
        #[arg(long)]
        method: Option<String>,
        /// Default repeat interval in days
        #[arg(long)]
        every: Option<i32>,
        /// Mark the treatment as non-ecological
        #[arg(long)]
        synthetic: bool,
        /// Pest this treatment targets (name or ID)
        #[arg(long)]
        pest: Option<String>,
    },
    /// List treatments
    List {
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
pub enum PestCommands {
    /// Add a pest
    Add {
        name: String,
        #[arg(long)]
        scientific_name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        symptoms: Option<String>,
    },
    /// List pests
    List {
        /// Only pests affecting this species (name or ID)
        #[arg(long)]
        plant: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// Record that a species is susceptible to a pest
    Link {
        /// Plant name or ID
        plant: String,
        /// Pest name or ID
        pest: String,
        /// low, medium or high
        #[arg(long)]
        severity: Option<Severity>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Show a pest and the treatments that target it
    Show {
        /// Pest name or ID
        pest: String,
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
pub enum CareCommands {
    /// Add a care action
    Add {
        name: String,
        /// pruning, pinching, tutoring, fertilizing, watering or other
        #[arg(long, default_value = "other")]
        action_type: ActionType,
        #[arg(long)]
        description: Option<String>,
        /// Default repeat interval in days
        #[arg(long)]
        every: Option<i32>,
    },
    /// List care actions
    List {
        #[arg(long)]
        json: bool,
    },
    /// Recommend a care action for a species
    Link {
        /// Plant name or ID
        plant: String,
        /// Care action name or ID
        care: String,
        /// Days after the planting start
        #[arg(long)]
        after_days: Option<i32>,
        /// Repeat interval in days
        #[arg(long)]
        every: Option<i32>,
        #[arg(long)]
        notes: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum PlantingCommands {
    /// Plant one or more species in a bed
    Add {
        /// Bed name or ID
        #[arg(long)]
        bed: String,
        /// Species as NAME[:QTY]; repeat for mixed plantings
        #[arg(long = "plant", required = true)]
        plants: Vec<String>,
        /// Start date (defaults to today)
        #[arg(long, value_parser = resolve::parse_date)]
        start: Option<NaiveDate>,
        #[arg(long, value_parser = resolve::parse_date)]
        end: Option<NaiveDate>,
        /// seed, seedling or transplant
        #[arg(long, default_value = "seed")]
        start_type: StartType,
        #[arg(long)]
        notes: Option<String>,
    },
    /// List plantings
    List {
        /// Only plantings in this bed (name or ID)
        #[arg(long)]
        bed: Option<String>,
        /// Include finished plantings
        #[arg(long)]
        all: bool,
        #[arg(long)]
        json: bool,
    },
    /// Show a planting with its species, progress and maintenance
    Show {
        planting_id: String,
        #[arg(long)]
        json: bool,
    },
    /// End a planting
    Close {
        planting_id: String,
        /// End date (defaults to today)
        #[arg(long, value_parser = resolve::parse_date)]
        end: Option<NaiveDate>,
    },
}

#[derive(Subcommand)]
pub enum EventCommands {
    /// List scheduled events
    List {
        #[arg(long, value_parser = resolve::parse_date)]
        from: Option<NaiveDate>,
        #[arg(long, value_parser = resolve::parse_date)]
        to: Option<NaiveDate>,
        /// pending or completed
        #[arg(long)]
        status: Option<EventStatus>,
        #[arg(long)]
        planting: Option<String>,
        /// Bed name or ID
        #[arg(long)]
        bed: Option<String>,
        /// Pending events for the next 30 days
        #[arg(long, conflicts_with_all = ["from", "to", "status"])]
        upcoming: bool,
        #[arg(long)]
        json: bool,
    },
    /// Mark an event completed
    Complete {
        event_id: String,
        /// Completion date (defaults to today)
        #[arg(long, value_parser = resolve::parse_date)]
        date: Option<NaiveDate>,
    },
    /// Schedule the catalog's recommended care for a planting
    Seed { planting_id: String },
}

#[derive(Subcommand)]
pub enum SeasonCommands {
    /// Open a season
    Add {
        name: String,
        /// Start date (defaults to today)
        #[arg(long, value_parser = resolve::parse_date)]
        start: Option<NaiveDate>,
        #[arg(long, value_parser = resolve::parse_date)]
        end: Option<NaiveDate>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// List seasons, newest first
    List {
        #[arg(long)]
        json: bool,
    },
    /// Close a season
    Close {
        /// Season name or ID
        season: String,
        /// End date (defaults to today)
        #[arg(long, value_parser = resolve::parse_date)]
        end: Option<NaiveDate>,
    },
    /// Clear a season's end date
    Reopen {
        /// Season name or ID
        season: String,
    },
    /// Show the season active today
    Current {
        #[arg(long)]
        json: bool,
    },
}

/// Execute the `plansow init` command: write config file.
fn cmd_init(db_url: &str, force: bool) -> anyhow::Result<()> {
    let path = config::config_path();

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}\nUse --force to overwrite.",
            path.display()
        );
    }

    let cfg = config::ConfigFile {
        database: config::DatabaseSection {
            url: db_url.to_string(),
        },
    };

    config::save_config(&cfg)?;

    println!("Config written to {}", path.display());
    println!("  database.url = {db_url}");
    println!();
    println!("Next: run `plansow db-init` to create and migrate the database.");

    Ok(())
}

/// Execute the `plansow db-init` command: create database and run migrations.
async fn cmd_db_init(cli_db_url: Option<&str>) -> anyhow::Result<()> {
    let resolved = PlansowConfig::resolve(cli_db_url)?;

    println!("Initializing plansow database...");

    pool::ensure_database_exists(&resolved.db_config).await?;
    let db_pool = pool::create_pool(&resolved.db_config).await?;
    pool::run_migrations(&db_pool).await?;

    let counts = pool::table_counts(&db_pool).await?;
    println!("Database ready. Tables:");
    for (table, count) in &counts {
        println!("  {table}: {count} rows");
    }

    db_pool.close().await;

    println!("plansow db-init complete.");
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(err) = run(cli).await {
        eprintln!("{}", render_error(&err));
        std::process::exit(1);
    }
    Ok(())
}

/// User-facing scheduling errors print their own message; anything else
/// prints the whole context chain.
fn render_error(err: &anyhow::Error) -> String {
    match err.downcast_ref::<ScheduleError>() {
        Some(e) if e.is_user_facing() => format!("error: {e}"),
        _ => format!("error: {err:#}"),
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let today = resolve::today(cli.today);

    match cli.command {
        Commands::Init { db_url, force } => {
            cmd_init(&db_url, force)?;
        }
        Commands::DbInit => {
            cmd_db_init(cli.database_url.as_deref()).await?;
        }
        Commands::Bed { command } => {
            let resolved = PlansowConfig::resolve(cli.database_url.as_deref())?;
            let db_pool = pool::create_pool(&resolved.db_config).await?;
            let result = catalog_cmds::run_bed_command(command, &db_pool).await;
            db_pool.close().await;
            result?;
        }
        Commands::Plant { command } => {
            let resolved = PlansowConfig::resolve(cli.database_url.as_deref())?;
            let db_pool = pool::create_pool(&resolved.db_config).await?;
            let result = catalog_cmds::run_plant_command(command, &db_pool).await;
            db_pool.close().await;
            result?;
        }
        Commands::Treatment { command } => {
            let resolved = PlansowConfig::resolve(cli.database_url.as_deref())?;
            let db_pool = pool::create_pool(&resolved.db_config).await?;
            let result = catalog_cmds::run_treatment_command(command, &db_pool).await;
            db_pool.close().await;
            result?;
        }
        Commands::Pest { command } => {
            let resolved = PlansowConfig::resolve(cli.database_url.as_deref())?;
            let db_pool = pool::create_pool(&resolved.db_config).await?;
            let result = pest_cmds::run_pest_command(command, &db_pool).await;
            db_pool.close().await;
            result?;
        }
        Commands::Care { command } => {
            let resolved = PlansowConfig::resolve(cli.database_url.as_deref())?;
            let db_pool = pool::create_pool(&resolved.db_config).await?;
            let result = catalog_cmds::run_care_command(command, &db_pool).await;
            db_pool.close().await;
            result?;
        }
        Commands::Planting { command } => {
            let resolved = PlansowConfig::resolve(cli.database_url.as_deref())?;
            let db_pool = pool::create_pool(&resolved.db_config).await?;
            let result = planting_cmds::run_planting_command(command, &db_pool, today).await;
            db_pool.close().await;
            result?;
        }
        Commands::Maintain {
            planting_id,
            treatment,
            care,
            anchor,
            every,
            notes,
        } => {
            let resolved = PlansowConfig::resolve(cli.database_url.as_deref())?;
            let db_pool = pool::create_pool(&resolved.db_config).await?;
            let request = planting_cmds::MaintainArgs {
                planting_id,
                treatment,
                care,
                anchor: anchor.unwrap_or(today),
                every,
                notes,
            };
            let result = planting_cmds::run_maintain(&db_pool, request).await;
            db_pool.close().await;
            result?;
        }
        Commands::Events { command } => {
            let resolved = PlansowConfig::resolve(cli.database_url.as_deref())?;
            let db_pool = pool::create_pool(&resolved.db_config).await?;
            let result = event_cmds::run_event_command(command, &db_pool, today).await;
            db_pool.close().await;
            result?;
        }
        Commands::Season { command } => {
            let resolved = PlansowConfig::resolve(cli.database_url.as_deref())?;
            let db_pool = pool::create_pool(&resolved.db_config).await?;
            let result = season_cmds::run_season_command(command, &db_pool, today).await;
            db_pool.close().await;
            result?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("plansow").chain(args.iter().copied()))
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn today_flag_is_global() {
        let cli = parse(&["events", "list", "--today", "2024-06-01"]).unwrap();
        assert_eq!(cli.today, NaiveDate::from_ymd_opt(2024, 6, 1));
    }

    #[test]
    fn malformed_today_is_rejected() {
        let err = parse(&["--today", "06/01/2024", "season", "list"]).err().unwrap();
        assert!(err.to_string().contains("expected YYYY-MM-DD"), "{err}");
    }

    #[test]
    fn maintain_requires_exactly_one_template() {
        let id = "00000000-0000-0000-0000-000000000001";
        assert!(parse(&["maintain", id]).is_err());
        assert!(parse(&["maintain", id, "--treatment", "Neem", "--care", "Water"]).is_err());

        let cli = parse(&["maintain", id, "--care", "Water", "--every", "3"]).unwrap();
        match cli.command {
            Commands::Maintain { care, every, treatment, .. } => {
                assert_eq!(care.as_deref(), Some("Water"));
                assert_eq!(every, Some(3));
                assert!(treatment.is_none());
            }
            _ => panic!("expected maintain"),
        }
    }

    #[test]
    fn planting_add_collects_repeated_plants() {
        let cli = parse(&[
            "planting", "add", "--bed", "North", "--plant", "Tomato:4", "--plant", "Basil",
            "--start-type", "transplant",
        ])
        .unwrap();
        match cli.command {
            Commands::Planting {
                command: PlantingCommands::Add { plants, start_type, start, .. },
            } => {
                assert_eq!(plants, vec!["Tomato:4", "Basil"]);
                assert_eq!(start_type, StartType::Transplant);
                assert!(start.is_none());
            }
            _ => panic!("expected planting add"),
        }
    }

    #[test]
    fn planting_add_needs_a_species() {
        assert!(parse(&["planting", "add", "--bed", "North"]).is_err());
    }

    #[test]
    fn event_status_parses_from_text() {
        let cli = parse(&["events", "list", "--status", "completed"]).unwrap();
        match cli.command {
            Commands::Events {
                command: EventCommands::List { status, .. },
            } => assert_eq!(status, Some(EventStatus::Completed)),
            _ => panic!("expected events list"),
        }
        assert!(parse(&["events", "list", "--status", "done"]).is_err());
    }

    #[test]
    fn upcoming_conflicts_with_explicit_range() {
        assert!(parse(&["events", "list", "--upcoming", "--from", "2024-01-01"]).is_err());
    }

    #[test]
    fn user_facing_errors_render_without_context_chain() {
        use anyhow::Context;

        let err = Err::<(), _>(ScheduleError::validation("end date is before start date"))
            .context("while closing planting")
            .unwrap_err();
        assert_eq!(
            render_error(&err),
            "error: validation failed: end date is before start date"
        );

        let missing = anyhow::Error::from(ScheduleError::not_found("planting", uuid::Uuid::nil()));
        assert_eq!(
            render_error(&missing),
            format!("error: planting {} not found", uuid::Uuid::nil())
        );

        let store = anyhow::anyhow!("connection reset").context("failed to list events");
        assert_eq!(
            render_error(&store),
            "error: failed to list events: connection reset"
        );
    }

    #[test]
    fn pest_link_parses_severity() {
        let cli = parse(&["pest", "link", "Tomato", "Aphid", "--severity", "high"]).unwrap();
        match cli.command {
            Commands::Pest {
                command: PestCommands::Link { plant, pest, severity, .. },
            } => {
                assert_eq!(plant, "Tomato");
                assert_eq!(pest, "Aphid");
                assert_eq!(severity, Some(Severity::High));
            }
            _ => panic!("expected pest link"),
        }
        assert!(parse(&["pest", "link", "Tomato", "Aphid", "--severity", "severe"]).is_err());
    }

    #[test]
    fn treatment_add_accepts_target_pest() {
        let cli = parse(&["treatment", "add", "Soap spray", "--pest", "Aphid", "--every", "7"])
            .unwrap();
        match cli.command {
            Commands::Treatment {
                command: TreatmentCommands::Add { pest, every, .. },
            } => {
                assert_eq!(pest.as_deref(), Some("Aphid"));
                assert_eq!(every, Some(7));
            }
            _ => panic!("expected treatment add"),
        }
    }

    #[test]
    fn unknown_action_type_is_rejected() {
        assert!(parse(&["care", "add", "Prune", "--action-type", "mowing"]).is_err());
        assert!(parse(&["care", "add", "Prune", "--action-type", "pruning"]).is_ok());
    }
}
