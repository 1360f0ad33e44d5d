use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use sqlx::{Executor, PgPool};
use tracing::{debug, info};

use crate::config::DbConfig;

/// Migrations embedded at compile time from `crates/plansow-db/migrations/`.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!();

/// Every table the garden schema defines, sorted by name.
pub const GARDEN_TABLES: &[&str] = &[
    "beds",
    "care_actions",
    "maintenance_assignments",
    "pests",
    "plant_cares",
    "plant_pests",
    "planting_members",
    "plantings",
    "plants",
    "scheduled_events",
    "seasons",
    "treatments",
];

pub async fn create_pool(config: &DbConfig) -> Result<PgPool> {
    debug!(url = %config.redacted_url(), max = config.max_connections, "connecting");
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(config.acquire_timeout)
        .connect(&config.database_url)
        .await
        .with_context(|| format!("failed to connect to database at {}", config.redacted_url()))?;
    Ok(pool)
}

pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    MIGRATOR
        .run(pool)
        .await
        .context("failed to run database migrations")?;

    info!("garden schema is up to date");
    Ok(())
}

/// `CREATE DATABASE` takes no bind parameters, so names are restricted.
fn is_plain_identifier(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with(|c: char| c.is_ascii_digit())
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Create the configured database through the maintenance database when it
/// does not exist yet.
pub async fn ensure_database_exists(config: &DbConfig) -> Result<()> {
    let db_name = config
        .database_name()
        .context("could not determine database name from URL")?;
    if !is_plain_identifier(db_name) {
        anyhow::bail!("database name {db_name:?} must be letters, digits and underscores");
    }

    let maint = create_pool(&config.maintenance()).await?;

    let exists: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
            .bind(db_name)
            .fetch_one(&maint)
            .await
            .context("failed to query pg_database")?;

    if exists {
        info!(db = db_name, "database already exists");
    } else {
        let stmt = format!("CREATE DATABASE {db_name}");
        maint
            .execute(stmt.as_str())
            .await
            .with_context(|| format!("failed to create database {db_name}"))?;
        info!(db = db_name, "database created");
    }

    maint.close().await;
    Ok(())
}

/// Row count of each table in [`GARDEN_TABLES`].
///
/// Fails naming the first missing table when the schema is incomplete.
pub async fn table_counts(pool: &PgPool) -> Result<Vec<(&'static str, i64)>> {
    let mut counts = Vec::with_capacity(GARDEN_TABLES.len());
    for &table in GARDEN_TABLES {
        let present: bool = sqlx::query_scalar("SELECT to_regclass($1) IS NOT NULL")
            .bind(format!("public.{table}"))
            .fetch_one(pool)
            .await
            .with_context(|| format!("failed to look up table {table}"))?;
        if !present {
            anyhow::bail!("table {table} is missing; run `plansow db-init`");
        }

        let query = format!("SELECT COUNT(*) FROM {table}");
        let count: i64 = sqlx::query_scalar(&query)
            .fetch_one(pool)
            .await
            .with_context(|| format!("failed to count rows in {table}"))?;
        counts.push((table, count));
    }
    Ok(counts)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn garden_tables_are_sorted_and_plain() {
        let mut sorted = GARDEN_TABLES.to_vec();
        sorted.sort_unstable();
        assert_eq!(sorted, GARDEN_TABLES);
        assert!(GARDEN_TABLES.iter().all(|t| is_plain_identifier(t)));
    }

    #[test]
    fn database_names_must_be_plain() {
        assert!(is_plain_identifier("plansow_test_01"));
        assert!(!is_plain_identifier("garden; DROP TABLE beds"));
        assert!(!is_plain_identifier("1garden"));
        assert!(!is_plain_identifier(""));
    }
}
