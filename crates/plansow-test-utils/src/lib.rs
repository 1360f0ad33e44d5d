//! Shared PostgreSQL for plansow database integration tests.
//!
//! Every test gets its own freshly migrated database inside one server:
//! - **`PLANSOW_TEST_PG_URL`** set: use that server directly (a local
//!   PostgreSQL or a container started by CI).
//! - **No env var**: start a container via testcontainers, shared per test
//!   binary through a `OnceCell`.
//!
//! [`fixtures`] inserts the catalog rows most tests need.

use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::{Executor, PgPool};
use testcontainers::ContainerAsync;
use testcontainers::ImageExt;
use testcontainers::runners::AsyncRunner;
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;
use uuid::Uuid;

use plansow_db::pool;

/// Env var naming an already running server (no database name appended).
pub const PG_URL_ENV: &str = "PLANSOW_TEST_PG_URL";

struct SharedPg {
    base_url: String,
    /// Keeps the container alive. `None` with an external server.
    _container: Option<ContainerAsync<Postgres>>,
}

static SHARED_PG: OnceCell<SharedPg> = OnceCell::const_new();

async fn init_shared_pg() -> SharedPg {
    if let Ok(url) = std::env::var(PG_URL_ENV) {
        return SharedPg {
            base_url: url.trim_end_matches('/').to_owned(),
            _container: None,
        };
    }

    let container = Postgres::default()
        .with_tag("16")
        .start()
        .await
        .expect("failed to start PostgreSQL container");

    let host = container.get_host().await.expect("failed to get host");
    let port = container
        .get_host_port_ipv4(5432)
        .await
        .expect("failed to get mapped port");

    SharedPg {
        base_url: format!("postgresql://postgres:postgres@{host}:{port}"),
        _container: Some(container),
    }
}

/// Base URL of the shared server.
pub async fn pg_url() -> &'static str {
    let shared = SHARED_PG.get_or_init(init_shared_pg).await;
    &shared.base_url
}

async fn maintenance_pool() -> PgPool {
    let base_url = pg_url().await;
    PgPoolOptions::new()
        .max_connections(1)
        .acquire_timeout(Duration::from_secs(30))
        .connect(&format!("{base_url}/postgres"))
        .await
        .expect("failed to connect to maintenance database")
}

/// A uniquely named, migrated database. Call [`TestDb::cleanup`] at the end of
/// the test.
pub struct TestDb {
    pub pool: PgPool,
    pub name: String,
}

impl TestDb {
    pub async fn create() -> Self {
        let maint = maintenance_pool().await;
        let name = format!("plansow_test_{}", Uuid::new_v4().simple());
        maint
            .execute(format!("CREATE DATABASE {name}").as_str())
            .await
            .unwrap_or_else(|e| panic!("failed to create temp database {name}: {e}"));
        maint.close().await;

        let url = format!("{}/{name}", pg_url().await);
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(30))
            .connect(&url)
            .await
            .unwrap_or_else(|e| panic!("failed to connect to temp database {name}: {e}"));

        pool::run_migrations(&pool)
            .await
            .expect("migrations should succeed");

        Self { pool, name }
    }

    /// Close the pool and drop the database, terminating stray sessions.
    pub async fn cleanup(self) {
        self.pool.close().await;

        let maint = maintenance_pool().await;
        let terminate = format!(
            "SELECT pg_terminate_backend(pid) \
             FROM pg_stat_activity \
             WHERE datname = '{}' AND pid <> pg_backend_pid()",
            self.name
        );
        let _ = maint.execute(terminate.as_str()).await;
        let _ = maint
            .execute(format!("DROP DATABASE IF EXISTS {}", self.name).as_str())
            .await;
        maint.close().await;
    }
}

/// Catalog and planting rows for tests. Everything panics on failure.
pub mod fixtures {
    use chrono::NaiveDate;
    use sqlx::PgPool;
    use uuid::Uuid;

    use plansow_db::models::{
        ActionType, Bed, CareAction, NewBed, NewCareAction, NewPest, NewPlant, NewPlanting,
        NewPlantingMember, NewTreatment, Pest, Plant, Planting, StartType, Treatment,
    };
    use plansow_db::queries::{beds, catalog, pests, plantings, plants};

    pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid calendar date")
    }

    pub async fn bed(pool: &PgPool, name: &str) -> Bed {
        beds::insert_bed(
            pool,
            &NewBed {
                name: name.to_owned(),
                ..Default::default()
            },
        )
        .await
        .expect("insert bed")
    }

    pub async fn plant(
        pool: &PgPool,
        name: &str,
        growth_days: Option<i32>,
        harvest_period_days: Option<i32>,
    ) -> Plant {
        plants::insert_plant(
            pool,
            &NewPlant {
                name: name.to_owned(),
                growth_days,
                harvest_period_days,
                ..Default::default()
            },
        )
        .await
        .expect("insert plant")
    }

    pub async fn treatment(pool: &PgPool, name: &str, every: Option<i32>) -> Treatment {
        catalog::insert_treatment(
            pool,
            &NewTreatment {
                name: name.to_owned(),
                default_frequency_days: every,
                is_ecological: true,
                ..Default::default()
            },
        )
        .await
        .expect("insert treatment")
    }

    pub async fn pest(pool: &PgPool, name: &str) -> Pest {
        pests::insert_pest(
            pool,
            &NewPest {
                name: name.to_owned(),
                ..Default::default()
            },
        )
        .await
        .expect("insert pest")
    }

    pub async fn care_action(pool: &PgPool, name: &str, every: Option<i32>) -> CareAction {
        catalog::insert_care_action(
            pool,
            &NewCareAction {
                name: name.to_owned(),
                description: None,
                action_type: ActionType::Watering,
                default_frequency_days: every,
            },
        )
        .await
        .expect("insert care action")
    }

    pub async fn planting(
        pool: &PgPool,
        bed_id: Uuid,
        species: &[Uuid],
        start_date: NaiveDate,
        end_date: Option<NaiveDate>,
    ) -> Planting {
        plantings::insert_planting(
            pool,
            &NewPlanting {
                bed_id,
                start_date,
                end_date,
                start_type: StartType::Seed,
                notes: None,
                members: species
                    .iter()
                    .map(|&id| NewPlantingMember::new(id, 1))
                    .collect(),
            },
        )
        .await
        .expect("insert planting")
    }
}
