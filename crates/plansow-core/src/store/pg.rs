use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use plansow_db::models::{
    EventFilter, EventKind, MaintenanceAssignment, MaintenanceTemplate, NewAssignment, NewEvent,
    NewPlanting, NewSeason, Plant, PlantCare, Planting, PlantingUpdate, ScheduledEvent, Season,
};
use plansow_db::queries::{assignments, catalog, events, plantings, plants, seasons};

use super::ScheduleStore;

/// [`ScheduleStore`] over a PostgreSQL pool.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl ScheduleStore for PgStore {
    async fn get_planting(&self, id: Uuid) -> Result<Option<Planting>> {
        plantings::get_planting(&self.pool, id).await
    }

    async fn planting_species(&self, planting_id: Uuid) -> Result<Vec<Plant>> {
        plants::species_for_planting(&self.pool, planting_id).await
    }

    async fn list_plantings_for_bed(&self, bed_id: Uuid) -> Result<Vec<Planting>> {
        plantings::list_plantings_for_bed(&self.pool, bed_id).await
    }

    async fn insert_planting(&self, new: &NewPlanting) -> Result<Planting> {
        plantings::insert_planting(&self.pool, new).await
    }

    async fn update_planting(
        &self,
        id: Uuid,
        update: &PlantingUpdate,
    ) -> Result<Option<Planting>> {
        plantings::update_planting(&self.pool, id, update).await
    }

    async fn get_template(&self, kind: EventKind) -> Result<Option<MaintenanceTemplate>> {
        catalog::get_template(&self.pool, kind).await
    }

    async fn insert_assignment(
        &self,
        new: &NewAssignment,
        dates: &[NaiveDate],
    ) -> Result<(MaintenanceAssignment, Vec<ScheduledEvent>)> {
        assignments::insert_assignment_with_events(&self.pool, new, dates).await
    }

    async fn insert_events(&self, new: &[NewEvent]) -> Result<Vec<ScheduledEvent>> {
        events::insert_events(&self.pool, new).await
    }

    async fn care_links_for_planting(&self, planting_id: Uuid) -> Result<Vec<PlantCare>> {
        catalog::care_links_for_planting(&self.pool, planting_id).await
    }

    async fn list_events(&self, filter: &EventFilter) -> Result<Vec<ScheduledEvent>> {
        events::list_events(&self.pool, filter).await
    }

    async fn get_event(&self, id: Uuid) -> Result<Option<ScheduledEvent>> {
        events::get_event(&self.pool, id).await
    }

    async fn complete_event(&self, id: Uuid, date: NaiveDate) -> Result<Option<ScheduledEvent>> {
        events::complete_event(&self.pool, id, date).await
    }

    async fn list_seasons(&self) -> Result<Vec<Season>> {
        seasons::list_seasons(&self.pool).await
    }

    async fn get_season(&self, id: Uuid) -> Result<Option<Season>> {
        seasons::get_season(&self.pool, id).await
    }

    async fn insert_season(&self, new: &NewSeason) -> Result<Season> {
        seasons::insert_season(&self.pool, new).await
    }

    async fn set_season_end(&self, id: Uuid, end: Option<NaiveDate>) -> Result<Option<Season>> {
        seasons::set_season_end(&self.pool, id, end).await
    }
}
