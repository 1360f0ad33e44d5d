//! The `ScheduleStore` trait -- the persistence boundary of the scheduling
//! facade.
//!
//! [`PgStore`] is backed by the `plansow-db` queries; [`InMemoryStore`]
//! keeps everything in process and is used by tests and dry runs.

mod memory;
mod pg;

pub use memory::InMemoryStore;
pub use pg::PgStore;

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use plansow_db::models::{
    EventFilter, EventKind, MaintenanceAssignment, MaintenanceTemplate, NewAssignment, NewEvent,
    NewPlanting, NewSeason, Plant, PlantCare, Planting, PlantingUpdate, ScheduledEvent, Season,
};

/// Storage operations the scheduling facade needs.
///
/// Lookups return `Ok(None)` for missing rows; the facade turns that into
/// a `NotFound` error. Any `Err` is a storage failure and is passed through.
#[async_trait]
pub trait ScheduleStore: Send + Sync {
    async fn get_planting(&self, id: Uuid) -> Result<Option<Planting>>;

    /// Species attached to a planting.
    async fn planting_species(&self, planting_id: Uuid) -> Result<Vec<Plant>>;

    async fn list_plantings_for_bed(&self, bed_id: Uuid) -> Result<Vec<Planting>>;

    async fn insert_planting(&self, new: &NewPlanting) -> Result<Planting>;

    async fn update_planting(&self, id: Uuid, update: &PlantingUpdate)
    -> Result<Option<Planting>>;

    async fn get_template(&self, kind: EventKind) -> Result<Option<MaintenanceTemplate>>;

    /// Store an assignment with its events atomically. Dates already
    /// scheduled for the same planting and template are skipped; only the
    /// events actually created are returned.
    async fn insert_assignment(
        &self,
        new: &NewAssignment,
        dates: &[NaiveDate],
    ) -> Result<(MaintenanceAssignment, Vec<ScheduledEvent>)>;

    /// Store free-standing events with the same duplicate rule as
    /// [`ScheduleStore::insert_assignment`].
    async fn insert_events(&self, events: &[NewEvent]) -> Result<Vec<ScheduledEvent>>;

    async fn care_links_for_planting(&self, planting_id: Uuid) -> Result<Vec<PlantCare>>;

    /// Events matching `filter`, ordered by date then creation.
    async fn list_events(&self, filter: &EventFilter) -> Result<Vec<ScheduledEvent>>;

    async fn get_event(&self, id: Uuid) -> Result<Option<ScheduledEvent>>;

    /// Complete a pending event. `None` when the event is missing or was
    /// already completed.
    async fn complete_event(&self, id: Uuid, date: NaiveDate) -> Result<Option<ScheduledEvent>>;

    async fn list_seasons(&self) -> Result<Vec<Season>>;

    async fn get_season(&self, id: Uuid) -> Result<Option<Season>>;

    async fn insert_season(&self, new: &NewSeason) -> Result<Season>;

    async fn set_season_end(&self, id: Uuid, end: Option<NaiveDate>) -> Result<Option<Season>>;
}

const _: () = {
    fn _assert_object_safe(_: &dyn ScheduleStore) {}
};
