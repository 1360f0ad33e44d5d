use chrono::NaiveDate;
use tracing::{info, warn};
use uuid::Uuid;

use plansow_db::models::{NewPlanting, Plant, Planting, PlantingUpdate};

use crate::error::{Result, ScheduleError};
use crate::overlap::find_overlaps;
use crate::period::{Period, validate_bounds};
use crate::progress::{Progress, SpeciesTiming, compute_progress};
use crate::store::ScheduleStore;

use super::{SchedulingService, WithOverlaps};

impl<S: ScheduleStore> SchedulingService<S> {
    async fn require_planting(&self, id: Uuid) -> Result<Planting> {
        self.store
            .get_planting(id)
            .await?
            .ok_or_else(|| ScheduleError::not_found("planting", id))
    }

    /// Create a planting. Overlapping an active planting in the same bed is
    /// reported, not refused.
    pub async fn create_planting(
        &self,
        new: NewPlanting,
        today: NaiveDate,
    ) -> Result<WithOverlaps<Planting>> {
        if new.members.is_empty() {
            return Err(ScheduleError::validation(
                "a planting needs at least one species",
            ));
        }
        validate_bounds(new.start_date, new.end_date)?;

        let in_bed = self.store.list_plantings_for_bed(new.bed_id).await?;
        let candidate = Period::new(new.start_date, new.end_date);
        let overlaps_with: Vec<Uuid> = find_overlaps(&candidate, &in_bed, today)
            .into_iter()
            .map(|p| p.id)
            .collect();
        if !overlaps_with.is_empty() {
            warn!(
                bed_id = %new.bed_id,
                overlapping = overlaps_with.len(),
                "new planting overlaps active plantings in the same bed"
            );
        }

        let planting = self.store.insert_planting(&new).await?;
        info!(
            planting_id = %planting.id,
            bed_id = %planting.bed_id,
            species = new.members.len(),
            "planting created"
        );

        Ok(WithOverlaps {
            value: planting,
            overlaps_with,
        })
    }

    /// Apply a typed update. An empty update returns the planting as is.
    pub async fn update_planting(&self, id: Uuid, update: PlantingUpdate) -> Result<Planting> {
        let current = self.require_planting(id).await?;
        if update.is_empty() {
            return Ok(current);
        }

        let mut preview = current;
        update.apply(&mut preview);
        validate_bounds(preview.start_date, preview.end_date)?;

        self.store
            .update_planting(id, &update)
            .await?
            .ok_or_else(|| ScheduleError::not_found("planting", id))
    }

    /// End a planting on `end_date`, or on `today` when not given.
    pub async fn close_planting(
        &self,
        id: Uuid,
        end_date: Option<NaiveDate>,
        today: NaiveDate,
    ) -> Result<Planting> {
        let end = end_date.unwrap_or(today);
        let closed = self
            .update_planting(id, PlantingUpdate::new().with_end_date(Some(end)))
            .await?;
        info!(planting_id = %id, end_date = %end, "planting closed");
        Ok(closed)
    }

    pub async fn planting_species(&self, planting_id: Uuid) -> Result<Vec<Plant>> {
        Ok(self.store.planting_species(planting_id).await?)
    }

    /// Lifecycle phase and completion of a planting as of `today`.
    pub async fn progress(&self, planting_id: Uuid, today: NaiveDate) -> Result<Progress> {
        let planting = self.require_planting(planting_id).await?;
        let species = self.store.planting_species(planting_id).await?;
        let timings: Vec<SpeciesTiming> = species.iter().map(SpeciesTiming::from).collect();
        Ok(compute_progress(planting.start_date, &timings, today))
    }
}
