use chrono::NaiveDate;
use tracing::{info, warn};
use uuid::Uuid;

use plansow_db::models::{NewSeason, Season};

use crate::error::{Result, ScheduleError};
use crate::overlap::find_overlaps;
use crate::period::{AsPeriod, Period, validate_bounds};
use crate::store::ScheduleStore;

use super::{SchedulingService, WithOverlaps};

const MAX_SEASON_NAME_CHARS: usize = 100;

impl<S: ScheduleStore> SchedulingService<S> {
    /// Create a season. Overlapping an active season is reported, not
    /// refused.
    pub async fn create_season(
        &self,
        mut new: NewSeason,
        today: NaiveDate,
    ) -> Result<WithOverlaps<Season>> {
        new.name = new.name.trim().to_owned();
        if new.name.is_empty() {
            return Err(ScheduleError::validation("season name is required"));
        }
        if new.name.chars().count() > MAX_SEASON_NAME_CHARS {
            return Err(ScheduleError::validation(format!(
                "season name must be at most {MAX_SEASON_NAME_CHARS} characters"
            )));
        }
        validate_bounds(new.start_date, new.end_date)?;

        let existing = self.store.list_seasons().await?;
        let candidate = Period::new(new.start_date, new.end_date);
        let overlaps_with: Vec<Uuid> = find_overlaps(&candidate, &existing, today)
            .into_iter()
            .map(|s| s.id)
            .collect();
        for other in existing.iter().filter(|s| overlaps_with.contains(&s.id)) {
            warn!(season = %new.name, other = %other.name, "new season overlaps an active season");
        }

        let season = self.store.insert_season(&new).await?;
        info!(season_id = %season.id, name = %season.name, "season created");

        Ok(WithOverlaps {
            value: season,
            overlaps_with,
        })
    }

    pub async fn list_seasons(&self) -> Result<Vec<Season>> {
        Ok(self.store.list_seasons().await?)
    }

    /// Close a season on `end_date`, or on `today` when not given. A season
    /// whose planned end is still ahead can be closed early.
    pub async fn close_season(
        &self,
        id: Uuid,
        end_date: Option<NaiveDate>,
        today: NaiveDate,
    ) -> Result<Season> {
        let season = self
            .store
            .get_season(id)
            .await?
            .ok_or_else(|| ScheduleError::not_found("season", id))?;

        if season.period().is_closed(today) {
            return Err(ScheduleError::validation(format!(
                "season {:?} is already closed (ended {})",
                season.name,
                season.end_date.unwrap_or(today)
            )));
        }
        let end = end_date.unwrap_or(today);
        validate_bounds(season.start_date, Some(end))?;

        let closed = self
            .store
            .set_season_end(id, Some(end))
            .await?
            .ok_or_else(|| ScheduleError::not_found("season", id))?;
        info!(season_id = %id, end_date = %end, "season closed");
        Ok(closed)
    }

    /// Clear a season's end date.
    pub async fn reopen_season(&self, id: Uuid) -> Result<Season> {
        let season = self
            .store
            .set_season_end(id, None)
            .await?
            .ok_or_else(|| ScheduleError::not_found("season", id))?;
        info!(season_id = %id, "season reopened");
        Ok(season)
    }

    /// The active season that started most recently.
    pub async fn current_season(&self, today: NaiveDate) -> Result<Option<Season>> {
        let seasons = self.store.list_seasons().await?;
        Ok(seasons
            .into_iter()
            .filter(|s| s.period().is_active(today))
            .max_by_key(|s| s.start_date))
    }
}
