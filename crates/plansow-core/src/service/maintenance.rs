use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use plansow_db::models::{EventKind, MaintenanceAssignment, NewAssignment, NewEvent, ScheduledEvent};

use crate::assignment::{resolve_frequency, validate_assignment};
use crate::error::{Result, ScheduleError};
use crate::recurrence::{care_plan, expand_events};
use crate::store::ScheduleStore;

use super::SchedulingService;

/// Request to attach a treatment or care action to a planting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMaintenance {
    pub anchor_date: NaiveDate,
    /// Overrides the template's default frequency.
    pub frequency_override: Option<i32>,
    pub notes: Option<String>,
}

impl NewMaintenance {
    pub fn on(anchor_date: NaiveDate) -> Self {
        Self {
            anchor_date,
            frequency_override: None,
            notes: None,
        }
    }

    pub fn every(mut self, days: i32) -> Self {
        self.frequency_override = Some(days);
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MaintenanceOutcome {
    pub assignment: MaintenanceAssignment,
    pub created_events: Vec<ScheduledEvent>,
    /// Dates that already held an event for this planting and template.
    pub duplicates_skipped: usize,
}

impl<S: ScheduleStore> SchedulingService<S> {
    /// Attach `template` to a planting and schedule its events.
    ///
    /// The assignment and its events are stored atomically by the store.
    pub async fn add_maintenance(
        &self,
        planting_id: Uuid,
        template: EventKind,
        request: NewMaintenance,
    ) -> Result<MaintenanceOutcome> {
        let planting = self
            .store
            .get_planting(planting_id)
            .await?
            .ok_or_else(|| ScheduleError::not_found("planting", planting_id))?;
        let tmpl = self
            .store
            .get_template(template)
            .await?
            .ok_or_else(|| ScheduleError::not_found(template.label(), template.template_id()))?;

        validate_assignment(&planting, request.anchor_date)?;

        let frequency = resolve_frequency(request.frequency_override, tmpl.default_frequency_days);
        let dates = expand_events(planting.end_date, request.anchor_date, frequency);
        debug!(
            planting_id = %planting_id,
            template = %template,
            frequency = ?frequency,
            count = dates.len(),
            "expanded maintenance schedule"
        );

        let new = NewAssignment {
            planting_id,
            template,
            anchor_date: request.anchor_date,
            frequency_days: frequency,
            notes: request.notes,
        };
        let (assignment, created_events) = self.store.insert_assignment(&new, &dates).await?;
        let duplicates_skipped = dates.len() - created_events.len();

        info!(
            planting_id = %planting_id,
            assignment_id = %assignment.id,
            template = %tmpl.name,
            created = created_events.len(),
            skipped = duplicates_skipped,
            "maintenance assigned"
        );

        Ok(MaintenanceOutcome {
            assignment,
            created_events,
            duplicates_skipped,
        })
    }

    /// Schedule the catalog's recommended care for every species of a
    /// planting. Dates already scheduled are left alone.
    pub async fn seed_care_calendar(
        &self,
        planting_id: Uuid,
        today: NaiveDate,
    ) -> Result<Vec<ScheduledEvent>> {
        let planting = self
            .store
            .get_planting(planting_id)
            .await?
            .ok_or_else(|| ScheduleError::not_found("planting", planting_id))?;

        let links = self.store.care_links_for_planting(planting_id).await?;
        let plan = care_plan(planting.start_date, &links, today);
        if plan.is_empty() {
            return Ok(Vec::new());
        }

        let new: Vec<NewEvent> = plan
            .into_iter()
            .map(|care| NewEvent {
                planting_id,
                kind: EventKind::CareAction(care.care_action_id),
                scheduled_date: care.date,
                notes: care.notes,
            })
            .collect();
        let created = self.store.insert_events(&new).await?;

        info!(
            planting_id = %planting_id,
            planned = new.len(),
            created = created.len(),
            "care calendar seeded"
        );
        Ok(created)
    }
}
