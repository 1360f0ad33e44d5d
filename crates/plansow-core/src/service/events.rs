use chrono::{Days, NaiveDate};
use serde::Serialize;
use uuid::Uuid;

use plansow_db::models::{EventFilter, EventStatus, ScheduledEvent};

use crate::error::Result;
use crate::state::EventStateMachine;
use crate::store::ScheduleStore;

use super::SchedulingService;

/// Length of the default "upcoming" calendar window.
pub const UPCOMING_DAYS: u64 = 30;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EventGroups {
    pub pending: Vec<ScheduledEvent>,
    pub completed: Vec<ScheduledEvent>,
}

/// Split events by status, keeping their order.
pub fn group_by_status(events: Vec<ScheduledEvent>) -> EventGroups {
    let (completed, pending) = events.into_iter().partition(|e| e.completed);
    EventGroups { pending, completed }
}

impl<S: ScheduleStore> SchedulingService<S> {
    pub async fn list_events(&self, filter: &EventFilter) -> Result<Vec<ScheduledEvent>> {
        Ok(self.store.list_events(filter).await?)
    }

    /// Pending events from `today` through the next [`UPCOMING_DAYS`] days.
    pub async fn upcoming_events(&self, today: NaiveDate) -> Result<Vec<ScheduledEvent>> {
        let filter = EventFilter {
            from: Some(today),
            to: Some(
                today
                    .checked_add_days(Days::new(UPCOMING_DAYS))
                    .unwrap_or(NaiveDate::MAX),
            ),
            status: Some(EventStatus::Pending),
            ..Default::default()
        };
        self.list_events(&filter).await
    }

    /// Mark an event completed, on `completed_date` or else `today`.
    pub async fn complete_event(
        &self,
        event_id: Uuid,
        completed_date: Option<NaiveDate>,
        today: NaiveDate,
    ) -> Result<ScheduledEvent> {
        let date = completed_date.unwrap_or(today);
        let event = EventStateMachine::complete(&self.store, event_id, date).await?;
        tracing::info!(event_id = %event_id, completed_date = %date, "event completed");
        Ok(event)
    }
}
