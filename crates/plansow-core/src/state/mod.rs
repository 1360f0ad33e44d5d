//! Scheduled event state machine.
//!
//! An event is created `pending` and moves to `completed` exactly once.
//! There is no way back.

use chrono::NaiveDate;
use uuid::Uuid;

use plansow_db::models::{EventStatus, ScheduledEvent};

use crate::error::{Result, ScheduleError};
use crate::store::ScheduleStore;

/// The scheduled event state machine.
///
/// ```text
/// pending -> completed
/// ```
pub struct EventStateMachine;

impl EventStateMachine {
    pub fn is_valid_transition(from: EventStatus, to: EventStatus) -> bool {
        matches!((from, to), (EventStatus::Pending, EventStatus::Completed))
    }

    /// Complete an event on `completed_date`.
    ///
    /// The store update is guarded on the event still being pending. When
    /// it matches nothing the event is re-read to tell a missing event
    /// from one that was already completed.
    pub async fn complete<S: ScheduleStore + ?Sized>(
        store: &S,
        event_id: Uuid,
        completed_date: NaiveDate,
    ) -> Result<ScheduledEvent> {
        if let Some(event) = store.complete_event(event_id, completed_date).await? {
            return Ok(event);
        }

        match store.get_event(event_id).await? {
            None => Err(ScheduleError::not_found("event", event_id)),
            Some(event) => {
                let from = event.status();
                debug_assert!(!Self::is_valid_transition(from, EventStatus::Completed));
                Err(ScheduleError::InvalidTransition {
                    from,
                    to: EventStatus::Completed,
                })
            }
        }
    }
}
