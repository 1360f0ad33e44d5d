//! The scheduling facade.
//!
//! [`SchedulingService`] ties the pure engine (periods, progress,
//! recurrence, validation, overlap) to a [`ScheduleStore`]. Every operation
//! that depends on the calendar takes `today` as an argument.

mod events;
mod maintenance;
mod plantings;
mod seasons;

pub use events::{EventGroups, UPCOMING_DAYS, group_by_status};
pub use maintenance::{MaintenanceOutcome, NewMaintenance};

use serde::Serialize;
use uuid::Uuid;

use crate::store::ScheduleStore;

/// A newly created item plus the ids of active items it overlaps.
///
/// Overlaps are advisory: the item has been stored either way.
#[derive(Debug, Clone, Serialize)]
pub struct WithOverlaps<T> {
    pub value: T,
    pub overlaps_with: Vec<Uuid>,
}

impl<T> WithOverlaps<T> {
    pub fn has_overlap(&self) -> bool {
        !self.overlaps_with.is_empty()
    }
}

pub struct SchedulingService<S> {
    store: S,
}

impl<S: ScheduleStore> SchedulingService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}
