//! Checks applied before a treatment or care action is attached to a
//! planting.

use chrono::NaiveDate;

use plansow_db::models::Planting;

use crate::error::{Result, ScheduleError};

/// An assignment may not be anchored before its planting starts.
pub fn validate_assignment(planting: &Planting, anchor: NaiveDate) -> Result<()> {
    if anchor < planting.start_date {
        return Err(ScheduleError::validation(format!(
            "anchor date {anchor} precedes planting start {}",
            planting.start_date
        )));
    }
    Ok(())
}

/// Effective repeat interval: the explicit override, else the template's
/// default. `None` means a single event.
pub fn resolve_frequency(override_days: Option<i32>, template_default: Option<i32>) -> Option<i32> {
    override_days.or(template_default)
}
