//! Expansion of maintenance schedules into dated events.

use chrono::{Days, NaiveDate, TimeDelta};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use plansow_db::models::PlantCare;

/// How far past the anchor an open-ended planting is scheduled.
pub const DEFAULT_HORIZON_DAYS: u64 = 90;

/// How far back catalog care dates are still worth seeding.
pub const CARE_LOOKBACK_DAYS: u64 = 7;

/// Last date a schedule may reach: the planting's end, or the default
/// horizon after the anchor when the planting is open.
pub fn window_end(planting_end: Option<NaiveDate>, anchor: NaiveDate) -> NaiveDate {
    planting_end.unwrap_or_else(|| {
        anchor
            .checked_add_days(Days::new(DEFAULT_HORIZON_DAYS))
            .unwrap_or(NaiveDate::MAX)
    })
}

/// Dates of a schedule starting at `anchor` and repeating every
/// `frequency_days` until the window closes.
///
/// The anchor is always the first date, even when it lies past the window.
/// A missing or non-positive frequency yields the anchor alone.
pub fn expand_events(
    planting_end: Option<NaiveDate>,
    anchor: NaiveDate,
    frequency_days: Option<i32>,
) -> Vec<NaiveDate> {
    let mut dates = vec![anchor];

    let step = match frequency_days {
        Some(f) if f > 0 => Days::new(f as u64),
        _ => return dates,
    };

    let end = window_end(planting_end, anchor);
    let mut current = anchor;
    while let Some(next) = current.checked_add_days(step) {
        if next > end {
            break;
        }
        dates.push(next);
        current = next;
    }

    dates
}

/// One care action due on a date, derived from the plant catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedCare {
    pub care_action_id: Uuid,
    pub date: NaiveDate,
    pub notes: Option<String>,
}

/// Catalog care links turned into dated care for a planting started on
/// `planting_start`.
///
/// Links without `days_after_planting` are skipped, as are dates more than
/// [`CARE_LOOKBACK_DAYS`] before `today`. Sorted by date.
pub fn care_plan(planting_start: NaiveDate, links: &[PlantCare], today: NaiveDate) -> Vec<PlannedCare> {
    let cutoff = today
        .checked_sub_days(Days::new(CARE_LOOKBACK_DAYS))
        .unwrap_or(NaiveDate::MIN);

    let mut plan: Vec<PlannedCare> = links
        .iter()
        .filter_map(|link| {
            let offset = link.days_after_planting?;
            let date = planting_start.checked_add_signed(TimeDelta::days(i64::from(offset)))?;
            (date >= cutoff).then(|| PlannedCare {
                care_action_id: link.care_action_id,
                date,
                notes: link.notes.clone(),
            })
        })
        .collect();

    plan.sort_by_key(|care| care.date);
    plan
}
