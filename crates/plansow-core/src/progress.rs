//! Lifecycle phase and completion percentages for a planting.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use plansow_db::models::Plant;

/// Where a planting is in its life. Ordered: a planting only moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Growing,
    Harvesting,
    Ended,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Growing => "growing",
            Self::Harvesting => "harvesting",
            Self::Ended => "ended",
        };
        f.write_str(s)
    }
}

/// The timing fields of a species that progress depends on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpeciesTiming {
    pub growth_days: Option<i32>,
    pub harvest_period_days: Option<i32>,
}

impl From<&Plant> for SpeciesTiming {
    fn from(plant: &Plant) -> Self {
        Self {
            growth_days: plant.growth_days,
            harvest_period_days: plant.harvest_period_days,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub phase: Phase,
    /// 0..=100
    pub growth_progress: u8,
    /// 0..=100, only while harvesting or after a harvest window.
    pub harvest_progress: Option<u8>,
    /// Negative when the planting starts in the future.
    pub days_since_start: i64,
    pub days_to_harvest: Option<i64>,
    pub days_to_harvest_end: Option<i64>,
}

/// Compute the progress of a planting started on `start` holding `species`.
///
/// The slowest species decides: growth and harvest windows are the maxima
/// over the species that define them.
pub fn compute_progress(start: NaiveDate, species: &[SpeciesTiming], today: NaiveDate) -> Progress {
    let days_since_start = (today - start).num_days();

    // Without a growth window the counters fall back to 0.
    let unknown = |phase, harvest_days: Option<i64>| Progress {
        phase,
        growth_progress: 0,
        harvest_progress: None,
        days_since_start,
        days_to_harvest: Some(0),
        days_to_harvest_end: Some(harvest_days.unwrap_or(0)),
    };

    if species.is_empty() {
        return unknown(Phase::Ended, None);
    }

    let max_growth = species
        .iter()
        .filter_map(|s| s.growth_days)
        .max()
        .map(i64::from);
    let max_harvest = species
        .iter()
        .filter_map(|s| s.harvest_period_days)
        .max()
        .map(i64::from);

    let Some(growth) = max_growth else {
        return unknown(Phase::Growing, max_harvest);
    };

    if days_since_start < growth {
        let days_to_harvest = growth - days_since_start;
        return Progress {
            phase: Phase::Growing,
            growth_progress: percent(days_since_start, growth),
            harvest_progress: None,
            days_since_start,
            days_to_harvest: Some(days_to_harvest),
            days_to_harvest_end: Some(days_to_harvest + max_harvest.unwrap_or(0)),
        };
    }

    if let Some(harvest) = max_harvest {
        if days_since_start < growth + harvest {
            return Progress {
                phase: Phase::Harvesting,
                growth_progress: 100,
                harvest_progress: Some(percent(days_since_start - growth, harvest)),
                days_since_start,
                days_to_harvest: Some(0),
                days_to_harvest_end: Some(growth + harvest - days_since_start),
            };
        }
    }

    Progress {
        phase: Phase::Ended,
        growth_progress: 100,
        harvest_progress: max_harvest.map(|_| 100),
        days_since_start,
        days_to_harvest: Some(0),
        days_to_harvest_end: Some(0),
    }
}

/// `part / whole * 100`, rounded half up and clamped to 0..=100.
///
/// A non-positive `whole` is a window that is already over.
fn percent(part: i64, whole: i64) -> u8 {
    if whole <= 0 {
        return if part >= whole { 100 } else { 0 };
    }
    let rounded = (200 * part + whole).div_euclid(2 * whole);
    // Clamped to 0..=100, the cast cannot truncate.
    rounded.clamp(0, 100) as u8
}
