//! Date intervals with an optional end.
//!
//! A missing end date means the period is still running and is treated as
//! extending to +infinity in every comparison.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use plansow_db::models::{Planting, Season};

use crate::error::{Result, ScheduleError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    pub start: NaiveDate,
    pub end: Option<NaiveDate>,
}

impl Period {
    pub fn new(start: NaiveDate, end: Option<NaiveDate>) -> Self {
        Self { start, end }
    }

    pub fn open(start: NaiveDate) -> Self {
        Self { start, end: None }
    }

    /// Started on or before `today` and not yet past its end.
    pub fn is_active(&self, today: NaiveDate) -> bool {
        self.start <= today && self.end.is_none_or(|end| today <= end)
    }

    /// Has an end date on or before `today`.
    pub fn is_closed(&self, today: NaiveDate) -> bool {
        self.end.is_some_and(|end| end <= today)
    }

    /// Length in days, or `None` for an open period.
    pub fn duration_days(&self) -> Option<i64> {
        self.end.map(|end| (end - self.start).num_days())
    }

    pub fn overlaps(&self, other: &Period) -> bool {
        let self_ends_before = self.end.is_some_and(|end| end < other.start);
        let other_ends_before = other.end.is_some_and(|end| end < self.start);
        !(self_ends_before || other_ends_before)
    }
}

/// Anything with a start date and an optional end date.
pub trait AsPeriod {
    fn period(&self) -> Period;
}

impl AsPeriod for Period {
    fn period(&self) -> Period {
        *self
    }
}

impl AsPeriod for Season {
    fn period(&self) -> Period {
        Period::new(self.start_date, self.end_date)
    }
}

impl AsPeriod for Planting {
    fn period(&self) -> Period {
        Period::new(self.start_date, self.end_date)
    }
}

/// Reject an end date earlier than the start date.
pub fn validate_bounds(start: NaiveDate, end: Option<NaiveDate>) -> Result<()> {
    match end {
        Some(end) if end < start => Err(ScheduleError::validation(format!(
            "end date {end} must not be before start date {start}"
        ))),
        _ => Ok(()),
    }
}
