//! Cultivation scheduling and progress engine.
//!
//! The pure parts ([`period`], [`progress`], [`recurrence`],
//! [`assignment`], [`overlap`]) take every input, including today's date,
//! as arguments. [`service::SchedulingService`] wires them to a
//! [`store::ScheduleStore`].

pub mod assignment;
pub mod error;
pub mod overlap;
pub mod period;
pub mod progress;
pub mod recurrence;
pub mod service;
pub mod state;
pub mod store;

pub use error::{Result, ScheduleError};
