use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// How a planting was started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum StartType {
    Seed,
    Seedling,
    Transplant,
}

impl fmt::Display for StartType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Seed => "seed",
            Self::Seedling => "seedling",
            Self::Transplant => "transplant",
        };
        f.write_str(s)
    }
}

impl FromStr for StartType {
    type Err = StartTypeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "seed" => Ok(Self::Seed),
            "seedling" => Ok(Self::Seedling),
            "transplant" => Ok(Self::Transplant),
            other => Err(StartTypeParseError(other.to_owned())),
        }
    }
}

/// Error returned when parsing an invalid [`StartType`] string.
#[derive(Debug, Clone)]
pub struct StartTypeParseError(pub String);

impl fmt::Display for StartTypeParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid start type: {:?} (expected seed, seedling, or transplant)",
            self.0
        )
    }
}

impl std::error::Error for StartTypeParseError {}

// ---------------------------------------------------------------------------

/// Category of a care action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    Pruning,
    Pinching,
    Tutoring,
    Fertilizing,
    Watering,
    Other,
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pruning => "pruning",
            Self::Pinching => "pinching",
            Self::Tutoring => "tutoring",
            Self::Fertilizing => "fertilizing",
            Self::Watering => "watering",
            Self::Other => "other",
        };
        f.write_str(s)
    }
}

impl FromStr for ActionType {
    type Err = ActionTypeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pruning" => Ok(Self::Pruning),
            "pinching" => Ok(Self::Pinching),
            "tutoring" => Ok(Self::Tutoring),
            "fertilizing" => Ok(Self::Fertilizing),
            "watering" => Ok(Self::Watering),
            "other" => Ok(Self::Other),
            other => Err(ActionTypeParseError(other.to_owned())),
        }
    }
}

/// Error returned when parsing an invalid [`ActionType`] string.
#[derive(Debug, Clone)]
pub struct ActionTypeParseError(pub String);

impl fmt::Display for ActionTypeParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid action type: {:?}", self.0)
    }
}

impl std::error::Error for ActionTypeParseError {}

// ---------------------------------------------------------------------------

/// How badly a pest affects a plant species.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        };
        f.write_str(s)
    }
}

impl FromStr for Severity {
    type Err = SeverityParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(SeverityParseError(other.to_owned())),
        }
    }
}

/// Error returned when parsing an invalid [`Severity`] string.
#[derive(Debug, Clone)]
pub struct SeverityParseError(pub String);

impl fmt::Display for SeverityParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid severity: {:?} (expected low, medium, or high)",
            self.0
        )
    }
}

impl std::error::Error for SeverityParseError {}

// ---------------------------------------------------------------------------

/// Status of a scheduled event. Derived from the `completed` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    Pending,
    Completed,
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
        };
        f.write_str(s)
    }
}

impl FromStr for EventStatus {
    type Err = EventStatusParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            other => Err(EventStatusParseError(other.to_owned())),
        }
    }
}

/// Error returned when parsing an invalid [`EventStatus`] string.
#[derive(Debug, Clone)]
pub struct EventStatusParseError(pub String);

impl fmt::Display for EventStatusParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid event status: {:?}", self.0)
    }
}

impl std::error::Error for EventStatusParseError {}

// ---------------------------------------------------------------------------

/// What a maintenance assignment or scheduled event refers to: exactly one
/// treatment or exactly one care action.
///
/// Storage keeps this as two nullable columns behind a CHECK constraint;
/// [`EventKind::from_columns`] is the only way back from that shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "snake_case")]
pub enum EventKind {
    Treatment(Uuid),
    CareAction(Uuid),
}

impl EventKind {
    /// Rebuild the variant from the `(treatment_id, care_action_id)` columns.
    pub fn from_columns(
        treatment_id: Option<Uuid>,
        care_action_id: Option<Uuid>,
    ) -> Result<Self, EventKindError> {
        match (treatment_id, care_action_id) {
            (Some(t), None) => Ok(Self::Treatment(t)),
            (None, Some(c)) => Ok(Self::CareAction(c)),
            (Some(treatment), Some(care_action)) => Err(EventKindError::Both {
                treatment,
                care_action,
            }),
            (None, None) => Err(EventKindError::Neither),
        }
    }

    pub fn treatment_id(&self) -> Option<Uuid> {
        match self {
            Self::Treatment(id) => Some(*id),
            Self::CareAction(_) => None,
        }
    }

    pub fn care_action_id(&self) -> Option<Uuid> {
        match self {
            Self::Treatment(_) => None,
            Self::CareAction(id) => Some(*id),
        }
    }

    /// The id of the referenced template, whichever kind it is.
    pub fn template_id(&self) -> Uuid {
        match self {
            Self::Treatment(id) | Self::CareAction(id) => *id,
        }
    }

    /// Short label for the template kind ("treatment" or "care action").
    pub fn label(&self) -> &'static str {
        match self {
            Self::Treatment(_) => "treatment",
            Self::CareAction(_) => "care action",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.label(), self.template_id())
    }
}

/// A stored row broke the "exactly one of treatment / care action" rule.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EventKindError {
    #[error("row references both treatment {treatment} and care action {care_action}")]
    Both { treatment: Uuid, care_action: Uuid },

    #[error("row references neither a treatment nor a care action")]
    Neither,
}

// ---------------------------------------------------------------------------
// Row structs
// ---------------------------------------------------------------------------

/// A raised bed.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Bed {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// A plant species in the catalog.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Plant {
    pub id: Uuid,
    pub name: String,
    pub scientific_name: Option<String>,
    pub icon: Option<String>,
    /// Days from planting until harvest begins.
    pub growth_days: Option<i32>,
    /// How long the harvest window lasts.
    pub harvest_period_days: Option<i32>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A planting (one or more species sown together in a bed).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Planting {
    pub id: Uuid,
    pub bed_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub start_type: StartType,
    pub notes: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Join row linking a planting to one species.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PlantingMember {
    pub planting_id: Uuid,
    pub plant_id: Uuid,
    pub quantity_planted: i32,
    pub quantity_grown: i32,
}

/// A pest in the catalog.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Pest {
    pub id: Uuid,
    pub name: String,
    pub scientific_name: Option<String>,
    pub description: Option<String>,
    pub symptoms: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Catalog link: a species is susceptible to a pest.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PlantPest {
    pub id: Uuid,
    pub plant_id: Uuid,
    pub pest_id: Uuid,
    pub severity: Option<Severity>,
    pub notes: Option<String>,
}

/// A pest as seen from one species: the pest plus the link's severity.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PestExposure {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub pest: Pest,
    pub severity: Option<Severity>,
    #[sqlx(rename = "link_notes")]
    pub notes: Option<String>,
}

/// A treatment in the catalog.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Treatment {
    pub id: Uuid,
    /// The pest this treatment targets, if any.
    pub pest_id: Option<Uuid>,
    pub name: String,
    pub description: Option<String>,
    pub application_method: Option<String>,
    pub default_frequency_days: Option<i32>,
    pub is_ecological: bool,
    pub created_at: DateTime<Utc>,
}

/// A care action in the catalog (pruning, watering, ...).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CareAction {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub action_type: ActionType,
    pub default_frequency_days: Option<i32>,
    pub created_at: DateTime<Utc>,
}

/// Catalog link recommending a care action for a species, timed relative to
/// the planting start.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PlantCare {
    pub id: Uuid,
    pub plant_id: Uuid,
    pub care_action_id: Uuid,
    pub days_after_planting: Option<i32>,
    pub frequency_days: Option<i32>,
    pub notes: Option<String>,
}

/// A treatment or care action viewed as a schedule template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaintenanceTemplate {
    pub kind: EventKind,
    pub name: String,
    pub default_frequency_days: Option<i32>,
}

/// A treatment or care action attached to a planting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaintenanceAssignment {
    pub id: Uuid,
    pub planting_id: Uuid,
    pub template: EventKind,
    pub anchor_date: NaiveDate,
    pub frequency_days: Option<i32>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Raw `maintenance_assignments` row.
#[derive(Debug, Clone, FromRow)]
pub struct MaintenanceAssignmentRow {
    pub id: Uuid,
    pub planting_id: Uuid,
    pub treatment_id: Option<Uuid>,
    pub care_action_id: Option<Uuid>,
    pub anchor_date: NaiveDate,
    pub frequency_days: Option<i32>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<MaintenanceAssignmentRow> for MaintenanceAssignment {
    type Error = EventKindError;

    fn try_from(row: MaintenanceAssignmentRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            planting_id: row.planting_id,
            template: EventKind::from_columns(row.treatment_id, row.care_action_id)?,
            anchor_date: row.anchor_date,
            frequency_days: row.frequency_days,
            notes: row.notes,
            created_at: row.created_at,
        })
    }
}

/// A dated maintenance event on a planting's calendar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledEvent {
    pub id: Uuid,
    pub planting_id: Uuid,
    pub assignment_id: Option<Uuid>,
    pub kind: EventKind,
    pub scheduled_date: NaiveDate,
    pub completed: bool,
    pub completed_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ScheduledEvent {
    pub fn status(&self) -> EventStatus {
        if self.completed {
            EventStatus::Completed
        } else {
            EventStatus::Pending
        }
    }
}

/// Raw `scheduled_events` row.
#[derive(Debug, Clone, FromRow)]
pub struct ScheduledEventRow {
    pub id: Uuid,
    pub planting_id: Uuid,
    pub assignment_id: Option<Uuid>,
    pub treatment_id: Option<Uuid>,
    pub care_action_id: Option<Uuid>,
    pub scheduled_date: NaiveDate,
    pub completed: bool,
    pub completed_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<ScheduledEventRow> for ScheduledEvent {
    type Error = EventKindError;

    fn try_from(row: ScheduledEventRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            planting_id: row.planting_id,
            assignment_id: row.assignment_id,
            kind: EventKind::from_columns(row.treatment_id, row.care_action_id)?,
            scheduled_date: row.scheduled_date,
            completed: row.completed,
            completed_date: row.completed_date,
            notes: row.notes,
            created_at: row.created_at,
        })
    }
}

/// A growing season.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Season {
    pub id: Uuid,
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub description: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Insert payloads and update records
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewBed {
    pub name: String,
    pub description: Option<String>,
    pub location: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewPlant {
    pub name: String,
    pub scientific_name: Option<String>,
    pub icon: Option<String>,
    pub growth_days: Option<i32>,
    pub harvest_period_days: Option<i32>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewPest {
    pub name: String,
    pub scientific_name: Option<String>,
    pub description: Option<String>,
    pub symptoms: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPlantPest {
    pub plant_id: Uuid,
    pub pest_id: Uuid,
    pub severity: Option<Severity>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewTreatment {
    pub pest_id: Option<Uuid>,
    pub name: String,
    pub description: Option<String>,
    pub application_method: Option<String>,
    pub default_frequency_days: Option<i32>,
    pub is_ecological: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCareAction {
    pub name: String,
    pub description: Option<String>,
    pub action_type: ActionType,
    pub default_frequency_days: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPlantCare {
    pub plant_id: Uuid,
    pub care_action_id: Uuid,
    pub days_after_planting: Option<i32>,
    pub frequency_days: Option<i32>,
    pub notes: Option<String>,
}

/// One species to attach to a new planting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPlantingMember {
    pub plant_id: Uuid,
    pub quantity_planted: i32,
    pub quantity_grown: i32,
}

impl NewPlantingMember {
    pub fn new(plant_id: Uuid, quantity: i32) -> Self {
        Self {
            plant_id,
            quantity_planted: quantity,
            quantity_grown: quantity,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPlanting {
    pub bed_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub start_type: StartType,
    pub notes: Option<String>,
    pub members: Vec<NewPlantingMember>,
}

/// A maintenance assignment ready to be stored. The frequency is the
/// effective one, already resolved against the template default.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAssignment {
    pub planting_id: Uuid,
    pub template: EventKind,
    pub anchor_date: NaiveDate,
    pub frequency_days: Option<i32>,
    pub notes: Option<String>,
}

/// An event to insert without a parent assignment (care calendar seeding).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewEvent {
    pub planting_id: Uuid,
    pub kind: EventKind,
    pub scheduled_date: NaiveDate,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewSeason {
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub description: Option<String>,
    pub notes: Option<String>,
}

impl Default for NewPlanting {
    fn default() -> Self {
        Self {
            bed_id: Uuid::nil(),
            start_date: NaiveDate::default(),
            end_date: None,
            start_type: StartType::Seed,
            notes: None,
            members: Vec::new(),
        }
    }
}

/// Typed partial update for a planting. Unset fields are left unchanged.
///
/// `end_date` is doubly optional: `Some(None)` clears the end date.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlantingUpdate {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<Option<NaiveDate>>,
    pub start_type: Option<StartType>,
    pub notes: Option<String>,
}

impl PlantingUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_start_date(mut self, date: NaiveDate) -> Self {
        self.start_date = Some(date);
        self
    }

    pub fn with_end_date(mut self, date: Option<NaiveDate>) -> Self {
        self.end_date = Some(date);
        self
    }

    pub fn with_start_type(mut self, start_type: StartType) -> Self {
        self.start_type = Some(start_type);
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Apply the update in place. Touching the end date also sets the
    /// active flag: an end date closes the planting, clearing it reopens.
    pub fn apply(&self, planting: &mut Planting) {
        if let Some(start) = self.start_date {
            planting.start_date = start;
        }
        if let Some(end) = self.end_date {
            planting.end_date = end;
            planting.is_active = end.is_none();
        }
        if let Some(start_type) = self.start_type {
            planting.start_type = start_type;
        }
        if let Some(notes) = &self.notes {
            planting.notes = Some(notes.clone());
        }
    }
}

/// Criteria for listing scheduled events. Every field is optional and the
/// date bounds are inclusive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventFilter {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub status: Option<EventStatus>,
    pub planting_id: Option<Uuid>,
    pub bed_id: Option<Uuid>,
}

impl EventFilter {
    /// Whether `event` passes the filter. `bed_id` is the bed of the event's
    /// planting, needed only when the filter restricts by bed.
    pub fn matches(&self, event: &ScheduledEvent, bed_id: Option<Uuid>) -> bool {
        if self.from.is_some_and(|from| event.scheduled_date < from) {
            return false;
        }
        if self.to.is_some_and(|to| event.scheduled_date > to) {
            return false;
        }
        if self.status.is_some_and(|status| event.status() != status) {
            return false;
        }
        if self.planting_id.is_some_and(|id| event.planting_id != id) {
            return false;
        }
        if let Some(bed) = self.bed_id {
            if bed_id != Some(bed) {
                return false;
            }
        }
        true
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
