use plansow_db::models::{EventKindError, EventStatus};
use uuid::Uuid;

/// Errors returned by the scheduling engine and its facade.
#[derive(Debug, thiserror::Error)]
pub enum ScheduleError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: Uuid },

    #[error("validation failed: {0}")]
    Validation(String),

    /// A stored event or assignment references both or neither template.
    /// Only reachable through data written outside the facade.
    #[error("constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("invalid event transition: {from} -> {to}")]
    InvalidTransition { from: EventStatus, to: EventStatus },

    #[error(transparent)]
    Store(anyhow::Error),
}

pub type Result<T> = std::result::Result<T, ScheduleError>;

impl ScheduleError {
    pub fn not_found(entity: &'static str, id: Uuid) -> Self {
        Self::NotFound { entity, id }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// True for errors the caller should show to the user as-is.
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            Self::NotFound { .. } | Self::Validation(_) | Self::InvalidTransition { .. }
        )
    }
}

impl From<anyhow::Error> for ScheduleError {
    fn from(err: anyhow::Error) -> Self {
        if let Some(kind) = err.chain().find_map(|c| c.downcast_ref::<EventKindError>()) {
            tracing::error!(error = %err, "stored row violates event kind constraint");
            return Self::ConstraintViolation(kind.to_string());
        }
        Self::Store(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn event_kind_error_in_chain_becomes_constraint_violation() {
        let err: anyhow::Result<()> =
            Err(EventKindError::Neither).context("scheduled event 42 is malformed");
        let mapped = ScheduleError::from(err.unwrap_err());
        assert!(matches!(mapped, ScheduleError::ConstraintViolation(_)));
        assert!(!mapped.is_user_facing());
    }

    #[test]
    fn other_errors_stay_store_errors() {
        let mapped = ScheduleError::from(anyhow::anyhow!("connection reset"));
        match mapped {
            ScheduleError::Store(e) => assert_eq!(e.to_string(), "connection reset"),
            other => panic!("expected Store, got {other:?}"),
        }
    }

    #[test]
    fn display_messages() {
        let id = Uuid::nil();
        assert_eq!(
            ScheduleError::not_found("planting", id).to_string(),
            format!("planting {id} not found")
        );
        assert_eq!(
            ScheduleError::InvalidTransition {
                from: EventStatus::Completed,
                to: EventStatus::Completed,
            }
            .to_string(),
            "invalid event transition: completed -> completed"
        );
    }
}
