use chrono::{DateTime, Utc};
use thiserror::Error;

/// Service layer errors - combines all error types
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error(transparent)]
    DatabaseError(#[from] lektor_db::error::DbError),

    #[error(transparent)]
    CoreError(#[from] lektor_core::error::CoreError),

    #[error("Diesel error: {0}")]
    DieselError(#[from] diesel::result::Error),

    #[error("Template not found: {template_id}")]
    TemplateNotFound { template_id: uuid::Uuid },

    #[error("Template {template_id} expired at {expired_at}")]
    TemplateExpired {
        template_id: uuid::Uuid,
        expired_at: DateTime<Utc>,
    },

    #[error("Caller {caller_id} is not a participant of template {template_id}")]
    NotAParticipant {
        template_id: uuid::Uuid,
        caller_id: uuid::Uuid,
    },

    #[error("Caller {caller_id} does not own template {template_id}")]
    NotOwner {
        template_id: uuid::Uuid,
        caller_id: uuid::Uuid,
    },

    #[error("Instant {occurrence_start} is not an occurrence of template {template_id}")]
    NotAnOccurrence {
        template_id: uuid::Uuid,
        occurrence_start: DateTime<Utc>,
    },

    #[error("Template {template_id} has no participants to copy")]
    EmptyParticipantList { template_id: uuid::Uuid },

    /// The atomic insert failed for a reason other than a concurrent
    /// materialization. The transaction rolled back; a retry is safe and
    /// will either succeed fresh or hit the idempotent path.
    #[error("Participant copy failed")]
    ParticipantCopyFailed(#[source] anyhow::Error),
}

impl ServiceError {
    /// Stable machine-readable code for API responses. Store error text is
    /// never part of the code or the user-facing message.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::TemplateNotFound { .. } => "template_not_found",
            Self::TemplateExpired { .. } => "template_expired",
            Self::NotAParticipant { .. } => "not_a_participant",
            Self::NotOwner { .. } => "not_owner",
            Self::NotAnOccurrence { .. } | Self::EmptyParticipantList { .. } => "invalid_request",
            Self::ParticipantCopyFailed(_) => "participant_copy_failed",
            Self::DatabaseError(_) | Self::CoreError(_) | Self::DieselError(_) => "internal_error",
        }
    }

    /// Whether a caller may safely retry the failed call.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ParticipantCopyFailed(_) | Self::DatabaseError(_) | Self::DieselError(_)
        )
    }
}

pub type ServiceResult<T> = std::result::Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authorization_and_not_found_errors_are_not_retryable() {
        let template_id = uuid::Uuid::new_v4();
        let caller_id = uuid::Uuid::new_v4();
        assert!(!ServiceError::TemplateNotFound { template_id }.is_retryable());
        assert!(
            !ServiceError::NotOwner {
                template_id,
                caller_id
            }
            .is_retryable()
        );
        assert!(
            ServiceError::ParticipantCopyFailed(anyhow::anyhow!("connection reset"))
                .is_retryable()
        );
    }
}
