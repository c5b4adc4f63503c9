//! Shared response and caller-extraction helpers for the API handlers.
//!
//! Every service error becomes a stable `{ code, message }` payload; raw
//! store error text never reaches the client.

use salvo::{Request, Response, http::StatusCode, writing::Json};
use serde::Serialize;

use lektor_service::error::ServiceError;
use lektor_service::scheduling::Caller;

/// ## Summary
/// Error response payload
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: &'static str,
    pub message: String,
}

impl ErrorResponse {
    #[must_use]
    pub fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

const fn status_for(err: &ServiceError) -> StatusCode {
    match err {
        ServiceError::TemplateNotFound { .. } => StatusCode::NOT_FOUND,
        ServiceError::TemplateExpired { .. } => StatusCode::GONE,
        ServiceError::NotAParticipant { .. } | ServiceError::NotOwner { .. } => {
            StatusCode::FORBIDDEN
        }
        ServiceError::NotAnOccurrence { .. } | ServiceError::EmptyParticipantList { .. } => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        ServiceError::ParticipantCopyFailed(_) => StatusCode::SERVICE_UNAVAILABLE,
        ServiceError::DatabaseError(_)
        | ServiceError::CoreError(_)
        | ServiceError::DieselError(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn message_for(err: &ServiceError) -> String {
    match err {
        ServiceError::TemplateNotFound { .. } => "The class template does not exist".to_string(),
        ServiceError::TemplateExpired { expired_at, .. } => {
            format!("This recurring class ended on {expired_at}")
        }
        ServiceError::NotAParticipant { .. } => {
            "You are not a participant of this class".to_string()
        }
        ServiceError::NotOwner { .. } => "You do not own this class".to_string(),
        ServiceError::NotAnOccurrence { .. } => {
            "The requested time is not an occurrence of this class".to_string()
        }
        ServiceError::EmptyParticipantList { .. } => {
            "This class has no participants".to_string()
        }
        ServiceError::ParticipantCopyFailed(_) => {
            "A temporary error occurred; please try again".to_string()
        }
        ServiceError::DatabaseError(_)
        | ServiceError::CoreError(_)
        | ServiceError::DieselError(_) => "Internal server error".to_string(),
    }
}

/// ## Summary
/// Renders a service error as its structured code plus a human-readable
/// message, with the matching HTTP status.
pub fn render_service_error(res: &mut Response, err: &ServiceError) {
    if matches!(
        err,
        ServiceError::DatabaseError(_) | ServiceError::CoreError(_) | ServiceError::DieselError(_)
    ) {
        tracing::error!(error = ?err, "Request failed");
    }
    res.status_code(status_for(err));
    res.render(Json(ErrorResponse::new(err.code(), message_for(err))));
}

/// ## Summary
/// Extracts the caller claims from the `x-caller-id` and `x-caller-role`
/// headers. Authentication proper lives outside this subsystem; the
/// service layer re-verifies these claims against durable rows.
///
/// ## Errors
/// Returns an error payload when either header is missing or malformed.
pub fn caller_from_request(req: &Request) -> Result<Caller, ErrorResponse> {
    let Some(id_header) = req.header::<String>("x-caller-id") else {
        return Err(ErrorResponse::new(
            "invalid_request",
            "Missing x-caller-id header",
        ));
    };
    let Ok(id) = uuid::Uuid::parse_str(&id_header) else {
        return Err(ErrorResponse::new(
            "invalid_request",
            "Malformed x-caller-id header",
        ));
    };
    let Some(role_header) = req.header::<String>("x-caller-role") else {
        return Err(ErrorResponse::new(
            "invalid_request",
            "Missing x-caller-role header",
        ));
    };
    let Ok(role) = role_header.parse() else {
        return Err(ErrorResponse::new(
            "invalid_request",
            "Malformed x-caller-role header",
        ));
    };
    Ok(Caller { id, role })
}

/// ## Summary
/// Parses a required RFC 3339 timestamp from the query string.
///
/// ## Errors
/// Returns an error payload when the parameter is missing or malformed.
pub fn query_datetime(
    req: &Request,
    name: &'static str,
) -> Result<chrono::DateTime<chrono::Utc>, ErrorResponse> {
    let Some(raw) = req.query::<String>(name) else {
        return Err(ErrorResponse::new(
            "invalid_request",
            format!("Missing {name} query parameter"),
        ));
    };
    match chrono::DateTime::parse_from_rfc3339(&raw) {
        Ok(parsed) => Ok(parsed.to_utc()),
        Err(_) => Err(ErrorResponse::new(
            "invalid_request",
            format!("Malformed {name} query parameter"),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_error_maps_to_a_stable_code_and_status() {
        let template_id = uuid::Uuid::new_v4();
        let caller_id = uuid::Uuid::new_v4();
        let cases: Vec<(ServiceError, &str, StatusCode)> = vec![
            (
                ServiceError::TemplateNotFound { template_id },
                "template_not_found",
                StatusCode::NOT_FOUND,
            ),
            (
                ServiceError::NotOwner {
                    template_id,
                    caller_id,
                },
                "not_owner",
                StatusCode::FORBIDDEN,
            ),
            (
                ServiceError::ParticipantCopyFailed(anyhow::anyhow!("boom")),
                "participant_copy_failed",
                StatusCode::SERVICE_UNAVAILABLE,
            ),
        ];
        for (err, code, status) in cases {
            assert_eq!(err.code(), code);
            assert_eq!(status_for(&err), status);
        }
    }

    #[test]
    fn store_error_text_never_reaches_the_message() {
        let err = ServiceError::ParticipantCopyFailed(anyhow::anyhow!(
            "duplicate key value violates unique constraint \"secret_constraint\""
        ));
        assert!(!message_for(&err).contains("secret_constraint"));
    }
}
