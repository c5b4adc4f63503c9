use chrono::{DateTime, Utc};
use salvo::{Depot, Request, Response, Router, handler, http::StatusCode, writing::Json};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::app::api::respond::{ErrorResponse, caller_from_request, render_service_error};
use crate::db_handler::get_db_from_depot;
use lektor_core::types::ParticipantStatus;
use lektor_service::scheduling::materialize::materialize_occurrence;

/// ## Summary
/// Materialize request payload
#[derive(Debug, Deserialize)]
pub struct MaterializeRequest {
    pub template_id: uuid::Uuid,
    pub occurrence_start: DateTime<Utc>,
    pub trigger_reason: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ParticipantPayload {
    pub student_id: uuid::Uuid,
    pub status: ParticipantStatus,
}

/// ## Summary
/// Materialize response payload
#[derive(Debug, Serialize)]
pub struct MaterializeResponse {
    pub materialized_class_id: uuid::Uuid,
    pub participants: Vec<ParticipantPayload>,
}

/// ## Summary
/// POST /api/occurrences/materialize - converts one virtual occurrence into
/// its durable record, or returns the existing record if any caller already
/// did. Always safe to retry.
///
/// ## Errors
/// Returns HTTP 400 for malformed caller headers or body
/// Returns HTTP 403 if the caller is neither a participant nor the owner
/// Returns HTTP 404 if the template does not exist
/// Returns HTTP 410 if the occurrence falls after the series end
/// Returns HTTP 503 for transient store failures (retry is safe)
#[handler]
async fn materialize_handler(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    tracing::debug!("Processing materialize request");

    let caller = match caller_from_request(req) {
        Ok(c) => c,
        Err(payload) => {
            res.status_code(StatusCode::BAD_REQUEST);
            res.render(Json(payload));
            return;
        }
    };

    let body: MaterializeRequest = match req.parse_json().await {
        Ok(r) => r,
        Err(e) => {
            error!(error = ?e, "Failed to parse materialize request");
            res.status_code(StatusCode::BAD_REQUEST);
            res.render(Json(ErrorResponse::new(
                "invalid_request",
                "Invalid request body",
            )));
            return;
        }
    };

    let provider = match get_db_from_depot(depot) {
        Ok(p) => p,
        Err(e) => {
            error!(error = ?e, "Failed to get database provider");
            res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
            res.render(Json(ErrorResponse::new(
                "internal_error",
                "Internal server error",
            )));
            return;
        }
    };

    let mut conn = match provider.get_connection().await {
        Ok(c) => c,
        Err(e) => {
            error!(error = ?e, "Failed to get database connection");
            res.status_code(StatusCode::SERVICE_UNAVAILABLE);
            res.render(Json(ErrorResponse::new(
                "participant_copy_failed",
                "Database unavailable",
            )));
            return;
        }
    };

    let outcome = match materialize_occurrence(
        &mut conn,
        body.template_id,
        body.occurrence_start,
        &caller,
        body.trigger_reason,
    )
    .await
    {
        Ok(outcome) => outcome,
        Err(err) => {
            render_service_error(res, &err);
            return;
        }
    };

    tracing::info!(
        class_id = %outcome.class.id,
        template_id = %body.template_id,
        already_existed = outcome.already_existed,
        "Materialize request completed"
    );

    res.status_code(if outcome.already_existed {
        StatusCode::OK
    } else {
        StatusCode::CREATED
    });
    res.render(Json(MaterializeResponse {
        materialized_class_id: outcome.class.id,
        participants: outcome
            .participants
            .into_iter()
            .map(|participant| ParticipantPayload {
                student_id: participant.student_id,
                status: participant.status.into(),
            })
            .collect(),
    }));
}

#[must_use]
pub fn routes() -> Router {
    Router::with_path("occurrences").push(Router::with_path("materialize").post(materialize_handler))
}
