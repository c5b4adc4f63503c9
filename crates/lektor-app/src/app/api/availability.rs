use chrono::TimeDelta;
use salvo::{Depot, Request, Response, Router, handler, http::StatusCode, writing::Json};
use tracing::error;

use crate::app::api::respond::{ErrorResponse, query_datetime, render_service_error};
use crate::db_handler::get_db_from_depot;
use lektor_core::availability::CandidateSlot;
use lektor_service::scheduling::availability::check_slot;

/// ## Summary
/// GET /api/teachers/{teacher_id}/availability?start=..&duration_minutes=..
/// resolves whether the slot can be booked with this teacher right now.
/// The verdict is advisory; booking paths re-check before writing.
///
/// ## Errors
/// Returns HTTP 400 for a malformed id, start, or duration
#[handler]
async fn availability_handler(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    tracing::debug!("Processing availability request");

    let Some(teacher_id_str) = req.param::<String>("teacher_id") else {
        res.status_code(StatusCode::BAD_REQUEST);
        res.render(Json(ErrorResponse::new(
            "invalid_request",
            "Missing teacher id",
        )));
        return;
    };
    let Ok(teacher_id) = uuid::Uuid::parse_str(&teacher_id_str) else {
        res.status_code(StatusCode::BAD_REQUEST);
        res.render(Json(ErrorResponse::new(
            "invalid_request",
            "Malformed teacher id",
        )));
        return;
    };

    let start = match query_datetime(req, "start") {
        Ok(v) => v,
        Err(payload) => {
            res.status_code(StatusCode::BAD_REQUEST);
            res.render(Json(payload));
            return;
        }
    };
    let duration_minutes = match req.query::<i64>("duration_minutes") {
        Some(minutes) if minutes > 0 => minutes,
        _ => {
            res.status_code(StatusCode::BAD_REQUEST);
            res.render(Json(ErrorResponse::new(
                "invalid_request",
                "duration_minutes must be a positive integer",
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
                "internal_error",
                "Database unavailable",
            )));
            return;
        }
    };

    let slot = CandidateSlot {
        start,
        duration: TimeDelta::minutes(duration_minutes),
    };
    match check_slot(&mut conn, teacher_id, slot, chrono::Utc::now()).await {
        Ok(verdict) => {
            res.render(Json(verdict));
        }
        Err(err) => render_service_error(res, &err),
    }
}

#[must_use]
pub fn routes() -> Router {
    Router::with_path("teachers")
        .push(Router::with_path("<teacher_id>/availability").get(availability_handler))
}
