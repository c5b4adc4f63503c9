use salvo::{Depot, Request, Response, Router, handler, http::StatusCode, writing::Json};
use serde::Serialize;
use tracing::error;

use crate::app::api::respond::{ErrorResponse, query_datetime, render_service_error};
use crate::db_handler::get_db_from_depot;
use lektor_core::expand::{VirtualOccurrence, Window};
use lektor_service::scheduling::expand::expand_window;

#[derive(Debug, Serialize)]
struct OccurrencesResponse {
    occurrences: Vec<VirtualOccurrence>,
}

/// ## Summary
/// GET /api/templates/{template_id}/occurrences?from=..&to=.. - expands a
/// recurring class into its virtual occurrences within the half-open
/// window. Nothing is written; calendars call this on every render.
///
/// ## Errors
/// Returns HTTP 400 for a malformed id or window
/// Returns HTTP 404 if the template does not exist
#[handler]
async fn occurrences_handler(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    tracing::debug!("Processing template expansion request");

    let Some(template_id_str) = req.param::<String>("template_id") else {
        res.status_code(StatusCode::BAD_REQUEST);
        res.render(Json(ErrorResponse::new(
            "invalid_request",
            "Missing template id",
        )));
        return;
    };
    let Ok(template_id) = uuid::Uuid::parse_str(&template_id_str) else {
        res.status_code(StatusCode::BAD_REQUEST);
        res.render(Json(ErrorResponse::new(
            "invalid_request",
            "Malformed template id",
        )));
        return;
    };

    let from = match query_datetime(req, "from") {
        Ok(v) => v,
        Err(payload) => {
            res.status_code(StatusCode::BAD_REQUEST);
            res.render(Json(payload));
            return;
        }
    };
    let to = match query_datetime(req, "to") {
        Ok(v) => v,
        Err(payload) => {
            res.status_code(StatusCode::BAD_REQUEST);
            res.render(Json(payload));
            return;
        }
    };
    if from >= to {
        res.status_code(StatusCode::BAD_REQUEST);
        res.render(Json(ErrorResponse::new(
            "invalid_request",
            "The window start must precede its end",
        )));
        return;
    }

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

    match expand_window(&mut conn, template_id, Window { from, to }).await {
        Ok(occurrences) => {
            res.render(Json(OccurrencesResponse { occurrences }));
        }
        Err(err) => render_service_error(res, &err),
    }
}

#[must_use]
pub fn routes() -> Router {
    Router::with_path("templates")
        .push(Router::with_path("<template_id>/occurrences").get(occurrences_handler))
}
