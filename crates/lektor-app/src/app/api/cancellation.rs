use salvo::{Depot, Request, Response, Router, handler, http::StatusCode, writing::Json};
use tracing::error;

use crate::app::api::respond::{
    ErrorResponse, caller_from_request, query_datetime, render_service_error,
};
use crate::config::get_config_from_depot;
use crate::db_handler::get_db_from_depot;
use lektor_service::scheduling::cancellation::cancellation_quote;

/// ## Summary
/// GET /api/occurrences/cancellation-quote computes what cancelling the
/// given occurrence would cost the caller, under the teacher's active
/// policy or the configured default. Nothing is persisted; clients show
/// the quote in a warning banner and recompute it at confirmation time.
///
/// ## Errors
/// Returns HTTP 400 for malformed caller headers or query parameters
#[handler]
async fn quote_handler(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    tracing::debug!("Processing cancellation quote request");

    let caller = match caller_from_request(req) {
        Ok(c) => c,
        Err(payload) => {
            res.status_code(StatusCode::BAD_REQUEST);
            res.render(Json(payload));
            return;
        }
    };

    let Some(teacher_id) = req
        .query::<String>("teacher_id")
        .and_then(|raw| uuid::Uuid::parse_str(&raw).ok())
    else {
        res.status_code(StatusCode::BAD_REQUEST);
        res.render(Json(ErrorResponse::new(
            "invalid_request",
            "Missing or malformed teacher_id query parameter",
        )));
        return;
    };
    let occurrence_start = match query_datetime(req, "occurrence_start") {
        Ok(v) => v,
        Err(payload) => {
            res.status_code(StatusCode::BAD_REQUEST);
            res.render(Json(payload));
            return;
        }
    };
    // Absent service_id means a trial class; malformed is still an error.
    let service_id = match req.query::<String>("service_id") {
        None => None,
        Some(raw) => match uuid::Uuid::parse_str(&raw) {
            Ok(id) => Some(id),
            Err(_) => {
                res.status_code(StatusCode::BAD_REQUEST);
                res.render(Json(ErrorResponse::new(
                    "invalid_request",
                    "Malformed service_id query parameter",
                )));
                return;
            }
        },
    };

    let settings = match get_config_from_depot(depot) {
        Ok(s) => s,
        Err(e) => {
            error!(error = ?e, "Failed to get configuration");
            res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
            res.render(Json(ErrorResponse::new(
                "internal_error",
                "Internal server error",
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

    match cancellation_quote(
        &mut conn,
        &settings.policy,
        teacher_id,
        occurrence_start,
        caller.role,
        service_id,
        chrono::Utc::now(),
    )
    .await
    {
        Ok(quote) => {
            res.render(Json(quote));
        }
        Err(err) => render_service_error(res, &err),
    }
}

#[must_use]
pub fn routes() -> Router {
    Router::with_path("occurrences")
        .push(Router::with_path("cancellation-quote").get(quote_handler))
}
