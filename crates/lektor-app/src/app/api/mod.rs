mod availability;
mod cancellation;
mod healthcheck;
mod occurrences;
mod respond;
mod templates;

use salvo::Router;

/// ## Summary
/// Constructs the main API router.
#[must_use]
pub fn routes() -> Router {
    Router::with_path("api")
        .push(healthcheck::routes())
        .push(occurrences::routes())
        .push(cancellation::routes())
        .push(templates::routes())
        .push(availability::routes())
}
