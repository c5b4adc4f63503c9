//! Service (offering) lookup.

use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::db::schema::service;
use crate::model::calendar::ServiceRow;

/// ## Summary
/// Fetches one service by id.
///
/// ## Errors
/// Returns a database error if the query fails.
pub async fn find_by_id(
    conn: &mut crate::db::connection::DbConnection<'_>,
    service_id: uuid::Uuid,
) -> diesel::QueryResult<Option<ServiceRow>> {
    service::table
        .filter(service::id.eq(service_id))
        .select(ServiceRow::as_select())
        .first(conn)
        .await
        .optional()
}
