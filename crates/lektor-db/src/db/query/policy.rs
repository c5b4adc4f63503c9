//! Cancellation-policy lookup.

use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::db::schema::cancellation_policy;
use crate::model::policy::CancellationPolicyRow;

/// ## Summary
/// Fetches the single active policy for a teacher, if one exists. A missing
/// row is not an error; callers substitute the configured default.
///
/// ## Errors
/// Returns a database error if the query fails.
pub async fn active_for_teacher(
    conn: &mut crate::db::connection::DbConnection<'_>,
    teacher_id: uuid::Uuid,
) -> diesel::QueryResult<Option<CancellationPolicyRow>> {
    cancellation_policy::table
        .filter(cancellation_policy::teacher_id.eq(teacher_id))
        .filter(cancellation_policy::is_active.eq(true))
        .select(CancellationPolicyRow::as_select())
        .first(conn)
        .await
        .optional()
}

#[cfg(test)]
mod tests {
    #[expect(unused_imports)]
    use super::*;

    #[test]
    fn test_policy_queries_compile() {
        // This test just verifies the function signatures compile
    }
}
