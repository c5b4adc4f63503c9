//! Typed loaders for class templates and their participants.

use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::db::schema::{class_template, template_participant};
use crate::model::participant::TemplateParticipant;
use crate::model::template::ClassTemplate;

/// ## Summary
/// Fetches one template by id.
///
/// ## Errors
/// Returns a database error if the query fails.
pub async fn find_by_id(
    conn: &mut crate::db::connection::DbConnection<'_>,
    template_id: uuid::Uuid,
) -> diesel::QueryResult<Option<ClassTemplate>> {
    class_template::table
        .filter(class_template::id.eq(template_id))
        .select(ClassTemplate::as_select())
        .first(conn)
        .await
        .optional()
}

/// ## Summary
/// Fetches the current participant set for a template, ordered by student
/// id so repeated reads project identically.
///
/// ## Errors
/// Returns a database error if the query fails.
pub async fn participants_for(
    conn: &mut crate::db::connection::DbConnection<'_>,
    template_id: uuid::Uuid,
) -> diesel::QueryResult<Vec<TemplateParticipant>> {
    template_participant::table
        .filter(template_participant::template_id.eq(template_id))
        .order(template_participant::student_id.asc())
        .select(TemplateParticipant::as_select())
        .load(conn)
        .await
}

/// ## Summary
/// Fetches a template together with its current participants.
///
/// ## Errors
/// Returns a database error if either query fails.
pub async fn find_with_participants(
    conn: &mut crate::db::connection::DbConnection<'_>,
    template_id: uuid::Uuid,
) -> diesel::QueryResult<Option<(ClassTemplate, Vec<TemplateParticipant>)>> {
    let Some(template) = find_by_id(conn, template_id).await? else {
        return Ok(None);
    };
    let participants = participants_for(conn, template_id).await?;
    Ok(Some((template, participants)))
}

#[cfg(test)]
mod tests {
    #[expect(unused_imports)]
    use super::*;

    #[test]
    fn test_template_queries_compile() {
        // This test just verifies the function signatures compile
        // Integration tests with database would go in the tests module
    }
}
