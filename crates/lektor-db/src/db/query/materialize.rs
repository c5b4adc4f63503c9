//! Occurrence lookup and the atomic class-plus-participants insert.
//!
//! The insert path deliberately does not pre-lock anything: the unique
//! constraint on `(template_id, occurrence_start)` is the single
//! coordination point, and a violation of it is classified here so the
//! service layer can convert the losing side of a race into an idempotent
//! re-read.

use diesel::prelude::*;
use diesel::result::DatabaseErrorKind;
use diesel_async::RunQueryDsl;
use diesel_async::scoped_futures::ScopedFutureExt;

use crate::db::schema::{materialized_class, materialized_participant};
use crate::db::transaction::with_transaction;
use crate::model::materialized::{
    MaterializedClass, MaterializedParticipant, NewMaterializedClass, NewMaterializedParticipant,
};
use lektor_core::identity::OccurrenceKey;

/// ## Summary
/// Looks up the materialized class for one occurrence key, if any.
///
/// ## Errors
/// Returns a database error if the query fails.
pub async fn find_by_occurrence(
    conn: &mut crate::db::connection::DbConnection<'_>,
    key: &OccurrenceKey,
) -> diesel::QueryResult<Option<MaterializedClass>> {
    materialized_class::table
        .filter(materialized_class::template_id.eq(key.template_id))
        .filter(materialized_class::occurrence_start.eq(key.start))
        .select(MaterializedClass::as_select())
        .first(conn)
        .await
        .optional()
}

/// ## Summary
/// Loads the participant snapshots of a materialized class, ordered by
/// student id.
///
/// ## Errors
/// Returns a database error if the query fails.
pub async fn participants_of(
    conn: &mut crate::db::connection::DbConnection<'_>,
    class_id: uuid::Uuid,
) -> diesel::QueryResult<Vec<MaterializedParticipant>> {
    materialized_participant::table
        .filter(materialized_participant::class_id.eq(class_id))
        .order(materialized_participant::student_id.asc())
        .select(MaterializedParticipant::as_select())
        .load(conn)
        .await
}

/// ## Summary
/// Inserts a materialized class and all its participant snapshots as one
/// atomic unit. If the participant insert fails the class row is rolled
/// back with it; a reader never observes a class without participants.
///
/// ## Errors
/// Returns the underlying database error; use [`is_unique_violation`] to
/// detect a concurrent materialization of the same occurrence.
#[tracing::instrument(skip(conn, class, participants), fields(
    template_id = %class.template_id,
    occurrence_start = %class.occurrence_start,
    participant_count = participants.len(),
))]
pub async fn insert_class_with_participants(
    conn: &mut crate::db::connection::DbConnection<'_>,
    class: NewMaterializedClass,
    participants: Vec<NewMaterializedParticipant>,
) -> anyhow::Result<MaterializedClass> {
    with_transaction(conn, |conn| {
        async move {
            let inserted: MaterializedClass = diesel::insert_into(materialized_class::table)
                .values(&class)
                .returning(MaterializedClass::as_returning())
                .get_result(conn)
                .await?;

            diesel::insert_into(materialized_participant::table)
                .values(&participants)
                .execute(conn)
                .await?;

            tracing::debug!(class_id = %inserted.id, "Occurrence materialized");
            Ok(inserted)
        }
        .scope_boxed()
    })
    .await
}

/// ## Summary
/// Whether `err` is a uniqueness violation on the occurrence key, meaning
/// a concurrent caller already materialized this occurrence.
#[must_use]
pub fn is_unique_violation(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<diesel::result::Error>(),
        Some(diesel::result::Error::DatabaseError(
            DatabaseErrorKind::UniqueViolation,
            _
        ))
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unique_violation_classifier_matches_only_unique_errors() {
        let unique: anyhow::Error = diesel::result::Error::DatabaseError(
            DatabaseErrorKind::UniqueViolation,
            Box::new("duplicate key value violates unique constraint".to_string()),
        )
        .into();
        assert!(is_unique_violation(&unique));

        let not_found: anyhow::Error = diesel::result::Error::NotFound.into();
        assert!(!is_unique_violation(&not_found));

        let unrelated = anyhow::anyhow!("connection reset");
        assert!(!is_unique_violation(&unrelated));
    }
}
