//! Loaders feeding the availability resolver.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::db::enums::{ClassStatus, ParticipantStatus};
use crate::db::schema::{blockout, materialized_class, materialized_participant, working_hours};
use crate::model::calendar::{BlockoutRow, WorkingHoursRow};
use crate::model::materialized::MaterializedClass;
use lektor_core::availability::OccupiedSlot;

/// ## Summary
/// Loads all working-hours rows for a teacher.
///
/// ## Errors
/// Returns a database error if the query fails.
pub async fn working_hours_for(
    conn: &mut crate::db::connection::DbConnection<'_>,
    teacher_id: uuid::Uuid,
) -> diesel::QueryResult<Vec<WorkingHoursRow>> {
    working_hours::table
        .filter(working_hours::teacher_id.eq(teacher_id))
        .select(WorkingHoursRow::as_select())
        .load(conn)
        .await
}

/// ## Summary
/// Loads block-out intervals overlapping `[from, to)`.
///
/// ## Errors
/// Returns a database error if the query fails.
pub async fn blockouts_overlapping(
    conn: &mut crate::db::connection::DbConnection<'_>,
    teacher_id: uuid::Uuid,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> diesel::QueryResult<Vec<BlockoutRow>> {
    blockout::table
        .filter(blockout::teacher_id.eq(teacher_id))
        .filter(blockout::start_at.lt(to))
        .filter(blockout::end_at.gt(from))
        .select(BlockoutRow::as_select())
        .load(conn)
        .await
}

/// ## Summary
/// Loads the teacher's materialized classes overlapping `[from, to)` as
/// resolver occupancy inputs, with the count of non-cancelled participants
/// for each.
///
/// Cancelled and completed classes are filtered here; the resolver still
/// re-checks status so callers can feed it rows from other sources.
///
/// ## Errors
/// Returns a database error if any query fails.
pub async fn occupying_classes(
    conn: &mut crate::db::connection::DbConnection<'_>,
    teacher_id: uuid::Uuid,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> diesel::QueryResult<Vec<OccupiedSlot>> {
    let classes: Vec<MaterializedClass> = materialized_class::table
        .filter(materialized_class::teacher_id.eq(teacher_id))
        .filter(materialized_class::occurrence_start.lt(to))
        .filter(materialized_class::occurrence_end.gt(from))
        .filter(materialized_class::status.ne(ClassStatus::Cancelled))
        .filter(materialized_class::status.ne(ClassStatus::Completed))
        .select(MaterializedClass::as_select())
        .load(conn)
        .await?;

    let mut occupied = Vec::with_capacity(classes.len());
    for class in classes {
        let active: i64 = materialized_participant::table
            .filter(materialized_participant::class_id.eq(class.id))
            .filter(materialized_participant::status.ne(ParticipantStatus::Cancelled))
            .count()
            .get_result(conn)
            .await?;
        occupied.push(OccupiedSlot {
            start: class.occurrence_start,
            end: class.occurrence_end,
            status: class.status.into(),
            is_group: class.is_group,
            active_participants: u32::try_from(active).unwrap_or(u32::MAX),
        });
    }
    Ok(occupied)
}

#[cfg(test)]
mod tests {
    #[expect(unused_imports)]
    use super::*;

    #[test]
    fn test_availability_queries_compile() {
        // This test just verifies the function signatures compile
    }
}
