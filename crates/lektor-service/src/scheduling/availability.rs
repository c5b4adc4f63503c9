//! Availability checks against a teacher's stored calendar.

use chrono::{DateTime, Utc};

use crate::error::ServiceResult;
use lektor_core::availability::{
    Availability, AvailabilityContext, CandidateSlot, resolve_availability,
};
use lektor_db::db::connection::DbConnection;
use lektor_db::db::query::availability;

/// ## Summary
/// Resolves whether `slot` can be booked with this teacher, evaluated
/// against the durable working hours, block-outs, and occupying classes at
/// this instant. Callers on a write path must call this again inside that
/// path; earlier verdicts are not trusted.
///
/// ## Errors
/// Returns database or invariant errors from loading the calendar rows.
#[tracing::instrument(skip(conn))]
pub async fn check_slot(
    conn: &mut DbConnection<'_>,
    teacher_id: uuid::Uuid,
    slot: CandidateSlot,
    now: DateTime<Utc>,
) -> ServiceResult<Availability> {
    let working_hours = availability::working_hours_for(conn, teacher_id)
        .await?
        .iter()
        .map(lektor_db::model::calendar::WorkingHoursRow::to_working_hours)
        .collect::<Result<Vec<_>, _>>()?;
    let blockouts = availability::blockouts_overlapping(conn, teacher_id, slot.start, slot.end())
        .await?
        .iter()
        .map(lektor_db::model::calendar::BlockoutRow::to_blockout)
        .collect();
    let occupied =
        availability::occupying_classes(conn, teacher_id, slot.start, slot.end()).await?;

    let ctx = AvailabilityContext {
        working_hours,
        blockouts,
        occupied,
    };
    let verdict = resolve_availability(&slot, &ctx, now);
    tracing::debug!(teacher_id = %teacher_id, ?verdict, "Slot availability resolved");
    Ok(verdict)
}
