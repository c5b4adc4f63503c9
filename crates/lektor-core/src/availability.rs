//! Availability resolution for candidate booking slots.
//!
//! Pure over its inputs; the current instant is injected so callers and
//! tests control the clock. All interval comparisons use half-open
//! `[start, end)` semantics: a slot ending exactly when another interval
//! starts does not overlap it.

use chrono::{DateTime, Datelike, TimeDelta, Timelike, Utc};

use crate::types::ClassStatus;

/// The slot a caller wants to book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CandidateSlot {
    pub start: DateTime<Utc>,
    pub duration: TimeDelta,
}

impl CandidateSlot {
    #[must_use]
    pub fn end(&self) -> DateTime<Utc> {
        self.start + self.duration
    }
}

/// One recurring working-hours row, minutes from midnight on a weekday.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkingHours {
    pub weekday: chrono::Weekday,
    pub start_minute: u32,
    pub end_minute: u32,
    pub active: bool,
}

/// A one-off block-out interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Blockout {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// An existing durable class occupying time on the teacher's calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OccupiedSlot {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub status: ClassStatus,
    pub is_group: bool,
    pub active_participants: u32,
}

impl OccupiedSlot {
    /// A cancelled or completed class frees its slot, as does a group class
    /// whose participants have all cancelled.
    #[must_use]
    pub const fn occupies(&self) -> bool {
        if !self.status.occupies_slot() {
            return false;
        }
        !(self.is_group && self.active_participants == 0)
    }
}

/// Everything the resolver consults besides the candidate slot itself.
#[derive(Debug, Clone, Default)]
pub struct AvailabilityContext {
    pub working_hours: Vec<WorkingHours>,
    pub blockouts: Vec<Blockout>,
    pub occupied: Vec<OccupiedSlot>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnavailableReason {
    InPast,
    OutsideWorkingHours,
    BlockedOut,
    AlreadyBooked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(tag = "verdict", content = "reason", rename_all = "snake_case")]
pub enum Availability {
    Available,
    Unavailable(UnavailableReason),
}

impl Availability {
    #[must_use]
    pub const fn is_available(self) -> bool {
        matches!(self, Self::Available)
    }
}

fn overlaps(
    a_start: DateTime<Utc>,
    a_end: DateTime<Utc>,
    b_start: DateTime<Utc>,
    b_end: DateTime<Utc>,
) -> bool {
    a_start < b_end && a_end > b_start
}

fn within_working_hours(slot: &CandidateSlot, hours: &[WorkingHours]) -> bool {
    // No configured rows means the teacher has not constrained their week.
    if hours.iter().all(|row| !row.active) {
        return true;
    }
    let start_minute =
        slot.start.time().hour() * 60 + slot.start.time().minute();
    let minutes = slot.duration.num_minutes();
    let Ok(duration_minutes) = u32::try_from(minutes) else {
        return false;
    };
    let Some(end_minute) = start_minute.checked_add(duration_minutes) else {
        return false;
    };
    hours.iter().any(|row| {
        row.active
            && row.weekday == slot.start.weekday()
            && start_minute >= row.start_minute
            && end_minute <= row.end_minute
    })
}

/// ## Summary
/// Decides whether `slot` can be booked given the teacher's working hours,
/// block-outs, and already-occupied time.
///
/// The verdict must be re-evaluated at write time; a prior read is never
/// authoritative.
#[must_use]
pub fn resolve_availability(
    slot: &CandidateSlot,
    ctx: &AvailabilityContext,
    now: DateTime<Utc>,
) -> Availability {
    if slot.start < now {
        return Availability::Unavailable(UnavailableReason::InPast);
    }
    if !within_working_hours(slot, &ctx.working_hours) {
        return Availability::Unavailable(UnavailableReason::OutsideWorkingHours);
    }
    let slot_end = slot.end();
    if ctx
        .blockouts
        .iter()
        .any(|block| overlaps(slot.start, slot_end, block.start, block.end))
    {
        return Availability::Unavailable(UnavailableReason::BlockedOut);
    }
    if ctx.occupied.iter().any(|occupied| {
        occupied.occupies()
            && overlaps(slot.start, slot_end, occupied.start, occupied.end)
    }) {
        return Availability::Unavailable(UnavailableReason::AlreadyBooked);
    }
    Availability::Available
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    fn slot(start: DateTime<Utc>, minutes: i64) -> CandidateSlot {
        CandidateSlot {
            start,
            duration: TimeDelta::minutes(minutes),
        }
    }

    // 2026-06-01 is a Monday.
    const NOW_Y: i32 = 2026;

    fn now() -> DateTime<Utc> {
        utc(NOW_Y, 6, 1, 8, 0)
    }

    #[test]
    fn boundary_touch_with_blockout_does_not_overlap() {
        let ctx = AvailabilityContext {
            blockouts: vec![Blockout {
                start: utc(NOW_Y, 6, 1, 11, 0),
                end: utc(NOW_Y, 6, 1, 12, 0),
            }],
            ..AvailabilityContext::default()
        };
        let verdict = resolve_availability(&slot(utc(NOW_Y, 6, 1, 10, 0), 60), &ctx, now());
        assert_eq!(verdict, Availability::Available);
    }

    #[test]
    fn partial_blockout_overlap_is_unavailable() {
        let ctx = AvailabilityContext {
            blockouts: vec![Blockout {
                start: utc(NOW_Y, 6, 1, 10, 30),
                end: utc(NOW_Y, 6, 1, 11, 30),
            }],
            ..AvailabilityContext::default()
        };
        let verdict = resolve_availability(&slot(utc(NOW_Y, 6, 1, 10, 0), 60), &ctx, now());
        assert_eq!(
            verdict,
            Availability::Unavailable(UnavailableReason::BlockedOut)
        );
    }

    #[test]
    fn slot_in_the_past_is_unavailable() {
        let ctx = AvailabilityContext::default();
        let verdict = resolve_availability(&slot(utc(NOW_Y, 6, 1, 7, 0), 60), &ctx, now());
        assert_eq!(verdict, Availability::Unavailable(UnavailableReason::InPast));
    }

    #[test]
    fn occupied_slot_blocks_unless_cancelled_or_completed() {
        let occupied = |status| OccupiedSlot {
            start: utc(NOW_Y, 6, 1, 10, 0),
            end: utc(NOW_Y, 6, 1, 11, 0),
            status,
            is_group: false,
            active_participants: 1,
        };
        let candidate = slot(utc(NOW_Y, 6, 1, 10, 30), 60);
        for (status, expected) in [
            (
                ClassStatus::Confirmed,
                Availability::Unavailable(UnavailableReason::AlreadyBooked),
            ),
            (ClassStatus::Cancelled, Availability::Available),
            (ClassStatus::Completed, Availability::Available),
        ] {
            let ctx = AvailabilityContext {
                occupied: vec![occupied(status)],
                ..AvailabilityContext::default()
            };
            assert_eq!(resolve_availability(&candidate, &ctx, now()), expected);
        }
    }

    #[test]
    fn group_class_with_no_active_participants_frees_its_slot() {
        let ctx = AvailabilityContext {
            occupied: vec![OccupiedSlot {
                start: utc(NOW_Y, 6, 1, 10, 0),
                end: utc(NOW_Y, 6, 1, 11, 0),
                status: ClassStatus::Confirmed,
                is_group: true,
                active_participants: 0,
            }],
            ..AvailabilityContext::default()
        };
        let verdict = resolve_availability(&slot(utc(NOW_Y, 6, 1, 10, 0), 60), &ctx, now());
        assert_eq!(verdict, Availability::Available);
    }

    #[test]
    fn working_hours_constrain_when_configured() {
        let ctx = AvailabilityContext {
            working_hours: vec![WorkingHours {
                weekday: chrono::Weekday::Mon,
                start_minute: 9 * 60,
                end_minute: 17 * 60,
                active: true,
            }],
            ..AvailabilityContext::default()
        };
        assert!(
            resolve_availability(&slot(utc(NOW_Y, 6, 1, 10, 0), 60), &ctx, now())
                .is_available()
        );
        // Ends at 17:30, outside the window.
        assert_eq!(
            resolve_availability(&slot(utc(NOW_Y, 6, 1, 16, 30), 60), &ctx, now()),
            Availability::Unavailable(UnavailableReason::OutsideWorkingHours)
        );
        // Tuesday has no active row.
        assert_eq!(
            resolve_availability(&slot(utc(NOW_Y, 6, 2, 10, 0), 60), &ctx, now()),
            Availability::Unavailable(UnavailableReason::OutsideWorkingHours)
        );
    }

    #[test]
    fn no_working_hours_rows_means_unconstrained() {
        let ctx = AvailabilityContext::default();
        assert!(
            resolve_availability(&slot(utc(NOW_Y, 6, 6, 23, 0), 60), &ctx, now())
                .is_available()
        );
    }
}
