//! Template expansion: projecting a recurrence template into virtual
//! occurrences for a requested window.
//!
//! Expansion is a pure projection. It holds no cursor state between calls,
//! so two expansions of the same template over the same window yield
//! identical sequences, which the materialization path relies on.

use chrono::{DateTime, TimeDelta, Utc};

use crate::identity::OccurrenceKey;
use crate::recurrence::Recurrence;
use crate::types::{ClassStatus, ParticipantStatus};

/// Half-open expansion window `[from, to)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Window {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

/// One participant as attached to the template right now.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    serde::Serialize,
    serde::Deserialize,
)]
pub struct ParticipantSnapshot {
    pub student_id: uuid::Uuid,
    pub status: ParticipantStatus,
}

/// The template attributes expansion needs, paired with the **current**
/// participant set. Built from durable rows at expansion time; virtual
/// occurrences are a projection of this, never a frozen copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateProjection {
    pub id: uuid::Uuid,
    pub teacher_id: uuid::Uuid,
    pub service_id: Option<uuid::Uuid>,
    pub anchor_start: DateTime<Utc>,
    pub duration: TimeDelta,
    pub recurrence: Recurrence,
    pub is_group: bool,
    pub is_trial: bool,
    pub notes: Option<String>,
    pub status: ClassStatus,
    pub participants: Vec<ParticipantSnapshot>,
}

/// An ephemeral, computed occurrence. Never persisted; identity is the key.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct VirtualOccurrence {
    pub key: OccurrenceKey,
    pub end: DateTime<Utc>,
    pub teacher_id: uuid::Uuid,
    pub service_id: Option<uuid::Uuid>,
    pub is_group: bool,
    pub is_trial: bool,
    pub notes: Option<String>,
    pub status: ClassStatus,
    pub participants: Vec<ParticipantSnapshot>,
}

/// ## Summary
/// Lazily expands `template` into its occurrences within `window`.
///
/// Emission stops at `window.to` or at the recurrence's own end, whichever
/// comes first. Occurrences before "now" are still emitted; whether they
/// are actionable is the availability resolver's concern.
#[must_use]
pub fn expand(template: &TemplateProjection, window: Window) -> OccurrenceIter<'_> {
    OccurrenceIter {
        template,
        window,
        next_index: 0,
        done: window.to <= window.from,
    }
}

/// Restartable iterator over a template's occurrences in one window.
#[derive(Debug)]
pub struct OccurrenceIter<'a> {
    template: &'a TemplateProjection,
    window: Window,
    next_index: u32,
    done: bool,
}

impl Iterator for OccurrenceIter<'_> {
    type Item = VirtualOccurrence;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        loop {
            let index = self.next_index;
            let template = self.template;
            let rule = template.recurrence;
            if !rule.index_within_end(template.anchor_start, index) {
                self.done = true;
                return None;
            }
            let Some(start) = rule.nth_start(template.anchor_start, index) else {
                self.done = true;
                return None;
            };
            if start >= self.window.to {
                self.done = true;
                return None;
            }
            self.next_index += 1;
            if start < self.window.from {
                continue;
            }
            return Some(VirtualOccurrence {
                key: OccurrenceKey::new(template.id, start),
                end: start + template.duration,
                teacher_id: template.teacher_id,
                service_id: template.service_id,
                is_group: template.is_group,
                is_trial: template.is_trial,
                notes: template.notes.clone(),
                status: template.status,
                participants: template.participants.clone(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recurrence::{Frequency, RecurrenceEnd};
    use chrono::TimeZone;

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    fn weekly_template(end: RecurrenceEnd) -> TemplateProjection {
        TemplateProjection {
            id: uuid::Uuid::new_v4(),
            teacher_id: uuid::Uuid::new_v4(),
            service_id: None,
            anchor_start: utc(2026, 3, 2, 15, 0),
            duration: TimeDelta::minutes(60),
            recurrence: Recurrence {
                frequency: Frequency::Weekly,
                end,
            },
            is_group: false,
            is_trial: false,
            notes: None,
            status: ClassStatus::Confirmed,
            participants: vec![ParticipantSnapshot {
                student_id: uuid::Uuid::new_v4(),
                status: ParticipantStatus::Confirmed,
            }],
        }
    }

    #[test]
    fn weekly_spacing_is_exactly_seven_days_from_anchor() {
        let template = weekly_template(RecurrenceEnd::Never);
        let window = Window {
            from: template.anchor_start,
            to: template.anchor_start + TimeDelta::days(35),
        };
        let starts: Vec<_> = expand(&template, window)
            .map(|occurrence| occurrence.key.start)
            .collect();
        assert_eq!(starts.len(), 5);
        for (k, start) in starts.iter().enumerate() {
            assert_eq!(
                *start,
                template.anchor_start + TimeDelta::days(7 * i64::try_from(k).unwrap())
            );
        }
    }

    #[test]
    fn expansion_is_deterministic_across_calls() {
        let template = weekly_template(RecurrenceEnd::AfterCount(6));
        let window = Window {
            from: template.anchor_start - TimeDelta::days(7),
            to: template.anchor_start + TimeDelta::days(365),
        };
        let first: Vec<_> = expand(&template, window).collect();
        let second: Vec<_> = expand(&template, window).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn window_is_half_open_and_skips_earlier_occurrences() {
        let template = weekly_template(RecurrenceEnd::Never);
        let window = Window {
            from: template.anchor_start + TimeDelta::days(7),
            to: template.anchor_start + TimeDelta::days(21),
        };
        let starts: Vec<_> = expand(&template, window)
            .map(|occurrence| occurrence.key.start)
            .collect();
        // Occurrence at day 21 starts exactly at window.to and is excluded.
        assert_eq!(
            starts,
            vec![
                template.anchor_start + TimeDelta::days(7),
                template.anchor_start + TimeDelta::days(14),
            ]
        );
    }

    #[test]
    fn count_termination_wins_over_a_wider_window() {
        let template = weekly_template(RecurrenceEnd::AfterCount(3));
        let window = Window {
            from: template.anchor_start,
            to: template.anchor_start + TimeDelta::days(3650),
        };
        assert_eq!(expand(&template, window).count(), 3);
    }

    #[test]
    fn monthly_template_anchored_on_the_31st_emits_february() {
        let template = TemplateProjection {
            recurrence: Recurrence {
                frequency: Frequency::Monthly,
                end: RecurrenceEnd::Never,
            },
            anchor_start: utc(2026, 1, 31, 10, 0),
            ..weekly_template(RecurrenceEnd::Never)
        };
        let window = Window {
            from: utc(2026, 1, 1, 0, 0),
            to: utc(2026, 4, 1, 0, 0),
        };
        let starts: Vec<_> = expand(&template, window)
            .map(|occurrence| occurrence.key.start)
            .collect();
        assert_eq!(
            starts,
            vec![
                utc(2026, 1, 31, 10, 0),
                utc(2026, 2, 28, 10, 0),
                utc(2026, 3, 31, 10, 0),
            ]
        );
    }

    #[test]
    fn occurrences_carry_the_current_participant_snapshot() {
        let mut template = weekly_template(RecurrenceEnd::Never);
        let late_joiner = ParticipantSnapshot {
            student_id: uuid::Uuid::new_v4(),
            status: ParticipantStatus::Pending,
        };
        template.participants.push(late_joiner);
        let window = Window {
            from: template.anchor_start,
            to: template.anchor_start + TimeDelta::days(7),
        };
        let occurrence = expand(&template, window).next().unwrap();
        assert_eq!(occurrence.participants, template.participants);
    }

    #[test]
    fn empty_window_yields_nothing() {
        let template = weekly_template(RecurrenceEnd::Never);
        let window = Window {
            from: template.anchor_start,
            to: template.anchor_start,
        };
        assert_eq!(expand(&template, window).count(), 0);
    }
}
