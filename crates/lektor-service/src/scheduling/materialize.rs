//! The materialization service: converting one virtual occurrence into a
//! durable class record exactly once.
//!
//! The occurrence is re-derived from the template on every call; a
//! client-supplied snapshot of participants, duration, or status is never
//! trusted. Idempotency rests on the unique constraint over
//! `(template_id, occurrence_start)`: the pre-insert lookup is only a fast
//! path, and losing the insert race is converted into a re-read of the
//! winning row, never surfaced as an error.

use chrono::{DateTime, TimeDelta, Utc};

use crate::error::{ServiceError, ServiceResult};
use crate::scheduling::Caller;
use lektor_core::identity::OccurrenceKey;
use lektor_core::types::CallerRole;
use lektor_db::db::connection::DbConnection;
use lektor_db::db::query::{materialize, template};
use lektor_db::model::materialized::{
    MaterializedClass, MaterializedParticipant, NewMaterializedClass, NewMaterializedParticipant,
};
use lektor_db::model::participant::TemplateParticipant;
use lektor_db::model::template::ClassTemplate;

/// Result of a materialization call. `already_existed` distinguishes the
/// idempotent path for logging; callers see the same shape either way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaterializeOutcome {
    pub class: MaterializedClass,
    pub participants: Vec<MaterializedParticipant>,
    pub already_existed: bool,
}

fn authorize(
    template: &ClassTemplate,
    participants: &[TemplateParticipant],
    caller: &Caller,
) -> ServiceResult<()> {
    match caller.role {
        CallerRole::Teacher => {
            if template.teacher_id == caller.id {
                Ok(())
            } else {
                tracing::warn!(
                    template_id = %template.id,
                    caller_id = %caller.id,
                    "Teacher attempted to materialize an occurrence of a template they do not own"
                );
                Err(ServiceError::NotOwner {
                    template_id: template.id,
                    caller_id: caller.id,
                })
            }
        }
        CallerRole::Student => {
            if participants
                .iter()
                .any(|participant| participant.student_id == caller.id)
            {
                Ok(())
            } else {
                tracing::warn!(
                    template_id = %template.id,
                    caller_id = %caller.id,
                    "Student attempted to materialize an occurrence of a template they do not attend"
                );
                Err(ServiceError::NotAParticipant {
                    template_id: template.id,
                    caller_id: caller.id,
                })
            }
        }
    }
}

/// Validates that `occurrence_start` lies on the template's recurrence grid
/// and inside its termination bound.
fn validate_occurrence(
    template: &ClassTemplate,
    occurrence_start: DateTime<Utc>,
) -> ServiceResult<()> {
    let rule = template.recurrence()?;
    let Some(index) = rule.occurrence_index(template.anchor_start, occurrence_start) else {
        return Err(ServiceError::NotAnOccurrence {
            template_id: template.id,
            occurrence_start,
        });
    };
    if rule.index_within_end(template.anchor_start, index) {
        return Ok(());
    }
    // The series end exists whenever an index can fall outside it.
    let expired_at = rule
        .series_end(template.anchor_start)
        .unwrap_or(template.anchor_start);
    Err(ServiceError::TemplateExpired {
        template_id: template.id,
        expired_at,
    })
}

/// ## Summary
/// Materializes the occurrence of `template_id` starting at
/// `occurrence_start`, or returns the existing durable record if any caller
/// already did. Behaves as at-most-once per occurrence key under arbitrary
/// concurrency, and is therefore always safe to retry.
///
/// ## Errors
/// - [`ServiceError::TemplateNotFound`] if the template does not exist.
/// - [`ServiceError::TemplateExpired`] if the occurrence falls after the
///   series end.
/// - [`ServiceError::NotAnOccurrence`] if the instant is off the recurrence
///   grid.
/// - [`ServiceError::NotOwner`] / [`ServiceError::NotAParticipant`] if the
///   caller fails the durable authorization re-check.
/// - [`ServiceError::EmptyParticipantList`] if the template has no students.
/// - [`ServiceError::ParticipantCopyFailed`] if the atomic insert fails for
///   a reason other than losing the materialization race.
#[tracing::instrument(skip(conn, caller), fields(caller_id = %caller.id, caller_role = %caller.role))]
pub async fn materialize_occurrence(
    conn: &mut DbConnection<'_>,
    template_id: uuid::Uuid,
    occurrence_start: DateTime<Utc>,
    caller: &Caller,
    trigger_reason: Option<String>,
) -> ServiceResult<MaterializeOutcome> {
    let Some((template, participants)) =
        template::find_with_participants(conn, template_id).await?
    else {
        return Err(ServiceError::TemplateNotFound { template_id });
    };

    authorize(&template, &participants, caller)?;
    validate_occurrence(&template, occurrence_start)?;

    if participants.is_empty() {
        return Err(ServiceError::EmptyParticipantList { template_id });
    }

    let key = OccurrenceKey::new(template_id, occurrence_start);

    // Fast path: somebody already materialized this occurrence.
    if let Some(existing) = materialize::find_by_occurrence(conn, &key).await? {
        let existing_participants = materialize::participants_of(conn, existing.id).await?;
        tracing::debug!(class_id = %existing.id, "Occurrence already materialized");
        return Ok(MaterializeOutcome {
            class: existing,
            participants: existing_participants,
            already_existed: true,
        });
    }

    let class_id = uuid::Uuid::now_v7();
    let new_class = NewMaterializedClass {
        id: class_id,
        template_id,
        occurrence_start,
        occurrence_end: occurrence_start
            + TimeDelta::minutes(i64::from(template.duration_minutes)),
        teacher_id: template.teacher_id,
        service_id: template.service_id,
        is_group: template.is_group,
        is_trial: template.is_trial,
        notes: template.notes.clone(),
        // Inherited, not forced: a completed template materializes as
        // completed.
        status: template.status,
        trigger_reason,
    };
    let new_participants: Vec<NewMaterializedParticipant> = participants
        .iter()
        .map(|participant| NewMaterializedParticipant {
            class_id,
            student_id: participant.student_id,
            status: participant.status,
        })
        .collect();

    match materialize::insert_class_with_participants(conn, new_class, new_participants).await {
        Ok(class) => {
            let inserted_participants = materialize::participants_of(conn, class.id).await?;
            tracing::info!(class_id = %class.id, "Occurrence materialized");
            Ok(MaterializeOutcome {
                class,
                participants: inserted_participants,
                already_existed: false,
            })
        }
        Err(err) if materialize::is_unique_violation(&err) => {
            // A concurrent caller won the race; their row is the answer.
            tracing::debug!(%key, "Concurrent materialization detected, re-reading winner");
            let Some(winner) = materialize::find_by_occurrence(conn, &key).await? else {
                return Err(lektor_core::error::CoreError::InvariantViolation(
                    "Occurrence missing after unique violation",
                )
                .into());
            };
            let winner_participants = materialize::participants_of(conn, winner.id).await?;
            Ok(MaterializeOutcome {
                class: winner,
                participants: winner_participants,
                already_existed: true,
            })
        }
        Err(err) => Err(ServiceError::ParticipantCopyFailed(err)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use lektor_db::db::enums::{ClassStatus, Frequency, ParticipantStatus};

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    fn template() -> ClassTemplate {
        let anchor = utc(2026, 3, 2, 15, 0);
        ClassTemplate {
            id: uuid::Uuid::new_v4(),
            teacher_id: uuid::Uuid::new_v4(),
            service_id: None,
            anchor_start: anchor,
            duration_minutes: 60,
            frequency: Frequency::Weekly,
            recur_until: None,
            recur_count: None,
            is_group: false,
            is_trial: false,
            notes: None,
            status: ClassStatus::Confirmed,
            created_at: anchor,
            updated_at: anchor,
        }
    }

    fn participant(template_id: uuid::Uuid, student_id: uuid::Uuid) -> TemplateParticipant {
        TemplateParticipant {
            template_id,
            student_id,
            status: ParticipantStatus::Confirmed,
            created_at: utc(2026, 3, 1, 0, 0),
        }
    }

    #[test]
    fn owner_teacher_passes_foreign_teacher_fails() {
        let template = template();
        let owner = Caller {
            id: template.teacher_id,
            role: CallerRole::Teacher,
        };
        assert!(authorize(&template, &[], &owner).is_ok());

        let stranger = Caller {
            id: uuid::Uuid::new_v4(),
            role: CallerRole::Teacher,
        };
        assert!(matches!(
            authorize(&template, &[], &stranger),
            Err(ServiceError::NotOwner { .. })
        ));
    }

    #[test]
    fn only_listed_students_pass_authorization() {
        let template = template();
        let student_id = uuid::Uuid::new_v4();
        let participants = vec![participant(template.id, student_id)];

        let listed = Caller {
            id: student_id,
            role: CallerRole::Student,
        };
        assert!(authorize(&template, &participants, &listed).is_ok());

        let unlisted = Caller {
            id: uuid::Uuid::new_v4(),
            role: CallerRole::Student,
        };
        assert!(matches!(
            authorize(&template, &participants, &unlisted),
            Err(ServiceError::NotAParticipant { .. })
        ));
    }

    #[test]
    fn off_grid_instant_is_rejected() {
        let template = template();
        let off_grid = template.anchor_start + TimeDelta::days(3);
        assert!(matches!(
            validate_occurrence(&template, off_grid),
            Err(ServiceError::NotAnOccurrence { .. })
        ));
    }

    #[test]
    fn sub_second_off_grid_instant_is_rejected() {
        let template = template();
        let nearly = template.anchor_start
            + TimeDelta::days(7)
            + TimeDelta::milliseconds(500);
        assert!(matches!(
            validate_occurrence(&template, nearly),
            Err(ServiceError::NotAnOccurrence { .. })
        ));
    }

    #[test]
    fn occurrence_inside_a_dated_series_is_valid_even_after_the_series_ends() {
        let mut template = template();
        // Series ended long before "today", but the third occurrence was
        // inside it; acting on it later must still validate.
        template.recur_until = Some(template.anchor_start + TimeDelta::days(21));
        let inside = template.anchor_start + TimeDelta::days(14);
        assert!(validate_occurrence(&template, inside).is_ok());
    }

    #[test]
    fn occurrence_after_the_end_date_is_expired() {
        let mut template = template();
        let until = template.anchor_start + TimeDelta::days(21);
        template.recur_until = Some(until);
        let beyond = template.anchor_start + TimeDelta::days(28);
        match validate_occurrence(&template, beyond) {
            Err(ServiceError::TemplateExpired { expired_at, .. }) => {
                assert_eq!(expired_at, until);
            }
            other => panic!("expected TemplateExpired, got {other:?}"),
        }
    }

    #[test]
    fn occurrence_beyond_the_count_is_expired() {
        let mut template = template();
        template.recur_count = Some(3);
        let last_valid = template.anchor_start + TimeDelta::days(14);
        assert!(validate_occurrence(&template, last_valid).is_ok());
        let beyond = template.anchor_start + TimeDelta::days(21);
        match validate_occurrence(&template, beyond) {
            Err(ServiceError::TemplateExpired { expired_at, .. }) => {
                assert_eq!(expired_at, last_valid);
            }
            other => panic!("expected TemplateExpired, got {other:?}"),
        }
    }
}
