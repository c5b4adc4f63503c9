use chrono::{DateTime, TimeDelta, Utc};
use diesel::{pg::Pg, prelude::*};

use crate::db::{enums::ClassStatus, enums::Frequency, schema};
use crate::model::participant::TemplateParticipant;
use lektor_core::error::CoreError;
use lektor_core::expand::{ParticipantSnapshot, TemplateProjection};
use lektor_core::recurrence::{Recurrence, RecurrenceEnd};

/// A recurring booking: one row standing for indefinitely many occurrences.
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable, Identifiable)]
#[diesel(table_name = schema::class_template)]
#[diesel(check_for_backend(Pg))]
pub struct ClassTemplate {
    pub id: uuid::Uuid,
    pub teacher_id: uuid::Uuid,
    pub service_id: Option<uuid::Uuid>,
    pub anchor_start: DateTime<Utc>,
    pub duration_minutes: i32,
    pub frequency: Frequency,
    pub recur_until: Option<DateTime<Utc>>,
    pub recur_count: Option<i32>,
    pub is_group: bool,
    pub is_trial: bool,
    pub notes: Option<String>,
    pub status: ClassStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ClassTemplate {
    /// ## Summary
    /// Builds the recurrence rule from the row's termination columns.
    ///
    /// ## Errors
    /// Returns an error if both `recur_until` and `recur_count` are set or
    /// if `recur_count` is not a positive integer. The table CHECK enforces
    /// the same shape; this re-validates rows read from elsewhere.
    pub fn recurrence(&self) -> Result<Recurrence, CoreError> {
        let end = match (self.recur_until, self.recur_count) {
            (Some(_), Some(_)) => {
                return Err(CoreError::InvariantViolation(
                    "Template has both an end date and an occurrence count",
                ));
            }
            (Some(until), None) => RecurrenceEnd::OnDate(until),
            (None, Some(count)) => {
                let count = u32::try_from(count).map_err(|_err| {
                    CoreError::InvariantViolation("Template occurrence count is not positive")
                })?;
                RecurrenceEnd::AfterCount(count)
            }
            (None, None) => RecurrenceEnd::Never,
        };
        Ok(Recurrence {
            frequency: self.frequency.into(),
            end,
        })
    }

    /// ## Summary
    /// Projects this row plus its current participants into the pure
    /// expansion input.
    ///
    /// ## Errors
    /// Returns an error if the termination columns violate the recurrence
    /// invariant.
    pub fn projection(
        &self,
        participants: &[TemplateParticipant],
    ) -> Result<TemplateProjection, CoreError> {
        Ok(TemplateProjection {
            id: self.id,
            teacher_id: self.teacher_id,
            service_id: self.service_id,
            anchor_start: self.anchor_start,
            duration: TimeDelta::minutes(i64::from(self.duration_minutes)),
            recurrence: self.recurrence()?,
            is_group: self.is_group,
            is_trial: self.is_trial,
            notes: self.notes.clone(),
            status: self.status.into(),
            participants: participants
                .iter()
                .map(|row| ParticipantSnapshot {
                    student_id: row.student_id,
                    status: row.status.into(),
                })
                .collect(),
        })
    }
}

/// Insert struct for creating new class templates
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = schema::class_template)]
pub struct NewClassTemplate {
    pub id: uuid::Uuid,
    pub teacher_id: uuid::Uuid,
    pub service_id: Option<uuid::Uuid>,
    pub anchor_start: DateTime<Utc>,
    pub duration_minutes: i32,
    pub frequency: Frequency,
    pub recur_until: Option<DateTime<Utc>>,
    pub recur_count: Option<i32>,
    pub is_group: bool,
    pub is_trial: bool,
    pub notes: Option<String>,
    pub status: ClassStatus,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn template_row() -> ClassTemplate {
        let anchor = Utc.with_ymd_and_hms(2026, 3, 2, 15, 0, 0).unwrap();
        ClassTemplate {
            id: uuid::Uuid::new_v4(),
            teacher_id: uuid::Uuid::new_v4(),
            service_id: None,
            anchor_start: anchor,
            duration_minutes: 45,
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

    #[test]
    fn termination_columns_map_to_exactly_one_mode() {
        let mut row = template_row();
        assert_eq!(row.recurrence().unwrap().end, RecurrenceEnd::Never);

        row.recur_count = Some(10);
        assert_eq!(
            row.recurrence().unwrap().end,
            RecurrenceEnd::AfterCount(10)
        );

        row.recur_count = None;
        row.recur_until = Some(row.anchor_start);
        assert_eq!(
            row.recurrence().unwrap().end,
            RecurrenceEnd::OnDate(row.anchor_start)
        );

        row.recur_count = Some(10);
        assert!(row.recurrence().is_err());
    }

    #[test]
    fn projection_carries_duration_and_status() {
        let row = template_row();
        let projection = row.projection(&[]).unwrap();
        assert_eq!(projection.duration, TimeDelta::minutes(45));
        assert_eq!(
            projection.status,
            lektor_core::types::ClassStatus::Confirmed
        );
        assert!(projection.participants.is_empty());
    }
}
