use chrono::{DateTime, Utc};
use diesel::{pg::Pg, prelude::*};
use rust_decimal::Decimal;

use crate::db::schema;
use lektor_core::availability::{Blockout, WorkingHours};
use lektor_core::error::CoreError;

/// Recurring weekly availability for a teacher. `day_of_week` follows ISO
/// 8601: Monday is 1, Sunday is 7.
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable, Identifiable)]
#[diesel(table_name = schema::working_hours)]
#[diesel(check_for_backend(Pg))]
pub struct WorkingHoursRow {
    pub id: uuid::Uuid,
    pub teacher_id: uuid::Uuid,
    pub day_of_week: i16,
    pub start_minute: i32,
    pub end_minute: i32,
    pub is_active: bool,
}

impl WorkingHoursRow {
    /// ## Summary
    /// Converts the row into the resolver input.
    ///
    /// ## Errors
    /// Returns an error if the weekday or minute columns are out of range.
    pub fn to_working_hours(&self) -> Result<WorkingHours, CoreError> {
        let weekday = match self.day_of_week {
            1 => chrono::Weekday::Mon,
            2 => chrono::Weekday::Tue,
            3 => chrono::Weekday::Wed,
            4 => chrono::Weekday::Thu,
            5 => chrono::Weekday::Fri,
            6 => chrono::Weekday::Sat,
            7 => chrono::Weekday::Sun,
            _ => {
                return Err(CoreError::InvariantViolation(
                    "Working-hours weekday outside 1..=7",
                ));
            }
        };
        let start_minute = u32::try_from(self.start_minute).map_err(|_err| {
            CoreError::InvariantViolation("Working-hours start minute is negative")
        })?;
        let end_minute = u32::try_from(self.end_minute).map_err(|_err| {
            CoreError::InvariantViolation("Working-hours end minute is negative")
        })?;
        Ok(WorkingHours {
            weekday,
            start_minute,
            end_minute,
            active: self.is_active,
        })
    }
}

/// A one-off interval during which the teacher takes no classes.
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable, Identifiable)]
#[diesel(table_name = schema::blockout)]
#[diesel(check_for_backend(Pg))]
pub struct BlockoutRow {
    pub id: uuid::Uuid,
    pub teacher_id: uuid::Uuid,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub reason: Option<String>,
}

impl BlockoutRow {
    #[must_use]
    pub const fn to_blockout(&self) -> Blockout {
        Blockout {
            start: self.start_at,
            end: self.end_at,
        }
    }
}

/// A priced (or unpriced trial) service a template can reference.
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable, Identifiable)]
#[diesel(table_name = schema::service)]
#[diesel(check_for_backend(Pg))]
pub struct ServiceRow {
    pub id: uuid::Uuid,
    pub teacher_id: uuid::Uuid,
    pub name: String,
    pub price: Option<Decimal>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn iso_weekdays_map_onto_chrono() {
        let row = |day| WorkingHoursRow {
            id: uuid::Uuid::new_v4(),
            teacher_id: uuid::Uuid::new_v4(),
            day_of_week: day,
            start_minute: 540,
            end_minute: 1020,
            is_active: true,
        };
        assert_eq!(
            row(1).to_working_hours().unwrap().weekday,
            chrono::Weekday::Mon
        );
        assert_eq!(
            row(7).to_working_hours().unwrap().weekday,
            chrono::Weekday::Sun
        );
        assert!(row(0).to_working_hours().is_err());
        assert!(row(8).to_working_hours().is_err());
    }
}
