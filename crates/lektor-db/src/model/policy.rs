use chrono::{DateTime, Utc};
use diesel::{pg::Pg, prelude::*};

use crate::db::schema;
use lektor_core::error::CoreError;
use lektor_core::policy::CancellationPolicy;

/// A teacher's stored cancellation policy. One active row per teacher,
/// enforced by a partial unique index.
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable, Identifiable)]
#[diesel(table_name = schema::cancellation_policy)]
#[diesel(check_for_backend(Pg))]
pub struct CancellationPolicyRow {
    pub id: uuid::Uuid,
    pub teacher_id: uuid::Uuid,
    pub hours_before_class: i32,
    pub charge_percentage: i32,
    pub allow_amnesty: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl CancellationPolicyRow {
    /// ## Summary
    /// Converts the row into the pure evaluation input.
    ///
    /// ## Errors
    /// Returns an error if either numeric column is negative.
    pub fn policy(&self) -> Result<CancellationPolicy, CoreError> {
        let hours_before_class = u32::try_from(self.hours_before_class).map_err(|_err| {
            CoreError::InvariantViolation("Policy hours_before_class is negative")
        })?;
        let charge_percentage = u32::try_from(self.charge_percentage).map_err(|_err| {
            CoreError::InvariantViolation("Policy charge_percentage is negative")
        })?;
        Ok(CancellationPolicy {
            hours_before_class,
            charge_percentage,
            allow_amnesty: self.allow_amnesty,
        })
    }
}

/// Insert struct for creating cancellation policies
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = schema::cancellation_policy)]
pub struct NewCancellationPolicy {
    pub id: uuid::Uuid,
    pub teacher_id: uuid::Uuid,
    pub hours_before_class: i32,
    pub charge_percentage: i32,
    pub allow_amnesty: bool,
    pub is_active: bool,
}
