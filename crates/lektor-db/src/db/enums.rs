//! Database enum types with Diesel serialization.
//!
//! This module provides type-safe enum wrappers for database CHECK constraints.
//! Each enum implements `ToSql` and `FromSql` for automatic conversion between Rust and `PostgreSQL`,
//! plus `From` conversions to and from the pure domain enums in `lektor-core`.

use diesel::deserialize::{self, FromSql, FromSqlRow};
use diesel::expression::AsExpression;
use diesel::pg::{Pg, PgValue};
use diesel::serialize::{self, IsNull, Output, ToSql};
use diesel::sql_types::Text;
use std::fmt;
use std::io::Write;

/// Recurrence frequency of a class template.
///
/// Maps to `class_template.frequency` CHECK constraint.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    AsExpression,
    FromSqlRow,
    serde::Serialize,
    serde::Deserialize,
)]
#[diesel(sql_type = Text)]
pub enum Frequency {
    Weekly,
    Biweekly,
    Monthly,
}

impl ToSql<Text, Pg> for Frequency {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        out.write_all(self.as_str().as_bytes())?;
        Ok(IsNull::No)
    }
}

impl FromSql<Text, Pg> for Frequency {
    fn from_sql(bytes: PgValue<'_>) -> deserialize::Result<Self> {
        match bytes.as_bytes() {
            b"weekly" => Ok(Self::Weekly),
            b"biweekly" => Ok(Self::Biweekly),
            b"monthly" => Ok(Self::Monthly),
            _ => Err("Unrecognized enum variant".into()),
        }
    }
}

impl Frequency {
    /// Returns the database string representation of this frequency.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Weekly => "weekly",
            Self::Biweekly => "biweekly",
            Self::Monthly => "monthly",
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<lektor_core::recurrence::Frequency> for Frequency {
    fn from(value: lektor_core::recurrence::Frequency) -> Self {
        match value {
            lektor_core::recurrence::Frequency::Weekly => Self::Weekly,
            lektor_core::recurrence::Frequency::Biweekly => Self::Biweekly,
            lektor_core::recurrence::Frequency::Monthly => Self::Monthly,
        }
    }
}

impl From<Frequency> for lektor_core::recurrence::Frequency {
    fn from(value: Frequency) -> Self {
        match value {
            Frequency::Weekly => Self::Weekly,
            Frequency::Biweekly => Self::Biweekly,
            Frequency::Monthly => Self::Monthly,
        }
    }
}

/// Class lifecycle status.
///
/// Maps to the `status` CHECK constraints on `class_template` and
/// `materialized_class`.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    AsExpression,
    FromSqlRow,
    serde::Serialize,
    serde::Deserialize,
)]
#[diesel(sql_type = Text)]
pub enum ClassStatus {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

impl ToSql<Text, Pg> for ClassStatus {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        out.write_all(self.as_str().as_bytes())?;
        Ok(IsNull::No)
    }
}

impl FromSql<Text, Pg> for ClassStatus {
    fn from_sql(bytes: PgValue<'_>) -> deserialize::Result<Self> {
        match bytes.as_bytes() {
            b"pending" => Ok(Self::Pending),
            b"confirmed" => Ok(Self::Confirmed),
            b"cancelled" => Ok(Self::Cancelled),
            b"completed" => Ok(Self::Completed),
            _ => Err("Unrecognized enum variant".into()),
        }
    }
}

impl ClassStatus {
    /// Returns the database string representation of this status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Cancelled => "cancelled",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for ClassStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<lektor_core::types::ClassStatus> for ClassStatus {
    fn from(value: lektor_core::types::ClassStatus) -> Self {
        match value {
            lektor_core::types::ClassStatus::Pending => Self::Pending,
            lektor_core::types::ClassStatus::Confirmed => Self::Confirmed,
            lektor_core::types::ClassStatus::Cancelled => Self::Cancelled,
            lektor_core::types::ClassStatus::Completed => Self::Completed,
        }
    }
}

impl From<ClassStatus> for lektor_core::types::ClassStatus {
    fn from(value: ClassStatus) -> Self {
        match value {
            ClassStatus::Pending => Self::Pending,
            ClassStatus::Confirmed => Self::Confirmed,
            ClassStatus::Cancelled => Self::Cancelled,
            ClassStatus::Completed => Self::Completed,
        }
    }
}

/// Per-participant status.
///
/// Maps to the `status` CHECK constraints on `template_participant` and
/// `materialized_participant`.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    AsExpression,
    FromSqlRow,
    serde::Serialize,
    serde::Deserialize,
)]
#[diesel(sql_type = Text)]
pub enum ParticipantStatus {
    Pending,
    Confirmed,
    Cancelled,
}

impl ToSql<Text, Pg> for ParticipantStatus {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        out.write_all(self.as_str().as_bytes())?;
        Ok(IsNull::No)
    }
}

impl FromSql<Text, Pg> for ParticipantStatus {
    fn from_sql(bytes: PgValue<'_>) -> deserialize::Result<Self> {
        match bytes.as_bytes() {
            b"pending" => Ok(Self::Pending),
            b"confirmed" => Ok(Self::Confirmed),
            b"cancelled" => Ok(Self::Cancelled),
            _ => Err("Unrecognized enum variant".into()),
        }
    }
}

impl ParticipantStatus {
    /// Returns the database string representation of this status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for ParticipantStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<lektor_core::types::ParticipantStatus> for ParticipantStatus {
    fn from(value: lektor_core::types::ParticipantStatus) -> Self {
        match value {
            lektor_core::types::ParticipantStatus::Pending => Self::Pending,
            lektor_core::types::ParticipantStatus::Confirmed => Self::Confirmed,
            lektor_core::types::ParticipantStatus::Cancelled => Self::Cancelled,
        }
    }
}

impl From<ParticipantStatus> for lektor_core::types::ParticipantStatus {
    fn from(value: ParticipantStatus) -> Self {
        match value {
            ParticipantStatus::Pending => Self::Pending,
            ParticipantStatus::Confirmed => Self::Confirmed,
            ParticipantStatus::Cancelled => Self::Cancelled,
        }
    }
}
