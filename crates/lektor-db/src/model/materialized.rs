use chrono::{DateTime, Utc};
use diesel::{pg::Pg, prelude::*};

use crate::db::{enums::ClassStatus, enums::ParticipantStatus, schema};

/// The durable record created the first time an occurrence is acted upon.
/// At most one row may ever exist per `(template_id, occurrence_start)`.
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable, Identifiable)]
#[diesel(table_name = schema::materialized_class)]
#[diesel(check_for_backend(Pg))]
pub struct MaterializedClass {
    pub id: uuid::Uuid,
    pub template_id: uuid::Uuid,
    pub occurrence_start: DateTime<Utc>,
    pub occurrence_end: DateTime<Utc>,
    pub teacher_id: uuid::Uuid,
    pub service_id: Option<uuid::Uuid>,
    pub is_group: bool,
    pub is_trial: bool,
    pub notes: Option<String>,
    pub status: ClassStatus,
    pub trigger_reason: Option<String>,
    pub materialized_at: DateTime<Utc>,
}

/// Insert struct for materializing an occurrence. The id is generated by
/// the caller so participant rows can reference it inside one transaction.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = schema::materialized_class)]
pub struct NewMaterializedClass {
    pub id: uuid::Uuid,
    pub template_id: uuid::Uuid,
    pub occurrence_start: DateTime<Utc>,
    pub occurrence_end: DateTime<Utc>,
    pub teacher_id: uuid::Uuid,
    pub service_id: Option<uuid::Uuid>,
    pub is_group: bool,
    pub is_trial: bool,
    pub notes: Option<String>,
    pub status: ClassStatus,
    pub trigger_reason: Option<String>,
}

/// Participant snapshot copied 1:1 from the template at materialization.
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable)]
#[diesel(table_name = schema::materialized_participant)]
#[diesel(check_for_backend(Pg))]
pub struct MaterializedParticipant {
    pub class_id: uuid::Uuid,
    pub student_id: uuid::Uuid,
    pub status: ParticipantStatus,
}

/// Insert struct for participant snapshots
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = schema::materialized_participant)]
pub struct NewMaterializedParticipant {
    pub class_id: uuid::Uuid,
    pub student_id: uuid::Uuid,
    pub status: ParticipantStatus,
}
