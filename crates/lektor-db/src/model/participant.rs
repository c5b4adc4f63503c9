use chrono::{DateTime, Utc};
use diesel::{pg::Pg, prelude::*};

use crate::db::{enums::ParticipantStatus, schema};

/// A student attached to a template, carrying their own status.
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable)]
#[diesel(table_name = schema::template_participant)]
#[diesel(check_for_backend(Pg))]
pub struct TemplateParticipant {
    pub template_id: uuid::Uuid,
    pub student_id: uuid::Uuid,
    pub status: ParticipantStatus,
    pub created_at: DateTime<Utc>,
}

/// Insert struct for attaching students to templates
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = schema::template_participant)]
pub struct NewTemplateParticipant {
    pub template_id: uuid::Uuid,
    pub student_id: uuid::Uuid,
    pub status: ParticipantStatus,
}
