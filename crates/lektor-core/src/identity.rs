//! Canonical occurrence identity.

use chrono::{DateTime, Utc};

/// The canonical key naming one occurrence of a template: the template id
/// plus the timezone-normalized absolute start instant. Local wall-clock
/// strings are never part of the key, so DST shifts and client timezones
/// cannot split one real occurrence into two keys.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    serde::Serialize,
    serde::Deserialize,
)]
pub struct OccurrenceKey {
    pub template_id: uuid::Uuid,
    pub start: DateTime<Utc>,
}

impl OccurrenceKey {
    #[must_use]
    pub const fn new(template_id: uuid::Uuid, start: DateTime<Utc>) -> Self {
        Self { template_id, start }
    }
}

impl std::fmt::Display for OccurrenceKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}", self.template_id, self.start.to_rfc3339())
    }
}

/// An occurrence as downstream code sees it: either still virtual (named by
/// its key) or already durable (named by its class id). Pattern-match on
/// this instead of encoding the distinction in an id string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum Occurrence {
    Virtual(OccurrenceKey),
    Materialized(uuid::Uuid),
}

impl Occurrence {
    #[must_use]
    pub const fn is_materialized(self) -> bool {
        matches!(self, Self::Materialized(_))
    }
}
