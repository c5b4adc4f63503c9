pub mod availability;
pub mod cancellation;
pub mod expand;
pub mod materialize;

use lektor_core::types::CallerRole;

/// The authenticated actor behind a scheduling request. Claims only; the
/// materialization path re-verifies both fields against durable rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    pub id: uuid::Uuid,
    pub role: CallerRole,
}
