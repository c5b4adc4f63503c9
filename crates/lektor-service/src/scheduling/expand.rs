//! Window expansion over stored templates.

use crate::error::{ServiceError, ServiceResult};
use lektor_core::expand::{VirtualOccurrence, Window, expand};
use lektor_db::db::connection::DbConnection;
use lektor_db::db::query::template;

/// ## Summary
/// Expands a stored template into its virtual occurrences within `window`,
/// carrying the template's current participant set.
///
/// Two calls with the same arguments against unchanged rows return
/// identical sequences; calendar code may call this freely.
///
/// ## Errors
/// - [`ServiceError::TemplateNotFound`] if the template does not exist.
/// - Database or invariant errors from loading and projecting the rows.
#[tracing::instrument(skip(conn))]
pub async fn expand_window(
    conn: &mut DbConnection<'_>,
    template_id: uuid::Uuid,
    window: Window,
) -> ServiceResult<Vec<VirtualOccurrence>> {
    let Some((template, participants)) =
        template::find_with_participants(conn, template_id).await?
    else {
        return Err(ServiceError::TemplateNotFound { template_id });
    };
    let projection = template.projection(&participants)?;
    let occurrences: Vec<VirtualOccurrence> = expand(&projection, window).collect();
    tracing::debug!(
        template_id = %template_id,
        occurrence_count = occurrences.len(),
        "Template expanded"
    );
    Ok(occurrences)
}
