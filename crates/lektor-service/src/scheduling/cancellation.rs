//! Cancellation quotes: the stored policy (or the configured default)
//! evaluated against one occurrence.
//!
//! Nothing here persists a decision. "Hours until class" is time-dependent,
//! so the quote is recomputed on every call, including the speculative one
//! behind a warning banner.

use chrono::{DateTime, Utc};

use crate::error::ServiceResult;
use lektor_core::config::PolicyConfig;
use lektor_core::policy::{ChargeDecision, evaluate_cancellation};
use lektor_core::types::CallerRole;
use lektor_db::db::connection::DbConnection;
use lektor_db::db::query::{policy, service};

/// A charge decision plus the policy attribute the caller needs to offer a
/// manual amnesty override.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct CancellationQuote {
    pub decision: ChargeDecision,
    pub allow_amnesty: bool,
}

/// ## Summary
/// Computes the default charge decision for cancelling the occurrence at
/// `occurrence_start` with this teacher.
///
/// A teacher with no active policy row gets the configured default policy
/// (missing policy is not an error). The service price, when the template
/// references a priced service, is the charge basis; otherwise the
/// configured trial price applies. The financial-module entitlement comes
/// from configuration and is passed through as an input flag.
///
/// ## Errors
/// Returns database or invariant errors from loading the policy or service
/// rows.
#[tracing::instrument(skip(conn, policy_config))]
pub async fn cancellation_quote(
    conn: &mut DbConnection<'_>,
    policy_config: &PolicyConfig,
    teacher_id: uuid::Uuid,
    occurrence_start: DateTime<Utc>,
    caller_role: CallerRole,
    service_id: Option<uuid::Uuid>,
    now: DateTime<Utc>,
) -> ServiceResult<CancellationQuote> {
    let stored = policy::active_for_teacher(conn, teacher_id).await?;
    let cancellation_policy = match stored {
        Some(row) => row.policy()?,
        None => {
            tracing::debug!(teacher_id = %teacher_id, "No active policy, using default");
            policy_config.fallback_policy()
        }
    };

    let price = match service_id {
        Some(id) => service::find_by_id(conn, id).await?.and_then(|row| row.price),
        None => None,
    };

    let decision = evaluate_cancellation(
        occurrence_start,
        caller_role,
        &cancellation_policy,
        price,
        policy_config.default_trial_price,
        policy_config.financial_module_enabled,
        now,
    );
    Ok(CancellationQuote {
        decision,
        allow_amnesty: cancellation_policy.allow_amnesty,
    })
}
