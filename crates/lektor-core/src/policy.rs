//! Cancellation-policy evaluation.
//!
//! No persistence, no side effects, no global clock: the current instant
//! and the financial-module entitlement are both inputs, so the function is
//! safe to call speculatively (e.g. to render a warning banner) and exact
//! to test at the charge boundary.

use chrono::{DateTime, TimeDelta, Utc};
use rust_decimal::Decimal;

use crate::types::CallerRole;

/// A teacher's cancellation policy. When a teacher has no active policy
/// row, [`CancellationPolicy::default_policy`] applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CancellationPolicy {
    pub hours_before_class: u32,
    pub charge_percentage: u32,
    pub allow_amnesty: bool,
}

impl CancellationPolicy {
    /// The documented fallback: 24 hours notice, 50% charge, amnesty allowed.
    #[must_use]
    pub const fn default_policy() -> Self {
        Self {
            hours_before_class: 24,
            charge_percentage: 50,
            allow_amnesty: true,
        }
    }
}

/// The computed default decision. Amnesty, when the policy allows it, is a
/// separate caller-driven override and never changes what this reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct ChargeDecision {
    pub is_chargeable: bool,
    pub amount: Decimal,
    /// Whole hours until the occurrence at evaluation time, floored at zero
    /// for display.
    pub hours_until: i64,
}

impl ChargeDecision {
    const fn free(hours_until: i64) -> Self {
        Self {
            is_chargeable: false,
            amount: Decimal::ZERO,
            hours_until,
        }
    }
}

/// ## Summary
/// Computes the default charge decision for cancelling the occurrence at
/// `occurrence_start`.
///
/// Teachers are never charged. Students are charged
/// `policy.charge_percentage` of the service price when less than
/// `policy.hours_before_class` hours remain; `fallback_price` substitutes
/// for unpriced (e.g. trial) services. When the teacher's plan lacks the
/// financial module, every cancellation is free.
#[must_use]
pub fn evaluate_cancellation(
    occurrence_start: DateTime<Utc>,
    caller_role: CallerRole,
    policy: &CancellationPolicy,
    price: Option<Decimal>,
    fallback_price: Decimal,
    has_financial_module: bool,
    now: DateTime<Utc>,
) -> ChargeDecision {
    let remaining = occurrence_start - now;
    let hours_until = remaining.num_hours().max(0);

    if caller_role == CallerRole::Teacher || !has_financial_module {
        return ChargeDecision::free(hours_until);
    }
    if remaining >= TimeDelta::hours(i64::from(policy.hours_before_class)) {
        return ChargeDecision::free(hours_until);
    }

    let basis = price.unwrap_or(fallback_price);
    let amount = basis * Decimal::from(policy.charge_percentage) / Decimal::from(100);
    ChargeDecision {
        is_chargeable: true,
        amount,
        hours_until,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn class_start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 6, 10, 14, 0, 0).unwrap()
    }

    fn policy() -> CancellationPolicy {
        CancellationPolicy::default_policy()
    }

    #[test]
    fn student_at_one_second_past_the_threshold_is_free() {
        let now = class_start() - TimeDelta::hours(24) - TimeDelta::seconds(1);
        let decision = evaluate_cancellation(
            class_start(),
            CallerRole::Student,
            &policy(),
            Some(Decimal::from(80)),
            Decimal::from(25),
            true,
            now,
        );
        assert!(!decision.is_chargeable);
        assert_eq!(decision.amount, Decimal::ZERO);
    }

    #[test]
    fn student_exactly_at_the_threshold_is_free() {
        let now = class_start() - TimeDelta::hours(24);
        let decision = evaluate_cancellation(
            class_start(),
            CallerRole::Student,
            &policy(),
            Some(Decimal::from(80)),
            Decimal::from(25),
            true,
            now,
        );
        assert!(!decision.is_chargeable);
    }

    #[test]
    fn student_one_second_inside_the_threshold_is_charged() {
        let now = class_start() - TimeDelta::hours(24) + TimeDelta::seconds(1);
        let decision = evaluate_cancellation(
            class_start(),
            CallerRole::Student,
            &policy(),
            Some(Decimal::from(80)),
            Decimal::from(25),
            true,
            now,
        );
        assert!(decision.is_chargeable);
        assert_eq!(decision.amount, Decimal::from(40));
        assert_eq!(decision.hours_until, 23);
    }

    #[test]
    fn teacher_is_always_free_even_minutes_before() {
        let now = class_start() - TimeDelta::minutes(5);
        let decision = evaluate_cancellation(
            class_start(),
            CallerRole::Teacher,
            &policy(),
            Some(Decimal::from(80)),
            Decimal::from(25),
            true,
            now,
        );
        assert!(!decision.is_chargeable);
    }

    #[test]
    fn missing_financial_module_disables_charging() {
        let now = class_start() - TimeDelta::hours(1);
        let decision = evaluate_cancellation(
            class_start(),
            CallerRole::Student,
            &policy(),
            Some(Decimal::from(80)),
            Decimal::from(25),
            false,
            now,
        );
        assert!(!decision.is_chargeable);
    }

    #[test]
    fn unpriced_service_charges_against_the_fallback_price() {
        let now = class_start() - TimeDelta::hours(1);
        let decision = evaluate_cancellation(
            class_start(),
            CallerRole::Student,
            &policy(),
            None,
            Decimal::from(25),
            true,
            now,
        );
        assert!(decision.is_chargeable);
        // 50% of the fallback price.
        assert_eq!(decision.amount, Decimal::new(125, 1));
    }

    #[test]
    fn hours_until_is_floored_at_zero_after_class_start() {
        let now = class_start() + TimeDelta::hours(2);
        let decision = evaluate_cancellation(
            class_start(),
            CallerRole::Student,
            &policy(),
            Some(Decimal::from(80)),
            Decimal::from(25),
            true,
            now,
        );
        assert_eq!(decision.hours_until, 0);
        assert!(decision.is_chargeable);
    }
}
