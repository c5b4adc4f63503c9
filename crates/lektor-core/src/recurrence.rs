//! Recurrence rules for class templates.
//!
//! A template's recurrence has exactly one termination mode; the
//! [`RecurrenceEnd`] sum type makes any other shape unrepresentable.

use chrono::{DateTime, Datelike, Months, TimeDelta, Utc};

/// How far apart successive occurrences are.
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
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    Weekly,
    Biweekly,
    Monthly,
}

impl Frequency {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Weekly => "weekly",
            Self::Biweekly => "biweekly",
            Self::Monthly => "monthly",
        }
    }
}

impl std::fmt::Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Termination mode of a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecurrenceEnd {
    /// Occurrences starting after this instant are outside the series.
    OnDate(DateTime<Utc>),
    /// The series contains exactly this many occurrences.
    AfterCount(u32),
    /// The series repeats indefinitely.
    Never,
}

/// A complete recurrence rule: frequency plus termination mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Recurrence {
    pub frequency: Frequency,
    pub end: RecurrenceEnd,
}

impl Recurrence {
    /// ## Summary
    /// Computes the start of the `n`-th occurrence (zero-based) from the
    /// anchor, ignoring the termination mode.
    ///
    /// Monthly advancement preserves day-of-month and time-of-day; a month
    /// with fewer days clamps to its last day. Returns `None` only on
    /// calendar overflow.
    #[must_use]
    pub fn nth_start(&self, anchor: DateTime<Utc>, n: u32) -> Option<DateTime<Utc>> {
        match self.frequency {
            Frequency::Weekly => {
                anchor.checked_add_signed(TimeDelta::days(7 * i64::from(n)))
            }
            Frequency::Biweekly => {
                anchor.checked_add_signed(TimeDelta::days(14 * i64::from(n)))
            }
            Frequency::Monthly => anchor.checked_add_months(Months::new(n)),
        }
    }

    /// ## Summary
    /// Returns the zero-based index of `start` within the series anchored at
    /// `anchor`, or `None` if `start` does not lie on the recurrence grid.
    ///
    /// The termination mode is not consulted here; callers that need the
    /// series bound combine this with [`Self::index_within_end`].
    #[must_use]
    pub fn occurrence_index(
        &self,
        anchor: DateTime<Utc>,
        start: DateTime<Utc>,
    ) -> Option<u32> {
        if start < anchor {
            return None;
        }
        match self.frequency {
            Frequency::Weekly | Frequency::Biweekly => {
                let step = match self.frequency {
                    Frequency::Weekly => TimeDelta::days(7),
                    _ => TimeDelta::days(14),
                };
                // Seconds truncate, so the quotient is only a candidate;
                // equality rejects instants off the grid by less than one
                // step, including sub-second offsets.
                let delta_secs = (start - anchor).num_seconds();
                let n = u32::try_from(delta_secs / step.num_seconds()).ok()?;
                (self.nth_start(anchor, n) == Some(start)).then_some(n)
            }
            Frequency::Monthly => {
                // Clamping makes the inverse non-arithmetic; derive the
                // candidate index from the month distance and verify it.
                let months = i64::from(start.year() - anchor.year()) * 12
                    + i64::from(start.month()) - i64::from(anchor.month());
                let n = u32::try_from(months).ok()?;
                (self.nth_start(anchor, n) == Some(start)).then_some(n)
            }
        }
    }

    /// Whether the occurrence at index `n` lies within the termination mode.
    #[must_use]
    pub fn index_within_end(&self, anchor: DateTime<Utc>, n: u32) -> bool {
        match self.end {
            RecurrenceEnd::AfterCount(count) => n < count,
            RecurrenceEnd::OnDate(until) => {
                self.nth_start(anchor, n).is_some_and(|start| start <= until)
            }
            RecurrenceEnd::Never => true,
        }
    }

    /// ## Summary
    /// Returns the instant after which the series emits nothing, or `None`
    /// for an indefinite series. For count-bounded series this is the start
    /// of the final occurrence.
    #[must_use]
    pub fn series_end(&self, anchor: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self.end {
            RecurrenceEnd::OnDate(until) => Some(until),
            RecurrenceEnd::AfterCount(count) => {
                let last = count.checked_sub(1)?;
                self.nth_start(anchor, last)
            }
            RecurrenceEnd::Never => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    #[test]
    fn weekly_nth_start_is_exact_multiples_of_seven_days() {
        let rule = Recurrence {
            frequency: Frequency::Weekly,
            end: RecurrenceEnd::Never,
        };
        let anchor = utc(2026, 3, 2, 15, 30);
        for k in 0..10 {
            assert_eq!(
                rule.nth_start(anchor, k),
                Some(anchor + TimeDelta::days(7 * i64::from(k)))
            );
        }
    }

    #[test]
    fn monthly_clamps_to_last_day_of_february() {
        let rule = Recurrence {
            frequency: Frequency::Monthly,
            end: RecurrenceEnd::Never,
        };
        let anchor = utc(2026, 1, 31, 10, 0);
        assert_eq!(rule.nth_start(anchor, 1), Some(utc(2026, 2, 28, 10, 0)));
        // Day-of-month is preserved from the anchor, not the clamped month.
        assert_eq!(rule.nth_start(anchor, 2), Some(utc(2026, 3, 31, 10, 0)));
    }

    #[test]
    fn monthly_clamp_handles_leap_february() {
        let rule = Recurrence {
            frequency: Frequency::Monthly,
            end: RecurrenceEnd::Never,
        };
        let anchor = utc(2028, 1, 31, 9, 0);
        assert_eq!(rule.nth_start(anchor, 1), Some(utc(2028, 2, 29, 9, 0)));
    }

    #[test]
    fn occurrence_index_round_trips_for_each_frequency() {
        let anchor = utc(2026, 1, 31, 10, 0);
        for frequency in [Frequency::Weekly, Frequency::Biweekly, Frequency::Monthly] {
            let rule = Recurrence {
                frequency,
                end: RecurrenceEnd::Never,
            };
            for n in 0..8 {
                let start = rule.nth_start(anchor, n).unwrap();
                assert_eq!(rule.occurrence_index(anchor, start), Some(n));
            }
        }
    }

    #[test]
    fn occurrence_index_rejects_off_grid_instants() {
        let rule = Recurrence {
            frequency: Frequency::Weekly,
            end: RecurrenceEnd::Never,
        };
        let anchor = utc(2026, 3, 2, 15, 0);
        assert_eq!(
            rule.occurrence_index(anchor, anchor + TimeDelta::days(3)),
            None
        );
        assert_eq!(
            rule.occurrence_index(anchor, anchor - TimeDelta::days(7)),
            None
        );
    }

    #[test]
    fn occurrence_index_rejects_sub_second_off_grid_instants() {
        let anchor = utc(2026, 3, 2, 15, 0);
        for frequency in [Frequency::Weekly, Frequency::Biweekly] {
            let rule = Recurrence {
                frequency,
                end: RecurrenceEnd::Never,
            };
            let on_grid = rule.nth_start(anchor, 1).unwrap();
            assert_eq!(rule.occurrence_index(anchor, on_grid), Some(1));
            // A client instant rounded within the same second must not land
            // on the grid and mint a second occurrence key.
            assert_eq!(
                rule.occurrence_index(anchor, on_grid + TimeDelta::milliseconds(500)),
                None
            );
            assert_eq!(
                rule.occurrence_index(anchor, on_grid - TimeDelta::milliseconds(1)),
                None
            );
            assert_eq!(
                rule.occurrence_index(anchor, on_grid + TimeDelta::seconds(1)),
                None
            );
        }
    }

    #[test]
    fn index_within_end_respects_count_and_date() {
        let anchor = utc(2026, 3, 2, 15, 0);
        let counted = Recurrence {
            frequency: Frequency::Weekly,
            end: RecurrenceEnd::AfterCount(3),
        };
        assert!(counted.index_within_end(anchor, 2));
        assert!(!counted.index_within_end(anchor, 3));

        let dated = Recurrence {
            frequency: Frequency::Weekly,
            end: RecurrenceEnd::OnDate(anchor + TimeDelta::days(14)),
        };
        // The occurrence starting exactly on the end date is still inside.
        assert!(dated.index_within_end(anchor, 2));
        assert!(!dated.index_within_end(anchor, 3));
    }

    #[test]
    fn series_end_is_last_occurrence_for_counted_series() {
        let anchor = utc(2026, 3, 2, 15, 0);
        let rule = Recurrence {
            frequency: Frequency::Biweekly,
            end: RecurrenceEnd::AfterCount(4),
        };
        assert_eq!(rule.series_end(anchor), Some(anchor + TimeDelta::days(42)));
        let endless = Recurrence {
            frequency: Frequency::Biweekly,
            end: RecurrenceEnd::Never,
        };
        assert_eq!(endless.series_end(anchor), None);
    }
}
