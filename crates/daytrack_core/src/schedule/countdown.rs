//! Countdown date math.
//!
//! A countdown runs from its start toward a target `days` ahead. The
//! helpers here compute the target, how many days are left (signed, so
//! list views can show overdue items), and the urgency band the UI colors
//! by. Countdown series repeat the start by a rule and stamp each member
//! with its 1-based occurrence.

use crate::model::task::RecurrenceFrequency;
use crate::schedule::expansion::{advance, ExpansionError, ExpansionResult, MAX_SERIES_INSTANCES};
use chrono::{DateTime, Duration, Utc};

/// Days assumed when a countdown is created without an explicit length.
pub const DEFAULT_COUNTDOWN_DAYS: u32 = 30;

const MS_PER_DAY: i64 = 86_400_000;

/// How urgently a countdown needs attention, derived from days remaining.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Urgency {
    /// Target reached or passed.
    Overdue,
    /// A week or less to go.
    Imminent,
    /// A month or less to go.
    Approaching,
    Comfortable,
}

impl Urgency {
    pub fn from_days_remaining(days: i64) -> Self {
        if days <= 0 {
            Self::Overdue
        } else if days <= 7 {
            Self::Imminent
        } else if days <= 30 {
            Self::Approaching
        } else {
            Self::Comfortable
        }
    }
}

/// Repeat rule for a countdown series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountdownRepeat {
    pub frequency: RecurrenceFrequency,
    /// Units of `frequency` between members. Values below 1 are treated
    /// as 1.
    pub interval: u32,
    /// Series length. Values below 1 are treated as 1.
    pub total_occurrences: u32,
}

/// One member of an expanded countdown series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountdownInstance {
    pub start: DateTime<Utc>,
    pub target: DateTime<Utc>,
    /// 1-based position within the series.
    pub occurrence: u32,
}

/// Returns the instant a countdown of `days` runs toward.
///
/// `days` is clamped to a minimum of 1. `None` only when the target
/// would leave the supported date range.
pub fn countdown_target(start: DateTime<Utc>, days: u32) -> Option<DateTime<Utc>> {
    start.checked_add_signed(Duration::days(i64::from(days.max(1))))
}

/// Signed whole days between `today` and `target`, rounded up.
///
/// Matches what a "days left" card shows: any partial day still counts as
/// a full remaining day, and past targets go negative so callers can
/// render overdue state (or clamp to 0 for progress bars).
pub fn days_remaining(target: DateTime<Utc>, today: DateTime<Utc>) -> i64 {
    let delta_ms = target.signed_duration_since(today).num_milliseconds();
    let floor = delta_ms.div_euclid(MS_PER_DAY);
    if delta_ms.rem_euclid(MS_PER_DAY) > 0 {
        floor + 1
    } else {
        floor
    }
}

/// Expands a countdown repeat rule into its members, oldest first.
///
/// # Contract
/// - Member `n` starts `n - 1` rule steps after `start` and targets its
///   own start plus `days`.
/// - Yearly steps clamp Feb 29 anniversaries to Feb 28 in common years.
pub fn expand_countdown_series(
    start: DateTime<Utc>,
    days: u32,
    rule: &CountdownRepeat,
) -> ExpansionResult<Vec<CountdownInstance>> {
    let total = rule.total_occurrences.max(1);
    if total as usize > MAX_SERIES_INSTANCES {
        return Err(ExpansionError::TooManyInstances {
            limit: MAX_SERIES_INSTANCES,
        });
    }

    let interval = rule.interval.max(1);
    let mut members = Vec::with_capacity(total as usize);
    let mut current = start;

    for occurrence in 1..=total {
        let target = countdown_target(current, days).ok_or(ExpansionError::DateOverflow)?;
        members.push(CountdownInstance {
            start: current,
            target,
            occurrence,
        });

        if occurrence < total {
            current = advance(current, Some(rule.frequency), interval)
                .ok_or(ExpansionError::DateOverflow)?;
        }
    }

    Ok(members)
}

#[cfg(test)]
mod tests {
    use super::{
        countdown_target, days_remaining, expand_countdown_series, CountdownRepeat, Urgency,
    };
    use crate::model::task::RecurrenceFrequency;
    use crate::schedule::expansion::ExpansionError;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).single().expect("valid test instant")
    }

    #[test]
    fn target_is_days_after_start() {
        let start = at(2025, 1, 1, 9);
        assert_eq!(countdown_target(start, 30), Some(at(2025, 1, 31, 9)));
    }

    #[test]
    fn target_clamps_days_to_minimum_one() {
        let start = at(2025, 1, 1, 9);
        assert_eq!(countdown_target(start, 0), Some(at(2025, 1, 2, 9)));
    }

    #[test]
    fn remaining_rounds_partial_days_up() {
        let today = at(2025, 1, 1, 0);
        assert_eq!(days_remaining(today + Duration::hours(36), today), 2);
        assert_eq!(days_remaining(today + Duration::hours(24), today), 1);
        assert_eq!(days_remaining(today, today), 0);
    }

    #[test]
    fn remaining_goes_negative_past_target() {
        let today = at(2025, 1, 10, 0);
        assert_eq!(days_remaining(today - Duration::hours(36), today), -1);
        assert_eq!(days_remaining(today - Duration::days(3), today), -3);
    }

    #[test]
    fn urgency_bands_match_thresholds() {
        assert_eq!(Urgency::from_days_remaining(-5), Urgency::Overdue);
        assert_eq!(Urgency::from_days_remaining(0), Urgency::Overdue);
        assert_eq!(Urgency::from_days_remaining(1), Urgency::Imminent);
        assert_eq!(Urgency::from_days_remaining(7), Urgency::Imminent);
        assert_eq!(Urgency::from_days_remaining(8), Urgency::Approaching);
        assert_eq!(Urgency::from_days_remaining(30), Urgency::Approaching);
        assert_eq!(Urgency::from_days_remaining(31), Urgency::Comfortable);
    }

    #[test]
    fn series_stamps_occurrences_and_targets() {
        let rule = CountdownRepeat {
            frequency: RecurrenceFrequency::Weekly,
            interval: 1,
            total_occurrences: 3,
        };
        let members =
            expand_countdown_series(at(2025, 1, 1, 9), 10, &rule).expect("expands");

        assert_eq!(members.len(), 3);
        assert_eq!(members[0].occurrence, 1);
        assert_eq!(members[1].start, at(2025, 1, 8, 9));
        assert_eq!(members[2].start, at(2025, 1, 15, 9));
        assert_eq!(members[2].target, at(2025, 1, 25, 9));
    }

    #[test]
    fn yearly_series_clamps_leap_day() {
        let rule = CountdownRepeat {
            frequency: RecurrenceFrequency::Yearly,
            interval: 1,
            total_occurrences: 2,
        };
        let members =
            expand_countdown_series(at(2024, 2, 29, 9), 5, &rule).expect("expands");

        assert_eq!(members[1].start, at(2025, 2, 28, 9));
    }

    #[test]
    fn zero_total_occurrences_means_single_member() {
        let rule = CountdownRepeat {
            frequency: RecurrenceFrequency::Daily,
            interval: 1,
            total_occurrences: 0,
        };
        let members =
            expand_countdown_series(at(2025, 1, 1, 9), 5, &rule).expect("expands");
        assert_eq!(members.len(), 1);
    }

    #[test]
    fn series_beyond_cap_is_refused() {
        let rule = CountdownRepeat {
            frequency: RecurrenceFrequency::Daily,
            interval: 1,
            total_occurrences: 1001,
        };
        let result = expand_countdown_series(at(2025, 1, 1, 9), 5, &rule);
        assert!(matches!(
            result,
            Err(ExpansionError::TooManyInstances { .. })
        ));
    }
}
