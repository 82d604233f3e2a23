//! Recurring-task series expansion.
//!
//! # Responsibility
//! - Turn a start date, end date and repeat rule into concrete instances.
//! - Provide the short date preview shown by creation dialogs.
//!
//! # Invariants
//! - Instances start at 09:00 UTC and end at 17:00 UTC of their own day.
//! - The end date is inclusive; a series always covers its last day.
//! - Expansion is deterministic and never allocates past
//!   `MAX_SERIES_INSTANCES`.

use crate::model::task::RecurrenceFrequency;
use chrono::{DateTime, Duration, Months, NaiveDate, NaiveTime, Utc};
use once_cell::sync::Lazy;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Hard cap on instances produced by one expansion call.
pub const MAX_SERIES_INSTANCES: usize = 1000;

/// Number of preview dates creation dialogs show before "and n more".
pub const DEFAULT_PREVIEW_CAP: usize = 5;

static INSTANCE_START_TIME: Lazy<NaiveTime> =
    Lazy::new(|| NaiveTime::from_hms_opt(9, 0, 0).expect("valid instance start time"));
static INSTANCE_END_TIME: Lazy<NaiveTime> =
    Lazy::new(|| NaiveTime::from_hms_opt(17, 0, 0).expect("valid instance end time"));

pub type ExpansionResult<T> = Result<T, ExpansionError>;

/// Failure while expanding a series.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpansionError {
    EmptyTitle,
    EndBeforeStart { start: NaiveDate, end: NaiveDate },
    TooManyInstances { limit: usize },
    DateOverflow,
}

impl Display for ExpansionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "series title must not be empty"),
            Self::EndBeforeStart { start, end } => {
                write!(f, "series end date {end} is earlier than start date {start}")
            }
            Self::TooManyInstances { limit } => {
                write!(f, "series would exceed {limit} instances")
            }
            Self::DateOverflow => write!(f, "series stepped past the supported date range"),
        }
    }
}

impl Error for ExpansionError {}

/// Repeat rule for a standard task series.
///
/// `frequency: None` still walks every day in the range; the creation
/// dialog treats "no recurrence" over a multi-day span as one task per day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RepeatRule {
    pub frequency: Option<RecurrenceFrequency>,
    /// Units of `frequency` between instances. Values below 1 are
    /// treated as 1.
    pub interval: u32,
}

impl RepeatRule {
    fn effective_interval(&self) -> u32 {
        self.interval.max(1)
    }
}

/// Input for one expansion call.
#[derive(Debug, Clone)]
pub struct SeriesSpec {
    pub title: String,
    pub description: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub rule: RepeatRule,
}

/// One concrete instance produced by expansion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskInstance {
    pub title: String,
    pub description: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// First dates of a series plus its true length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesPreview {
    pub dates: Vec<NaiveDate>,
    pub total: usize,
}

/// Expands a series spec into concrete instances, oldest first.
///
/// # Contract
/// - Title and description are trimmed; a blank title is an error.
/// - The walk emits while the cursor is before the 17:00 bound of the end
///   date or still on the end date itself, so single-day specs produce
///   exactly one instance.
/// - Monthly steps clamp to the last day of shorter months; a Jan 31
///   series continues on Feb 28/29 and stays clamped afterwards.
pub fn expand_series(spec: &SeriesSpec) -> ExpansionResult<Vec<TaskInstance>> {
    let title = spec.title.trim();
    if title.is_empty() {
        return Err(ExpansionError::EmptyTitle);
    }
    if spec.end_date < spec.start_date {
        return Err(ExpansionError::EndBeforeStart {
            start: spec.start_date,
            end: spec.end_date,
        });
    }

    let description = spec.description.trim();
    let interval = spec.rule.effective_interval();
    let bound = spec.end_date.and_time(*INSTANCE_END_TIME).and_utc();

    let mut instances = Vec::new();
    let mut current = spec.start_date.and_time(*INSTANCE_START_TIME).and_utc();

    while current < bound || current.date_naive() == bound.date_naive() {
        if instances.len() >= MAX_SERIES_INSTANCES {
            return Err(ExpansionError::TooManyInstances {
                limit: MAX_SERIES_INSTANCES,
            });
        }

        let end = current.date_naive().and_time(*INSTANCE_END_TIME).and_utc();
        instances.push(TaskInstance {
            title: title.to_string(),
            description: description.to_string(),
            start: current,
            end,
        });

        current = advance(current, spec.rule.frequency, interval)
            .ok_or(ExpansionError::DateOverflow)?;
    }

    Ok(instances)
}

/// Returns the first `cap` instance dates and the total series length.
pub fn preview_series(spec: &SeriesSpec, cap: usize) -> ExpansionResult<SeriesPreview> {
    let instances = expand_series(spec)?;
    let total = instances.len();
    let dates = instances
        .iter()
        .take(cap)
        .map(|instance| instance.start.date_naive())
        .collect();
    Ok(SeriesPreview { dates, total })
}

/// Steps a cursor by one repeat period, preserving time of day.
pub(crate) fn advance(
    current: DateTime<Utc>,
    frequency: Option<RecurrenceFrequency>,
    interval: u32,
) -> Option<DateTime<Utc>> {
    match frequency {
        Some(RecurrenceFrequency::Daily) => {
            current.checked_add_signed(Duration::days(i64::from(interval)))
        }
        Some(RecurrenceFrequency::Weekly) => {
            current.checked_add_signed(Duration::weeks(i64::from(interval)))
        }
        Some(RecurrenceFrequency::Monthly) => current.checked_add_months(Months::new(interval)),
        Some(RecurrenceFrequency::Yearly) => {
            current.checked_add_months(Months::new(interval.saturating_mul(12)))
        }
        None => current.checked_add_signed(Duration::days(1)),
    }
}
