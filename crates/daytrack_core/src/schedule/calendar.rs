//! Calendar event aggregation and day bucketing.
//!
//! # Responsibility
//! - Merge task and goal records into one displayable event stream.
//! - Group events by UTC day and pick the kind that colors a day cell.
//!
//! # Invariants
//! - Duplicate task IDs collapse to their first occurrence.
//! - Goals render as hour-long events anchored at their deadline.
//! - Output ordering is deterministic: start ascending, then source ID.

use crate::model::goal::Goal;
use crate::model::task::{Task, TaskKind};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use std::collections::{BTreeMap, HashSet};
use uuid::Uuid;

/// What an aggregated event originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Task,
    Countdown,
    Goal,
}

impl EventKind {
    /// Rank used when one day holds several kinds; the highest wins the
    /// day's dot color.
    fn priority(self) -> u8 {
        match self {
            Self::Goal => 2,
            Self::Countdown => 1,
            Self::Task => 0,
        }
    }
}

/// One renderable calendar entry, task- or goal-sourced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarEvent {
    /// ID of the task or goal this event was built from.
    pub source_id: Uuid,
    pub title: String,
    pub description: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub completed: bool,
    pub kind: EventKind,
}

/// Merges tasks and goals into one deterministic event stream.
///
/// # Contract
/// - Tasks are deduplicated by ID, first occurrence wins.
/// - Countdown tasks keep their full start-to-target window but surface
///   as `EventKind::Countdown`.
/// - Goals span `deadline .. deadline + 1h`.
pub fn aggregate_events(tasks: Vec<Task>, goals: Vec<Goal>) -> Vec<CalendarEvent> {
    let mut events = Vec::with_capacity(tasks.len() + goals.len());
    let mut seen_tasks: HashSet<Uuid> = HashSet::with_capacity(tasks.len());

    for task in tasks {
        if !seen_tasks.insert(task.id) {
            continue;
        }
        let kind = match task.kind {
            TaskKind::Standard => EventKind::Task,
            TaskKind::Countdown => EventKind::Countdown,
        };
        events.push(CalendarEvent {
            source_id: task.id,
            title: task.title,
            description: task.description,
            start: task.start,
            end: task.end,
            completed: task.completed,
            kind,
        });
    }

    for goal in goals {
        let end = goal
            .deadline
            .checked_add_signed(Duration::hours(1))
            .unwrap_or(goal.deadline);
        events.push(CalendarEvent {
            source_id: goal.id,
            title: goal.title,
            description: goal.description,
            start: goal.deadline,
            end,
            completed: goal.completed,
            kind: EventKind::Goal,
        });
    }

    events.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| a.source_id.cmp(&b.source_id)));
    events
}

/// Groups events by the UTC date they start on.
///
/// Within a day, events keep the order `aggregate_events` produced.
pub fn bucket_by_day(events: Vec<CalendarEvent>) -> BTreeMap<NaiveDate, Vec<CalendarEvent>> {
    let mut buckets: BTreeMap<NaiveDate, Vec<CalendarEvent>> = BTreeMap::new();
    for event in events {
        buckets.entry(event.start.date_naive()).or_default().push(event);
    }
    buckets
}

/// Whether any event starts on the given UTC date.
pub fn has_events_on(events: &[CalendarEvent], date: NaiveDate) -> bool {
    events.iter().any(|event| event.start.date_naive() == date)
}

/// The highest-priority kind among events starting on `date`, if any.
///
/// Priority is Goal over Countdown over Task, mirroring the dot colors a
/// month cell shows.
pub fn dominant_kind_on(events: &[CalendarEvent], date: NaiveDate) -> Option<EventKind> {
    events
        .iter()
        .filter(|event| event.start.date_naive() == date)
        .map(|event| event.kind)
        .max_by_key(|kind| kind.priority())
}
