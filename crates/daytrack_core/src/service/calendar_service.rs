//! Calendar composition service.
//!
//! # Responsibility
//! - Load one owner's tasks and goals and hand them to the pure
//!   aggregation helpers.
//!
//! # Invariants
//! - No caching; every call reflects current repository state.

use crate::repo::goal_repo::{GoalListQuery, GoalRepository};
use crate::repo::task_repo::{TaskListQuery, TaskRepository};
use crate::repo::RepoResult;
use crate::schedule::calendar::{
    aggregate_events, bucket_by_day, dominant_kind_on, CalendarEvent, EventKind,
};
use chrono::NaiveDate;

/// All events of one UTC day plus the kind that colors its cell.
#[derive(Debug, Clone, PartialEq)]
pub struct DayBucket {
    pub date: NaiveDate,
    pub dominant: EventKind,
    pub events: Vec<CalendarEvent>,
}

/// Read-only calendar facade over the task and goal repositories.
pub struct CalendarService<T: TaskRepository, G: GoalRepository> {
    tasks: T,
    goals: G,
}

impl<T: TaskRepository, G: GoalRepository> CalendarService<T, G> {
    /// Creates a service using the provided repository implementations.
    pub fn new(tasks: T, goals: G) -> Self {
        Self { tasks, goals }
    }

    /// Returns one owner's merged event stream, ordered by start then ID.
    pub fn events_for(&self, owner_id: &str) -> RepoResult<Vec<CalendarEvent>> {
        let tasks = self.tasks.list_tasks(&TaskListQuery {
            owner_id: Some(owner_id.to_string()),
            ..TaskListQuery::default()
        })?;
        let goals = self.goals.list_goals(&GoalListQuery {
            owner_id: Some(owner_id.to_string()),
            ..GoalListQuery::default()
        })?;

        Ok(aggregate_events(tasks, goals))
    }

    /// Returns one owner's events grouped by day, dates ascending.
    pub fn day_summary(&self, owner_id: &str) -> RepoResult<Vec<DayBucket>> {
        let events = self.events_for(owner_id)?;

        Ok(bucket_by_day(events)
            .into_iter()
            .map(|(date, events)| {
                let dominant = dominant_kind_on(&events, date).unwrap_or(EventKind::Task);
                DayBucket {
                    date,
                    dominant,
                    events,
                }
            })
            .collect())
    }
}
