//! Task use-case service.
//!
//! # Responsibility
//! - Provide stable create/list/update entry points for core callers.
//! - Expand recurring and countdown specs before persistence.
//!
//! # Invariants
//! - One expansion call maps to one insert per instance, oldest first.
//! - Titles and descriptions are trimmed before they reach storage.

use crate::model::task::{Recurrence, Task, TaskId, TaskKind};
use crate::repo::task_repo::{TaskListQuery, TaskRepository};
use crate::repo::{RepoError, RepoResult};
use crate::schedule::countdown::{
    countdown_target, expand_countdown_series, CountdownRepeat, DEFAULT_COUNTDOWN_DAYS,
};
use crate::schedule::expansion::{
    expand_series, preview_series, ExpansionError, RepeatRule, SeriesPreview, SeriesSpec,
};
use chrono::{DateTime, NaiveDate, Utc};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Service error for task use-cases.
#[derive(Debug)]
pub enum TaskServiceError {
    /// Target task does not exist.
    TaskNotFound(TaskId),
    /// Series or countdown spec could not be expanded.
    Expansion(ExpansionError),
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl Display for TaskServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TaskNotFound(id) => write!(f, "task not found: {id}"),
            Self::Expansion(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for TaskServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Expansion(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::TaskNotFound(_) => None,
        }
    }
}

impl From<RepoError> for TaskServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::TaskNotFound(id),
            other => Self::Repo(other),
        }
    }
}

impl From<ExpansionError> for TaskServiceError {
    fn from(value: ExpansionError) -> Self {
        Self::Expansion(value)
    }
}

/// Request model for creating one standard task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTaskRequest {
    pub owner_id: String,
    pub title: String,
    pub description: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Request model for creating a recurring series of standard tasks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesRequest {
    pub owner_id: String,
    pub title: String,
    pub description: String,
    pub start_date: NaiveDate,
    /// Inclusive last day of the series.
    pub end_date: NaiveDate,
    pub rule: RepeatRule,
}

/// Request model for creating a countdown (optionally a repeating series).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountdownRequest {
    pub owner_id: String,
    pub title: String,
    pub description: String,
    pub start: DateTime<Utc>,
    /// Days until the target. `None` falls back to 30, values below 1
    /// are treated as 1.
    pub days: Option<u32>,
    pub repeat: Option<CountdownRepeat>,
}

/// Partial update for one task. `None` fields keep their stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub completed: Option<bool>,
}

/// Task service facade over repository implementations.
pub struct TaskService<R: TaskRepository> {
    repo: R,
}

impl<R: TaskRepository> TaskService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates one standard task.
    ///
    /// # Contract
    /// - Title and description are trimmed.
    /// - Returns the fully-populated record as persisted.
    pub fn create_task(&self, request: &NewTaskRequest) -> Result<Task, TaskServiceError> {
        let mut task = Task::new(
            request.owner_id.clone(),
            request.title.trim(),
            request.start,
            request.end,
        );
        task.description = request.description.trim().to_string();

        self.repo.insert_task(&task)?;
        Ok(task)
    }

    /// Expands a series request and persists every instance.
    ///
    /// # Contract
    /// - Instances insert one by one, oldest first; a mid-series failure
    ///   leaves earlier members in place and reports the error.
    /// - Returns created IDs in instance order.
    pub fn create_series(&self, request: &SeriesRequest) -> Result<Vec<TaskId>, TaskServiceError> {
        let instances = expand_series(&SeriesSpec {
            title: request.title.clone(),
            description: request.description.clone(),
            start_date: request.start_date,
            end_date: request.end_date,
            rule: request.rule,
        })?;

        let mut created = Vec::with_capacity(instances.len());
        for instance in instances {
            let mut task = Task::new(
                request.owner_id.clone(),
                instance.title,
                instance.start,
                instance.end,
            );
            task.description = instance.description;
            created.push(self.repo.insert_task(&task)?);
        }

        Ok(created)
    }

    /// Returns the dialog preview for a series request without persisting.
    pub fn preview_series(
        &self,
        request: &SeriesRequest,
        cap: usize,
    ) -> Result<SeriesPreview, TaskServiceError> {
        let preview = preview_series(
            &SeriesSpec {
                title: request.title.clone(),
                description: request.description.clone(),
                start_date: request.start_date,
                end_date: request.end_date,
                rule: request.rule,
            },
            cap,
        )?;
        Ok(preview)
    }

    /// Creates a countdown task, or a whole series when a repeat rule is
    /// present.
    ///
    /// # Contract
    /// - Each member's window runs from its start to its own target.
    /// - Series members persist their rule with `occurrence` and
    ///   `total_occurrences` stamped.
    pub fn create_countdown(
        &self,
        request: &CountdownRequest,
    ) -> Result<Vec<TaskId>, TaskServiceError> {
        let days = request.days.unwrap_or(DEFAULT_COUNTDOWN_DAYS).max(1);

        let members = match request.repeat.as_ref() {
            Some(rule) => {
                let total = rule.total_occurrences.max(1);
                expand_countdown_series(request.start, days, rule)?
                    .into_iter()
                    .map(|member| {
                        (
                            member.start,
                            member.target,
                            Some(Recurrence {
                                frequency: rule.frequency,
                                interval: rule.interval.max(1),
                                total_occurrences: Some(total),
                                occurrence: Some(member.occurrence),
                            }),
                        )
                    })
                    .collect::<Vec<_>>()
            }
            None => {
                let target =
                    countdown_target(request.start, days).ok_or(ExpansionError::DateOverflow)?;
                vec![(request.start, target, None)]
            }
        };

        let mut created = Vec::with_capacity(members.len());
        for (start, target, recurrence) in members {
            let mut task = Task::new(
                request.owner_id.clone(),
                request.title.trim(),
                start,
                target,
            );
            task.description = request.description.trim().to_string();
            task.kind = TaskKind::Countdown;
            task.countdown_days = Some(days);
            task.recurrence = recurrence;
            created.push(self.repo.insert_task(&task)?);
        }

        Ok(created)
    }

    /// Gets one task by stable ID.
    pub fn get_task(&self, id: TaskId) -> RepoResult<Option<Task>> {
        self.repo.get_task(id)
    }

    /// Lists tasks using equality filters and pagination.
    pub fn list_tasks(&self, query: &TaskListQuery) -> RepoResult<Vec<Task>> {
        self.repo.list_tasks(query)
    }

    /// Applies a partial update and returns the new record state.
    pub fn update_task(&self, id: TaskId, patch: &TaskPatch) -> Result<Task, TaskServiceError> {
        let mut task = self
            .repo
            .get_task(id)?
            .ok_or(TaskServiceError::TaskNotFound(id))?;

        if let Some(title) = patch.title.as_ref() {
            task.title = title.trim().to_string();
        }
        if let Some(description) = patch.description.as_ref() {
            task.description = description.trim().to_string();
        }
        if let Some(start) = patch.start {
            task.start = start;
        }
        if let Some(end) = patch.end {
            task.end = end;
        }
        if let Some(completed) = patch.completed {
            task.completed = completed;
        }
        task.touch();

        self.repo.update_task(&task)?;
        Ok(task)
    }

    /// Flips the completion flag and returns the new value.
    pub fn toggle_completed(&self, id: TaskId) -> Result<bool, TaskServiceError> {
        let task = self
            .repo
            .get_task(id)?
            .ok_or(TaskServiceError::TaskNotFound(id))?;

        let next = !task.completed;
        self.repo.set_task_completed(id, next)?;
        Ok(next)
    }

    /// Hard-deletes one task.
    pub fn delete_task(&self, id: TaskId) -> Result<(), TaskServiceError> {
        self.repo.delete_task(id)?;
        Ok(())
    }

    /// Hard-deletes a batch of tasks (series cleanup) and returns how many
    /// rows existed.
    pub fn delete_series(&self, ids: &[Uuid]) -> Result<usize, TaskServiceError> {
        let deleted = self.repo.delete_tasks(ids)?;
        Ok(deleted)
    }
}
