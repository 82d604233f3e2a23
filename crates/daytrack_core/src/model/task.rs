//! Task domain model.
//!
//! # Responsibility
//! - Define the task record shared by standard and countdown projections.
//! - Validate field rules before a record reaches the repository layer.
//!
//! # Invariants
//! - `id` is stable and never reused for another task.
//! - `end` is never earlier than `start`.
//! - `countdown_days` is present exactly when `kind == TaskKind::Countdown`.
//!
//! # See also
//! - docs/architecture/data-model.md

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for every task row.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type TaskId = Uuid;

/// Category of a task record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    /// Calendar task with a concrete start/end window.
    Standard,
    /// Day-counting item tracking time left until a target date.
    Countdown,
}

/// Step unit for a recurrence rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecurrenceFrequency {
    Daily,
    Weekly,
    Monthly,
    /// Only produced by countdown series.
    Yearly,
}

/// Recurrence rule persisted on countdown series members.
///
/// Standard recurring tasks are expanded into plain rows at creation time
/// and never carry a rule; countdown members keep theirs so the series can
/// be displayed and deleted as a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recurrence {
    pub frequency: RecurrenceFrequency,
    /// Units of `frequency` between members. Minimum 1.
    pub interval: u32,
    /// Total members in the series, when known up front.
    pub total_occurrences: Option<u32>,
    /// 1-based position of this member within its series.
    pub occurrence: Option<u32>,
}

/// Validation failure for a task record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskValidationError {
    EmptyTitle,
    EndBeforeStart,
    MissingCountdownDays,
    ZeroCountdownDays,
    UnexpectedCountdownDays,
    ZeroRecurrenceInterval,
}

impl Display for TaskValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "task title must not be empty"),
            Self::EndBeforeStart => write!(f, "task end must not be earlier than start"),
            Self::MissingCountdownDays => {
                write!(f, "countdown task requires countdown_days")
            }
            Self::ZeroCountdownDays => write!(f, "countdown_days must be at least 1"),
            Self::UnexpectedCountdownDays => {
                write!(f, "standard task must not carry countdown_days")
            }
            Self::ZeroRecurrenceInterval => {
                write!(f, "recurrence interval must be at least 1")
            }
        }
    }
}

impl Error for TaskValidationError {}

/// Canonical task record.
///
/// `start`/`end` always hold concrete instants. For countdown items `end`
/// is the target date the countdown runs toward.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Stable global ID used for linking and series deletion.
    pub id: TaskId,
    /// `uid` of the user this row belongs to.
    pub owner_id: String,
    pub title: String,
    pub description: String,
    /// Serialized as `type` to match external schema naming.
    #[serde(rename = "type")]
    pub kind: TaskKind,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub completed: bool,
    /// Meaningful only when `kind == TaskKind::Countdown`.
    pub countdown_days: Option<u32>,
    /// Present on countdown series members, absent everywhere else.
    pub recurrence: Option<Recurrence>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Creates a standard task with a generated stable ID.
    ///
    /// # Invariants
    /// - Countdown fields are initialized to `None`.
    /// - `completed` starts as `false`.
    pub fn new(
        owner_id: impl Into<String>,
        title: impl Into<String>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Self {
        Self::with_id(Uuid::new_v4(), owner_id, title, start, end)
    }

    /// Creates a standard task with a caller-provided stable ID.
    ///
    /// Used by tests and import paths where identity already exists.
    pub fn with_id(
        id: TaskId,
        owner_id: impl Into<String>,
        title: impl Into<String>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            owner_id: owner_id.into(),
            title: title.into(),
            description: String::new(),
            kind: TaskKind::Standard,
            start,
            end,
            completed: false,
            countdown_days: None,
            recurrence: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Checks the record against the rules listed in the module docs.
    ///
    /// # Contract
    /// - Called by every repository write path before SQL runs.
    /// - Titles are compared after trimming.
    pub fn validate(&self) -> Result<(), TaskValidationError> {
        if self.title.trim().is_empty() {
            return Err(TaskValidationError::EmptyTitle);
        }
        if self.end < self.start {
            return Err(TaskValidationError::EndBeforeStart);
        }
        match (self.kind, self.countdown_days) {
            (TaskKind::Countdown, None) => {
                return Err(TaskValidationError::MissingCountdownDays);
            }
            (TaskKind::Countdown, Some(0)) => {
                return Err(TaskValidationError::ZeroCountdownDays);
            }
            (TaskKind::Standard, Some(_)) => {
                return Err(TaskValidationError::UnexpectedCountdownDays);
            }
            _ => {}
        }
        if let Some(rule) = &self.recurrence {
            if rule.interval == 0 {
                return Err(TaskValidationError::ZeroRecurrenceInterval);
            }
        }
        Ok(())
    }

    /// Refreshes `updated_at` after an in-place mutation.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Sets the completion flag and refreshes `updated_at`.
    pub fn set_completed(&mut self, completed: bool) {
        self.completed = completed;
        self.touch();
    }
}
