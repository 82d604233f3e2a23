//! Goal domain model.
//!
//! Goals are deadline-oriented: one target instant, one completion flag.
//! They never recur and never expand into instances.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for every goal row.
pub type GoalId = Uuid;

/// Validation failure for a goal record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GoalValidationError {
    EmptyTitle,
}

impl Display for GoalValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "goal title must not be empty"),
        }
    }
}

impl Error for GoalValidationError {}

/// Canonical goal record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Goal {
    pub id: GoalId,
    /// `uid` of the user this row belongs to.
    pub owner_id: String,
    pub title: String,
    pub description: String,
    /// The instant the goal is due. Calendar views render it as an
    /// hour-long event starting here.
    pub deadline: DateTime<Utc>,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Goal {
    /// Creates a goal with a generated stable ID.
    pub fn new(
        owner_id: impl Into<String>,
        title: impl Into<String>,
        deadline: DateTime<Utc>,
    ) -> Self {
        Self::with_id(Uuid::new_v4(), owner_id, title, deadline)
    }

    /// Creates a goal with a caller-provided stable ID.
    pub fn with_id(
        id: GoalId,
        owner_id: impl Into<String>,
        title: impl Into<String>,
        deadline: DateTime<Utc>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            owner_id: owner_id.into(),
            title: title.into(),
            description: String::new(),
            deadline,
            completed: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// # Contract
    /// - Called by every repository write path before SQL runs.
    pub fn validate(&self) -> Result<(), GoalValidationError> {
        if self.title.trim().is_empty() {
            return Err(GoalValidationError::EmptyTitle);
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
