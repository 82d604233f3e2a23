//! Goal use-case service.
//!
//! Mirrors the task service for the simpler goal record, plus the
//! completion-progress summary the goals page renders.

use crate::model::goal::{Goal, GoalId};
use crate::repo::goal_repo::{GoalListQuery, GoalRepository};
use crate::repo::{RepoError, RepoResult};
use chrono::{DateTime, Utc};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for goal use-cases.
#[derive(Debug)]
pub enum GoalServiceError {
    /// Target goal does not exist.
    GoalNotFound(GoalId),
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl Display for GoalServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::GoalNotFound(id) => write!(f, "goal not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for GoalServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::GoalNotFound(_) => None,
        }
    }
}

impl From<RepoError> for GoalServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::GoalNotFound(id),
            other => Self::Repo(other),
        }
    }
}

/// Request model for creating one goal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewGoalRequest {
    pub owner_id: String,
    pub title: String,
    pub description: String,
    pub deadline: DateTime<Utc>,
}

/// Partial update for one goal. `None` fields keep their stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GoalPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub deadline: Option<DateTime<Utc>>,
    pub completed: Option<bool>,
}

/// Completion summary for one owner's goals.
#[derive(Debug, Clone, PartialEq)]
pub struct GoalProgress {
    pub total: usize,
    pub completed: usize,
    /// Completed share in percent; `0.0` when no goals exist.
    pub percent: f64,
}

/// Goal service facade over repository implementations.
pub struct GoalService<R: GoalRepository> {
    repo: R,
}

impl<R: GoalRepository> GoalService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates one goal with trimmed text fields.
    pub fn create_goal(&self, request: &NewGoalRequest) -> Result<Goal, GoalServiceError> {
        let mut goal = Goal::new(
            request.owner_id.clone(),
            request.title.trim(),
            request.deadline,
        );
        goal.description = request.description.trim().to_string();

        self.repo.insert_goal(&goal)?;
        Ok(goal)
    }

    /// Gets one goal by stable ID.
    pub fn get_goal(&self, id: GoalId) -> RepoResult<Option<Goal>> {
        self.repo.get_goal(id)
    }

    /// Lists goals using equality filters and pagination.
    pub fn list_goals(&self, query: &GoalListQuery) -> RepoResult<Vec<Goal>> {
        self.repo.list_goals(query)
    }

    /// Applies a partial update and returns the new record state.
    pub fn update_goal(&self, id: GoalId, patch: &GoalPatch) -> Result<Goal, GoalServiceError> {
        let mut goal = self
            .repo
            .get_goal(id)?
            .ok_or(GoalServiceError::GoalNotFound(id))?;

        if let Some(title) = patch.title.as_ref() {
            goal.title = title.trim().to_string();
        }
        if let Some(description) = patch.description.as_ref() {
            goal.description = description.trim().to_string();
        }
        if let Some(deadline) = patch.deadline {
            goal.deadline = deadline;
        }
        if let Some(completed) = patch.completed {
            goal.completed = completed;
        }
        goal.touch();

        self.repo.update_goal(&goal)?;
        Ok(goal)
    }

    /// Flips the completion flag and returns the new value.
    pub fn toggle_completed(&self, id: GoalId) -> Result<bool, GoalServiceError> {
        let goal = self
            .repo
            .get_goal(id)?
            .ok_or(GoalServiceError::GoalNotFound(id))?;

        let next = !goal.completed;
        self.repo.set_goal_completed(id, next)?;
        Ok(next)
    }

    /// Hard-deletes one goal.
    pub fn delete_goal(&self, id: GoalId) -> Result<(), GoalServiceError> {
        self.repo.delete_goal(id)?;
        Ok(())
    }

    /// Summarizes completion for one owner's goals.
    pub fn progress(&self, owner_id: &str) -> Result<GoalProgress, GoalServiceError> {
        let goals = self.repo.list_goals(&GoalListQuery {
            owner_id: Some(owner_id.to_string()),
            ..GoalListQuery::default()
        })?;

        let total = goals.len();
        let completed = goals.iter().filter(|goal| goal.completed).count();
        let percent = if total == 0 {
            0.0
        } else {
            (completed as f64 / total as f64) * 100.0
        };

        Ok(GoalProgress {
            total,
            completed,
            percent,
        })
    }
}
