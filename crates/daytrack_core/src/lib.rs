//! Core domain logic for daytrack.
//! This crate is the single source of truth for business invariants.

pub mod auth;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod schedule;
pub mod search;
pub mod service;

pub use auth::provider::{IdentityProvider, ProviderError, ProviderIdentity, ProviderResult};
pub use auth::service::{effective_display_name, AuthError, AuthService, MIN_PASSWORD_CHARS};
pub use logging::{default_log_level, init_logging, logging_status, LogLevel};
pub use model::goal::{Goal, GoalId, GoalValidationError};
pub use model::task::{
    Recurrence, RecurrenceFrequency, Task, TaskId, TaskKind, TaskValidationError,
};
pub use model::user::{UserProfile, UserValidationError};
pub use repo::goal_repo::{GoalListQuery, GoalRepository, SqliteGoalRepository};
pub use repo::task_repo::{SqliteTaskRepository, TaskListQuery, TaskRepository};
pub use repo::user_repo::{SqliteUserRepository, UserRepository};
pub use repo::{RepoError, RepoResult};
pub use schedule::calendar::{CalendarEvent, EventKind};
pub use schedule::countdown::{days_remaining, CountdownRepeat, Urgency, DEFAULT_COUNTDOWN_DAYS};
pub use schedule::expansion::{ExpansionError, RepeatRule, SeriesPreview, DEFAULT_PREVIEW_CAP};
pub use search::substring::{
    normalize_search_limit, search_all, SearchDomain, SearchError, SearchHit, SearchQuery,
};
pub use service::calendar_service::{CalendarService, DayBucket};
pub use service::goal_service::{
    GoalPatch, GoalProgress, GoalService, GoalServiceError, NewGoalRequest,
};
pub use service::task_service::{
    CountdownRequest, NewTaskRequest, SeriesRequest, TaskPatch, TaskService, TaskServiceError,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
