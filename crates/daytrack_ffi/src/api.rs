//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose stable, use-case-level functions to Dart via FRB.
//! - Keep error semantics simple for early-stage UI integration.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Return values are envelope structs with stable meaning.
//! - Identity flows run on the host; core only mirrors the resulting
//!   identity and tracks the session uid.

use chrono::{DateTime, NaiveDate, Utc};
use daytrack_core::db::open_db;
use daytrack_core::{
    core_version as core_version_inner, days_remaining, effective_display_name,
    init_logging as init_logging_inner,
    normalize_search_limit, ping as ping_inner, search_all, CalendarService, CountdownRepeat,
    CountdownRequest, GoalListQuery, GoalPatch, GoalService, GoalServiceError, NewGoalRequest,
    NewTaskRequest, RecurrenceFrequency, RepeatRule, SearchDomain, SearchQuery, SeriesRequest,
    SqliteGoalRepository, SqliteTaskRepository, SqliteUserRepository, Task, TaskKind,
    TaskListQuery, TaskPatch, TaskService, TaskServiceError, UserProfile, UserRepository,
};
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};
use uuid::Uuid;

const DB_FILE_NAME: &str = "daytrack.sqlite3";
static DB_PATH: OnceLock<PathBuf> = OnceLock::new();
static SESSION_UID: Mutex<Option<String>> = Mutex::new(None);

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Sync call; may perform small file-system setup work.
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Reconfiguration attempts with different level or directory return error.
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Generic action response envelope for task command flows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskActionResponse {
    /// Whether the operation succeeded.
    pub ok: bool,
    /// Created or affected task IDs in instance order.
    pub task_ids: Vec<String>,
    /// Human-readable response message for diagnostics/UI.
    pub message: String,
}

impl TaskActionResponse {
    fn success(message: impl Into<String>, task_ids: Vec<String>) -> Self {
        Self {
            ok: true,
            task_ids,
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            task_ids: Vec::new(),
            message: message.into(),
        }
    }
}

/// One task row as the UI consumes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskItem {
    pub id: String,
    pub owner_id: String,
    pub title: String,
    pub description: String,
    /// `standard` or `countdown`.
    pub kind: String,
    pub start_epoch_ms: i64,
    pub end_epoch_ms: i64,
    pub completed: bool,
    pub countdown_days: Option<u32>,
    /// Signed days until the countdown target; `None` for standard tasks.
    pub days_remaining: Option<i64>,
    pub recurrence_frequency: Option<String>,
    pub recurrence_occurrence: Option<u32>,
    pub recurrence_total: Option<u32>,
}

/// List response envelope for task queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskListResponse {
    pub items: Vec<TaskItem>,
    pub message: String,
}

/// Creates one standard task.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
/// - Returns the created task ID on success.
#[flutter_rust_bridge::frb(sync)]
pub fn create_task(
    owner_id: String,
    title: String,
    description: String,
    start_epoch_ms: i64,
    end_epoch_ms: i64,
) -> TaskActionResponse {
    let (start, end) = match (
        epoch_ms_to_utc(start_epoch_ms, "start_epoch_ms"),
        epoch_ms_to_utc(end_epoch_ms, "end_epoch_ms"),
    ) {
        (Ok(start), Ok(end)) => (start, end),
        (Err(err), _) | (_, Err(err)) => return TaskActionResponse::failure(err),
    };

    let request = NewTaskRequest {
        owner_id,
        title,
        description,
        start,
        end,
    };
    match with_task_service(|service| service.create_task(&request)) {
        Ok(task) => TaskActionResponse::success("Task created.", vec![task.id.to_string()]),
        Err(err) => TaskActionResponse::failure(format!("create_task failed: {err}")),
    }
}

/// Expands a recurring series and creates every instance.
///
/// Input semantics:
/// - `start_date`/`end_date`: `YYYY-MM-DD`, end date inclusive.
/// - `frequency`: `daily|weekly|monthly` or `None` for one task per day.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
/// - Returns created task IDs, oldest first.
#[flutter_rust_bridge::frb(sync)]
pub fn create_task_series(
    owner_id: String,
    title: String,
    description: String,
    start_date: String,
    end_date: String,
    frequency: Option<String>,
    interval: u32,
) -> TaskActionResponse {
    let request = match build_series_request(
        owner_id,
        title,
        description,
        &start_date,
        &end_date,
        frequency.as_deref(),
        interval,
    ) {
        Ok(request) => request,
        Err(err) => return TaskActionResponse::failure(err),
    };

    match with_task_service(|service| service.create_series(&request)) {
        Ok(ids) => TaskActionResponse::success(
            format!("Created {} task(s).", ids.len()),
            ids.iter().map(|id| id.to_string()).collect(),
        ),
        Err(err) => TaskActionResponse::failure(format!("create_task_series failed: {err}")),
    }
}

/// Preview envelope for the series creation dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesPreviewResponse {
    pub ok: bool,
    /// First instance dates as `YYYY-MM-DD`.
    pub dates: Vec<String>,
    /// True series length, which may exceed `dates.len()`.
    pub total: u32,
    pub message: String,
}

/// Returns the first dates of a series without persisting anything.
///
/// # FFI contract
/// - Sync call, pure computation.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn preview_task_series(
    title: String,
    start_date: String,
    end_date: String,
    frequency: Option<String>,
    interval: u32,
) -> SeriesPreviewResponse {
    let request = match build_series_request(
        String::new(),
        title,
        String::new(),
        &start_date,
        &end_date,
        frequency.as_deref(),
        interval,
    ) {
        Ok(request) => request,
        Err(err) => {
            return SeriesPreviewResponse {
                ok: false,
                dates: Vec::new(),
                total: 0,
                message: err,
            };
        }
    };

    match with_task_service(|service| {
        service.preview_series(&request, daytrack_core::DEFAULT_PREVIEW_CAP)
    }) {
        Ok(preview) => SeriesPreviewResponse {
            ok: true,
            dates: preview
                .dates
                .iter()
                .map(|date| date.format("%Y-%m-%d").to_string())
                .collect(),
            total: preview.total as u32,
            message: format!("{} instance(s).", preview.total),
        },
        Err(err) => SeriesPreviewResponse {
            ok: false,
            dates: Vec::new(),
            total: 0,
            message: format!("preview_task_series failed: {err}"),
        },
    }
}

/// Creates a countdown task, or a countdown series when repeat fields are
/// set.
///
/// Input semantics:
/// - `days`: days until the target; `None` falls back to 30.
/// - `repeat_frequency`: `daily|weekly|monthly|yearly`; `None` means a
///   single countdown and the other repeat fields are ignored.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
/// - Returns created task IDs, oldest first.
#[flutter_rust_bridge::frb(sync)]
pub fn create_countdown(
    owner_id: String,
    title: String,
    description: String,
    start_epoch_ms: i64,
    days: Option<u32>,
    repeat_frequency: Option<String>,
    repeat_interval: u32,
    repeat_total: u32,
) -> TaskActionResponse {
    let start = match epoch_ms_to_utc(start_epoch_ms, "start_epoch_ms") {
        Ok(start) => start,
        Err(err) => return TaskActionResponse::failure(err),
    };

    let repeat = match repeat_frequency.as_deref() {
        Some(raw) => match parse_frequency_label(raw) {
            Some(frequency) => Some(CountdownRepeat {
                frequency,
                interval: repeat_interval,
                total_occurrences: repeat_total,
            }),
            None => {
                return TaskActionResponse::failure(format!(
                    "unsupported repeat frequency `{raw}`"
                ));
            }
        },
        None => None,
    };

    let request = CountdownRequest {
        owner_id,
        title,
        description,
        start,
        days,
        repeat,
    };
    match with_task_service(|service| service.create_countdown(&request)) {
        Ok(ids) => TaskActionResponse::success(
            format!("Created {} countdown(s).", ids.len()),
            ids.iter().map(|id| id.to_string()).collect(),
        ),
        Err(err) => TaskActionResponse::failure(format!("create_countdown failed: {err}")),
    }
}

/// Lists tasks with equality filters and pagination.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics; failures return an empty list plus a message.
#[flutter_rust_bridge::frb(sync)]
pub fn list_tasks(
    owner_id: Option<String>,
    kind: Option<String>,
    completed: Option<bool>,
    limit: Option<u32>,
    offset: u32,
) -> TaskListResponse {
    let kind = match kind.as_deref() {
        Some("standard") => Some(TaskKind::Standard),
        Some("countdown") => Some(TaskKind::Countdown),
        Some(other) => {
            return TaskListResponse {
                items: Vec::new(),
                message: format!("unsupported task kind `{other}`"),
            };
        }
        None => None,
    };

    let query = TaskListQuery {
        owner_id,
        kind,
        completed,
        limit,
        offset,
    };
    match with_task_service(|service| service.list_tasks(&query).map_err(TaskServiceError::Repo))
    {
        Ok(tasks) => {
            let now = Utc::now();
            TaskListResponse {
                message: format!("Found {} task(s).", tasks.len()),
                items: tasks.into_iter().map(|task| to_task_item(task, now)).collect(),
            }
        }
        Err(err) => TaskListResponse {
            items: Vec::new(),
            message: format!("list_tasks failed: {err}"),
        },
    }
}

/// Applies a partial update to one task. `None` fields keep their
/// stored value.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn update_task(
    task_id: String,
    title: Option<String>,
    description: Option<String>,
    start_epoch_ms: Option<i64>,
    end_epoch_ms: Option<i64>,
) -> TaskActionResponse {
    let id = match parse_id(&task_id, "task_id") {
        Ok(id) => id,
        Err(err) => return TaskActionResponse::failure(err),
    };
    let start = match start_epoch_ms.map(|ms| epoch_ms_to_utc(ms, "start_epoch_ms")) {
        Some(Ok(start)) => Some(start),
        Some(Err(err)) => return TaskActionResponse::failure(err),
        None => None,
    };
    let end = match end_epoch_ms.map(|ms| epoch_ms_to_utc(ms, "end_epoch_ms")) {
        Some(Ok(end)) => Some(end),
        Some(Err(err)) => return TaskActionResponse::failure(err),
        None => None,
    };

    let patch = TaskPatch {
        title,
        description,
        start,
        end,
        completed: None,
    };
    match with_task_service(|service| service.update_task(id, &patch)) {
        Ok(_) => TaskActionResponse::success("Task updated.", vec![task_id]),
        Err(err) => TaskActionResponse::failure(format!("update_task failed: {err}")),
    }
}

/// Flips one task's completion flag.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn toggle_task(task_id: String) -> TaskActionResponse {
    let id = match parse_id(&task_id, "task_id") {
        Ok(id) => id,
        Err(err) => return TaskActionResponse::failure(err),
    };

    match with_task_service(|service| service.toggle_completed(id)) {
        Ok(true) => TaskActionResponse::success("Task completed.", vec![task_id]),
        Ok(false) => TaskActionResponse::success("Task reopened.", vec![task_id]),
        Err(err) => TaskActionResponse::failure(format!("toggle_task failed: {err}")),
    }
}

/// Hard-deletes one task.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn delete_task(task_id: String) -> TaskActionResponse {
    let id = match parse_id(&task_id, "task_id") {
        Ok(id) => id,
        Err(err) => return TaskActionResponse::failure(err),
    };

    match with_task_service(|service| service.delete_task(id)) {
        Ok(()) => TaskActionResponse::success("Task deleted.", vec![task_id]),
        Err(err) => TaskActionResponse::failure(format!("delete_task failed: {err}")),
    }
}

/// Hard-deletes a batch of tasks (series cleanup).
///
/// Missing IDs are tolerated; the message reports how many rows existed.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn delete_task_series(task_ids: Vec<String>) -> TaskActionResponse {
    let mut ids = Vec::with_capacity(task_ids.len());
    for raw in &task_ids {
        match parse_id(raw, "task_ids") {
            Ok(id) => ids.push(id),
            Err(err) => return TaskActionResponse::failure(err),
        }
    }

    match with_task_service(|service| service.delete_series(&ids)) {
        Ok(deleted) => {
            TaskActionResponse::success(format!("Deleted {deleted} task(s)."), task_ids)
        }
        Err(err) => TaskActionResponse::failure(format!("delete_task_series failed: {err}")),
    }
}

/// Generic action response envelope for goal command flows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoalActionResponse {
    pub ok: bool,
    pub goal_id: Option<String>,
    pub message: String,
}

impl GoalActionResponse {
    fn success(message: impl Into<String>, goal_id: String) -> Self {
        Self {
            ok: true,
            goal_id: Some(goal_id),
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            goal_id: None,
            message: message.into(),
        }
    }
}

/// One goal row as the UI consumes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoalItem {
    pub id: String,
    pub owner_id: String,
    pub title: String,
    pub description: String,
    pub deadline_epoch_ms: i64,
    pub completed: bool,
}

/// List response envelope for goal queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoalListResponse {
    pub items: Vec<GoalItem>,
    pub message: String,
}

/// Completion summary envelope for the goals page header.
#[derive(Debug, Clone, PartialEq)]
pub struct GoalProgressResponse {
    pub ok: bool,
    pub total: u32,
    pub completed: u32,
    /// Completed share in percent; `0.0` when no goals exist.
    pub percent: f64,
    pub message: String,
}

/// Creates one goal.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn create_goal(
    owner_id: String,
    title: String,
    description: String,
    deadline_epoch_ms: i64,
) -> GoalActionResponse {
    let deadline = match epoch_ms_to_utc(deadline_epoch_ms, "deadline_epoch_ms") {
        Ok(deadline) => deadline,
        Err(err) => return GoalActionResponse::failure(err),
    };

    let request = NewGoalRequest {
        owner_id,
        title,
        description,
        deadline,
    };
    match with_goal_service(|service| service.create_goal(&request)) {
        Ok(goal) => GoalActionResponse::success("Goal created.", goal.id.to_string()),
        Err(err) => GoalActionResponse::failure(format!("create_goal failed: {err}")),
    }
}

/// Lists one owner's goals, deadline ascending.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics; failures return an empty list plus a message.
#[flutter_rust_bridge::frb(sync)]
pub fn list_goals(owner_id: String) -> GoalListResponse {
    let query = GoalListQuery {
        owner_id: Some(owner_id),
        ..GoalListQuery::default()
    };
    match with_goal_service(|service| service.list_goals(&query).map_err(GoalServiceError::Repo))
    {
        Ok(goals) => GoalListResponse {
            message: format!("Found {} goal(s).", goals.len()),
            items: goals
                .into_iter()
                .map(|goal| GoalItem {
                    id: goal.id.to_string(),
                    owner_id: goal.owner_id,
                    title: goal.title,
                    description: goal.description,
                    deadline_epoch_ms: goal.deadline.timestamp_millis(),
                    completed: goal.completed,
                })
                .collect(),
        },
        Err(err) => GoalListResponse {
            items: Vec::new(),
            message: format!("list_goals failed: {err}"),
        },
    }
}

/// Updates one goal's deadline.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn reschedule_goal(goal_id: String, deadline_epoch_ms: i64) -> GoalActionResponse {
    let id = match parse_id(&goal_id, "goal_id") {
        Ok(id) => id,
        Err(err) => return GoalActionResponse::failure(err),
    };
    let deadline = match epoch_ms_to_utc(deadline_epoch_ms, "deadline_epoch_ms") {
        Ok(deadline) => deadline,
        Err(err) => return GoalActionResponse::failure(err),
    };

    let patch = GoalPatch {
        deadline: Some(deadline),
        ..GoalPatch::default()
    };
    match with_goal_service(|service| service.update_goal(id, &patch)) {
        Ok(_) => GoalActionResponse::success("Goal rescheduled.", goal_id),
        Err(err) => GoalActionResponse::failure(format!("reschedule_goal failed: {err}")),
    }
}

/// Flips one goal's completion flag.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn toggle_goal(goal_id: String) -> GoalActionResponse {
    let id = match parse_id(&goal_id, "goal_id") {
        Ok(id) => id,
        Err(err) => return GoalActionResponse::failure(err),
    };

    match with_goal_service(|service| service.toggle_completed(id)) {
        Ok(true) => GoalActionResponse::success("Goal completed.", goal_id),
        Ok(false) => GoalActionResponse::success("Goal reopened.", goal_id),
        Err(err) => GoalActionResponse::failure(format!("toggle_goal failed: {err}")),
    }
}

/// Hard-deletes one goal.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn delete_goal(goal_id: String) -> GoalActionResponse {
    let id = match parse_id(&goal_id, "goal_id") {
        Ok(id) => id,
        Err(err) => return GoalActionResponse::failure(err),
    };

    match with_goal_service(|service| service.delete_goal(id)) {
        Ok(()) => GoalActionResponse::success("Goal deleted.", goal_id),
        Err(err) => GoalActionResponse::failure(format!("delete_goal failed: {err}")),
    }
}

/// Summarizes completion across one owner's goals.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn goal_progress(owner_id: String) -> GoalProgressResponse {
    match with_goal_service(|service| service.progress(&owner_id)) {
        Ok(progress) => GoalProgressResponse {
            ok: true,
            total: progress.total as u32,
            completed: progress.completed as u32,
            percent: progress.percent,
            message: format!(
                "{} of {} goal(s) completed.",
                progress.completed, progress.total
            ),
        },
        Err(err) => GoalProgressResponse {
            ok: false,
            total: 0,
            completed: 0,
            percent: 0.0,
            message: format!("goal_progress failed: {err}"),
        },
    }
}

/// One aggregated calendar event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarEventItem {
    /// ID of the task or goal the event was built from.
    pub source_id: String,
    pub title: String,
    /// `task`, `countdown` or `goal`.
    pub kind: String,
    pub start_epoch_ms: i64,
    pub end_epoch_ms: i64,
    pub completed: bool,
}

/// All events of one UTC day plus the kind that colors its cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarDayItem {
    /// `YYYY-MM-DD`.
    pub date: String,
    /// Highest-priority kind on the day (`goal` > `countdown` > `task`).
    pub dominant: String,
    pub events: Vec<CalendarEventItem>,
}

/// Calendar response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarResponse {
    pub days: Vec<CalendarDayItem>,
    pub message: String,
}

/// Returns one owner's merged task/goal events grouped by UTC day.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics; failures return an empty list plus a message.
#[flutter_rust_bridge::frb(sync)]
pub fn calendar_day_summary(owner_id: String) -> CalendarResponse {
    let db_path = resolve_db_path();
    let conn = match open_db(&db_path) {
        Ok(conn) => conn,
        Err(err) => {
            return CalendarResponse {
                days: Vec::new(),
                message: format!("calendar_day_summary failed: {err}"),
            };
        }
    };

    let service = match calendar_service(&conn) {
        Ok(service) => service,
        Err(err) => {
            return CalendarResponse {
                days: Vec::new(),
                message: err,
            };
        }
    };

    match service.day_summary(&owner_id) {
        Ok(buckets) => CalendarResponse {
            message: format!("Found {} day(s) with events.", buckets.len()),
            days: buckets
                .into_iter()
                .map(|bucket| CalendarDayItem {
                    date: bucket.date.format("%Y-%m-%d").to_string(),
                    dominant: event_kind_label(bucket.dominant).to_string(),
                    events: bucket
                        .events
                        .into_iter()
                        .map(|event| CalendarEventItem {
                            source_id: event.source_id.to_string(),
                            title: event.title,
                            kind: event_kind_label(event.kind).to_string(),
                            start_epoch_ms: event.start.timestamp_millis(),
                            end_epoch_ms: event.end.timestamp_millis(),
                            completed: event.completed,
                        })
                        .collect(),
                })
                .collect(),
        },
        Err(err) => CalendarResponse {
            days: Vec::new(),
            message: format!("calendar_day_summary failed: {err}"),
        },
    }
}

/// Search item returned by substring search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchItem {
    /// Stable task or goal ID in string form.
    pub source_id: String,
    /// `task` or `goal`.
    pub domain: String,
    pub title: String,
    /// Short snippet summary for result display.
    pub snippet: String,
}

/// Search response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResponse {
    /// Search results, tasks before goals.
    pub items: Vec<SearchItem>,
    pub message: String,
    /// Effective applied search limit.
    pub applied_limit: u32,
}

/// Searches tasks and goals by case-insensitive substring.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
/// - Returns deterministic envelope with applied limit.
#[flutter_rust_bridge::frb(sync)]
pub fn search_entries(
    text: String,
    owner_id: Option<String>,
    domain: Option<String>,
    limit: Option<u32>,
) -> SearchResponse {
    let applied_limit = normalize_search_limit(limit);
    let domain = match domain.as_deref() {
        Some("tasks") => Some(SearchDomain::Tasks),
        Some("goals") => Some(SearchDomain::Goals),
        Some(other) => {
            return SearchResponse {
                items: Vec::new(),
                message: format!("unsupported search domain `{other}`"),
                applied_limit,
            };
        }
        None => None,
    };

    let db_path = resolve_db_path();
    let conn = match open_db(&db_path) {
        Ok(conn) => conn,
        Err(err) => {
            return SearchResponse {
                items: Vec::new(),
                message: format!("search_entries failed: {err}"),
                applied_limit,
            };
        }
    };

    let query = SearchQuery {
        text,
        owner_id,
        domain,
        limit: applied_limit,
    };
    match search_all(&conn, &query) {
        Ok(hits) => {
            let items = hits
                .into_iter()
                .map(|hit| SearchItem {
                    source_id: hit.source_id.to_string(),
                    domain: match hit.domain {
                        SearchDomain::Tasks => "task".to_string(),
                        SearchDomain::Goals => "goal".to_string(),
                    },
                    title: hit.title,
                    snippet: hit.snippet,
                })
                .collect::<Vec<_>>();
            let message = if items.is_empty() {
                "No results.".to_string()
            } else {
                format!("Found {} result(s).", items.len())
            };
            SearchResponse {
                items,
                message,
                applied_limit,
            }
        }
        Err(err) => SearchResponse {
            items: Vec::new(),
            message: format!("search_entries failed: {err}"),
            applied_limit,
        },
    }
}

/// Session/profile response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionResponse {
    pub ok: bool,
    /// Signed-in uid after the call, if any.
    pub uid: Option<String>,
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub photo_url: Option<String>,
    pub message: String,
}

impl SessionResponse {
    fn signed_out(message: impl Into<String>) -> Self {
        Self {
            ok: true,
            uid: None,
            display_name: None,
            email: None,
            photo_url: None,
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            uid: None,
            display_name: None,
            email: None,
            photo_url: None,
            message: message.into(),
        }
    }

    fn from_profile(profile: UserProfile, message: impl Into<String>) -> Self {
        Self {
            ok: true,
            uid: Some(profile.uid),
            display_name: Some(profile.display_name),
            email: Some(profile.email),
            photo_url: profile.photo_url,
            message: message.into(),
        }
    }
}

/// Records a host-side sign-in: mirrors the identity locally and opens
/// the session.
///
/// The credential/OAuth flow itself runs in the host's identity SDK;
/// core only receives the resulting identity snapshot.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
/// - A failed call leaves no session behind.
#[flutter_rust_bridge::frb(sync)]
pub fn session_sign_in(
    uid: String,
    email: String,
    display_name: String,
    photo_url: Option<String>,
) -> SessionResponse {
    // Google accounts can arrive without a display name; mirror them
    // the same way the core session path does.
    let display_name = effective_display_name(&display_name, &email);
    let mut profile = UserProfile::new(uid, display_name, email);
    profile.photo_url = photo_url;
    if let Err(err) = profile.validate() {
        return SessionResponse::failure(format!("session_sign_in failed: {err}"));
    }

    let db_path = resolve_db_path();
    let conn = match open_db(&db_path) {
        Ok(conn) => conn,
        Err(err) => return SessionResponse::failure(format!("session_sign_in failed: {err}")),
    };
    let repo = match SqliteUserRepository::try_new(&conn) {
        Ok(repo) => repo,
        Err(err) => return SessionResponse::failure(format!("session_sign_in failed: {err}")),
    };
    if let Err(err) = repo.upsert_user(&profile) {
        return SessionResponse::failure(format!("session_sign_in failed: {err}"));
    }

    match SESSION_UID.lock() {
        Ok(mut session) => *session = Some(profile.uid.clone()),
        Err(_) => return SessionResponse::failure("session state is poisoned"),
    }
    SessionResponse::from_profile(profile, "Signed in.")
}

/// Clears the current session.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never panics; signing out twice is not an error.
#[flutter_rust_bridge::frb(sync)]
pub fn session_sign_out() -> SessionResponse {
    match SESSION_UID.lock() {
        Ok(mut session) => {
            session.take();
            SessionResponse::signed_out("Signed out.")
        }
        Err(_) => SessionResponse::failure("session state is poisoned"),
    }
}

/// Returns the stored profile of the signed-in user, if any.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn session_current_user() -> SessionResponse {
    let uid = match SESSION_UID.lock() {
        Ok(session) => match session.clone() {
            Some(uid) => uid,
            None => return SessionResponse::signed_out("No user is signed in."),
        },
        Err(_) => return SessionResponse::failure("session state is poisoned"),
    };

    let db_path = resolve_db_path();
    let conn = match open_db(&db_path) {
        Ok(conn) => conn,
        Err(err) => return SessionResponse::failure(format!("session_current_user failed: {err}")),
    };
    let repo = match SqliteUserRepository::try_new(&conn) {
        Ok(repo) => repo,
        Err(err) => return SessionResponse::failure(format!("session_current_user failed: {err}")),
    };

    match repo.get_user(&uid) {
        Ok(Some(profile)) => SessionResponse::from_profile(profile, "Signed in."),
        Ok(None) => SessionResponse::failure(format!("no stored profile for uid `{uid}`")),
        Err(err) => SessionResponse::failure(format!("session_current_user failed: {err}")),
    }
}

fn build_series_request(
    owner_id: String,
    title: String,
    description: String,
    start_date: &str,
    end_date: &str,
    frequency: Option<&str>,
    interval: u32,
) -> Result<SeriesRequest, String> {
    let start_date = parse_iso_date(start_date, "start_date")?;
    let end_date = parse_iso_date(end_date, "end_date")?;
    let frequency = match frequency {
        Some(raw) => match parse_frequency_label(raw) {
            Some(RecurrenceFrequency::Yearly) | None => {
                return Err(format!("unsupported series frequency `{raw}`"));
            }
            parsed => parsed,
        },
        None => None,
    };

    Ok(SeriesRequest {
        owner_id,
        title,
        description,
        start_date,
        end_date,
        rule: RepeatRule {
            frequency,
            interval,
        },
    })
}

fn parse_frequency_label(value: &str) -> Option<RecurrenceFrequency> {
    match value.trim().to_ascii_lowercase().as_str() {
        "daily" => Some(RecurrenceFrequency::Daily),
        "weekly" => Some(RecurrenceFrequency::Weekly),
        "monthly" => Some(RecurrenceFrequency::Monthly),
        "yearly" => Some(RecurrenceFrequency::Yearly),
        _ => None,
    }
}

fn parse_iso_date(value: &str, field: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| format!("{field} must be YYYY-MM-DD, got `{value}`"))
}

fn parse_id(value: &str, field: &str) -> Result<Uuid, String> {
    Uuid::parse_str(value.trim()).map_err(|_| format!("{field} is not a valid id: `{value}`"))
}

fn epoch_ms_to_utc(value: i64, field: &str) -> Result<DateTime<Utc>, String> {
    DateTime::<Utc>::from_timestamp_millis(value)
        .ok_or_else(|| format!("{field} is out of range: {value}"))
}

fn to_task_item(task: Task, now: DateTime<Utc>) -> TaskItem {
    let remaining = match task.kind {
        TaskKind::Countdown => Some(days_remaining(task.end, now)),
        TaskKind::Standard => None,
    };
    let rule = task.recurrence;
    TaskItem {
        id: task.id.to_string(),
        owner_id: task.owner_id,
        title: task.title,
        description: task.description,
        kind: match task.kind {
            TaskKind::Standard => "standard".to_string(),
            TaskKind::Countdown => "countdown".to_string(),
        },
        start_epoch_ms: task.start.timestamp_millis(),
        end_epoch_ms: task.end.timestamp_millis(),
        completed: task.completed,
        countdown_days: task.countdown_days,
        days_remaining: remaining,
        recurrence_frequency: rule.map(|r| frequency_label(r.frequency).to_string()),
        recurrence_occurrence: rule.and_then(|r| r.occurrence),
        recurrence_total: rule.and_then(|r| r.total_occurrences),
    }
}

fn frequency_label(frequency: RecurrenceFrequency) -> &'static str {
    match frequency {
        RecurrenceFrequency::Daily => "daily",
        RecurrenceFrequency::Weekly => "weekly",
        RecurrenceFrequency::Monthly => "monthly",
        RecurrenceFrequency::Yearly => "yearly",
    }
}

fn event_kind_label(kind: daytrack_core::EventKind) -> &'static str {
    match kind {
        daytrack_core::EventKind::Task => "task",
        daytrack_core::EventKind::Countdown => "countdown",
        daytrack_core::EventKind::Goal => "goal",
    }
}

fn resolve_db_path() -> PathBuf {
    DB_PATH
        .get_or_init(|| {
            if let Ok(raw) = std::env::var("DAYTRACK_DB_PATH") {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(DB_FILE_NAME)
        })
        .clone()
}

fn with_task_service<T>(
    f: impl FnOnce(&TaskService<SqliteTaskRepository<'_>>) -> Result<T, TaskServiceError>,
) -> Result<T, String> {
    let db_path = resolve_db_path();
    let conn = open_db(&db_path).map_err(|err| format!("DB open failed: {err}"))?;
    let repo = SqliteTaskRepository::try_new(&conn)
        .map_err(|err| format!("task repo init failed: {err}"))?;
    let service = TaskService::new(repo);
    f(&service).map_err(|err| err.to_string())
}

fn with_goal_service<T>(
    f: impl FnOnce(&GoalService<SqliteGoalRepository<'_>>) -> Result<T, GoalServiceError>,
) -> Result<T, String> {
    let db_path = resolve_db_path();
    let conn = open_db(&db_path).map_err(|err| format!("DB open failed: {err}"))?;
    let repo = SqliteGoalRepository::try_new(&conn)
        .map_err(|err| format!("goal repo init failed: {err}"))?;
    let service = GoalService::new(repo);
    f(&service).map_err(|err| err.to_string())
}

fn calendar_service(
    conn: &rusqlite::Connection,
) -> Result<CalendarService<SqliteTaskRepository<'_>, SqliteGoalRepository<'_>>, String> {
    let tasks = SqliteTaskRepository::try_new(conn)
        .map_err(|err| format!("task repo init failed: {err}"))?;
    let goals = SqliteGoalRepository::try_new(conn)
        .map_err(|err| format!("goal repo init failed: {err}"))?;
    Ok(CalendarService::new(tasks, goals))
}
