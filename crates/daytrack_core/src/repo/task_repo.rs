//! Task repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide stable CRUD APIs over the `tasks` table.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - Write paths call `Task::validate()` before SQL mutations.
//! - List output is ordered by `start_at ASC, id ASC` so pagination and
//!   rendering are deterministic.
//! - Recurrence columns are either all absent or carry a complete rule.

use crate::model::task::{Recurrence, RecurrenceFrequency, Task, TaskId, TaskKind};
use crate::repo::{
    bool_to_int, ensure_table_ready, parse_bool_column, parse_count_column, parse_epoch_ms,
    parse_uuid_column, to_epoch_ms, RepoError, RepoResult,
};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};

const TASK_SELECT_SQL: &str = "SELECT
    id,
    owner_id,
    title,
    description,
    kind,
    start_at,
    end_at,
    completed,
    countdown_days,
    recurrence_frequency,
    recurrence_interval,
    recurrence_total,
    recurrence_occurrence,
    created_at,
    updated_at
FROM tasks";

const TASK_REQUIRED_COLUMNS: &[&str] = &[
    "id",
    "owner_id",
    "title",
    "description",
    "kind",
    "start_at",
    "end_at",
    "completed",
    "countdown_days",
    "recurrence_frequency",
    "recurrence_interval",
    "recurrence_total",
    "recurrence_occurrence",
];

/// Query options for listing tasks. All filters are equality matches.
#[derive(Debug, Clone, Default)]
pub struct TaskListQuery {
    pub owner_id: Option<String>,
    pub kind: Option<TaskKind>,
    pub completed: Option<bool>,
    pub limit: Option<u32>,
    pub offset: u32,
}

/// Repository interface for task CRUD operations.
pub trait TaskRepository {
    fn insert_task(&self, task: &Task) -> RepoResult<TaskId>;
    fn get_task(&self, id: TaskId) -> RepoResult<Option<Task>>;
    fn list_tasks(&self, query: &TaskListQuery) -> RepoResult<Vec<Task>>;
    fn update_task(&self, task: &Task) -> RepoResult<()>;
    fn set_task_completed(&self, id: TaskId, completed: bool) -> RepoResult<()>;
    fn delete_task(&self, id: TaskId) -> RepoResult<()>;
    /// Deletes every listed ID that exists and returns how many rows went
    /// away. Missing IDs are not an error; series deletion tolerates
    /// members already removed.
    fn delete_tasks(&self, ids: &[TaskId]) -> RepoResult<usize>;
}

/// SQLite-backed task repository.
pub struct SqliteTaskRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTaskRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_table_ready(conn, "tasks", TASK_REQUIRED_COLUMNS)?;
        Ok(Self { conn })
    }
}

impl TaskRepository for SqliteTaskRepository<'_> {
    fn insert_task(&self, task: &Task) -> RepoResult<TaskId> {
        task.validate()?;

        let rule = task.recurrence.as_ref();
        self.conn.execute(
            "INSERT INTO tasks (
                id,
                owner_id,
                title,
                description,
                kind,
                start_at,
                end_at,
                completed,
                countdown_days,
                recurrence_frequency,
                recurrence_interval,
                recurrence_total,
                recurrence_occurrence,
                created_at,
                updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15);",
            params![
                task.id.to_string(),
                task.owner_id.as_str(),
                task.title.as_str(),
                task.description.as_str(),
                task_kind_to_db(task.kind),
                to_epoch_ms(task.start),
                to_epoch_ms(task.end),
                bool_to_int(task.completed),
                task.countdown_days,
                rule.map(|r| frequency_to_db(r.frequency)),
                rule.map(|r| r.interval),
                rule.and_then(|r| r.total_occurrences),
                rule.and_then(|r| r.occurrence),
                to_epoch_ms(task.created_at),
                to_epoch_ms(task.updated_at),
            ],
        )?;

        Ok(task.id)
    }

    fn get_task(&self, id: TaskId) -> RepoResult<Option<Task>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{TASK_SELECT_SQL} WHERE id = ?1;"))?;

        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_task_row(row)?));
        }

        Ok(None)
    }

    fn list_tasks(&self, query: &TaskListQuery) -> RepoResult<Vec<Task>> {
        let mut sql = format!("{TASK_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(owner_id) = query.owner_id.as_ref() {
            sql.push_str(" AND owner_id = ?");
            bind_values.push(Value::Text(owner_id.clone()));
        }

        if let Some(kind) = query.kind {
            sql.push_str(" AND kind = ?");
            bind_values.push(Value::Text(task_kind_to_db(kind).to_string()));
        }

        if let Some(completed) = query.completed {
            sql.push_str(" AND completed = ?");
            bind_values.push(Value::Integer(bool_to_int(completed)));
        }

        sql.push_str(" ORDER BY start_at ASC, id ASC");

        if let Some(limit) = query.limit {
            sql.push_str(" LIMIT ?");
            bind_values.push(Value::Integer(i64::from(limit)));
            if query.offset > 0 {
                sql.push_str(" OFFSET ?");
                bind_values.push(Value::Integer(i64::from(query.offset)));
            }
        } else if query.offset > 0 {
            sql.push_str(" LIMIT -1 OFFSET ?");
            bind_values.push(Value::Integer(i64::from(query.offset)));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut tasks = Vec::new();

        while let Some(row) = rows.next()? {
            tasks.push(parse_task_row(row)?);
        }

        Ok(tasks)
    }

    fn update_task(&self, task: &Task) -> RepoResult<()> {
        task.validate()?;

        let rule = task.recurrence.as_ref();
        let changed = self.conn.execute(
            "UPDATE tasks
             SET
                owner_id = ?1,
                title = ?2,
                description = ?3,
                kind = ?4,
                start_at = ?5,
                end_at = ?6,
                completed = ?7,
                countdown_days = ?8,
                recurrence_frequency = ?9,
                recurrence_interval = ?10,
                recurrence_total = ?11,
                recurrence_occurrence = ?12,
                updated_at = ?13
             WHERE id = ?14;",
            params![
                task.owner_id.as_str(),
                task.title.as_str(),
                task.description.as_str(),
                task_kind_to_db(task.kind),
                to_epoch_ms(task.start),
                to_epoch_ms(task.end),
                bool_to_int(task.completed),
                task.countdown_days,
                rule.map(|r| frequency_to_db(r.frequency)),
                rule.map(|r| r.interval),
                rule.and_then(|r| r.total_occurrences),
                rule.and_then(|r| r.occurrence),
                to_epoch_ms(task.updated_at),
                task.id.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(task.id));
        }

        Ok(())
    }

    fn set_task_completed(&self, id: TaskId, completed: bool) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE tasks
             SET
                completed = ?1,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?2;",
            params![bool_to_int(completed), id.to_string()],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }

    fn delete_task(&self, id: TaskId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM tasks WHERE id = ?1;", [id.to_string()])?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }

    fn delete_tasks(&self, ids: &[TaskId]) -> RepoResult<usize> {
        if ids.is_empty() {
            return Ok(0);
        }

        let placeholders = vec!["?"; ids.len()].join(", ");
        let sql = format!("DELETE FROM tasks WHERE id IN ({placeholders});");
        let bind_values: Vec<Value> = ids
            .iter()
            .map(|id| Value::Text(id.to_string()))
            .collect();

        let changed = self.conn.execute(&sql, params_from_iter(bind_values))?;
        Ok(changed)
    }
}

fn parse_task_row(row: &Row<'_>) -> RepoResult<Task> {
    let id_text: String = row.get("id")?;
    let id = parse_uuid_column(&id_text, "tasks.id")?;

    let kind_text: String = row.get("kind")?;
    let kind = parse_task_kind(&kind_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid task kind `{kind_text}` in tasks.kind"))
    })?;

    let completed = parse_bool_column(row.get("completed")?, "tasks.completed")?;

    let countdown_days = match row.get::<_, Option<i64>>("countdown_days")? {
        Some(value) => Some(parse_count_column(value, "tasks.countdown_days")?),
        None => None,
    };

    let recurrence = parse_recurrence_columns(row)?;

    let task = Task {
        id,
        owner_id: row.get("owner_id")?,
        title: row.get("title")?,
        description: row.get("description")?,
        kind,
        start: parse_epoch_ms(row.get("start_at")?, "tasks.start_at")?,
        end: parse_epoch_ms(row.get("end_at")?, "tasks.end_at")?,
        completed,
        countdown_days,
        recurrence,
        created_at: parse_epoch_ms(row.get("created_at")?, "tasks.created_at")?,
        updated_at: parse_epoch_ms(row.get("updated_at")?, "tasks.updated_at")?,
    };
    task.validate()?;
    Ok(task)
}

fn parse_recurrence_columns(row: &Row<'_>) -> RepoResult<Option<Recurrence>> {
    let frequency_text = match row.get::<_, Option<String>>("recurrence_frequency")? {
        Some(value) => value,
        None => return Ok(None),
    };

    let frequency = parse_frequency(&frequency_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid recurrence frequency `{frequency_text}` in tasks.recurrence_frequency"
        ))
    })?;

    let interval = match row.get::<_, Option<i64>>("recurrence_interval")? {
        Some(value) => parse_count_column(value, "tasks.recurrence_interval")?,
        None => {
            return Err(RepoError::InvalidData(
                "recurrence_frequency is set but recurrence_interval is missing".to_string(),
            ));
        }
    };

    let total_occurrences = match row.get::<_, Option<i64>>("recurrence_total")? {
        Some(value) => Some(parse_count_column(value, "tasks.recurrence_total")?),
        None => None,
    };

    let occurrence = match row.get::<_, Option<i64>>("recurrence_occurrence")? {
        Some(value) => Some(parse_count_column(value, "tasks.recurrence_occurrence")?),
        None => None,
    };

    Ok(Some(Recurrence {
        frequency,
        interval,
        total_occurrences,
        occurrence,
    }))
}

fn task_kind_to_db(kind: TaskKind) -> &'static str {
    match kind {
        TaskKind::Standard => "standard",
        TaskKind::Countdown => "countdown",
    }
}

fn parse_task_kind(value: &str) -> Option<TaskKind> {
    match value {
        "standard" => Some(TaskKind::Standard),
        "countdown" => Some(TaskKind::Countdown),
        _ => None,
    }
}

pub(crate) fn frequency_to_db(frequency: RecurrenceFrequency) -> &'static str {
    match frequency {
        RecurrenceFrequency::Daily => "daily",
        RecurrenceFrequency::Weekly => "weekly",
        RecurrenceFrequency::Monthly => "monthly",
        RecurrenceFrequency::Yearly => "yearly",
    }
}

pub(crate) fn parse_frequency(value: &str) -> Option<RecurrenceFrequency> {
    match value {
        "daily" => Some(RecurrenceFrequency::Daily),
        "weekly" => Some(RecurrenceFrequency::Weekly),
        "monthly" => Some(RecurrenceFrequency::Monthly),
        "yearly" => Some(RecurrenceFrequency::Yearly),
        _ => None,
    }
}
