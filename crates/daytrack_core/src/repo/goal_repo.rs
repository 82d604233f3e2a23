//! Goal repository contract and SQLite implementation.
//!
//! Same shape as the task repository, minus series concerns: goals are
//! single rows ordered by deadline.

use crate::model::goal::{Goal, GoalId};
use crate::repo::{
    bool_to_int, ensure_table_ready, parse_bool_column, parse_epoch_ms, parse_uuid_column,
    to_epoch_ms, RepoError, RepoResult,
};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};

const GOAL_SELECT_SQL: &str = "SELECT
    id,
    owner_id,
    title,
    description,
    deadline,
    completed,
    created_at,
    updated_at
FROM goals";

const GOAL_REQUIRED_COLUMNS: &[&str] =
    &["id", "owner_id", "title", "description", "deadline", "completed"];

/// Query options for listing goals. All filters are equality matches.
#[derive(Debug, Clone, Default)]
pub struct GoalListQuery {
    pub owner_id: Option<String>,
    pub completed: Option<bool>,
    pub limit: Option<u32>,
    pub offset: u32,
}

/// Repository interface for goal CRUD operations.
pub trait GoalRepository {
    fn insert_goal(&self, goal: &Goal) -> RepoResult<GoalId>;
    fn get_goal(&self, id: GoalId) -> RepoResult<Option<Goal>>;
    fn list_goals(&self, query: &GoalListQuery) -> RepoResult<Vec<Goal>>;
    fn update_goal(&self, goal: &Goal) -> RepoResult<()>;
    fn set_goal_completed(&self, id: GoalId, completed: bool) -> RepoResult<()>;
    fn delete_goal(&self, id: GoalId) -> RepoResult<()>;
}

/// SQLite-backed goal repository.
pub struct SqliteGoalRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteGoalRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_table_ready(conn, "goals", GOAL_REQUIRED_COLUMNS)?;
        Ok(Self { conn })
    }
}

impl GoalRepository for SqliteGoalRepository<'_> {
    fn insert_goal(&self, goal: &Goal) -> RepoResult<GoalId> {
        goal.validate()?;

        self.conn.execute(
            "INSERT INTO goals (
                id,
                owner_id,
                title,
                description,
                deadline,
                completed,
                created_at,
                updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);",
            params![
                goal.id.to_string(),
                goal.owner_id.as_str(),
                goal.title.as_str(),
                goal.description.as_str(),
                to_epoch_ms(goal.deadline),
                bool_to_int(goal.completed),
                to_epoch_ms(goal.created_at),
                to_epoch_ms(goal.updated_at),
            ],
        )?;

        Ok(goal.id)
    }

    fn get_goal(&self, id: GoalId) -> RepoResult<Option<Goal>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{GOAL_SELECT_SQL} WHERE id = ?1;"))?;

        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_goal_row(row)?));
        }

        Ok(None)
    }

    fn list_goals(&self, query: &GoalListQuery) -> RepoResult<Vec<Goal>> {
        let mut sql = format!("{GOAL_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(owner_id) = query.owner_id.as_ref() {
            sql.push_str(" AND owner_id = ?");
            bind_values.push(Value::Text(owner_id.clone()));
        }

        if let Some(completed) = query.completed {
            sql.push_str(" AND completed = ?");
            bind_values.push(Value::Integer(bool_to_int(completed)));
        }

        sql.push_str(" ORDER BY deadline ASC, id ASC");

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
        let mut goals = Vec::new();

        while let Some(row) = rows.next()? {
            goals.push(parse_goal_row(row)?);
        }

        Ok(goals)
    }

    fn update_goal(&self, goal: &Goal) -> RepoResult<()> {
        goal.validate()?;

        let changed = self.conn.execute(
            "UPDATE goals
             SET
                owner_id = ?1,
                title = ?2,
                description = ?3,
                deadline = ?4,
                completed = ?5,
                updated_at = ?6
             WHERE id = ?7;",
            params![
                goal.owner_id.as_str(),
                goal.title.as_str(),
                goal.description.as_str(),
                to_epoch_ms(goal.deadline),
                bool_to_int(goal.completed),
                to_epoch_ms(goal.updated_at),
                goal.id.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(goal.id));
        }

        Ok(())
    }

    fn set_goal_completed(&self, id: GoalId, completed: bool) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE goals
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

    fn delete_goal(&self, id: GoalId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM goals WHERE id = ?1;", [id.to_string()])?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }
}

fn parse_goal_row(row: &Row<'_>) -> RepoResult<Goal> {
    let id_text: String = row.get("id")?;
    let id = parse_uuid_column(&id_text, "goals.id")?;

    let goal = Goal {
        id,
        owner_id: row.get("owner_id")?,
        title: row.get("title")?,
        description: row.get("description")?,
        deadline: parse_epoch_ms(row.get("deadline")?, "goals.deadline")?,
        completed: parse_bool_column(row.get("completed")?, "goals.completed")?,
        created_at: parse_epoch_ms(row.get("created_at")?, "goals.created_at")?,
        updated_at: parse_epoch_ms(row.get("updated_at")?, "goals.updated_at")?,
    };
    goal.validate()?;
    Ok(goal)
}
