//! User profile repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Upsert the local snapshot of a provider identity on sign-in.
//! - Look profiles up by provider `uid`.
//!
//! # Invariants
//! - `created_at` is written once; later upserts keep the original value.

use crate::model::user::UserProfile;
use crate::repo::{ensure_table_ready, parse_epoch_ms, to_epoch_ms, RepoResult};
use rusqlite::{params, Connection, Row};

const USER_SELECT_SQL: &str = "SELECT
    uid,
    display_name,
    email,
    photo_url,
    created_at,
    updated_at
FROM users";

const USER_REQUIRED_COLUMNS: &[&str] = &["uid", "display_name", "email", "photo_url"];

/// Repository interface for user profile persistence.
pub trait UserRepository {
    /// Inserts the profile or refreshes an existing row in place.
    fn upsert_user(&self, profile: &UserProfile) -> RepoResult<()>;
    fn get_user(&self, uid: &str) -> RepoResult<Option<UserProfile>>;
}

/// SQLite-backed user profile repository.
pub struct SqliteUserRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUserRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_table_ready(conn, "users", USER_REQUIRED_COLUMNS)?;
        Ok(Self { conn })
    }
}

impl UserRepository for SqliteUserRepository<'_> {
    fn upsert_user(&self, profile: &UserProfile) -> RepoResult<()> {
        profile.validate()?;

        self.conn.execute(
            "INSERT INTO users (
                uid,
                display_name,
                email,
                photo_url,
                created_at,
                updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT(uid) DO UPDATE SET
                display_name = excluded.display_name,
                email = excluded.email,
                photo_url = excluded.photo_url,
                updated_at = excluded.updated_at;",
            params![
                profile.uid.as_str(),
                profile.display_name.as_str(),
                profile.email.as_str(),
                profile.photo_url.as_deref(),
                to_epoch_ms(profile.created_at),
                to_epoch_ms(profile.updated_at),
            ],
        )?;

        Ok(())
    }

    fn get_user(&self, uid: &str) -> RepoResult<Option<UserProfile>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{USER_SELECT_SQL} WHERE uid = ?1;"))?;

        let mut rows = stmt.query([uid])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_user_row(row)?));
        }

        Ok(None)
    }
}

fn parse_user_row(row: &Row<'_>) -> RepoResult<UserProfile> {
    let profile = UserProfile {
        uid: row.get("uid")?,
        display_name: row.get("display_name")?,
        email: row.get("email")?,
        photo_url: row.get("photo_url")?,
        created_at: parse_epoch_ms(row.get("created_at")?, "users.created_at")?,
        updated_at: parse_epoch_ms(row.get("updated_at")?, "users.updated_at")?,
    };
    profile.validate()?;
    Ok(profile)
}
