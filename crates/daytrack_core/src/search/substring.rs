//! Case-insensitive substring search over tasks and goals.
//!
//! # Responsibility
//! - Match the needle against title OR description via SQL `LIKE`.
//! - Return typed hits with stable IDs, tasks before goals.
//!
//! # Invariants
//! - `%`, `_` and `\` in the needle are escaped; user text never acts as
//!   a wildcard.
//! - Matching is ASCII case-insensitive (SQLite `LIKE` semantics), the
//!   same contract the list views apply in memory.
//! - Ordering inside each domain matches the list queries (`start_at`
//!   respectively `deadline`, then ID).

use crate::db::DbError;
use crate::repo::parse_uuid_column;
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Default number of hits when the caller does not pick a limit.
pub const SEARCH_DEFAULT_LIMIT: u32 = 20;

/// Upper bound on hits per call.
pub const SEARCH_LIMIT_MAX: u32 = 100;

const SNIPPET_MAX_CHARS: usize = 120;

/// Result type for search APIs.
pub type SearchResult<T> = Result<T, SearchError>;

/// Search-layer error for DB interaction and result decoding.
#[derive(Debug)]
pub enum SearchError {
    Db(DbError),
    InvalidData(String),
}

impl Display for SearchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid search row: {message}"),
        }
    }
}

impl Error for SearchError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for SearchError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for SearchError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Which record kind a hit came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchDomain {
    Tasks,
    Goals,
}

/// Search options.
#[derive(Debug, Clone)]
pub struct SearchQuery {
    /// User needle, matched as a substring.
    pub text: String,
    /// Restrict hits to one owner's records.
    pub owner_id: Option<String>,
    /// Optional domain filter; `None` searches tasks and goals.
    pub domain: Option<SearchDomain>,
    /// Maximum number of hits to return across both domains.
    pub limit: u32,
}

impl SearchQuery {
    /// Creates a query with default limit and no filters.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            owner_id: None,
            domain: None,
            limit: SEARCH_DEFAULT_LIMIT,
        }
    }
}

/// Single search hit returned by [`search_all`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub source_id: Uuid,
    pub domain: SearchDomain,
    pub title: String,
    /// Shortened description, empty when the record has none.
    pub snippet: String,
}

/// Searches tasks and goals by substring.
///
/// Returns an empty list for blank needles; the plain list queries cover
/// the unfiltered view.
pub fn search_all(conn: &Connection, query: &SearchQuery) -> SearchResult<Vec<SearchHit>> {
    let needle = query.text.trim();
    if needle.is_empty() || query.limit == 0 {
        return Ok(Vec::new());
    }

    let pattern = format!("%{}%", escape_like_pattern(needle));
    let mut hits = Vec::new();

    if query.domain != Some(SearchDomain::Goals) {
        search_domain_rows(
            conn,
            "SELECT id, title, description FROM tasks",
            "start_at",
            &pattern,
            query.owner_id.as_deref(),
            query.limit,
            SearchDomain::Tasks,
            &mut hits,
        )?;
    }

    if query.domain != Some(SearchDomain::Tasks) && hits.len() < query.limit as usize {
        let remaining = query.limit - hits.len() as u32;
        search_domain_rows(
            conn,
            "SELECT id, title, description FROM goals",
            "deadline",
            &pattern,
            query.owner_id.as_deref(),
            remaining,
            SearchDomain::Goals,
            &mut hits,
        )?;
    }

    Ok(hits)
}

/// Normalizes a caller-provided limit to the search contract.
pub fn normalize_search_limit(limit: Option<u32>) -> u32 {
    match limit {
        Some(0) => SEARCH_DEFAULT_LIMIT,
        Some(value) if value > SEARCH_LIMIT_MAX => SEARCH_LIMIT_MAX,
        Some(value) => value,
        None => SEARCH_DEFAULT_LIMIT,
    }
}

/// Escapes `LIKE` wildcards so the needle matches literally.
pub fn escape_like_pattern(raw: &str) -> String {
    raw.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

#[allow(clippy::too_many_arguments)]
fn search_domain_rows(
    conn: &Connection,
    select_sql: &str,
    order_column: &str,
    pattern: &str,
    owner_id: Option<&str>,
    limit: u32,
    domain: SearchDomain,
    hits: &mut Vec<SearchHit>,
) -> SearchResult<()> {
    let mut sql = format!(
        "{select_sql}
         WHERE (title LIKE ?1 ESCAPE '\\' OR description LIKE ?1 ESCAPE '\\')"
    );
    let mut bind_values: Vec<Value> = vec![Value::Text(pattern.to_string())];

    if let Some(owner_id) = owner_id {
        sql.push_str(" AND owner_id = ?");
        bind_values.push(Value::Text(owner_id.to_string()));
    }

    sql.push_str(&format!(" ORDER BY {order_column} ASC, id ASC LIMIT ?"));
    bind_values.push(Value::Integer(i64::from(limit)));

    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query(params_from_iter(bind_values))?;
    while let Some(row) = rows.next()? {
        hits.push(parse_search_hit(row, domain)?);
    }

    Ok(())
}

fn parse_search_hit(row: &Row<'_>, domain: SearchDomain) -> SearchResult<SearchHit> {
    let id_text: String = row.get("id")?;
    let source_id = parse_uuid_column(&id_text, "search.id")
        .map_err(|err| SearchError::InvalidData(err.to_string()))?;

    let description: String = row.get("description")?;

    Ok(SearchHit {
        source_id,
        domain,
        title: row.get("title")?,
        snippet: derive_snippet(&description),
    })
}

fn derive_snippet(description: &str) -> String {
    description.trim().chars().take(SNIPPET_MAX_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::{derive_snippet, escape_like_pattern, normalize_search_limit};

    #[test]
    fn escapes_every_wildcard() {
        assert_eq!(escape_like_pattern("50%_done"), "50\\%\\_done");
        assert_eq!(escape_like_pattern("a\\b"), "a\\\\b");
        assert_eq!(escape_like_pattern("plain"), "plain");
    }

    #[test]
    fn limit_normalization_applies_default_and_cap() {
        assert_eq!(normalize_search_limit(None), 20);
        assert_eq!(normalize_search_limit(Some(0)), 20);
        assert_eq!(normalize_search_limit(Some(7)), 7);
        assert_eq!(normalize_search_limit(Some(500)), 100);
    }

    #[test]
    fn snippet_trims_and_caps() {
        assert_eq!(derive_snippet("  hello  "), "hello");
        let long = "x".repeat(300);
        assert_eq!(derive_snippet(&long).chars().count(), 120);
    }
}
