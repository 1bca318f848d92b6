//! SQL text for the lock table.
//!
//! Table names cannot be bound as parameters, so they are validated and
//! spliced into the statements once, when a store is created.

use table_lock_core::error::{LockError, LockResult};

/// Default lock table name.
pub const DEFAULT_TABLE: &str = "lock_table";

/// Maximum table name length; leaves room for the `_name_uniq` index suffix
/// within MySQL's 64 character identifier limit.
const MAX_TABLE_NAME_LENGTH: usize = 48;

/// SQL dialect differences that matter to the lock table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    Sqlite,
    MySql,
    Postgres,
}

impl Dialect {
    fn placeholder(self, index: usize) -> String {
        match self {
            Dialect::Sqlite | Dialect::MySql => "?".to_string(),
            Dialect::Postgres => format!("${index}"),
        }
    }
}

/// Validates a table identifier: `[A-Za-z_][A-Za-z0-9_]*`, at most 48 characters.
pub fn validate_table_name(table: &str) -> LockResult<()> {
    let mut chars = table.chars();
    let valid_start = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    let valid_rest = chars.all(|c| c.is_ascii_alphanumeric() || c == '_');

    if !valid_start || !valid_rest || table.len() > MAX_TABLE_NAME_LENGTH {
        return Err(LockError::InvalidName(format!(
            "'{table}' is not a valid lock table name"
        )));
    }
    Ok(())
}

/// Prepared SQL text for one table in one dialect.
#[derive(Debug, Clone)]
pub struct Statements {
    pub insert: String,
    pub select_holder: String,
    pub delete: String,
    /// Schema statements, executed in order by `ensure_schema`.
    pub create: Vec<String>,
}

impl Statements {
    /// Builds the statements for `table`, rejecting unsafe identifiers.
    pub fn new(dialect: Dialect, table: &str) -> LockResult<Self> {
        validate_table_name(table)?;
        Ok(Self::build(dialect, table))
    }

    /// Statements for the default table.
    pub fn for_default_table(dialect: Dialect) -> Self {
        Self::build(dialect, DEFAULT_TABLE)
    }

    fn build(dialect: Dialect, table: &str) -> Self {
        let p = |index: usize| dialect.placeholder(index);

        Self {
            insert: format!(
                "INSERT INTO {table} (name, value, ttl) VALUES ({}, {}, {})",
                p(1),
                p(2),
                p(3)
            ),
            select_holder: format!("SELECT value FROM {table} WHERE name = {}", p(1)),
            delete: format!(
                "DELETE FROM {table} WHERE name = {} AND value = {}",
                p(1),
                p(2)
            ),
            create: create_statements(dialect, table),
        }
    }
}

fn create_statements(dialect: Dialect, table: &str) -> Vec<String> {
    match dialect {
        Dialect::Sqlite => vec![
            format!(
                "CREATE TABLE IF NOT EXISTS {table} (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    name VARCHAR(255) NOT NULL,
                    value VARCHAR(64) NOT NULL,
                    ttl INTEGER NOT NULL DEFAULT 0
                )"
            ),
            format!("CREATE UNIQUE INDEX IF NOT EXISTS {table}_name_uniq ON {table} (name)"),
        ],
        Dialect::MySql => vec![format!(
            "CREATE TABLE IF NOT EXISTS {table} (
                id BIGINT UNSIGNED NOT NULL AUTO_INCREMENT PRIMARY KEY,
                name VARCHAR(255) CHARACTER SET utf8mb4 COLLATE utf8mb4_bin NOT NULL,
                value VARCHAR(64) NOT NULL,
                ttl BIGINT UNSIGNED NOT NULL DEFAULT 0,
                UNIQUE KEY {table}_name_uniq (name)
            )"
        )],
        Dialect::Postgres => vec![format!(
            "CREATE TABLE IF NOT EXISTS {table} (
                id BIGSERIAL PRIMARY KEY,
                name VARCHAR(255) NOT NULL,
                value VARCHAR(64) NOT NULL,
                ttl BIGINT NOT NULL DEFAULT 0,
                CONSTRAINT {table}_name_uniq UNIQUE (name)
            )"
        )],
    }
}
