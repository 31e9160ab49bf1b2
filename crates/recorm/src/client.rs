//! The database collaborator and the shared handle models run against.

use crate::config::ModelConfig;
use crate::error::OrmResult;
use crate::monitor::SqlLogger;
use crate::row::ResultSet;
use crate::value::Value;
use std::fmt;
use std::sync::Arc;

/// A database connection as the engine sees it.
///
/// recorm never binds parameters: every statement reaches [`execute`] as a
/// complete SQL string whose literals were produced by [`escape`]. The
/// dialect assumed by the builders is MySQL-flavoured (`LIMIT offset, count`,
/// `ON DUPLICATE KEY UPDATE`, `insert_id`).
///
/// Calls are blocking; a single implementation may be shared by many models
/// and transactions apply to the underlying connection, not to a model.
///
/// [`execute`]: Database::execute
/// [`escape`]: Database::escape
pub trait Database: Send + Sync {
    /// Execute a statement, returning its rows or the failure.
    fn execute(&self, sql: &str) -> OrmResult<ResultSet>;

    /// Render a scalar as a dialect-safe SQL literal.
    ///
    /// The default implementation is [`escape_literal`].
    fn escape(&self, value: &Value) -> String {
        escape_literal(value)
    }

    /// Id generated by the most recent INSERT.
    fn insert_id(&self) -> i64;

    /// Message describing the most recent failure, or an empty string.
    fn last_error_message(&self) -> String;

    /// Begin a transaction.
    fn trans_begin(&self) -> bool;

    /// Commit the current transaction.
    fn trans_commit(&self) -> bool;

    /// Roll back the current transaction.
    fn trans_rollback(&self) -> bool;
}

/// MySQL-style literal rendering.
///
/// Text is single-quoted with backslash escapes for `\`, `'`, `"`, NUL,
/// newline, carriage return and `\x1a`; numbers are emitted bare; booleans
/// become `1`/`0`.
pub fn escape_literal(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::Bool(b) => if *b { "1" } else { "0" }.to_string(),
        Value::Int(i) => i.to_string(),
        Value::Float(f) if f.is_finite() => f.to_string(),
        Value::Float(_) => "NULL".to_string(),
        Value::Text(s) => {
            let mut out = String::with_capacity(s.len() + 2);
            out.push('\'');
            for ch in s.chars() {
                match ch {
                    '\\' => out.push_str("\\\\"),
                    '\'' => out.push_str("\\'"),
                    '"' => out.push_str("\\\""),
                    '\0' => out.push_str("\\0"),
                    '\n' => out.push_str("\\n"),
                    '\r' => out.push_str("\\r"),
                    '\x1a' => out.push_str("\\Z"),
                    c => out.push(c),
                }
            }
            out.push('\'');
            out
        }
    }
}

/// Cloneable handle bundling a [`Database`] with the model configuration.
///
/// Every model is created from a `Db`; clones share the same connection.
#[derive(Clone)]
pub struct Db {
    database: Arc<dyn Database>,
    config: Arc<ModelConfig>,
    logger: SqlLogger,
}

impl Db {
    /// Wrap a database with the default configuration.
    pub fn new(database: impl Database + 'static) -> Self {
        Self::from_arc(Arc::new(database))
    }

    /// Wrap an already shared database.
    pub fn from_arc(database: Arc<dyn Database>) -> Self {
        Self::with_config(database, ModelConfig::default())
    }

    /// Wrap a shared database with an explicit configuration.
    pub fn with_config(database: Arc<dyn Database>, config: ModelConfig) -> Self {
        let logger = SqlLogger::from_config(&config);
        Self {
            database,
            config: Arc::new(config),
            logger,
        }
    }

    /// The underlying collaborator.
    pub fn database(&self) -> &dyn Database {
        self.database.as_ref()
    }

    /// Active configuration.
    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    /// Log and execute a statement.
    pub(crate) fn run(&self, table: &str, op: &str, sql: &str) -> OrmResult<ResultSet> {
        self.logger.log(table, op, sql);
        self.database.execute(sql)
    }

    pub(crate) fn escape(&self, value: &Value) -> String {
        self.database.escape(value)
    }

    pub(crate) fn error_message(&self) -> String {
        self.database.last_error_message()
    }
}

impl fmt::Debug for Db {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Db")
            .field("database", &"<dyn Database>")
            .field("config", &self.config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_text_like_mysql() {
        assert_eq!(escape_literal(&Value::from("Alice")), "'Alice'");
        assert_eq!(escape_literal(&Value::from("O'Hara")), r"'O\'Hara'");
        assert_eq!(escape_literal(&Value::from("a\\b\n")), r"'a\\b\n'");
        assert_eq!(escape_literal(&Value::from("' OR 1=1 --")), r"'\' OR 1=1 --'");
    }

    #[test]
    fn numbers_and_null_are_bare() {
        assert_eq!(escape_literal(&Value::Int(18)), "18");
        assert_eq!(escape_literal(&Value::Float(1.5)), "1.5");
        assert_eq!(escape_literal(&Value::Bool(true)), "1");
        assert_eq!(escape_literal(&Value::Null), "NULL");
    }
}
