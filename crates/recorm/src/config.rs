//! Model configuration.
//!
//! Defaults match the behaviour most callers want; everything can be set in
//! code with the `with_*` builders or loaded from TOML:
//!
//! ```toml
//! count_strategy = "materialize"
//! sql_log_level = "info"
//! max_sql_length = 500
//! placeholder = "?"
//! ```

use crate::error::OrmResult;
use serde::Deserialize;

/// How `count()` computes its result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CountStrategy {
    /// `SELECT COUNT(*)` over the query, wrapping it in a derived table only
    /// when GROUP BY, HAVING, LIMIT or explicit columns require it (default).
    #[default]
    CountQuery,
    /// Run the select and count the returned rows.
    Materialize,
}

/// Level SQL statements are logged at (target `recorm.sql`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SqlLogLevel {
    Off,
    Trace,
    #[default]
    Debug,
    Info,
    Warn,
    Error,
}

/// Configuration shared by every model created from one [`Db`](crate::Db).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Strategy for `count()` and the upsert existence probe.
    pub count_strategy: CountStrategy,
    /// Level for SQL log lines.
    pub sql_log_level: SqlLogLevel,
    /// Truncate logged SQL (in chars). `None` means no truncation.
    pub max_sql_length: Option<usize>,
    /// Positional marker in `where_`/`having` templates.
    pub placeholder: char,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            count_strategy: CountStrategy::default(),
            sql_log_level: SqlLogLevel::default(),
            max_sql_length: Some(200),
            placeholder: '?',
        }
    }
}

impl ModelConfig {
    /// Create a configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a TOML document. Missing keys keep their defaults.
    pub fn from_toml_str(source: &str) -> OrmResult<Self> {
        Ok(toml::from_str(source)?)
    }

    /// Set the count strategy.
    pub fn with_count_strategy(mut self, strategy: CountStrategy) -> Self {
        self.count_strategy = strategy;
        self
    }

    /// Set the SQL log level.
    pub fn with_sql_log_level(mut self, level: SqlLogLevel) -> Self {
        self.sql_log_level = level;
        self
    }

    /// Set maximum SQL length to log.
    pub fn with_max_sql_length(mut self, len: usize) -> Self {
        self.max_sql_length = Some(len);
        self
    }

    /// Disable SQL truncation in logs.
    pub fn no_truncate(mut self) -> Self {
        self.max_sql_length = None;
        self
    }

    /// Use a different template marker.
    pub fn with_placeholder(mut self, placeholder: char) -> Self {
        self.placeholder = placeholder;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ModelConfig::default();
        assert_eq!(config.count_strategy, CountStrategy::CountQuery);
        assert_eq!(config.placeholder, '?');
        assert_eq!(config.max_sql_length, Some(200));
    }

    #[test]
    fn loads_partial_toml() {
        let config = ModelConfig::from_toml_str(
            r#"
            count_strategy = "materialize"
            sql_log_level = "off"
            "#,
        )
        .unwrap();
        assert_eq!(config.count_strategy, CountStrategy::Materialize);
        assert_eq!(config.sql_log_level, SqlLogLevel::Off);
        assert_eq!(config.placeholder, '?');
    }

    #[test]
    fn bad_toml_is_configuration_error() {
        let err = ModelConfig::from_toml_str("count_strategy = \"sometimes\"").unwrap_err();
        assert!(err.is_configuration());
    }
}
