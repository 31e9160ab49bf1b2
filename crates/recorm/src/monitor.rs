//! SQL statement logging.
//!
//! Every statement a model assembles is emitted on the `recorm.sql` target
//! before it reaches the [`Database`](crate::Database), tagged with the table
//! and the model operation that produced it.

use crate::config::{ModelConfig, SqlLogLevel};

/// A `tracing`-based logger for executed SQL.
#[derive(Debug, Clone)]
pub struct SqlLogger {
    /// Level to emit at.
    pub level: SqlLogLevel,
    /// Truncate long SQL strings (in chars). `None` means no truncation.
    pub max_sql_length: Option<usize>,
}

impl Default for SqlLogger {
    fn default() -> Self {
        Self::from_config(&ModelConfig::default())
    }
}

impl SqlLogger {
    pub fn from_config(config: &ModelConfig) -> Self {
        Self {
            level: config.sql_log_level,
            max_sql_length: config.max_sql_length,
        }
    }

    pub(crate) fn truncate_sql(&self, sql: &str) -> String {
        match self.max_sql_length {
            Some(max) if sql.chars().count() > max => {
                let cut: String = sql.chars().take(max).collect();
                format!("{cut}...")
            }
            _ => sql.to_string(),
        }
    }

    /// Emit one statement.
    pub fn log(&self, table: &str, op: &str, sql: &str) {
        if self.level == SqlLogLevel::Off {
            return;
        }
        let sql = self.truncate_sql(sql);

        /// Dispatch a tracing event at a runtime-determined level.
        macro_rules! emit_at_level {
            ($level:expr, $($field:tt)*) => {
                match $level {
                    SqlLogLevel::Off => {}
                    SqlLogLevel::Error => tracing::error!($($field)*),
                    SqlLogLevel::Warn  => tracing::warn!($($field)*),
                    SqlLogLevel::Info  => tracing::info!($($field)*),
                    SqlLogLevel::Debug => tracing::debug!($($field)*),
                    SqlLogLevel::Trace => tracing::trace!($($field)*),
                }
            };
        }

        emit_at_level!(
            self.level,
            target: "recorm.sql",
            table,
            op,
            sql = %sql,
            "[Model.{table}] ({op}) - Query: {sql}"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncation() {
        let logger = SqlLogger::from_config(&ModelConfig::new().with_max_sql_length(10));
        assert_eq!(logger.truncate_sql("SELECT * FROM users"), "SELECT * F...");
        assert_eq!(logger.truncate_sql("SELECT 1"), "SELECT 1");

        let logger = SqlLogger::from_config(&ModelConfig::new().no_truncate());
        assert_eq!(logger.truncate_sql("SELECT * FROM users"), "SELECT * FROM users");
    }
}
