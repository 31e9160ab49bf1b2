//! Error types for recorm

use thiserror::Error;

/// Result type alias for recorm operations
pub type OrmResult<T> = Result<T, OrmError>;

/// Error types for model, builder and persistence operations.
///
/// Builder and metadata problems are returned to the caller. Statement
/// failures reported by the [`Database`](crate::Database) are absorbed by the
/// model layer (`find`, `count`, `save`, `delete`) into their sentinel return
/// values and only surface here when a caller talks to the collaborator
/// directly.
#[derive(Debug, Error)]
pub enum OrmError {
    /// Required entity metadata is missing or malformed
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Builder method called with bad arguments
    #[error("Argument error: {0}")]
    Argument(String),

    /// Access to a field that is not in the entity's field registry
    #[error("Unknown field '{field}' on entity {entity}")]
    UnknownField { entity: String, field: String },

    /// Row value could not be converted into the field type
    #[error("Decode error on column '{column}': {message}")]
    Decode { column: String, message: String },

    /// Statement execution failed in the database collaborator
    #[error("Execution error: {0}")]
    Execution(String),

    /// Insert or update could not be completed
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Other errors
    #[error("{0}")]
    Other(String),
}

impl OrmError {
    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Create an argument error
    pub fn argument(message: impl Into<String>) -> Self {
        Self::Argument(message.into())
    }

    /// Create an unknown field error
    pub fn unknown_field(entity: impl Into<String>, field: impl Into<String>) -> Self {
        Self::UnknownField {
            entity: entity.into(),
            field: field.into(),
        }
    }

    /// Create a decode error for a specific column
    pub fn decode(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Create an execution error
    pub fn execution(message: impl Into<String>) -> Self {
        Self::Execution(message.into())
    }

    /// Create a persistence error
    pub fn persistence(message: impl Into<String>) -> Self {
        Self::Persistence(message.into())
    }

    /// Attach a column name to a decode error produced without one.
    pub fn in_column(self, column: &str) -> Self {
        match self {
            Self::Decode { column: c, message } if c.is_empty() => Self::Decode {
                column: column.to_string(),
                message,
            },
            other => other,
        }
    }

    /// Check if this is an argument error
    pub fn is_argument(&self) -> bool {
        matches!(self, Self::Argument(_))
    }

    /// Check if this is a configuration error
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }

    /// Check if this is an unknown field error
    pub fn is_unknown_field(&self) -> bool {
        matches!(self, Self::UnknownField { .. })
    }
}

impl From<toml::de::Error> for OrmError {
    fn from(err: toml::de::Error) -> Self {
        Self::Configuration(err.to_string())
    }
}

impl From<serde_json::Error> for OrmError {
    fn from(err: serde_json::Error) -> Self {
        Self::Other(err.to_string())
    }
}
