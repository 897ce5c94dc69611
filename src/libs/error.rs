//! Error type shared by the schema model, the compiler and the executors.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// A schema document is missing required structure or contradicts itself.
    #[error("malformed schema {origin}: {message}")]
    MalformedSchema { origin: String, message: String },

    #[error("table '{table}' has no column named '{column}'")]
    UnknownColumn { table: String, column: String },

    #[error("column '{table}.{column}' has type '{type_name}' which has no literal rendering")]
    UnsupportedType {
        table: String,
        column: String,
        type_name: String,
    },

    /// Arrays and objects have no literal form in a VALUES list.
    #[error("column '{table}.{column}' holds a value with no literal rendering")]
    UnsupportedValue { table: String, column: String },

    #[error("statement failed: {message}\n  {statement}")]
    ExecutionFailure { statement: String, message: String },

    #[error("duckdb error: {0}")]
    Engine(#[from] duckdb::Error),

    #[error("blocking task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("directory walk error: {0}")]
    Walk(#[from] walkdir::Error),
}

impl Error {
    pub(crate) fn malformed(origin: impl Into<String>, message: impl Into<String>) -> Self {
        Error::MalformedSchema {
            origin: origin.into(),
            message: message.into(),
        }
    }

    pub(crate) fn unknown_column(table: &str, column: &str) -> Self {
        Error::UnknownColumn {
            table: table.to_string(),
            column: column.to_string(),
        }
    }

    /// Compile-time errors concern one table; everything else concerns the run.
    pub fn is_table_local(&self) -> bool {
        matches!(
            self,
            Error::MalformedSchema { .. }
                | Error::UnknownColumn { .. }
                | Error::UnsupportedType { .. }
                | Error::UnsupportedValue { .. }
        )
    }
}
