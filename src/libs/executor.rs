use std::path::{Path, PathBuf};

use async_trait::async_trait;
use duckdb::Connection;
use log::{debug, info};

use crate::libs::error::{Error, Result};
use crate::libs::statement::Statement;

/// Runs statements one at a time. `&mut self` keeps a single statement in
/// flight.
#[async_trait]
pub trait SqlExecutor: Send {
    async fn execute(&mut self, statement: &Statement) -> Result<()>;
}

/// Executes statements on an embedded DuckDB database. The connection is
/// opened by the first statement and kept for the rest of the run.
pub struct DuckDbExecutor {
    database: Option<PathBuf>,
    connection: Option<Connection>,
}

impl DuckDbExecutor {
    pub fn in_memory() -> Self {
        Self {
            database: None,
            connection: None,
        }
    }

    pub fn open(path: impl AsRef<Path>) -> Self {
        Self {
            database: Some(path.as_ref().to_path_buf()),
            connection: None,
        }
    }

    fn take_connection(&mut self) -> Result<Connection> {
        if let Some(connection) = self.connection.take() {
            return Ok(connection);
        }
        let connection = match &self.database {
            Some(path) => {
                info!("opening duckdb database {}", path.display());
                Connection::open(path)?
            }
            None => {
                info!("opening in-memory duckdb database");
                Connection::open_in_memory()?
            }
        };
        Ok(connection)
    }

    /// The live connection, opening it if no statement ran yet.
    pub fn connection(&mut self) -> Result<&Connection> {
        let connection = self.take_connection()?;
        Ok(&*self.connection.insert(connection))
    }
}

#[async_trait]
impl SqlExecutor for DuckDbExecutor {
    async fn execute(&mut self, statement: &Statement) -> Result<()> {
        let sql = statement.to_string();
        let connection = self.take_connection()?;

        let (connection, outcome) = tokio::task::spawn_blocking(move || {
            let outcome = connection.execute_batch(&sql);
            (connection, outcome)
        })
        .await?;
        self.connection = Some(connection);

        outcome.map_err(|e| Error::ExecutionFailure {
            statement: statement.to_string(),
            message: e.to_string(),
        })
    }
}

/// Records statement text instead of running it. Statements containing one of
/// the configured fragments fail.
#[derive(Debug, Clone, Default)]
pub struct RecordingExecutor {
    pub executed: Vec<String>,
    failing: Vec<String>,
}

impl RecordingExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(mut self, fragment: &str) -> Self {
        self.failing.push(fragment.to_string());
        self
    }
}

#[async_trait]
impl SqlExecutor for RecordingExecutor {
    async fn execute(&mut self, statement: &Statement) -> Result<()> {
        let sql = statement.to_string();
        debug!("recording {sql}");
        self.executed.push(sql.clone());
        if self.failing.iter().any(|fragment| sql.contains(fragment)) {
            return Err(Error::ExecutionFailure {
                statement: sql,
                message: "rejected by recording executor".to_string(),
            });
        }
        Ok(())
    }
}
