use duckdb::Connection;
use std::error::Error;
use std::fmt;
use std::path::PathBuf;

#[derive(Debug)]
pub enum StoreError {
    Connection(String),
    Query(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Connection(msg) => write!(f, "database connection error: {}", msg),
            StoreError::Query(msg) => write!(f, "database query error: {}", msg),
        }
    }
}

impl Error for StoreError {}

impl From<duckdb::Error> for StoreError {
    fn from(e: duckdb::Error) -> Self {
        StoreError::Query(e.to_string())
    }
}

/// Handle to the DuckDB database file. Every operation opens its own
/// short-lived connection against the path and drops it before returning;
/// no connection or lock is held across calls.
#[derive(Debug, Clone)]
pub struct Db {
    path: PathBuf,
}

impl Db {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    pub(crate) fn connect(&self) -> Result<Connection, StoreError> {
        Connection::open(&self.path).map_err(|e| StoreError::Connection(e.to_string()))
    }

    /// Creates the tables this system owns. The four domain tables are
    /// read-only to the pipeline and only created by the fixture seeder.
    pub fn ensure_schema(&self) -> Result<(), StoreError> {
        let conn = self.connect()?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS api_usage (
                day TEXT PRIMARY KEY,
                request_count BIGINT NOT NULL
            )",
            [],
        )?;
        Ok(())
    }
}
