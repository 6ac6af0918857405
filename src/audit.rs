use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt;
use std::fs;
use std::path::PathBuf;

/// Sentinel recorded in place of text that never became a runnable SELECT.
pub const NO_SQL_SENTINEL: &str = "no sql generated";

#[derive(Debug)]
pub enum AuditError {
    Io(std::io::Error),
    Format(serde_json::Error),
}

impl fmt::Display for AuditError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuditError::Io(e) => write!(f, "audit log I/O error: {}", e),
            AuditError::Format(e) => write!(f, "audit log format error: {}", e),
        }
    }
}

impl Error for AuditError {}

impl From<std::io::Error> for AuditError {
    fn from(e: std::io::Error) -> Self {
        AuditError::Io(e)
    }
}

impl From<serde_json::Error> for AuditError {
    fn from(e: serde_json::Error) -> Self {
        AuditError::Format(e)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QueryLogEntry {
    pub user_input: String,
    pub generated_sql: String,
}

/// Append-only (at the record level) query log persisted as one JSON array.
///
/// Each append reads the whole array, pushes one entry and rewrites the file
/// in place. There is no locking: two concurrent writers can lose entries or
/// corrupt the file. The deployment assumes a single interactive user, so
/// that read-modify-write is kept as-is rather than guarded.
#[derive(Debug, Clone)]
pub struct AuditLog {
    path: PathBuf,
}

impl AuditLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Records one `{user_input, generated_sql}` pair. Anything that does
    /// not start with `select` (case-insensitive, trimmed) is redacted to
    /// the sentinel even when the original text is non-empty; unsafe model
    /// output is deliberately not persisted.
    pub fn append(&self, user_input: &str, generated_sql: &str) -> Result<(), AuditError> {
        let recorded_sql = if is_select(generated_sql) {
            generated_sql.to_string()
        } else {
            NO_SQL_SENTINEL.to_string()
        };

        let mut entries = if self.path.exists() {
            self.entries()?
        } else {
            Vec::new()
        };

        entries.push(QueryLogEntry {
            user_input: user_input.to_string(),
            generated_sql: recorded_sql,
        });

        fs::write(&self.path, serde_json::to_string_pretty(&entries)?)?;
        Ok(())
    }

    pub fn entries(&self) -> Result<Vec<QueryLogEntry>, AuditError> {
        let raw = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&raw)?)
    }
}

fn is_select(sql: &str) -> bool {
    sql.trim().to_lowercase().starts_with("select")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_log() -> (tempfile::TempDir, AuditLog) {
        let dir = tempfile::tempdir().unwrap();
        let log = AuditLog::new(dir.path().join("query_log.json"));
        (dir, log)
    }

    #[test]
    fn first_append_creates_single_element_array() {
        let (_dir, log) = test_log();
        log.append("list employees", "SELECT name FROM employees")
            .unwrap();

        let entries = log.entries().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].user_input, "list employees");
        assert_eq!(entries[0].generated_sql, "SELECT name FROM employees");
    }

    #[test]
    fn sequential_appends_preserve_call_order() {
        let (_dir, log) = test_log();
        for i in 0..5 {
            log.append(&format!("question {}", i), &format!("SELECT {}", i))
                .unwrap();
        }

        let entries = log.entries().unwrap();
        assert_eq!(entries.len(), 5);
        for (i, entry) in entries.iter().enumerate() {
            assert_eq!(entry.user_input, format!("question {}", i));
            assert_eq!(entry.generated_sql, format!("SELECT {}", i));
        }
    }

    #[test]
    fn non_select_text_is_redacted() {
        let (_dir, log) = test_log();
        log.append("wipe it", "DROP TABLE employees").unwrap();
        log.append("case check", "  sElEcT 1  ").unwrap();

        let entries = log.entries().unwrap();
        assert_eq!(entries[0].generated_sql, NO_SQL_SENTINEL);
        assert_eq!(entries[1].generated_sql, "  sElEcT 1  ");
    }

    #[test]
    fn duplicates_are_allowed() {
        let (_dir, log) = test_log();
        log.append("same", "SELECT 1").unwrap();
        log.append("same", "SELECT 1").unwrap();
        assert_eq!(log.entries().unwrap().len(), 2);
    }
}
