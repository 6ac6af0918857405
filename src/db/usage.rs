use chrono::NaiveDate;
use duckdb::params;

use super::store::{Db, StoreError};

/// Per-day request-quota tracker backed by the `api_usage` table.
///
/// One row per calendar day, created lazily by `get_count` and bumped by
/// `increment`. The check-then-increment sequence is not atomic across two
/// calls; concurrent requests within the same day can race past the quota.
/// The deployment assumes a single interactive user, so no transaction or
/// lock guards the pair.
#[derive(Debug, Clone)]
pub struct UsageCounter {
    db: Db,
}

impl UsageCounter {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    /// Returns the request count recorded for `day`. If no row exists yet,
    /// a zero row is inserted and 0 is returned.
    pub fn get_count(&self, day: NaiveDate) -> Result<i64, StoreError> {
        let conn = self.db.connect()?;
        let key = day.format("%Y-%m-%d").to_string();

        match conn.query_row(
            "SELECT request_count FROM api_usage WHERE day = ?",
            params![key],
            |row| row.get::<_, i64>(0),
        ) {
            Ok(count) => Ok(count),
            Err(duckdb::Error::QueryReturnedNoRows) => {
                conn.execute(
                    "INSERT INTO api_usage (day, request_count) VALUES (?, ?)",
                    params![key, 0_i64],
                )?;
                Ok(0)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Adds 1 to the existing row for `day`. The pipeline always calls
    /// `get_count` first, which guarantees the row exists.
    pub fn increment(&self, day: NaiveDate) -> Result<(), StoreError> {
        let conn = self.db.connect()?;
        let key = day.format("%Y-%m-%d").to_string();
        conn.execute(
            "UPDATE api_usage SET request_count = request_count + 1 WHERE day = ?",
            params![key],
        )?;
        Ok(())
    }
}
