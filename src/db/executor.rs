use duckdb::types::ValueRef;
use serde::Serialize;
use serde_json::Value;

use super::store::{Db, StoreError};

/// Result of a single read query: column names in result order and all rows
/// fetched eagerly as JSON values.
#[derive(Debug, Serialize)]
pub struct QueryResult {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

/// Runs one complete SQL statement against a fresh connection.
///
/// The statement is executed verbatim with no parameters, no timeout and no
/// row cap; the connection is dropped before this returns. Execution errors
/// surface as `StoreError` and the caller decides what the user sees.
#[derive(Debug, Clone)]
pub struct QueryExecutor {
    db: Db,
}

impl QueryExecutor {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    pub fn run(&self, sql: &str) -> Result<QueryResult, StoreError> {
        let conn = self.db.connect()?;
        let mut stmt = conn.prepare(sql)?;

        let mut columns: Vec<String> = Vec::new();
        let mut data: Vec<Vec<Value>> = Vec::new();

        {
            let mut rows = stmt.query([])?;
            while let Some(row) = rows.next()? {
                let stmt_ref: &duckdb::Statement = row.as_ref();
                if columns.is_empty() {
                    columns = column_names(stmt_ref);
                }
                let mut record = Vec::with_capacity(stmt_ref.column_count());
                for i in 0..stmt_ref.column_count() {
                    record.push(value_to_json(row.get_ref(i)?));
                }
                data.push(record);
            }
        }

        // Zero-row result sets still carry column metadata.
        if columns.is_empty() {
            columns = column_names(&stmt);
        }

        Ok(QueryResult {
            columns,
            rows: data,
        })
    }
}

fn column_names(stmt: &duckdb::Statement) -> Vec<String> {
    (0..stmt.column_count())
        .filter_map(|i| stmt.column_name(i).ok().map(|name| name.to_string()))
        .collect()
}

fn value_to_json(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Boolean(b) => Value::Bool(b),
        ValueRef::TinyInt(i) => i.into(),
        ValueRef::SmallInt(i) => i.into(),
        ValueRef::Int(i) => i.into(),
        ValueRef::BigInt(i) => i.into(),
        ValueRef::HugeInt(i) => match i64::try_from(i) {
            Ok(v) => v.into(),
            Err(_) => Value::String(i.to_string()),
        },
        ValueRef::UTinyInt(i) => i.into(),
        ValueRef::USmallInt(i) => i.into(),
        ValueRef::UInt(i) => i.into(),
        ValueRef::UBigInt(i) => i.into(),
        ValueRef::Float(f) => float_to_json(f as f64),
        ValueRef::Double(f) => float_to_json(f),
        ValueRef::Text(t) => Value::String(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => Value::String(String::from_utf8_lossy(b).into_owned()),
        ValueRef::Date32(days) => {
            // Days since the Unix epoch; 719_163 is the epoch's day number
            // from the common era.
            match chrono::NaiveDate::from_num_days_from_ce_opt(days + 719_163) {
                Some(d) => Value::String(d.format("%Y-%m-%d").to_string()),
                None => Value::Null,
            }
        }
        ValueRef::Timestamp(unit, t) => {
            let micros = match unit {
                duckdb::types::TimeUnit::Second => t.saturating_mul(1_000_000),
                duckdb::types::TimeUnit::Millisecond => t.saturating_mul(1_000),
                duckdb::types::TimeUnit::Microsecond => t,
                duckdb::types::TimeUnit::Nanosecond => t / 1_000,
            };
            match chrono::DateTime::from_timestamp_micros(micros) {
                Some(ts) => Value::String(ts.naive_utc().to_string()),
                None => Value::Null,
            }
        }
        other => Value::String(format!("{:?}", other)),
    }
}

fn float_to_json(f: f64) -> Value {
    serde_json::Number::from_f64(f)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}
