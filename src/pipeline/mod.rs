pub mod sanitize;
pub mod verdict;

use chrono::Local;
use serde::Serialize;
use std::error::Error;
use std::fmt;
use tokio::task;
use tracing::{debug, error, info};

use crate::audit::{self, AuditError};
use crate::db::store::StoreError;
use crate::llm::{prompts, LlmError};
use crate::web::state::AppState;

/// Daily request quota. Checked before any gateway call; blocked requests
/// are not counted.
pub const MAX_REQUESTS_PER_DAY: i64 = 10;

/// Every user-visible end state of one request. These are outcomes, not
/// errors: a rejected query or an exhausted quota is a normal answer to the
/// caller. Gateway and storage failures stay in `PipelineError`.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AskOutcome {
    Answered {
        sql: String,
        columns: Vec<String>,
        rows: Vec<Vec<serde_json::Value>>,
        explanation: String,
    },
    QuotaExceeded {
        reset_at: String,
    },
    VerdictUnparsable {
        message: String,
    },
    Rejected {
        message: String,
    },
    ExecutionFailed {
        message: String,
    },
}

#[derive(Debug)]
pub enum PipelineError {
    Llm(LlmError),
    Store(StoreError),
    Audit(AuditError),
    Task(String),
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::Llm(e) => write!(f, "{}", e),
            PipelineError::Store(e) => write!(f, "{}", e),
            PipelineError::Audit(e) => write!(f, "{}", e),
            PipelineError::Task(msg) => write!(f, "task execution error: {}", msg),
        }
    }
}

impl Error for PipelineError {}

impl From<LlmError> for PipelineError {
    fn from(e: LlmError) -> Self {
        PipelineError::Llm(e)
    }
}

impl From<StoreError> for PipelineError {
    fn from(e: StoreError) -> Self {
        PipelineError::Store(e)
    }
}

impl From<AuditError> for PipelineError {
    fn from(e: AuditError) -> Self {
        PipelineError::Audit(e)
    }
}

/// Executable iff the verdict says yes AND the sanitized text reads as a
/// SELECT. Both are required; the verdict alone is not trusted because the
/// validation model can be talked into anything, and the prefix alone says
/// nothing about what follows the first keyword.
fn approved(verdict: &verdict::Verdict, sql: &str) -> bool {
    verdict::safe_to_run(verdict) && sql.trim().to_lowercase().starts_with("select")
}

/// Runs one question through the full pipeline:
/// quota gate, generation, sanitation, validation, audit, execution,
/// explanation. Gateway errors propagate; execution errors are downgraded
/// to a generic outcome with the cause kept in the process log only.
pub async fn handle_question(
    state: &AppState,
    question: &str,
) -> Result<AskOutcome, PipelineError> {
    let today = Local::now().date_naive();

    let usage = state.usage.clone();
    let count = task::spawn_blocking(move || usage.get_count(today))
        .await
        .map_err(|e| PipelineError::Task(e.to_string()))??;

    if count >= MAX_REQUESTS_PER_DAY {
        let reset_at = today
            .succ_opt()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "tomorrow".to_string());
        info!("daily quota reached ({} requests); next reset {}", count, reset_at);
        return Ok(AskOutcome::QuotaExceeded { reset_at });
    }

    let usage = state.usage.clone();
    task::spawn_blocking(move || usage.increment(today))
        .await
        .map_err(|e| PipelineError::Task(e.to_string()))??;

    let raw = state
        .llm
        .generate(&prompts::generation_prompt(question))
        .await?;
    let sql = sanitize::clean_sql(&raw);
    debug!("sanitized SQL: {}", sql);

    let validation_raw = state
        .llm
        .generate(&prompts::validation_prompt(&sql))
        .await?;

    let Some(verdict) = verdict::extract_verdict(&validation_raw) else {
        append_audit(state, question, audit::NO_SQL_SENTINEL).await?;
        return Ok(AskOutcome::VerdictUnparsable {
            message: "Failed to parse the validation response.".to_string(),
        });
    };

    // Logged before the gate; the audit layer redacts non-SELECT text.
    append_audit(state, question, &sql).await?;

    if !approved(&verdict, &sql) {
        info!("query rejected by the decision gate");
        return Ok(AskOutcome::Rejected {
            message: "Unsafe or invalid query detected. Only read-only SELECT queries are allowed."
                .to_string(),
        });
    }

    let executor = state.executor.clone();
    let sql_to_run = sql.clone();
    let execution = task::spawn_blocking(move || executor.run(&sql_to_run))
        .await
        .map_err(|e| PipelineError::Task(e.to_string()))?;

    let result = match execution {
        Ok(result) => result,
        Err(e) => {
            // Diagnostics only; the user never sees the database error text.
            error!("query execution failed: {}", e);
            return Ok(AskOutcome::ExecutionFailed {
                message: "Something went wrong while running the query.".to_string(),
            });
        }
    };

    let explanation = state
        .llm
        .generate(&prompts::explanation_prompt(
            question,
            &sql,
            &result.columns,
            &result.rows,
        ))
        .await?;

    Ok(AskOutcome::Answered {
        sql,
        columns: result.columns,
        rows: result.rows,
        explanation,
    })
}

async fn append_audit(
    state: &AppState,
    user_input: &str,
    generated_sql: &str,
) -> Result<(), PipelineError> {
    let log = state.audit.clone();
    let user_input = user_input.to_string();
    let generated_sql = generated_sql.to_string();
    task::spawn_blocking(move || log.append(&user_input, &generated_sql))
        .await
        .map_err(|e| PipelineError::Task(e.to_string()))??;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::{AuditLog, NO_SQL_SENTINEL};
    use crate::config::AppConfig;
    use crate::db::fixtures;
    use crate::db::store::Db;
    use crate::llm::{LlmManager, TextGenerator};
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    struct ScriptedGenerator {
        replies: Mutex<VecDeque<String>>,
    }

    impl ScriptedGenerator {
        fn new(replies: &[&str]) -> Self {
            Self {
                replies: Mutex::new(replies.iter().map(|r| r.to_string()).collect()),
            }
        }
    }

    #[async_trait]
    impl TextGenerator for ScriptedGenerator {
        async fn generate(&self, _prompt: &str) -> Result<String, LlmError> {
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| LlmError::ResponseError("script exhausted".to_string()))
        }
    }

    fn test_state(replies: &[&str]) -> (tempfile::TempDir, Arc<AppState>) {
        let dir = tempfile::tempdir().unwrap();
        let db = Db::new(dir.path().join("demo.duckdb"));
        db.ensure_schema().unwrap();
        fixtures::seed(&db).unwrap();

        let log_path = dir.path().join("query_log.json");
        let mut config = AppConfig::default();
        config.database.path = db.path().display().to_string();
        config.audit.log_file = log_path.display().to_string();

        let llm = LlmManager::from_generator(Box::new(ScriptedGenerator::new(replies)));
        let state = AppState::new(config, db, AuditLog::new(log_path), llm);
        (dir, Arc::new(state))
    }

    #[test]
    fn gate_requires_both_verdict_and_select_prefix() {
        let yes = verdict::extract_verdict(r#"{"safe_to_run": "yes"}"#).unwrap();
        let no = verdict::extract_verdict(r#"{"safe_to_run": "no"}"#).unwrap();

        assert!(approved(&yes, "SELECT id FROM employees"));
        assert!(approved(&yes, "  select id from employees"));
        assert!(!approved(&no, "SELECT id FROM employees"));
        assert!(!approved(&yes, "DROP TABLE employees"));
        assert!(!approved(&no, "DROP TABLE employees"));
    }

    #[tokio::test]
    async fn answered_path_runs_query_and_narrates() {
        let (_dir, state) = test_state(&[
            "```sql\nSELECT name FROM employees\n```",
            r#"{"safe_to_run": "yes"}"#,
            "Here are all the employees.",
        ]);

        let outcome = handle_question(&state, "list all employees").await.unwrap();
        match outcome {
            AskOutcome::Answered {
                sql,
                columns,
                rows,
                explanation,
            } => {
                assert_eq!(sql, "SELECT name FROM employees");
                assert_eq!(columns, vec!["name"]);
                assert_eq!(rows.len(), 50);
                assert_eq!(explanation, "Here are all the employees.");
            }
            other => panic!("expected Answered, got {:?}", other),
        }

        let entries = state.audit.entries().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].user_input, "list all employees");
        assert_eq!(entries[0].generated_sql, "SELECT name FROM employees");
    }

    #[tokio::test]
    async fn no_verdict_blocks_execution_of_a_select() {
        let (_dir, state) = test_state(&[
            "SELECT name FROM employees",
            r#"{"safe_to_run": "no"}"#,
        ]);

        let outcome = handle_question(&state, "list employees").await.unwrap();
        assert!(matches!(outcome, AskOutcome::Rejected { .. }));

        // The SELECT text itself is still recorded.
        let entries = state.audit.entries().unwrap();
        assert_eq!(entries[0].generated_sql, "SELECT name FROM employees");
    }

    #[tokio::test]
    async fn yes_verdict_cannot_push_a_drop_through() {
        let (_dir, state) = test_state(&[
            "DROP TABLE employees",
            r#"{"safe_to_run": "yes"}"#,
        ]);

        let outcome = handle_question(&state, "remove the table").await.unwrap();
        assert!(matches!(outcome, AskOutcome::Rejected { .. }));

        let entries = state.audit.entries().unwrap();
        assert_eq!(entries[0].generated_sql, NO_SQL_SENTINEL);

        // And the table is untouched.
        let result = state.executor.run("SELECT COUNT(*) FROM employees").unwrap();
        assert_eq!(result.rows[0][0], serde_json::json!(50));
    }

    #[tokio::test]
    async fn unparsable_verdict_logs_the_sentinel() {
        let (_dir, state) = test_state(&[
            "SELECT name FROM employees",
            "I cannot really say.",
        ]);

        let outcome = handle_question(&state, "list employees").await.unwrap();
        assert!(matches!(outcome, AskOutcome::VerdictUnparsable { .. }));

        let entries = state.audit.entries().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].generated_sql, NO_SQL_SENTINEL);
    }

    #[tokio::test]
    async fn execution_failure_is_generic_to_the_user() {
        let (_dir, state) = test_state(&[
            "SELECT boom FROM no_such_table",
            r#"{"safe_to_run": "yes"}"#,
        ]);

        let outcome = handle_question(&state, "break it").await.unwrap();
        match outcome {
            AskOutcome::ExecutionFailed { message } => {
                assert!(!message.to_lowercase().contains("no_such_table"));
            }
            other => panic!("expected ExecutionFailed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn quota_blocks_before_any_gateway_call() {
        // An empty script: any gateway call would error out the pipeline.
        let (_dir, state) = test_state(&[]);

        let today = Local::now().date_naive();
        state.usage.get_count(today).unwrap();
        for _ in 0..MAX_REQUESTS_PER_DAY {
            state.usage.increment(today).unwrap();
        }

        let outcome = handle_question(&state, "one more").await.unwrap();
        match outcome {
            AskOutcome::QuotaExceeded { reset_at } => {
                assert!(reset_at.ends_with("00:00:00"));
            }
            other => panic!("expected QuotaExceeded, got {:?}", other),
        }

        // No increment and no audit entry for a blocked request.
        assert_eq!(state.usage.get_count(today).unwrap(), MAX_REQUESTS_PER_DAY);
        assert!(state.audit.entries().is_err());
    }
}
