use crate::audit::AuditLog;
use crate::config::AppConfig;
use crate::db::executor::QueryExecutor;
use crate::db::store::Db;
use crate::db::usage::UsageCounter;
use crate::llm::LlmManager;

/// Shared application state. Everything a request touches is constructed
/// once here and injected; no component reads ambient globals.
pub struct AppState {
    pub config: AppConfig,
    pub llm: LlmManager,
    pub usage: UsageCounter,
    pub executor: QueryExecutor,
    pub audit: AuditLog,
    pub startup_time: chrono::DateTime<chrono::Utc>,
}

impl AppState {
    pub fn new(config: AppConfig, db: Db, audit: AuditLog, llm: LlmManager) -> Self {
        Self {
            config,
            llm,
            usage: UsageCounter::new(db.clone()),
            executor: QueryExecutor::new(db),
            audit,
            startup_time: chrono::Utc::now(),
        }
    }
}
