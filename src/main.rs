use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info};

mod audit;
mod config;
mod db;
mod llm;
mod pipeline;
mod util;
mod web;

use crate::audit::AuditLog;
use crate::config::{AppConfig, CliArgs};
use crate::db::store::Db;
use crate::llm::LlmManager;
use crate::util::logging::init_tracing;
use crate::web::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    init_tracing();

    // Parse command line arguments
    let args = CliArgs::parse();

    // Load configuration
    let config = match AppConfig::new(&args) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    // Ensure data directory exists
    let data_dir = PathBuf::from(&config.data_dir);
    if !data_dir.exists() {
        info!("Creating data directory: {}", config.data_dir);
        std::fs::create_dir_all(&data_dir)?;
    }

    let db_path = resolve_path(&data_dir, &config.database.path);
    let log_path = resolve_path(&data_dir, &config.audit.log_file);

    info!("Opening DuckDB database at {}", db_path.display());
    let db = Db::new(db_path);
    db.ensure_schema()?;

    if args.seed {
        info!("Seeding fixture data");
        db::fixtures::seed(&db)?;
        return Ok(());
    }

    // Initialize the LLM gateway
    info!("Initializing LLM gateway with backend: {}", config.llm.backend);
    let llm_manager = LlmManager::new(&config.llm)?;

    let app_state = Arc::new(AppState::new(
        config.clone(),
        db,
        AuditLog::new(log_path),
        llm_manager,
    ));

    // Start the web server
    info!("Starting nl-desk server on {}:{}", config.web.host, config.web.port);
    match web::run_server(config.web, app_state).await {
        Ok(_) => info!("Server stopped gracefully"),
        Err(e) => {
            error!("Server error: {}", e);
            return Err(std::io::Error::other(e.to_string()).into());
        }
    }

    Ok(())
}

/// Relative file names land inside the data directory; absolute paths are
/// used as-is.
fn resolve_path(data_dir: &Path, value: &str) -> PathBuf {
    let path = PathBuf::from(value);
    if path.is_absolute() {
        path
    } else {
        data_dir.join(path)
    }
}
