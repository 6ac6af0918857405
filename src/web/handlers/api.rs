use axum::{extract::State, http::StatusCode, Json};
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};

use crate::pipeline::{self, AskOutcome, MAX_REQUESTS_PER_DAY};
use crate::web::state::AppState;

/// Matches the input cap the form enforces client-side.
pub const MAX_QUESTION_CHARS: usize = 300;

#[derive(Debug, Deserialize)]
pub struct AskRequest {
    pub question: String,
}

#[derive(Debug, Serialize)]
pub struct UsageStatus {
    pub date: String,
    pub request_count: i64,
    pub limit: i64,
}

#[derive(Debug, Serialize)]
pub struct SystemStatus {
    pub version: String,
    pub uptime_seconds: i64,
    pub backend: String,
    pub model: String,
}

pub async fn ask(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<AskRequest>,
) -> Result<Json<AskOutcome>, (StatusCode, String)> {
    let question = payload.question.trim().to_string();

    if question.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "Question must not be empty".to_string()));
    }
    if question.chars().count() > MAX_QUESTION_CHARS {
        return Err((
            StatusCode::BAD_REQUEST,
            format!("Question must be at most {} characters", MAX_QUESTION_CHARS),
        ));
    }

    info!("processing question ({} chars)", question.chars().count());

    match pipeline::handle_question(&state, &question).await {
        Ok(outcome) => Ok(Json(outcome)),
        Err(e) => {
            error!("pipeline failure: {}", e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                "The request could not be completed".to_string(),
            ))
        }
    }
}

pub async fn usage(
    State(state): State<Arc<AppState>>,
) -> Result<Json<UsageStatus>, (StatusCode, String)> {
    let today = Local::now().date_naive();
    let counter = state.usage.clone();

    let request_count = tokio::task::spawn_blocking(move || counter.get_count(today))
        .await
        .map_err(|e| {
            error!("usage task failed: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Database error".to_string())
        })?
        .map_err(|e| {
            error!("usage lookup failed: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Database error".to_string())
        })?;

    Ok(Json(UsageStatus {
        date: today.format("%Y-%m-%d").to_string(),
        request_count,
        limit: MAX_REQUESTS_PER_DAY,
    }))
}

pub async fn system_status(State(state): State<Arc<AppState>>) -> Json<SystemStatus> {
    let uptime = chrono::Utc::now()
        .signed_duration_since(state.startup_time)
        .num_seconds();

    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: uptime,
        backend: state.config.llm.backend.clone(),
        model: state.config.llm.model.clone(),
    })
}
