//! Stored conversation endpoints.
//!
//! `POST /messages` runs the full pipeline: append the user message, fan
//! out, persist accepted outputs. `GET /messages` returns the ordered log.

use axum::Json;
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use serde_json::json;

use brainstorm_core::orchestrator::SubmitOutcome;
use brainstorm_core::repository::MessageStore;
use brainstorm_types::message::Message;

use crate::http::error::AppError;
use crate::http::response::RunView;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// Only return the most recent N messages.
    #[serde(default)]
    pub limit: Option<usize>,
}

pub async fn submit(
    State(state): State<AppState>,
    Json(body): Json<SubmitRequest>,
) -> Result<Response, AppError> {
    match state.orchestrator.submit(&body.content).await? {
        SubmitOutcome::Skipped => Ok(Json(json!({ "skipped": true })).into_response()),
        SubmitOutcome::Completed(report) => {
            let view = RunView::new(&report, state.orchestrator.aggregator());
            Ok(Json(view).into_response())
        }
    }
}

pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Message>>, AppError> {
    let mut log = state.orchestrator.store().list_ordered().await?;
    if let Some(limit) = query.limit {
        let skip = log.len().saturating_sub(limit);
        log.drain(..skip);
    }
    Ok(Json(log))
}
