//! POST /context - Condensed context and topics for caller-supplied messages.

use axum::Json;
use axum::extract::State;

use crate::http::error::AppError;
use crate::http::handlers::MessagesRequest;
use crate::http::response::ContextView;
use crate::state::AppState;

pub async fn condense(
    State(state): State<AppState>,
    Json(body): Json<MessagesRequest>,
) -> Result<Json<ContextView>, AppError> {
    let entries = body.into_entries()?;
    let report = state.orchestrator.condense(&entries).await;
    Ok(Json(ContextView::from(&report)))
}
