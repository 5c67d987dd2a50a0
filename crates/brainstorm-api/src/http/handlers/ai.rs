//! POST /ai - Stateless fan-out over caller-supplied messages.
//!
//! The caller owns the conversation log; nothing is written to the store.

use axum::Json;
use axum::extract::State;

use crate::http::error::AppError;
use crate::http::handlers::MessagesRequest;
use crate::http::response::{AiView, ProviderStatusView, labelled_responses};
use crate::state::AppState;

pub async fn ask(
    State(state): State<AppState>,
    Json(body): Json<MessagesRequest>,
) -> Result<Json<AiView>, AppError> {
    let entries = body.into_entries()?;
    let answer = state.orchestrator.answer(&entries).await?;

    Ok(Json(AiView {
        responses: labelled_responses(state.orchestrator.aggregator(), &answer.response),
        per_provider_status: answer
            .response
            .results
            .iter()
            .map(ProviderStatusView::from)
            .collect(),
        message_count: answer.context.len(),
        truncated: answer.context.dropped > 0,
        oversized: answer.context.oversized,
        attempts: answer.attempts,
    }))
}
