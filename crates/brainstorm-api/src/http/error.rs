//! Application error type mapping to HTTP status codes.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use brainstorm_core::orchestrator::OrchestratorError;
use brainstorm_types::error::{AggregateError, StoreError};
use brainstorm_types::provider::ProviderResult;

use crate::http::response::ProviderStatusView;

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// The request body is unusable.
    Validation(String),
    /// The message store failed; nothing was written.
    Store(StoreError),
    /// Every provider failed or timed out.
    AllProvidersFailed(Vec<ProviderResult>),
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        AppError::Store(e)
    }
}

impl From<AggregateError> for AppError {
    fn from(e: AggregateError) -> Self {
        match e {
            AggregateError::AllProvidersFailed { results } => AppError::AllProvidersFailed(results),
            AggregateError::EmptyContext => {
                AppError::Validation("no messages to send".to_string())
            }
        }
    }
}

impl From<OrchestratorError> for AppError {
    fn from(e: OrchestratorError) -> Self {
        match e {
            OrchestratorError::Store(e) => e.into(),
            OrchestratorError::Aggregate(e) => e.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "VALIDATION_ERROR", "detail": msg }),
            ),
            AppError::Store(e) => {
                tracing::error!(error = %e, "message store failure");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    json!({ "error": "STORE_UNAVAILABLE", "detail": e.to_string() }),
                )
            }
            AppError::AllProvidersFailed(results) => {
                let statuses: Vec<ProviderStatusView> =
                    results.iter().map(ProviderStatusView::from).collect();
                (
                    StatusCode::BAD_GATEWAY,
                    json!({
                        "error": "ALL_PROVIDERS_FAILED",
                        "detail": format!("all {} providers failed", results.len()),
                        "perProviderStatus": statuses,
                    }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}
