//! Liveness endpoints.

use axum::Json;
use axum::extract::State;
use serde_json::{Value, json};

use crate::state::AppState;

/// GET / - Liveness probe.
pub async fn root() -> Json<Value> {
    Json(json!({ "message": "Backend is alive" }))
}

/// GET /health - Status plus the providers requests fan out to.
pub async fn health(State(state): State<AppState>) -> Json<Value> {
    let providers: Vec<&str> = state
        .orchestrator
        .aggregator()
        .providers()
        .iter()
        .map(|p| p.id().as_str())
        .collect();

    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "providers": providers,
    }))
}
