//! POST /save - Acknowledge a thought without storing it.

use axum::Json;
use serde::Deserialize;
use serde_json::{Value, json};

#[derive(Debug, Deserialize)]
pub struct Thought {
    pub content: String,
}

pub async fn save(Json(thought): Json<Thought>) -> Json<Value> {
    Json(json!({ "status": "saved", "thought": thought.content }))
}
