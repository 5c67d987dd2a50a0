//! Stub providers and state for router tests.

use std::path::PathBuf;
use std::sync::Arc;

use axum::body::to_bytes;
use axum::response::Response;

use brainstorm_core::llm::{BoxProvider, ProviderAdapter};
use brainstorm_infra::store::{InMemoryMessageStore, MessageStoreBackend};
use brainstorm_types::config::AppConfig;
use brainstorm_types::error::ProviderError;
use brainstorm_types::provider::{ProviderId, ProviderRequest};

use crate::state::AppState;

/// Provider that answers every request the same way.
pub struct StubProvider {
    id: ProviderId,
    label: String,
    reply: Option<String>,
}

impl StubProvider {
    pub fn ok(id: &str, reply: &str) -> Self {
        Self {
            id: ProviderId::from(id),
            label: id.to_string(),
            reply: Some(reply.to_string()),
        }
    }

    pub fn failing(id: &str) -> Self {
        Self {
            id: ProviderId::from(id),
            label: id.to_string(),
            reply: None,
        }
    }

    pub fn labelled(mut self, label: &str) -> Self {
        self.label = label.to_string();
        self
    }
}

impl ProviderAdapter for StubProvider {
    fn id(&self) -> &ProviderId {
        &self.id
    }

    fn display_name(&self) -> &str {
        &self.label
    }

    async fn complete(&self, _request: &ProviderRequest) -> Result<String, ProviderError> {
        self.reply
            .clone()
            .ok_or_else(|| ProviderError::Transport("connection refused".to_string()))
    }
}

/// State over an in-memory store. Topic extraction uses the provider named "groq" if present.
pub fn state_with(providers: Vec<StubProvider>) -> AppState {
    let providers = providers
        .into_iter()
        .map(|p| Arc::new(BoxProvider::new(p)))
        .collect();
    AppState::new(
        AppConfig::default(),
        MessageStoreBackend::Memory(InMemoryMessageStore::new()),
        providers,
        PathBuf::from("/tmp/brainstorm-test"),
    )
}

pub async fn json_body(response: Response) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
