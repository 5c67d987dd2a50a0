//! OpenAI-compatible chat completions provider.
//!
//! Covers any backend that speaks `POST {base}/chat/completions` (Groq,
//! OpenAI, local servers). Defaults to Groq's endpoint.
//!
//! The API key is wrapped in [`secrecy::SecretString`] and is only exposed
//! when building the `Authorization` header.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::Instrument;

use brainstorm_core::llm::ProviderAdapter;
use brainstorm_observe::genai_attrs::{OP_CHAT, PROVIDER_OPENAI_COMPATIBLE, request_span};
use brainstorm_types::config::ProviderConfig;
use brainstorm_types::error::{ConfigError, ProviderError};
use brainstorm_types::provider::{ProviderId, ProviderRequest};

use super::{base_url_or, build_http_client, send_json};

/// Groq's OpenAI-compatible endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Provider for OpenAI-compatible chat completion APIs.
pub struct OpenAiCompatibleProvider {
    client: reqwest::Client,
    api_key: Option<SecretString>,
    base_url: String,
    model: String,
    id: ProviderId,
    display_name: String,
}

impl OpenAiCompatibleProvider {
    pub fn new(config: &ProviderConfig, api_key: Option<SecretString>) -> Result<Self, ConfigError> {
        Ok(Self {
            client: build_http_client()?,
            api_key,
            base_url: base_url_or(config, DEFAULT_BASE_URL),
            model: config.model.clone(),
            id: ProviderId::from(config.name.as_str()),
            display_name: config.label().to_string(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn to_chat_request(&self, request: &ProviderRequest) -> ChatRequest {
        let system = request
            .options
            .system
            .as_ref()
            .filter(|s| !s.trim().is_empty())
            .map(|s| ChatMessage {
                role: "system".to_string(),
                content: s.clone(),
            });

        let messages = system
            .into_iter()
            .chain(request.context.entries.iter().map(|e| ChatMessage {
                role: e.role.to_string(),
                content: e.content.clone(),
            }))
            .collect();

        ChatRequest {
            model: self.model.clone(),
            messages,
            max_tokens: request.options.max_tokens,
            temperature: request.options.temperature,
        }
    }
}

impl ProviderAdapter for OpenAiCompatibleProvider {
    fn id(&self) -> &ProviderId {
        &self.id
    }

    fn display_name(&self) -> &str {
        &self.display_name
    }

    async fn complete(&self, request: &ProviderRequest) -> Result<String, ProviderError> {
        let url = format!("{}/chat/completions", self.base_url);
        let mut builder = self.client.post(&url).json(&self.to_chat_request(request));
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key.expose_secret());
        }

        let span = request_span(
            OP_CHAT,
            PROVIDER_OPENAI_COMPATIBLE,
            &self.model,
            request.options.max_tokens,
            request.options.temperature,
        );
        let response: ChatResponse = send_json(builder).instrument(span).await?;
        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::Malformed("response has no choices".to_string()))?;

        choice.message.content.ok_or(ProviderError::Empty)
    }
}
