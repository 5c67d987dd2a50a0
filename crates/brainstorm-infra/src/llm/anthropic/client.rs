//! AnthropicProvider -- concrete [`ProviderAdapter`] for Anthropic Claude.
//!
//! Sends requests to the Anthropic Messages API (`/v1/messages`) with
//! `x-api-key` and `anthropic-version` headers.
//!
//! The API key is wrapped in [`secrecy::SecretString`] and is never logged
//! or included in `Debug` output.

use secrecy::{ExposeSecret, SecretString};
use tracing::Instrument;

use brainstorm_core::llm::ProviderAdapter;
use brainstorm_observe::genai_attrs::{OP_CHAT, PROVIDER_ANTHROPIC, request_span};
use brainstorm_types::config::ProviderConfig;
use brainstorm_types::context::ContextEntry;
use brainstorm_types::error::{ConfigError, ProviderError};
use brainstorm_types::llm::MessageRole;
use brainstorm_types::provider::{ProviderId, ProviderRequest};

use super::types::{AnthropicContentBlock, AnthropicMessage, AnthropicRequest, AnthropicResponse};

use crate::llm::{base_url_or, build_http_client, send_json};

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";

/// Anthropic Claude provider.
pub struct AnthropicProvider {
    client: reqwest::Client,
    api_key: SecretString,
    base_url: String,
    model: String,
    id: ProviderId,
    display_name: String,
}

impl AnthropicProvider {
    /// The Anthropic API version header value.
    const API_VERSION: &'static str = "2023-06-01";

    pub fn new(config: &ProviderConfig, api_key: SecretString) -> Result<Self, ConfigError> {
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

    fn to_anthropic_request(&self, request: &ProviderRequest) -> AnthropicRequest {
        AnthropicRequest {
            model: self.model.clone(),
            max_tokens: request.options.max_tokens,
            messages: to_anthropic_messages(&request.context.entries),
            system: request.options.system.clone(),
            temperature: request.options.temperature,
        }
    }
}

/// Convert window entries to the Messages API's alternating turns.
///
/// The API requires the first turn to be `user` and roles to alternate, so
/// leading assistant turns are dropped and consecutive same-role turns are
/// merged. System entries are skipped; the system prompt travels separately.
pub fn to_anthropic_messages(entries: &[ContextEntry]) -> Vec<AnthropicMessage> {
    let mut messages: Vec<AnthropicMessage> = Vec::new();
    for entry in entries {
        let role = match entry.role {
            MessageRole::System => continue,
            MessageRole::Assistant if messages.is_empty() => continue,
            role => role.to_string(),
        };
        match messages.last_mut() {
            Some(last) if last.role == role => {
                last.content.push_str("\n\n");
                last.content.push_str(&entry.content);
            }
            _ => messages.push(AnthropicMessage {
                role,
                content: entry.content.clone(),
            }),
        }
    }
    messages
}

impl ProviderAdapter for AnthropicProvider {
    fn id(&self) -> &ProviderId {
        &self.id
    }

    fn display_name(&self) -> &str {
        &self.display_name
    }

    async fn complete(&self, request: &ProviderRequest) -> Result<String, ProviderError> {
        let body = self.to_anthropic_request(request);
        if body.messages.is_empty() {
            return Err(ProviderError::Malformed(
                "context has no user turn to send".to_string(),
            ));
        }

        let builder = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", self.api_key.expose_secret())
            .header("anthropic-version", Self::API_VERSION)
            .json(&body);

        let span = request_span(
            OP_CHAT,
            PROVIDER_ANTHROPIC,
            &self.model,
            body.max_tokens,
            body.temperature,
        );
        let response: AnthropicResponse = send_json(builder).instrument(span).await?;

        Ok(response
            .content
            .iter()
            .filter_map(|block| match block {
                AnthropicContentBlock::Text { text } => Some(text.as_str()),
                AnthropicContentBlock::Other => None,
            })
            .collect::<Vec<_>>()
            .join(""))
    }
}
