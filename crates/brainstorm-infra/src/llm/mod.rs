//! Provider adapter implementations.
//!
//! Contains concrete implementations of the [`ProviderAdapter`] trait
//! defined in `brainstorm-core`: Hugging Face Inference, OpenAI-compatible
//! chat completions (Groq by default) and Anthropic Messages.
//!
//! Also provides a provider factory ([`create_provider`]) that constructs
//! the right adapter from a [`ProviderConfig`], and [`create_providers`]
//! which builds every enabled provider in declared order.
//!
//! [`ProviderAdapter`]: brainstorm_core::llm::ProviderAdapter

pub mod anthropic;
pub mod huggingface;
pub mod openai_compat;

#[cfg(test)]
pub(crate) mod test_support;

use std::sync::Arc;
use std::time::Duration;

use secrecy::SecretString;
use serde::de::DeserializeOwned;

use brainstorm_core::llm::BoxProvider;
use brainstorm_types::config::{AppConfig, ProviderConfig};
use brainstorm_types::error::{ConfigError, ProviderError};
use brainstorm_types::llm::ProviderKind;
use brainstorm_types::provider::ProviderRequest;

use self::anthropic::AnthropicProvider;
use self::huggingface::HuggingFaceProvider;
use self::openai_compat::OpenAiCompatibleProvider;
use crate::config::resolve_credential;

/// Create a [`BoxProvider`] from a [`ProviderConfig`].
///
/// `api_key` is the already-resolved credential. Anthropic requires one;
/// the other kinds send a bearer token only when a key is present.
pub fn create_provider(
    config: &ProviderConfig,
    api_key: Option<SecretString>,
) -> Result<BoxProvider, ConfigError> {
    match config.kind {
        ProviderKind::HuggingFace => Ok(BoxProvider::new(HuggingFaceProvider::new(config, api_key)?)),
        ProviderKind::OpenAiCompatible => Ok(BoxProvider::new(OpenAiCompatibleProvider::new(
            config, api_key,
        )?)),
        ProviderKind::Anthropic => {
            let key = api_key.ok_or_else(|| ConfigError::MissingCredential {
                provider: config.name.clone(),
                env: config
                    .api_key_env
                    .clone()
                    .unwrap_or_else(|| "ANTHROPIC_API_KEY".to_string()),
            })?;
            Ok(BoxProvider::new(AnthropicProvider::new(config, key)?))
        }
    }
}

/// Build every enabled provider, in declared order, resolving credentials
/// from the environment.
pub fn create_providers(config: &AppConfig) -> Result<Vec<Arc<BoxProvider>>, ConfigError> {
    config
        .enabled_providers()
        .map(|provider| {
            let api_key = resolve_credential(provider)?;
            let boxed = create_provider(provider, api_key)?;
            tracing::debug!(provider = %provider.name, kind = %provider.kind, model = %provider.model, "provider ready");
            Ok(Arc::new(boxed))
        })
        .collect()
}

/// HTTP client owned by a single adapter.
///
/// The per-request deadline is enforced by the aggregator; the client
/// timeout only guards against connections that never complete.
pub(crate) fn build_http_client() -> Result<reqwest::Client, ConfigError> {
    reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(10))
        .timeout(Duration::from_secs(300))
        .build()
        .map_err(|e| ConfigError::Invalid(format!("failed to create HTTP client: {e}")))
}

/// Send a request and decode a JSON body, classifying failures.
///
/// Non-2xx responses keep their body for diagnostics.
pub(crate) async fn send_json<T: DeserializeOwned>(
    request: reqwest::RequestBuilder,
) -> Result<T, ProviderError> {
    let response = request
        .send()
        .await
        .map_err(|e| ProviderError::Transport(format!("HTTP request failed: {e}")))?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| ProviderError::Transport(format!("failed to read response body: {e}")))?;

    if !status.is_success() {
        return Err(ProviderError::HttpStatus {
            status: status.as_u16(),
            body,
        });
    }

    serde_json::from_str(&body)
        .map_err(|e| ProviderError::Malformed(format!("failed to parse response: {e}")))
}

/// Render a request as a single prompt for completion-style models.
pub(crate) fn render_prompt(request: &ProviderRequest) -> String {
    let transcript = request.context.transcript();
    match request.options.system.as_deref() {
        Some(system) if !system.trim().is_empty() => {
            format!("{system}\n\n{transcript}\nassistant:")
        }
        _ => format!("{transcript}\nassistant:"),
    }
}

fn base_url_or(config: &ProviderConfig, default: &str) -> String {
    config
        .base_url
        .as_deref()
        .unwrap_or(default)
        .trim_end_matches('/')
        .to_string()
}
