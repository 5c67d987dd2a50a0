//! ProviderAdapter trait definition.
//!
//! This is the core abstraction that every language-model backend implements.
//! An adapter only translates a context window to its wire format and back;
//! timeouts and failure classification are applied uniformly by
//! [`BoxProvider::invoke`](super::box_provider::BoxProvider::invoke).

use brainstorm_types::error::ProviderError;
use brainstorm_types::provider::{ProviderId, ProviderRequest};

/// Trait for provider backends (Hugging Face, OpenAI-compatible, Anthropic).
///
/// Uses native async fn in traits (RPITIT, Rust 2024 edition).
/// Implementations live in brainstorm-infra.
pub trait ProviderAdapter: Send + Sync {
    /// Stable provider id (the configured `name`).
    fn id(&self) -> &ProviderId;

    /// Label used when presenting outputs (e.g., "Hugging Face").
    fn display_name(&self) -> &str;

    /// Send the request and return the generated text.
    fn complete(
        &self,
        request: &ProviderRequest,
    ) -> impl std::future::Future<Output = Result<String, ProviderError>> + Send;
}
