use thiserror::Error;

use crate::provider::{ProviderErrorKind, ProviderResult};

/// Errors from the message store (used by the trait definition in brainstorm-core).
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store connection error: {0}")]
    Connection(String),

    #[error("query error: {0}")]
    Query(String),

    #[error("store rejected request (HTTP {status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("invalid row: {0}")]
    Decode(String),
}

/// Errors raised inside a provider adapter.
///
/// These never escape the adapter boundary: the core converts them into a
/// `ProviderResult` with the matching `ProviderErrorKind`.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("provider returned no text")]
    Empty,
}

impl ProviderError {
    pub fn kind(&self) -> ProviderErrorKind {
        match self {
            ProviderError::Transport(_) => ProviderErrorKind::Transport,
            ProviderError::HttpStatus { .. } => ProviderErrorKind::HttpStatus,
            ProviderError::Malformed(_) => ProviderErrorKind::MalformedResponse,
            ProviderError::Empty => ProviderErrorKind::EmptyResponse,
        }
    }
}

/// Errors from a fan-out over the configured providers.
#[derive(Debug, Error)]
pub enum AggregateError {
    /// No provider produced usable text. Carries every result for diagnostics.
    #[error("all {} providers failed", results.len())]
    AllProvidersFailed { results: Vec<ProviderResult> },

    #[error("context window is empty; nothing to dispatch")]
    EmptyContext,
}

/// A topic list could not be recovered from model output.
#[derive(Debug, Error)]
pub enum TopicParseError {
    #[error("no list found in model output")]
    NoList,

    #[error("invalid topic list: {0}")]
    InvalidJson(String),
}

/// Errors loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(String),

    #[error("invalid config: {0}")]
    Invalid(String),

    #[error("provider '{provider}' needs credential env var {env}")]
    MissingCredential { provider: String, env: String },
}
