//! Provider request/result types and the aggregated response.
//!
//! Every provider invocation settles into exactly one `ProviderResult`,
//! whose outcome is a tagged union: `ok(text) | error(kind, detail) | timeout`.
//! Results are never mutated after creation.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::context::ContextWindow;
use crate::llm::ProviderOptions;

/// Stable identifier of a configured provider (its config `name`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProviderId(pub String);

impl ProviderId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProviderId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ProviderId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// One dispatch to one provider.
///
/// The context window is shared read-only between all requests of a
/// single aggregation run.
#[derive(Debug, Clone)]
pub struct ProviderRequest {
    pub provider_id: ProviderId,
    pub context: Arc<ContextWindow>,
    pub options: ProviderOptions,
}

/// Coarse status of a provider result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderStatus {
    Ok,
    Error,
    Timeout,
}

impl fmt::Display for ProviderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderStatus::Ok => write!(f, "ok"),
            ProviderStatus::Error => write!(f, "error"),
            ProviderStatus::Timeout => write!(f, "timeout"),
        }
    }
}

/// Classification of a failed provider invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderErrorKind {
    /// Connection refused, DNS failure, TLS error, body read failure.
    Transport,
    /// The provider answered with a non-2xx status.
    HttpStatus,
    /// The body could not be interpreted as the provider's response shape.
    MalformedResponse,
    /// The provider answered successfully but produced no usable text.
    EmptyResponse,
    /// The invocation task panicked or was aborted.
    TaskFailed,
}

impl fmt::Display for ProviderErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderErrorKind::Transport => write!(f, "transport"),
            ProviderErrorKind::HttpStatus => write!(f, "http_status"),
            ProviderErrorKind::MalformedResponse => write!(f, "malformed_response"),
            ProviderErrorKind::EmptyResponse => write!(f, "empty_response"),
            ProviderErrorKind::TaskFailed => write!(f, "task_failed"),
        }
    }
}

/// How a single provider invocation settled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ProviderOutcome {
    Ok {
        text: String,
    },
    Error {
        kind: ProviderErrorKind,
        detail: String,
    },
    Timeout {
        timeout_ms: u64,
    },
}

impl ProviderOutcome {
    pub fn status(&self) -> ProviderStatus {
        match self {
            ProviderOutcome::Ok { .. } => ProviderStatus::Ok,
            ProviderOutcome::Error { .. } => ProviderStatus::Error,
            ProviderOutcome::Timeout { .. } => ProviderStatus::Timeout,
        }
    }
}

/// The settled result of one provider invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderResult {
    pub provider_id: ProviderId,
    #[serde(flatten)]
    pub outcome: ProviderOutcome,
    pub elapsed_ms: u64,
}

impl ProviderResult {
    pub fn ok(provider_id: ProviderId, text: impl Into<String>, elapsed_ms: u64) -> Self {
        Self {
            provider_id,
            outcome: ProviderOutcome::Ok { text: text.into() },
            elapsed_ms,
        }
    }

    pub fn error(
        provider_id: ProviderId,
        kind: ProviderErrorKind,
        detail: impl Into<String>,
        elapsed_ms: u64,
    ) -> Self {
        Self {
            provider_id,
            outcome: ProviderOutcome::Error {
                kind,
                detail: detail.into(),
            },
            elapsed_ms,
        }
    }

    pub fn timeout(provider_id: ProviderId, timeout_ms: u64, elapsed_ms: u64) -> Self {
        Self {
            provider_id,
            outcome: ProviderOutcome::Timeout { timeout_ms },
            elapsed_ms,
        }
    }

    pub fn status(&self) -> ProviderStatus {
        self.outcome.status()
    }

    /// The response text, for `ok` results.
    pub fn text(&self) -> Option<&str> {
        match &self.outcome {
            ProviderOutcome::Ok { text } => Some(text),
            _ => None,
        }
    }

    /// Usable output: an `ok` result whose text is not blank.
    pub fn accepted_text(&self) -> Option<&str> {
        self.text().map(str::trim).filter(|t| !t.is_empty())
    }
}

/// A provider output eligible for persistence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcceptedOutput {
    pub provider_id: ProviderId,
    pub content: String,
}

/// Reconciled result of one fan-out.
///
/// `results` holds one entry per dispatched provider in declared order;
/// `accepted` is the in-order subset with usable text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregatedResponse {
    pub results: Vec<ProviderResult>,
    pub accepted: Vec<AcceptedOutput>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_serializes_with_status_tag() {
        let result = ProviderResult::timeout(ProviderId::from("hf"), 30_000, 30_001);
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["status"], "timeout");
        assert_eq!(json["provider_id"], "hf");
        assert_eq!(json["timeout_ms"], 30_000);
    }

    #[test]
    fn test_error_outcome_carries_kind() {
        let result = ProviderResult::error(
            ProviderId::from("groq"),
            ProviderErrorKind::HttpStatus,
            "HTTP 503: busy",
            12,
        );
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["status"], "error");
        assert_eq!(json["kind"], "http_status");
        assert_eq!(json["detail"], "HTTP 503: busy");

        let parsed: ProviderResult = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, result);
    }

    #[test]
    fn test_accepted_text_rejects_blank() {
        let blank = ProviderResult::ok(ProviderId::from("a"), "   \n", 1);
        assert_eq!(blank.status(), ProviderStatus::Ok);
        assert!(blank.accepted_text().is_none());

        let good = ProviderResult::ok(ProviderId::from("a"), "  Expand on A ", 1);
        assert_eq!(good.accepted_text(), Some("Expand on A"));
    }

    #[test]
    fn test_text_is_none_for_failures() {
        let result = ProviderResult::timeout(ProviderId::from("a"), 10, 10);
        assert!(result.text().is_none());
        assert!(result.accepted_text().is_none());
    }
}
