//! Response bodies shared by the HTTP handlers and the CLI's `--json` output.
//!
//! Field names are camelCase to match what browser clients expect.

use serde::Serialize;

use brainstorm_core::aggregator::ResponseAggregator;
use brainstorm_core::orchestrator::{AppendFailure, ContextReport, PersistedOutput, RunReport, RunState};
use brainstorm_types::provider::ProviderId;
use brainstorm_types::message::MessageId;
use brainstorm_types::provider::{
    AggregatedResponse, ProviderErrorKind, ProviderOutcome, ProviderResult, ProviderStatus,
};
use brainstorm_types::topic::TopicSet;

/// One provider's outcome, flattened for clients.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderStatusView {
    pub provider: String,
    pub status: ProviderStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ProviderErrorKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    pub elapsed_ms: u64,
}

impl From<&ProviderResult> for ProviderStatusView {
    fn from(result: &ProviderResult) -> Self {
        let (text, error, detail) = match &result.outcome {
            ProviderOutcome::Ok { text } => (Some(text.clone()), None, None),
            ProviderOutcome::Error { kind, detail } => (None, Some(*kind), Some(detail.clone())),
            ProviderOutcome::Timeout { timeout_ms } => {
                (None, None, Some(format!("no answer within {timeout_ms}ms")))
            }
        };
        Self {
            provider: result.provider_id.to_string(),
            status: result.status(),
            text,
            error,
            detail,
            elapsed_ms: result.elapsed_ms,
        }
    }
}

/// Accepted outputs labelled `"{display_name}: {content}"`, in declared order.
pub fn labelled_responses(
    aggregator: &ResponseAggregator,
    response: &AggregatedResponse,
) -> Vec<String> {
    response
        .accepted
        .iter()
        .map(|output| {
            let label = aggregator
                .display_name(&output.provider_id)
                .unwrap_or(output.provider_id.as_str());
            format!("{label}: {}", output.content)
        })
        .collect()
}

/// Body of `POST /ai`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AiView {
    pub responses: Vec<String>,
    pub per_provider_status: Vec<ProviderStatusView>,
    pub message_count: usize,
    pub truncated: bool,
    pub oversized: bool,
    pub attempts: u32,
}

/// Body of `POST /context` and `brainstorm context --json`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextView {
    pub context: String,
    pub topics: TopicSet,
    pub keywords: Vec<String>,
    pub self_reference: bool,
    pub message_count: usize,
    pub truncated: bool,
    pub oversized: bool,
}

impl From<&ContextReport> for ContextView {
    fn from(report: &ContextReport) -> Self {
        Self {
            context: report.smart.text.clone(),
            topics: report.topics.clone(),
            keywords: report.smart.keywords.clone(),
            self_reference: report.smart.self_reference,
            message_count: report.window.len(),
            truncated: report.window.dropped > 0,
            oversized: report.window.oversized,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedView {
    pub provider_id: ProviderId,
    pub message_id: MessageId,
}

impl From<&PersistedOutput> for PersistedView {
    fn from(output: &PersistedOutput) -> Self {
        Self {
            provider_id: output.provider_id.clone(),
            message_id: output.message_id.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppendFailureView {
    pub provider_id: ProviderId,
    pub error: String,
}

impl From<&AppendFailure> for AppendFailureView {
    fn from(failure: &AppendFailure) -> Self {
        Self {
            provider_id: failure.provider_id.clone(),
            error: failure.error.clone(),
        }
    }
}

/// Body of a completed `POST /messages` run.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunView {
    pub state: RunState,
    pub user_message_id: MessageId,
    pub responses: Vec<String>,
    pub per_provider_status: Vec<ProviderStatusView>,
    pub persisted: Vec<PersistedView>,
    pub append_failures: Vec<AppendFailureView>,
    pub topics: TopicSet,
    pub message_count: usize,
    pub truncated: bool,
    pub oversized: bool,
    pub attempts: u32,
}

impl RunView {
    pub fn new(report: &RunReport, aggregator: &ResponseAggregator) -> Self {
        Self {
            state: report.state,
            user_message_id: report.user_message_id.clone(),
            responses: labelled_responses(aggregator, &report.response),
            per_provider_status: report
                .response
                .results
                .iter()
                .map(ProviderStatusView::from)
                .collect(),
            persisted: report.persisted.iter().map(PersistedView::from).collect(),
            append_failures: report
                .append_failures
                .iter()
                .map(AppendFailureView::from)
                .collect(),
            topics: report.topics.clone(),
            message_count: report.context.len(),
            truncated: report.context.dropped > 0,
            oversized: report.context.oversized,
            attempts: report.attempts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brainstorm_types::provider::ProviderId;

    #[test]
    fn test_status_view_for_error() {
        let result = ProviderResult::error(
            ProviderId::from("groq"),
            ProviderErrorKind::Transport,
            "connection refused",
            7,
        );
        let json = serde_json::to_value(ProviderStatusView::from(&result)).unwrap();
        assert_eq!(json["provider"], "groq");
        assert_eq!(json["status"], "error");
        assert_eq!(json["error"], "transport");
        assert_eq!(json["detail"], "connection refused");
        assert_eq!(json["elapsedMs"], 7);
        assert!(json.get("text").is_none());
    }

    #[test]
    fn test_status_view_for_timeout() {
        let result = ProviderResult::timeout(ProviderId::from("hf"), 30_000, 30_002);
        let json = serde_json::to_value(ProviderStatusView::from(&result)).unwrap();
        assert_eq!(json["status"], "timeout");
        assert!(json.get("error").is_none());
    }
}
