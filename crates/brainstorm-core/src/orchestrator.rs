//! Per-request orchestration.
//!
//! One `submit` call drives a user message through
//! `Received -> ContextBuilt -> Dispatched -> Persisted -> Completed`.
//! The user message is stored before anything is dispatched; only accepted
//! provider outputs are written back, each tagged with its provider.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info, warn};

use brainstorm_types::config::AppConfig;
use brainstorm_types::context::{ContextBudget, ContextEntry, ContextWindow};
use brainstorm_types::error::{AggregateError, StoreError};
use brainstorm_types::message::{MessageId, NewMessage};
use brainstorm_types::provider::{AggregatedResponse, ProviderId};
use brainstorm_types::topic::TopicSet;

use crate::aggregator::ResponseAggregator;
use crate::context::{self, SmartContext};
use crate::llm::BoxProvider;
use crate::repository::MessageStore;
use crate::topic::TopicExtractor;

/// Lifecycle of one orchestration run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    Received,
    ContextBuilt,
    Dispatched,
    Persisted,
    Completed,
    Failed,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunState::Received => write!(f, "received"),
            RunState::ContextBuilt => write!(f, "context_built"),
            RunState::Dispatched => write!(f, "dispatched"),
            RunState::Persisted => write!(f, "persisted"),
            RunState::Completed => write!(f, "completed"),
            RunState::Failed => write!(f, "failed"),
        }
    }
}

/// Re-dispatch policy for fan-outs where every provider failed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Extra attempts after the first.
    pub attempts: u32,
    pub backoff: Duration,
}

/// An accepted output that was written to the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PersistedOutput {
    pub provider_id: ProviderId,
    pub message_id: MessageId,
}

/// An accepted output the store refused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppendFailure {
    pub provider_id: ProviderId,
    pub error: String,
}

/// Everything a completed run produced.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub state: RunState,
    pub user_message_id: MessageId,
    pub context: Arc<ContextWindow>,
    pub response: AggregatedResponse,
    pub persisted: Vec<PersistedOutput>,
    pub append_failures: Vec<AppendFailure>,
    pub topics: TopicSet,
    /// Number of dispatches made, including retries.
    pub attempts: u32,
}

#[derive(Debug, Clone)]
pub enum SubmitOutcome {
    /// The message was blank; nothing was stored or dispatched.
    Skipped,
    Completed(Box<RunReport>),
}

/// Result of a stateless dispatch over caller-supplied messages.
#[derive(Debug, Clone)]
pub struct Answer {
    pub context: Arc<ContextWindow>,
    pub response: AggregatedResponse,
    pub attempts: u32,
}

/// Condensed view of caller-supplied or stored messages.
#[derive(Debug, Clone)]
pub struct ContextReport {
    pub window: ContextWindow,
    pub smart: SmartContext,
    pub topics: TopicSet,
}

/// Errors that end a run in the `Failed` state.
#[derive(Debug, thiserror::Error)]
pub enum OrchestratorError {
    /// The store failed while ingesting the user message or reading the log.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error(transparent)]
    Aggregate(#[from] AggregateError),
}

impl OrchestratorError {
    /// The last state reached before the run failed.
    pub fn failed_at(&self) -> RunState {
        match self {
            OrchestratorError::Store(_) => RunState::Received,
            OrchestratorError::Aggregate(_) => RunState::ContextBuilt,
        }
    }
}

/// Drives context building, aggregation, persistence and topic extraction.
pub struct Orchestrator<S: MessageStore> {
    store: Arc<S>,
    aggregator: ResponseAggregator,
    topics: Option<TopicExtractor>,
    budget: ContextBudget,
    retry: RetryPolicy,
}

impl<S: MessageStore> Orchestrator<S> {
    pub fn new(
        store: Arc<S>,
        aggregator: ResponseAggregator,
        topics: Option<TopicExtractor>,
        budget: ContextBudget,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            store,
            aggregator,
            topics,
            budget,
            retry,
        }
    }

    /// Wire an orchestrator from configuration and already-built providers.
    ///
    /// `providers` must be in declared order. The topic extractor reuses the
    /// provider named by `topics.provider`; if it is missing, extraction is off.
    pub fn from_config(config: &AppConfig, store: Arc<S>, providers: Vec<Arc<BoxProvider>>) -> Self {
        let timeout = Duration::from_millis(config.dispatch.timeout_ms);

        let topics = if config.topics.enabled {
            let provider = providers
                .iter()
                .find(|p| p.id().as_str() == config.topics.provider)
                .cloned();
            if provider.is_none() {
                warn!(provider = %config.topics.provider, "topic provider not available; topic extraction disabled");
            }
            provider.map(|p| TopicExtractor::new(p, &config.topics, timeout))
        } else {
            None
        };

        let aggregator = ResponseAggregator::new(providers, config.dispatch.options(), timeout);
        let retry = RetryPolicy {
            attempts: config.dispatch.retry_attempts,
            backoff: Duration::from_millis(config.dispatch.retry_backoff_ms),
        };

        Self::new(store, aggregator, topics, config.context.budget(), retry)
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn aggregator(&self) -> &ResponseAggregator {
        &self.aggregator
    }

    pub fn topic_extractor(&self) -> Option<&TopicExtractor> {
        self.topics.as_ref()
    }

    pub fn budget(&self) -> &ContextBudget {
        &self.budget
    }

    /// Run one user message through the full pipeline.
    #[tracing::instrument(name = "submit", skip_all, fields(chars = content.chars().count()))]
    pub async fn submit(&self, content: &str) -> Result<SubmitOutcome, OrchestratorError> {
        if content.trim().is_empty() {
            debug!("blank message; skipping");
            return Ok(SubmitOutcome::Skipped);
        }

        let user_message_id = self.store.append(&NewMessage::user(content)).await?;
        let log = self.store.list_ordered().await?;

        let context = Arc::new(context::build(&log, &self.budget));
        debug!(
            state = %RunState::ContextBuilt,
            entries = context.len(),
            dropped = context.dropped,
            oversized = context.oversized,
            "context built"
        );

        let transcript = context.transcript();
        let (dispatched, topics) = tokio::join!(
            self.dispatch(Arc::clone(&context)),
            self.extract_topics(&transcript)
        );
        let (response, attempts) = dispatched.inspect_err(|e| {
            warn!(state = %RunState::Failed, error = %e, "dispatch failed; nothing persisted");
        })?;
        debug!(state = %RunState::Dispatched, accepted = response.accepted.len(), "dispatched");

        let mut persisted = Vec::with_capacity(response.accepted.len());
        let mut append_failures = Vec::new();
        for output in &response.accepted {
            let message = NewMessage::assistant(output.provider_id.clone(), output.content.clone());
            match self.store.append(&message).await {
                Ok(message_id) => persisted.push(PersistedOutput {
                    provider_id: output.provider_id.clone(),
                    message_id,
                }),
                Err(e) => {
                    warn!(provider = %output.provider_id, error = %e, "failed to persist provider output");
                    append_failures.push(AppendFailure {
                        provider_id: output.provider_id.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }
        debug!(state = %RunState::Persisted, persisted = persisted.len(), "outputs persisted");

        info!(
            accepted = response.accepted.len(),
            persisted = persisted.len(),
            append_failures = append_failures.len(),
            topics = topics.len(),
            attempts,
            "run completed"
        );

        Ok(SubmitOutcome::Completed(Box::new(RunReport {
            state: RunState::Completed,
            user_message_id,
            context,
            response,
            persisted,
            append_failures,
            topics,
            attempts,
        })))
    }

    /// Dispatch caller-supplied messages without touching the store.
    #[tracing::instrument(name = "answer", skip_all, fields(messages = messages.len()))]
    pub async fn answer(&self, messages: &[ContextEntry]) -> Result<Answer, AggregateError> {
        let context = Arc::new(context::build(messages, &self.budget));
        let (response, attempts) = self.dispatch(Arc::clone(&context)).await?;
        Ok(Answer {
            context,
            response,
            attempts,
        })
    }

    /// Condense caller-supplied messages and extract their topics.
    pub async fn condense(&self, messages: &[ContextEntry]) -> ContextReport {
        let window = context::build(messages, &self.budget);
        let smart = context::build_smart_context(&window);
        let topics = self.extract_topics(&window.transcript()).await;
        ContextReport {
            window,
            smart,
            topics,
        }
    }

    /// Condense the stored log.
    pub async fn condense_log(&self) -> Result<ContextReport, StoreError> {
        let log = self.store.list_ordered().await?;
        let entries: Vec<ContextEntry> = log
            .into_iter()
            .map(|m| ContextEntry::new(m.role, m.content))
            .collect();
        Ok(self.condense(&entries).await)
    }

    async fn dispatch(
        &self,
        context: Arc<ContextWindow>,
    ) -> Result<(AggregatedResponse, u32), AggregateError> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.aggregator.aggregate(Arc::clone(&context)).await {
                Ok(response) => return Ok((response, attempt)),
                Err(AggregateError::AllProvidersFailed { .. }) if attempt <= self.retry.attempts => {
                    warn!(attempt, backoff_ms = self.retry.backoff.as_millis() as u64, "all providers failed; retrying");
                    tokio::time::sleep(self.retry.backoff).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn extract_topics(&self, context_text: &str) -> TopicSet {
        match &self.topics {
            Some(extractor) => extractor.extract(context_text).await,
            None => TopicSet::new(),
        }
    }
}
