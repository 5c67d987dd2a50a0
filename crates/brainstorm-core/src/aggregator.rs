//! Response aggregation across providers.
//!
//! `aggregate` dispatches one request per provider as a spawned task,
//! bounds every task by a single shared deadline, and waits for all of them
//! to settle before reconciling the results in declared provider order.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinSet;
use tokio::time::Instant;
use tracing::{info, warn};

use brainstorm_types::context::ContextWindow;
use brainstorm_types::error::AggregateError;
use brainstorm_types::llm::ProviderOptions;
use brainstorm_types::provider::{
    AcceptedOutput, AggregatedResponse, ProviderErrorKind, ProviderId, ProviderRequest,
    ProviderResult,
};

use crate::llm::{BoxProvider, Deadline};

/// A fixed set of providers plus the options and timeout used to call them.
#[derive(Debug, Clone)]
pub struct ResponseAggregator {
    providers: Vec<Arc<BoxProvider>>,
    options: ProviderOptions,
    timeout: Duration,
}

impl ResponseAggregator {
    pub fn new(providers: Vec<Arc<BoxProvider>>, options: ProviderOptions, timeout: Duration) -> Self {
        Self {
            providers,
            options,
            timeout,
        }
    }

    /// Providers in declared order.
    pub fn providers(&self) -> &[Arc<BoxProvider>] {
        &self.providers
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Display name for a provider id, if it belongs to this aggregator.
    pub fn display_name(&self, id: &ProviderId) -> Option<&str> {
        self.providers
            .iter()
            .find(|p| p.id() == id)
            .map(|p| p.display_name())
    }

    pub async fn aggregate(
        &self,
        context: Arc<ContextWindow>,
    ) -> Result<AggregatedResponse, AggregateError> {
        aggregate(context, &self.providers, &self.options, self.timeout).await
    }
}

/// Fan a context window out to every provider and reconcile the results.
///
/// `results` holds exactly one entry per provider, in the order given. Fails
/// with `AllProvidersFailed` when no provider produced usable text, and with
/// `EmptyContext` (without dispatching) when the window is empty.
#[tracing::instrument(
    name = "aggregate",
    skip_all,
    fields(providers = providers.len(), entries = context.len(), timeout_ms = timeout.as_millis() as u64)
)]
pub async fn aggregate(
    context: Arc<ContextWindow>,
    providers: &[Arc<BoxProvider>],
    options: &ProviderOptions,
    timeout: Duration,
) -> Result<AggregatedResponse, AggregateError> {
    if context.is_empty() {
        return Err(AggregateError::EmptyContext);
    }

    let started = Instant::now();
    let deadline = Deadline::after(timeout);
    let mut set: JoinSet<ProviderResult> = JoinSet::new();
    let mut slots_by_task = HashMap::with_capacity(providers.len());

    for (index, provider) in providers.iter().enumerate() {
        let provider = Arc::clone(provider);
        let request = ProviderRequest {
            provider_id: provider.id().clone(),
            context: Arc::clone(&context),
            options: options.clone(),
        };
        let handle = set.spawn(async move { provider.invoke(&request, deadline).await });
        slots_by_task.insert(handle.id(), index);
    }

    let mut slots: Vec<Option<ProviderResult>> = vec![None; providers.len()];
    while let Some(joined) = set.join_next_with_id().await {
        match joined {
            Ok((task_id, result)) => {
                if let Some(&index) = slots_by_task.get(&task_id) {
                    slots[index] = Some(result);
                }
            }
            Err(join_error) => {
                let Some(&index) = slots_by_task.get(&join_error.id()) else {
                    continue;
                };
                let provider_id = providers[index].id().clone();
                warn!(provider = %provider_id, error = %join_error, "provider task failed");
                slots[index] = Some(ProviderResult::error(
                    provider_id,
                    ProviderErrorKind::TaskFailed,
                    format!("provider task failed: {join_error}"),
                    started.elapsed().as_millis() as u64,
                ));
            }
        }
    }

    let results: Vec<ProviderResult> = slots
        .into_iter()
        .zip(providers)
        .map(|(slot, provider)| {
            slot.unwrap_or_else(|| {
                ProviderResult::error(
                    provider.id().clone(),
                    ProviderErrorKind::TaskFailed,
                    "provider task did not report a result",
                    started.elapsed().as_millis() as u64,
                )
            })
        })
        .collect();

    let accepted: Vec<AcceptedOutput> = results
        .iter()
        .filter_map(|r| {
            r.accepted_text().map(|text| AcceptedOutput {
                provider_id: r.provider_id.clone(),
                content: text.to_string(),
            })
        })
        .collect();

    if accepted.is_empty() {
        warn!(providers = results.len(), "all providers failed");
        return Err(AggregateError::AllProvidersFailed { results });
    }

    info!(
        accepted = accepted.len(),
        failed = results.len() - accepted.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "aggregation complete"
    );

    Ok(AggregatedResponse { results, accepted })
}
