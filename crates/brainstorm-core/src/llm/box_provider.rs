//! BoxProvider -- object-safe dynamic dispatch wrapper for ProviderAdapter.
//!
//! 1. Define an object-safe `ProviderAdapterDyn` trait with boxed futures
//! 2. Blanket-impl `ProviderAdapterDyn` for all `T: ProviderAdapter`
//! 3. `BoxProvider` wraps `Box<dyn ProviderAdapterDyn>` and delegates

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use tokio::time::Instant;
use tracing::debug;

use brainstorm_types::error::ProviderError;
use brainstorm_types::provider::{ProviderId, ProviderRequest, ProviderResult};

use super::provider::ProviderAdapter;

/// Object-safe version of [`ProviderAdapter`] with boxed futures.
///
/// A blanket implementation is provided for all types implementing `ProviderAdapter`.
pub trait ProviderAdapterDyn: Send + Sync {
    fn id(&self) -> &ProviderId;

    fn display_name(&self) -> &str;

    fn complete_boxed<'a>(
        &'a self,
        request: &'a ProviderRequest,
    ) -> Pin<Box<dyn Future<Output = Result<String, ProviderError>> + Send + 'a>>;
}

impl<T: ProviderAdapter> ProviderAdapterDyn for T {
    fn id(&self) -> &ProviderId {
        ProviderAdapter::id(self)
    }

    fn display_name(&self) -> &str {
        ProviderAdapter::display_name(self)
    }

    fn complete_boxed<'a>(
        &'a self,
        request: &'a ProviderRequest,
    ) -> Pin<Box<dyn Future<Output = Result<String, ProviderError>> + Send + 'a>> {
        Box::pin(self.complete(request))
    }
}

/// A point in time by which an invocation must settle.
///
/// One deadline is shared by every invocation of a fan-out, so a slow
/// provider cannot extend the budget of the others.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    at: Instant,
    timeout: Duration,
}

impl Deadline {
    /// A deadline `timeout` from now.
    pub fn after(timeout: Duration) -> Self {
        Self {
            at: Instant::now() + timeout,
            timeout,
        }
    }

    pub fn at(&self) -> Instant {
        self.at
    }

    pub fn timeout_ms(&self) -> u64 {
        self.timeout.as_millis() as u64
    }
}

/// Type-erased provider adapter for runtime provider selection.
///
/// Since `ProviderAdapter` uses RPITIT, it cannot be used as a trait object
/// directly. `BoxProvider` provides equivalent methods that delegate to the
/// inner `ProviderAdapterDyn` trait object.
pub struct BoxProvider {
    inner: Box<dyn ProviderAdapterDyn + Send + Sync>,
}

impl BoxProvider {
    /// Wrap a concrete `ProviderAdapter` in a type-erased box.
    pub fn new<T: ProviderAdapter + 'static>(provider: T) -> Self {
        Self {
            inner: Box::new(provider),
        }
    }

    pub fn id(&self) -> &ProviderId {
        self.inner.id()
    }

    pub fn display_name(&self) -> &str {
        self.inner.display_name()
    }

    /// Send the request and return the raw adapter result.
    pub async fn complete(&self, request: &ProviderRequest) -> Result<String, ProviderError> {
        self.inner.complete_boxed(request).await
    }

    /// Run one invocation to completion and settle it into a `ProviderResult`.
    ///
    /// Never fails: adapter errors become `error(kind, detail)`, blank text
    /// becomes `error(empty_response)`, and reaching the deadline drops the
    /// in-flight call and yields `timeout`.
    pub async fn invoke(&self, request: &ProviderRequest, deadline: Deadline) -> ProviderResult {
        let started = Instant::now();
        let settled = tokio::time::timeout_at(deadline.at(), self.complete(request)).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;
        let id = self.id().clone();

        let result = match settled {
            Ok(Ok(text)) if text.trim().is_empty() => {
                let err = ProviderError::Empty;
                ProviderResult::error(id, err.kind(), err.to_string(), elapsed_ms)
            }
            Ok(Ok(text)) => ProviderResult::ok(id, text, elapsed_ms),
            Ok(Err(err)) => ProviderResult::error(id, err.kind(), err.to_string(), elapsed_ms),
            Err(_) => ProviderResult::timeout(id, deadline.timeout_ms(), elapsed_ms),
        };

        debug!(
            provider = %result.provider_id,
            status = %result.status(),
            elapsed_ms,
            "provider invocation settled"
        );
        result
    }
}

impl std::fmt::Debug for BoxProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoxProvider")
            .field("id", self.id())
            .field("display_name", &self.display_name())
            .finish()
    }
}
