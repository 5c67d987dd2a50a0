//! OpenTelemetry GenAI Semantic Convention attribute names.
//!
//! Provider adapters open one span per outbound request with these
//! attributes so traces line up with other GenAI-instrumented services.
//!
//! Span naming convention: `"{operation} {model}"` is left to the exporter;
//! the span itself is always named `gen_ai.request`.

use tracing::field;

// --- Required attributes ---

/// The name of the operation being performed (e.g., "chat", "text_completion").
pub const GEN_AI_OPERATION_NAME: &str = "gen_ai.operation.name";

/// The name of the GenAI provider (e.g., "huggingface").
pub const GEN_AI_PROVIDER_NAME: &str = "gen_ai.provider.name";

// --- Recommended attributes ---

pub const GEN_AI_REQUEST_MODEL: &str = "gen_ai.request.model";

pub const GEN_AI_REQUEST_TEMPERATURE: &str = "gen_ai.request.temperature";

pub const GEN_AI_REQUEST_MAX_TOKENS: &str = "gen_ai.request.max_tokens";

// --- Operation name values ---

/// Chat-style request with role-tagged messages.
pub const OP_CHAT: &str = "chat";

/// Single-prompt completion request.
pub const OP_TEXT_COMPLETION: &str = "text_completion";

// --- Provider name values ---

pub const PROVIDER_ANTHROPIC: &str = "anthropic";
pub const PROVIDER_HUGGINGFACE: &str = "huggingface";
pub const PROVIDER_OPENAI_COMPATIBLE: &str = "openai_compatible";

/// Span for one outbound provider request.
///
/// `temperature` is left empty when the request does not set one.
pub fn request_span(
    operation: &str,
    provider: &str,
    model: &str,
    max_tokens: u32,
    temperature: Option<f64>,
) -> tracing::Span {
    let span = tracing::info_span!(
        "gen_ai.request",
        { GEN_AI_OPERATION_NAME } = operation,
        { GEN_AI_PROVIDER_NAME } = provider,
        { GEN_AI_REQUEST_MODEL } = model,
        { GEN_AI_REQUEST_MAX_TOKENS } = max_tokens,
        { GEN_AI_REQUEST_TEMPERATURE } = field::Empty,
    );
    if let Some(temperature) = temperature {
        span.record(GEN_AI_REQUEST_TEMPERATURE, temperature);
    }
    span
}
