//! Configuration types for Brainstorm.
//!
//! `AppConfig` represents the top-level `config.toml`. It is loaded once at
//! startup and handed to the services that need it; nothing reads
//! configuration from process-wide state after that.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::context::ContextBudget;
use crate::error::ConfigError;
use crate::llm::{ProviderKind, ProviderOptions};

/// Default instruction block sent with every dispatch.
pub const DEFAULT_SYSTEM_PROMPT: &str = "Respond with insight, not repetition.\n\
If referencing past messages, keep it concise.\n\
Stay on topic. Use the user's voice and goals.\n\
Be concise, logical, forward-thinking.";

/// Top-level configuration. Every section has sensible defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub context: ContextConfig,
    #[serde(default)]
    pub dispatch: DispatchConfig,
    #[serde(default)]
    pub topics: TopicConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default = "default_providers")]
    pub providers: Vec<ProviderConfig>,
}

impl AppConfig {
    /// Providers that are switched on, in declared order.
    pub fn enabled_providers(&self) -> impl Iterator<Item = &ProviderConfig> {
        self.providers.iter().filter(|p| p.enabled)
    }

    /// Reject configurations the service cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.enabled_providers().next().is_none() {
            return Err(ConfigError::Invalid(
                "at least one enabled provider is required".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for provider in &self.providers {
            if provider.name.trim().is_empty() {
                return Err(ConfigError::Invalid("provider name must not be empty".to_string()));
            }
            if !seen.insert(provider.name.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate provider name '{}'",
                    provider.name
                )));
            }
        }

        if self.context.max_messages == Some(0) {
            return Err(ConfigError::Invalid("context.max_messages must be > 0".to_string()));
        }

        if self.dispatch.timeout_ms == 0 {
            return Err(ConfigError::Invalid("dispatch.timeout_ms must be > 0".to_string()));
        }

        if self.topics.enabled
            && !self
                .enabled_providers()
                .any(|p| p.name == self.topics.provider)
        {
            return Err(ConfigError::Invalid(format!(
                "topics.provider '{}' is not an enabled provider",
                self.topics.provider
            )));
        }

        if self.store.backend == StoreBackend::Supabase && self.store.supabase_url.is_none() {
            return Err(ConfigError::Invalid(
                "store.supabase_url is required for the supabase backend".to_string(),
            ));
        }

        Ok(())
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// CORS origins. Empty allows any origin.
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            allowed_origins: Vec::new(),
        }
    }
}

/// Context window budget.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextConfig {
    #[serde(default = "default_max_messages")]
    pub max_messages: Option<usize>,
    #[serde(default = "default_max_chars")]
    pub max_chars: Option<usize>,
}

fn default_max_messages() -> Option<usize> {
    Some(50)
}

fn default_max_chars() -> Option<usize> {
    Some(12_000)
}

impl ContextConfig {
    pub fn budget(&self) -> ContextBudget {
        ContextBudget::new(self.max_messages, self.max_chars)
    }
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            max_messages: default_max_messages(),
            max_chars: default_max_chars(),
        }
    }
}

/// Fan-out settings shared by every provider call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchConfig {
    /// Shared deadline for one fan-out, in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: Option<f64>,
    #[serde(default = "default_system_prompt")]
    pub system_prompt: Option<String>,
    /// Extra dispatch attempts after an all-providers-failed fan-out.
    #[serde(default)]
    pub retry_attempts: u32,
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
}

fn default_timeout_ms() -> u64 {
    30_000
}

fn default_max_tokens() -> u32 {
    512
}

fn default_temperature() -> Option<f64> {
    Some(0.7)
}

fn default_system_prompt() -> Option<String> {
    Some(DEFAULT_SYSTEM_PROMPT.to_string())
}

fn default_retry_backoff_ms() -> u64 {
    500
}

impl DispatchConfig {
    pub fn options(&self) -> ProviderOptions {
        ProviderOptions {
            system: self.system_prompt.clone(),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        }
    }
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            system_prompt: default_system_prompt(),
            retry_attempts: 0,
            retry_backoff_ms: default_retry_backoff_ms(),
        }
    }
}

/// Topic extraction settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Name of the provider used for extraction.
    #[serde(default = "default_topic_provider")]
    pub provider: String,
    #[serde(default = "default_max_topics")]
    pub max_topics: usize,
    #[serde(default = "default_max_topic_chars")]
    pub max_topic_chars: usize,
}

fn default_true() -> bool {
    true
}

fn default_topic_provider() -> String {
    "groq".to_string()
}

fn default_max_topics() -> usize {
    8
}

fn default_max_topic_chars() -> usize {
    48
}

impl Default for TopicConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            provider: default_topic_provider(),
            max_topics: default_max_topics(),
            max_topic_chars: default_max_topic_chars(),
        }
    }
}

/// Which message store implementation to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Memory,
    Sqlite,
    Supabase,
}

/// Message store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackend,
    /// SQLite database file (defaults to `{data_dir}/brainstorm.db`).
    #[serde(default)]
    pub sqlite_path: Option<String>,
    /// Base project URL, e.g. `https://xyz.supabase.co`.
    #[serde(default)]
    pub supabase_url: Option<String>,
    /// Environment variable holding the Supabase API key.
    #[serde(default = "default_supabase_key_env")]
    pub supabase_key_env: String,
    #[serde(default = "default_table")]
    pub table: String,
    /// Whether the Supabase table has a `provider` column. Tables without it
    /// store assistant rows untagged.
    #[serde(default = "default_true")]
    pub supabase_provider_column: bool,
}

fn default_supabase_key_env() -> String {
    "SUPABASE_KEY".to_string()
}

fn default_table() -> String {
    "messages".to_string()
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Memory,
            sqlite_path: None,
            supabase_url: None,
            supabase_key_env: default_supabase_key_env(),
            table: default_table(),
            supabase_provider_column: true,
        }
    }
}

/// Configuration for a single provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Stable identifier, used for tagging persisted messages.
    pub name: String,
    /// Label shown to users (e.g. "Hugging Face"). Defaults to `name`.
    #[serde(default)]
    pub display_name: Option<String>,
    pub kind: ProviderKind,
    pub model: String,
    /// Override the provider's default base URL.
    #[serde(default)]
    pub base_url: Option<String>,
    /// Environment variable holding the API key.
    #[serde(default)]
    pub api_key_env: Option<String>,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl ProviderConfig {
    pub fn label(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.name)
    }
}

fn default_providers() -> Vec<ProviderConfig> {
    vec![
        ProviderConfig {
            name: "huggingface".to_string(),
            display_name: Some("Hugging Face".to_string()),
            kind: ProviderKind::HuggingFace,
            model: "gpt2".to_string(),
            base_url: None,
            api_key_env: Some("HF_API_KEY".to_string()),
            enabled: true,
        },
        ProviderConfig {
            name: "groq".to_string(),
            display_name: Some("Groq".to_string()),
            kind: ProviderKind::OpenAiCompatible,
            model: "llama3-8b-8192".to_string(),
            base_url: Some("https://api.groq.com/openai/v1".to_string()),
            api_key_env: Some("GROQ_API_KEY".to_string()),
            enabled: true,
        },
    ]
}
