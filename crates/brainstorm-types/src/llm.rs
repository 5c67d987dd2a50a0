//! LLM-facing types for Brainstorm.
//!
//! These types model the pieces shared by every provider integration:
//! conversation roles, the provider backend kind, and per-request
//! generation options.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Role of a message in an LLM conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageRole::System => write!(f, "system"),
            MessageRole::User => write!(f, "user"),
            MessageRole::Assistant => write!(f, "assistant"),
        }
    }
}

impl FromStr for MessageRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "system" => Ok(MessageRole::System),
            "user" => Ok(MessageRole::User),
            "assistant" => Ok(MessageRole::Assistant),
            other => Err(format!("invalid message role: '{other}'")),
        }
    }
}

/// Wire protocol spoken by a configured provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    /// Hugging Face Inference API (prompt in, `generated_text` out).
    #[serde(rename = "huggingface")]
    HuggingFace,
    /// Any OpenAI-compatible chat completions endpoint (Groq, OpenAI, ...).
    #[serde(rename = "openai_compatible")]
    OpenAiCompatible,
    /// Anthropic Messages API.
    Anthropic,
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderKind::HuggingFace => write!(f, "huggingface"),
            ProviderKind::OpenAiCompatible => write!(f, "openai_compatible"),
            ProviderKind::Anthropic => write!(f, "anthropic"),
        }
    }
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "huggingface" | "hugging_face" => Ok(ProviderKind::HuggingFace),
            "openai_compatible" => Ok(ProviderKind::OpenAiCompatible),
            "anthropic" => Ok(ProviderKind::Anthropic),
            other => Err(format!("invalid provider kind: '{other}'")),
        }
    }
}

/// Generation options attached to every provider request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderOptions {
    /// Instruction block sent as the system prompt (or prepended for
    /// prompt-only providers).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    pub max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
}

impl Default for ProviderOptions {
    fn default() -> Self {
        Self {
            system: None,
            max_tokens: 512,
            temperature: Some(0.7),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_role_roundtrip() {
        for role in [MessageRole::System, MessageRole::User, MessageRole::Assistant] {
            let s = role.to_string();
            let parsed: MessageRole = s.parse().unwrap();
            assert_eq!(role, parsed);
        }
    }

    #[test]
    fn test_message_role_serde() {
        let role = MessageRole::Assistant;
        let json = serde_json::to_string(&role).unwrap();
        assert_eq!(json, "\"assistant\"");
        let parsed: MessageRole = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, MessageRole::Assistant);
    }

    #[test]
    fn test_message_role_rejects_unknown() {
        let err = "tool".parse::<MessageRole>().unwrap_err();
        assert!(err.contains("tool"));
    }

    #[test]
    fn test_provider_kind_serde() {
        let json = serde_json::to_string(&ProviderKind::HuggingFace).unwrap();
        assert_eq!(json, "\"huggingface\"");
        let parsed: ProviderKind = serde_json::from_str("\"openai_compatible\"").unwrap();
        assert_eq!(parsed, ProviderKind::OpenAiCompatible);
    }

    #[test]
    fn test_provider_kind_roundtrip() {
        for kind in [
            ProviderKind::HuggingFace,
            ProviderKind::OpenAiCompatible,
            ProviderKind::Anthropic,
        ] {
            let parsed: ProviderKind = kind.to_string().parse().unwrap();
            assert_eq!(kind, parsed);
        }
    }

    #[test]
    fn test_provider_options_default() {
        let opts = ProviderOptions::default();
        assert_eq!(opts.max_tokens, 512);
        assert!(opts.system.is_none());
    }
}
