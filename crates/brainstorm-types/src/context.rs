//! Context window types.
//!
//! A `ContextWindow` is the bounded, newest-last slice of the conversation
//! log that gets sent to providers. It is built fresh for every request
//! and never persisted.

use serde::{Deserialize, Serialize};

use crate::llm::MessageRole;

/// Limits applied when building a context window.
///
/// Either limit may be absent; a budget with neither set keeps the whole log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextBudget {
    /// Maximum number of messages in the window.
    #[serde(default)]
    pub max_messages: Option<usize>,
    /// Maximum total characters (Unicode scalar values) across all entries.
    #[serde(default)]
    pub max_chars: Option<usize>,
}

impl ContextBudget {
    pub fn new(max_messages: Option<usize>, max_chars: Option<usize>) -> Self {
        Self {
            max_messages,
            max_chars,
        }
    }

    /// A budget that never truncates.
    pub fn unbounded() -> Self {
        Self::new(None, None)
    }
}

impl Default for ContextBudget {
    fn default() -> Self {
        Self::new(Some(50), Some(12_000))
    }
}

/// One `(role, content)` pair in a context window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextEntry {
    pub role: MessageRole,
    pub content: String,
}

impl ContextEntry {
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    /// Length of the content in characters.
    pub fn char_len(&self) -> usize {
        self.content.chars().count()
    }
}

/// The bounded slice of conversation history sent to a model.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextWindow {
    /// Entries in original order, newest last.
    pub entries: Vec<ContextEntry>,
    /// Set when the newest message alone exceeds the character budget and
    /// was included anyway.
    #[serde(default)]
    pub oversized: bool,
    /// Number of older messages that did not fit.
    #[serde(default)]
    pub dropped: usize,
}

impl ContextWindow {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Total characters across all entries.
    pub fn total_chars(&self) -> usize {
        self.entries.iter().map(ContextEntry::char_len).sum()
    }

    /// The most recent user entry, if any.
    pub fn last_user_entry(&self) -> Option<&ContextEntry> {
        self.entries
            .iter()
            .rev()
            .find(|e| e.role == MessageRole::User)
    }

    /// Render the window as a `role: content` transcript, one entry per line.
    pub fn transcript(&self) -> String {
        self.entries
            .iter()
            .map(|e| format!("{}: {}", e.role, e.content))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
