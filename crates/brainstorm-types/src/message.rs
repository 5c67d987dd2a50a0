//! Conversation log types for Brainstorm.
//!
//! A `Message` is one row of the append-only conversation log. Rows are
//! immutable once the store has assigned them an id; the core only ever
//! reads the ordered log and appends `NewMessage` values to it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use std::fmt;

pub use crate::llm::MessageRole;
use crate::provider::ProviderId;

/// Opaque, store-assigned message identifier.
///
/// Different stores mint ids differently (UUIDv7, SQLite rowid, Postgres
/// bigserial), so the core never interprets the value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(pub String);

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for MessageId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// A persisted conversation message.
///
/// Stores return messages ordered by ascending `created_at`, ties broken
/// by insertion order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub role: MessageRole,
    pub content: String,
    pub created_at: DateTime<Utc>,
    /// Originating provider for assistant messages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<ProviderId>,
}

/// A message about to be appended to the log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewMessage {
    pub role: MessageRole,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<ProviderId>,
}

impl NewMessage {
    /// A message typed by the user.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
            provider: None,
        }
    }

    /// An accepted provider output, tagged with its provider.
    pub fn assistant(provider: ProviderId, content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
            provider: Some(provider),
        }
    }
}
