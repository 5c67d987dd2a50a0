//! In-memory message store.
//!
//! Holds the log in process memory; contents are lost on restart. Used as
//! the default backend and for local experimentation.

use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use brainstorm_core::repository::MessageStore;
use brainstorm_types::error::StoreError;
use brainstorm_types::message::{Message, MessageId, NewMessage};

/// Process-local, append-only message log.
#[derive(Default)]
pub struct InMemoryMessageStore {
    messages: RwLock<Vec<Message>>,
}

impl InMemoryMessageStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MessageStore for InMemoryMessageStore {
    async fn append(&self, message: &NewMessage) -> Result<MessageId, StoreError> {
        let id = MessageId::from(Uuid::now_v7().to_string());
        let mut messages = self.messages.write().await;
        messages.push(Message {
            id: id.clone(),
            role: message.role,
            content: message.content.clone(),
            created_at: Utc::now(),
            provider: message.provider.clone(),
        });
        Ok(id)
    }

    async fn list_ordered(&self) -> Result<Vec<Message>, StoreError> {
        // Appends happen under the write lock, so vector order is insertion order.
        Ok(self.messages.read().await.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brainstorm_types::message::MessageRole;
    use brainstorm_types::provider::ProviderId;

    #[tokio::test]
    async fn test_append_then_list() {
        let store = InMemoryMessageStore::new();
        let a = store.append(&NewMessage::user("idea A")).await.unwrap();
        let b = store
            .append(&NewMessage::assistant(ProviderId::from("hf"), "Expand on A"))
            .await
            .unwrap();

        let log = store.list_ordered().await.unwrap();
        assert_eq!(log.iter().map(|m| m.id.clone()).collect::<Vec<_>>(), vec![a, b]);
        assert_eq!(log[1].role, MessageRole::Assistant);
        assert!(log[0].created_at <= log[1].created_at);
    }

    #[tokio::test]
    async fn test_empty_store() {
        assert!(InMemoryMessageStore::new().list_ordered().await.unwrap().is_empty());
    }
}
