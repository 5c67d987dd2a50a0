//! Shared test doubles for the core crate.

use std::collections::{HashSet, VecDeque};
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;

use brainstorm_types::context::{ContextEntry, ContextWindow};
use brainstorm_types::error::{ProviderError, StoreError};
use brainstorm_types::llm::{MessageRole, ProviderOptions};
use brainstorm_types::message::{Message, MessageId, NewMessage};
use brainstorm_types::provider::{ProviderId, ProviderRequest};

use crate::llm::ProviderAdapter;
use crate::repository::MessageStore;

#[derive(Debug, Clone)]
pub enum MockReply {
    Text(String),
    Transport(String),
    Status(u16, String),
    Malformed(String),
    Slow(Duration, String),
    Panic,
}

impl MockReply {
    pub fn text(text: &str) -> Self {
        MockReply::Text(text.to_string())
    }
}

/// Provider that replays scripted replies. The last reply repeats.
pub struct MockProvider {
    id: ProviderId,
    display_name: String,
    replies: Mutex<VecDeque<MockReply>>,
    last: MockReply,
    pub calls: Arc<AtomicUsize>,
    pub requests: Arc<Mutex<Vec<ProviderRequest>>>,
}

impl MockProvider {
    pub fn new(id: &str, reply: MockReply) -> Self {
        Self::scripted(id, vec![reply])
    }

    pub fn scripted(id: &str, replies: Vec<MockReply>) -> Self {
        let last = replies.last().cloned().unwrap_or(MockReply::Panic);
        Self {
            id: ProviderId::from(id),
            display_name: id.to_uppercase(),
            replies: Mutex::new(replies.into()),
            last,
            calls: Arc::new(AtomicUsize::new(0)),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl ProviderAdapter for MockProvider {
    fn id(&self) -> &ProviderId {
        &self.id
    }

    fn display_name(&self) -> &str {
        &self.display_name
    }

    fn complete(
        &self,
        request: &ProviderRequest,
    ) -> impl Future<Output = Result<String, ProviderError>> + Send {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());
        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.last.clone());
        async move {
            match reply {
                MockReply::Text(text) => Ok(text),
                MockReply::Transport(msg) => Err(ProviderError::Transport(msg)),
                MockReply::Status(status, body) => Err(ProviderError::HttpStatus { status, body }),
                MockReply::Malformed(msg) => Err(ProviderError::Malformed(msg)),
                MockReply::Slow(delay, text) => {
                    tokio::time::sleep(delay).await;
                    Ok(text)
                }
                MockReply::Panic => panic!("mock provider panicked"),
            }
        }
    }
}

pub fn request_for(id: &str) -> ProviderRequest {
    ProviderRequest {
        provider_id: ProviderId::from(id),
        context: Arc::new(window(&[(MessageRole::User, "idea A")])),
        options: ProviderOptions::default(),
    }
}

pub fn window(entries: &[(MessageRole, &str)]) -> ContextWindow {
    ContextWindow {
        entries: entries
            .iter()
            .map(|(role, content)| ContextEntry::new(*role, *content))
            .collect(),
        oversized: false,
        dropped: 0,
    }
}

/// In-memory store with switchable failures.
#[derive(Default)]
pub struct MockStore {
    messages: Mutex<Vec<Message>>,
    pub fail_appends: AtomicBool,
    pub fail_list: AtomicBool,
    /// Assistant appends tagged with one of these providers fail.
    pub fail_for_providers: Mutex<HashSet<String>>,
    pub append_attempts: AtomicUsize,
}

impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_messages(seed: &[(MessageRole, &str)]) -> Self {
        let store = Self::new();
        {
            let mut messages = store.messages.lock().unwrap();
            for (role, content) in seed {
                let id = MessageId::from((messages.len() + 1).to_string());
                messages.push(Message {
                    id,
                    role: *role,
                    content: content.to_string(),
                    created_at: Utc::now(),
                    provider: None,
                });
            }
        }
        store
    }

    pub fn snapshot(&self) -> Vec<Message> {
        self.messages.lock().unwrap().clone()
    }
}

impl MessageStore for MockStore {
    fn append(
        &self,
        message: &NewMessage,
    ) -> impl Future<Output = Result<MessageId, StoreError>> + Send {
        self.append_attempts.fetch_add(1, Ordering::SeqCst);
        let blocked = message
            .provider
            .as_ref()
            .is_some_and(|p| self.fail_for_providers.lock().unwrap().contains(p.as_str()));
        let result = if self.fail_appends.load(Ordering::SeqCst) || blocked {
            Err(StoreError::Connection("store unavailable".to_string()))
        } else {
            let mut messages = self.messages.lock().unwrap();
            let id = MessageId::from((messages.len() + 1).to_string());
            messages.push(Message {
                id: id.clone(),
                role: message.role,
                content: message.content.clone(),
                created_at: Utc::now(),
                provider: message.provider.clone(),
            });
            Ok(id)
        };
        async move { result }
    }

    fn list_ordered(&self) -> impl Future<Output = Result<Vec<Message>, StoreError>> + Send {
        let result = if self.fail_list.load(Ordering::SeqCst) {
            Err(StoreError::Query("list failed".to_string()))
        } else {
            Ok(self.snapshot())
        };
        async move { result }
    }
}
