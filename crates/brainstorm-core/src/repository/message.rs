//! MessageStore trait definition.
//!
//! Defines the storage interface for the conversation log. The log is an
//! append-only sequence of messages; the infrastructure layer
//! (brainstorm-infra) implements this trait for the in-memory, SQLite and
//! Supabase backends.

use brainstorm_types::error::StoreError;
use brainstorm_types::message::{Message, MessageId, NewMessage};

/// Append-only conversation log.
///
/// Implementations assign ids and timestamps. `list_ordered` must return
/// messages by ascending `created_at`, ties broken by insertion order.
///
/// Uses native async fn in traits (Rust 2024 edition, no async_trait macro).
pub trait MessageStore: Send + Sync {
    /// Append a message and return the id the store assigned to it.
    fn append(
        &self,
        message: &NewMessage,
    ) -> impl std::future::Future<Output = Result<MessageId, StoreError>> + Send;

    /// The full log, oldest first.
    fn list_ordered(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<Message>, StoreError>> + Send;
}
