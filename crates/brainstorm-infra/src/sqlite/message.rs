//! SQLite message store implementation.
//!
//! Implements `MessageStore` from `brainstorm-core` using sqlx with split
//! read/write pools: raw queries, a private row struct, appends on the
//! writer and reads on the reader.

use brainstorm_core::repository::MessageStore;
use brainstorm_types::error::StoreError;
use brainstorm_types::message::{Message, MessageId, MessageRole, NewMessage};
use brainstorm_types::provider::ProviderId;
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::Row;

use super::pool::DatabasePool;

/// SQLite-backed implementation of `MessageStore`.
pub struct SqliteMessageStore {
    pool: DatabasePool,
}

impl SqliteMessageStore {
    /// Create a new store backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

/// Internal row type for mapping SQLite rows to domain `Message`.
struct MessageRow {
    id: i64,
    role: String,
    content: String,
    provider: Option<String>,
    created_at: String,
}

impl MessageRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            role: row.try_get("role")?,
            content: row.try_get("content")?,
            provider: row.try_get("provider")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn into_message(self) -> Result<Message, StoreError> {
        let role: MessageRole = self.role.parse().map_err(StoreError::Decode)?;
        Ok(Message {
            id: MessageId::from(self.id.to_string()),
            role,
            content: self.content,
            created_at: parse_datetime(&self.created_at)?,
            provider: self.provider.map(ProviderId::from),
        })
    }
}

fn parse_datetime(s: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StoreError::Decode(format!("invalid datetime: {e}")))
}

/// Fixed-width RFC 3339 so lexical order matches time order.
fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

impl MessageStore for SqliteMessageStore {
    async fn append(&self, message: &NewMessage) -> Result<MessageId, StoreError> {
        let result = sqlx::query(
            "INSERT INTO messages (role, content, provider, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(message.role.to_string())
        .bind(&message.content)
        .bind(message.provider.as_ref().map(|p| p.as_str()))
        .bind(format_datetime(&Utc::now()))
        .execute(&self.pool.writer)
        .await
        .map_err(|e| StoreError::Query(e.to_string()))?;

        Ok(MessageId::from(result.last_insert_rowid().to_string()))
    }

    async fn list_ordered(&self) -> Result<Vec<Message>, StoreError> {
        let rows = sqlx::query(
            "SELECT id, role, content, provider, created_at FROM messages ORDER BY created_at ASC, id ASC",
        )
        .fetch_all(&self.pool.reader)
        .await
        .map_err(|e| StoreError::Query(e.to_string()))?;

        let mut messages = Vec::with_capacity(rows.len());
        for row in &rows {
            let message_row =
                MessageRow::from_row(row).map_err(|e| StoreError::Decode(e.to_string()))?;
            messages.push(message_row.into_message()?);
        }

        Ok(messages)
    }
}
