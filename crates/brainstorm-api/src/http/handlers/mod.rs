//! HTTP request handlers.

pub mod ai;
pub mod context;
pub mod health;
pub mod messages;
pub mod save;

use serde::Deserialize;

use brainstorm_types::context::ContextEntry;

use crate::http::error::AppError;

/// Request body carrying a caller-owned conversation.
#[derive(Debug, Deserialize)]
pub struct MessagesRequest {
    pub messages: Vec<ContextEntry>,
}

impl MessagesRequest {
    /// The messages, or a validation error when there are none.
    fn into_entries(self) -> Result<Vec<ContextEntry>, AppError> {
        if self.messages.is_empty() {
            return Err(AppError::Validation("messages must not be empty".to_string()));
        }
        Ok(self.messages)
    }
}
