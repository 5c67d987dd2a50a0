//! Context window construction.
//!
//! `build` turns the full ordered log into the bounded window sent to
//! providers. It keeps the longest suffix of the log that fits the budget,
//! walking newest to oldest and stopping at the first message that does
//! not fit.

use brainstorm_types::context::{ContextBudget, ContextEntry, ContextWindow};
use brainstorm_types::llm::MessageRole;
use brainstorm_types::message::Message;

/// Anything that can be placed in a context window.
pub trait ContextSource {
    fn role(&self) -> MessageRole;
    fn content(&self) -> &str;
}

impl ContextSource for Message {
    fn role(&self) -> MessageRole {
        self.role
    }

    fn content(&self) -> &str {
        &self.content
    }
}

impl ContextSource for ContextEntry {
    fn role(&self) -> MessageRole {
        self.role
    }

    fn content(&self) -> &str {
        &self.content
    }
}

/// Build a context window from an ordered log (oldest first).
///
/// The newest message is always included. If it alone exceeds
/// `max_chars`, it is kept on its own and the window is flagged `oversized`.
pub fn build<T: ContextSource>(messages: &[T], budget: &ContextBudget) -> ContextWindow {
    let mut kept = 0usize;
    let mut chars = 0usize;
    let mut oversized = false;

    for message in messages.iter().rev() {
        if budget.max_messages.is_some_and(|max| kept >= max.max(1)) {
            break;
        }

        let len = message.content().chars().count();
        if let Some(max_chars) = budget.max_chars {
            if chars + len > max_chars {
                if kept == 0 {
                    oversized = true;
                    kept = 1;
                }
                break;
            }
        }

        kept += 1;
        chars += len;
    }

    let start = messages.len() - kept;
    ContextWindow {
        entries: messages[start..]
            .iter()
            .map(|m| ContextEntry::new(m.role(), m.content()))
            .collect(),
        oversized,
        dropped: start,
    }
}
