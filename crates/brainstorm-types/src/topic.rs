//! Topic set derived from a conversation context.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Short topic labels for a context. Advisory only, never persisted.
///
/// Backed by a `BTreeSet` so iteration order (and therefore serialized
/// output) is deterministic for the same input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TopicSet(BTreeSet<String>);

impl TopicSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a topic. Returns `false` if it was already present.
    pub fn insert(&mut self, topic: impl Into<String>) -> bool {
        self.0.insert(topic.into())
    }

    pub fn contains(&self, topic: &str) -> bool {
        self.0.contains(topic)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl FromIterator<String> for TopicSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
