//! Topic extraction via one designated provider.
//!
//! `TopicExtractor` asks a model for a short JSON array of topics and
//! parses the reply leniently. Extraction is advisory: any failure is
//! logged and yields an empty `TopicSet`.

use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, warn};

use brainstorm_types::config::TopicConfig;
use brainstorm_types::context::{ContextEntry, ContextWindow};
use brainstorm_types::error::TopicParseError;
use brainstorm_types::llm::{MessageRole, ProviderOptions};
use brainstorm_types::provider::ProviderRequest;
use brainstorm_types::topic::TopicSet;

use crate::llm::{BoxProvider, Deadline};

const TOPIC_SYSTEM_PROMPT: &str = r#"You label brainstorming conversations.

Return ONLY a JSON array of short topic labels (one to four words each)
covering what the conversation is about. No prose, no explanations.

Example output:
["product roadmap", "pricing", "user onboarding"]

If the conversation has no clear topic, return an empty array: []"#;

/// Characters stripped from both ends of each topic.
const TOPIC_TRIM_CHARS: &[char] = &['"', '\'', '`', '-', '*', '•', '#', '.', ':'];

#[derive(Debug, Deserialize)]
struct TopicsObject {
    topics: Vec<serde_json::Value>,
}

/// Derives a `TopicSet` from conversation text.
#[derive(Debug, Clone)]
pub struct TopicExtractor {
    provider: Arc<BoxProvider>,
    timeout: Duration,
    max_topics: usize,
    max_topic_chars: usize,
}

impl TopicExtractor {
    pub fn new(provider: Arc<BoxProvider>, config: &TopicConfig, timeout: Duration) -> Self {
        Self {
            provider,
            timeout,
            max_topics: config.max_topics,
            max_topic_chars: config.max_topic_chars,
        }
    }

    pub fn provider(&self) -> &BoxProvider {
        &self.provider
    }

    /// Extract topics from a rendered context.
    ///
    /// Never fails. Blank input returns an empty set without calling the
    /// provider; provider failures and unparseable replies are logged and
    /// also return an empty set.
    #[tracing::instrument(
        name = "extract_topics",
        skip_all,
        fields(provider = %self.provider.id(), context_chars = context_text.len())
    )]
    pub async fn extract(&self, context_text: &str) -> TopicSet {
        if context_text.trim().is_empty() {
            return TopicSet::new();
        }

        let request = ProviderRequest {
            provider_id: self.provider.id().clone(),
            context: Arc::new(ContextWindow {
                entries: vec![ContextEntry::new(
                    MessageRole::User,
                    format!("Conversation:\n{context_text}\n\nTopics as a JSON array:"),
                )],
                oversized: false,
                dropped: 0,
            }),
            options: ProviderOptions {
                system: Some(TOPIC_SYSTEM_PROMPT.to_string()),
                max_tokens: 128,
                temperature: Some(0.0),
            },
        };

        let result = self
            .provider
            .invoke(&request, Deadline::after(self.timeout))
            .await;

        let Some(raw) = result.text() else {
            warn!(status = %result.status(), "topic extraction call failed; returning no topics");
            return TopicSet::new();
        };

        match parse_topics(raw) {
            Ok(candidates) => {
                let topics = normalize_topics(candidates, self.max_topics, self.max_topic_chars);
                debug!(count = topics.len(), "topics extracted");
                topics
            }
            Err(e) => {
                warn!(
                    error = %e,
                    content_preview = %raw.chars().take(200).collect::<String>(),
                    "failed to parse topic list; returning no topics"
                );
                TopicSet::new()
            }
        }
    }
}

/// Recover a list of candidate topics from model output.
///
/// Accepts, in order: a bare JSON array, a `{"topics": [...]}` object, or
/// the first parseable `[...]` span embedded in prose or a code fence.
/// Non-string array items are ignored.
pub fn parse_topics(raw: &str) -> Result<Vec<String>, TopicParseError> {
    let trimmed = raw.trim();

    if let Ok(items) = serde_json::from_str::<Vec<serde_json::Value>>(trimmed) {
        return Ok(strings_only(items));
    }
    if let Ok(object) = serde_json::from_str::<TopicsObject>(trimmed) {
        return Ok(strings_only(object.topics));
    }

    let start = trimmed.find('[').ok_or(TopicParseError::NoList)?;
    let mut last_error = None;
    for (offset, _) in trimmed[start..].match_indices(']') {
        let candidate = &trimmed[start..=start + offset];
        match serde_json::from_str::<Vec<serde_json::Value>>(candidate) {
            Ok(items) => return Ok(strings_only(items)),
            Err(e) => last_error = Some(e),
        }
    }

    Err(match last_error {
        Some(e) => TopicParseError::InvalidJson(e.to_string()),
        None => TopicParseError::NoList,
    })
}

fn strings_only(items: Vec<serde_json::Value>) -> Vec<String> {
    items
        .into_iter()
        .filter_map(|v| match v {
            serde_json::Value::String(s) => Some(s),
            _ => None,
        })
        .collect()
}

/// Clean, lowercase, de-duplicate and cap a list of candidate topics.
pub fn normalize_topics(candidates: Vec<String>, max_topics: usize, max_chars: usize) -> TopicSet {
    let mut topics = TopicSet::new();
    for candidate in candidates {
        if topics.len() >= max_topics {
            break;
        }
        let cleaned = candidate
            .trim()
            .trim_matches(TOPIC_TRIM_CHARS)
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase();
        let capped: String = cleaned.chars().take(max_chars).collect();
        let capped = capped.trim_end();
        if !capped.is_empty() {
            topics.insert(capped);
        }
    }
    topics
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockProvider, MockReply};
    use std::sync::atomic::Ordering;

    fn extractor(reply: MockReply) -> (TopicExtractor, Arc<std::sync::atomic::AtomicUsize>) {
        let mock = MockProvider::new("groq", reply);
        let calls = Arc::clone(&mock.calls);
        let extractor = TopicExtractor::new(
            Arc::new(BoxProvider::new(mock)),
            &TopicConfig::default(),
            Duration::from_secs(5),
        );
        (extractor, calls)
    }

    #[test]
    fn test_parse_bare_array() {
        assert_eq!(
            parse_topics(r#"["pricing", "roadmap"]"#).unwrap(),
            vec!["pricing", "roadmap"]
        );
    }

    #[test]
    fn test_parse_topics_object() {
        assert_eq!(
            parse_topics(r#"{"topics": ["memory", 3, "plan"]}"#).unwrap(),
            vec!["memory", "plan"]
        );
    }

    #[test]
    fn test_parse_array_inside_code_fence() {
        let raw = "Sure! Here you go:\n```json\n[\"ideas [draft]\", \"goals\"]\n```\nHope that helps.";
        assert_eq!(parse_topics(raw).unwrap(), vec!["ideas [draft]", "goals"]);
    }

    #[test]
    fn test_parse_without_list_fails() {
        assert!(matches!(
            parse_topics("I think it is about pricing."),
            Err(TopicParseError::NoList)
        ));
        assert!(matches!(
            parse_topics("topics: [pricing, roadmap]"),
            Err(TopicParseError::InvalidJson(_))
        ));
    }

    #[test]
    fn test_normalize_cleans_and_deduplicates() {
        let topics = normalize_topics(
            vec![
                "  - Pricing ".to_string(),
                "\"pricing\"".to_string(),
                "User   Onboarding".to_string(),
                "   ".to_string(),
            ],
            8,
            48,
        );
        assert_eq!(topics.iter().collect::<Vec<_>>(), vec!["pricing", "user onboarding"]);
    }

    #[test]
    fn test_normalize_caps_count_and_length() {
        let topics = normalize_topics(
            vec!["a".into(), "b".into(), "c".into(), "a very long topic label".into()],
            2,
            6,
        );
        assert_eq!(topics.len(), 2);

        let long = normalize_topics(vec!["a very long topic label".into()], 8, 6);
        assert!(long.contains("a very"));
    }

    #[tokio::test]
    async fn test_extract_returns_topics() {
        let (extractor, _) = extractor(MockReply::text(r#"["Roadmap", "pricing"]"#));
        let topics = extractor.extract("user: let's talk pricing").await;
        assert!(topics.contains("roadmap"));
        assert!(topics.contains("pricing"));
    }

    #[tokio::test]
    async fn test_extract_malformed_output_is_empty() {
        let (extractor, _) = extractor(MockReply::text("no idea, sorry"));
        assert!(extractor.extract("user: idea A").await.is_empty());
    }

    #[tokio::test]
    async fn test_extract_provider_failure_is_empty() {
        let (extractor, _) = extractor(MockReply::Status(401, "unauthorized".to_string()));
        assert!(extractor.extract("user: idea A").await.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_extract_timeout_is_empty() {
        let (extractor, _) = extractor(MockReply::Slow(
            Duration::from_secs(60),
            r#"["late"]"#.to_string(),
        ));
        assert!(extractor.extract("user: idea A").await.is_empty());
    }

    #[tokio::test]
    async fn test_extract_blank_context_skips_provider() {
        let (extractor, calls) = extractor(MockReply::text(r#"["x"]"#));
        assert!(extractor.extract("  \n").await.is_empty());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_extract_is_idempotent_with_deterministic_stub() {
        let (extractor, _) = extractor(MockReply::text(r#"["b", "a", "b"]"#));
        let first = extractor.extract("user: same input").await;
        let second = extractor.extract("user: same input").await;
        assert_eq!(first, second);
        assert_eq!(first.iter().collect::<Vec<_>>(), vec!["a", "b"]);
    }
}
