//! Smart context condenser.
//!
//! Produces the annotated context block returned by `/context`: detected
//! domain keywords, a one-line summary, the standing instructions, and the
//! transcript of the window.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use brainstorm_types::config::DEFAULT_SYSTEM_PROMPT;
use brainstorm_types::context::ContextWindow;

/// Words that count as topics when they appear in the conversation.
pub const DOMAIN_VOCABULARY: &[&str] = &[
    "model",
    "token",
    "context",
    "thought",
    "brainstorm",
    "memory",
    "query",
    "response",
    "logic",
    "plan",
    "goal",
    "system",
];

static WORD_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[a-z]{4,}\b").expect("valid regex"));

static SELF_REFERENCE_REGEXES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"as i.*mentioned",
        r"you.*asked",
        r"earlier",
        r"previously",
        r"in the.*conversation",
        r"we.*talked",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid regex"))
    .collect()
});

/// Condensed view of a context window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SmartContext {
    /// Domain keywords found in the window, sorted.
    pub keywords: Vec<String>,
    /// Whether the latest user message refers back to the conversation.
    pub self_reference: bool,
    /// The rendered context block.
    pub text: String,
}

/// Domain keywords present in `text`, de-duplicated and sorted.
pub fn extract_keywords(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    WORD_REGEX
        .find_iter(&lowered)
        .map(|m| m.as_str())
        .filter(|w| DOMAIN_VOCABULARY.contains(w))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(String::from)
        .collect()
}

/// Whether `text` refers back to earlier parts of the conversation.
pub fn detect_self_reference(text: &str) -> bool {
    let lowered = text.to_lowercase();
    SELF_REFERENCE_REGEXES.iter().any(|re| re.is_match(&lowered))
}

/// Render the smart context block for a window.
pub fn build_smart_context(window: &ContextWindow) -> SmartContext {
    let full_text = window
        .entries
        .iter()
        .map(|e| e.content.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    let keywords = extract_keywords(&full_text);
    let self_reference = window
        .last_user_entry()
        .is_some_and(|e| detect_self_reference(&e.content));

    let topic_line = if keywords.is_empty() {
        "Topics: general discussion".to_string()
    } else {
        format!("Topics: {}", keywords.join(", "))
    };

    let roles = window
        .entries
        .iter()
        .map(|e| e.role.to_string())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect::<Vec<_>>();
    let summary = format!(
        "Conversation between {}. Contains {} messages.",
        if roles.is_empty() {
            "nobody".to_string()
        } else {
            roles.join(", ")
        },
        window.len()
    );

    let mut sections = vec![
        "## CONTEXT INTELLIGENCE ENGINE".to_string(),
        topic_line,
        summary,
    ];
    if self_reference {
        sections.push("The latest message refers back to earlier discussion.".to_string());
    }
    sections.push("## INSTRUCTIONS".to_string());
    sections.push(DEFAULT_SYSTEM_PROMPT.to_string());
    sections.push("## CONVERSATION HISTORY".to_string());
    sections.push(window.transcript());

    SmartContext {
        keywords,
        self_reference,
        text: sections.join("\n"),
    }
}
