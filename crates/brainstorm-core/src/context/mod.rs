//! Context window building and condensing.

pub mod builder;
pub mod smart;

pub use builder::{ContextSource, build};
pub use smart::{SmartContext, build_smart_context, detect_self_reference, extract_keywords};
