//! Infrastructure layer for Brainstorm.
//!
//! Contains implementations of the traits defined in `brainstorm-core`:
//! HTTP provider adapters (Hugging Face, OpenAI-compatible, Anthropic),
//! message stores (in-memory, SQLite, Supabase) and config file loading.

pub mod config;
pub mod llm;
pub mod sqlite;
pub mod store;
