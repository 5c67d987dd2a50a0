//! Shared domain types for Brainstorm.
//!
//! This crate contains the domain types used across the Brainstorm service:
//! conversation messages, context windows, provider requests and results,
//! aggregated responses, topics, configuration, and their error types.
//!
//! Zero infrastructure dependencies -- only serde, chrono, thiserror.

pub mod config;
pub mod context;
pub mod error;
pub mod llm;
pub mod message;
pub mod provider;
pub mod topic;
