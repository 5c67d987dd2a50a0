//! Anthropic Claude provider implementation.
//!
//! This module provides the [`AnthropicProvider`] which implements the
//! [`ProviderAdapter`](brainstorm_core::llm::ProviderAdapter) trait for
//! the Anthropic Messages API.

pub mod client;
pub mod types;

pub use client::AnthropicProvider;
