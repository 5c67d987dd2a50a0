//! Business logic and port definitions for Brainstorm.
//!
//! This crate defines the "ports" (the `MessageStore` and `ProviderAdapter`
//! traits) that the infrastructure layer implements, plus the context
//! builder, response aggregator, topic extractor and orchestrator. It
//! depends only on `brainstorm-types` -- never on `brainstorm-infra` or any
//! database/HTTP crate.

pub mod aggregator;
pub mod context;
pub mod llm;
pub mod orchestrator;
pub mod repository;
pub mod topic;

#[cfg(test)]
mod testing;
