//! Repository trait definitions (ports).
//!
//! These traits define the storage interface that the infrastructure layer
//! (brainstorm-infra) implements. The core crate never depends on any
//! specific storage technology.

pub mod message;

pub use message::MessageStore;
