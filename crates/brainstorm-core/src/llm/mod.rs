//! Provider abstractions for Brainstorm.
//!
//! - `ProviderAdapter`: RPITIT trait for concrete provider implementations
//! - `BoxProvider`: object-safe wrapper that also applies deadlines and
//!   failure classification

pub mod box_provider;
pub mod provider;

pub use box_provider::{BoxProvider, Deadline};
pub use provider::ProviderAdapter;
