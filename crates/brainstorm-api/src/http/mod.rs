//! HTTP API layer for Brainstorm.
//!
//! Axum router with CORS and request tracing. Error bodies use the
//! `{"error": CODE, "detail": message}` shape.

pub mod error;
pub mod handlers;
pub mod response;
pub mod router;

#[cfg(test)]
pub(crate) mod test_support;
