//! Domain layer of the Codechat client.
//!
//! Holds the types every other crate agrees on: session readiness and file
//! tree, transcript messages, ingestion admission and stages, the remote
//! gateway contract and the shared error type.

pub mod config;
pub mod error;
pub mod gateway;
pub mod ingest;
pub mod notification;
pub mod quick_action;
pub mod session;

// Re-export common error type
pub use error::{CodechatError, Result};
