//! Language model access
//!
//! Provides the [`Oracle`] trait plus:
//! - [`OllamaClient`]: `/api/chat` over HTTP with bounded retry
//! - [`ScriptedOracle`]: canned replies for tests and demos

pub mod client;
pub mod oracle;
pub mod retry;
pub mod scripted;

pub use client::{OllamaClient, OllamaOptions};
pub use oracle::{Oracle, SharedOracle};
pub use retry::RetryManager;
pub use scripted::ScriptedOracle;
