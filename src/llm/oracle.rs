//! Oracle interface
//!
//! The crew only ever asks a model one thing: given these messages, what is
//! your next message? Everything above this trait is model-agnostic.

use crate::errors::Result;
use crate::types::Message;
use async_trait::async_trait;
use std::sync::Arc;

/// Opaque text-producing peer
#[async_trait]
pub trait Oracle: Send + Sync {
    /// Produce the next assistant message; failures are `OracleUnavailable`
    async fn invoke(&self, messages: &[Message]) -> Result<Message>;

    /// Label for logs
    fn model(&self) -> &str {
        "unknown"
    }
}

/// Shared oracle handle passed to every node
pub type SharedOracle = Arc<dyn Oracle>;
