//! Type definitions module
//!
//! Conversation messages shared by the supervisor and every worker.

pub mod messages;

// Re-export commonly used types
pub use messages::{Conversation, Message, Role, Transcript};
