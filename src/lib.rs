//! crewloop - a supervised Planner/Coder/Reviewer crew on a local Ollama model
//!
//! # Architecture
//!
//! - **tools**: path confinement, Python sandbox, capabilities, dispatcher
//! - **parser**: structured tool-call extraction from free text
//! - **llm**: oracle trait, Ollama client, scripted oracle
//! - **agent**: worker loop, Supervisor routing, conversation graph

pub mod agent;
pub mod cli;
pub mod config;
pub mod errors;
pub mod llm;
pub mod logging;
pub mod parser;
pub mod prompts;
pub mod repl;
pub mod tools;
pub mod types;

// Re-export commonly used types
pub use agent::{ConversationGraph, ShutdownSignal, TurnOutcome};
pub use errors::{AgentError, Result};
pub use llm::{OllamaClient, Oracle, ScriptedOracle};
