//! Tool execution system
//!
//! Workspace-confined capabilities for the crew:
//! - Path confinement for every filesystem argument
//! - Static Python sandbox before any code runs
//! - Closed capability set with role allow-lists
//! - Sequential dispatcher that never aborts a turn

pub mod executor;
pub mod implementations;
pub mod registry;
pub mod sandbox;
pub mod security;
pub mod types;

// Re-export commonly used types
pub use executor::{DispatchReport, ToolDispatcher, Toolbox};
pub use registry::{Capability, CapabilitySet};
pub use sandbox::CodeSandboxAnalyzer;
pub use security::PathGuard;
pub use types::{ToolCallRequest, ToolCallResult, ToolContext, ToolSchema};
