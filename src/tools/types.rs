//! Tool execution types and structures
//!
//! Requests extracted from model text, per-call results, and the execution
//! context shared by every capability.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::PathBuf;
use std::time::Duration;

/// A tool invocation requested by the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallRequest {
    /// Tool name as written by the model
    pub name: String,

    /// Argument mapping (empty when the model omitted it)
    pub arguments: Map<String, Value>,

    /// The object carried `args` instead of `arguments`
    #[serde(default)]
    pub misspelled_arguments: bool,
}

impl ToolCallRequest {
    pub fn new(name: impl Into<String>, arguments: Map<String, Value>) -> Self {
        Self {
            name: name.into(),
            arguments,
            misspelled_arguments: false,
        }
    }
}

/// Result of one dispatched request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallResult {
    /// Tool name that was requested
    pub tool: String,

    /// Whether the capability completed
    pub success: bool,

    /// Output text on success, error text otherwise
    pub output: String,

    /// Set when the name did not match any allowed capability
    #[serde(default)]
    pub not_found: bool,
}

impl ToolCallResult {
    pub fn success(tool: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            tool: tool.into(),
            success: true,
            output: output.into(),
            not_found: false,
        }
    }

    pub fn failure(tool: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            tool: tool.into(),
            success: false,
            output: error.into(),
            not_found: false,
        }
    }

    pub fn not_found(tool: impl Into<String>) -> Self {
        Self {
            tool: tool.into(),
            success: false,
            output: String::new(),
            not_found: true,
        }
    }

    /// Render as the single observation line the model will read
    pub fn render(&self) -> String {
        if self.not_found {
            format!("Error: Tool '{}' not found.", self.tool)
        } else if self.success {
            format!("Tool '{}' Output: {}", self.tool, self.output)
        } else {
            format!("Tool '{}' Error: {}", self.tool, self.output)
        }
    }
}

/// Tool execution context with resource bounds
#[derive(Debug, Clone)]
pub struct ToolContext {
    /// Workspace root; subprocesses run here
    pub working_dir: PathBuf,

    /// Wall-clock limit for subprocess tools
    pub timeout: Duration,

    /// Maximum file or response size (bytes)
    pub max_output_size: usize,

    /// Interpreter used by `run_python`
    pub python_bin: String,

    /// Linter used by `run_linter`
    pub linter_bin: String,
}

impl ToolContext {
    pub fn new(working_dir: PathBuf) -> Self {
        Self {
            working_dir,
            timeout: Duration::from_secs(30),
            max_output_size: 2_097_152, // 2MB
            python_bin: "python3".to_string(),
            linter_bin: "ruff".to_string(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_output_size(mut self, size: usize) -> Self {
        self.max_output_size = size;
        self
    }

    pub fn with_python_bin(mut self, bin: impl Into<String>) -> Self {
        self.python_bin = bin.into();
        self
    }

    pub fn with_linter_bin(mut self, bin: impl Into<String>) -> Self {
        self.linter_bin = bin.into();
        self
    }
}

/// Tool schema definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSchema {
    pub name: String,
    pub description: String,
    /// Parameter schema (JSON Schema)
    pub parameters: Value,
}

impl ToolSchema {
    pub fn new(name: impl Into<String>, description: impl Into<String>, parameters: Value) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters,
        }
    }

    /// Comma-separated argument names, required ones first
    pub fn argument_summary(&self) -> String {
        let required: Vec<&str> = self.parameters["required"]
            .as_array()
            .map(|items| items.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default();

        let mut optional: Vec<&str> = self.parameters["properties"]
            .as_object()
            .map(|props| {
                props
                    .keys()
                    .map(String::as_str)
                    .filter(|key| !required.contains(key))
                    .collect()
            })
            .unwrap_or_default();
        optional.sort_unstable();

        required
            .iter()
            .map(|name| name.to_string())
            .chain(optional.iter().map(|name| format!("{} (optional)", name)))
            .collect::<Vec<_>>()
            .join(", ")
    }
}
