//! Capability registry with JSON schemas
//!
//! The crew's tools form a closed set. Each [`Capability`] knows its wire
//! name, description and argument schema; role allow-lists decide which
//! worker may call what.
//!
//! Tools:
//! - file_read: Read a workspace file
//! - file_write: Write a workspace file, creating directories
//! - list_directory: List a workspace directory
//! - run_python: Run sandbox-checked Python in the workspace
//! - web_search: Search the web
//! - run_linter: Lint workspace code with ruff

use crate::tools::types::ToolSchema;
use serde_json::json;
use std::collections::BTreeMap;
use std::fmt;

/// A named, side-effecting operation exposed to workers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Capability {
    FileRead,
    FileWrite,
    ListDirectory,
    RunPython,
    WebSearch,
    RunLinter,
}

impl Capability {
    /// Every capability, in catalogue order
    pub const ALL: [Capability; 6] = [
        Capability::FileRead,
        Capability::FileWrite,
        Capability::ListDirectory,
        Capability::RunPython,
        Capability::WebSearch,
        Capability::RunLinter,
    ];

    /// Name used in the structured-call wire format
    pub fn name(&self) -> &'static str {
        match self {
            Capability::FileRead => "file_read",
            Capability::FileWrite => "file_write",
            Capability::ListDirectory => "list_directory",
            Capability::RunPython => "run_python",
            Capability::WebSearch => "web_search",
            Capability::RunLinter => "run_linter",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Capability::FileRead => "Read the contents of a file in the workspace.",
            Capability::FileWrite => {
                "Write content to a file in the workspace. Missing directories are created."
            }
            Capability::ListDirectory => "List files and directories in the workspace.",
            Capability::RunPython => {
                "Run pure Python code inside the workspace. Imports of os, sys, subprocess and \
                 similar modules are blocked, as are eval/exec/open/input. Not a shell."
            }
            Capability::WebSearch => "Search the web and return the top result snippets.",
            Capability::RunLinter => "Lint a file or directory with ruff.",
        }
    }

    /// Argument schema
    pub fn schema(&self) -> ToolSchema {
        let parameters = match self {
            Capability::FileRead => json!({
                "type": "object",
                "properties": {
                    "file_path": {
                        "type": "string",
                        "description": "File path relative to the workspace"
                    }
                },
                "required": ["file_path"]
            }),
            Capability::FileWrite => json!({
                "type": "object",
                "properties": {
                    "file_path": {
                        "type": "string",
                        "description": "File path relative to the workspace"
                    },
                    "content": {
                        "type": "string",
                        "description": "Full file content"
                    }
                },
                "required": ["file_path", "content"]
            }),
            Capability::ListDirectory => json!({
                "type": "object",
                "properties": {
                    "path": {
                        "type": "string",
                        "description": "Directory relative to the workspace",
                        "default": "."
                    }
                }
            }),
            Capability::RunPython => json!({
                "type": "object",
                "properties": {
                    "code": {
                        "type": "string",
                        "description": "Python source to execute"
                    }
                },
                "required": ["code"]
            }),
            Capability::WebSearch => json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "Search query"
                    }
                },
                "required": ["query"]
            }),
            Capability::RunLinter => json!({
                "type": "object",
                "properties": {
                    "file_path": {
                        "type": "string",
                        "description": "File or directory to lint",
                        "default": "."
                    }
                }
            }),
        };

        ToolSchema::new(self.name(), self.description(), parameters)
    }

    /// Catalogue line shown to the model
    pub fn catalogue_line(&self) -> String {
        let schema = self.schema();
        format!(
            "- {}: {} Arguments: {}",
            self.name(),
            self.description(),
            match schema.argument_summary() {
                summary if summary.is_empty() => "none".to_string(),
                summary => summary,
            }
        )
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Name → capability map handed to the dispatcher
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapabilitySet {
    by_name: BTreeMap<&'static str, Capability>,
    order: Vec<Capability>,
}

impl CapabilitySet {
    pub fn new(capabilities: impl IntoIterator<Item = Capability>) -> Self {
        let mut set = Self::default();
        for cap in capabilities {
            if set.by_name.insert(cap.name(), cap).is_none() {
                set.order.push(cap);
            }
        }
        set
    }

    pub fn get(&self, name: &str) -> Option<Capability> {
        self.by_name.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Capabilities in insertion order
    pub fn iter(&self) -> impl Iterator<Item = Capability> + '_ {
        self.order.iter().copied()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.order.iter().map(Capability::name).collect()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Tool catalogue for the worker prompt
    pub fn catalogue(&self) -> String {
        if self.is_empty() {
            return "(no tools available)".to_string();
        }
        self.order
            .iter()
            .map(Capability::catalogue_line)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Planner mostly thinks; it may look things up
pub fn planner_capabilities() -> CapabilitySet {
    CapabilitySet::new([Capability::WebSearch])
}

pub fn coder_capabilities() -> CapabilitySet {
    CapabilitySet::new([
        Capability::FileRead,
        Capability::FileWrite,
        Capability::ListDirectory,
        Capability::RunPython,
        Capability::WebSearch,
        Capability::RunLinter,
    ])
}

pub fn reviewer_capabilities() -> CapabilitySet {
    CapabilitySet::new([Capability::FileRead, Capability::RunPython, Capability::RunLinter])
}
