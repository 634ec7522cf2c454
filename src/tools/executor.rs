//! Tool dispatch
//!
//! [`Toolbox`] binds a capability's JSON arguments to a typed struct and runs
//! the implementation. [`ToolDispatcher`] walks a turn's requests in order
//! against a worker's allow-list and turns every outcome, good or bad, into a
//! [`ToolCallResult`]. Nothing a tool does can abort the turn.

use crate::errors::{AgentError, Result};
use crate::tools::implementations;
use crate::tools::registry::{Capability, CapabilitySet};
use crate::tools::sandbox::CodeSandboxAnalyzer;
use crate::tools::security::PathGuard;
use crate::tools::types::{ToolCallRequest, ToolCallResult, ToolContext};
use crate::types::Message;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Header of the observation message fed back to the model
pub const OBSERVATION_HEADER: &str = "TOOL OBSERVATION:";

#[derive(Debug, Deserialize)]
struct FileReadArgs {
    file_path: String,
}

#[derive(Debug, Deserialize)]
struct FileWriteArgs {
    file_path: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ListDirectoryArgs {
    #[serde(default = "current_dir")]
    path: String,
}

#[derive(Debug, Deserialize)]
struct RunPythonArgs {
    code: String,
}

#[derive(Debug, Deserialize)]
struct WebSearchArgs {
    query: String,
}

#[derive(Debug, Deserialize)]
struct RunLinterArgs {
    #[serde(default = "current_dir")]
    file_path: String,
}

fn current_dir() -> String {
    ".".to_string()
}

/// Everything a capability needs to run
#[derive(Debug, Clone)]
pub struct Toolbox {
    guard: PathGuard,
    context: ToolContext,
    analyzer: CodeSandboxAnalyzer,
    http: reqwest::Client,
}

impl Toolbox {
    pub fn new(guard: PathGuard, context: ToolContext) -> Self {
        Self {
            guard,
            context,
            analyzer: CodeSandboxAnalyzer::new(),
            http: reqwest::Client::new(),
        }
    }

    /// Toolbox rooted at `context.working_dir`
    pub fn for_workspace(context: ToolContext) -> Result<Self> {
        let guard = PathGuard::new(&context.working_dir)?;
        Ok(Self::new(guard, context))
    }

    /// Bind arguments and run one capability
    pub async fn invoke(&self, capability: Capability, arguments: &Map<String, Value>) -> Result<String> {
        match capability {
            Capability::FileRead => {
                let args: FileReadArgs = bind(capability, arguments)?;
                implementations::file_read(&args.file_path, &self.context, &self.guard).await
            }
            Capability::FileWrite => {
                let args: FileWriteArgs = bind(capability, arguments)?;
                implementations::file_write(&args.file_path, &args.content, &self.context, &self.guard)
                    .await
            }
            Capability::ListDirectory => {
                let args: ListDirectoryArgs = bind(capability, arguments)?;
                implementations::list_directory(&args.path, &self.guard).await
            }
            Capability::RunPython => {
                let args: RunPythonArgs = bind(capability, arguments)?;
                implementations::run_python(&args.code, &self.context, &self.analyzer).await
            }
            Capability::WebSearch => {
                let args: WebSearchArgs = bind(capability, arguments)?;
                implementations::web_search(&args.query, &self.http, &self.context).await
            }
            Capability::RunLinter => {
                let args: RunLinterArgs = bind(capability, arguments)?;
                implementations::run_linter(&args.file_path, &self.context, &self.guard).await
            }
        }
    }
}

fn bind<T: DeserializeOwned>(capability: Capability, arguments: &Map<String, Value>) -> Result<T> {
    serde_json::from_value(Value::Object(arguments.clone())).map_err(|e| AgentError::InvalidArguments {
        tool: capability.name().to_string(),
        reason: e.to_string(),
    })
}

/// Per-turn results, in request order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DispatchReport {
    pub results: Vec<ToolCallResult>,
}

impl DispatchReport {
    pub fn lines(&self) -> Vec<String> {
        self.results.iter().map(ToolCallResult::render).collect()
    }

    pub fn failure_count(&self) -> usize {
        self.results.iter().filter(|r| !r.success).count()
    }

    /// One observation message carrying every result line
    pub fn to_observation(&self) -> Message {
        Message::observation(format!("{}\n{}", OBSERVATION_HEADER, self.lines().join("\n")))
    }
}

/// Runs a turn's tool requests against an allow-list
#[derive(Debug, Clone)]
pub struct ToolDispatcher {
    toolbox: Arc<Toolbox>,
}

impl ToolDispatcher {
    pub fn new(toolbox: Arc<Toolbox>) -> Self {
        Self { toolbox }
    }

    /// Run every request in order; failures become result lines
    pub async fn run(&self, requests: &[ToolCallRequest], allowed: &CapabilitySet) -> DispatchReport {
        let mut results = Vec::with_capacity(requests.len());

        for request in requests {
            let Some(capability) = allowed.get(&request.name) else {
                warn!(tool = %request.name, "tool not available to this worker");
                results.push(ToolCallResult::not_found(&request.name));
                continue;
            };

            let start = Instant::now();
            let result = match self.toolbox.invoke(capability, &request.arguments).await {
                Ok(output) => ToolCallResult::success(&request.name, output),
                Err(e) => {
                    warn!(tool = %request.name, error = %e, "tool failed");
                    ToolCallResult::failure(&request.name, e.to_string())
                }
            };

            debug!(
                tool = %request.name,
                success = result.success,
                elapsed_ms = start.elapsed().as_millis() as u64,
                "tool finished"
            );
            results.push(result);
        }

        let report = DispatchReport { results };
        info!(
            requests = requests.len(),
            failures = report.failure_count(),
            "dispatch complete"
        );
        report
    }
}
