//! Process tool implementations
//!
//! Implements the two subprocess-backed capabilities:
//! - run_python: `python -c <code>` after the sandbox check
//! - run_linter: `ruff check <path>`
//!
//! # Resource bounds
//! Both run with the workspace as current directory, argv arrays (never a
//! shell) and a hard wall-clock timeout. A timed-out child is killed and the
//! timeout is reported as an ordinary tool error.

use crate::errors::{AgentError, Result};
use crate::tools::sandbox::CodeSandboxAnalyzer;
use crate::tools::security::PathGuard;
use crate::tools::types::ToolContext;
use std::io::ErrorKind;
use std::process::Output;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, warn};

/// Run sandbox-approved Python code in the workspace
pub async fn run_python(
    code: &str,
    context: &ToolContext,
    analyzer: &CodeSandboxAnalyzer,
) -> Result<String> {
    analyzer.check(code)?;

    let mut cmd = Command::new(&context.python_bin);
    cmd.arg("-c").arg(code);

    let output = run_bounded(cmd, context).await.map_err(|e| match e {
        AgentError::IoError(io) if io.kind() == ErrorKind::NotFound => AgentError::ToolFailed(format!(
            "Python interpreter '{}' not found",
            context.python_bin
        )),
        other => other,
    })?;

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);

    let mut report = String::new();
    if !stdout.is_empty() {
        report.push_str(&format!("STDOUT:\n{}\n", stdout));
    }
    if !stderr.is_empty() {
        report.push_str(&format!("STDERR:\n{}\n", stderr));
    }
    if let Some(code) = output.status.code().filter(|code| *code != 0) {
        report.push_str(&format!("Return code: {}", code));
    }

    if report.is_empty() {
        report.push_str("Code executed successfully with no output.");
    }
    Ok(report)
}

/// Lint a workspace path
pub async fn run_linter(file_path: &str, context: &ToolContext, guard: &PathGuard) -> Result<String> {
    let target = guard.resolve(file_path)?;

    let mut cmd = Command::new(&context.linter_bin);
    cmd.arg("check").arg(&target);

    let output = run_bounded(cmd, context).await.map_err(|e| match e {
        AgentError::IoError(io) if io.kind() == ErrorKind::NotFound => AgentError::ToolFailed(format!(
            "'{}' is not installed. Please install it first.",
            context.linter_bin
        )),
        other => other,
    })?;

    if output.status.success() {
        Ok("Lint check passed!".to_string())
    } else {
        Ok(format!(
            "Lint issues found:\n{}",
            String::from_utf8_lossy(&output.stdout)
        ))
    }
}

/// Spawn in the workspace and wait at most `context.timeout`
async fn run_bounded(mut cmd: Command, context: &ToolContext) -> Result<Output> {
    cmd.current_dir(&context.working_dir).kill_on_drop(true);

    debug!(cmd = ?cmd.as_std().get_program(), timeout_ms = context.timeout.as_millis() as u64, "spawning");

    match timeout(context.timeout, cmd.output()).await {
        Ok(result) => {
            let output = result?;
            Ok(truncate(output, context.max_output_size))
        }
        Err(_) => {
            warn!(timeout_ms = context.timeout.as_millis() as u64, "subprocess timed out");
            Err(AgentError::Timeout {
                duration_ms: duration_ms(context.timeout),
            })
        }
    }
}

fn truncate(mut output: Output, max: usize) -> Output {
    output.stdout.truncate(max);
    output.stderr.truncate(max);
    output
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup() -> (TempDir, ToolContext, PathGuard) {
        let temp = TempDir::new().unwrap();
        let context = ToolContext::new(temp.path().to_path_buf());
        let guard = PathGuard::new(temp.path()).unwrap();
        (temp, context, guard)
    }

    #[tokio::test]
    async fn test_blocked_code_never_runs() {
        let (temp, context, _guard) = setup();
        // The interpreter is bogus: reaching the spawn would fail differently
        let context = context.with_python_bin("/nonexistent/python");

        let err = run_python("import os\nos.remove('x')", &context, &CodeSandboxAnalyzer::new())
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::SecurityViolation { .. }));
        assert!(std::fs::read_dir(temp.path()).unwrap().next().is_none());
    }

    #[tokio::test]
    async fn test_missing_interpreter_is_tool_error() {
        let (_temp, context, _guard) = setup();
        let context = context.with_python_bin("/nonexistent/python");

        let err = run_python("print(1)", &context, &CodeSandboxAnalyzer::new())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_runs_in_workspace_directory() {
        let (temp, context, _guard) = setup();
        std::fs::write(temp.path().join("marker.txt"), "").unwrap();

        let mut cmd = Command::new("ls");
        cmd.arg(".");
        let output = run_bounded(cmd, &context).await.unwrap();
        assert!(String::from_utf8_lossy(&output.stdout).contains("marker.txt"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_timeout_is_recoverable_error() {
        let (_temp, context, _guard) = setup();
        let context = context.with_timeout(Duration::from_millis(200));

        let mut cmd = Command::new("sleep");
        cmd.arg("5");
        let err = run_bounded(cmd, &context).await.unwrap_err();
        assert!(matches!(err, AgentError::Timeout { duration_ms: 200 }));
    }

    #[tokio::test]
    async fn test_linter_missing_binary() {
        let (_temp, context, guard) = setup();
        let context = context.with_linter_bin("/nonexistent/ruff");

        let err = run_linter(".", &context, &guard).await.unwrap_err();
        assert!(err.to_string().contains("not installed"));
    }

    #[tokio::test]
    async fn test_linter_path_confined() {
        let (_temp, context, guard) = setup();

        let err = run_linter("../../etc", &context, &guard).await.unwrap_err();
        assert!(matches!(err, AgentError::PathViolation { .. }));
    }
}
