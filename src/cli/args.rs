//! Command-line argument parsing for crewloop
//!
//! Flags override the config file and the environment.

use crate::config::Config;
use clap::Parser;
use std::path::PathBuf;

/// crewloop - a Planner/Coder/Reviewer crew on a local Ollama model
#[derive(Parser, Debug)]
#[command(name = "crewloop")]
#[command(version)]
#[command(about = "Run a supervised Planner/Coder/Reviewer crew on a local Ollama model", long_about = None)]
pub struct Args {
    /// Task for the crew; starts an interactive session when omitted
    #[arg(value_name = "TASK")]
    pub task: Option<String>,

    /// Ollama model to use
    #[arg(short, long)]
    pub model: Option<String>,

    /// Ollama base URL
    #[arg(long)]
    pub base_url: Option<String>,

    /// Workspace directory the tools are confined to
    #[arg(short, long)]
    pub workspace: Option<PathBuf>,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Oracle calls per worker turn
    #[arg(long)]
    pub max_iterations: Option<usize>,

    /// Verbosity level: -v (info), -vv (debug), -vvv (trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Verbosity level enum
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Normal,
    Verbose,
    Debug,
    Trace,
}

impl Args {
    pub fn verbosity(&self) -> Verbosity {
        match self.verbose {
            0 => Verbosity::Normal,
            1 => Verbosity::Verbose,
            2 => Verbosity::Debug,
            _ => Verbosity::Trace,
        }
    }

    /// Apply flag overrides on top of a loaded config
    pub fn apply_to(&self, config: &mut Config) {
        if let Some(model) = &self.model {
            config.ollama.model = model.clone();
        }
        if let Some(url) = &self.base_url {
            config.ollama.base_url = url.clone();
        }
        if let Some(workspace) = &self.workspace {
            config.tools.workspace = workspace.clone();
        }
        if let Some(max_iterations) = self.max_iterations {
            config.agent.max_iterations = max_iterations;
        }
    }
}

impl Verbosity {
    /// Default tracing level for this verbosity
    pub fn level(&self) -> tracing::Level {
        match self {
            Verbosity::Normal => tracing::Level::WARN,
            Verbosity::Verbose => tracing::Level::INFO,
            Verbosity::Debug => tracing::Level::DEBUG,
            Verbosity::Trace => tracing::Level::TRACE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_is_optional() {
        let args = Args::parse_from(["crewloop"]);
        assert!(args.task.is_none());

        let args = Args::parse_from(["crewloop", "write fizzbuzz"]);
        assert_eq!(args.task.as_deref(), Some("write fizzbuzz"));
    }

    #[test]
    fn test_verbosity_levels() {
        assert_eq!(Args::parse_from(["crewloop"]).verbosity(), Verbosity::Normal);
        assert_eq!(Args::parse_from(["crewloop", "-v"]).verbosity(), Verbosity::Verbose);
        assert_eq!(Args::parse_from(["crewloop", "-vv"]).verbosity(), Verbosity::Debug);
        assert_eq!(Args::parse_from(["crewloop", "-vvvv"]).verbosity(), Verbosity::Trace);
        assert_eq!(Verbosity::Normal.level(), tracing::Level::WARN);
    }

    #[test]
    fn test_flags_override_config() {
        let args = Args::parse_from([
            "crewloop",
            "--model",
            "llama3:8b",
            "--workspace",
            "/tmp/ws",
            "--max-iterations",
            "3",
            "task",
        ]);

        let mut config = Config::default();
        args.apply_to(&mut config);

        assert_eq!(config.ollama.model, "llama3:8b");
        assert_eq!(config.tools.workspace, PathBuf::from("/tmp/ws"));
        assert_eq!(config.agent.max_iterations, 3);
        assert_eq!(config.ollama.base_url, "http://localhost:11434");
    }
}
