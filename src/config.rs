//! Runtime configuration
//!
//! Built once at startup from three layers, later ones winning:
//! `~/.crewloop/config.toml`, environment variables, then CLI flags. A
//! missing file means defaults.

use crate::llm::OllamaOptions;
use crate::tools::types::ToolContext;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable overriding the Ollama URL
pub const ENV_BASE_URL: &str = "OLLAMA_BASE_URL";
/// Environment variable overriding the model
pub const ENV_MODEL: &str = "OLLAMA_MODEL";
/// Environment variable overriding the workspace directory
pub const ENV_WORKSPACE: &str = "WORKSPACE_DIR";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub ollama: OllamaSettings,
    #[serde(default)]
    pub agent: AgentSettings,
    #[serde(default)]
    pub tools: ToolSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OllamaSettings {
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub request_timeout_secs: u64,
    pub max_retries: u32,
}

impl Default for OllamaSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            model: "qwen2.5-coder:14b".to_string(),
            temperature: 0.0,
            request_timeout_secs: 120,
            max_retries: 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentSettings {
    /// Oracle calls per worker turn
    pub max_iterations: usize,
    /// Node visits per conversation turn
    pub max_graph_steps: usize,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            max_iterations: 10,
            max_graph_steps: 25,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolSettings {
    /// Relative paths are taken from the current directory
    pub workspace: PathBuf,
    pub python_bin: String,
    pub linter_bin: String,
    pub exec_timeout_secs: u64,
    pub max_output_bytes: usize,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            workspace: PathBuf::from("workspace"),
            python_bin: "python3".to_string(),
            linter_bin: "ruff".to_string(),
            exec_timeout_secs: 30,
            max_output_bytes: 2 * 1024 * 1024,
        }
    }
}

impl Config {
    /// Load from the default location
    pub fn load() -> Result<Self> {
        Self::load_in_home(dirs::home_dir().as_deref())
    }

    /// Load `<home>/.crewloop/config.toml`; no home directory means defaults
    pub fn load_in_home(home: Option<&Path>) -> Result<Self> {
        match home {
            Some(home) => Self::load_from(&Self::config_path(home)),
            None => Ok(Self::default()),
        }
    }

    /// Load from a file; a missing file yields defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        Ok(config)
    }

    pub fn config_path(home: &Path) -> PathBuf {
        home.join(".crewloop").join("config.toml")
    }

    /// Apply environment overrides through `lookup`
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = non_empty(ENV_BASE_URL) {
            self.ollama.base_url = url;
        }
        if let Some(model) = non_empty(ENV_MODEL) {
            self.ollama.model = model;
        }
        if let Some(workspace) = non_empty(ENV_WORKSPACE) {
            self.tools.workspace = PathBuf::from(workspace);
        }
    }

    /// Absolute workspace path, resolved against `cwd` when relative
    pub fn workspace_dir(&self, cwd: &Path) -> PathBuf {
        if self.tools.workspace.is_absolute() {
            self.tools.workspace.clone()
        } else {
            cwd.join(&self.tools.workspace)
        }
    }

    pub fn ollama_options(&self) -> OllamaOptions {
        OllamaOptions {
            base_url: self.ollama.base_url.clone(),
            model: self.ollama.model.clone(),
            temperature: self.ollama.temperature,
            request_timeout: Duration::from_secs(self.ollama.request_timeout_secs),
            max_retries: self.ollama.max_retries,
        }
    }

    /// Tool context rooted at an already resolved workspace
    pub fn tool_context(&self, workspace: PathBuf) -> ToolContext {
        ToolContext::new(workspace)
            .with_timeout(Duration::from_secs(self.tools.exec_timeout_secs))
            .with_max_output_size(self.tools.max_output_bytes)
            .with_python_bin(&self.tools.python_bin)
            .with_linter_bin(&self.tools.linter_bin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.ollama.base_url, "http://localhost:11434");
        assert_eq!(config.ollama.model, "qwen2.5-coder:14b");
        assert_eq!(config.ollama.temperature, 0.0);
        assert_eq!(config.agent.max_iterations, 10);
        assert_eq!(config.agent.max_graph_steps, 25);
        assert_eq!(config.tools.exec_timeout_secs, 30);
    }

    #[test]
    fn test_missing_file_is_default() {
        let temp = TempDir::new().unwrap();
        let config = Config::load_from(&temp.path().join("absent.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_no_home_is_default() {
        assert_eq!(Config::load_in_home(None).unwrap(), Config::default());
    }

    #[test]
    fn test_load_in_home() {
        let temp = TempDir::new().unwrap();
        let path = Config::config_path(temp.path());
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "[agent]\nmax_iterations = 4\n").unwrap();

        let config = Config::load_in_home(Some(temp.path())).unwrap();
        assert_eq!(config.agent.max_iterations, 4);
        assert_eq!(config.ollama.model, "qwen2.5-coder:14b");
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(&path, "[ollama]\nmodel = \"codellama\"\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.ollama.model, "codellama");
        assert_eq!(config.ollama.base_url, "http://localhost:11434");
        assert_eq!(config.tools.linter_bin, "ruff");
    }

    #[test]
    fn test_invalid_file_is_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(&path, "[ollama\n").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse"));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            (ENV_BASE_URL, "http://gpu-box:11434"),
            (ENV_MODEL, "  "),
            (ENV_WORKSPACE, "/srv/ws"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_env(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.ollama.base_url, "http://gpu-box:11434");
        // Blank values are ignored
        assert_eq!(config.ollama.model, "qwen2.5-coder:14b");
        assert_eq!(config.tools.workspace, PathBuf::from("/srv/ws"));
    }

    #[test]
    fn test_workspace_dir_resolution() {
        let config = Config::default();
        assert_eq!(
            config.workspace_dir(Path::new("/home/dev/project")),
            PathBuf::from("/home/dev/project/workspace")
        );
    }

    #[test]
    fn test_derived_settings() {
        let config = Config::default();
        let options = config.ollama_options();
        assert_eq!(options.request_timeout, Duration::from_secs(120));

        let context = config.tool_context(PathBuf::from("/srv/ws"));
        assert_eq!(context.timeout, Duration::from_secs(30));
        assert_eq!(context.python_bin, "python3");
    }
}
