//! Ollama chat client
//!
//! Non-streaming `POST /api/chat` with:
//! - Temperature passed through `options`
//! - Observation messages mapped onto the `user` role
//! - Transient failures retried through [`RetryManager`]
//!
//! Every failure that survives the retries is surfaced as
//! [`AgentError::OracleUnavailable`].

use crate::errors::{AgentError, Result};
use crate::llm::oracle::Oracle;
use crate::llm::retry::RetryManager;
use crate::types::{Message, Role};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

/// Default Ollama API endpoint
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";

/// Default model
pub const DEFAULT_MODEL: &str = "qwen2.5-coder:14b";

/// Default request timeout (120 seconds)
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Connection settings for [`OllamaClient`]
#[derive(Debug, Clone, PartialEq)]
pub struct OllamaOptions {
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub request_timeout: Duration,
    /// Attempts per call, first one included
    pub max_retries: u32,
}

impl Default for OllamaOptions {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_OLLAMA_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.0,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            max_retries: crate::llm::retry::MAX_RETRIES,
        }
    }
}

/// Ollama chat client
#[derive(Debug, Clone)]
pub struct OllamaClient {
    client: Client,
    options: OllamaOptions,
    retry: RetryManager,
}

impl OllamaClient {
    /// Create Ollama client with default settings
    pub fn new() -> Result<Self> {
        Self::with_options(OllamaOptions::default())
    }

    pub fn with_options(options: OllamaOptions) -> Result<Self> {
        let client = Client::builder()
            .timeout(options.request_timeout)
            .build()
            .map_err(AgentError::HttpError)?;

        Ok(Self {
            client,
            retry: RetryManager::with_config(options.max_retries, 500),
            options: OllamaOptions {
                base_url: options.base_url.trim_end_matches('/').to_string(),
                ..options
            },
        })
    }

    /// Check if Ollama answers at all
    pub async fn health_check(&self) -> Result<bool> {
        let url = format!("{}/api/version", self.options.base_url);

        match self.client.get(&url).send().await {
            Ok(response) => Ok(response.status().is_success()),
            Err(_) => Ok(false),
        }
    }

    /// List locally available models
    pub async fn list_models(&self) -> Result<Vec<String>> {
        let url = format!("{}/api/tags", self.options.base_url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| AgentError::OracleUnavailable(format!("Failed to list models: {}", e)))?;

        if !response.status().is_success() {
            return Err(AgentError::OracleUnavailable(format!(
                "Failed to retrieve model list: HTTP {}",
                response.status()
            )));
        }

        let models: ModelsResponse = response
            .json()
            .await
            .map_err(|e| AgentError::OracleUnavailable(format!("Failed to parse models: {}", e)))?;

        Ok(models.models.into_iter().map(|m| m.name).collect())
    }

    /// Whether the configured model has been pulled
    pub async fn has_model(&self) -> Result<bool> {
        let models = self.list_models().await?;
        Ok(models.iter().any(|listed| same_model(listed, &self.options.model)))
    }

    pub fn base_url(&self) -> &str {
        &self.options.base_url
    }

    /// Build the wire request for a message list
    fn chat_request(&self, messages: &[Message]) -> ChatRequest {
        ChatRequest {
            model: self.options.model.clone(),
            messages: messages.iter().map(WireMessage::from).collect(),
            stream: false,
            options: ChatOptions {
                temperature: self.options.temperature,
            },
        }
    }

    async fn chat_once(&self, request: &ChatRequest) -> Result<String> {
        let url = format!("{}/api/chat", self.options.base_url);

        let response = self.client.post(&url).json(request).send().await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            let message = format!("HTTP {}: {}", status, error_text);
            // Client errors (unknown model, bad request) will not fix themselves
            return Err(if status.is_client_error() {
                AgentError::ConfigError(message)
            } else {
                AgentError::OracleUnavailable(message)
            });
        }

        let body: ChatResponse = response.json().await?;
        Ok(body.message.map(|m| m.content).unwrap_or_default())
    }
}

#[async_trait]
impl Oracle for OllamaClient {
    async fn invoke(&self, messages: &[Message]) -> Result<Message> {
        let request = self.chat_request(messages);
        debug!(model = %self.options.model, messages = messages.len(), "chat request");

        let content = self
            .retry
            .execute_with_retry(|| self.chat_once(&request))
            .await
            .map_err(|e| match e {
                AgentError::OracleUnavailable(_) => e,
                other => AgentError::OracleUnavailable(other.to_string()),
            })?;

        info!(model = %self.options.model, chars = content.len(), "chat reply");
        Ok(Message::assistant(content))
    }

    fn model(&self) -> &str {
        &self.options.model
    }
}

/// Ollama chat request
#[derive(Debug, Clone, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<WireMessage>,
    stream: bool,
    options: ChatOptions,
}

#[derive(Debug, Clone, Serialize)]
struct ChatOptions {
    temperature: f32,
}

/// Message as Ollama sees it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct WireMessage {
    role: String,
    content: String,
}

impl From<&Message> for WireMessage {
    fn from(message: &Message) -> Self {
        let role = match message.role {
            Role::System => "system",
            Role::User | Role::Observation => "user",
            Role::Assistant => "assistant",
        };

        let content = match (&message.role, &message.name) {
            (Role::Observation, Some(name)) => format!("[{}] {}", name, message.content),
            _ => message.content.clone(),
        };

        Self {
            role: role.to_string(),
            content,
        }
    }
}

/// Ollama chat response (non-streaming)
#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    message: Option<WireMessage>,
}

/// Ollama models list response
#[derive(Debug, Deserialize)]
struct ModelsResponse {
    models: Vec<ModelInfo>,
}

#[derive(Debug, Deserialize)]
struct ModelInfo {
    name: String,
}

/// Ollama lists untagged models as `<name>:latest`
fn same_model(listed: &str, wanted: &str) -> bool {
    let with_tag = |name: &str| {
        if name.contains(':') {
            name.to_string()
        } else {
            format!("{}:latest", name)
        }
    };
    with_tag(listed) == with_tag(wanted)
}
