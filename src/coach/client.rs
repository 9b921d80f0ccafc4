//! Chat-completion client for the external language-model API.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::config::OpenAiConfig;

/// Failure talking to the language model. Never leaves the `coach` module as-is.
#[derive(Debug, thiserror::Error)]
pub enum CoachError {
    #[error("no API key configured for the language model")]
    MissingApiKey,
    #[error("request to the language model failed: {0}")]
    Transport(String),
    #[error("language model returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("language model returned no content")]
    EmptyResponse,
    #[error("could not parse the language model reply: {0}")]
    Parse(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptRole {
    System,
    User,
}

#[derive(Debug, Clone, Serialize)]
pub struct PromptMessage {
    pub role: PromptRole,
    pub content: String,
}

impl PromptMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: PromptRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: PromptRole::User,
            content: content.into(),
        }
    }
}

/// One system + user exchange sent to the model.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub messages: Vec<PromptMessage>,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl CompletionRequest {
    pub fn new(system: String, user: String, max_tokens: u32) -> Self {
        Self {
            messages: vec![PromptMessage::system(system), PromptMessage::user(user)],
            temperature: 0.7,
            max_tokens,
        }
    }
}

/// Text-generation backend. Production talks to OpenAI; tests script replies.
#[async_trait]
pub trait CoachModel: Send + Sync {
    async fn complete(&self, request: CompletionRequest) -> Result<String, CoachError>;
}

#[derive(Serialize)]
struct ChatCompletionBody<'a> {
    model: &'a str,
    messages: &'a [PromptMessage],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// OpenAI Chat Completions client, built once at startup and shared through `AppState`.
pub struct OpenAiClient {
    api_key: Option<SecretString>,
    api_base: String,
    model: String,
    http: reqwest::Client,
}

impl std::fmt::Debug for OpenAiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiClient")
            .field("api_key", &"[REDACTED]")
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .finish()
    }
}

impl OpenAiClient {
    pub fn new(config: &OpenAiConfig) -> Result<Self, CoachError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| CoachError::Transport(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            api_key: config.api_key.clone().map(SecretString::from),
            api_base: config.api_base.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            http,
        })
    }
}

#[async_trait]
impl CoachModel for OpenAiClient {
    async fn complete(&self, request: CompletionRequest) -> Result<String, CoachError> {
        let api_key = self.api_key.as_ref().ok_or(CoachError::MissingApiKey)?;

        let body = ChatCompletionBody {
            model: &self.model,
            messages: &request.messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };

        let started = Instant::now();
        let response = self
            .http
            .post(format!("{}/chat/completions", self.api_base))
            .bearer_auth(api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| CoachError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CoachError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| CoachError::Parse(e.to_string()))?;

        tracing::debug!(
            model = %self.model,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "language model replied"
        );

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(CoachError::EmptyResponse)
    }
}
