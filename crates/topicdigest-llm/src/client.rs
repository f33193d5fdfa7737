//! OpenAI-compatible chat completions client.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use topicdigest_core::AppConfig;

use crate::error::LlmError;
use crate::retry::RetryPolicy;

/// Longest error body kept in [`LlmError::UnexpectedStatus`].
const MAX_ERROR_BODY_CHARS: usize = 500;

/// Sampling parameters for one request.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelParams {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: Option<u32>,
}

impl From<&AppConfig> for ModelParams {
    fn from(config: &AppConfig) -> Self {
        Self {
            model: config.llm_model.clone(),
            temperature: config.llm_temperature,
            max_tokens: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub system: String,
    pub user: String,
    pub params: ModelParams,
}

/// Something that turns a prompt into text.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// # Errors
    ///
    /// Returns [`LlmError`] when no text could be produced.
    async fn generate(&self, request: &GenerationRequest) -> Result<String, LlmError>;
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Deserialize)]
struct Message {
    #[serde(default)]
    content: Option<String>,
}

/// Connection settings for [`ChatClient`].
#[derive(Clone, PartialEq, Eq)]
pub struct ChatClientConfig {
    pub api_base: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
    pub retry: RetryPolicy,
}

impl fmt::Debug for ChatClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatClientConfig")
            .field("api_base", &self.api_base)
            .field("api_key", &self.api_key.as_deref().map(|_| "[redacted]"))
            .field("timeout_secs", &self.timeout_secs)
            .field("retry", &self.retry)
            .finish()
    }
}

impl From<&AppConfig> for ChatClientConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            api_base: config.llm_api_base.clone(),
            api_key: config.llm_api_key.clone(),
            timeout_secs: config.llm_timeout_secs,
            retry: RetryPolicy::from(config),
        }
    }
}

/// [`TextGenerator`] backed by `POST {api_base}/chat/completions`.
pub struct ChatClient {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
    retry: RetryPolicy,
}

impl fmt::Debug for ChatClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatClient")
            .field("endpoint", &self.endpoint)
            .field("api_key", &self.api_key.as_deref().map(|_| "[redacted]"))
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

impl ChatClient {
    /// # Errors
    ///
    /// Returns [`LlmError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(config: ChatClientConfig) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("topicdigest/0.1")
            .build()?;
        let endpoint = format!("{}/chat/completions", config.api_base.trim_end_matches('/'));
        Ok(Self {
            client,
            endpoint,
            api_key: config.api_key,
            retry: config.retry,
        })
    }

    async fn send_once(&self, request: &GenerationRequest) -> Result<String, LlmError> {
        let body = ChatRequest {
            model: &request.params.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &request.system,
                },
                ChatMessage {
                    role: "user",
                    content: &request.user,
                },
            ],
            temperature: request.params.temperature,
            max_tokens: request.params.max_tokens,
        };

        let mut builder = self.client.post(&self.endpoint).json(&body);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }
        let response = builder.send().await?;

        let status = response.status();
        if status.as_u16() == 429 {
            return Err(LlmError::RateLimited);
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(LlmError::UnexpectedStatus {
                status: status.as_u16(),
                body: text.chars().take(MAX_ERROR_BODY_CHARS).collect(),
            });
        }

        let text = response.text().await?;
        let parsed: ChatResponse =
            serde_json::from_str(&text).map_err(|source| LlmError::Deserialize {
                context: "chat completion".to_string(),
                source,
            })?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or(LlmError::EmptyResponse)
    }
}

#[async_trait]
impl TextGenerator for ChatClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, LlmError> {
        tracing::debug!(
            model = %request.params.model,
            prompt_chars = request.user.len(),
            "requesting completion"
        );
        self.retry.run(|| self.send_once(request)).await
    }
}
