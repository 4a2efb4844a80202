// LLM Client: the single point of entry for all hosted-model calls in the recruiting API.
//
// ARCHITECTURAL RULE: No other module may call the model provider directly.
// Evaluation and interview code talk to the `ChatModel` trait; `LlmClient` is the
// production implementation.
//
// Model: claude-sonnet-4-5 (hardcoded, not configurable)

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub mod outcome;
pub mod parser;
pub mod prompts;

#[cfg(test)]
pub mod testing;

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
/// The model used for all LLM calls.
/// This is intentionally hardcoded to prevent accidental drift.
pub const MODEL: &str = "claude-sonnet-4-5";
const HTTP_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("LLM returned empty content")]
    EmptyContent,

    #[error("LLM call timed out after {0:?}")]
    Timeout(Duration),

    #[error("model credentials are not configured")]
    MissingCredentials,
}

/// Who authored a turn of an interview conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Human,
    Agent,
}

impl Role {
    fn as_api_role(self) -> &'static str {
        match self {
            Role::Human => "user",
            Role::Agent => "assistant",
        }
    }
}

/// One message of a conversation history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

impl Turn {
    pub fn human(content: impl Into<String>) -> Self {
        Self {
            role: Role::Human,
            content: content.into(),
        }
    }

    pub fn agent(content: impl Into<String>) -> Self {
        Self {
            role: Role::Agent,
            content: content.into(),
        }
    }
}

/// Sampling parameters for a single invocation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationParams {
    pub max_tokens: u32,
    pub temperature: f32,
}

/// Structured extraction and scoring: longer output, steadier sampling.
pub const EVALUATION_PARAMS: GenerationParams = GenerationParams {
    max_tokens: 2000,
    temperature: 0.7,
};

/// Interview chat: short replies, a little more variety.
pub const CONVERSATION_PARAMS: GenerationParams = GenerationParams {
    max_tokens: 500,
    temperature: 0.8,
};

/// A hosted, stateless text-generation model. Context must be resent on every call.
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn invoke(
        &self,
        system: &str,
        history: &[Turn],
        input: &str,
        params: GenerationParams,
    ) -> Result<String, LlmError>;
}

/// Invokes `model` once, turning an overrun of `timeout` into `LlmError::Timeout`.
pub async fn invoke_with_timeout(
    model: &dyn ChatModel,
    timeout: Duration,
    system: &str,
    history: &[Turn],
    input: &str,
    params: GenerationParams,
) -> Result<String, LlmError> {
    match tokio::time::timeout(timeout, model.invoke(system, history, input, params)).await {
        Ok(result) => result,
        Err(_) => Err(LlmError::Timeout(timeout)),
    }
}

#[derive(Debug, Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    system: &'a str,
    messages: Vec<AnthropicMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct AnthropicMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct LlmResponse {
    pub content: Vec<ContentBlock>,
    pub usage: Usage,
}

#[derive(Debug, Deserialize)]
pub struct ContentBlock {
    #[serde(rename = "type")]
    pub block_type: String,
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl LlmResponse {
    /// Extracts the text content from the first text block.
    pub fn text(&self) -> Option<&str> {
        self.content
            .iter()
            .find(|b| b.block_type == "text")
            .and_then(|b| b.text.as_deref())
    }
}

#[derive(Debug, Deserialize)]
struct AnthropicError {
    error: AnthropicErrorBody,
}

#[derive(Debug, Deserialize)]
struct AnthropicErrorBody {
    message: String,
}

/// The production `ChatModel`: the Anthropic Messages API over HTTPS.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
}

impl LlmClient {
    /// Fails with `MissingCredentials` when `api_key` is blank; this is fatal at startup.
    pub fn new(api_key: String) -> Result<Self, LlmError> {
        if api_key.trim().is_empty() {
            return Err(LlmError::MissingCredentials);
        }

        let client = Client::builder().timeout(HTTP_TIMEOUT).build()?;

        Ok(Self { client, api_key })
    }

    fn build_messages<'a>(history: &'a [Turn], input: &'a str) -> Vec<AnthropicMessage<'a>> {
        history
            .iter()
            .map(|turn| AnthropicMessage {
                role: turn.role.as_api_role(),
                content: &turn.content,
            })
            .chain(std::iter::once(AnthropicMessage {
                role: "user",
                content: input,
            }))
            .collect()
    }

    /// Makes a single raw call to the Messages API and returns the full response object.
    /// No retries here: the callers own the fallback policy.
    pub async fn call(
        &self,
        system: &str,
        history: &[Turn],
        input: &str,
        params: GenerationParams,
    ) -> Result<LlmResponse, LlmError> {
        let request_body = AnthropicRequest {
            model: MODEL,
            max_tokens: params.max_tokens,
            temperature: params.temperature,
            system,
            messages: Self::build_messages(history, input),
        };

        let response = self
            .client
            .post(ANTHROPIC_API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<AnthropicError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let llm_response: LlmResponse = response.json().await?;

        debug!(
            "LLM call succeeded: input_tokens={}, output_tokens={}",
            llm_response.usage.input_tokens, llm_response.usage.output_tokens
        );

        Ok(llm_response)
    }
}

#[async_trait]
impl ChatModel for LlmClient {
    async fn invoke(
        &self,
        system: &str,
        history: &[Turn],
        input: &str,
        params: GenerationParams,
    ) -> Result<String, LlmError> {
        let response = self.call(system, history, input, params).await?;
        let text = response.text().ok_or(LlmError::EmptyContent)?;
        Ok(text.trim().to_string())
    }
}
