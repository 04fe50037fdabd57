/// LLM Client: the single point of entry for all model calls in PitchForge.
///
/// ARCHITECTURAL RULE: No other module may call the provider API directly.
/// The pipeline reaches it only through the `GenerationBackend` trait.
///
/// Model: llama-3.3-70b-versatile on Groq's OpenAI-compatible endpoint
/// (hardcoded, do not make configurable to prevent drift)
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::proposal::compiler::Directives;
use crate::proposal::invoker::{BackendError, GenerationBackend, SamplingParams};

pub mod prompts;

/// The model used for all generation calls.
pub const MODEL: &str = "llama-3.3-70b-versatile";

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Malformed response envelope: {0}")]
    Parse(#[from] serde_json::Error),
}

impl From<LlmError> for BackendError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::Http(e) if e.is_decode() => BackendError::Rejected {
                status: None,
                message: e.to_string(),
            },
            LlmError::Http(e) => BackendError::Transport(e.to_string()),
            LlmError::Api { status, message } if status >= 500 || status == 408 => {
                BackendError::Transport(format!("provider returned {status}: {message}"))
            }
            LlmError::Api { status, message } => BackendError::Rejected {
                status: Some(status),
                message,
            },
            LlmError::Parse(e) => BackendError::Rejected {
                status: None,
                message: format!("malformed response envelope: {e}"),
            },
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
pub struct ChoiceMessage {
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

impl ChatResponse {
    /// Content of the first choice, if it carries any non-blank text.
    pub fn text(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.message.content.as_deref())
            .filter(|t| !t.trim().is_empty())
    }
}

#[derive(Debug, Deserialize)]
struct ProviderError {
    error: ProviderErrorBody,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    message: String,
}

/// Extracts the provider's own error message, falling back to the raw body.
fn provider_message(body: String) -> String {
    serde_json::from_str::<ProviderError>(&body)
        .map(|e| e.error.message)
        .unwrap_or(body)
}

/// The single LLM client used by the generation pipeline.
/// One call per invocation: retries are left to the caller.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
    api_url: String,
}

impl LlmClient {
    pub fn new(api_key: String, api_url: String, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: Client::builder()
                .timeout(timeout)
                .build()
                .context("Failed to build HTTP client")?,
            api_key,
            api_url,
        })
    }

    /// Makes a single chat-completions call and returns the parsed envelope.
    pub async fn call(
        &self,
        directives: &Directives,
        params: &SamplingParams,
    ) -> Result<ChatResponse, LlmError> {
        let request_body = ChatRequest {
            model: MODEL,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &directives.system,
                },
                ChatMessage {
                    role: "user",
                    content: &directives.user,
                },
            ],
            temperature: params.temperature,
            max_tokens: params.max_output_tokens,
            response_format: params.json_object.then_some(ResponseFormat {
                kind: "json_object",
            }),
        };

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            warn!("LLM API returned {status}");
            return Err(LlmError::Api {
                status: status.as_u16(),
                message: provider_message(body),
            });
        }

        let chat: ChatResponse = serde_json::from_str(&body)?;

        if let Some(usage) = &chat.usage {
            debug!(
                "LLM call succeeded: prompt_tokens={}, completion_tokens={}",
                usage.prompt_tokens, usage.completion_tokens
            );
        }

        Ok(chat)
    }
}

#[async_trait]
impl GenerationBackend for LlmClient {
    async fn complete(
        &self,
        directives: &Directives,
        params: &SamplingParams,
    ) -> Result<Option<String>, BackendError> {
        let response = self.call(directives, params).await?;
        Ok(response.text().map(str::to_owned))
    }
}
