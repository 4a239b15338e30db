/// LLM Client — the single point of entry for all chat-completion calls.
///
/// ARCHITECTURAL RULE: No other module may call the OpenAI API directly.
/// All LLM interactions MUST go through `CompletionApi`.
///
/// Model: gpt-4o-mini (hardcoded — do not make configurable to prevent drift)
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::models::chat::{ChatTurn, ToolCallRequest};

const OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";
/// The model used for every completion.
pub const MODEL: &str = "gpt-4o-mini";

/// Finish reason the API reports when the reply is a set of tool calls.
pub const FINISH_TOOL_CALLS: &str = "tool_calls";

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("LLM returned no choices")]
    NoChoices,
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatTurn],
    #[serde(skip_serializing_if = "no_tools")]
    tools: &'a [Value],
}

fn no_tools(tools: &&[Value]) -> bool {
    tools.is_empty()
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<Completion>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

/// One assistant reply.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Completion {
    #[serde(default)]
    pub finish_reason: Option<String>,
    pub message: AssistantMessage,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Default)]
pub struct AssistantMessage {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub tool_calls: Option<Vec<ToolCallRequest>>,
}

impl Completion {
    pub fn wants_tools(&self) -> bool {
        self.finish_reason.as_deref() == Some(FINISH_TOOL_CALLS)
    }

    /// Text content of the reply; empty when the model sent none.
    pub fn content(&self) -> &str {
        self.message.content.as_deref().unwrap_or_default()
    }
}

#[cfg(test)]
impl Completion {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            finish_reason: Some("stop".to_string()),
            message: AssistantMessage {
                content: Some(content.into()),
                tool_calls: None,
            },
        }
    }

    pub fn tool_calls(calls: Vec<ToolCallRequest>) -> Self {
        Self {
            finish_reason: Some(FINISH_TOOL_CALLS.to_string()),
            message: AssistantMessage {
                content: None,
                tool_calls: Some(calls),
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct OpenAiError {
    error: OpenAiErrorBody,
}

#[derive(Debug, Deserialize)]
struct OpenAiErrorBody {
    message: String,
}

/// One round-trip to a chat-completion backend.
#[async_trait]
pub trait CompletionApi: Send + Sync {
    async fn complete(&self, messages: &[ChatTurn], tools: &[Value])
        -> Result<Completion, LlmError>;
}

/// The OpenAI chat-completions client. One request per call, no retries.
///
/// No request timeout is configured, so a stalled upstream call holds the
/// request until the peer gives up.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
}

impl LlmClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
        }
    }
}

#[async_trait]
impl CompletionApi for LlmClient {
    async fn complete(
        &self,
        messages: &[ChatTurn],
        tools: &[Value],
    ) -> Result<Completion, LlmError> {
        let request_body = CompletionRequest {
            model: MODEL,
            messages,
            tools,
        };

        let response = self
            .client
            .post(OPENAI_API_URL)
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(api_error(status.as_u16(), body));
        }

        parse_completion(&body)
    }
}

fn api_error(status: u16, body: String) -> LlmError {
    let message = serde_json::from_str::<OpenAiError>(&body)
        .map(|e| e.error.message)
        .unwrap_or(body);
    LlmError::Api { status, message }
}

fn parse_completion(body: &str) -> Result<Completion, LlmError> {
    let response: CompletionResponse = serde_json::from_str(body)?;

    if let Some(usage) = &response.usage {
        debug!(
            "LLM call succeeded: prompt_tokens={}, completion_tokens={}",
            usage.prompt_tokens, usage.completion_tokens
        );
    }

    response.choices.into_iter().next().ok_or(LlmError::NoChoices)
}
