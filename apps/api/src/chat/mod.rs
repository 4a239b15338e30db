//! Conversation Driver — persona prompt + history + one upstream call,
//! with at most one round of tool resolution.
//!
//! If the first reply asks for tools, the tools run, their results are
//! appended, and the API is called exactly once more. That second reply's
//! text is returned even if it asks for tools again; chaining further rounds
//! would change what callers observe.

use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use crate::llm_client::{CompletionApi, LlmError};
use crate::models::chat::ChatTurn;
use crate::persona::PersonaContext;
use crate::tools::{ToolError, ToolRegistry};

pub mod handlers;

#[derive(Debug, Error)]
pub enum ChatError {
    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error(transparent)]
    Tool(#[from] ToolError),
}

#[derive(Clone)]
pub struct ConversationDriver {
    persona: Arc<PersonaContext>,
    tools: Arc<ToolRegistry>,
    llm: Arc<dyn CompletionApi>,
}

impl ConversationDriver {
    pub fn new(
        persona: Arc<PersonaContext>,
        tools: Arc<ToolRegistry>,
        llm: Arc<dyn CompletionApi>,
    ) -> Self {
        Self {
            persona,
            tools,
            llm,
        }
    }

    /// System turn, then `history` as given, then the new user turn.
    pub fn build_messages(&self, message: &str, history: Vec<ChatTurn>) -> Vec<ChatTurn> {
        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(ChatTurn::system(self.persona.system_prompt()));
        messages.extend(history);
        messages.push(ChatTurn::user(message));
        messages
    }

    pub async fn chat(&self, message: &str, history: Vec<ChatTurn>) -> Result<String, ChatError> {
        let mut messages = self.build_messages(message, history);
        let schemas = self.tools.schemas();

        let first = self.llm.complete(&messages, &schemas).await?;
        if !first.wants_tools() {
            return Ok(first.content().to_string());
        }

        let calls = first.message.tool_calls.unwrap_or_default();
        debug!("Resolving {} tool call(s)", calls.len());
        let results = self.tools.resolve_all(&calls).await?;

        messages.push(ChatTurn::assistant_tool_calls(first.message.content, calls));
        messages.extend(results.into_iter().map(ChatTurn::from));

        let second = self.llm.complete(&messages, &schemas).await?;
        if second.wants_tools() {
            debug!("Second reply requested tools again; returning its text as-is");
        }
        Ok(second.content().to_string())
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde_json::Value;

    use crate::llm_client::{Completion, CompletionApi, LlmError};
    use crate::models::chat::ChatTurn;

    /// Replays canned completions in order and records every request.
    #[derive(Default)]
    pub struct ScriptedLlm {
        replies: Mutex<VecDeque<Result<Completion, LlmError>>>,
        requests: Mutex<Vec<Vec<ChatTurn>>>,
    }

    impl ScriptedLlm {
        pub fn new(replies: Vec<Completion>) -> Self {
            Self {
                replies: Mutex::new(replies.into_iter().map(Ok).collect()),
                requests: Mutex::default(),
            }
        }

        pub fn failing(error: LlmError) -> Self {
            Self {
                replies: Mutex::new(VecDeque::from([Err(error)])),
                requests: Mutex::default(),
            }
        }

        pub fn requests(&self) -> Vec<Vec<ChatTurn>> {
            self.requests.lock().unwrap().clone()
        }

        pub fn call_count(&self) -> usize {
            self.requests.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl CompletionApi for ScriptedLlm {
        async fn complete(
            &self,
            messages: &[ChatTurn],
            _tools: &[Value],
        ) -> Result<Completion, LlmError> {
            self.requests.lock().unwrap().push(messages.to_vec());
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(LlmError::NoChoices))
        }
    }
}
