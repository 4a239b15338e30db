//! Tool Registry — the closed set of local functions the model may call.
//!
//! The registry is built once at startup and handed to the conversation
//! driver; nothing is looked up from global state.
//!
//! An unregistered tool name resolves to an empty `{}` result instead of an
//! error. The model occasionally invents tool names and the conversation
//! carries on without them; argument decoding errors, in contrast, always
//! propagate and fail the turn.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{info, warn};

use crate::models::chat::{ToolCallRequest, ToolResult};
use crate::notify::Notifier;

pub mod recording;

pub use recording::{RecordUnknownQuestion, RecordUserDetails};

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Invalid arguments for tool '{tool}': {source}")]
    InvalidArguments {
        tool: String,
        #[source]
        source: serde_json::Error,
    },
}

/// A locally executed function advertised to the model.
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    /// JSON Schema of the arguments object.
    fn parameters(&self) -> Value;

    async fn invoke(&self, arguments: Value) -> Result<Value, ToolError>;
}

#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: HashMap<&'static str, Arc<dyn Tool>>,
    order: Vec<&'static str>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The two recording tools, both reporting through `notifier`.
    pub fn standard(notifier: Arc<dyn Notifier>) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(RecordUserDetails::new(notifier.clone())));
        registry.register(Arc::new(RecordUnknownQuestion::new(notifier)));
        registry
    }

    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        let name = tool.name();
        if self.tools.insert(name, tool).is_none() {
            self.order.push(name);
        }
    }

    /// Tool advertisement in the chat-completion `tools` format, in
    /// registration order.
    pub fn schemas(&self) -> Vec<Value> {
        self.order
            .iter()
            .filter_map(|name| self.tools.get(name))
            .map(|tool| {
                json!({
                    "type": "function",
                    "function": {
                        "name": tool.name(),
                        "description": tool.description(),
                        "parameters": tool.parameters(),
                    }
                })
            })
            .collect()
    }

    /// Resolves one call. Arguments are decoded before the name lookup, so
    /// malformed JSON fails even for an unknown tool.
    pub async fn dispatch(&self, call: &ToolCallRequest) -> Result<ToolResult, ToolError> {
        let name = call.function.name.as_str();
        let arguments: Value = serde_json::from_str(&call.function.arguments).map_err(|source| {
            ToolError::InvalidArguments {
                tool: name.to_string(),
                source,
            }
        })?;

        info!("Tool called: {name}");

        let content = match self.tools.get(name) {
            Some(tool) => tool.invoke(arguments).await?,
            None => {
                warn!("Model requested unregistered tool '{name}', returning empty result");
                json!({})
            }
        };

        Ok(ToolResult {
            call_id: call.id.clone(),
            content,
        })
    }

    /// Resolves every call in order. The first failure aborts the batch.
    pub async fn resolve_all(
        &self,
        calls: &[ToolCallRequest],
    ) -> Result<Vec<ToolResult>, ToolError> {
        let mut results = Vec::with_capacity(calls.len());
        for call in calls {
            results.push(self.dispatch(call).await?);
        }
        Ok(results)
    }
}
