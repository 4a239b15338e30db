//! The two recording tools. Both push a notification and report success
//! whether or not the push went through.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::warn;

use crate::notify::Notifier;
use crate::tools::{Tool, ToolError};

const DEFAULT_NAME: &str = "Name not provided";
const DEFAULT_NOTES: &str = "not provided";

fn recorded() -> Value {
    json!({ "recorded": "ok" })
}

async fn push(notifier: &dyn Notifier, tool: &str, text: &str) {
    if let Err(e) = notifier.notify(text).await {
        warn!("Notification from {tool} not delivered: {e}");
    }
}

fn decode<T: for<'de> Deserialize<'de>>(tool: &str, arguments: Value) -> Result<T, ToolError> {
    serde_json::from_value(arguments).map_err(|source| ToolError::InvalidArguments {
        tool: tool.to_string(),
        source,
    })
}

#[derive(Debug, Deserialize)]
struct UserDetailsArgs {
    email: String,
    name: Option<String>,
    notes: Option<String>,
}

/// Records that a visitor wants to get in touch.
pub struct RecordUserDetails {
    notifier: Arc<dyn Notifier>,
}

impl RecordUserDetails {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self { notifier }
    }
}

#[async_trait]
impl Tool for RecordUserDetails {
    fn name(&self) -> &'static str {
        "record_user_details"
    }

    fn description(&self) -> &'static str {
        "Use this tool to record that a user is interested in being in touch and provided an email address"
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "email": {
                    "type": "string",
                    "description": "The email address of this user"
                },
                "name": {
                    "type": "string",
                    "description": "The user's name, if they provided it"
                },
                "notes": {
                    "type": "string",
                    "description": "Any additional information about the conversation that's worth recording to give context"
                }
            },
            "required": ["email"],
            "additionalProperties": false
        })
    }

    async fn invoke(&self, arguments: Value) -> Result<Value, ToolError> {
        let args: UserDetailsArgs = decode(self.name(), arguments)?;
        let text = format!(
            "Recording {} with email {} and notes {}",
            args.name.as_deref().unwrap_or(DEFAULT_NAME),
            args.email,
            args.notes.as_deref().unwrap_or(DEFAULT_NOTES),
        );
        push(self.notifier.as_ref(), self.name(), &text).await;
        Ok(recorded())
    }
}

#[derive(Debug, Deserialize)]
struct UnknownQuestionArgs {
    question: String,
}

/// Records a question the persona could not answer.
pub struct RecordUnknownQuestion {
    notifier: Arc<dyn Notifier>,
}

impl RecordUnknownQuestion {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self { notifier }
    }
}

#[async_trait]
impl Tool for RecordUnknownQuestion {
    fn name(&self) -> &'static str {
        "record_unknown_question"
    }

    fn description(&self) -> &'static str {
        "Always use this tool to record any question that couldn't be answered as you didn't know the answer"
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "question": {
                    "type": "string",
                    "description": "The question that couldn't be answered"
                }
            },
            "required": ["question"],
            "additionalProperties": false
        })
    }

    async fn invoke(&self, arguments: Value) -> Result<Value, ToolError> {
        let args: UnknownQuestionArgs = decode(self.name(), arguments)?;
        push(
            self.notifier.as_ref(),
            self.name(),
            &format!("Recording {}", args.question),
        )
        .await;
        Ok(recorded())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::testing::RecordingNotifier;

    #[tokio::test]
    async fn test_user_details_defaults_for_missing_fields() {
        let notifier = Arc::new(RecordingNotifier::default());
        let tool = RecordUserDetails::new(notifier.clone());

        let result = tool
            .invoke(json!({"email": "sam@example.org"}))
            .await
            .unwrap();

        assert_eq!(result, json!({"recorded": "ok"}));
        assert_eq!(
            notifier.messages(),
            vec!["Recording Name not provided with email sam@example.org and notes not provided"]
        );
    }

    #[tokio::test]
    async fn test_user_details_with_all_fields() {
        let notifier = Arc::new(RecordingNotifier::default());
        let tool = RecordUserDetails::new(notifier.clone());

        tool.invoke(json!({
            "email": "sam@example.org",
            "name": "Sam",
            "notes": "hiring for a Rust role"
        }))
        .await
        .unwrap();

        assert_eq!(
            notifier.messages(),
            vec!["Recording Sam with email sam@example.org and notes hiring for a Rust role"]
        );
    }

    #[tokio::test]
    async fn test_user_details_succeeds_when_delivery_fails() {
        let notifier = Arc::new(RecordingNotifier::failing());
        let tool = RecordUserDetails::new(notifier.clone());

        let result = tool
            .invoke(json!({"email": "sam@example.org"}))
            .await
            .unwrap();

        assert_eq!(result, json!({"recorded": "ok"}));
        assert_eq!(notifier.messages().len(), 1);
    }

    #[tokio::test]
    async fn test_user_details_requires_email() {
        let notifier = Arc::new(RecordingNotifier::default());
        let tool = RecordUserDetails::new(notifier.clone());

        let err = tool.invoke(json!({"name": "Sam"})).await.unwrap_err();

        assert!(err.to_string().contains("email"));
        assert!(notifier.messages().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_question_message() {
        let notifier = Arc::new(RecordingNotifier::default());
        let tool = RecordUnknownQuestion::new(notifier.clone());

        let result = tool
            .invoke(json!({"question": "What is your favourite colour?"}))
            .await
            .unwrap();

        assert_eq!(result, json!({"recorded": "ok"}));
        assert_eq!(
            notifier.messages(),
            vec!["Recording What is your favourite colour?"]
        );
    }
}
