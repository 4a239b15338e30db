use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Speaker of a turn. Roles this service does not produce itself (for
/// example `developer`) are carried through under `Other`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(from = "String", into = "String")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
    Other(String),
}

impl Role {
    pub fn as_str(&self) -> &str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::Tool => "tool",
            Role::Other(role) => role,
        }
    }
}

impl From<String> for Role {
    fn from(role: String) -> Self {
        match role.as_str() {
            "system" => Role::System,
            "user" => Role::User,
            "assistant" => Role::Assistant,
            "tool" => Role::Tool,
            _ => Role::Other(role),
        }
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        match role {
            Role::Other(role) => role,
            known => known.as_str().to_string(),
        }
    }
}

/// One turn of the conversation, in the shape the chat-completion API accepts.
/// Fields not declared here are kept in `extra` and sent upstream unchanged.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatTurn {
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
    /// Only present on an assistant turn that asked for tools.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCallRequest>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ChatTurn {
    fn text(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: Some(content.into()),
            tool_call_id: None,
            tool_calls: None,
            extra: Map::new(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::text(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::text(Role::User, content)
    }

    /// The assistant turn that requested `calls`, echoed back upstream
    /// ahead of the tool results.
    pub fn assistant_tool_calls(content: Option<String>, calls: Vec<ToolCallRequest>) -> Self {
        Self {
            role: Role::Assistant,
            content,
            tool_call_id: None,
            tool_calls: Some(calls),
            extra: Map::new(),
        }
    }
}

#[cfg(test)]
impl ChatTurn {
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::text(Role::Assistant, content)
    }
}

/// A tool invocation requested by the model. `arguments` is the raw
/// JSON-encoded string exactly as the API sent it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolCallRequest {
    pub id: String,
    #[serde(rename = "type", default = "function_kind")]
    pub kind: String,
    pub function: FunctionCall,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FunctionCall {
    pub name: String,
    pub arguments: String,
}

fn function_kind() -> String {
    "function".to_string()
}

#[cfg(test)]
impl ToolCallRequest {
    pub fn new(id: impl Into<String>, name: impl Into<String>, arguments: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: function_kind(),
            function: FunctionCall {
                name: name.into(),
                arguments: arguments.into(),
            },
        }
    }
}

/// Output of one local tool, paired with the call that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolResult {
    pub call_id: String,
    pub content: Value,
}

impl From<ToolResult> for ChatTurn {
    fn from(result: ToolResult) -> Self {
        ChatTurn {
            role: Role::Tool,
            content: Some(result.content.to_string()),
            tool_call_id: Some(result.call_id),
            tool_calls: None,
            extra: Map::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_user_turn_serializes_without_optional_fields() {
        let value = serde_json::to_value(ChatTurn::user("hi")).unwrap();
        assert_eq!(value, json!({"role": "user", "content": "hi"}));
    }

    #[test]
    fn test_tool_result_becomes_tool_turn() {
        let turn: ChatTurn = ToolResult {
            call_id: "call_1".to_string(),
            content: json!({"recorded": "ok"}),
        }
        .into();
        assert_eq!(turn.role, Role::Tool);
        assert_eq!(turn.tool_call_id.as_deref(), Some("call_1"));
        assert_eq!(turn.content.as_deref(), Some(r#"{"recorded":"ok"}"#));
    }

    #[test]
    fn test_history_turn_keeps_undeclared_fields() {
        let raw = json!({"role": "user", "content": "x", "name": "bob", "metadata": {"k": 1}});
        let turn: ChatTurn = serde_json::from_value(raw.clone()).unwrap();

        assert_eq!(turn.extra["name"], "bob");
        assert_eq!(serde_json::to_value(&turn).unwrap(), raw);
    }

    #[test]
    fn test_unfamiliar_role_passes_through() {
        let raw = json!({"role": "developer", "content": "be brief"});
        let turn: ChatTurn = serde_json::from_value(raw.clone()).unwrap();

        assert_eq!(turn.role, Role::Other("developer".to_string()));
        assert_eq!(serde_json::to_value(&turn).unwrap(), raw);
    }

    #[test]
    fn test_known_roles_round_trip_as_strings() {
        for role in ["system", "user", "assistant", "tool"] {
            let parsed = Role::from(role.to_string());
            assert!(!matches!(parsed, Role::Other(_)));
            assert_eq!(String::from(parsed), role);
        }
    }

    #[test]
    fn test_tool_call_request_wire_shape() {
        let call: ToolCallRequest = serde_json::from_value(json!({
            "id": "call_9",
            "type": "function",
            "function": {"name": "record_unknown_question", "arguments": "{\"question\":\"?\"}"}
        }))
        .unwrap();
        assert_eq!(call, ToolCallRequest::new("call_9", "record_unknown_question", "{\"question\":\"?\"}"));
    }
}
