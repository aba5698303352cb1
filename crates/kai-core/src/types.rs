//! Core types for Kai: the conversation data model shared by every crate.
//!
//! `Turn` is the unit stored in memory and sent to the model. The `wire`
//! section models the OpenAI chat completions format used by HTTP clients.

use serde::{Deserialize, Serialize};
use std::fmt;

// ─────────────────────────────────────────────
// Turns
// ─────────────────────────────────────────────

/// Who produced a turn.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

impl Role {
    /// Lowercase name as used on the wire (`"system"`, `"user"`, ...).
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::Tool => "tool",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One role-tagged message in the conversation history.
///
/// Turns are never mutated after construction. `tool_calls` and `tool_call_id`
/// are correlation data for provider adapters; they don't change the meaning of
/// `role` and `content`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Turn {
    role: Role,
    content: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    tool_calls: Vec<ToolCallRequest>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

impl Turn {
    /// Create a turn with the given role and content.
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Turn {
            role,
            content: content.into(),
            tool_calls: Vec::new(),
            tool_call_id: None,
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Turn::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Turn::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Turn::new(Role::Assistant, content)
    }

    pub fn tool(content: impl Into<String>) -> Self {
        Turn::new(Role::Tool, content)
    }

    /// Assistant turn that requested the given tool calls.
    pub fn assistant_with_calls(content: impl Into<String>, calls: Vec<ToolCallRequest>) -> Self {
        Turn {
            tool_calls: calls,
            ..Turn::assistant(content)
        }
    }

    /// Tool result turn, correlated to the request that produced it when the
    /// provider supplied an id.
    pub fn tool_result(call_id: Option<String>, content: impl Into<String>) -> Self {
        Turn {
            tool_call_id: call_id,
            ..Turn::tool(content)
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn tool_calls(&self) -> &[ToolCallRequest] {
        &self.tool_calls
    }

    pub fn tool_call_id(&self) -> Option<&str> {
        self.tool_call_id.as_deref()
    }
}

// ─────────────────────────────────────────────
// Generation parameters
// ─────────────────────────────────────────────

/// Optional sampling knobs. `None` means "use the provider default".
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct GenerationParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop: Option<Vec<String>>,
}

impl GenerationParams {
    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

// ─────────────────────────────────────────────
// Tool calls and declarations
// ─────────────────────────────────────────────

/// A request from the model to run a tool.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ToolCallRequest {
    /// Provider-assigned id, when the provider has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    /// Raw argument text (usually JSON).
    pub arguments: String,
}

impl ToolCallRequest {
    pub fn new(name: impl Into<String>, arguments: impl Into<String>) -> Self {
        ToolCallRequest {
            id: None,
            name: name.into(),
            arguments: arguments.into(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

/// Definition of a tool, sent to the LLM so it knows what tools are available.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ToolDefinition {
    /// Always "function".
    #[serde(rename = "type")]
    pub tool_type: String,
    /// The function schema.
    pub function: FunctionDefinition,
}

/// Schema of a function tool.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct FunctionDefinition {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

impl ToolDefinition {
    /// Create a new tool definition.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: serde_json::Value,
    ) -> Self {
        ToolDefinition {
            tool_type: "function".to_string(),
            function: FunctionDefinition {
                name: name.into(),
                description: description.into(),
                parameters,
            },
        }
    }
}

// ─────────────────────────────────────────────
// Completion result
// ─────────────────────────────────────────────

/// Token usage statistics. Providers may omit any field.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Usage {
    #[serde(default)]
    pub prompt_tokens: Option<u32>,
    #[serde(default)]
    pub completion_tokens: Option<u32>,
    #[serde(default)]
    pub total_tokens: Option<u32>,
}

impl Usage {
    pub fn new(prompt: u32, completion: u32, total: u32) -> Self {
        Usage {
            prompt_tokens: Some(prompt),
            completion_tokens: Some(completion),
            total_tokens: Some(total),
        }
    }
}

/// The model's answer to one invocation.
///
/// `raw` is the untouched provider response; it is the only place pending tool
/// calls can be discovered, and only the client that produced it knows how.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CompletionResult {
    pub text: String,
    pub usage: Option<Usage>,
    pub raw: Option<serde_json::Value>,
}

impl CompletionResult {
    /// A plain text completion with no usage and no raw payload.
    pub fn text(text: impl Into<String>) -> Self {
        CompletionResult {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn with_usage(mut self, usage: Usage) -> Self {
        self.usage = Some(usage);
        self
    }

    pub fn with_raw(mut self, raw: serde_json::Value) -> Self {
        self.raw = Some(raw);
        self
    }
}

// ─────────────────────────────────────────────
// Wire format (OpenAI chat completions)
// ─────────────────────────────────────────────

/// A chat message as sent to an OpenAI-compatible API.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct WireMessage {
    pub role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<WireToolCall>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl From<&Turn> for WireMessage {
    fn from(turn: &Turn) -> Self {
        // Calls without an id can't be correlated on the wire and are left off.
        let calls: Vec<WireToolCall> = turn
            .tool_calls()
            .iter()
            .filter_map(|call| {
                call.id.as_ref().map(|id| WireToolCall {
                    id: id.clone(),
                    call_type: "function".to_string(),
                    function: WireFunctionCall {
                        name: call.name.clone(),
                        arguments: call.arguments.clone(),
                    },
                })
            })
            .collect();

        WireMessage {
            role: turn.role().as_str().to_string(),
            content: Some(turn.content().to_string()),
            tool_calls: if calls.is_empty() { None } else { Some(calls) },
            tool_call_id: turn.tool_call_id().map(String::from),
        }
    }
}

/// A tool call in OpenAI format.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct WireToolCall {
    pub id: String,
    #[serde(rename = "type", default = "function_type")]
    pub call_type: String,
    pub function: WireFunctionCall,
}

fn function_type() -> String {
    "function".to_string()
}

/// The function name and JSON-encoded arguments within a tool call.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct WireFunctionCall {
    pub name: String,
    pub arguments: String,
}

/// Request body for an OpenAI-compatible chat completion API.
#[derive(Debug, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<WireMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<ToolDefinition>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_choice: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop: Option<Vec<String>>,
    pub stream: bool,
}

/// Chat completion response body. Used for deserialization only.
#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub id: Option<String>,
    pub choices: Vec<ChatChoice>,
    #[serde(default)]
    pub usage: Option<Usage>,
}

/// A single choice in a chat completion response.
#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: AssistantMessage,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// The assistant message within a chat completion choice.
#[derive(Debug, Deserialize)]
pub struct AssistantMessage {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub tool_calls: Option<Vec<WireToolCall>>,
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_role_serializes_lowercase() {
        let json = serde_json::to_value(Turn::assistant("hi")).unwrap();
        assert_eq!(json["role"], "assistant");
        assert_eq!(json["content"], "hi");
        assert!(json.get("tool_calls").is_none());
        assert!(json.get("tool_call_id").is_none());
    }

    #[test]
    fn test_turn_constructors() {
        assert_eq!(Turn::system("s").role(), Role::System);
        assert_eq!(Turn::user("u").role(), Role::User);
        assert_eq!(Turn::tool("t").role(), Role::Tool);

        let call = ToolCallRequest::new("calculator", "2+2").with_id("call_1");
        let turn = Turn::assistant_with_calls("", vec![call.clone()]);
        assert_eq!(turn.role(), Role::Assistant);
        assert_eq!(turn.tool_calls(), &[call]);

        let result = Turn::tool_result(Some("call_1".into()), "Result: 4");
        assert_eq!(result.tool_call_id(), Some("call_1"));
        assert_eq!(result.content(), "Result: 4");
    }

    #[test]
    fn test_role_display() {
        assert_eq!(Role::Tool.to_string(), "tool");
        assert_eq!(Role::System.to_string().to_uppercase(), "SYSTEM");
    }

    #[test]
    fn test_generation_params_skip_none() {
        let params = GenerationParams::default().with_temperature(0.2);
        let json = serde_json::to_value(&params).unwrap();
        assert_eq!(json, json!({"temperature": 0.2}));
    }

    #[test]
    fn test_wire_message_from_tool_result() {
        let turn = Turn::tool_result(Some("call_9".into()), "done");
        let wire = WireMessage::from(&turn);
        assert_eq!(wire.role, "tool");
        assert_eq!(wire.content.as_deref(), Some("done"));
        assert_eq!(wire.tool_call_id.as_deref(), Some("call_9"));
        assert!(wire.tool_calls.is_none());
    }

    #[test]
    fn test_wire_message_drops_uncorrelated_calls() {
        let turn = Turn::assistant_with_calls(
            "thinking",
            vec![
                ToolCallRequest::new("a", "{}"),
                ToolCallRequest::new("b", "{}").with_id("call_b"),
            ],
        );
        let wire = WireMessage::from(&turn);
        let calls = wire.tool_calls.unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].id, "call_b");
        assert_eq!(calls[0].function.name, "b");
    }

    #[test]
    fn test_chat_request_serialization() {
        let request = ChatCompletionRequest {
            model: "local-model".to_string(),
            messages: vec![WireMessage::from(&Turn::user("Hello"))],
            tools: None,
            tool_choice: None,
            temperature: Some(0.7),
            max_tokens: None,
            top_p: None,
            stop: None,
            stream: false,
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "local-model");
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["temperature"], 0.7);
        assert_eq!(json["stream"], false);
        assert!(json.get("tools").is_none());
        assert!(json.get("max_tokens").is_none());
    }

    #[test]
    fn test_tool_definition_serialization() {
        let def = ToolDefinition::new("calculator", "Math", json!({"type": "object"}));
        let json = serde_json::to_value(&def).unwrap();
        assert_eq!(json["type"], "function");
        assert_eq!(json["function"]["name"], "calculator");
        assert_eq!(json["function"]["parameters"]["type"], "object");
    }

    #[test]
    fn test_chat_completion_response_parsing() {
        let resp: ChatCompletionResponse = serde_json::from_value(json!({
            "id": "chatcmpl-1",
            "choices": [{
                "message": {
                    "content": null,
                    "tool_calls": [{
                        "id": "call_1",
                        "type": "function",
                        "function": { "name": "time.now", "arguments": "{}" }
                    }]
                },
                "finish_reason": "tool_calls"
            }],
            "usage": { "prompt_tokens": 3, "completion_tokens": 2, "total_tokens": 5 }
        }))
        .unwrap();

        let choice = &resp.choices[0];
        assert!(choice.message.content.is_none());
        assert_eq!(choice.message.tool_calls.as_ref().unwrap()[0].function.name, "time.now");
        assert_eq!(resp.usage, Some(Usage::new(3, 2, 5)));
    }

    #[test]
    fn test_partial_usage_parses() {
        let usage: Usage = serde_json::from_value(json!({"total_tokens": 9})).unwrap();
        assert_eq!(usage.total_tokens, Some(9));
        assert!(usage.prompt_tokens.is_none());
    }
}
