//! Tool trait: the abstract interface every agent tool must implement.

use async_trait::async_trait;
use serde_json::{Map, Value};

use kai_core::types::ToolDefinition;

use super::context::ToolContext;

// ─────────────────────────────────────────────
// Tool trait
// ─────────────────────────────────────────────

/// Every agent tool implements this trait.
///
/// The orchestrator discovers tools via `name()`, advertises their schemas to
/// the model via `to_definition()`, and dispatches calls via `execute()`.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Name used by the model to call this tool (e.g. `"calculator"`).
    /// Matched case-insensitively.
    fn name(&self) -> &str;

    /// Human-readable description shown to the model.
    fn description(&self) -> &str;

    /// JSON Schema describing the input. Advertised only, never enforced.
    fn parameters(&self) -> Value;

    /// Execute the tool.
    ///
    /// `input` is the raw argument text: a JSON object under the structured
    /// protocol, free text under the sentinel protocol. On failure return an
    /// `Err`; the caller converts it to an error string for the model.
    async fn execute(&self, input: &str, ctx: &mut ToolContext<'_>) -> anyhow::Result<String>;

    /// Build the `ToolDefinition` sent to the model.
    fn to_definition(&self) -> ToolDefinition {
        ToolDefinition::new(self.name(), self.description(), self.parameters())
    }
}

// ─────────────────────────────────────────────
// FnTool
// ─────────────────────────────────────────────

type ToolFn = dyn Fn(&str) -> anyhow::Result<String> + Send + Sync;

/// A tool backed by a plain synchronous closure.
pub struct FnTool {
    name: String,
    description: String,
    parameters: Value,
    func: Box<ToolFn>,
}

impl FnTool {
    pub fn new<F>(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: Value,
        func: F,
    ) -> Self
    where
        F: Fn(&str) -> anyhow::Result<String> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            description: description.into(),
            parameters,
            func: Box::new(func),
        }
    }
}

impl std::fmt::Debug for FnTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnTool").field("name", &self.name).finish()
    }
}

#[async_trait]
impl Tool for FnTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn parameters(&self) -> Value {
        self.parameters.clone()
    }

    async fn execute(&self, input: &str, _ctx: &mut ToolContext<'_>) -> anyhow::Result<String> {
        (self.func)(input)
    }
}

// ─────────────────────────────────────────────
// Argument helpers
// ─────────────────────────────────────────────

/// Parse the argument text as a JSON object. Empty input is an empty object.
pub fn parse_arguments(input: &str) -> anyhow::Result<Map<String, Value>> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(Map::new());
    }
    match serde_json::from_str::<Value>(trimmed) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => anyhow::bail!("Expected a JSON object, got: {other}"),
        Err(e) => anyhow::bail!("Invalid JSON arguments: {e}"),
    }
}

/// `input[key]` when the input is a JSON object, otherwise the trimmed raw text.
///
/// Lets one tool serve both protocols. A JSON object without `key` yields `""`;
/// a non-string value yields its JSON text.
pub fn argument_or_raw(input: &str, key: &str) -> String {
    match parse_arguments(input) {
        Ok(args) => match args.get(key) {
            Some(Value::String(s)) => s.trim().to_string(),
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        },
        Err(_) => input.trim().to_string(),
    }
}
