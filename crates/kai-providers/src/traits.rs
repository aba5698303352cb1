//! LLM client trait: the model-invocation boundary.
//!
//! The agent only ever talks to a model through this trait. Every backend
//! adapter (the OpenAI-compatible `OpenAiClient`, test doubles, ...) implements it.

use async_trait::async_trait;
use kai_core::types::{CompletionResult, GenerationParams, ToolCallRequest, ToolDefinition, Turn};
use kai_core::LlmError;

/// Trait that all LLM clients must implement.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Send a chat completion request.
    ///
    /// # Arguments
    /// * `turns` : Prompt context, oldest first (system turns included).
    /// * `tools` : Tool declarations the model may call. Empty means none.
    /// * `params`: Temperature, max_tokens, etc. `None` fields use provider defaults.
    ///
    /// Retries, if any, happen inside this call: it either returns one
    /// completion or fails once.
    async fn chat(
        &self,
        turns: &[Turn],
        tools: &[ToolDefinition],
        params: &GenerationParams,
    ) -> Result<CompletionResult, LlmError>;

    /// Pull pending tool-call requests out of a completion's raw payload.
    ///
    /// Only the client knows its provider's payload shape. Anything it can't
    /// parse must yield an empty list, never an error.
    fn extract_tool_calls(&self, _result: &CompletionResult) -> Vec<ToolCallRequest> {
        Vec::new()
    }

    /// Display name for logging.
    fn display_name(&self) -> &str;

    /// Model identifier, when the client targets a specific model.
    fn model(&self) -> &str {
        ""
    }
}
