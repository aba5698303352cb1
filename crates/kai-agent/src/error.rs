//! Agent error types.

use kai_core::LlmError;
use thiserror::Error;

/// Errors surfaced by [`crate::Agent`] operations.
#[derive(Debug, Error)]
pub enum AgentError {
    /// The model call failed (after the client's own retries).
    #[error("model call failed: {0}")]
    Model(#[from] LlmError),

    /// The tool set was fixed at construction and can't be changed.
    #[error("tools are fixed for this agent")]
    ToolsLocked,
}

/// Errors from [`crate::AgentBuilder::build`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BuildError {
    #[error("an LLM client is required")]
    MissingClient,

    #[error("duplicate tool name '{0}'")]
    DuplicateTool(String),
}
