//! Kai core: conversation data model, errors, configuration, and helpers
//! shared by the provider, agent, and CLI crates.

pub mod config;
pub mod error;
pub mod types;
pub mod utils;

pub use error::LlmError;
pub use types::{
    CompletionResult, GenerationParams, Role, ToolCallRequest, ToolDefinition, Turn, Usage,
};
