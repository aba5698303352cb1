//! LLM client layer for Kai.
//!
//! # Architecture
//!
//! - [`traits::LlmClient`]: trait that all model clients implement
//! - [`registry`]: static presets for the supported endpoints
//! - [`http_provider::OpenAiClient`]: generic OpenAI-compatible HTTP client
//! - [`http_provider::create_client`]: convenience builder from settings
//! - [`retry`]: bounded retry for transient failures

pub mod http_provider;
pub mod registry;
pub mod retry;
pub mod traits;

// Re-export main types for convenience
pub use http_provider::{create_client, extract_openai_tool_calls, OpenAiClient};
pub use registry::{find_by_name, ProviderSpec, PROVIDERS};
pub use retry::RetryPolicy;
pub use traits::LlmClient;
