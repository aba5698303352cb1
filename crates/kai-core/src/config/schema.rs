//! Configuration schema.
//!
//! Hierarchy: `Config` → `AgentSettings`, `ProviderSettings`.
//!
//! JSON on disk uses **camelCase** keys; Rust uses snake_case.
//! We use `#[serde(rename_all = "camelCase")]` to handle the conversion.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::types::GenerationParams;

// ─────────────────────────────────────────────
// Root Config
// ─────────────────────────────────────────────

/// Root configuration: loaded from `~/.kai/config.json` + env vars.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub agent: AgentSettings,
    pub provider: ProviderSettings,
}

// ─────────────────────────────────────────────
// Agent
// ─────────────────────────────────────────────

/// How tool calls travel between the model and the agent.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProtocolKind {
    /// Provider-native tool calls, fed back over multiple rounds.
    #[default]
    Structured,
    /// `TOOL:<name>:<input>` in plain text, one tool per turn.
    Sentinel,
}

impl std::str::FromStr for ProtocolKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "structured" => Ok(ProtocolKind::Structured),
            "sentinel" => Ok(ProtocolKind::Sentinel),
            other => Err(format!("unknown tool protocol '{other}'")),
        }
    }
}

/// Agent settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AgentSettings {
    /// Display name of the agent.
    pub name: String,
    /// Initial system prompt.
    pub system_prompt: String,
    /// Maximum number of turns kept in memory.
    pub max_messages: usize,
    /// Maximum tool-call rounds per user message (structured protocol).
    pub max_tool_rounds: usize,
    /// Tool-calling protocol.
    pub protocol: ProtocolKind,
    /// Sampling temperature. Provider default when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// Maximum tokens to generate. Provider default when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            name: "agent".to_string(),
            system_prompt: "You are a helpful assistant.".to_string(),
            max_messages: 20,
            max_tool_rounds: 3,
            protocol: ProtocolKind::Structured,
            temperature: None,
            max_tokens: None,
        }
    }
}

impl AgentSettings {
    /// Generation params applied to every chat unless the caller overrides them.
    pub fn generation_params(&self) -> GenerationParams {
        GenerationParams {
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            ..Default::default()
        }
    }
}

// ─────────────────────────────────────────────
// Provider
// ─────────────────────────────────────────────

/// Connection settings for the chat-completions endpoint.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProviderSettings {
    /// Provider preset name (`"lmstudio"`, `"openai"`).
    pub name: String,
    /// Model identifier sent with every request.
    pub model: String,
    /// API key for Bearer authentication. Empty for local servers.
    pub api_key: String,
    /// Custom API base URL (overrides the preset default).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
    /// Extra HTTP headers to send with each request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra_headers: Option<HashMap<String, String>>,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Extra attempts after a transient failure.
    pub max_retries: u32,
    /// Base delay between retries in milliseconds (grows linearly).
    pub retry_delay_ms: u64,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            name: "lmstudio".to_string(),
            model: "local-model".to_string(),
            api_key: String::new(),
            api_base: None,
            extra_headers: None,
            timeout_secs: 120,
            max_retries: 2,
            retry_delay_ms: 1000,
        }
    }
}

impl ProviderSettings {
    /// Whether an API key has been configured.
    pub fn has_api_key(&self) -> bool {
        !self.api_key.is_empty()
    }
}
