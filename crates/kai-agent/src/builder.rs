//! Agent builder.
//!
//! `AgentBuilder` is consumed by `build()`, validates its slots, and hands the
//! result to [`Agent`]. Nothing of the builder survives construction.

use std::sync::Arc;

use kai_core::config::AgentSettings;
use kai_core::types::GenerationParams;
use kai_providers::LlmClient;

use crate::agent::Agent;
use crate::error::BuildError;
use crate::memory::{InMemoryMemory, Memory};
use crate::protocol::ToolProtocol;
use crate::tools::{Tool, ToolRegistry};

/// Default display name.
pub const DEFAULT_NAME: &str = "agent";

/// Default system prompt.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant.";

// ─────────────────────────────────────────────
// AgentConfig
// ─────────────────────────────────────────────

/// Everything an [`Agent`] is made of.
pub struct AgentConfig {
    pub display_name: String,
    pub system_prompt: String,
    pub client: Arc<dyn LlmClient>,
    pub memory: Box<dyn Memory>,
    pub tools: ToolRegistry,
    pub protocol: ToolProtocol,
    /// Params used by `chat_with_defaults` and `reply`.
    pub params: GenerationParams,
}

impl AgentConfig {
    /// Defaults around a client: no tools, 20-turn memory, structured protocol.
    pub fn new(client: Arc<dyn LlmClient>) -> Self {
        Self {
            display_name: DEFAULT_NAME.to_string(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            client,
            memory: Box::new(InMemoryMemory::default()),
            tools: ToolRegistry::new(),
            protocol: ToolProtocol::default(),
            params: GenerationParams::default(),
        }
    }
}

impl std::fmt::Debug for AgentConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentConfig")
            .field("display_name", &self.display_name)
            .field("client", &self.client.display_name())
            .field("tools", &self.tools)
            .field("protocol", &self.protocol)
            .finish()
    }
}

// ─────────────────────────────────────────────
// AgentBuilder
// ─────────────────────────────────────────────

/// Typed builder for a strict [`Agent`]: tool names must be unique and the
/// tool set is fixed once built.
#[derive(Default)]
pub struct AgentBuilder {
    display_name: Option<String>,
    system_prompt: Option<String>,
    client: Option<Arc<dyn LlmClient>>,
    memory: Option<Box<dyn Memory>>,
    tools: Vec<Arc<dyn Tool>>,
    protocol: Option<ToolProtocol>,
    params: GenerationParams,
}

impl AgentBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed name, prompt, memory bound, protocol and params from settings.
    pub fn from_settings(settings: &AgentSettings) -> Self {
        Self::new()
            .name(settings.name.clone())
            .system_prompt(settings.system_prompt.clone())
            .memory(Box::new(InMemoryMemory::new(settings.max_messages)))
            .protocol(ToolProtocol::from_settings(settings))
            .params(settings.generation_params())
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    /// Set the model client. Required.
    pub fn client(mut self, client: Arc<dyn LlmClient>) -> Self {
        self.client = Some(client);
        self
    }

    /// Replace the default [`InMemoryMemory`].
    pub fn memory(mut self, memory: Box<dyn Memory>) -> Self {
        self.memory = Some(memory);
        self
    }

    /// Add a tool. Duplicates are reported by `build()`.
    pub fn tool(mut self, tool: Arc<dyn Tool>) -> Self {
        self.tools.push(tool);
        self
    }

    pub fn tools(mut self, tools: impl IntoIterator<Item = Arc<dyn Tool>>) -> Self {
        self.tools.extend(tools);
        self
    }

    pub fn protocol(mut self, protocol: ToolProtocol) -> Self {
        self.protocol = Some(protocol);
        self
    }

    pub fn params(mut self, params: GenerationParams) -> Self {
        self.params = params;
        self
    }

    /// Validate and produce the config without constructing the agent.
    pub fn build_config(self) -> Result<AgentConfig, BuildError> {
        let client = self.client.ok_or(BuildError::MissingClient)?;

        let mut tools = ToolRegistry::new();
        for tool in self.tools {
            tools.try_register(tool)?;
        }

        Ok(AgentConfig {
            display_name: self.display_name.unwrap_or_else(|| DEFAULT_NAME.to_string()),
            system_prompt: self
                .system_prompt
                .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string()),
            client,
            memory: self
                .memory
                .unwrap_or_else(|| Box::new(InMemoryMemory::default())),
            tools,
            protocol: self.protocol.unwrap_or_default(),
            params: self.params,
        })
    }

    /// Validate and construct a strict agent.
    pub fn build(self) -> Result<Agent, BuildError> {
        Ok(Agent::new(self.build_config()?))
    }
}
