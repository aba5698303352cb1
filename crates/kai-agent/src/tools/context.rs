//! Per-invocation tool context.
//!
//! A [`ToolContext`] is created fresh for every tool execution and dropped
//! right after. It gives the tool a restricted view of the calling agent
//! ([`AgentHandle`]) and a typed scratch map ([`Scratch`]).

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use kai_core::types::Turn;

use crate::agent::Agent;

// ─────────────────────────────────────────────
// AgentHandle
// ─────────────────────────────────────────────

/// Borrowed back-reference to the agent running a tool.
///
/// Exposes memory notes, the summary, the system prompt and the tool list,
/// but not `chat`: a tool cannot start a nested conversation turn.
#[derive(Clone, Copy)]
pub struct AgentHandle<'a> {
    agent: &'a Agent,
}

impl<'a> AgentHandle<'a> {
    pub(crate) fn new(agent: &'a Agent) -> Self {
        Self { agent }
    }

    pub fn display_name(&self) -> &'a str {
        self.agent.display_name()
    }

    pub fn system_prompt(&self) -> String {
        self.agent.system_prompt()
    }

    /// Store a note in the agent's memory as a system turn.
    pub fn remember(&self, note: &str) {
        self.agent.remember(note);
    }

    pub fn summary(&self) -> Option<String> {
        self.agent.summary()
    }

    pub fn set_summary(&self, summary: Option<String>) {
        self.agent.set_summary(summary);
    }

    pub fn recent(&self, limit: usize) -> Vec<Turn> {
        self.agent.recent(limit)
    }

    pub fn tool_names(&self) -> Vec<String> {
        self.agent.tool_names()
    }
}

impl std::fmt::Debug for AgentHandle<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentHandle")
            .field("agent", &self.agent.display_name())
            .finish()
    }
}

// ─────────────────────────────────────────────
// Scratch
// ─────────────────────────────────────────────

/// Typed key/value map scoped to one tool invocation.
///
/// Values go through `serde_json`, so anything `Serialize` can be stored and
/// read back as any compatible `DeserializeOwned` type.
#[derive(Debug, Default, Clone)]
pub struct Scratch {
    values: HashMap<String, Value>,
}

impl Scratch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a value, replacing any previous one under the same key.
    pub fn insert<T: Serialize>(&mut self, key: impl Into<String>, value: T) -> anyhow::Result<()> {
        self.values.insert(key.into(), serde_json::to_value(value)?);
        Ok(())
    }

    /// Read a value back. `None` if the key is absent or the stored value
    /// doesn't fit `T`.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.values
            .get(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.values.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

// ─────────────────────────────────────────────
// ToolContext
// ─────────────────────────────────────────────

/// Everything a tool gets besides its input string.
#[derive(Debug, Default)]
pub struct ToolContext<'a> {
    agent: Option<AgentHandle<'a>>,
    pub scratch: Scratch,
}

impl<'a> ToolContext<'a> {
    /// Context for a tool run on behalf of `agent`.
    pub(crate) fn for_agent(agent: &'a Agent) -> Self {
        Self {
            agent: Some(AgentHandle::new(agent)),
            scratch: Scratch::new(),
        }
    }

    /// Context with no agent attached (standalone tool runs and tests).
    pub fn detached() -> Self {
        Self::default()
    }

    /// The calling agent, if any.
    pub fn agent(&self) -> Option<AgentHandle<'a>> {
        self.agent
    }
}
