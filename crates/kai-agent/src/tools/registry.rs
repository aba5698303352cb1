//! Tool Registry: ordered store of an agent's tools.
//!
//! Name lookup is case-insensitive and this registry is the only place that
//! resolves names, so every caller (both protocols, `execute_tool`, the CLI)
//! agrees on what a name means.

use std::sync::Arc;

use kai_core::types::ToolDefinition;
use tracing::{debug, info, warn};

use super::base::Tool;
use super::context::ToolContext;
use crate::error::BuildError;

// ─────────────────────────────────────────────
// ToolOutcome
// ─────────────────────────────────────────────

/// Result of dispatching a tool call by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolOutcome {
    /// The tool ran and produced this output.
    Output(String),
    /// No tool with that name.
    NotFound { name: String },
    /// The tool ran and failed.
    Failed { name: String, error: String },
}

impl ToolOutcome {
    /// Text handed back to the model.
    pub fn into_text(self) -> String {
        match self {
            ToolOutcome::Output(out) => out,
            ToolOutcome::NotFound { name } => not_found_message(&name),
            ToolOutcome::Failed { name, error } => failure_message(&name, &error),
        }
    }
}

/// `"Tool '<name>' not found"`.
pub fn not_found_message(name: &str) -> String {
    format!("Tool '{name}' not found")
}

/// `"Error executing tool '<name>': <error>"`.
pub fn failure_message(name: &str, error: &str) -> String {
    format!("Error executing tool '{name}': {error}")
}

// ─────────────────────────────────────────────
// Registry
// ─────────────────────────────────────────────

/// Stores tools in registration order and dispatches calls.
///
/// Owns `Arc<dyn Tool>` so a snapshot can be cloned cheaply per conversation turn.
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool, replacing any tool with the same (case-insensitive) name
    /// in place.
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        match self.position(tool.name()) {
            Some(idx) => {
                info!(tool = tool.name(), "replaced tool");
                self.tools[idx] = tool;
            }
            None => {
                info!(tool = tool.name(), "registered tool");
                self.tools.push(tool);
            }
        }
    }

    /// Register a tool, rejecting a duplicate name.
    pub fn try_register(&mut self, tool: Arc<dyn Tool>) -> Result<(), BuildError> {
        if let Some(existing) = self.get(tool.name()) {
            return Err(BuildError::DuplicateTool(existing.name().to_string()));
        }
        info!(tool = tool.name(), "registered tool");
        self.tools.push(tool);
        Ok(())
    }

    /// Look up a tool by name, ignoring case.
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools
            .iter()
            .find(|t| t.name().eq_ignore_ascii_case(name.trim()))
    }

    /// Names of all registered tools, in registration order.
    pub fn tool_names(&self) -> Vec<String> {
        self.tools.iter().map(|t| t.name().to_string()).collect()
    }

    /// Model-facing definitions for all registered tools, in registration order.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.iter().map(|t| t.to_definition()).collect()
    }

    /// `(name, description)` pairs, for text listings.
    pub fn descriptions(&self) -> Vec<(String, String)> {
        self.tools
            .iter()
            .map(|t| (t.name().to_string(), t.description().to_string()))
            .collect()
    }

    /// Resolve `name` and run the tool.
    ///
    /// Never fails: a missing tool or a tool error is reported in the outcome.
    pub async fn invoke(&self, name: &str, input: &str, ctx: &mut ToolContext<'_>) -> ToolOutcome {
        let Some(tool) = self.get(name) else {
            warn!(tool = name, "tool not found");
            return ToolOutcome::NotFound {
                name: name.to_string(),
            };
        };

        debug!(tool = tool.name(), input_len = input.len(), "executing tool");
        match tool.execute(input, ctx).await {
            Ok(output) => ToolOutcome::Output(output),
            Err(e) => {
                warn!(tool = name, error = %e, "tool execution failed");
                ToolOutcome::Failed {
                    name: name.to_string(),
                    error: e.to_string(),
                }
            }
        }
    }

    /// Number of registered tools.
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.tools
            .iter()
            .position(|t| t.name().eq_ignore_ascii_case(name.trim()))
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.tool_names())
            .finish()
    }
}
