//! Agent: the tool-calling orchestration loop.
//!
//! # Flow (structured protocol)
//! 1. Store the user turn
//! 2. Build context: system prompt, optional summary line, recent turns
//! 3. Call the model with the tool definitions
//! 4. While the reply carries tool calls and rounds remain: store the
//!    assistant turn, run each tool in order, store each result, call again
//! 5. Store the final assistant turn and return the completion
//!
//! Turns are committed only after the call that produced them returned, so a
//! `chat` future dropped mid-flight leaves memory consistent.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use tracing::{debug, info, warn};

use kai_core::types::{CompletionResult, GenerationParams, ToolDefinition, Turn};
use kai_providers::LlmClient;

use crate::builder::AgentConfig;
use crate::context::{build_context, sentinel_system_content};
use crate::error::AgentError;
use crate::memory::{Memory, DEFAULT_RECENT_LIMIT};
use crate::protocol::{parse_sentinel, ToolProtocol};
use crate::tools::registry::not_found_message;
use crate::tools::{Tool, ToolContext, ToolOutcome, ToolRegistry};

// ─────────────────────────────────────────────
// Agent
// ─────────────────────────────────────────────

/// A conversational agent: system prompt, bounded memory, tools and a model client.
///
/// All methods take `&self`; concurrent `chat` calls on one agent run one
/// after the other.
pub struct Agent {
    display_name: String,
    system_prompt: RwLock<String>,
    client: Arc<dyn LlmClient>,
    /// Never held across an `.await`.
    memory: Mutex<Box<dyn Memory>>,
    tools: RwLock<ToolRegistry>,
    /// Strict agents can't change their tools after construction.
    tools_locked: bool,
    protocol: ToolProtocol,
    default_params: GenerationParams,
    /// Serializes conversation turns.
    turn_lock: tokio::sync::Mutex<()>,
}

impl Agent {
    /// Create a strict agent: the tool set is fixed.
    pub fn new(config: AgentConfig) -> Self {
        Self::from_config(config, true)
    }

    /// Create a relaxed agent: tools can be added later with [`Agent::use_tool`].
    pub fn relaxed(config: AgentConfig) -> Self {
        Self::from_config(config, false)
    }

    /// A relaxed agent with default name, prompt and memory, and no tools.
    pub fn with_client(client: Arc<dyn LlmClient>) -> Self {
        Self::relaxed(AgentConfig::new(client))
    }

    fn from_config(config: AgentConfig, tools_locked: bool) -> Self {
        info!(
            agent = %config.display_name,
            client = config.client.display_name(),
            model = config.client.model(),
            tools = config.tools.len(),
            protocol = %config.protocol,
            "Agent initialized"
        );

        Self {
            display_name: config.display_name,
            system_prompt: RwLock::new(config.system_prompt),
            client: config.client,
            memory: Mutex::new(config.memory),
            tools: RwLock::new(config.tools),
            tools_locked,
            protocol: config.protocol,
            default_params: config.params,
            turn_lock: tokio::sync::Mutex::new(()),
        }
    }

    // ────────────── Conversation ──────────────

    /// Send a user message and run the protocol to completion.
    ///
    /// On a model error the user turn stays in memory and no assistant turn
    /// is stored.
    pub async fn chat(
        &self,
        message: &str,
        params: &GenerationParams,
    ) -> Result<CompletionResult, AgentError> {
        let _turn = self.turn_lock.lock().await;

        self.commit(Turn::user(message));
        // Tools registered mid-turn apply from the next turn on
        let tools = self.tools_snapshot();

        match self.protocol {
            ToolProtocol::Structured { max_tool_rounds } => {
                self.run_structured(&tools, max_tool_rounds, params).await
            }
            ToolProtocol::SentinelString => self.run_sentinel(&tools, params).await,
        }
    }

    /// [`Agent::chat`] with the agent's default generation params.
    pub async fn chat_with_defaults(&self, message: &str) -> Result<CompletionResult, AgentError> {
        self.chat(message, &self.default_params).await
    }

    /// Text of the reply to `message`.
    pub async fn reply(&self, message: &str) -> Result<String, AgentError> {
        Ok(self.chat_with_defaults(message).await?.text)
    }

    async fn run_structured(
        &self,
        tools: &ToolRegistry,
        max_tool_rounds: usize,
        params: &GenerationParams,
    ) -> Result<CompletionResult, AgentError> {
        let definitions = tools.definitions();
        let mut result = self.invoke_model(&self.system_prompt(), &definitions, params).await?;

        let mut rounds = 0;
        while rounds < max_tool_rounds {
            if result.raw.is_none() {
                break;
            }
            let calls = self.client.extract_tool_calls(&result);
            if calls.is_empty() {
                break;
            }

            debug!(
                agent = %self.display_name,
                round = rounds + 1,
                calls = calls.len(),
                "Model requested tools"
            );
            self.commit(Turn::assistant_with_calls(result.text.clone(), calls.clone()));

            for call in calls {
                let output = self
                    .run_tool(tools, &call.name, &call.arguments)
                    .await
                    .into_text();
                self.commit(Turn::tool_result(call.id, output));
            }

            result = self.invoke_model(&self.system_prompt(), &definitions, params).await?;
            rounds += 1;
        }

        if rounds == max_tool_rounds && max_tool_rounds > 0 {
            debug!(agent = %self.display_name, rounds, "Tool round limit reached");
        }

        self.commit(Turn::assistant(result.text.clone()));
        Ok(result)
    }

    async fn run_sentinel(
        &self,
        tools: &ToolRegistry,
        params: &GenerationParams,
    ) -> Result<CompletionResult, AgentError> {
        let system_content = sentinel_system_content(&self.system_prompt(), &tools.descriptions());
        let mut result = self.invoke_model(&system_content, &[], params).await?;

        if let Some(call) = parse_sentinel(&result.text) {
            let name = call.name.to_string();
            let input = call.input.to_string();
            debug!(agent = %self.display_name, tool = %name, "Sentinel tool call");

            result.text = match self.run_tool(tools, &name, &input).await {
                ToolOutcome::NotFound { name } => format!(
                    "{}. Available tools: {}",
                    not_found_message(&name),
                    tools.tool_names().join(", ")
                ),
                outcome => outcome.into_text(),
            };
        }

        self.commit(Turn::assistant(result.text.clone()));
        Ok(result)
    }

    /// Build the prompt from current memory and call the model once.
    async fn invoke_model(
        &self,
        system_content: &str,
        tools: &[ToolDefinition],
        params: &GenerationParams,
    ) -> Result<CompletionResult, AgentError> {
        let context = {
            let memory = self.lock_memory();
            build_context(
                system_content,
                memory.summary(),
                memory.recent(DEFAULT_RECENT_LIMIT),
            )
        };

        debug!(
            agent = %self.display_name,
            turns = context.len(),
            tools = tools.len(),
            "Calling model"
        );

        self.client
            .chat(&context, tools, params)
            .await
            .map_err(|e| {
                warn!(agent = %self.display_name, error = %e, "Model call failed");
                AgentError::Model(e)
            })
    }

    async fn run_tool(&self, tools: &ToolRegistry, name: &str, input: &str) -> ToolOutcome {
        let mut ctx = ToolContext::for_agent(self);
        tools.invoke(name, input, &mut ctx).await
    }

    // ────────────── Tools ──────────────

    /// Run a tool directly, without the model.
    ///
    /// Unknown tools and tool errors come back as text. Memory is untouched
    /// unless the tool itself writes to it.
    pub async fn execute_tool(&self, name: &str, input: &str) -> String {
        let tools = self.tools_snapshot();
        self.run_tool(&tools, name, input).await.into_text()
    }

    /// Add or replace a tool. Fails on agents built with [`crate::AgentBuilder`].
    pub fn use_tool(&self, tool: Arc<dyn Tool>) -> Result<(), AgentError> {
        if self.tools_locked {
            return Err(AgentError::ToolsLocked);
        }
        self.tools
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .register(tool);
        Ok(())
    }

    /// Tool names, in registration order.
    pub fn tool_names(&self) -> Vec<String> {
        self.tools_snapshot().tool_names()
    }

    pub fn tool_definitions(&self) -> Vec<ToolDefinition> {
        self.tools_snapshot().definitions()
    }

    fn tools_snapshot(&self) -> ToolRegistry {
        self.tools
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    // ────────────── Memory ──────────────

    /// Store a note as a system turn.
    pub fn remember(&self, note: &str) {
        self.commit(Turn::system(note));
    }

    /// Drop all turns and the summary.
    pub fn clear_memory(&self) {
        self.lock_memory().clear();
        debug!(agent = %self.display_name, "Memory cleared");
    }

    /// Stored turns as `"ROLE: content"` blocks separated by blank lines.
    pub fn history(&self) -> String {
        let memory = self.lock_memory();
        memory
            .recent(memory.len())
            .iter()
            .map(|t| format!("{}: {}", t.role().as_str().to_uppercase(), t.content()))
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// The last `min(limit, len)` stored turns.
    pub fn recent(&self, limit: usize) -> Vec<Turn> {
        self.lock_memory().recent(limit)
    }

    pub fn memory_len(&self) -> usize {
        self.lock_memory().len()
    }

    pub fn summary(&self) -> Option<String> {
        self.lock_memory().summary().map(String::from)
    }

    pub fn set_summary(&self, summary: Option<String>) {
        self.lock_memory().set_summary(summary);
    }

    fn commit(&self, turn: Turn) {
        self.lock_memory().add(turn);
    }

    fn lock_memory(&self) -> MutexGuard<'_, Box<dyn Memory>> {
        self.memory.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ────────────── Accessors ──────────────

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn system_prompt(&self) -> String {
        self.system_prompt
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Change the system prompt. Affects future prompts only.
    pub fn set_system_prompt(&self, prompt: impl Into<String>) {
        *self
            .system_prompt
            .write()
            .unwrap_or_else(PoisonError::into_inner) = prompt.into();
    }

    pub fn protocol(&self) -> ToolProtocol {
        self.protocol
    }

    pub fn default_params(&self) -> &GenerationParams {
        &self.default_params
    }

    pub fn client(&self) -> &Arc<dyn LlmClient> {
        &self.client
    }
}

impl std::fmt::Debug for Agent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Agent")
            .field("display_name", &self.display_name)
            .field("client", &self.client.display_name())
            .field("tools", &self.tool_names())
            .field("protocol", &self.protocol)
            .finish()
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
