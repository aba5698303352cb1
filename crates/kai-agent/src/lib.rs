//! Kai Agent: orchestrator, tools, memory, and prompt construction.
//!
//! This crate contains:
//! - **agent**: the tool-calling conversation loop ([`Agent`])
//! - **builder**: [`AgentBuilder`] and [`AgentConfig`]
//! - **memory**: bounded conversation memory
//! - **tools**: Tool trait, registry, context, and built-in tools
//! - **protocol**: structured vs. sentinel-string tool calling
//! - **context**: prompt context construction

pub mod agent;
pub mod builder;
pub mod context;
pub mod error;
pub mod memory;
pub mod protocol;
pub mod tools;

pub use agent::Agent;
pub use builder::{AgentBuilder, AgentConfig};
pub use error::{AgentError, BuildError};
pub use memory::{InMemoryMemory, Memory};
pub use protocol::ToolProtocol;
pub use tools::{Tool, ToolContext, ToolRegistry};
