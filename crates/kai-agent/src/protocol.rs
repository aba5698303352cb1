//! Tool-calling protocols.
//!
//! - **Structured**: provider-native tool calls, executed and fed back for up
//!   to `max_tool_rounds` rounds.
//! - **SentinelString**: the model answers `TOOL:<name>:<input>` in plain text;
//!   one tool runs and its output replaces the reply.

use kai_core::config::{AgentSettings, ProtocolKind};

/// Default bound on structured tool rounds per user message.
pub const DEFAULT_MAX_TOOL_ROUNDS: usize = 3;

/// Marker a sentinel tool call starts with.
pub const SENTINEL_PREFIX: &str = "TOOL:";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolProtocol {
    Structured { max_tool_rounds: usize },
    SentinelString,
}

impl Default for ToolProtocol {
    fn default() -> Self {
        ToolProtocol::Structured {
            max_tool_rounds: DEFAULT_MAX_TOOL_ROUNDS,
        }
    }
}

impl ToolProtocol {
    pub fn from_settings(settings: &AgentSettings) -> Self {
        match settings.protocol {
            ProtocolKind::Structured => ToolProtocol::Structured {
                max_tool_rounds: settings.max_tool_rounds,
            },
            ProtocolKind::Sentinel => ToolProtocol::SentinelString,
        }
    }

    pub fn kind(&self) -> ProtocolKind {
        match self {
            ToolProtocol::Structured { .. } => ProtocolKind::Structured,
            ToolProtocol::SentinelString => ProtocolKind::Sentinel,
        }
    }
}

impl std::fmt::Display for ToolProtocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ToolProtocol::Structured { max_tool_rounds } => {
                write!(f, "structured (max {max_tool_rounds} rounds)")
            }
            ToolProtocol::SentinelString => write!(f, "sentinel"),
        }
    }
}

/// A tool call parsed from a sentinel reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SentinelCall<'a> {
    pub name: &'a str,
    pub input: &'a str,
}

/// Parse `TOOL:<name>:<input>`.
///
/// The text after the prefix is split at the first `:`; both parts are
/// trimmed. Returns `None` if the reply doesn't start with the prefix or has
/// no second `:`.
pub fn parse_sentinel(reply: &str) -> Option<SentinelCall<'_>> {
    let rest = reply.strip_prefix(SENTINEL_PREFIX)?;
    let (name, input) = rest.split_once(':')?;
    Some(SentinelCall {
        name: name.trim(),
        input: input.trim(),
    })
}
