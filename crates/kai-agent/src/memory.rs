//! Conversation memory: a bounded, ordered window of turns plus an optional
//! rolling summary.
//!
//! Eviction is FIFO: once the bound is exceeded the oldest turns are dropped.
//! The summary is never evicted; only [`Memory::clear`] removes it.

use std::collections::VecDeque;

use kai_core::types::Turn;

/// Default number of turns kept.
pub const DEFAULT_MAX_MESSAGES: usize = 20;

/// Default number of turns surfaced to the model per prompt.
pub const DEFAULT_RECENT_LIMIT: usize = 20;

// ─────────────────────────────────────────────
// Memory trait
// ─────────────────────────────────────────────

/// Storage for an agent's conversation.
///
/// Implementations must preserve insertion order and only ever evict from the
/// front.
pub trait Memory: Send {
    /// Append a turn, evicting the oldest ones if the bound is exceeded.
    fn add(&mut self, turn: Turn);

    /// The last `min(limit, len)` turns, oldest first.
    fn recent(&self, limit: usize) -> Vec<Turn>;

    fn summary(&self) -> Option<&str>;

    fn set_summary(&mut self, summary: Option<String>);

    /// Remove all turns and the summary.
    fn clear(&mut self);

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ─────────────────────────────────────────────
// InMemoryMemory
// ─────────────────────────────────────────────

/// Process-local sliding-window memory.
#[derive(Debug, Clone)]
pub struct InMemoryMemory {
    turns: VecDeque<Turn>,
    max_messages: usize,
    summary: Option<String>,
}

impl InMemoryMemory {
    /// Create a memory holding at most `max_messages` turns.
    ///
    /// A bound of 0 is treated as 1 so the latest turn is always visible.
    pub fn new(max_messages: usize) -> Self {
        let max_messages = max_messages.max(1);
        Self {
            turns: VecDeque::with_capacity(max_messages.min(64)),
            max_messages,
            summary: None,
        }
    }

    pub fn max_messages(&self) -> usize {
        self.max_messages
    }
}

impl Default for InMemoryMemory {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_MESSAGES)
    }
}

impl Memory for InMemoryMemory {
    fn add(&mut self, turn: Turn) {
        self.turns.push_back(turn);
        while self.turns.len() > self.max_messages {
            self.turns.pop_front();
        }
    }

    fn recent(&self, limit: usize) -> Vec<Turn> {
        let skip = self.turns.len().saturating_sub(limit);
        self.turns.iter().skip(skip).cloned().collect()
    }

    fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    fn set_summary(&mut self, summary: Option<String>) {
        self.summary = summary;
    }

    fn clear(&mut self) {
        self.turns.clear();
        self.summary = None;
    }

    fn len(&self) -> usize {
        self.turns.len()
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
