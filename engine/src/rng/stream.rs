//! Stream identifiers and per-stream state

use crate::core::BLOCK_WORDS;
use crate::rng::budget::BudgetRecord;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of independent streams.
pub const STREAM_COUNT: usize = 2;

/// Independent logical draw sequence
///
/// Declaration order is the canonical order used by persistence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamId {
    /// Gameplay-affecting randomness; must stay reproducible
    Core,
    /// Cosmetic randomness that may vary without affecting game state
    Display,
}

impl StreamId {
    /// Every stream, in canonical order.
    pub const ALL: [StreamId; STREAM_COUNT] = [StreamId::Core, StreamId::Display];

    /// Slot in the stream table.
    pub const fn index(self) -> usize {
        match self {
            StreamId::Core => 0,
            StreamId::Display => 1,
        }
    }

    /// Identifier fed into the block function.
    pub const fn generator_id(self) -> u64 {
        self.index() as u64
    }

    pub fn name(self) -> &'static str {
        match self {
            StreamId::Core => "core",
            StreamId::Display => "display",
        }
    }
}

impl fmt::Display for StreamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Mutable state of one stream
///
/// `block` is only meaningful while `block_valid` is set, and then always
/// holds block `position / 16` of this stream.
#[derive(Debug, Clone)]
pub(crate) struct StreamState {
    /// Words consumed so far
    pub(crate) position: u64,
    /// Position the stream would be at had every budget been spent exactly
    pub(crate) budgeted_position: u64,
    pub(crate) block: [u32; BLOCK_WORDS],
    pub(crate) block_valid: bool,
    /// Active budgets, innermost last
    pub(crate) budgets: Vec<BudgetRecord>,
}

impl StreamState {
    pub(crate) fn new() -> Self {
        Self {
            position: 0,
            budgeted_position: 0,
            block: [0; BLOCK_WORDS],
            block_valid: false,
            budgets: Vec::new(),
        }
    }

    /// Resets both counters to `position` and drops the cache.
    pub(crate) fn reset(&mut self, position: u64) {
        self.position = position;
        self.budgeted_position = position;
        self.block_valid = false;
    }

    /// Moves to `target`, keeping the cache only if it covers the same block.
    pub(crate) fn seek(&mut self, target: u64) {
        self.block_valid = self.block_valid && same_block(self.position, target);
        self.position = target;
    }
}

/// Whether two positions fall in the same block.
pub(crate) fn same_block(a: u64, b: u64) -> bool {
    a / BLOCK_WORDS as u64 == b / BLOCK_WORDS as u64
}
