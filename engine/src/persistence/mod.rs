//! Persistence - Save/Restore RNG State
//!
//! Only the seed and two counters per stream are stored; the word sequence
//! is recomputed from them. Two encodings are provided:
//! - `binary`: the raw byte layout written to a sequential channel
//! - `checkpoint`: a JSON snapshot with a seed digest for validation
//!
//! # Critical Invariants
//!
//! - **No active budgets**: saving or restoring with a budget open would
//!   record a position that the budget is still going to move.
//! - **Cache invalidation**: restore never trusts a cached block.

pub mod binary;
pub mod checkpoint;

pub use checkpoint::{RngSnapshot, StreamSnapshot};
