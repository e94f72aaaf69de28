//! Stream registry and budget stack
//!
//! CRITICAL: for the permutation backend, the word at position `p` of stream
//! `R` is always `generate_block(seed, R, p / 16)[p % 16]`. Caching, budgets
//! and persistence must never break that.

pub(crate) mod budget;
mod context;
pub(crate) mod source;
pub(crate) mod stream;

pub use budget::{BudgetHandle, BudgetReport};
pub use context::RngContext;
pub use stream::{StreamId, STREAM_COUNT};
