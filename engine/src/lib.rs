//! Stream RNG Core - Rust Engine
//!
//! Deterministic, seekable, per-stream random numbers for turn-based games,
//! with budgets that make the number of words an operation consumes
//! independent of which branch it took.
//!
//! # Architecture
//!
//! - **core**: Stateless ChaCha8 block function
//! - **rng**: Stream registry, generator backends and the budget stack
//! - **distributions**: Ranges, dice, biased and geometric draws
//! - **persistence**: Binary save/restore and JSON checkpoints
//! - **entropy**: Seed sources (OS and fixed)
//! - **config**: Backend selection and misuse policies
//!
//! # Critical Invariants
//!
//! 1. A stream's word at position `p` depends only on seed, stream and `p`
//! 2. Budgets are released in strict LIFO order per stream
//! 3. Releasing a budget never moves a stream backward
//! 4. Nothing is persisted while a budget is active

pub mod config;
pub mod core;
pub mod distributions;
pub mod entropy;
pub mod error;
pub mod persistence;
pub mod rng;

// Re-exports for convenience
pub use config::{BackendKind, OverflowPolicy, RngConfig, Strictness};
pub use crate::core::{generate_block, Seed, BLOCK_WORDS, SEED_LEN};
pub use entropy::{EntropySource, FixedEntropy, OsEntropy};
pub use error::{ProgrammingError, RngError};
pub use persistence::{RngSnapshot, StreamSnapshot};
pub use rng::{BudgetHandle, BudgetReport, RngContext, StreamId, STREAM_COUNT};
