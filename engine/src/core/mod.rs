//! Core generator
//!
//! Stateless block function at the bottom of the engine. Everything above it
//! (streams, budgets, distributions) is bookkeeping around `generate_block`.

pub mod block;

pub use block::{generate_block, Seed, BLOCK_WORDS, SEED_LEN};
