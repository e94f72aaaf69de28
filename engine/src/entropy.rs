//! Entropy sources
//!
//! Consulted only when a session starts and on an explicit reseed. Each call
//! yields one opaque 64-bit word; callers invoke it repeatedly to accumulate
//! a full seed.

use crate::error::RngError;
use std::collections::VecDeque;

/// Supplier of seed material
pub trait EntropySource {
    /// Next word of entropy.
    fn next_word(&mut self) -> Result<u64, RngError>;

    /// Whether the words are unguessable (OS-grade). Weak sources never
    /// trigger a hinted reseed.
    fn is_strong(&self) -> bool;
}

/// Operating system entropy via `getrandom`
#[derive(Debug, Default, Clone, Copy)]
pub struct OsEntropy;

impl EntropySource for OsEntropy {
    fn next_word(&mut self) -> Result<u64, RngError> {
        let mut buf = [0u8; 8];
        getrandom::getrandom(&mut buf).map_err(|e| RngError::Entropy(e.to_string()))?;
        Ok(u64::from_le_bytes(buf))
    }

    fn is_strong(&self) -> bool {
        true
    }
}

/// Replays a fixed list of words
///
/// Useful for tests and for reproducing a session whose seed words were
/// recorded. Running out of words is reported as an entropy failure.
#[derive(Debug, Clone)]
pub struct FixedEntropy {
    words: VecDeque<u64>,
}

impl FixedEntropy {
    pub fn new(words: impl IntoIterator<Item = u64>) -> Self {
        Self {
            words: words.into_iter().collect(),
        }
    }

    /// Words not yet handed out.
    pub fn remaining(&self) -> usize {
        self.words.len()
    }
}

impl EntropySource for FixedEntropy {
    fn next_word(&mut self) -> Result<u64, RngError> {
        self.words
            .pop_front()
            .ok_or_else(|| RngError::Entropy("fixed entropy exhausted".to_string()))
    }

    fn is_strong(&self) -> bool {
        false
    }
}
