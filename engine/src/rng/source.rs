//! Generator backends
//!
//! A backend turns `(seed, stream, block_index)` into a block of words. The
//! permutation backend is a pure function of its inputs; the platform
//! backend ignores the block index and simply emits its next 16 outputs, so
//! seeking and restoring do not reproduce earlier sequences with it.

use crate::config::BackendKind;
use crate::core::{generate_block, Seed, BLOCK_WORDS};
use crate::rng::stream::{StreamId, STREAM_COUNT};

/// xorshift64* output multiplier
const XORSHIFT_MULTIPLIER: u64 = 0x2545_F491_4F6C_DD1D;

/// Fixed odd constant mixed into each stream's starting state
const STREAM_SALT: u64 = 0x9E37_79B9_7F4A_7C15;

/// Sequential xorshift64* generator
#[derive(Debug, Clone)]
pub(crate) struct XorShift {
    state: u64,
}

impl XorShift {
    pub(crate) fn new(seed: u64) -> Self {
        // xorshift never leaves the all-zero state
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    pub(crate) fn next(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        x.wrapping_mul(XORSHIFT_MULTIPLIER)
    }
}

/// Polymorphic block generator chosen at context construction
#[derive(Debug, Clone)]
pub(crate) enum GeneratorBackend {
    Permutation,
    Platform(Box<[XorShift; STREAM_COUNT]>),
}

impl GeneratorBackend {
    pub(crate) fn new(kind: BackendKind, seed: &Seed) -> Self {
        match kind {
            BackendKind::Permutation => GeneratorBackend::Permutation,
            BackendKind::Platform => {
                let base = u64::from_le_bytes([
                    seed[0], seed[1], seed[2], seed[3], seed[4], seed[5], seed[6], seed[7],
                ]);
                let generators = StreamId::ALL.map(|stream| {
                    XorShift::new(base ^ STREAM_SALT.wrapping_mul(stream.generator_id() + 1))
                });
                GeneratorBackend::Platform(Box::new(generators))
            }
        }
    }

    pub(crate) fn kind(&self) -> BackendKind {
        match self {
            GeneratorBackend::Permutation => BackendKind::Permutation,
            GeneratorBackend::Platform(_) => BackendKind::Platform,
        }
    }

    /// Whether `set_position` and restore reproduce earlier words.
    pub(crate) fn is_seekable(&self) -> bool {
        matches!(self, GeneratorBackend::Permutation)
    }

    pub(crate) fn fill_block(
        &mut self,
        seed: &Seed,
        stream: StreamId,
        block_index: u64,
    ) -> [u32; BLOCK_WORDS] {
        match self {
            GeneratorBackend::Permutation => {
                generate_block(seed, stream.generator_id(), block_index)
            }
            GeneratorBackend::Platform(generators) => {
                let generator = &mut generators[stream.index()];
                let mut block = [0u32; BLOCK_WORDS];
                for word in block.iter_mut() {
                    *word = (generator.next() >> 32) as u32;
                }
                block
            }
        }
    }
}
