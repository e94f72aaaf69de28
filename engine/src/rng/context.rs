//! Session-scoped RNG context
//!
//! Owns the seed, the backend and the stream table. The host builds one at
//! session start and passes it (by `&mut`) to everything that needs
//! randomness; there is no global state.
//!
//! # Example
//! ```
//! use stream_rng_core_rs::{RngConfig, RngContext, StreamId};
//!
//! let mut rng = RngContext::from_seed(RngConfig::default(), [1u8; 32]).unwrap();
//! let first = rng.draw(StreamId::Core);
//!
//! rng.set_position(StreamId::Core, 0);
//! assert_eq!(rng.draw(StreamId::Core), first);
//! ```

use crate::config::{BackendKind, RngConfig};
use crate::core::{Seed, BLOCK_WORDS, SEED_LEN};
use crate::entropy::EntropySource;
use crate::error::{ProgrammingError, RngError};
use crate::rng::source::GeneratorBackend;
use crate::rng::stream::{StreamId, StreamState, STREAM_COUNT};
use tracing::{debug, error, trace};

/// Seed, backend and per-stream state for one session
#[derive(Debug, Clone)]
pub struct RngContext {
    pub(crate) config: RngConfig,
    pub(crate) seed: Seed,
    pub(crate) backend: GeneratorBackend,
    pub(crate) streams: [StreamState; STREAM_COUNT],
}

impl RngContext {
    /// Creates a context from a known seed with every counter at zero.
    pub fn from_seed(config: RngConfig, seed: Seed) -> Result<Self, RngError> {
        config.validate()?;
        let backend = GeneratorBackend::new(config.backend, &seed);

        Ok(Self {
            config,
            seed,
            backend,
            streams: std::array::from_fn(|_| StreamState::new()),
        })
    }

    /// Creates a context seeded from `entropy`.
    ///
    /// The seed is accumulated from successive entropy words, and the core
    /// stream starts at a random position so two sessions sharing a weak
    /// seed still diverge.
    pub fn from_entropy<E: EntropySource + ?Sized>(
        config: RngConfig,
        entropy: &mut E,
    ) -> Result<Self, RngError> {
        let mut context = Self::from_seed(config, [0u8; SEED_LEN])?;
        context.seed_from(entropy)?;
        Ok(context)
    }

    /// Replaces the seed with fresh entropy and resets every stream.
    pub fn reseed<E: EntropySource + ?Sized>(&mut self, entropy: &mut E) -> Result<(), RngError> {
        self.ensure_no_active_budget("reseed")?;
        self.seed_from(entropy)?;
        debug!(strong = entropy.is_strong(), "RNG reseeded");
        Ok(())
    }

    /// Reseeds only when it cannot hurt reproducibility: the backend is the
    /// non-seekable platform generator and the entropy is unguessable.
    ///
    /// Returns whether a reseed happened.
    pub fn hint_reseed<E: EntropySource + ?Sized>(
        &mut self,
        entropy: &mut E,
    ) -> Result<bool, RngError> {
        if self.backend.kind() != BackendKind::Platform || !entropy.is_strong() {
            return Ok(false);
        }
        self.reseed(entropy)?;
        Ok(true)
    }

    fn seed_from<E: EntropySource + ?Sized>(&mut self, entropy: &mut E) -> Result<(), RngError> {
        let mut seed = [0u8; SEED_LEN];
        for chunk in seed.chunks_exact_mut(8) {
            chunk.copy_from_slice(&entropy.next_word()?.to_le_bytes());
        }
        let core_start = entropy.next_word()?;

        self.seed = seed;
        self.backend = GeneratorBackend::new(self.config.backend, &self.seed);
        for state in self.streams.iter_mut() {
            state.reset(0);
        }
        self.streams[StreamId::Core.index()].reset(core_start);
        Ok(())
    }

    pub fn config(&self) -> &RngConfig {
        &self.config
    }

    pub fn seed(&self) -> &Seed {
        &self.seed
    }

    pub fn backend(&self) -> BackendKind {
        self.backend.kind()
    }

    /// Whether `set_position` and restore replay earlier words.
    ///
    /// False for the platform backend: positions still move, but the words
    /// that follow are simply the generator's next outputs.
    pub fn is_seekable(&self) -> bool {
        self.backend.is_seekable()
    }

    /// Words consumed from `stream`.
    pub fn position(&self, stream: StreamId) -> u64 {
        self.streams[stream.index()].position
    }

    /// Position after absorbing every finished budget's reservation.
    pub fn budgeted_position(&self, stream: StreamId) -> u64 {
        self.streams[stream.index()].budgeted_position
    }

    /// Number of active budgets on `stream`.
    pub fn budget_depth(&self, stream: StreamId) -> usize {
        self.streams[stream.index()].budgets.len()
    }

    /// Whether any stream has an active budget.
    pub fn has_active_budget(&self) -> bool {
        self.streams.iter().any(|s| !s.budgets.is_empty())
    }

    /// Next raw word of `stream`.
    pub fn draw(&mut self, stream: StreamId) -> u32 {
        let state = &mut self.streams[stream.index()];

        if !state.block_valid {
            let block_index = state.position / BLOCK_WORDS as u64;
            state.block = self.backend.fill_block(&self.seed, stream, block_index);
            state.block_valid = true;
            trace!(%stream, block_index, "RNG block refilled");
        }
        let word = state.block[(state.position % BLOCK_WORDS as u64) as usize];

        state.position = state.position.wrapping_add(1);
        state.budgeted_position = state.budgeted_position.wrapping_add(1);
        if let Some(top) = state.budgets.last_mut() {
            top.direct += 1;
        }
        if state.position % BLOCK_WORDS as u64 == 0 {
            state.block_valid = false;
        }

        word
    }

    /// Raw word reduced modulo `x`.
    ///
    /// `x == 0` is a caller bug; it is reported and answered with 0 without
    /// consuming a word.
    pub fn uniform(&mut self, stream: StreamId, x: u32) -> u32 {
        if x == 0 {
            error!(%stream, "uniform(0) attempted");
            return 0;
        }
        self.draw(stream) % x
    }

    /// Seeks `stream` to `position` in O(1).
    ///
    /// Both counters move, so budgets created afterwards measure from the new
    /// position.
    pub fn set_position(&mut self, stream: StreamId, position: u64) {
        if !self.backend.is_seekable() {
            debug!(%stream, position, "RNG seek on sequential backend does not replay");
        }
        let state = &mut self.streams[stream.index()];
        state.seek(position);
        state.budgeted_position = position;
    }

    /// Fails when any stream holds a budget.
    pub(crate) fn ensure_no_active_budget(
        &self,
        operation: &'static str,
    ) -> Result<(), ProgrammingError> {
        for stream in StreamId::ALL {
            let depth = self.budget_depth(stream);
            if depth > 0 {
                let err = ProgrammingError::ActiveBudget {
                    operation,
                    stream,
                    depth,
                };
                error!(%err, "RNG invariant violated");
                return Err(err);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::generate_block;
    use crate::entropy::FixedEntropy;

    fn context() -> RngContext {
        RngContext::from_seed(RngConfig::default(), [0x42; SEED_LEN]).unwrap()
    }

    #[test]
    fn test_draw_reads_block_words_in_order() {
        let mut rng = context();
        let block = generate_block(&[0x42; SEED_LEN], 0, 0);

        for expected in block {
            assert_eq!(rng.draw(StreamId::Core), expected);
        }
        assert_eq!(rng.position(StreamId::Core), 16);
        assert!(!rng.streams[0].block_valid);
    }

    #[test]
    fn test_draw_advances_both_counters() {
        let mut rng = context();
        rng.draw(StreamId::Display);

        assert_eq!(rng.position(StreamId::Display), 1);
        assert_eq!(rng.budgeted_position(StreamId::Display), 1);
        assert_eq!(rng.position(StreamId::Core), 0);
    }

    #[test]
    fn test_uniform_zero_does_not_draw() {
        let mut rng = context();
        assert_eq!(rng.uniform(StreamId::Core, 0), 0);
        assert_eq!(rng.position(StreamId::Core), 0);
    }

    #[test]
    fn test_set_position_keeps_matching_cache() {
        let mut rng = context();
        rng.draw(StreamId::Core);
        assert!(rng.streams[0].block_valid);

        rng.set_position(StreamId::Core, 9);
        assert!(rng.streams[0].block_valid);

        rng.set_position(StreamId::Core, 40);
        assert!(!rng.streams[0].block_valid);
        assert_eq!(rng.budgeted_position(StreamId::Core), 40);
    }

    #[test]
    fn test_seek_replays_only_on_permutation_backend() {
        let mut rng = context();
        assert!(rng.is_seekable());
        let first = rng.draw(StreamId::Core);
        rng.set_position(StreamId::Core, 0);
        assert_eq!(rng.draw(StreamId::Core), first);

        let config = RngConfig {
            backend: BackendKind::Platform,
            ..RngConfig::default()
        };
        let mut platform = RngContext::from_seed(config, [0x42; SEED_LEN]).unwrap();
        assert!(!platform.is_seekable());
        let first = platform.draw(StreamId::Core);
        platform.set_position(StreamId::Core, 0);
        assert_eq!(platform.position(StreamId::Core), 0);
        assert_ne!(platform.draw(StreamId::Core), first);
    }

    #[test]
    fn test_from_entropy_lays_out_words_little_endian() {
        let mut entropy = FixedEntropy::new([0x0807_0605_0403_0201, 0, 0, 0, 77]);
        let rng = RngContext::from_entropy(RngConfig::default(), &mut entropy).unwrap();

        assert_eq!(&rng.seed()[0..8], &[1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(rng.position(StreamId::Core), 77);
        assert_eq!(rng.budgeted_position(StreamId::Core), 77);
        assert_eq!(rng.position(StreamId::Display), 0);
    }

    #[test]
    fn test_from_entropy_propagates_exhaustion() {
        let mut entropy = FixedEntropy::new([1, 2]);
        let result = RngContext::from_entropy(RngConfig::default(), &mut entropy);
        assert!(matches!(result, Err(RngError::Entropy(_))));
    }

    #[test]
    fn test_hint_reseed_ignored_for_permutation_backend() {
        let mut rng = context();
        let mut entropy = crate::entropy::OsEntropy;
        assert!(!rng.hint_reseed(&mut entropy).unwrap());
        assert_eq!(rng.seed(), &[0x42; SEED_LEN]);
    }

    #[test]
    fn test_hint_reseed_ignored_for_weak_entropy() {
        let config = RngConfig {
            backend: BackendKind::Platform,
            ..RngConfig::default()
        };
        let mut rng = RngContext::from_seed(config, [0x42; SEED_LEN]).unwrap();
        let mut entropy = FixedEntropy::new([1, 2, 3, 4, 5]);

        assert!(!rng.hint_reseed(&mut entropy).unwrap());
        assert_eq!(entropy.remaining(), 5);
    }

    #[test]
    fn test_hint_reseed_platform_with_strong_entropy() {
        let config = RngConfig {
            backend: BackendKind::Platform,
            ..RngConfig::default()
        };
        let mut rng = RngContext::from_seed(config, [0x42; SEED_LEN]).unwrap();
        let mut entropy = crate::entropy::OsEntropy;

        assert!(rng.hint_reseed(&mut entropy).unwrap());
        assert_ne!(rng.seed(), &[0x42; SEED_LEN]);
    }
}
