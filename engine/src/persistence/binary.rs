//! Raw binary layout
//!
//! ```text
//! seed              32 bytes
//! for each stream in canonical order:
//!   position         u64 little-endian
//!   budgeted_position u64 little-endian
//! ```
//!
//! There is no framing or versioning; the channel is expected to provide
//! that if it needs it.

use crate::core::{Seed, SEED_LEN};
use crate::error::RngError;
use crate::rng::source::GeneratorBackend;
use crate::rng::{RngContext, StreamId, STREAM_COUNT};
use std::io::{Read, Write};
use tracing::debug;

impl RngContext {
    /// Bytes written by [`RngContext::save`].
    pub const SAVED_LEN: usize = SEED_LEN + STREAM_COUNT * 16;

    /// Writes the seed and every stream's counters to `writer`.
    pub fn save<W: Write + ?Sized>(&self, writer: &mut W) -> Result<(), RngError> {
        self.ensure_no_active_budget("save")?;

        writer.write_all(&self.seed)?;
        for stream in StreamId::ALL {
            let state = &self.streams[stream.index()];
            writer.write_all(&state.position.to_le_bytes())?;
            writer.write_all(&state.budgeted_position.to_le_bytes())?;
        }

        debug!(
            core = self.position(StreamId::Core),
            display = self.position(StreamId::Display),
            "RNG state saved"
        );
        Ok(())
    }

    /// Reads state written by [`RngContext::save`], replacing the seed and
    /// all counters.
    ///
    /// The context is left untouched if the read fails part-way.
    pub fn restore<R: Read + ?Sized>(&mut self, reader: &mut R) -> Result<(), RngError> {
        self.ensure_no_active_budget("restore")?;

        let mut seed: Seed = [0u8; SEED_LEN];
        reader.read_exact(&mut seed)?;

        let mut counters = [(0u64, 0u64); STREAM_COUNT];
        for slot in counters.iter_mut() {
            *slot = (read_u64(reader)?, read_u64(reader)?);
        }

        self.apply_restored(seed, counters);
        debug!(
            core = self.position(StreamId::Core),
            display = self.position(StreamId::Display),
            replays = self.is_seekable(),
            "RNG state restored"
        );
        Ok(())
    }

    /// Installs a restored seed and counters; every cache becomes invalid.
    pub(crate) fn apply_restored(&mut self, seed: Seed, counters: [(u64, u64); STREAM_COUNT]) {
        self.seed = seed;
        self.backend = GeneratorBackend::new(self.config.backend, &self.seed);
        for (state, (position, budgeted_position)) in self.streams.iter_mut().zip(counters) {
            state.position = position;
            state.budgeted_position = budgeted_position;
            state.block_valid = false;
        }
    }
}

fn read_u64<R: Read + ?Sized>(reader: &mut R) -> Result<u64, RngError> {
    let mut buf = [0u8; 8];
    reader.read_exact(&mut buf)?;
    Ok(u64::from_le_bytes(buf))
}
