//! Reduced-round ChaCha block function
//!
//! Maps `(seed, stream_id, block_index)` to 16 pseudorandom words. The
//! function is pure: there is no counter state here, which is what makes
//! streams seekable in O(1).
//!
//! # State layout
//!
//! ```text
//! [ const  const  const  const ]
//! [ seed   seed   seed   seed  ]
//! [ seed   seed   seed   seed  ]
//! [ blk_lo blk_hi sid_lo sid_hi]
//! ```
//!
//! The permutation runs 8 rounds (4 double rounds) instead of the usual 20.
//! Output is reproducible and statistically sound; it is not meant to resist
//! seed recovery.

/// Number of 32-bit words produced per block.
pub const BLOCK_WORDS: usize = 16;

/// Seed length in bytes.
pub const SEED_LEN: usize = 32;

/// Secret seed shared by every stream of a session.
pub type Seed = [u8; SEED_LEN];

/// Double rounds used by the engine (8 rounds total).
const DOUBLE_ROUNDS: usize = 4;

/// "expand 32-byte k" as little-endian words.
const SIGMA: [u32; 4] = [
    0x6170_7865, // "expa"
    0x3320_646e, // "nd 3"
    0x7962_2d32, // "2-by"
    0x6b20_6574, // "te k"
];

#[inline(always)]
fn quarter_round(state: &mut [u32; BLOCK_WORDS], a: usize, b: usize, c: usize, d: usize) {
    state[a] = state[a].wrapping_add(state[b]);
    state[d] = (state[d] ^ state[a]).rotate_left(16);

    state[c] = state[c].wrapping_add(state[d]);
    state[b] = (state[b] ^ state[c]).rotate_left(12);

    state[a] = state[a].wrapping_add(state[b]);
    state[d] = (state[d] ^ state[a]).rotate_left(8);

    state[c] = state[c].wrapping_add(state[d]);
    state[b] = (state[b] ^ state[c]).rotate_left(7);
}

/// Runs `double_rounds` column+diagonal passes and adds the input back.
pub(crate) fn permute(input: &[u32; BLOCK_WORDS], double_rounds: usize) -> [u32; BLOCK_WORDS] {
    let mut x = *input;

    for _ in 0..double_rounds {
        // Columns
        quarter_round(&mut x, 0, 4, 8, 12);
        quarter_round(&mut x, 1, 5, 9, 13);
        quarter_round(&mut x, 2, 6, 10, 14);
        quarter_round(&mut x, 3, 7, 11, 15);

        // Diagonals
        quarter_round(&mut x, 0, 5, 10, 15);
        quarter_round(&mut x, 1, 6, 11, 12);
        quarter_round(&mut x, 2, 7, 8, 13);
        quarter_round(&mut x, 3, 4, 9, 14);
    }

    x.iter_mut()
        .zip(input)
        .for_each(|(w, i)| *w = w.wrapping_add(*i));

    x
}

/// Builds the initial 512-bit state.
pub(crate) fn initial_state(seed: &Seed, stream_id: u64, block_index: u64) -> [u32; BLOCK_WORDS] {
    let mut state = [0u32; BLOCK_WORDS];

    state[0..4].copy_from_slice(&SIGMA);
    state[4..12]
        .iter_mut()
        .zip(seed.chunks_exact(4))
        .for_each(|(s, k)| *s = u32::from_le_bytes([k[0], k[1], k[2], k[3]]));

    state[12] = block_index as u32;
    state[13] = (block_index >> 32) as u32;
    state[14] = stream_id as u32;
    state[15] = (stream_id >> 32) as u32;

    state
}

/// Generates block `block_index` of stream `stream_id`.
///
/// Identical inputs always yield identical output; this never fails.
///
/// # Example
/// ```
/// use stream_rng_core_rs::core::generate_block;
///
/// let seed = [7u8; 32];
/// let a = generate_block(&seed, 0, 3);
/// let b = generate_block(&seed, 0, 3);
/// assert_eq!(a, b);
/// assert_ne!(a, generate_block(&seed, 1, 3));
/// ```
pub fn generate_block(seed: &Seed, stream_id: u64, block_index: u64) -> [u32; BLOCK_WORDS] {
    permute(&initial_state(seed, stream_id, block_index), DOUBLE_ROUNDS)
}
