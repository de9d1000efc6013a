//! Portable seeded shuffle.
//!
//! The sampler's output has to be reproducible across platforms and across
//! reimplementations, so both the generator and the shuffle are fixed here
//! instead of borrowed from a library whose algorithm may change:
//!
//! - generator: SplitMix64 (`state += 0x9E3779B97F4A7C15`, then the
//!   `30/27/31` xor-shift-multiply finaliser), seeded with the raw seed;
//! - bounded draw in `[0, n)`: `(next_u64() as u128 * n as u128) >> 64`;
//! - shuffle: Fisher-Yates from the last index down, swapping `i` with a draw
//!   in `[0, i]`.
//!
//! `SplitMix64` implements `rand::RngCore`, and `shuffle` accepts any
//! `RngCore`, but the permutation itself never goes through `SliceRandom`.

use rand::RngCore;

/// SplitMix64 generator.
#[derive(Debug, Clone)]
pub struct SplitMix64 {
    state: u64,
}

impl SplitMix64 {
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    fn step(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    /// Draw in `[0, bound)`. `bound` must be > 0.
    pub fn next_below(&mut self, bound: usize) -> usize {
        below(self, bound)
    }
}

impl RngCore for SplitMix64 {
    fn next_u32(&mut self) -> u32 {
        self.step() as u32
    }

    fn next_u64(&mut self) -> u64 {
        self.step()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(8) {
            let bytes = self.step().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }
}

/// Multiply-shift draw in `[0, bound)` from one 64-bit output.
fn below<R: RngCore + ?Sized>(rng: &mut R, bound: usize) -> usize {
    ((rng.next_u64() as u128 * bound as u128) >> 64) as usize
}

/// Fisher-Yates shuffle driven by `rng`.
///
/// Only `next_u64` is consumed, one call per swap, so the permutation is
/// fixed by the generator's 64-bit stream.
pub fn shuffle<T, R: RngCore + ?Sized>(items: &mut [T], rng: &mut R) {
    for i in (1..items.len()).rev() {
        let j = below(rng, i + 1);
        items.swap(i, j);
    }
}
