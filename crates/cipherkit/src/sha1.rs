//! SHA-1 digest
//!
//! Runs over [`crate::block_digest`], so the `sizeHi`, `sizeLo` and `lenW`
//! counters are exposed as options.

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::algorithm::{CipherOps, OptionValue};
use crate::block_digest::{BLOCK_SIZE, BlockAccumulator};
use crate::error::Result;

/// SHA-1 digest size in bytes
pub const SHA1_DIGEST_SIZE: usize = 20;

/// SHA-1 block size in bytes
pub const SHA1_BLOCK_SIZE: usize = BLOCK_SIZE;

const INITIAL_STATE: [u32; 5] = [
    0x6745_2301,
    0xEFCD_AB89,
    0x98BA_DCFE,
    0x1032_5476,
    0xC3D2_E1F0,
];

/// Incremental SHA-1 state
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Sha1 {
    state: BlockAccumulator<5, 80>,
}

impl Default for Sha1 {
    fn default() -> Self {
        Self::new()
    }
}

impl Sha1 {
    /// Fresh state at the initial constants
    pub fn new() -> Self {
        Self {
            state: BlockAccumulator::new(INITIAL_STATE, compress),
        }
    }

    /// Hash `data` in one call
    pub fn hash(data: &[u8]) -> [u8; SHA1_DIGEST_SIZE] {
        let mut sha = Self::new();
        sha.update(data);
        sha.finalize_array()
    }

    /// Return to the initial constants, clearing the schedule and counters
    pub fn clear(&mut self) {
        self.state.clear();
    }

    /// Feed `data` into the accumulator
    pub fn update(&mut self, data: &[u8]) {
        self.state.update(data);
    }

    /// Pad, produce the digest and reset to the initial constants
    pub fn finalize_array(&mut self) -> [u8; SHA1_DIGEST_SIZE] {
        self.state.finalize()
    }

    /// Finalize into `out`, which must hold at least 20 bytes
    pub fn finalize_into(&mut self, out: &mut [u8]) -> Result<usize> {
        self.state.finalize_into::<SHA1_DIGEST_SIZE>(out)
    }
}

fn compress(h: &mut [u32; 5], w: &mut [u32; 80]) {
    for i in 16..80 {
        w[i] = (w[i - 3] ^ w[i - 8] ^ w[i - 14] ^ w[i - 16]).rotate_left(1);
    }

    let [mut a, mut b, mut c, mut d, mut e] = *h;

    for (i, &word) in w.iter().enumerate() {
        let (f, k) = match i {
            0..=19 => (((c ^ d) & b) ^ d, 0x5A82_7999),
            20..=39 => (b ^ c ^ d, 0x6ED9_EBA1),
            40..=59 => ((b & c) | (d & (b | c)), 0x8F1B_BCDC),
            _ => (b ^ c ^ d, 0xCA62_C1D6),
        };
        let t = a
            .rotate_left(5)
            .wrapping_add(f)
            .wrapping_add(e)
            .wrapping_add(word)
            .wrapping_add(k);
        e = d;
        d = c;
        c = b.rotate_left(30);
        b = a;
        a = t;
    }

    for (acc, v) in h.iter_mut().zip([a, b, c, d, e]) {
        *acc = acc.wrapping_add(v);
    }
}

impl CipherOps for Sha1 {
    fn name(&self) -> &str {
        "sha1"
    }

    fn set_option(&mut self, option: &str, value: OptionValue) -> Result<()> {
        self.state.set_counter("sha1", option, &value)
    }

    fn get_option(&self, option: &str) -> Result<OptionValue> {
        self.state.counter("sha1", option)
    }

    fn reset(&mut self) -> Result<()> {
        self.clear();
        Ok(())
    }

    fn append(&mut self, data: &[u8]) -> Result<()> {
        self.update(data);
        Ok(())
    }

    fn digest_size(&self) -> Result<usize> {
        Ok(SHA1_DIGEST_SIZE)
    }

    fn digest(&mut self, out: &mut [u8]) -> Result<usize> {
        self.finalize_into(out)
    }

    fn get_block_size(&self) -> Result<usize> {
        Ok(SHA1_BLOCK_SIZE)
    }

    fn wipe(&mut self) {
        self.zeroize();
    }
}
