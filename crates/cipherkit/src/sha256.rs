//! SHA-256 digest
//!
//! Same accumulator as [`crate::sha1`], with a 64-word schedule and eight
//! working registers.

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::algorithm::{CipherOps, OptionValue};
use crate::block_digest::{BLOCK_SIZE, BlockAccumulator};
use crate::error::Result;

/// SHA-256 digest size in bytes
pub const SHA256_DIGEST_SIZE: usize = 32;

/// SHA-256 block size in bytes
pub const SHA256_BLOCK_SIZE: usize = BLOCK_SIZE;

const INITIAL_STATE: [u32; 8] = [
    0x6A09_E667,
    0xBB67_AE85,
    0x3C6E_F372,
    0xA54F_F53A,
    0x510E_527F,
    0x9B05_688C,
    0x1F83_D9AB,
    0x5BE0_CD19,
];

#[rustfmt::skip]
const K: [u32; 64] = [
    0x428a2f98, 0x71374491, 0xb5c0fbcf, 0xe9b5dba5, 0x3956c25b, 0x59f111f1, 0x923f82a4, 0xab1c5ed5,
    0xd807aa98, 0x12835b01, 0x243185be, 0x550c7dc3, 0x72be5d74, 0x80deb1fe, 0x9bdc06a7, 0xc19bf174,
    0xe49b69c1, 0xefbe4786, 0x0fc19dc6, 0x240ca1cc, 0x2de92c6f, 0x4a7484aa, 0x5cb0a9dc, 0x76f988da,
    0x983e5152, 0xa831c66d, 0xb00327c8, 0xbf597fc7, 0xc6e00bf3, 0xd5a79147, 0x06ca6351, 0x14292967,
    0x27b70a85, 0x2e1b2138, 0x4d2c6dfc, 0x53380d13, 0x650a7354, 0x766a0abb, 0x81c2c92e, 0x92722c85,
    0xa2bfe8a1, 0xa81a664b, 0xc24b8b70, 0xc76c51a3, 0xd192e819, 0xd6990624, 0xf40e3585, 0x106aa070,
    0x19a4c116, 0x1e376c08, 0x2748774c, 0x34b0bcb5, 0x391c0cb3, 0x4ed8aa4a, 0x5b9cca4f, 0x682e6ff3,
    0x748f82ee, 0x78a5636f, 0x84c87814, 0x8cc70208, 0x90befffa, 0xa4506ceb, 0xbef9a3f7, 0xc67178f2,
];

/// Incremental SHA-256 state
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Sha256 {
    state: BlockAccumulator<8, 64>,
}

impl Default for Sha256 {
    fn default() -> Self {
        Self::new()
    }
}

impl Sha256 {
    /// Fresh state at the initial constants
    pub fn new() -> Self {
        Self {
            state: BlockAccumulator::new(INITIAL_STATE, compress),
        }
    }

    /// Hash `data` in one call
    pub fn hash(data: &[u8]) -> [u8; SHA256_DIGEST_SIZE] {
        let mut sha = Self::new();
        sha.update(data);
        sha.finalize_array()
    }

    /// Return to the initial constants
    pub fn clear(&mut self) {
        self.state.clear();
    }

    /// Feed `data` into the accumulator
    pub fn update(&mut self, data: &[u8]) {
        self.state.update(data);
    }

    /// Pad, produce the digest and reset
    pub fn finalize_array(&mut self) -> [u8; SHA256_DIGEST_SIZE] {
        self.state.finalize()
    }

    /// Finalize into `out`, which must hold at least 32 bytes
    pub fn finalize_into(&mut self, out: &mut [u8]) -> Result<usize> {
        self.state.finalize_into::<SHA256_DIGEST_SIZE>(out)
    }
}

fn compress(state: &mut [u32; 8], w: &mut [u32; 64]) {
    for i in 16..64 {
        let s0 = w[i - 15].rotate_right(7) ^ w[i - 15].rotate_right(18) ^ (w[i - 15] >> 3);
        let s1 = w[i - 2].rotate_right(17) ^ w[i - 2].rotate_right(19) ^ (w[i - 2] >> 10);
        w[i] = s1
            .wrapping_add(w[i - 7])
            .wrapping_add(s0)
            .wrapping_add(w[i - 16]);
    }

    let [mut a, mut b, mut c, mut d, mut e, mut f, mut g, mut h] = *state;

    for (&k, &word) in K.iter().zip(w.iter()) {
        let sigma1 = e.rotate_right(6) ^ e.rotate_right(11) ^ e.rotate_right(25);
        let choice = (e & f) ^ (!e & g);
        let t1 = h
            .wrapping_add(sigma1)
            .wrapping_add(choice)
            .wrapping_add(k)
            .wrapping_add(word);
        let sigma0 = a.rotate_right(2) ^ a.rotate_right(13) ^ a.rotate_right(22);
        let majority = (a & b) ^ (a & c) ^ (b & c);
        let t2 = sigma0.wrapping_add(majority);

        h = g;
        g = f;
        f = e;
        e = d.wrapping_add(t1);
        d = c;
        c = b;
        b = a;
        a = t1.wrapping_add(t2);
    }

    for (acc, v) in state.iter_mut().zip([a, b, c, d, e, f, g, h]) {
        *acc = acc.wrapping_add(v);
    }
}

impl CipherOps for Sha256 {
    fn name(&self) -> &str {
        "sha256"
    }

    fn set_option(&mut self, option: &str, value: OptionValue) -> Result<()> {
        self.state.set_counter("sha256", option, &value)
    }

    fn get_option(&self, option: &str) -> Result<OptionValue> {
        self.state.counter("sha256", option)
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
        Ok(SHA256_DIGEST_SIZE)
    }

    fn digest(&mut self, out: &mut [u8]) -> Result<usize> {
        self.finalize_into(out)
    }

    fn get_block_size(&self) -> Result<usize> {
        Ok(SHA256_BLOCK_SIZE)
    }

    fn wipe(&mut self) {
        self.zeroize();
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::CipherError;

    #[test]
    fn test_empty() {
        assert_eq!(
            hex::encode(Sha256::hash(b"")),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_abc() {
        assert_eq!(
            hex::encode(Sha256::hash(b"abc")),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_two_block_message() {
        let msg = b"abcdbcdecdefdefgefghfghighijhijkijkljklmklmnlmnomnopnopq";
        assert_eq!(
            hex::encode(Sha256::hash(msg)),
            "248d6a61d20638b8e5c026930c3e6039a33ce45964ff2167f6ecedd419db06c1"
        );
    }

    #[test]
    fn test_exact_block_boundary() {
        let data = [0x61u8; 64];
        let mut sha = Sha256::new();
        sha.update(&data[..63]);
        assert_eq!(sha.get_option("lenW").unwrap(), OptionValue::Int(63));
        sha.update(&data[63..]);
        assert_eq!(sha.get_option("lenW").unwrap(), OptionValue::Int(0));
        assert_eq!(sha.get_option("sizeLo").unwrap(), OptionValue::Int(512));
        assert_eq!(sha.finalize_array(), Sha256::hash(&data));
    }

    #[test]
    fn test_double_finalize_yields_empty_hash() {
        let mut sha = Sha256::new();
        sha.update(b"something");
        let mut out = [0u8; 32];
        sha.digest(&mut out).unwrap();
        sha.digest(&mut out).unwrap();
        assert_eq!(out, Sha256::hash(b""));
    }

    #[test]
    fn test_buffer_too_small() {
        let mut sha = Sha256::new();
        let mut out = [0u8; 20];
        assert!(matches!(
            sha.digest(&mut out),
            Err(CipherError::BufferTooSmall {
                required: 32,
                actual: 20
            })
        ));
    }

    #[test]
    fn test_larger_buffer_writes_prefix() {
        let mut sha = Sha256::new();
        let mut out = [0xAAu8; 40];
        assert_eq!(sha.digest(&mut out).unwrap(), 32);
        assert_eq!(&out[..32], &Sha256::hash(b"")[..]);
        assert!(out[32..].iter().all(|b| *b == 0xAA));
    }

    #[cfg(test)]
    mod proptest_tests {
        use super::*;
        use crate::md5::Md5Context;
        use crate::sha1::Sha1;
        use proptest::prelude::*;

        proptest! {
            /// Chunked appends hash the same as one-shot hashing
            #[test]
            fn incremental_matches_one_shot(
                data in prop::collection::vec(any::<u8>(), 0..400),
                chunk in 1usize..80,
            ) {
                let mut sha1 = Sha1::new();
                let mut sha256 = Sha256::new();
                let mut md5 = Md5Context::new();
                for piece in data.chunks(chunk) {
                    sha1.update(piece);
                    sha256.update(piece);
                    md5.update(piece);
                }
                prop_assert_eq!(sha1.finalize_array(), Sha1::hash(&data));
                prop_assert_eq!(sha256.finalize_array(), Sha256::hash(&data));
                prop_assert_eq!(md5.finalize_array(), Md5Context::hash(&data));
            }
        }
    }
}
