//! MD4 digest context backed by the `md4` crate

use md4::{Digest, Md4};

use crate::algorithm::CipherOps;
use crate::error::{CipherError, Result};

/// MD4 digest size in bytes
pub const MD4_DIGEST_SIZE: usize = 16;

/// MD4 block size in bytes
pub const MD4_BLOCK_SIZE: usize = 64;

/// Incremental MD4 state
#[derive(Clone, Default)]
pub struct Md4Context {
    hasher: Md4,
}

impl Md4Context {
    /// Fresh MD4 state
    pub fn new() -> Self {
        Self::default()
    }

    /// Hash `data` in one call
    pub fn hash(data: &[u8]) -> [u8; MD4_DIGEST_SIZE] {
        let mut ctx = Self::new();
        ctx.update(data);
        ctx.finalize_array()
    }

    /// Feed `data` into the accumulator
    pub fn update(&mut self, data: &[u8]) {
        self.hasher.update(data);
    }

    /// Produce the digest and reset
    pub fn finalize_array(&mut self) -> [u8; MD4_DIGEST_SIZE] {
        let mut out = [0u8; MD4_DIGEST_SIZE];
        out.copy_from_slice(&self.hasher.finalize_reset());
        out
    }
}

impl CipherOps for Md4Context {
    fn name(&self) -> &str {
        "md4"
    }

    fn reset(&mut self) -> Result<()> {
        Digest::reset(&mut self.hasher);
        Ok(())
    }

    fn append(&mut self, data: &[u8]) -> Result<()> {
        self.update(data);
        Ok(())
    }

    fn digest_size(&self) -> Result<usize> {
        Ok(MD4_DIGEST_SIZE)
    }

    fn digest(&mut self, out: &mut [u8]) -> Result<usize> {
        if out.len() < MD4_DIGEST_SIZE {
            return Err(CipherError::BufferTooSmall {
                required: MD4_DIGEST_SIZE,
                actual: out.len(),
            });
        }
        out[..MD4_DIGEST_SIZE].copy_from_slice(&self.finalize_array());
        Ok(MD4_DIGEST_SIZE)
    }

    fn get_block_size(&self) -> Result<usize> {
        Ok(MD4_BLOCK_SIZE)
    }

    fn wipe(&mut self) {
        Digest::reset(&mut self.hasher);
    }
}
