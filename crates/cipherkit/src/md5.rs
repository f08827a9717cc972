//! MD5 digest context backed by the `md-5` crate

use md5::{Digest, Md5};

use crate::algorithm::CipherOps;
use crate::error::{CipherError, Result};

/// MD5 digest size in bytes
pub const MD5_DIGEST_SIZE: usize = 16;

/// MD5 block size in bytes
pub const MD5_BLOCK_SIZE: usize = 64;

/// Incremental MD5 state
#[derive(Clone, Default)]
pub struct Md5Context {
    hasher: Md5,
}

impl Md5Context {
    /// Fresh MD5 state
    pub fn new() -> Self {
        Self::default()
    }

    /// Hash `data` in one call
    pub fn hash(data: &[u8]) -> [u8; MD5_DIGEST_SIZE] {
        let mut ctx = Self::new();
        ctx.update(data);
        ctx.finalize_array()
    }

    /// Feed `data` into the accumulator
    pub fn update(&mut self, data: &[u8]) {
        self.hasher.update(data);
    }

    /// Produce the digest and reset
    pub fn finalize_array(&mut self) -> [u8; MD5_DIGEST_SIZE] {
        let mut out = [0u8; MD5_DIGEST_SIZE];
        out.copy_from_slice(&self.hasher.finalize_reset());
        out
    }
}

impl CipherOps for Md5Context {
    fn name(&self) -> &str {
        "md5"
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
        Ok(MD5_DIGEST_SIZE)
    }

    fn digest(&mut self, out: &mut [u8]) -> Result<usize> {
        if out.len() < MD5_DIGEST_SIZE {
            return Err(CipherError::BufferTooSmall {
                required: MD5_DIGEST_SIZE,
                actual: out.len(),
            });
        }
        out[..MD5_DIGEST_SIZE].copy_from_slice(&self.finalize_array());
        Ok(MD5_DIGEST_SIZE)
    }

    fn get_block_size(&self) -> Result<usize> {
        Ok(MD5_BLOCK_SIZE)
    }

    fn wipe(&mut self) {
        Digest::reset(&mut self.hasher);
    }
}
