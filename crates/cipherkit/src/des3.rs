//! Triple-DES (EDE) in ECB or CBC mode
//!
//! Encryption runs key1 encrypt, key2 decrypt, key3 encrypt on every block;
//! decryption runs key3 decrypt, key2 encrypt, key1 decrypt. In CBC mode the
//! chaining value starts at the IV and is carried forward as the previous
//! ciphertext block in both directions.

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::algorithm::{BatchMode, CipherOps};
use crate::des::{DES_BLOCK_SIZE, DES_KEY_SIZE, DesKeySchedule, map_blocks};
use crate::error::{CipherError, Result};

/// Triple-DES key size: three concatenated DES keys
pub const DES3_KEY_SIZE: usize = 3 * DES_KEY_SIZE;

/// Triple-DES IV size
pub const DES3_IV_SIZE: usize = DES_BLOCK_SIZE;

#[inline]
fn xor_block(block: &mut [u8; 8], with: &[u8; 8]) {
    for (b, w) in block.iter_mut().zip(with) {
        *b ^= w;
    }
}

/// Triple-DES context state
#[derive(Clone, Default, Zeroize, ZeroizeOnDrop)]
pub struct TripleDesCipher {
    #[zeroize(skip)]
    mode: BatchMode,
    iv: [u8; DES3_IV_SIZE],
    key1: DesKeySchedule,
    key2: DesKeySchedule,
    key3: DesKeySchedule,
}

impl TripleDesCipher {
    /// ECB mode, zero IV and all-zero schedules; call `set_key` before use
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a cipher keyed with 24 bytes of key material
    pub fn with_key(key: &[u8]) -> Result<Self> {
        let mut cipher = Self::new();
        cipher.install_key(key)?;
        Ok(cipher)
    }

    fn install_key(&mut self, key: &[u8]) -> Result<()> {
        if key.len() != DES3_KEY_SIZE {
            return Err(CipherError::InvalidKeyLength {
                expected: DES3_KEY_SIZE,
                actual: key.len(),
            });
        }
        self.key1 = DesKeySchedule::from_slice(&key[..8])?;
        self.key2 = DesKeySchedule::from_slice(&key[8..16])?;
        self.key3 = DesKeySchedule::from_slice(&key[16..])?;
        Ok(())
    }

    /// Current chaining mode
    pub fn mode(&self) -> BatchMode {
        self.mode
    }

    /// Select the chaining mode
    pub fn set_mode(&mut self, mode: BatchMode) {
        self.mode = mode;
    }

    /// Install an IV, which must be exactly 8 bytes
    pub fn install_iv(&mut self, iv: &[u8]) -> Result<()> {
        let iv: &[u8; DES3_IV_SIZE] = iv.try_into().map_err(|_| CipherError::InvalidIvLength {
            expected: DES3_IV_SIZE,
            actual: iv.len(),
        })?;
        self.iv = *iv;
        Ok(())
    }

    fn encrypt_block(&self, block: &[u8; 8]) -> [u8; 8] {
        let step = self.key1.encrypt_block(block);
        let step = self.key2.decrypt_block(&step);
        self.key3.encrypt_block(&step)
    }

    fn decrypt_block(&self, block: &[u8; 8]) -> [u8; 8] {
        let step = self.key3.decrypt_block(block);
        let step = self.key2.encrypt_block(&step);
        self.key1.decrypt_block(&step)
    }

    /// Encrypt `input` in the current mode. A trailing partial block is
    /// zero-padded, so the output length is rounded up to a multiple of 8.
    pub fn encrypt_data(&self, input: &[u8]) -> Vec<u8> {
        match self.mode {
            BatchMode::Ecb => map_blocks(input, |block| self.encrypt_block(&block)),
            BatchMode::Cbc => {
                let mut chain = self.iv;
                map_blocks(input, |mut block| {
                    xor_block(&mut block, &chain);
                    chain = self.encrypt_block(&block);
                    chain
                })
            }
        }
    }

    /// Decrypt `input` in the current mode
    pub fn decrypt_data(&self, input: &[u8]) -> Vec<u8> {
        match self.mode {
            BatchMode::Ecb => map_blocks(input, |block| self.decrypt_block(&block)),
            BatchMode::Cbc => {
                let mut chain = self.iv;
                map_blocks(input, |block| {
                    let mut plain = self.decrypt_block(&block);
                    xor_block(&mut plain, &chain);
                    chain = block;
                    plain
                })
            }
        }
    }
}

impl CipherOps for TripleDesCipher {
    fn name(&self) -> &str {
        "des3"
    }

    fn set_iv(&mut self, iv: &[u8]) -> Result<()> {
        self.install_iv(iv)
    }

    fn encrypt(&mut self, input: &[u8]) -> Result<Vec<u8>> {
        Ok(self.encrypt_data(input))
    }

    fn decrypt(&mut self, input: &[u8]) -> Result<Vec<u8>> {
        Ok(self.decrypt_data(input))
    }

    fn set_key(&mut self, key: &[u8]) -> Result<()> {
        self.install_key(key)
    }

    fn get_key_size(&self) -> Result<usize> {
        Ok(DES3_KEY_SIZE)
    }

    fn set_batch_mode(&mut self, mode: BatchMode) -> Result<()> {
        self.set_mode(mode);
        Ok(())
    }

    fn get_batch_mode(&self) -> Result<BatchMode> {
        Ok(self.mode)
    }

    fn get_block_size(&self) -> Result<usize> {
        Ok(DES_BLOCK_SIZE)
    }

    fn wipe(&mut self) {
        self.zeroize();
        self.mode = BatchMode::Ecb;
    }
}
