//! Live cipher contexts
//!
//! A [`CipherContext`] binds one descriptor to one algorithm state. Each
//! forwarding call first checks the descriptor's capability set and answers
//! `UnsupportedOperation` for operations the algorithm lacks. Dropping the
//! context wipes the state and releases the descriptor.

use std::fmt;
use std::sync::Arc;

use crate::algorithm::{AlgorithmState, BatchMode, CipherOps, OptionValue};
use crate::capabilities::{Capabilities, Operation};
use crate::error::{CipherError, Result};
use crate::registry::CipherDescriptor;

/// Stateful instance of one algorithm
pub struct CipherContext {
    descriptor: Arc<CipherDescriptor>,
    state: AlgorithmState,
}

impl CipherContext {
    /// Bind a new context to `descriptor`
    pub fn new(descriptor: &Arc<CipherDescriptor>) -> Self {
        descriptor.acquire();
        tracing::debug!(
            "Created {} context ({} live)",
            descriptor.name(),
            descriptor.live_contexts()
        );
        Self {
            descriptor: Arc::clone(descriptor),
            state: descriptor.kind().instantiate(),
        }
    }

    /// Name of the bound cipher
    pub fn name(&self) -> &str {
        self.descriptor.name()
    }

    /// Descriptor this context is bound to
    pub fn descriptor(&self) -> &Arc<CipherDescriptor> {
        &self.descriptor
    }

    /// Operations the bound cipher implements
    pub fn capabilities(&self) -> Capabilities {
        self.descriptor.capabilities()
    }

    fn require(&self, operation: Operation) -> Result<()> {
        if self.descriptor.supports(operation) {
            return Ok(());
        }
        tracing::warn!(
            "the {} cipher does not support the {operation} operation",
            self.name()
        );
        Err(CipherError::unsupported(self.name(), operation))
    }

    /// Set a named option
    pub fn set_option(&mut self, option: &str, value: OptionValue) -> Result<()> {
        self.require(Operation::SetOption)?;
        self.state.set_option(option, value)
    }

    /// Read a named option
    pub fn get_option(&self, option: &str) -> Result<OptionValue> {
        self.require(Operation::GetOption)?;
        self.state.get_option(option)
    }

    /// Return the algorithm state to its freshly initialized form
    pub fn reset(&mut self) -> Result<()> {
        self.require(Operation::Reset)?;
        self.state.reset()
    }

    /// Set the initialization vector
    pub fn set_iv(&mut self, iv: &[u8]) -> Result<()> {
        self.require(Operation::SetIv)?;
        self.state.set_iv(iv)
    }

    /// Feed bytes into the digest
    pub fn append(&mut self, data: &[u8]) -> Result<()> {
        self.require(Operation::Append)?;
        self.state.append(data)
    }

    /// Size of the finalized digest in bytes
    pub fn digest_size(&self) -> Result<usize> {
        self.require(Operation::Digest)?;
        self.state.digest_size()
    }

    /// Finalize into `out` and reset the accumulator
    ///
    /// Returns the number of bytes written. Fails with `BufferTooSmall`
    /// rather than truncating.
    pub fn digest(&mut self, out: &mut [u8]) -> Result<usize> {
        self.require(Operation::Digest)?;
        self.state.digest(out)
    }

    /// Finalize as lowercase hex into `out`
    ///
    /// `out` must hold `2 * digest_size + 1` bytes; a NUL follows the hex
    /// text. Returns the number of hex characters written.
    pub fn digest_to_hex(&mut self, out: &mut [u8]) -> Result<usize> {
        let size = self.digest_size()?;
        let required = 2 * size + 1;
        if out.len() < required {
            return Err(CipherError::BufferTooSmall {
                required,
                actual: out.len(),
            });
        }

        let mut raw = vec![0u8; size];
        let written = self.state.digest(&mut raw)?.min(size);
        let hex_len = 2 * written;
        hex::encode_to_slice(&raw[..written], &mut out[..hex_len]).map_err(|_| {
            CipherError::BufferTooSmall {
                required,
                actual: out.len(),
            }
        })?;
        out[hex_len] = 0;
        Ok(hex_len)
    }

    /// Finalize and return the digest as a lowercase hex string
    pub fn hex_digest(&mut self) -> Result<String> {
        let size = self.digest_size()?;
        let mut raw = vec![0u8; size];
        // External algorithms may over-report; only `size` bytes exist
        let written = self.state.digest(&mut raw)?.min(size);
        Ok(hex::encode(&raw[..written]))
    }

    /// Encrypt `input`; the output length is the returned vector's length
    pub fn encrypt(&mut self, input: &[u8]) -> Result<Vec<u8>> {
        self.require(Operation::Encrypt)?;
        self.state.encrypt(input)
    }

    /// Decrypt `input`
    pub fn decrypt(&mut self, input: &[u8]) -> Result<Vec<u8>> {
        self.require(Operation::Decrypt)?;
        self.state.decrypt(input)
    }

    /// Set a salt
    pub fn set_salt(&mut self, salt: &[u8]) -> Result<()> {
        self.require(Operation::SetSalt)?;
        self.state.set_salt(salt)
    }

    /// Salt size in bytes
    pub fn get_salt_size(&self) -> Result<usize> {
        self.require(Operation::GetSaltSize)?;
        self.state.get_salt_size()
    }

    /// Install key material
    pub fn set_key(&mut self, key: &[u8]) -> Result<()> {
        self.require(Operation::SetKey)?;
        self.state.set_key(key)
    }

    /// Install the first `len` bytes of `key`
    pub fn set_key_with_len(&mut self, key: &[u8], len: usize) -> Result<()> {
        self.require(Operation::SetKeyWithLen)?;
        self.state.set_key_with_len(key, len)
    }

    /// Key size in bytes
    pub fn get_key_size(&self) -> Result<usize> {
        self.require(Operation::GetKeySize)?;
        self.state.get_key_size()
    }

    /// Select ECB or CBC chaining
    pub fn set_batch_mode(&mut self, mode: BatchMode) -> Result<()> {
        self.require(Operation::SetBatchMode)?;
        self.state.set_batch_mode(mode)
    }

    /// Current chaining mode
    pub fn get_batch_mode(&self) -> Result<BatchMode> {
        self.require(Operation::GetBatchMode)?;
        self.state.get_batch_mode()
    }

    /// Block size in bytes
    pub fn get_block_size(&self) -> Result<usize> {
        self.require(Operation::GetBlockSize)?;
        self.state.get_block_size()
    }
}

impl Drop for CipherContext {
    fn drop(&mut self) {
        self.state.wipe();
        self.descriptor.release();
        tracing::debug!(
            "Destroyed {} context ({} live)",
            self.descriptor.name(),
            self.descriptor.live_contexts()
        );
    }
}

impl fmt::Debug for CipherContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CipherContext")
            .field("cipher", &self.name())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::algorithm::CipherFactory;
    use crate::registry::Registry;

    /// Digest that reports more bytes than its declared size
    struct OverReporting;

    impl CipherOps for OverReporting {
        fn name(&self) -> &str {
            "overreport"
        }

        fn append(&mut self, _data: &[u8]) -> Result<()> {
            Ok(())
        }

        fn digest_size(&self) -> Result<usize> {
            Ok(4)
        }

        fn digest(&mut self, out: &mut [u8]) -> Result<usize> {
            out.fill(0xAB);
            Ok(64)
        }
    }

    struct OverReportingFactory;

    impl CipherFactory for OverReportingFactory {
        fn operations(&self) -> Capabilities {
            Capabilities::from_operations(&[Operation::Init, Operation::Append, Operation::Digest])
        }

        fn create(&self) -> Box<dyn CipherOps> {
            Box::new(OverReporting)
        }
    }

    #[test]
    fn test_unsupported_operations_are_reported() {
        let registry = Registry::with_builtins();
        let mut sha = registry.context("sha1").unwrap();
        assert_eq!(
            sha.set_key(b"key"),
            Err(CipherError::UnsupportedOperation {
                cipher: "sha1".into(),
                operation: Operation::SetKey,
            })
        );
        assert!(sha.encrypt(b"data").is_err());
        assert!(sha.set_batch_mode(BatchMode::Cbc).is_err());

        let mut des = registry.context("des").unwrap();
        assert!(des.append(b"data").is_err());
        assert!(des.set_iv(&[0; 8]).is_err());
    }

    #[test]
    fn test_digest_to_hex_needs_terminator_room() {
        let registry = Registry::with_builtins();
        let mut md5 = registry.context("md5").unwrap();
        md5.append(b"abc").unwrap();

        let mut short = [0u8; 32];
        assert_eq!(
            md5.digest_to_hex(&mut short),
            Err(CipherError::BufferTooSmall {
                required: 33,
                actual: 32
            })
        );

        let mut out = [0xFFu8; 33];
        assert_eq!(md5.digest_to_hex(&mut out).unwrap(), 32);
        assert_eq!(&out[..32], b"900150983cd24fb0d6963f7d28e17f72");
        assert_eq!(out[32], 0);
    }

    #[test]
    fn test_hex_output_bounded_by_digest_size() {
        let mut registry = Registry::new();
        let descriptor = registry
            .register_custom("overreport", Arc::new(OverReportingFactory))
            .unwrap();
        let mut ctx = CipherContext::new(&descriptor);

        assert_eq!(ctx.hex_digest().unwrap(), "abababab");

        let mut out = [0u8; 9];
        assert_eq!(ctx.digest_to_hex(&mut out).unwrap(), 8);
        assert_eq!(&out[..8], b"abababab");
        assert_eq!(out[8], 0);
    }

    #[test]
    fn test_live_count_follows_scope() {
        let registry = Registry::with_builtins();
        let sha = registry.find("sha256").unwrap();
        {
            let _a = CipherContext::new(&sha);
            let _b = CipherContext::new(&sha);
            assert_eq!(sha.live_contexts(), 2);
        }
        assert_eq!(sha.live_contexts(), 0);
    }

    #[test]
    fn test_descriptor_binding() {
        let registry = Registry::with_builtins();
        let ctx = registry.context("RC4").unwrap();
        assert_eq!(ctx.name(), "rc4");
        assert!(ctx.capabilities().contains(Operation::SetKeyWithLen));
        assert!(!ctx.capabilities().contains(Operation::Decrypt));
        assert_eq!(ctx.get_key_size().unwrap(), 5);
    }
}
