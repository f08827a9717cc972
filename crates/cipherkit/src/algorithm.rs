//! Uniform algorithm interface and the closed set of algorithm states
//!
//! [`CipherOps`] is the operation table every algorithm implements. Methods
//! an algorithm does not support keep their default body, which reports
//! [`CipherError::UnsupportedOperation`]. [`AlgorithmState`] carries the
//! variant-specific state of one live context and forwards each call to it.

use std::fmt;
use std::sync::Arc;

use crate::arc4::Arc4Cipher;
use crate::capabilities::{Capabilities, Operation};
use crate::des::DesCipher;
use crate::des3::TripleDesCipher;
use crate::error::{CipherError, Result};
use crate::hmac::HmacState;
use crate::md4::Md4Context;
use crate::md5::Md5Context;
use crate::sha1::Sha1;
use crate::sha256::Sha256;

/// Value of a named algorithm option
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionValue {
    /// Integer option such as `key_len` or `sizeLo`
    Int(u64),
    /// Text option such as the HMAC `hash` name
    Text(String),
}

impl OptionValue {
    /// Integer payload, or an `InvalidOptionValue` error naming `option`
    pub fn as_int(&self, option: &str) -> Result<u64> {
        match self {
            Self::Int(v) => Ok(*v),
            Self::Text(_) => Err(CipherError::InvalidOptionValue {
                option: option.to_string(),
                reason: "expected an integer".to_string(),
            }),
        }
    }

    /// Text payload, or an `InvalidOptionValue` error naming `option`
    pub fn as_text(&self, option: &str) -> Result<&str> {
        match self {
            Self::Text(v) => Ok(v),
            Self::Int(_) => Err(CipherError::InvalidOptionValue {
                option: option.to_string(),
                reason: "expected text".to_string(),
            }),
        }
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Text(v) => f.write_str(v),
        }
    }
}

/// Block chaining mode for multi-mode block ciphers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum BatchMode {
    /// Electronic codebook: every block independent
    #[default]
    Ecb,
    /// Cipher block chaining seeded by the IV
    Cbc,
}

impl fmt::Display for BatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ecb => f.write_str("ECB"),
            Self::Cbc => f.write_str("CBC"),
        }
    }
}

/// Operation table implemented by every algorithm
///
/// Construction plays the role of `init` and [`CipherOps::wipe`] the role of
/// `uninit`.
pub trait CipherOps: Send {
    /// Algorithm name used in diagnostics
    fn name(&self) -> &str;

    /// Set a named option
    fn set_option(&mut self, _option: &str, _value: OptionValue) -> Result<()> {
        Err(CipherError::unsupported(self.name(), Operation::SetOption))
    }

    /// Read a named option
    fn get_option(&self, _option: &str) -> Result<OptionValue> {
        Err(CipherError::unsupported(self.name(), Operation::GetOption))
    }

    /// Return to the freshly initialized state
    fn reset(&mut self) -> Result<()> {
        Err(CipherError::unsupported(self.name(), Operation::Reset))
    }

    /// Set the initialization vector
    fn set_iv(&mut self, _iv: &[u8]) -> Result<()> {
        Err(CipherError::unsupported(self.name(), Operation::SetIv))
    }

    /// Feed bytes into the digest accumulator
    fn append(&mut self, _data: &[u8]) -> Result<()> {
        Err(CipherError::unsupported(self.name(), Operation::Append))
    }

    /// Size in bytes of the finalized digest
    fn digest_size(&self) -> Result<usize> {
        Err(CipherError::unsupported(self.name(), Operation::Digest))
    }

    /// Finalize into `out`, returning the number of bytes written
    fn digest(&mut self, _out: &mut [u8]) -> Result<usize> {
        Err(CipherError::unsupported(self.name(), Operation::Digest))
    }

    /// Encrypt `input`
    fn encrypt(&mut self, _input: &[u8]) -> Result<Vec<u8>> {
        Err(CipherError::unsupported(self.name(), Operation::Encrypt))
    }

    /// Decrypt `input`
    fn decrypt(&mut self, _input: &[u8]) -> Result<Vec<u8>> {
        Err(CipherError::unsupported(self.name(), Operation::Decrypt))
    }

    /// Set a salt
    fn set_salt(&mut self, _salt: &[u8]) -> Result<()> {
        Err(CipherError::unsupported(self.name(), Operation::SetSalt))
    }

    /// Salt size in bytes
    fn get_salt_size(&self) -> Result<usize> {
        Err(CipherError::unsupported(self.name(), Operation::GetSaltSize))
    }

    /// Install key material
    fn set_key(&mut self, _key: &[u8]) -> Result<()> {
        Err(CipherError::unsupported(self.name(), Operation::SetKey))
    }

    /// Key size in bytes
    fn get_key_size(&self) -> Result<usize> {
        Err(CipherError::unsupported(self.name(), Operation::GetKeySize))
    }

    /// Select the chaining mode
    fn set_batch_mode(&mut self, _mode: BatchMode) -> Result<()> {
        Err(CipherError::unsupported(self.name(), Operation::SetBatchMode))
    }

    /// Current chaining mode
    fn get_batch_mode(&self) -> Result<BatchMode> {
        Err(CipherError::unsupported(self.name(), Operation::GetBatchMode))
    }

    /// Block size in bytes
    fn get_block_size(&self) -> Result<usize> {
        Err(CipherError::unsupported(self.name(), Operation::GetBlockSize))
    }

    /// Install the first `len` bytes of `key`
    fn set_key_with_len(&mut self, _key: &[u8], _len: usize) -> Result<()> {
        Err(CipherError::unsupported(self.name(), Operation::SetKeyWithLen))
    }

    /// Overwrite all key material and accumulated state with zeros
    fn wipe(&mut self) {}
}

/// Factory for algorithms supplied from outside this crate
pub trait CipherFactory: Send + Sync {
    /// Operations the created state implements
    fn operations(&self) -> Capabilities;

    /// Create fresh algorithm state
    fn create(&self) -> Box<dyn CipherOps>;
}

/// Algorithm selector stored in a descriptor
#[derive(Clone)]
pub enum CipherKind {
    /// MD4 digest
    Md4,
    /// MD5 digest
    Md5,
    /// SHA-1 digest
    Sha1,
    /// SHA-256 digest
    Sha256,
    /// HMAC over one of the built-in digests
    Hmac,
    /// Single DES
    Des,
    /// Triple DES (EDE) in ECB or CBC
    Des3,
    /// RC4 stream cipher
    Rc4,
    /// Externally supplied algorithm
    Custom(Arc<dyn CipherFactory>),
}

const DIGEST_OPS: Capabilities = Capabilities::from_operations(&[
    Operation::Init,
    Operation::Reset,
    Operation::Uninit,
    Operation::Append,
    Operation::Digest,
    Operation::GetBlockSize,
]);

const SHA_OPS: Capabilities = Capabilities::from_operations(&[
    Operation::SetOption,
    Operation::GetOption,
    Operation::Init,
    Operation::Reset,
    Operation::Uninit,
    Operation::Append,
    Operation::Digest,
    Operation::GetBlockSize,
]);

const HMAC_OPS: Capabilities = Capabilities::from_operations(&[
    Operation::SetOption,
    Operation::GetOption,
    Operation::Init,
    Operation::Reset,
    Operation::Uninit,
    Operation::Append,
    Operation::Digest,
    Operation::SetKey,
    Operation::GetBlockSize,
    Operation::SetKeyWithLen,
]);

const DES_OPS: Capabilities = Capabilities::from_operations(&[
    Operation::Init,
    Operation::Uninit,
    Operation::Encrypt,
    Operation::Decrypt,
    Operation::SetKey,
    Operation::GetKeySize,
    Operation::GetBlockSize,
]);

const DES3_OPS: Capabilities = Capabilities::from_operations(&[
    Operation::Init,
    Operation::Uninit,
    Operation::SetIv,
    Operation::Encrypt,
    Operation::Decrypt,
    Operation::SetKey,
    Operation::GetKeySize,
    Operation::SetBatchMode,
    Operation::GetBatchMode,
    Operation::GetBlockSize,
]);

const RC4_OPS: Capabilities = Capabilities::from_operations(&[
    Operation::SetOption,
    Operation::GetOption,
    Operation::Init,
    Operation::Reset,
    Operation::Uninit,
    Operation::Encrypt,
    Operation::SetKey,
    Operation::GetKeySize,
    Operation::SetKeyWithLen,
]);

impl CipherKind {
    /// Built-in algorithms in startup registration order
    pub fn builtins() -> [(&'static str, Self); 8] {
        [
            ("md5", Self::Md5),
            ("sha1", Self::Sha1),
            ("sha256", Self::Sha256),
            ("md4", Self::Md4),
            ("hmac", Self::Hmac),
            ("des", Self::Des),
            ("des3", Self::Des3),
            ("rc4", Self::Rc4),
        ]
    }

    /// Built-in algorithm for a case-insensitive name
    pub fn builtin(name: &str) -> Option<Self> {
        Self::builtins()
            .into_iter()
            .find(|(builtin, _)| builtin.eq_ignore_ascii_case(name))
            .map(|(_, kind)| kind)
    }

    /// Whether this is one of the plain digests HMAC can wrap
    pub const fn is_plain_digest(&self) -> bool {
        matches!(self, Self::Md4 | Self::Md5 | Self::Sha1 | Self::Sha256)
    }

    /// Fixed capability set of the algorithm
    pub fn capabilities(&self) -> Capabilities {
        match self {
            Self::Md4 | Self::Md5 => DIGEST_OPS,
            Self::Sha1 | Self::Sha256 => SHA_OPS,
            Self::Hmac => HMAC_OPS,
            Self::Des => DES_OPS,
            Self::Des3 => DES3_OPS,
            Self::Rc4 => RC4_OPS,
            Self::Custom(factory) => factory.operations(),
        }
    }

    /// Create fresh state for one context
    pub fn instantiate(&self) -> AlgorithmState {
        match self {
            Self::Md4 => AlgorithmState::Md4(Md4Context::new()),
            Self::Md5 => AlgorithmState::Md5(Md5Context::new()),
            Self::Sha1 => AlgorithmState::Sha1(Sha1::new()),
            Self::Sha256 => AlgorithmState::Sha256(Sha256::new()),
            Self::Hmac => AlgorithmState::Hmac(HmacState::new()),
            Self::Des => AlgorithmState::Des(DesCipher::new()),
            Self::Des3 => AlgorithmState::Des3(TripleDesCipher::new()),
            Self::Rc4 => AlgorithmState::Rc4(Arc4Cipher::default()),
            Self::Custom(factory) => AlgorithmState::Custom(factory.create()),
        }
    }
}

impl fmt::Debug for CipherKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Md4 => f.write_str("Md4"),
            Self::Md5 => f.write_str("Md5"),
            Self::Sha1 => f.write_str("Sha1"),
            Self::Sha256 => f.write_str("Sha256"),
            Self::Hmac => f.write_str("Hmac"),
            Self::Des => f.write_str("Des"),
            Self::Des3 => f.write_str("Des3"),
            Self::Rc4 => f.write_str("Rc4"),
            Self::Custom(factory) => write!(f, "Custom({})", factory.operations()),
        }
    }
}

/// Variant-specific state owned by one context
pub enum AlgorithmState {
    /// MD4 accumulator
    Md4(Md4Context),
    /// MD5 accumulator
    Md5(Md5Context),
    /// SHA-1 accumulator
    Sha1(Sha1),
    /// SHA-256 accumulator
    Sha256(Sha256),
    /// HMAC inner/outer state
    Hmac(HmacState),
    /// DES key schedule
    Des(DesCipher),
    /// Triple-DES key schedules, mode and IV
    Des3(TripleDesCipher),
    /// RC4 permutation and indices
    Rc4(Arc4Cipher),
    /// Externally supplied state
    Custom(Box<dyn CipherOps>),
}

macro_rules! dispatch {
    ($self:ident, $state:ident => $body:expr) => {
        match $self {
            AlgorithmState::Md4($state) => $body,
            AlgorithmState::Md5($state) => $body,
            AlgorithmState::Sha1($state) => $body,
            AlgorithmState::Sha256($state) => $body,
            AlgorithmState::Hmac($state) => $body,
            AlgorithmState::Des($state) => $body,
            AlgorithmState::Des3($state) => $body,
            AlgorithmState::Rc4($state) => $body,
            AlgorithmState::Custom($state) => $body,
        }
    };
}

impl CipherOps for AlgorithmState {
    fn name(&self) -> &str {
        dispatch!(self, s => s.name())
    }

    fn set_option(&mut self, option: &str, value: OptionValue) -> Result<()> {
        dispatch!(self, s => s.set_option(option, value))
    }

    fn get_option(&self, option: &str) -> Result<OptionValue> {
        dispatch!(self, s => s.get_option(option))
    }

    fn reset(&mut self) -> Result<()> {
        dispatch!(self, s => s.reset())
    }

    fn set_iv(&mut self, iv: &[u8]) -> Result<()> {
        dispatch!(self, s => s.set_iv(iv))
    }

    fn append(&mut self, data: &[u8]) -> Result<()> {
        dispatch!(self, s => s.append(data))
    }

    fn digest_size(&self) -> Result<usize> {
        dispatch!(self, s => s.digest_size())
    }

    fn digest(&mut self, out: &mut [u8]) -> Result<usize> {
        dispatch!(self, s => s.digest(out))
    }

    fn encrypt(&mut self, input: &[u8]) -> Result<Vec<u8>> {
        // Arc4Cipher has an inherent infallible encrypt that shadows the trait
        match self {
            Self::Rc4(s) => CipherOps::encrypt(s, input),
            Self::Md4(s) => s.encrypt(input),
            Self::Md5(s) => s.encrypt(input),
            Self::Sha1(s) => s.encrypt(input),
            Self::Sha256(s) => s.encrypt(input),
            Self::Hmac(s) => s.encrypt(input),
            Self::Des(s) => s.encrypt(input),
            Self::Des3(s) => s.encrypt(input),
            Self::Custom(s) => s.encrypt(input),
        }
    }

    fn decrypt(&mut self, input: &[u8]) -> Result<Vec<u8>> {
        dispatch!(self, s => s.decrypt(input))
    }

    fn set_salt(&mut self, salt: &[u8]) -> Result<()> {
        dispatch!(self, s => s.set_salt(salt))
    }

    fn get_salt_size(&self) -> Result<usize> {
        dispatch!(self, s => s.get_salt_size())
    }

    fn set_key(&mut self, key: &[u8]) -> Result<()> {
        dispatch!(self, s => s.set_key(key))
    }

    fn get_key_size(&self) -> Result<usize> {
        dispatch!(self, s => s.get_key_size())
    }

    fn set_batch_mode(&mut self, mode: BatchMode) -> Result<()> {
        dispatch!(self, s => s.set_batch_mode(mode))
    }

    fn get_batch_mode(&self) -> Result<BatchMode> {
        dispatch!(self, s => s.get_batch_mode())
    }

    fn get_block_size(&self) -> Result<usize> {
        dispatch!(self, s => s.get_block_size())
    }

    fn set_key_with_len(&mut self, key: &[u8], len: usize) -> Result<()> {
        dispatch!(self, s => s.set_key_with_len(key, len))
    }

    fn wipe(&mut self) {
        dispatch!(self, s => s.wipe());
    }
}

impl fmt::Debug for AlgorithmState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // State is key material; only the algorithm is shown.
        f.debug_tuple("AlgorithmState").field(&self.name()).finish()
    }
}
