//! Pluggable cipher and digest framework
//!
//! This crate drives heterogeneous cryptographic algorithms through one
//! uniform operation interface. Algorithms are registered by name in a
//! [`Registry`]; callers look them up, create a [`CipherContext`] and invoke
//! operations, probing [`Capabilities`] first when they need to know what an
//! algorithm supports.
//!
//! # Components
//!
//! - **Digests**: SHA-1, SHA-256, MD5, MD4, and HMAC over any of them
//! - **Block ciphers**: DES, Triple-DES (EDE) in ECB or CBC mode
//! - **Stream ciphers**: RC4 with a configurable key length
//! - **HTTP Digest**: RFC 2617 session key and response calculation
//!
//! # Examples
//!
//! ## One-shot digest
//!
//! ```
//! use cipherkit::Registry;
//!
//! let registry = Registry::with_builtins();
//! let hex = registry.digest_region("sha1", b"abc").expect("sha1 is built in");
//! assert_eq!(hex, "a9993e364706816aba3e25717850c26c9cd0d89d");
//! ```
//!
//! ## Triple-DES in CBC mode
//!
//! ```
//! use cipherkit::{BatchMode, Registry};
//!
//! let registry = Registry::with_builtins();
//! let mut des3 = registry.context("des3").expect("des3 is built in");
//! des3.set_key(&[0x11; 24]).expect("24-byte key");
//! des3.set_iv(&[0x22; 8]).expect("8-byte IV");
//! des3.set_batch_mode(BatchMode::Cbc).expect("des3 supports CBC");
//!
//! let ciphertext = des3.encrypt(b"sixteen byte msg").expect("encrypt");
//! let plaintext = des3.decrypt(&ciphertext).expect("decrypt");
//! assert_eq!(plaintext, b"sixteen byte msg");
//! ```
//!
//! ## Probing capabilities
//!
//! ```
//! use cipherkit::{Operation, Registry};
//!
//! let registry = Registry::with_builtins();
//! let rc4 = registry.find("rc4").expect("rc4 is built in");
//! assert!(rc4.supports(Operation::Encrypt));
//! assert!(!rc4.supports(Operation::Decrypt));
//! ```

#![warn(missing_docs)]

pub mod algorithm;
pub mod arc4;
mod block_digest;
pub mod capabilities;
pub mod context;
pub mod des;
pub mod des3;
pub mod error;
pub mod hmac;
pub mod http_digest;
pub mod md4;
pub mod md5;
pub mod registry;
pub mod sha1;
pub mod sha256;

pub use error::{CipherError, Result};

// Re-export commonly used types
pub use algorithm::{BatchMode, CipherFactory, CipherKind, CipherOps, OptionValue};
pub use arc4::Arc4Cipher;
pub use capabilities::{Capabilities, Operation};
pub use context::CipherContext;
pub use des::{DesCipher, DesKeySchedule};
pub use des3::TripleDesCipher;
pub use hmac::HmacState;
pub use http_digest::{DigestAlgorithm, Qop, ResponseParams, SessionKeyParams};
pub use md4::Md4Context;
pub use md5::Md5Context;
pub use registry::{CipherDescriptor, Registry, RegistryEvent};
pub use sha1::Sha1;
pub use sha256::Sha256;
