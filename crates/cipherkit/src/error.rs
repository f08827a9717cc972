//! Error types for cipher and digest operations

use thiserror::Error;

use crate::capabilities::Operation;

/// Errors that can occur while registering, looking up or driving a cipher
///
/// Every error is raised at the call boundary before the algorithm state is
/// touched, so a failed call never leaves a context half-updated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CipherError {
    /// The bound algorithm does not implement the requested operation
    #[error("the {cipher} cipher does not support the {operation} operation")]
    UnsupportedOperation {
        /// Name of the cipher the context is bound to
        cipher: String,
        /// Operation that was requested
        operation: Operation,
    },

    /// Invalid key size
    #[error("Invalid key size: expected {expected}, got {actual}")]
    InvalidKeyLength {
        /// Expected key size in bytes
        expected: usize,
        /// Actual key size in bytes
        actual: usize,
    },

    /// Invalid IV size
    #[error("Invalid IV size: expected {expected}, got {actual}")]
    InvalidIvLength {
        /// Expected IV size in bytes
        expected: usize,
        /// Actual IV size in bytes
        actual: usize,
    },

    /// Output buffer cannot hold the result
    #[error("Output buffer too small: need {required} bytes, got {actual}")]
    BufferTooSmall {
        /// Bytes the operation needs to write
        required: usize,
        /// Bytes the caller provided
        actual: usize,
    },

    /// A cipher with the same (case-insensitive) name is already registered
    #[error("cipher already registered: {0}")]
    DuplicateRegistration(String),

    /// A cipher was registered without any operations
    #[error("cipher {0} declares no operations")]
    EmptyOperations(String),

    /// No cipher registered under the name
    #[error("cipher not found: {0}")]
    NotFound(String),

    /// The cipher still has live contexts and cannot be unregistered
    #[error("cipher {name} still has {live_contexts} live context(s)")]
    CipherInUse {
        /// Name of the cipher
        name: String,
        /// Number of contexts currently bound to it
        live_contexts: usize,
    },

    /// A parameter required by the selected mode was not supplied
    #[error("required parameter missing: {0}")]
    MissingRequiredParameter(&'static str),

    /// The cipher does not know the named option
    #[error("the {cipher} cipher has no option named {option}")]
    UnknownOption {
        /// Name of the cipher
        cipher: String,
        /// Option that was requested
        option: String,
    },

    /// The option value has the wrong type or is out of range
    #[error("invalid value for option {option}: {reason}")]
    InvalidOptionValue {
        /// Option being set
        option: String,
        /// Why the value was rejected
        reason: String,
    },

    /// HTTP Digest algorithm other than MD5 / MD5-sess
    #[error("unsupported digest algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// HTTP Digest quality of protection other than auth / auth-int
    #[error("unsupported quality of protection: {0}")]
    UnsupportedQop(String),
}

impl CipherError {
    pub(crate) fn unsupported(cipher: impl Into<String>, operation: Operation) -> Self {
        Self::UnsupportedOperation {
            cipher: cipher.into(),
            operation,
        }
    }

    pub(crate) fn unknown_option(cipher: impl Into<String>, option: &str) -> Self {
        Self::UnknownOption {
            cipher: cipher.into(),
            option: option.to_string(),
        }
    }
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, CipherError>;
