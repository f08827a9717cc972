//! Operation names and capability bitmasks
//!
//! Every algorithm exposes a subset of one uniform operation interface. The
//! subset is described by a [`Capabilities`] mask so generic callers can check
//! before invoking an operation.

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

/// One operation of the uniform cipher interface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Set a named algorithm option
    SetOption,
    /// Read a named algorithm option
    GetOption,
    /// Allocate algorithm state
    Init,
    /// Return the state to its freshly initialized form
    Reset,
    /// Wipe and release algorithm state
    Uninit,
    /// Set the initialization vector
    SetIv,
    /// Feed bytes into a digest
    Append,
    /// Finalize a digest
    Digest,
    /// Encrypt a buffer
    Encrypt,
    /// Decrypt a buffer
    Decrypt,
    /// Set a salt
    SetSalt,
    /// Query the salt size
    GetSaltSize,
    /// Install key material
    SetKey,
    /// Query the key size
    GetKeySize,
    /// Select ECB or CBC chaining
    SetBatchMode,
    /// Query the chaining mode
    GetBatchMode,
    /// Query the block size
    GetBlockSize,
    /// Install key material of an explicit length
    SetKeyWithLen,
}

impl Operation {
    /// All operations in interface order
    pub const ALL: [Self; 18] = [
        Self::SetOption,
        Self::GetOption,
        Self::Init,
        Self::Reset,
        Self::Uninit,
        Self::SetIv,
        Self::Append,
        Self::Digest,
        Self::Encrypt,
        Self::Decrypt,
        Self::SetSalt,
        Self::GetSaltSize,
        Self::SetKey,
        Self::GetKeySize,
        Self::SetBatchMode,
        Self::GetBatchMode,
        Self::GetBlockSize,
        Self::SetKeyWithLen,
    ];

    /// Snake-case name of the operation
    pub const fn name(self) -> &'static str {
        match self {
            Self::SetOption => "set_option",
            Self::GetOption => "get_option",
            Self::Init => "init",
            Self::Reset => "reset",
            Self::Uninit => "uninit",
            Self::SetIv => "set_iv",
            Self::Append => "append",
            Self::Digest => "digest",
            Self::Encrypt => "encrypt",
            Self::Decrypt => "decrypt",
            Self::SetSalt => "set_salt",
            Self::GetSaltSize => "get_salt_size",
            Self::SetKey => "set_key",
            Self::GetKeySize => "get_key_size",
            Self::SetBatchMode => "set_batch_mode",
            Self::GetBatchMode => "get_batch_mode",
            Self::GetBlockSize => "get_block_size",
            Self::SetKeyWithLen => "set_key_with_len",
        }
    }

    const fn bit(self) -> u32 {
        1 << (self as u32)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Bitmask of supported operations
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Capabilities(u32);

impl Capabilities {
    /// No operations
    pub const NONE: Self = Self(0);

    /// Build a mask from a list of operations
    pub const fn from_operations(ops: &[Operation]) -> Self {
        let mut bits = 0;
        let mut i = 0;
        while i < ops.len() {
            bits |= ops[i].bit();
            i += 1;
        }
        Self(bits)
    }

    /// Raw bit representation
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Whether `op` is in the set
    pub const fn contains(self, op: Operation) -> bool {
        self.0 & op.bit() != 0
    }

    /// Whether the set is empty
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Number of operations in the set
    pub const fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Iterate the contained operations in interface order
    pub fn iter(self) -> impl Iterator<Item = Operation> {
        Operation::ALL.into_iter().filter(move |op| self.contains(*op))
    }

    /// Whether both `append` and `digest` are present
    pub const fn is_digest(self) -> bool {
        self.contains(Operation::Append) && self.contains(Operation::Digest)
    }
}

impl BitOr for Capabilities {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for Capabilities {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl From<Operation> for Capabilities {
    fn from(op: Operation) -> Self {
        Self(op.bit())
    }
}

impl FromIterator<Operation> for Capabilities {
    fn from_iter<I: IntoIterator<Item = Operation>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Self::NONE, |caps, op| caps | Self::from(op))
    }
}

impl fmt::Display for Capabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.iter().map(Operation::name).collect();
        write!(f, "{}", names.join(","))
    }
}
