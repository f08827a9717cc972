//! ARC4 (RC4-compatible) stream cipher
//!
//! The permutation table and both running indices persist across calls, so
//! successive `encrypt` calls on one cipher continue a single keystream.
//! Encrypting `a` then `b` yields the same bytes as encrypting `a || b` once.
//! Build a fresh cipher (or re-key) to start an independent keystream.
//!
//! There is no separate decrypt operation: applying the keystream again with
//! an identically keyed cipher restores the plaintext.
//!
//! ## Security Warning
//!
//! ARC4 has known cryptographic weaknesses and should not be used for new
//! applications. It is provided for compatibility with legacy protocols.
//!
//! ## Usage
//!
//! ```rust
//! use cipherkit::arc4::Arc4Cipher;
//!
//! let mut cipher = Arc4Cipher::new(b"Key").expect("valid key length");
//! let ciphertext = cipher.encrypt(b"Plaintext");
//! assert_eq!(ciphertext, [0xBB, 0xF3, 0x16, 0xE8, 0xD9, 0x40, 0xAF, 0x0A, 0xD3]);
//!
//! let mut cipher = Arc4Cipher::new(b"Key").expect("valid key length");
//! assert_eq!(cipher.encrypt(&ciphertext), b"Plaintext");
//! ```

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::algorithm::{CipherOps, OptionValue};
use crate::error::{CipherError, Result};

/// Key length used until `key_len` is changed: 5 bytes (40 bits)
pub const DEFAULT_KEY_LEN: usize = 5;

/// Largest usable key length
pub const MAX_KEY_LEN: usize = 256;

/// Identity permutation 0..=255
const fn identity() -> [u8; 256] {
    let mut s = [0u8; 256];
    let mut i = 0;
    while i < 256 {
        #[allow(clippy::cast_possible_truncation)] // i < 256
        {
            s[i] = i as u8;
        }
        i += 1;
    }
    s
}

fn check_key_len(len: usize) -> Result<usize> {
    if (1..=MAX_KEY_LEN).contains(&len) {
        Ok(len)
    } else {
        Err(CipherError::InvalidOptionValue {
            option: "key_len".to_string(),
            reason: format!("{len} is outside 1..={MAX_KEY_LEN}"),
        })
    }
}

/// ARC4 stream cipher state
///
/// Holds the 256-byte permutation, the running indices and the configured
/// key length.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Arc4Cipher {
    /// S-box state (256 bytes)
    s: [u8; 256],
    /// Current indices
    i: u8,
    j: u8,
    key_len: usize,
}

impl Default for Arc4Cipher {
    /// Identity permutation, zero indices, 5-byte key length; not yet keyed
    fn default() -> Self {
        Self {
            s: identity(),
            i: 0,
            j: 0,
            key_len: DEFAULT_KEY_LEN,
        }
    }
}

impl Arc4Cipher {
    /// Create a cipher keyed with all of `key`
    ///
    /// # Errors
    ///
    /// Returns `CipherError::InvalidKeyLength` if the key is empty or longer
    /// than 256 bytes. `expected` is the nearest valid length.
    pub fn new(key: &[u8]) -> Result<Self> {
        if key.is_empty() || key.len() > MAX_KEY_LEN {
            return Err(CipherError::InvalidKeyLength {
                expected: key.len().clamp(1, MAX_KEY_LEN),
                actual: key.len(),
            });
        }

        let mut cipher = Self {
            key_len: key.len(),
            ..Self::default()
        };
        cipher.schedule(key);
        Ok(cipher)
    }

    /// Configured key length in bytes
    pub fn key_len(&self) -> usize {
        self.key_len
    }

    /// Change the number of key bytes consumed by the next `rekey`
    pub fn set_key_len(&mut self, len: usize) -> Result<()> {
        self.key_len = check_key_len(len)?;
        Ok(())
    }

    /// Re-key from the first `key_len` bytes of `key`
    ///
    /// The permutation and indices start over, so the keystream is independent
    /// of anything produced before.
    pub fn rekey(&mut self, key: &[u8]) -> Result<()> {
        if key.len() < self.key_len {
            return Err(CipherError::InvalidKeyLength {
                expected: self.key_len,
                actual: key.len(),
            });
        }
        self.s = identity();
        self.i = 0;
        self.j = 0;
        self.schedule(&key[..self.key_len]);
        Ok(())
    }

    // Key-scheduling algorithm (KSA) over the current table
    fn schedule(&mut self, key: &[u8]) {
        let mut j = 0u8;
        for i in 0..256 {
            j = j.wrapping_add(self.s[i]).wrapping_add(key[i % key.len()]);
            self.s.swap(i, j as usize);
        }
    }

    /// Generate the next keystream byte (PRGA)
    fn next_keystream_byte(&mut self) -> u8 {
        self.i = self.i.wrapping_add(1);
        self.j = self.j.wrapping_add(self.s[self.i as usize]);

        self.s.swap(self.i as usize, self.j as usize);

        let k = self.s[self.i as usize].wrapping_add(self.s[self.j as usize]);
        self.s[k as usize]
    }

    /// XOR `data` with the next `data.len()` keystream bytes
    pub fn encrypt(&mut self, data: &[u8]) -> Vec<u8> {
        data.iter()
            .map(|&byte| byte ^ self.next_keystream_byte())
            .collect()
    }

    /// Apply the keystream to `data` in place, without allocating
    pub fn apply_keystream(&mut self, data: &mut [u8]) {
        for byte in data {
            *byte ^= self.next_keystream_byte();
        }
    }
}

impl CipherOps for Arc4Cipher {
    fn name(&self) -> &str {
        "rc4"
    }

    fn set_option(&mut self, option: &str, value: OptionValue) -> Result<()> {
        if option != "key_len" {
            return Err(CipherError::unknown_option("rc4", option));
        }
        let raw = value.as_int(option)?;
        let len = usize::try_from(raw).unwrap_or(usize::MAX);
        self.set_key_len(len)
    }

    fn get_option(&self, option: &str) -> Result<OptionValue> {
        if option != "key_len" {
            return Err(CipherError::unknown_option("rc4", option));
        }
        Ok(OptionValue::Int(self.key_len as u64))
    }

    fn reset(&mut self) -> Result<()> {
        *self = Self::default();
        Ok(())
    }

    fn encrypt(&mut self, input: &[u8]) -> Result<Vec<u8>> {
        Ok(Arc4Cipher::encrypt(self, input))
    }

    fn set_key(&mut self, key: &[u8]) -> Result<()> {
        self.rekey(key)
    }

    fn get_key_size(&self) -> Result<usize> {
        Ok(self.key_len)
    }

    fn set_key_with_len(&mut self, key: &[u8], len: usize) -> Result<()> {
        let len = check_key_len(len)?;
        if len > key.len() {
            return Err(CipherError::InvalidKeyLength {
                expected: len,
                actual: key.len(),
            });
        }
        self.key_len = len;
        self.rekey(key)
    }

    fn wipe(&mut self) {
        self.zeroize();
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_arc4_round_trip() {
        let key = b"test_key";
        let plaintext = b"Hello, ARC4 World!";

        let mut cipher = Arc4Cipher::new(key).expect("valid key");
        let ciphertext = cipher.encrypt(plaintext);

        let mut cipher = Arc4Cipher::new(key).expect("valid key");
        let decrypted = cipher.encrypt(&ciphertext);

        assert_eq!(plaintext, &decrypted[..]);
        assert_ne!(plaintext, &ciphertext[..]);
    }

    #[test]
    fn test_arc4_known_vectors() {
        let cases: [(&[u8], &[u8], &str); 3] = [
            (b"Key", b"Plaintext", "bbf316e8d940af0ad3"),
            (b"Wiki", b"pedia", "1021bf0420"),
            (b"Secret", b"Attack at dawn", "45a01f645fc35b383552544b9bf5"),
        ];
        for (key, plain, expected) in cases {
            let mut cipher = Arc4Cipher::new(key).unwrap();
            assert_eq!(hex::encode(cipher.encrypt(plain)), expected);
        }
    }

    #[test]
    fn test_default_key_len_is_forty_bits() {
        let cipher = Arc4Cipher::default();
        assert_eq!(cipher.key_len(), 5);
        assert_eq!(cipher.get_key_size().unwrap(), 5);
        assert_eq!(cipher.get_option("key_len").unwrap(), OptionValue::Int(5));
    }

    #[test]
    fn test_set_key_uses_only_key_len_bytes() {
        let mut short = Arc4Cipher::default();
        short.set_key(b"0123456789").unwrap();

        let mut exact = Arc4Cipher::new(b"01234").unwrap();
        assert_eq!(short.encrypt(b"same stream"), exact.encrypt(b"same stream"));
    }

    #[test]
    fn test_set_key_rejects_short_key() {
        let mut cipher = Arc4Cipher::default();
        assert_eq!(
            cipher.set_key(b"abc"),
            Err(CipherError::InvalidKeyLength {
                expected: 5,
                actual: 3
            })
        );
    }

    #[test]
    fn test_set_key_with_len() {
        let mut cipher = Arc4Cipher::default();
        cipher.set_key_with_len(b"Key", 3).unwrap();
        assert_eq!(cipher.get_key_size().unwrap(), 3);
        assert_eq!(
            hex::encode(Arc4Cipher::encrypt(&mut cipher, b"Plaintext")),
            "bbf316e8d940af0ad3"
        );

        assert!(cipher.set_key_with_len(b"Key", 4).is_err());
        assert!(cipher.set_key_with_len(b"Key", 0).is_err());
    }

    #[test]
    fn test_rekey_restarts_keystream() {
        let mut cipher = Arc4Cipher::new(b"Key").unwrap();
        let first = cipher.encrypt(b"Plaintext");
        cipher.rekey(b"Key").unwrap();
        assert_eq!(cipher.encrypt(b"Plaintext"), first);
    }

    #[test]
    fn test_keystream_continues_across_calls() {
        let mut split = Arc4Cipher::new(b"stream").unwrap();
        let mut joined = split.encrypt(b"first half, ");
        joined.extend(split.encrypt(b"second half"));

        let mut whole = Arc4Cipher::new(b"stream").unwrap();
        assert_eq!(joined, whole.encrypt(b"first half, second half"));
    }

    #[test]
    fn test_key_len_option_bounds() {
        let mut cipher = Arc4Cipher::default();
        cipher.set_option("key_len", OptionValue::Int(256)).unwrap();
        assert!(cipher.set_option("key_len", OptionValue::Int(0)).is_err());
        assert!(cipher.set_option("key_len", OptionValue::Int(257)).is_err());
        assert!(cipher
            .set_option("key_len", OptionValue::Text("5".into()))
            .is_err());
        assert!(matches!(
            cipher.set_option("rounds", OptionValue::Int(1)),
            Err(CipherError::UnknownOption { .. })
        ));
        assert_eq!(cipher.key_len(), 256);
    }

    #[test]
    fn test_reset_restores_defaults() {
        let mut cipher = Arc4Cipher::new(b"a longer key").unwrap();
        let _ = cipher.encrypt(b"advance");
        cipher.reset().unwrap();
        assert_eq!(cipher.key_len(), DEFAULT_KEY_LEN);
        assert_eq!(cipher.s, identity());
        assert_eq!((cipher.i, cipher.j), (0, 0));
    }

    #[test]
    fn test_arc4_in_place() {
        let original = b"Hello, World!";

        let mut data = original.to_vec();
        let mut cipher = Arc4Cipher::new(b"test_key").unwrap();
        cipher.apply_keystream(&mut data);
        assert_ne!(original, &data[..]);

        let mut cipher = Arc4Cipher::new(b"test_key").unwrap();
        cipher.apply_keystream(&mut data);
        assert_eq!(original, &data[..]);
    }

    #[test]
    fn test_arc4_invalid_key_length() {
        assert!(Arc4Cipher::new(b"").is_err());
        assert!(Arc4Cipher::new(&[0u8; 257]).is_err());
        assert!(Arc4Cipher::new(b"a").is_ok());
        assert!(Arc4Cipher::new(&[0u8; 256]).is_ok());
    }

    #[test]
    fn test_no_decrypt_operation() {
        let mut cipher = Arc4Cipher::default();
        assert!(CipherOps::decrypt(&mut cipher, b"x").is_err());
    }

    #[cfg(test)]
    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Splitting the input across calls does not change the keystream
            #[test]
            fn split_stream_matches_whole(
                key in prop::collection::vec(any::<u8>(), 1..=MAX_KEY_LEN),
                data in prop::collection::vec(any::<u8>(), 0..512),
                split in any::<prop::sample::Index>(),
            ) {
                let at = split.index(data.len() + 1);

                let mut streaming = Arc4Cipher::new(&key).unwrap();
                let mut joined = streaming.encrypt(&data[..at]);
                joined.extend(streaming.encrypt(&data[at..]));

                let mut whole = Arc4Cipher::new(&key).unwrap();
                prop_assert_eq!(&joined, &whole.encrypt(&data));

                let mut inverse = Arc4Cipher::new(&key).unwrap();
                prop_assert_eq!(inverse.encrypt(&joined), data);
            }
        }
    }
}
