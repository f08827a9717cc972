//! HMAC (RFC 2104) over one of the built-in digests
//!
//! The inner digest is chosen with the `hash` option before a key is set.
//! After `digest` the inner hash is re-armed with the same key, so one
//! context can authenticate several messages in a row.

use zeroize::{Zeroize, Zeroizing};

use crate::algorithm::{AlgorithmState, CipherKind, CipherOps, OptionValue};
use crate::error::{CipherError, Result};

const IPAD: u8 = 0x36;
const OPAD: u8 = 0x5C;

/// HMAC state: the selected digest and the derived pads
#[derive(Default)]
pub struct HmacState {
    hash: Option<&'static str>,
    inner: Option<Box<AlgorithmState>>,
    ipad: Zeroizing<Vec<u8>>,
    opad: Zeroizing<Vec<u8>>,
}

impl HmacState {
    /// No digest selected and no key
    pub fn new() -> Self {
        Self::default()
    }

    /// Select the inner digest by name, discarding any key
    pub fn select_hash(&mut self, name: &str) -> Result<()> {
        let (canonical, kind) = CipherKind::builtins()
            .into_iter()
            .find(|(builtin, kind)| builtin.eq_ignore_ascii_case(name) && kind.is_plain_digest())
            .ok_or_else(|| CipherError::InvalidOptionValue {
                option: "hash".to_string(),
                reason: format!("{name} is not a supported digest"),
            })?;

        self.clear_key();
        self.hash = Some(canonical);
        self.inner = Some(Box::new(kind.instantiate()));
        Ok(())
    }

    /// Name of the selected digest
    pub fn hash_name(&self) -> Option<&'static str> {
        self.hash
    }

    fn clear_key(&mut self) {
        // Vec zeroize also truncates, so an empty ipad means "no key"
        self.ipad.zeroize();
        self.opad.zeroize();
    }

    fn hasher(&mut self) -> Result<&mut AlgorithmState> {
        self.inner
            .as_deref_mut()
            .ok_or(CipherError::MissingRequiredParameter("hash"))
    }

    fn keyed_hasher(&mut self) -> Result<&mut AlgorithmState> {
        if self.ipad.is_empty() {
            return Err(CipherError::MissingRequiredParameter("key"));
        }
        self.hasher()
    }

    fn install_key(&mut self, key: &[u8]) -> Result<()> {
        let hasher = self.hasher()?;
        let block = hasher.get_block_size()?;

        let mut padded = Zeroizing::new(vec![0u8; block]);
        if key.len() > block {
            hasher.reset()?;
            hasher.append(key)?;
            hasher.digest(&mut padded)?;
        } else {
            padded[..key.len()].copy_from_slice(key);
        }

        let ipad: Vec<u8> = padded.iter().map(|b| b ^ IPAD).collect();
        let opad: Vec<u8> = padded.iter().map(|b| b ^ OPAD).collect();

        hasher.reset()?;
        hasher.append(&ipad)?;

        self.ipad = Zeroizing::new(ipad);
        self.opad = Zeroizing::new(opad);
        Ok(())
    }
}

impl CipherOps for HmacState {
    fn name(&self) -> &str {
        "hmac"
    }

    fn set_option(&mut self, option: &str, value: OptionValue) -> Result<()> {
        match option {
            "hash" => self.select_hash(value.as_text(option)?),
            _ => Err(CipherError::unknown_option("hmac", option)),
        }
    }

    fn get_option(&self, option: &str) -> Result<OptionValue> {
        match option {
            "hash" => self
                .hash
                .map(|name| OptionValue::Text(name.to_string()))
                .ok_or(CipherError::MissingRequiredParameter("hash")),
            _ => Err(CipherError::unknown_option("hmac", option)),
        }
    }

    fn reset(&mut self) -> Result<()> {
        self.clear_key();
        if let Some(inner) = self.inner.as_deref_mut() {
            inner.reset()?;
        }
        Ok(())
    }

    fn append(&mut self, data: &[u8]) -> Result<()> {
        self.keyed_hasher()?.append(data)
    }

    fn digest_size(&self) -> Result<usize> {
        self.inner
            .as_deref()
            .ok_or(CipherError::MissingRequiredParameter("hash"))?
            .digest_size()
    }

    fn digest(&mut self, out: &mut [u8]) -> Result<usize> {
        let size = self.digest_size()?;
        if out.len() < size {
            return Err(CipherError::BufferTooSmall {
                required: size,
                actual: out.len(),
            });
        }

        let ipad = self.ipad.clone();
        let opad = self.opad.clone();
        let hasher = self.keyed_hasher()?;

        let mut inner_digest = Zeroizing::new(vec![0u8; size]);
        hasher.digest(&mut inner_digest)?;

        hasher.reset()?;
        hasher.append(&opad)?;
        hasher.append(&inner_digest)?;
        let written = hasher.digest(out)?;

        hasher.reset()?;
        hasher.append(&ipad)?;
        Ok(written)
    }

    fn set_key(&mut self, key: &[u8]) -> Result<()> {
        self.install_key(key)
    }

    fn get_block_size(&self) -> Result<usize> {
        self.inner
            .as_deref()
            .ok_or(CipherError::MissingRequiredParameter("hash"))?
            .get_block_size()
    }

    fn set_key_with_len(&mut self, key: &[u8], len: usize) -> Result<()> {
        if len > key.len() {
            return Err(CipherError::InvalidKeyLength {
                expected: len,
                actual: key.len(),
            });
        }
        self.install_key(&key[..len])
    }

    fn wipe(&mut self) {
        self.clear_key();
        if let Some(inner) = self.inner.as_deref_mut() {
            inner.wipe();
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    fn mac(hash: &str, key: &[u8], data: &[u8]) -> String {
        let mut state = HmacState::new();
        state
            .set_option("hash", OptionValue::Text(hash.to_string()))
            .unwrap();
        state.set_key(key).unwrap();
        state.append(data).unwrap();
        let mut out = vec![0u8; state.digest_size().unwrap()];
        state.digest(&mut out).unwrap();
        hex::encode(out)
    }

    #[test]
    fn test_rfc2202_md5() {
        assert_eq!(
            mac("md5", &[0x0b; 16], b"Hi There"),
            "9294727a3638bb1c13f48ef8158bfc9d"
        );
    }

    #[test]
    fn test_rfc2202_sha1() {
        assert_eq!(
            mac("sha1", &[0x0b; 20], b"Hi There"),
            "b617318655057264e28bc0b6fb378c8ef146be00"
        );
    }

    #[test]
    fn test_rfc4231_sha256() {
        assert_eq!(
            mac("SHA256", b"Jefe", b"what do ya want for nothing?"),
            "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843"
        );
    }

    #[test]
    fn test_long_key_is_hashed_first() {
        assert_eq!(
            mac(
                "sha256",
                &[0xaa; 131],
                b"Test Using Larger Than Block-Size Key - Hash Key First"
            ),
            "60e431591ee0b67f0d8a26aacbf5b77f8e0bc6213728c5140546040f0ee37f54"
        );
    }

    #[test]
    fn test_digest_rearms_with_same_key() {
        let mut state = HmacState::new();
        state.select_hash("sha256").unwrap();
        state.set_key(&[0x0b; 20]).unwrap();

        let mut first = [0u8; 32];
        state.append(b"Hi There").unwrap();
        state.digest(&mut first).unwrap();

        let mut second = [0u8; 32];
        state.append(b"Hi There").unwrap();
        state.digest(&mut second).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_key_requires_hash() {
        let mut state = HmacState::new();
        assert_eq!(
            state.set_key(b"key"),
            Err(CipherError::MissingRequiredParameter("hash"))
        );
        assert!(state.get_block_size().is_err());
    }

    #[test]
    fn test_append_requires_key() {
        let mut state = HmacState::new();
        state.select_hash("md5").unwrap();
        assert_eq!(
            state.append(b"data"),
            Err(CipherError::MissingRequiredParameter("key"))
        );
    }

    #[test]
    fn test_rejects_non_digest_hash() {
        let mut state = HmacState::new();
        assert!(state.select_hash("des").is_err());
        assert!(state.select_hash("hmac").is_err());
        assert!(state.hash_name().is_none());
    }

    #[test]
    fn test_set_key_with_len_truncates() {
        let mut full = HmacState::new();
        full.select_hash("md5").unwrap();
        full.set_key(b"Jefe").unwrap();

        let mut truncated = HmacState::new();
        truncated.select_hash("md5").unwrap();
        truncated.set_key_with_len(b"Jefe and more", 4).unwrap();

        let mut a = [0u8; 16];
        let mut b = [0u8; 16];
        full.append(b"msg").unwrap();
        truncated.append(b"msg").unwrap();
        full.digest(&mut a).unwrap();
        truncated.digest(&mut b).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_block_size_follows_hash() {
        let mut state = HmacState::new();
        state.select_hash("sha1").unwrap();
        assert_eq!(state.get_block_size().unwrap(), 64);
        assert_eq!(state.digest_size().unwrap(), 20);
        assert_eq!(
            state.get_option("hash").unwrap(),
            OptionValue::Text("sha1".into())
        );
    }
}
