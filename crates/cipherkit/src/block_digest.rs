//! Byte-wise accumulator shared by the SHA-1 and SHA-256 engines
//!
//! Bytes are shifted one at a time into a big-endian message schedule; every
//! 64th byte hands the schedule to the algorithm's compression function. The
//! running bit count is kept as two 32-bit halves and, together with the
//! in-block byte counter, is readable and writable through the `sizeHi`,
//! `sizeLo` and `lenW` options.

use zeroize::Zeroize;

use crate::algorithm::OptionValue;
use crate::error::{CipherError, Result};

/// Block size of both SHA engines in bytes
pub(crate) const BLOCK_SIZE: usize = 64;

/// Compression over the chaining words; the first 16 schedule words hold the
/// current block and the rest are free for expansion
pub(crate) type Compress<const H: usize, const W: usize> = fn(&mut [u32; H], &mut [u32; W]);

/// Chaining state of `H` words over a schedule of `W` words
#[derive(Clone)]
pub(crate) struct BlockAccumulator<const H: usize, const W: usize> {
    h: [u32; H],
    w: [u32; W],
    len_w: u32,
    size_hi: u32,
    size_lo: u32,
    initial: [u32; H],
    compress: Compress<H, W>,
}

impl<const H: usize, const W: usize> BlockAccumulator<H, W> {
    pub(crate) fn new(initial: [u32; H], compress: Compress<H, W>) -> Self {
        Self {
            h: initial,
            w: [0; W],
            len_w: 0,
            size_hi: 0,
            size_lo: 0,
            initial,
            compress,
        }
    }

    /// Return to the initial constants, clearing the schedule and counters
    pub(crate) fn clear(&mut self) {
        self.h = self.initial;
        self.w = [0; W];
        self.len_w = 0;
        self.size_hi = 0;
        self.size_lo = 0;
    }

    pub(crate) fn update(&mut self, data: &[u8]) {
        for &byte in data {
            let word = &mut self.w[(self.len_w / 4) as usize];
            *word = (*word << 8) | u32::from(byte);

            self.len_w += 1;
            if self.len_w as usize % BLOCK_SIZE == 0 {
                (self.compress)(&mut self.h, &mut self.w);
                self.len_w = 0;
            }

            self.size_lo = self.size_lo.wrapping_add(8);
            if self.size_lo < 8 {
                self.size_hi = self.size_hi.wrapping_add(1);
            }
        }
    }

    /// Pad, serialize the first `N / 4` chaining words big-endian and reset
    pub(crate) fn finalize<const N: usize>(&mut self) -> [u8; N] {
        let mut length = [0u8; 8];
        length[..4].copy_from_slice(&self.size_hi.to_be_bytes());
        length[4..].copy_from_slice(&self.size_lo.to_be_bytes());

        self.update(&[0x80]);
        while self.len_w != 56 {
            self.update(&[0x00]);
        }
        self.update(&length);

        let mut out = [0u8; N];
        for (chunk, word) in out.chunks_exact_mut(4).zip(self.h) {
            chunk.copy_from_slice(&word.to_be_bytes());
        }

        self.clear();
        out
    }

    /// Finalize into `out`, which must hold at least `N` bytes
    pub(crate) fn finalize_into<const N: usize>(&mut self, out: &mut [u8]) -> Result<usize> {
        if out.len() < N {
            return Err(CipherError::BufferTooSmall {
                required: N,
                actual: out.len(),
            });
        }
        out[..N].copy_from_slice(&self.finalize::<N>());
        Ok(N)
    }

    pub(crate) fn set_counter(
        &mut self,
        cipher: &str,
        option: &str,
        value: &OptionValue,
    ) -> Result<()> {
        let slot = match option {
            "sizeHi" => &mut self.size_hi,
            "sizeLo" => &mut self.size_lo,
            "lenW" => &mut self.len_w,
            _ => return Err(CipherError::unknown_option(cipher, option)),
        };
        *slot = counter_option(option, value)?;
        Ok(())
    }

    pub(crate) fn counter(&self, cipher: &str, option: &str) -> Result<OptionValue> {
        let value = match option {
            "sizeHi" => self.size_hi,
            "sizeLo" => self.size_lo,
            "lenW" => self.len_w,
            _ => return Err(CipherError::unknown_option(cipher, option)),
        };
        Ok(OptionValue::Int(u64::from(value)))
    }
}

impl<const H: usize, const W: usize> Zeroize for BlockAccumulator<H, W> {
    fn zeroize(&mut self) {
        self.h.zeroize();
        self.w.zeroize();
        self.len_w.zeroize();
        self.size_hi.zeroize();
        self.size_lo.zeroize();
    }
}

/// Validate a `sizeHi`, `sizeLo` or `lenW` option value
fn counter_option(option: &str, value: &OptionValue) -> Result<u32> {
    let raw = value.as_int(option)?;
    let invalid = |reason: String| CipherError::InvalidOptionValue {
        option: option.to_string(),
        reason,
    };
    let counter =
        u32::try_from(raw).map_err(|_| invalid(format!("{raw} does not fit in 32 bits")))?;
    if option == "lenW" && counter >= 64 {
        return Err(invalid(format!("{counter} is past the end of a 64-byte block")));
    }
    Ok(counter)
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    // Sums the block words into h[0] so the compression count is observable
    fn summing(h: &mut [u32; 1], w: &mut [u32; 16]) {
        h[0] = w.iter().fold(h[0], |acc, word| acc.wrapping_add(*word));
    }

    fn accumulator() -> BlockAccumulator<1, 16> {
        BlockAccumulator::new([7], summing)
    }

    #[test]
    fn test_compresses_every_64_bytes() {
        let mut acc = accumulator();
        acc.update(&[0u8; 63]);
        assert_eq!(acc.counter("t", "lenW").unwrap(), OptionValue::Int(63));
        acc.update(&[1]);
        assert_eq!(acc.counter("t", "lenW").unwrap(), OptionValue::Int(0));
        assert_eq!(acc.h, [8]);
    }

    #[test]
    fn test_finalize_writes_big_endian_words_and_resets() {
        let mut acc = accumulator();
        let out: [u8; 4] = acc.finalize();
        // 0x80 padding byte, then the zero bit count, in one block
        assert_eq!(u32::from_be_bytes(out), 7 + 0x8000_0000);
        assert_eq!(acc.h, [7]);
        assert_eq!(acc.counter("t", "sizeLo").unwrap(), OptionValue::Int(0));
    }

    #[test]
    fn test_finalize_into_rejects_short_buffer() {
        let mut acc = accumulator();
        acc.update(b"abc");
        let mut out = [0u8; 3];
        assert_eq!(
            acc.finalize_into::<4>(&mut out),
            Err(CipherError::BufferTooSmall {
                required: 4,
                actual: 3
            })
        );
        assert_eq!(acc.counter("t", "lenW").unwrap(), OptionValue::Int(3));
    }

    #[test]
    fn test_counter_validation() {
        let mut acc = accumulator();
        assert!(acc.set_counter("t", "lenW", &OptionValue::Int(64)).is_err());
        assert!(
            acc.set_counter("t", "sizeHi", &OptionValue::Int(u64::from(u32::MAX) + 1))
                .is_err()
        );
        assert!(
            acc.set_counter("t", "sizeLo", &OptionValue::Text("8".into()))
                .is_err()
        );
        assert_eq!(
            acc.set_counter("t", "nope", &OptionValue::Int(1)),
            Err(CipherError::UnknownOption {
                cipher: "t".into(),
                option: "nope".into()
            })
        );
    }

    #[test]
    fn test_zeroize_keeps_constants() {
        let mut acc = accumulator();
        acc.update(b"secret");
        acc.zeroize();
        assert_eq!(acc.h, [0]);
        assert!(acc.w.iter().all(|w| *w == 0));
        acc.clear();
        assert_eq!(acc.h, [7]);
    }
}
