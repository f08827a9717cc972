//! DES block cipher (FIPS 46-2)
//!
//! Subkeys are generated once per key. Encryption runs 16 Feistel rounds
//! over two 32-bit halves, using S-box tables that already fold in the
//! primitive function P. Decryption uses the same rounds with the subkey
//! pairs read in reverse order.
//!
//! Inputs that are not a multiple of the block size are zero-padded; the
//! padded block is processed and the full padded length is returned.

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::algorithm::CipherOps;
use crate::error::{CipherError, Result};

/// DES block size in bytes
pub const DES_BLOCK_SIZE: usize = 8;

/// DES key size in bytes (parity bits are ignored)
pub const DES_KEY_SIZE: usize = 8;

const SBOX1: [u32; 64] = [
    0x00808200, 0x00000000, 0x00008000, 0x00808202,
    0x00808002, 0x00008202, 0x00000002, 0x00008000,
    0x00000200, 0x00808200, 0x00808202, 0x00000200,
    0x00800202, 0x00808002, 0x00800000, 0x00000002,
    0x00000202, 0x00800200, 0x00800200, 0x00008200,
    0x00008200, 0x00808000, 0x00808000, 0x00800202,
    0x00008002, 0x00800002, 0x00800002, 0x00008002,
    0x00000000, 0x00000202, 0x00008202, 0x00800000,
    0x00008000, 0x00808202, 0x00000002, 0x00808000,
    0x00808200, 0x00800000, 0x00800000, 0x00000200,
    0x00808002, 0x00008000, 0x00008200, 0x00800002,
    0x00000200, 0x00000002, 0x00800202, 0x00008202,
    0x00808202, 0x00008002, 0x00808000, 0x00800202,
    0x00800002, 0x00000202, 0x00008202, 0x00808200,
    0x00000202, 0x00800200, 0x00800200, 0x00000000,
    0x00008002, 0x00008200, 0x00000000, 0x00808002,
];

const SBOX2: [u32; 64] = [
    0x40084010, 0x40004000, 0x00004000, 0x00084010,
    0x00080000, 0x00000010, 0x40080010, 0x40004010,
    0x40000010, 0x40084010, 0x40084000, 0x40000000,
    0x40004000, 0x00080000, 0x00000010, 0x40080010,
    0x00084000, 0x00080010, 0x40004010, 0x00000000,
    0x40000000, 0x00004000, 0x00084010, 0x40080000,
    0x00080010, 0x40000010, 0x00000000, 0x00084000,
    0x00004010, 0x40084000, 0x40080000, 0x00004010,
    0x00000000, 0x00084010, 0x40080010, 0x00080000,
    0x40004010, 0x40080000, 0x40084000, 0x00004000,
    0x40080000, 0x40004000, 0x00000010, 0x40084010,
    0x00084010, 0x00000010, 0x00004000, 0x40000000,
    0x00004010, 0x40084000, 0x00080000, 0x40000010,
    0x00080010, 0x40004010, 0x40000010, 0x00080010,
    0x00084000, 0x00000000, 0x40004000, 0x00004010,
    0x40000000, 0x40080010, 0x40084010, 0x00084000,
];

const SBOX3: [u32; 64] = [
    0x00000104, 0x04010100, 0x00000000, 0x04010004,
    0x04000100, 0x00000000, 0x00010104, 0x04000100,
    0x00010004, 0x04000004, 0x04000004, 0x00010000,
    0x04010104, 0x00010004, 0x04010000, 0x00000104,
    0x04000000, 0x00000004, 0x04010100, 0x00000100,
    0x00010100, 0x04010000, 0x04010004, 0x00010104,
    0x04000104, 0x00010100, 0x00010000, 0x04000104,
    0x00000004, 0x04010104, 0x00000100, 0x04000000,
    0x04010100, 0x04000000, 0x00010004, 0x00000104,
    0x00010000, 0x04010100, 0x04000100, 0x00000000,
    0x00000100, 0x00010004, 0x04010104, 0x04000100,
    0x04000004, 0x00000100, 0x00000000, 0x04010004,
    0x04000104, 0x00010000, 0x04000000, 0x04010104,
    0x00000004, 0x00010104, 0x00010100, 0x04000004,
    0x04010000, 0x04000104, 0x00000104, 0x04010000,
    0x00010104, 0x00000004, 0x04010004, 0x00010100,
];

const SBOX4: [u32; 64] = [
    0x80401000, 0x80001040, 0x80001040, 0x00000040,
    0x00401040, 0x80400040, 0x80400000, 0x80001000,
    0x00000000, 0x00401000, 0x00401000, 0x80401040,
    0x80000040, 0x00000000, 0x00400040, 0x80400000,
    0x80000000, 0x00001000, 0x00400000, 0x80401000,
    0x00000040, 0x00400000, 0x80001000, 0x00001040,
    0x80400040, 0x80000000, 0x00001040, 0x00400040,
    0x00001000, 0x00401040, 0x80401040, 0x80000040,
    0x00400040, 0x80400000, 0x00401000, 0x80401040,
    0x80000040, 0x00000000, 0x00000000, 0x00401000,
    0x00001040, 0x00400040, 0x80400040, 0x80000000,
    0x80401000, 0x80001040, 0x80001040, 0x00000040,
    0x80401040, 0x80000040, 0x80000000, 0x00001000,
    0x80400000, 0x80001000, 0x00401040, 0x80400040,
    0x80001000, 0x00001040, 0x00400000, 0x80401000,
    0x00000040, 0x00400000, 0x00001000, 0x00401040,
];

const SBOX5: [u32; 64] = [
    0x00000080, 0x01040080, 0x01040000, 0x21000080,
    0x00040000, 0x00000080, 0x20000000, 0x01040000,
    0x20040080, 0x00040000, 0x01000080, 0x20040080,
    0x21000080, 0x21040000, 0x00040080, 0x20000000,
    0x01000000, 0x20040000, 0x20040000, 0x00000000,
    0x20000080, 0x21040080, 0x21040080, 0x01000080,
    0x21040000, 0x20000080, 0x00000000, 0x21000000,
    0x01040080, 0x01000000, 0x21000000, 0x00040080,
    0x00040000, 0x21000080, 0x00000080, 0x01000000,
    0x20000000, 0x01040000, 0x21000080, 0x20040080,
    0x01000080, 0x20000000, 0x21040000, 0x01040080,
    0x20040080, 0x00000080, 0x01000000, 0x21040000,
    0x21040080, 0x00040080, 0x21000000, 0x21040080,
    0x01040000, 0x00000000, 0x20040000, 0x21000000,
    0x00040080, 0x01000080, 0x20000080, 0x00040000,
    0x00000000, 0x20040000, 0x01040080, 0x20000080,
];

const SBOX6: [u32; 64] = [
    0x10000008, 0x10200000, 0x00002000, 0x10202008,
    0x10200000, 0x00000008, 0x10202008, 0x00200000,
    0x10002000, 0x00202008, 0x00200000, 0x10000008,
    0x00200008, 0x10002000, 0x10000000, 0x00002008,
    0x00000000, 0x00200008, 0x10002008, 0x00002000,
    0x00202000, 0x10002008, 0x00000008, 0x10200008,
    0x10200008, 0x00000000, 0x00202008, 0x10202000,
    0x00002008, 0x00202000, 0x10202000, 0x10000000,
    0x10002000, 0x00000008, 0x10200008, 0x00202000,
    0x10202008, 0x00200000, 0x00002008, 0x10000008,
    0x00200000, 0x10002000, 0x10000000, 0x00002008,
    0x10000008, 0x10202008, 0x00202000, 0x10200000,
    0x00202008, 0x10202000, 0x00000000, 0x10200008,
    0x00000008, 0x00002000, 0x10200000, 0x00202008,
    0x00002000, 0x00200008, 0x10002008, 0x00000000,
    0x10202000, 0x10000000, 0x00200008, 0x10002008,
];

const SBOX7: [u32; 64] = [
    0x00100000, 0x02100001, 0x02000401, 0x00000000,
    0x00000400, 0x02000401, 0x00100401, 0x02100400,
    0x02100401, 0x00100000, 0x00000000, 0x02000001,
    0x00000001, 0x02000000, 0x02100001, 0x00000401,
    0x02000400, 0x00100401, 0x00100001, 0x02000400,
    0x02000001, 0x02100000, 0x02100400, 0x00100001,
    0x02100000, 0x00000400, 0x00000401, 0x02100401,
    0x00100400, 0x00000001, 0x02000000, 0x00100400,
    0x02000000, 0x00100400, 0x00100000, 0x02000401,
    0x02000401, 0x02100001, 0x02100001, 0x00000001,
    0x00100001, 0x02000000, 0x02000400, 0x00100000,
    0x02100400, 0x00000401, 0x00100401, 0x02100400,
    0x00000401, 0x02000001, 0x02100401, 0x02100000,
    0x00100400, 0x00000000, 0x00000001, 0x02100401,
    0x00000000, 0x00100401, 0x02100000, 0x00000400,
    0x02000001, 0x02000400, 0x00000400, 0x00100001,
];

const SBOX8: [u32; 64] = [
    0x08000820, 0x00000800, 0x00020000, 0x08020820,
    0x08000000, 0x08000820, 0x00000020, 0x08000000,
    0x00020020, 0x08020000, 0x08020820, 0x00020800,
    0x08020800, 0x00020820, 0x00000800, 0x00000020,
    0x08020000, 0x08000020, 0x08000800, 0x00000820,
    0x00020800, 0x00020020, 0x08020020, 0x08020800,
    0x00000820, 0x00000000, 0x00000000, 0x08020020,
    0x08000020, 0x08000800, 0x00020820, 0x00020000,
    0x00020820, 0x00020000, 0x08020800, 0x00000800,
    0x00000020, 0x08020020, 0x00000800, 0x00020820,
    0x08000800, 0x00000020, 0x08000020, 0x08020000,
    0x08020020, 0x08000000, 0x00020000, 0x08000820,
    0x00000000, 0x08020820, 0x00020020, 0x08000020,
    0x08020000, 0x08000800, 0x08000820, 0x00000000,
    0x08020820, 0x00020800, 0x00020800, 0x00000820,
    0x00000820, 0x00020020, 0x08000000, 0x08020800,
];

// Permuted choice 1 lookup tables
const LEFTKEY_SWAP: [u32; 16] = [
    0x00000000, 0x00000001, 0x00000100, 0x00000101,
    0x00010000, 0x00010001, 0x00010100, 0x00010101,
    0x01000000, 0x01000001, 0x01000100, 0x01000101,
    0x01010000, 0x01010001, 0x01010100, 0x01010101,
];

const RIGHTKEY_SWAP: [u32; 16] = [
    0x00000000, 0x01000000, 0x00010000, 0x01010000,
    0x00000100, 0x01000100, 0x00010100, 0x01010100,
    0x00000001, 0x01000001, 0x00010001, 0x01010001,
    0x00000101, 0x01000101, 0x00010101, 0x01010101,
];

/// Left rotations per round of the key schedule
const ENCRYPT_ROTATE: [u32; 16] = [1, 1, 2, 2, 2, 2, 2, 2, 1, 2, 2, 2, 2, 2, 2, 1];

/// Swap the bits selected by `mask` between `a` (shifted by `offset`) and `b`
#[inline]
fn swap_bits(a: &mut u32, b: &mut u32, offset: u32, mask: u32) {
    let temp = ((*a >> offset) ^ *b) & mask;
    *b ^= temp;
    *a ^= temp << offset;
}

#[inline]
fn initial_permutation(left: &mut u32, right: &mut u32) {
    swap_bits(left, right, 4, 0x0f0f0f0f);
    swap_bits(left, right, 16, 0x0000ffff);
    swap_bits(right, left, 2, 0x33333333);
    swap_bits(right, left, 8, 0x00ff00ff);
    swap_bits(left, right, 1, 0x55555555);
}

#[inline]
fn final_permutation(left: &mut u32, right: &mut u32) {
    swap_bits(left, right, 1, 0x55555555);
    swap_bits(right, left, 8, 0x00ff00ff);
    swap_bits(right, left, 2, 0x33333333);
    swap_bits(left, right, 16, 0x0000ffff);
    swap_bits(left, right, 4, 0x0f0f0f0f);
}

/// One round: expansion, subkey mix, S-box substitution and P, without the swap
#[inline]
fn round(from: u32, to: &mut u32, k0: u32, k1: u32) {
    let work = from.rotate_left(1) ^ k0;
    *to ^= SBOX8[(work & 0x3f) as usize];
    *to ^= SBOX6[((work >> 8) & 0x3f) as usize];
    *to ^= SBOX4[((work >> 16) & 0x3f) as usize];
    *to ^= SBOX2[((work >> 24) & 0x3f) as usize];
    let work = from.rotate_right(3) ^ k1;
    *to ^= SBOX7[(work & 0x3f) as usize];
    *to ^= SBOX5[((work >> 8) & 0x3f) as usize];
    *to ^= SBOX3[((work >> 16) & 0x3f) as usize];
    *to ^= SBOX1[((work >> 24) & 0x3f) as usize];
}

#[inline]
fn read_halves(block: &[u8; 8]) -> (u32, u32) {
    (
        u32::from_be_bytes([block[0], block[1], block[2], block[3]]),
        u32::from_be_bytes([block[4], block[5], block[6], block[7]]),
    )
}

#[inline]
fn write_halves(left: u32, right: u32) -> [u8; 8] {
    let mut out = [0u8; 8];
    out[..4].copy_from_slice(&left.to_be_bytes());
    out[4..].copy_from_slice(&right.to_be_bytes());
    out
}

/// Compute the 32 encryption subkey words (16 even/odd pairs) for `key`
fn key_schedule(key: &[u8; 8]) -> [u32; 32] {
    let (mut left, mut right) = read_halves(key);

    swap_bits(&mut right, &mut left, 4, 0x0f0f0f0f);
    swap_bits(&mut right, &mut left, 0, 0x10101010);

    let lk = |shift: u32| LEFTKEY_SWAP[((left >> shift) & 0xf) as usize];
    let mut l = (lk(0) << 3)
        | (lk(8) << 2)
        | (lk(16) << 1)
        | lk(24)
        | (lk(5) << 7)
        | (lk(13) << 6)
        | (lk(21) << 5)
        | (lk(29) << 4);
    l &= 0x0fffffff;

    let rk = |shift: u32| RIGHTKEY_SWAP[((right >> shift) & 0xf) as usize];
    let mut r = (rk(1) << 3)
        | (rk(9) << 2)
        | (rk(17) << 1)
        | rk(25)
        | (rk(4) << 7)
        | (rk(12) << 6)
        | (rk(20) << 5)
        | (rk(28) << 4);
    r &= 0x0fffffff;

    let mut subkeys = [0u32; 32];
    for (round, pair) in subkeys.chunks_exact_mut(2).enumerate() {
        let rot = ENCRYPT_ROTATE[round];
        l = ((l << rot) | (l >> (28 - rot))) & 0x0fffffff;
        r = ((r << rot) | (r >> (28 - rot))) & 0x0fffffff;

        pair[0] = ((l << 4) & 0x24000000)
            | ((l << 28) & 0x10000000)
            | ((l << 14) & 0x08000000)
            | ((l << 18) & 0x02080000)
            | ((l << 6) & 0x01000000)
            | ((l << 9) & 0x00200000)
            | ((l >> 1) & 0x00100000)
            | ((l << 10) & 0x00040000)
            | ((l << 2) & 0x00020000)
            | ((l >> 10) & 0x00010000)
            | ((r >> 13) & 0x00002000)
            | ((r >> 4) & 0x00001000)
            | ((r << 6) & 0x00000800)
            | ((r >> 1) & 0x00000400)
            | ((r >> 14) & 0x00000200)
            | (r & 0x00000100)
            | ((r >> 5) & 0x00000020)
            | ((r >> 10) & 0x00000010)
            | ((r >> 3) & 0x00000008)
            | ((r >> 18) & 0x00000004)
            | ((r >> 26) & 0x00000002)
            | ((r >> 24) & 0x00000001);

        pair[1] = ((l << 15) & 0x20000000)
            | ((l << 17) & 0x10000000)
            | ((l << 10) & 0x08000000)
            | ((l << 22) & 0x04000000)
            | ((l >> 2) & 0x02000000)
            | ((l << 1) & 0x01000000)
            | ((l << 16) & 0x00200000)
            | ((l << 11) & 0x00100000)
            | ((l << 3) & 0x00080000)
            | ((l >> 6) & 0x00040000)
            | ((l << 15) & 0x00020000)
            | ((l >> 4) & 0x00010000)
            | ((r >> 2) & 0x00002000)
            | ((r << 8) & 0x00001000)
            | ((r >> 14) & 0x00000808)
            | ((r >> 9) & 0x00000400)
            | (r & 0x00000200)
            | ((r << 7) & 0x00000100)
            | ((r >> 7) & 0x00000020)
            | ((r >> 3) & 0x00000011)
            | ((r << 2) & 0x00000004)
            | ((r >> 21) & 0x00000002);
    }
    subkeys
}

/// Encryption and decryption subkeys derived from one 8-byte key
#[derive(Clone, Default, Zeroize, ZeroizeOnDrop)]
pub struct DesKeySchedule {
    encrypt: [u32; 32],
    decrypt: [u32; 32],
}

impl DesKeySchedule {
    /// Derive the schedule for `key`. Parity bits are ignored and weak keys
    /// are not rejected.
    pub fn new(key: &[u8; DES_KEY_SIZE]) -> Self {
        let encrypt = key_schedule(key);
        let mut decrypt = [0u32; 32];
        for i in (0..32).step_by(2) {
            decrypt[i] = encrypt[30 - i];
            decrypt[i + 1] = encrypt[31 - i];
        }
        Self { encrypt, decrypt }
    }

    /// Derive the schedule from a slice that must be exactly 8 bytes
    pub fn from_slice(key: &[u8]) -> Result<Self> {
        let key: &[u8; DES_KEY_SIZE] =
            key.try_into().map_err(|_| CipherError::InvalidKeyLength {
                expected: DES_KEY_SIZE,
                actual: key.len(),
            })?;
        Ok(Self::new(key))
    }

    /// Encrypt one block
    pub fn encrypt_block(&self, block: &[u8; 8]) -> [u8; 8] {
        crypt_block(&self.encrypt, block)
    }

    /// Decrypt one block
    pub fn decrypt_block(&self, block: &[u8; 8]) -> [u8; 8] {
        crypt_block(&self.decrypt, block)
    }
}

fn crypt_block(keys: &[u32; 32], block: &[u8; 8]) -> [u8; 8] {
    let (mut left, mut right) = read_halves(block);
    initial_permutation(&mut left, &mut right);

    for pair in keys.chunks_exact(4) {
        round(right, &mut left, pair[0], pair[1]);
        round(left, &mut right, pair[2], pair[3]);
    }

    final_permutation(&mut right, &mut left);
    write_halves(right, left)
}

/// Length of the output for an input of `len` bytes
pub const fn padded_len(len: usize) -> usize {
    len.div_ceil(DES_BLOCK_SIZE) * DES_BLOCK_SIZE
}

/// Run `f` over every 8-byte block of `input`, zero-padding the final
/// partial block. The output is always a whole number of blocks.
pub(crate) fn map_blocks(input: &[u8], mut f: impl FnMut([u8; 8]) -> [u8; 8]) -> Vec<u8> {
    let mut output = Vec::with_capacity(padded_len(input.len()));
    let mut chunks = input.chunks_exact(DES_BLOCK_SIZE);
    for chunk in &mut chunks {
        let mut block = [0u8; DES_BLOCK_SIZE];
        block.copy_from_slice(chunk);
        output.extend_from_slice(&f(block));
    }

    let tail = chunks.remainder();
    if !tail.is_empty() {
        let mut block = [0u8; DES_BLOCK_SIZE];
        block[..tail.len()].copy_from_slice(tail);
        output.extend_from_slice(&f(block));
    }
    output
}

/// Single-DES context state in ECB mode
#[derive(Clone, Default, Zeroize, ZeroizeOnDrop)]
pub struct DesCipher {
    schedule: DesKeySchedule,
}

impl DesCipher {
    /// Create a cipher with an all-zero schedule; call `set_key` before use
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a cipher keyed with `key`
    pub fn with_key(key: &[u8]) -> Result<Self> {
        Ok(Self {
            schedule: DesKeySchedule::from_slice(key)?,
        })
    }

    /// Encrypt `input` block by block
    pub fn encrypt_ecb(&self, input: &[u8]) -> Vec<u8> {
        map_blocks(input, |block| self.schedule.encrypt_block(&block))
    }

    /// Decrypt `input` block by block
    pub fn decrypt_ecb(&self, input: &[u8]) -> Vec<u8> {
        map_blocks(input, |block| self.schedule.decrypt_block(&block))
    }
}

impl CipherOps for DesCipher {
    fn name(&self) -> &str {
        "des"
    }

    fn encrypt(&mut self, input: &[u8]) -> Result<Vec<u8>> {
        Ok(self.encrypt_ecb(input))
    }

    fn decrypt(&mut self, input: &[u8]) -> Result<Vec<u8>> {
        Ok(self.decrypt_ecb(input))
    }

    fn set_key(&mut self, key: &[u8]) -> Result<()> {
        self.schedule = DesKeySchedule::from_slice(key)?;
        Ok(())
    }

    fn get_key_size(&self) -> Result<usize> {
        Ok(DES_KEY_SIZE)
    }

    fn get_block_size(&self) -> Result<usize> {
        Ok(DES_BLOCK_SIZE)
    }

    fn wipe(&mut self) {
        self.zeroize();
    }
}
