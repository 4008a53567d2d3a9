//======================================================================
// src/rijndael.rs
// Shared Rijndael material: the S-box, the row/column layers for the
// 128-bit and 512-bit state widths, and round-key addition.
//======================================================================
//
// The state is column-major: byte `4 * c + r` holds row `r` of column `c`.
// The 512-bit width spreads the four rows over sixteen columns.

/// The AES substitution box.
pub(crate) const SBOX: [u8; 256] = [
    0x63, 0x7C, 0x77, 0x7B, 0xF2, 0x6B, 0x6F, 0xC5, 0x30, 0x01, 0x67, 0x2B, 0xFE, 0xD7, 0xAB, 0x76,
    0xCA, 0x82, 0xC9, 0x7D, 0xFA, 0x59, 0x47, 0xF0, 0xAD, 0xD4, 0xA2, 0xAF, 0x9C, 0xA4, 0x72, 0xC0,
    0xB7, 0xFD, 0x93, 0x26, 0x36, 0x3F, 0xF7, 0xCC, 0x34, 0xA5, 0xE5, 0xF1, 0x71, 0xD8, 0x31, 0x15,
    0x04, 0xC7, 0x23, 0xC3, 0x18, 0x96, 0x05, 0x9A, 0x07, 0x12, 0x80, 0xE2, 0xEB, 0x27, 0xB2, 0x75,
    0x09, 0x83, 0x2C, 0x1A, 0x1B, 0x6E, 0x5A, 0xA0, 0x52, 0x3B, 0xD6, 0xB3, 0x29, 0xE3, 0x2F, 0x84,
    0x53, 0xD1, 0x00, 0xED, 0x20, 0xFC, 0xB1, 0x5B, 0x6A, 0xCB, 0xBE, 0x39, 0x4A, 0x4C, 0x58, 0xCF,
    0xD0, 0xEF, 0xAA, 0xFB, 0x43, 0x4D, 0x33, 0x85, 0x45, 0xF9, 0x02, 0x7F, 0x50, 0x3C, 0x9F, 0xA8,
    0x51, 0xA3, 0x40, 0x8F, 0x92, 0x9D, 0x38, 0xF5, 0xBC, 0xB6, 0xDA, 0x21, 0x10, 0xFF, 0xF3, 0xD2,
    0xCD, 0x0C, 0x13, 0xEC, 0x5F, 0x97, 0x44, 0x17, 0xC4, 0xA7, 0x7E, 0x3D, 0x64, 0x5D, 0x19, 0x73,
    0x60, 0x81, 0x4F, 0xDC, 0x22, 0x2A, 0x90, 0x88, 0x46, 0xEE, 0xB8, 0x14, 0xDE, 0x5E, 0x0B, 0xDB,
    0xE0, 0x32, 0x3A, 0x0A, 0x49, 0x06, 0x24, 0x5C, 0xC2, 0xD3, 0xAC, 0x62, 0x91, 0x95, 0xE4, 0x79,
    0xE7, 0xC8, 0x37, 0x6D, 0x8D, 0xD5, 0x4E, 0xA9, 0x6C, 0x56, 0xF4, 0xEA, 0x65, 0x7A, 0xAE, 0x08,
    0xBA, 0x78, 0x25, 0x2E, 0x1C, 0xA6, 0xB4, 0xC6, 0xE8, 0xDD, 0x74, 0x1F, 0x4B, 0xBD, 0x8B, 0x8A,
    0x70, 0x3E, 0xB5, 0x66, 0x48, 0x03, 0xF6, 0x0E, 0x61, 0x35, 0x57, 0xB9, 0x86, 0xC1, 0x1D, 0x9E,
    0xE1, 0xF8, 0x98, 0x11, 0x69, 0xD9, 0x8E, 0x94, 0x9B, 0x1E, 0x87, 0xE9, 0xCE, 0x55, 0x28, 0xDF,
    0x8C, 0xA1, 0x89, 0x0D, 0xBF, 0xE6, 0x42, 0x68, 0x41, 0x99, 0x2D, 0x0F, 0xB0, 0x54, 0xBB, 0x16,
];

/// Row rotation offsets for the 512-bit state: the 256-bit Rijndael
/// offsets scaled to the doubled column count.
const SHIFT_OFFSETS_512: [usize; 4] = [0, 2, 6, 8];

#[inline(always)]
fn xtime(value: u8) -> u8 {
    (value << 1) ^ (((value >> 7) & 1) * 0x1B)
}

/// Applies the S-box to every state byte.
#[inline]
pub(crate) fn sub_bytes(state: &mut [u8]) {
    for byte in state.iter_mut() {
        *byte = SBOX[*byte as usize];
    }
}

/// ShiftRows over a 16-byte (four column) state.
#[inline]
pub(crate) fn shift_rows_128(state: &mut [u8; 16]) {
    let tmp = *state;
    for r in 1..4 {
        for c in 0..4 {
            state[4 * c + r] = tmp[4 * ((c + r) % 4) + r];
        }
    }
}

/// ShiftRows over the 64-byte (sixteen column) state.
#[inline]
pub(crate) fn shift_rows_512(state: &mut [u8; 64]) {
    let tmp = *state;
    for r in 1..4 {
        let offset = SHIFT_OFFSETS_512[r];
        for c in 0..16 {
            state[4 * c + r] = tmp[4 * ((c + offset) % 16) + r];
        }
    }
}

/// The AES column mix applied to every 4-byte column of `state`.
#[inline]
pub(crate) fn mix_columns(state: &mut [u8]) {
    for column in state.chunks_exact_mut(4) {
        let a0 = column[0];
        let a1 = column[1];
        let a2 = column[2];
        let a3 = column[3];
        column[0] = xtime(a0) ^ xtime(a1) ^ a1 ^ a2 ^ a3;
        column[1] = a0 ^ xtime(a1) ^ xtime(a2) ^ a2 ^ a3;
        column[2] = a0 ^ a1 ^ xtime(a2) ^ xtime(a3) ^ a3;
        column[3] = xtime(a0) ^ a0 ^ a1 ^ a2 ^ xtime(a3);
    }
}

/// XORs big-endian round-key words into the state, one word per column.
#[inline]
pub(crate) fn key_addition(state: &mut [u8], round_keys: &[u32], offset: usize) {
    for (i, column) in state.chunks_exact_mut(4).enumerate() {
        let word = round_keys[offset + i];
        column[0] ^= (word >> 24) as u8;
        column[1] ^= (word >> 16) as u8;
        column[2] ^= (word >> 8) as u8;
        column[3] ^= word as u8;
    }
}

/// One full AES encryption round over a 16-byte half-block.
#[inline]
pub(crate) fn aes_enc_round(block: &mut [u8; 16], round_key: &[u8; 16]) {
    sub_bytes(block);
    shift_rows_128(block);
    mix_columns(block);
    for (b, k) in block.iter_mut().zip(round_key.iter()) {
        *b ^= k;
    }
}

/// The final AES round: MixColumns is omitted.
#[inline]
pub(crate) fn aes_enc_last(block: &mut [u8; 16], round_key: &[u8; 16]) {
    sub_bytes(block);
    shift_rows_128(block);
    for (b, k) in block.iter_mut().zip(round_key.iter()) {
        *b ^= k;
    }
}

/// Timing defence: touch the S-box so the table sits in L1 before the
/// table-driven rounds run.
#[inline]
pub(crate) fn prefetch_sbox() {
    for i in (0..SBOX.len()).step_by(64) {
        // volatile so the loads are not optimized away
        unsafe {
            core::ptr::read_volatile(&SBOX[i]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sbox_known_entries() {
        assert_eq!(SBOX[0x00], 0x63);
        assert_eq!(SBOX[0x53], 0xED);
        assert_eq!(SBOX[0xFF], 0x16);
    }

    #[test]
    fn sbox_is_a_permutation() {
        let mut seen = [false; 256];
        for &v in SBOX.iter() {
            seen[v as usize] = true;
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn shift_rows_128_leaves_row_zero() {
        let mut state: [u8; 16] = core::array::from_fn(|i| i as u8);
        shift_rows_128(&mut state);
        for c in 0..4 {
            assert_eq!(state[4 * c], (4 * c) as u8);
        }
        // row 1 rotates left by one column
        assert_eq!(state[1], 5);
        assert_eq!(state[13], 1);
    }

    #[test]
    fn shift_rows_512_rotates_by_scaled_offsets() {
        let mut state: [u8; 64] = core::array::from_fn(|i| i as u8);
        shift_rows_512(&mut state);
        for c in 0..16 {
            assert_eq!(state[4 * c], (4 * c) as u8, "row 0 must not move");
            assert_eq!(state[4 * c + 1], (4 * ((c + 2) % 16) + 1) as u8);
            assert_eq!(state[4 * c + 2], (4 * ((c + 6) % 16) + 2) as u8);
            assert_eq!(state[4 * c + 3], (4 * ((c + 8) % 16) + 3) as u8);
        }
    }

    #[test]
    fn mix_columns_fips_vector() {
        // FIPS-197 Appendix B, round 1 column 0
        let mut column = [0xD4, 0xBF, 0x5D, 0x30];
        mix_columns(&mut column);
        assert_eq!(column, [0x04, 0x66, 0x81, 0xE5]);
    }

    #[test]
    fn key_addition_is_involutive() {
        let mut state = [0x5Au8; 64];
        let original = state;
        let words: Vec<u32> = (0..16).map(|i| 0x01020304u32.wrapping_mul(i + 1)).collect();
        key_addition(&mut state, &words, 0);
        assert_ne!(state, original);
        key_addition(&mut state, &words, 0);
        assert_eq!(state, original);
    }
}
