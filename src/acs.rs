//======================================================================
// src/acs.rs
// ACS: the AES-NI half-block variant. A 32-byte block is processed as two
// 128-bit halves mixed by a byte blend and shuffle, then pushed through
// one AES round per half with consecutive round-key lanes.
//======================================================================

use crate::error::CryptoError;
use crate::rijndael;
use crate::simd;
use crate::variant::{sealed::Sealed, WideVariant};
use cfg_if::cfg_if;

/// Byte-select mask for the half-block mix; a set high bit takes the byte
/// from the opposite half.
const BLEND_MASK: [u8; 16] = [
    0x00, 0x80, 0x80, 0x80, //
    0x00, 0x00, 0x80, 0x80, //
    0x00, 0x00, 0x80, 0x80, //
    0x00, 0x00, 0x00, 0x80,
];

/// Byte permutation applied to both halves after the blend.
const SHIFT_MASK: [u8; 16] = [0, 1, 6, 7, 4, 5, 10, 11, 8, 9, 14, 15, 12, 13, 2, 3];

/// The AES-NI half-block cipher variant. Dispatches to the hardware AES
/// path when the CPU exposes it, with a byte-identical software fallback.
pub struct Acs;

impl Sealed for Acs {}

impl WideVariant for Acs {
    type Word = [u8; 16];

    const BLOCK_SIZE: usize = 32;
    const WORD_SIZE: usize = 16;
    const WORDS_PER_BLOCK: usize = 2;
    const COUNTER_BASE: u64 = 1;
    const ROUNDS_FIELD_SIZE: usize = 2;
    const STATE_THRESHOLD: usize = 61;
    const NAME: &'static str = "ACS";

    fn words_from_xof(raw: &[u8]) -> Vec<Self::Word> {
        raw.chunks_exact(Self::WORD_SIZE)
            .map(|lane| lane.try_into().unwrap())
            .collect()
    }

    fn words_to_wire(words: &[Self::Word]) -> Vec<u8> {
        let mut wire = Vec::with_capacity(words.len() * Self::WORD_SIZE);
        for lane in words {
            wire.extend_from_slice(lane);
        }
        wire
    }

    fn words_from_wire(raw: &[u8]) -> Result<Vec<Self::Word>, CryptoError> {
        if raw.len() % Self::WORD_SIZE != 0 {
            return Err(CryptoError::InvalidKey);
        }
        Ok(Self::words_from_xof(raw))
    }

    fn transform_block(round_keys: &[Self::Word], input: &[u8], output: &mut [u8]) {
        cfg_if! {
            if #[cfg(any(target_arch = "x86", target_arch = "x86_64"))] {
                if simd::has_aesni() {
                    unsafe { ni::transform_block(round_keys, input, output) };
                    return;
                }
            }
        }
        soft_transform_block(round_keys, input, output);
    }
}

/// Blend the two halves against each other, then permute both.
#[inline]
fn mix_half_blocks(blk1: &[u8; 16], blk2: &[u8; 16]) -> ([u8; 16], [u8; 16]) {
    let mut mixed1 = [0u8; 16];
    let mut mixed2 = [0u8; 16];
    for i in 0..16 {
        if BLEND_MASK[i] & 0x80 != 0 {
            mixed1[i] = blk2[i];
            mixed2[i] = blk1[i];
        } else {
            mixed1[i] = blk1[i];
            mixed2[i] = blk2[i];
        }
    }
    let mut out1 = [0u8; 16];
    let mut out2 = [0u8; 16];
    for i in 0..16 {
        out1[i] = mixed1[SHIFT_MASK[i] as usize];
        out2[i] = mixed2[SHIFT_MASK[i] as usize];
    }
    (out1, out2)
}

#[inline]
fn xor_lane(block: &mut [u8; 16], lane: &[u8; 16]) {
    for (b, k) in block.iter_mut().zip(lane.iter()) {
        *b ^= k;
    }
}

/// Portable rendition of the half-block round walk. Key lanes 0 and 1
/// pre-whiten the halves; the final pair feeds the last-round transform.
pub(crate) fn soft_transform_block(round_keys: &[[u8; 16]], input: &[u8], output: &mut [u8]) {
    let mut blk1: [u8; 16] = input[..16].try_into().unwrap();
    let mut blk2: [u8; 16] = input[16..32].try_into().unwrap();

    let round_count = round_keys.len() - 3;
    let mut kctr = 0;
    xor_lane(&mut blk1, &round_keys[kctr]);
    kctr += 1;
    xor_lane(&mut blk2, &round_keys[kctr]);

    while kctr != round_count {
        let (mixed1, mixed2) = mix_half_blocks(&blk1, &blk2);
        blk1 = mixed1;
        blk2 = mixed2;
        kctr += 1;
        rijndael::aes_enc_round(&mut blk1, &round_keys[kctr]);
        kctr += 1;
        rijndael::aes_enc_round(&mut blk2, &round_keys[kctr]);
    }

    let (mixed1, mixed2) = mix_half_blocks(&blk1, &blk2);
    blk1 = mixed1;
    blk2 = mixed2;
    kctr += 1;
    rijndael::aes_enc_last(&mut blk1, &round_keys[kctr]);
    kctr += 1;
    rijndael::aes_enc_last(&mut blk2, &round_keys[kctr]);

    output[..16].copy_from_slice(&blk1);
    output[16..32].copy_from_slice(&blk2);
}

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
pub(crate) mod ni {
    use super::{BLEND_MASK, SHIFT_MASK};
    #[cfg(target_arch = "x86")]
    use core::arch::x86::*;
    #[cfg(target_arch = "x86_64")]
    use core::arch::x86_64::*;

    #[inline(always)]
    unsafe fn load_lane(lane: &[u8; 16]) -> __m128i {
        _mm_loadu_si128(lane.as_ptr().cast())
    }

    /// Hardware half-block transform.
    ///
    /// # Safety
    /// The caller must have verified AES, SSSE3, and SSE4.1 support.
    #[target_feature(enable = "aes", enable = "ssse3", enable = "sse4.1")]
    pub(crate) unsafe fn transform_block(round_keys: &[[u8; 16]], input: &[u8], output: &mut [u8]) {
        let blend = load_lane(&BLEND_MASK);
        let shift = load_lane(&SHIFT_MASK);

        let mut blk1 = _mm_loadu_si128(input.as_ptr().cast());
        let mut blk2 = _mm_loadu_si128(input.as_ptr().add(16).cast());

        let round_count = round_keys.len() - 3;
        let mut kctr = 0;
        blk1 = _mm_xor_si128(blk1, load_lane(&round_keys[kctr]));
        kctr += 1;
        blk2 = _mm_xor_si128(blk2, load_lane(&round_keys[kctr]));

        while kctr != round_count {
            let tmp1 = _mm_shuffle_epi8(_mm_blendv_epi8(blk1, blk2, blend), shift);
            let tmp2 = _mm_shuffle_epi8(_mm_blendv_epi8(blk2, blk1, blend), shift);
            kctr += 1;
            blk1 = _mm_aesenc_si128(tmp1, load_lane(&round_keys[kctr]));
            kctr += 1;
            blk2 = _mm_aesenc_si128(tmp2, load_lane(&round_keys[kctr]));
        }

        let tmp1 = _mm_shuffle_epi8(_mm_blendv_epi8(blk1, blk2, blend), shift);
        let tmp2 = _mm_shuffle_epi8(_mm_blendv_epi8(blk2, blk1, blend), shift);
        kctr += 1;
        blk1 = _mm_aesenclast_si128(tmp1, load_lane(&round_keys[kctr]));
        kctr += 1;
        blk2 = _mm_aesenclast_si128(tmp2, load_lane(&round_keys[kctr]));

        _mm_storeu_si128(output.as_mut_ptr().cast(), blk1);
        _mm_storeu_si128(output.as_mut_ptr().add(16).cast(), blk2);
    }
}
