//======================================================================
// src/rws.rs
// RWS: the portable wide Rijndael variant. A 64-byte block runs the
// table-driven round ladder over a sixteen-column state.
//======================================================================

use crate::error::CryptoError;
use crate::rijndael;
use crate::variant::{sealed::Sealed, WideVariant};

/// The 512-bit software Rijndael variant.
pub struct Rws;

impl Sealed for Rws {}

impl WideVariant for Rws {
    type Word = u32;

    const BLOCK_SIZE: usize = 64;
    const WORD_SIZE: usize = 4;
    const WORDS_PER_BLOCK: usize = 16;
    const COUNTER_BASE: u64 = 0;
    const ROUNDS_FIELD_SIZE: usize = 4;
    const STATE_THRESHOLD: usize = 95;
    const NAME: &'static str = "RWS";

    // Schedule bytes are read as big-endian column words.
    fn words_from_xof(raw: &[u8]) -> Vec<Self::Word> {
        raw.chunks_exact(Self::WORD_SIZE)
            .map(|word| u32::from_be_bytes(word.try_into().unwrap()))
            .collect()
    }

    fn words_to_wire(words: &[Self::Word]) -> Vec<u8> {
        let mut wire = Vec::with_capacity(words.len() * Self::WORD_SIZE);
        for word in words {
            wire.extend_from_slice(&word.to_le_bytes());
        }
        wire
    }

    fn words_from_wire(raw: &[u8]) -> Result<Vec<Self::Word>, CryptoError> {
        if raw.len() % Self::WORD_SIZE != 0 {
            return Err(CryptoError::InvalidKey);
        }
        Ok(raw
            .chunks_exact(Self::WORD_SIZE)
            .map(|word| u32::from_le_bytes(word.try_into().unwrap()))
            .collect())
    }

    fn transform_block(round_keys: &[Self::Word], input: &[u8], output: &mut [u8]) {
        let rounds = round_keys.len() / Self::WORDS_PER_BLOCK - 1;
        let mut state = [0u8; 64];
        state.copy_from_slice(&input[..64]);

        rijndael::key_addition(&mut state, round_keys, 0);

        // pre-load the s-box into L1 cache
        rijndael::prefetch_sbox();

        for i in 1..rounds {
            rijndael::sub_bytes(&mut state);
            rijndael::shift_rows_512(&mut state);
            rijndael::mix_columns(&mut state);
            rijndael::key_addition(&mut state, round_keys, i * Self::WORDS_PER_BLOCK);
        }

        rijndael::sub_bytes(&mut state);
        rijndael::shift_rows_512(&mut state);
        rijndael::key_addition(&mut state, round_keys, rounds * Self::WORDS_PER_BLOCK);

        output[..64].copy_from_slice(&state);
    }
}
