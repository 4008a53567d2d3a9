//======================================================================
// src/variant.rs
// The trait binding each cipher variant's block geometry, round-key
// representation, and block transform.
//======================================================================

use crate::error::CryptoError;
use zeroize::Zeroize;

/// 256-bit key length in bytes.
pub const IK256_SIZE: usize = 32;
/// 512-bit key length in bytes.
pub const IK512_SIZE: usize = 64;
/// 1024-bit key length in bytes.
pub const IK1024_SIZE: usize = 128;

/// Transformation rounds for a 256-bit key.
pub(crate) const RK256_ROUNDS: usize = 22;
/// Transformation rounds for a 512-bit key.
pub(crate) const RK512_ROUNDS: usize = 30;
/// Transformation rounds for a 1024-bit key.
pub(crate) const RK1024_ROUNDS: usize = 38;

pub(crate) mod sealed {
    pub trait Sealed {}
}

/// A wide-block keystream permutation.
///
/// Implemented by [`Acs`](crate::Acs) and [`Rws`](crate::Rws); the generic
/// engine drives either through this interface. Round keys are opaque words
/// produced by the SHAKE key schedule; the variants never run a native
/// key expansion.
pub trait WideVariant: sealed::Sealed + Send + Sync + 'static {
    /// Round-key word: a 128-bit lane for ACS, a 32-bit column word for RWS.
    type Word: Copy + Zeroize + Send + Sync;

    /// Keystream block length in bytes; also the nonce length.
    const BLOCK_SIZE: usize;

    /// Bytes per round-key word.
    const WORD_SIZE: usize;

    /// Round-key words consumed per block.
    const WORDS_PER_BLOCK: usize;

    /// Initial processed-bytes counter, fixed per variant and bound into
    /// the key-schedule name header. Changing it is a format break.
    const COUNTER_BASE: u64;

    /// Serialized width of the round count in bytes.
    const ROUNDS_FIELD_SIZE: usize;

    /// Minimum length of a serialized state record.
    const STATE_THRESHOLD: usize;

    /// Base algorithm name fed into the key-schedule header.
    const NAME: &'static str;

    /// Round count for a legal key length.
    fn rounds(key_len: usize) -> usize {
        match key_len {
            IK256_SIZE => RK256_ROUNDS,
            IK512_SIZE => RK512_ROUNDS,
            _ => RK1024_ROUNDS,
        }
    }

    /// Packs squeezed key-schedule bytes into round-key words.
    fn words_from_xof(raw: &[u8]) -> Vec<Self::Word>;

    /// Serializes round-key words to their wire representation.
    fn words_to_wire(words: &[Self::Word]) -> Vec<u8>;

    /// Parses wire bytes back into round-key words.
    fn words_from_wire(raw: &[u8]) -> Result<Vec<Self::Word>, CryptoError>;

    /// Encrypts one `BLOCK_SIZE` input block into `output`.
    fn transform_block(round_keys: &[Self::Word], input: &[u8], output: &mut [u8]);

    /// Encrypts a run of whole blocks. The batch is a pure fan-out of the
    /// single-block transform; every width produces identical bytes.
    fn transform_batch(round_keys: &[Self::Word], input: &[u8], output: &mut [u8]) {
        for (input_block, output_block) in input
            .chunks_exact(Self::BLOCK_SIZE)
            .zip(output.chunks_exact_mut(Self::BLOCK_SIZE))
        {
            Self::transform_block(round_keys, input_block, output_block);
        }
    }
}
