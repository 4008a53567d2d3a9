//======================================================================
// src/kmac.rs
// KMAC keyed message authentication over the cSHAKE sponge.
//======================================================================

use crate::keccak::Sponge;
use crate::shake::{absorb_left_encode, absorb_right_encode, absorb_string, ShakeMode};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

/// cSHAKE domain-separation byte; KMAC is a cSHAKE instance with N = "KMAC".
const CSHAKE_DOMAIN: u8 = 0x04;

/// Strength mode of the MAC. Rates mirror the SHAKE mode of equal strength.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KmacMode {
    /// 32-byte tags over the 136-byte rate.
    Kmac256,
    /// 64-byte tags over the 72-byte rate.
    Kmac512,
    /// 128-byte tags over the widened 36-byte rate.
    Kmac1024,
}

impl KmacMode {
    fn shake_mode(self) -> ShakeMode {
        match self {
            KmacMode::Kmac256 => ShakeMode::Shake256,
            KmacMode::Kmac512 => ShakeMode::Shake512,
            KmacMode::Kmac1024 => ShakeMode::Shake1024,
        }
    }

    pub fn rate(self) -> usize {
        self.shake_mode().rate()
    }

    /// The tag length in bytes.
    pub fn tag_size(self) -> usize {
        match self {
            KmacMode::Kmac256 => 32,
            KmacMode::Kmac512 => 64,
            KmacMode::Kmac1024 => 128,
        }
    }

    /// Minimum, recommended, and maximum-security key lengths.
    pub fn legal_key_sizes(self) -> [usize; 3] {
        let tag = self.tag_size();
        [tag / 2, tag, tag * 2]
    }

    /// The middle entry of `legal_key_sizes`.
    pub fn recommended_key_size(self) -> usize {
        self.tag_size()
    }
}

/// Incremental KMAC instance.
///
/// After `initialize`, messages are fed through `update` and sealed with
/// `finalize`, which writes the tag and immediately restarts the sponge
/// with the cached key, so the next `update` begins a fresh message, as
/// the stream ciphers require between transform calls.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Kmac {
    sponge: Sponge,
    key: Zeroizing<Vec<u8>>,
    #[zeroize(skip)]
    mode: KmacMode,
    #[zeroize(skip)]
    initialized: bool,
}

impl Kmac {
    pub fn new(mode: KmacMode) -> Self {
        let shake = mode.shake_mode();
        Self {
            sponge: Sponge::new(shake.rate(), shake.rounds()),
            key: Zeroizing::new(Vec::new()),
            mode,
            initialized: false,
        }
    }

    pub fn mode(&self) -> KmacMode {
        self.mode
    }

    pub fn tag_size(&self) -> usize {
        self.mode.tag_size()
    }

    pub fn legal_key_sizes(&self) -> [usize; 3] {
        self.mode.legal_key_sizes()
    }

    /// Keys the MAC. Any in-progress message is discarded.
    pub fn initialize(&mut self, key: &[u8]) {
        self.key.zeroize();
        *self.key = key.to_vec();
        self.initialized = true;
        self.start();
    }

    /// Absorbs the KMAC framing and the cached key, leaving the sponge
    /// ready for message input.
    fn start(&mut self) {
        let rate = self.sponge.rate() as u64;
        self.sponge.reset();

        // bytepad(encode_string("KMAC") || encode_string(S), rate); S is empty
        absorb_left_encode(&mut self.sponge, rate);
        absorb_string(&mut self.sponge, b"KMAC");
        absorb_string(&mut self.sponge, b"");
        self.sponge.fill_block();

        // bytepad(encode_string(K), rate)
        absorb_left_encode(&mut self.sponge, rate);
        absorb_string(&mut self.sponge, &self.key);
        self.sponge.fill_block();
    }

    /// Absorbs message bytes.
    pub fn update(&mut self, data: &[u8]) {
        debug_assert!(self.initialized, "update called before initialize");
        self.sponge.absorb(data);
    }

    /// Writes the tag into `out[..tag_size]` and restarts the keyed sponge.
    pub fn finalize(&mut self, out: &mut [u8]) {
        debug_assert!(self.initialized, "finalize called before initialize");
        let tag_size = self.mode.tag_size();
        debug_assert!(out.len() >= tag_size);

        absorb_right_encode(&mut self.sponge, (tag_size as u64) * 8);
        self.sponge.pad(CSHAKE_DOMAIN);
        self.sponge.squeeze(&mut out[..tag_size]);

        self.start();
    }

    /// Clears the sponge. A keyed instance restarts with its cached key;
    /// an unkeyed one must be re-initialized before use.
    pub fn reset(&mut self) {
        if self.initialized {
            self.start();
        } else {
            self.sponge.reset();
        }
    }
}
