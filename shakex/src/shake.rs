//======================================================================
// src/shake.rs
// SHAKE / cSHAKE extendable-output function in the three widened modes.
//======================================================================

use crate::keccak::{Sponge, STANDARD_ROUNDS, WIDE_ROUNDS};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// cSHAKE domain-separation byte (SP 800-185).
const CSHAKE_DOMAIN: u8 = 0x04;
/// Plain SHAKE domain-separation byte (FIPS-202).
const SHAKE_DOMAIN: u8 = 0x1F;

/// Output mode of the XOF. Selects the sponge rate and round count.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShakeMode {
    /// FIPS-202 SHAKE-256: 136-byte rate, 24 rounds.
    Shake256,
    /// 512-bit strength extension: 72-byte rate, 24 rounds.
    Shake512,
    /// Widened 1024-bit mode: 36-byte rate, 48 rounds.
    Shake1024,
}

impl ShakeMode {
    /// The sponge rate in bytes. Must match the rate of the KMAC mode of
    /// the same strength.
    pub fn rate(self) -> usize {
        match self {
            ShakeMode::Shake256 => 136,
            ShakeMode::Shake512 => 72,
            ShakeMode::Shake1024 => 36,
        }
    }

    /// Permutation rounds applied per block.
    pub fn rounds(self) -> usize {
        match self {
            ShakeMode::Shake256 | ShakeMode::Shake512 => STANDARD_ROUNDS,
            ShakeMode::Shake1024 => WIDE_ROUNDS,
        }
    }
}

/// Streaming SHAKE/cSHAKE instance.
///
/// `initialize` absorbs the key under the requested name/customization
/// framing and moves the sponge into its squeeze phase; `generate` may then
/// be called any number of times for arbitrary-length output.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Shake {
    sponge: Sponge,
    #[zeroize(skip)]
    mode: ShakeMode,
    #[zeroize(skip)]
    initialized: bool,
}

impl Shake {
    pub fn new(mode: ShakeMode) -> Self {
        Self {
            sponge: Sponge::new(mode.rate(), mode.rounds()),
            mode,
            initialized: false,
        }
    }

    pub fn mode(&self) -> ShakeMode {
        self.mode
    }

    /// Keys the XOF as cSHAKE(key, S = `custom`, N = `name`).
    ///
    /// The `name` parameter carries the caller's function-name header and
    /// `custom` the user customization string; with both empty the instance
    /// is plain SHAKE. Re-initializing discards any previous state.
    pub fn initialize(&mut self, key: &[u8], custom: &[u8], name: &[u8]) {
        self.sponge.reset();

        if custom.is_empty() && name.is_empty() {
            self.sponge.absorb(key);
            self.sponge.pad(SHAKE_DOMAIN);
        } else {
            // bytepad(encode_string(N) || encode_string(S), rate)
            let rate = self.sponge.rate() as u64;
            absorb_left_encode(&mut self.sponge, rate);
            absorb_string(&mut self.sponge, name);
            absorb_string(&mut self.sponge, custom);
            self.sponge.fill_block();

            self.sponge.absorb(key);
            self.sponge.pad(CSHAKE_DOMAIN);
        }

        self.initialized = true;
    }

    /// Squeezes `out.len()` bytes of output.
    pub fn generate(&mut self, out: &mut [u8]) {
        debug_assert!(self.initialized, "generate called before initialize");
        self.sponge.squeeze(out);
    }

    pub fn reset(&mut self) {
        self.sponge.reset();
        self.initialized = false;
    }
}

/// Writes the SP 800-185 `left_encode(value)` into `buf`, returning the
/// used prefix. `buf` must hold at least 9 bytes.
pub(crate) fn left_encode(buf: &mut [u8; 9], value: u64) -> usize {
    let bytes = value.to_be_bytes();
    let skip = value.leading_zeros() as usize / 8;
    let n = (8 - skip).max(1);
    buf[0] = n as u8;
    buf[1..=n].copy_from_slice(&bytes[8 - n..]);
    n + 1
}

/// Writes the SP 800-185 `right_encode(value)` into `buf`, returning the
/// used prefix.
pub(crate) fn right_encode(buf: &mut [u8; 9], value: u64) -> usize {
    let bytes = value.to_be_bytes();
    let skip = value.leading_zeros() as usize / 8;
    let n = (8 - skip).max(1);
    buf[..n].copy_from_slice(&bytes[8 - n..]);
    buf[n] = n as u8;
    n + 1
}

pub(crate) fn absorb_left_encode(sponge: &mut Sponge, value: u64) {
    let mut buf = [0u8; 9];
    let used = left_encode(&mut buf, value);
    sponge.absorb(&buf[..used]);
}

pub(crate) fn absorb_right_encode(sponge: &mut Sponge, value: u64) {
    let mut buf = [0u8; 9];
    let used = right_encode(&mut buf, value);
    sponge.absorb(&buf[..used]);
}

/// Absorbs `encode_string(data)`: the bit length, left-encoded, then the
/// bytes themselves.
pub(crate) fn absorb_string(sponge: &mut Sponge, data: &[u8]) {
    absorb_left_encode(sponge, (data.len() as u64) * 8);
    sponge.absorb(data);
}
