//======================================================================
// src/keccak.rs
// The Keccak-p[1600] permutation and the duplex sponge shared by the
// SHAKE and KMAC front-ends.
//======================================================================

use zeroize::{Zeroize, ZeroizeOnDrop};

/// Number of 64-bit lanes in the Keccak-p[1600] state.
pub const STATE_WORDS: usize = 25;

/// Round count of the standard FIPS-202 permutation.
pub const STANDARD_ROUNDS: usize = 24;

/// Round count of the widened permutation backing the 1024 modes.
pub const WIDE_ROUNDS: usize = 48;

/// Rotation offsets for the rho step, indexed as `x + 5 * y`.
const RHO: [u32; STATE_WORDS] = [
    0, 1, 62, 28, 27, //
    36, 44, 6, 55, 20, //
    3, 10, 43, 25, 39, //
    41, 45, 15, 21, 8, //
    18, 2, 61, 56, 14,
];

/// One output bit of the FIPS-202 rc(t) LFSR (x^8 + x^6 + x^5 + x^4 + 1).
const fn rc_bit(t: usize) -> u64 {
    let mut r: u32 = 1;
    let mut i = 0;
    while i < t % 255 {
        r <<= 1;
        if r & 0x100 != 0 {
            r ^= 0x171;
        }
        i += 1;
    }
    (r & 1) as u64
}

/// Builds the iota round-constant table from the LFSR. The first 24 entries
/// reproduce the FIPS-202 constants; the remainder continue the schedule for
/// the widened permutation.
const fn round_constants() -> [u64; WIDE_ROUNDS] {
    let mut table = [0u64; WIDE_ROUNDS];
    let mut ir = 0;
    while ir < WIDE_ROUNDS {
        let mut j = 0;
        while j <= 6 {
            table[ir] |= rc_bit(j + 7 * ir) << ((1usize << j) - 1);
            j += 1;
        }
        ir += 1;
    }
    table
}

pub(crate) const RC: [u64; WIDE_ROUNDS] = round_constants();

/// Applies `rounds` rounds of the Keccak-p[1600] permutation.
pub fn keccak_p(state: &mut [u64; STATE_WORDS], rounds: usize) {
    debug_assert!(rounds <= WIDE_ROUNDS);

    for &rc in &RC[..rounds] {
        // theta
        let mut c = [0u64; 5];
        for x in 0..5 {
            c[x] = state[x] ^ state[x + 5] ^ state[x + 10] ^ state[x + 15] ^ state[x + 20];
        }
        for x in 0..5 {
            let d = c[(x + 4) % 5] ^ c[(x + 1) % 5].rotate_left(1);
            for y in 0..5 {
                state[x + 5 * y] ^= d;
            }
        }

        // rho and pi
        let mut b = [0u64; STATE_WORDS];
        for x in 0..5 {
            for y in 0..5 {
                b[y + 5 * ((2 * x + 3 * y) % 5)] = state[x + 5 * y].rotate_left(RHO[x + 5 * y]);
            }
        }

        // chi
        for y in 0..5 {
            for x in 0..5 {
                state[x + 5 * y] = b[x + 5 * y] ^ (!b[(x + 1) % 5 + 5 * y] & b[(x + 2) % 5 + 5 * y]);
            }
        }

        // iota
        state[0] ^= rc;
    }
}

/// Byte-granular duplex sponge over Keccak-p[1600].
///
/// Absorb and squeeze positions are tracked in bytes so the SP 800-185
/// encodings can be streamed straight in without intermediate buffers.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub(crate) struct Sponge {
    state: [u64; STATE_WORDS],
    #[zeroize(skip)]
    rate: usize,
    #[zeroize(skip)]
    rounds: usize,
    #[zeroize(skip)]
    pos: usize,
}

impl Sponge {
    pub(crate) fn new(rate: usize, rounds: usize) -> Self {
        debug_assert!(rate > 0 && rate < STATE_WORDS * 8);
        Self {
            state: [0u64; STATE_WORDS],
            rate,
            rounds,
            pos: 0,
        }
    }

    pub(crate) fn rate(&self) -> usize {
        self.rate
    }

    /// Clears the state for a fresh message; rate and round count persist.
    pub(crate) fn reset(&mut self) {
        self.state = [0u64; STATE_WORDS];
        self.pos = 0;
    }

    fn xor_byte(&mut self, index: usize, value: u8) {
        self.state[index / 8] ^= (value as u64) << (8 * (index % 8));
    }

    fn read_byte(&self, index: usize) -> u8 {
        (self.state[index / 8] >> (8 * (index % 8))) as u8
    }

    fn permute(&mut self) {
        keccak_p(&mut self.state, self.rounds);
    }

    /// XORs `data` into the state at the running absorb position,
    /// permuting at every rate boundary.
    pub(crate) fn absorb(&mut self, data: &[u8]) {
        for &byte in data {
            self.xor_byte(self.pos, byte);
            self.pos += 1;
            if self.pos == self.rate {
                self.permute();
                self.pos = 0;
            }
        }
    }

    /// Completes a `bytepad` group: zero-pads the current block to the rate
    /// boundary and permutes. A group that already ends on the boundary
    /// needs no extra block.
    pub(crate) fn fill_block(&mut self) {
        if self.pos != 0 {
            self.permute();
            self.pos = 0;
        }
    }

    /// Applies the domain-separation byte and the final `0x80` pad bit,
    /// then enters the squeeze phase.
    pub(crate) fn pad(&mut self, domain: u8) {
        self.xor_byte(self.pos, domain);
        self.xor_byte(self.rate - 1, 0x80);
        self.permute();
        self.pos = 0;
    }

    /// Emits `out.len()` bytes of squeeze output. Callable repeatedly; the
    /// position carries over between calls.
    pub(crate) fn squeeze(&mut self, out: &mut [u8]) {
        for byte in out.iter_mut() {
            if self.pos == self.rate {
                self.permute();
                self.pos = 0;
            }
            *byte = self.read_byte(self.pos);
            self.pos += 1;
        }
    }
}
