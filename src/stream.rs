//======================================================================
// src/stream.rs
// The generic authenticated stream engine: SHAKE key schedule, striped
// counter-mode keystream, parallel driver, KMAC framing, and state
// serialization. Either wide-block variant plugs in through WideVariant.
//======================================================================

use crate::error::CryptoError;
use crate::parallel::ParallelProfile;
use crate::simd;
use crate::utils;
use crate::variant::{WideVariant, IK1024_SIZE, IK256_SIZE, IK512_SIZE};
use rayon::prelude::*;
use shakex::{Kmac, KmacMode, Shake, ShakeMode};
use subtle::ConstantTimeEq;
use zeroize::{Zeroize, Zeroizing};

/// Upper bound on the info (customization) string length in bytes.
pub const INFO_SIZE: usize = 16;

pub(crate) const LEGAL_KEY_SIZES: [usize; 3] = [IK256_SIZE, IK512_SIZE, IK1024_SIZE];

/// One legal key/nonce/info size combination.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SymmetricKeySize {
    pub key_size: usize,
    pub nonce_size: usize,
    pub info_size: usize,
}

/// Internal cipher state, owned exclusively by one engine instance.
/// Secret fields are wiped on reset and drop.
struct CipherState<V: WideVariant> {
    round_keys: Vec<V::Word>,
    associated: Vec<u8>,
    custom: Vec<u8>,
    mac_key: Vec<u8>,
    mac_tag: Vec<u8>,
    name: Vec<u8>,
    nonce: Vec<u8>,
    counter: u64,
    rounds: u32,
    authenticator: Option<KmacMode>,
    mode: Option<ShakeMode>,
    is_authenticated: bool,
    is_encryption: bool,
    is_initialized: bool,
}

impl<V: WideVariant> CipherState<V> {
    fn new(authenticate: bool) -> Self {
        Self {
            round_keys: Vec::new(),
            associated: Vec::new(),
            custom: Vec::new(),
            mac_key: Vec::new(),
            mac_tag: Vec::new(),
            name: Vec::new(),
            nonce: vec![0u8; V::BLOCK_SIZE],
            counter: 0,
            rounds: 0,
            authenticator: None,
            mode: None,
            is_authenticated: authenticate,
            is_encryption: false,
            is_initialized: false,
        }
    }

    fn reset(&mut self) {
        self.round_keys.zeroize();
        self.associated.zeroize();
        self.custom.zeroize();
        self.mac_key.zeroize();
        self.mac_tag.zeroize();
        self.name.zeroize();
        self.nonce.zeroize();
        self.nonce.resize(V::BLOCK_SIZE, 0);
        self.counter = 0;
        self.rounds = 0;
        self.is_encryption = false;
        self.is_initialized = false;
    }

    fn serialize(&self) -> Zeroizing<Vec<u8>> {
        let round_key_wire = Zeroizing::new(V::words_to_wire(&self.round_keys));
        let capacity = round_key_wire.len()
            + self.associated.len()
            + self.custom.len()
            + self.mac_key.len()
            + self.mac_tag.len()
            + self.name.len()
            + self.nonce.len()
            + 7 * 2
            + 8
            + V::ROUNDS_FIELD_SIZE
            + 5;
        let mut buf = Zeroizing::new(Vec::with_capacity(capacity));

        utils::put_record(&mut buf, &round_key_wire);
        utils::put_record(&mut buf, &self.associated);
        utils::put_record(&mut buf, &self.custom);
        utils::put_record(&mut buf, &self.mac_key);
        utils::put_record(&mut buf, &self.mac_tag);
        utils::put_record(&mut buf, &self.name);
        utils::put_record(&mut buf, &self.nonce);

        buf.extend_from_slice(&self.counter.to_le_bytes());
        buf.extend_from_slice(&self.rounds.to_le_bytes()[..V::ROUNDS_FIELD_SIZE]);
        buf.push(kmac_repr(self.authenticator));
        buf.push(shake_repr(self.mode));
        buf.push(self.is_authenticated as u8);
        buf.push(self.is_encryption as u8);
        buf.push(self.is_initialized as u8);
        buf
    }

    fn deserialize(bytes: &[u8]) -> Result<Self, CryptoError> {
        let mut offset = 0;

        let round_keys = V::words_from_wire(utils::get_record(bytes, &mut offset)?)?;
        let associated = utils::get_record(bytes, &mut offset)?.to_vec();
        let custom = utils::get_record(bytes, &mut offset)?.to_vec();
        let mac_key = utils::get_record(bytes, &mut offset)?.to_vec();
        let mac_tag = utils::get_record(bytes, &mut offset)?.to_vec();
        let name = utils::get_record(bytes, &mut offset)?.to_vec();
        let nonce = utils::get_record(bytes, &mut offset)?.to_vec();
        if nonce.len() != V::BLOCK_SIZE {
            return Err(CryptoError::InvalidKey);
        }

        let counter = utils::get_u64(bytes, &mut offset)?;
        let rounds = match V::ROUNDS_FIELD_SIZE {
            2 => utils::get_u16(bytes, &mut offset)? as u32,
            _ => utils::get_u32(bytes, &mut offset)?,
        };
        let authenticator = kmac_from_repr(utils::get_u8(bytes, &mut offset)?)?;
        let mode = shake_from_repr(utils::get_u8(bytes, &mut offset)?)?;
        let is_authenticated = utils::get_u8(bytes, &mut offset)? != 0;
        let is_encryption = utils::get_u8(bytes, &mut offset)? != 0;
        let is_initialized = utils::get_u8(bytes, &mut offset)? != 0;

        // the restored invariants must hold before the keys can be used
        if is_authenticated != authenticator.is_some() {
            return Err(CryptoError::InvalidKey);
        }
        if is_initialized {
            if round_keys.len() != V::WORDS_PER_BLOCK * (rounds as usize + 1) {
                return Err(CryptoError::InvalidKey);
            }
            if mode.is_none() {
                return Err(CryptoError::InvalidKey);
            }
            if let Some(kmode) = authenticator {
                if mac_tag.len() != kmode.tag_size() || mac_key.is_empty() {
                    return Err(CryptoError::InvalidKey);
                }
            }
        }

        Ok(Self {
            round_keys,
            associated,
            custom,
            mac_key,
            mac_tag,
            name,
            nonce,
            counter,
            rounds,
            authenticator,
            mode,
            is_authenticated,
            is_encryption,
            is_initialized,
        })
    }
}

impl<V: WideVariant> Zeroize for CipherState<V> {
    fn zeroize(&mut self) {
        self.round_keys.zeroize();
        self.associated.zeroize();
        self.custom.zeroize();
        self.mac_key.zeroize();
        self.mac_tag.zeroize();
        self.name.zeroize();
        self.nonce.zeroize();
        self.counter = 0;
        self.rounds = 0;
    }
}

impl<V: WideVariant> Drop for CipherState<V> {
    fn drop(&mut self) {
        self.zeroize();
    }
}

fn kmac_repr(mode: Option<KmacMode>) -> u8 {
    match mode {
        None => 0,
        Some(KmacMode::Kmac256) => 1,
        Some(KmacMode::Kmac512) => 2,
        Some(KmacMode::Kmac1024) => 3,
    }
}

fn kmac_from_repr(value: u8) -> Result<Option<KmacMode>, CryptoError> {
    match value {
        0 => Ok(None),
        1 => Ok(Some(KmacMode::Kmac256)),
        2 => Ok(Some(KmacMode::Kmac512)),
        3 => Ok(Some(KmacMode::Kmac1024)),
        _ => Err(CryptoError::InvalidKey),
    }
}

fn shake_repr(mode: Option<ShakeMode>) -> u8 {
    match mode {
        None => 0,
        Some(ShakeMode::Shake256) => 1,
        Some(ShakeMode::Shake512) => 2,
        Some(ShakeMode::Shake1024) => 3,
    }
}

fn shake_from_repr(value: u8) -> Result<Option<ShakeMode>, CryptoError> {
    match value {
        0 => Ok(None),
        1 => Ok(Some(ShakeMode::Shake256)),
        2 => Ok(Some(ShakeMode::Shake512)),
        3 => Ok(Some(ShakeMode::Shake1024)),
        _ => Err(CryptoError::InvalidKey),
    }
}

/// An authenticated wide-block stream cipher instance.
///
/// The engine is a session object: `initialize` derives round keys and the
/// MAC key from `(key, nonce, info)` through cSHAKE, after which any number
/// of `transform` calls encrypt (or verify and decrypt) with an
/// automatically advancing counter. One instance must not be driven from
/// multiple threads; the parallelism lives inside a single `transform`.
pub struct WideStream<V: WideVariant> {
    state: CipherState<V>,
    mac: Option<Kmac>,
    profile: ParallelProfile,
}

impl<V: WideVariant> WideStream<V> {
    /// Creates an uninitialized instance. With `authenticate` set, every
    /// transform seals (or verifies) a KMAC tag over nonce, ciphertext,
    /// associated data, and the length trailer.
    pub fn new(authenticate: bool) -> Self {
        Self {
            state: CipherState::new(authenticate),
            mac: None,
            profile: ParallelProfile::new(V::BLOCK_SIZE),
        }
    }

    /// Restores an instance from a serialized state record.
    pub fn new_from_state(bytes: &[u8]) -> Result<Self, CryptoError> {
        if bytes.len() < V::STATE_THRESHOLD {
            return Err(CryptoError::InvalidKey);
        }
        let state = CipherState::deserialize(bytes)?;
        let mac = match state.authenticator {
            Some(kmode) => {
                let mut mac = Kmac::new(kmode);
                mac.initialize(&state.mac_key);
                Some(mac)
            }
            None => None,
        };
        Ok(Self {
            state,
            mac,
            profile: ParallelProfile::new(V::BLOCK_SIZE),
        })
    }

    /// The legal key sizes with their fixed nonce and info bounds.
    pub fn legal_key_sizes() -> [SymmetricKeySize; 3] {
        [IK256_SIZE, IK512_SIZE, IK1024_SIZE].map(|key_size| SymmetricKeySize {
            key_size,
            nonce_size: V::BLOCK_SIZE,
            info_size: INFO_SIZE,
        })
    }

    /// The cipher name; authenticated instances carry the MAC strength
    /// suffix once a key size is known.
    pub fn name(&self) -> String {
        match self.state.authenticator {
            Some(KmacMode::Kmac256) => format!("{}K256", V::NAME),
            Some(KmacMode::Kmac512) => format!("{}K512", V::NAME),
            Some(KmacMode::Kmac1024) => format!("{}K1024", V::NAME),
            None => V::NAME.to_string(),
        }
    }

    pub fn is_authenticator(&self) -> bool {
        self.state.is_authenticated
    }

    pub fn is_encryption(&self) -> bool {
        self.state.is_encryption
    }

    pub fn is_initialized(&self) -> bool {
        self.state.is_initialized
    }

    pub fn is_parallel(&self) -> bool {
        self.profile.is_parallel()
    }

    /// The current session nonce (the running counter block).
    pub fn nonce(&self) -> &[u8] {
        &self.state.nonce
    }

    pub fn parallel_block_size(&self) -> usize {
        self.profile.parallel_block_size()
    }

    /// Sets the parallel task fan-out; see `ParallelProfile` rules. Resets
    /// the parallel block size to the default for the new degree.
    pub fn set_parallel_max_degree(&mut self, degree: usize) -> Result<(), CryptoError> {
        self.profile.set_max_degree(degree)
    }

    /// Sets the bytes handled per parallel round.
    pub fn set_parallel_block_size(&mut self, size: usize) -> Result<(), CryptoError> {
        self.profile.set_parallel_block_size(size)
    }

    /// The last computed or verified tag.
    pub fn tag(&self) -> Result<Vec<u8>, CryptoError> {
        if self.state.mac_tag.is_empty() || !self.state.is_authenticated {
            return Err(CryptoError::NotInitialized);
        }
        Ok(self.state.mac_tag.clone())
    }

    /// The tag length appended to (or expected after) the ciphertext;
    /// zero for unauthenticated instances.
    pub fn tag_size(&self) -> Result<usize, CryptoError> {
        if !self.state.is_initialized {
            return Err(CryptoError::NotInitialized);
        }
        Ok(self.mac.as_ref().map_or(0, |mac| mac.tag_size()))
    }

    /// Keys the cipher for a new session.
    ///
    /// The key length selects the SHAKE mode, the round count, and (when
    /// authenticated) the KMAC strength per the key-size table. The nonce
    /// must be exactly `BLOCK_SIZE` bytes; `info` is the optional cSHAKE
    /// customization string. Re-initializing resets the prior session.
    pub fn initialize(
        &mut self,
        encryption: bool,
        key: &[u8],
        iv: &[u8],
        info: &[u8],
    ) -> Result<(), CryptoError> {
        if !LEGAL_KEY_SIZES.contains(&key.len()) {
            return Err(CryptoError::InvalidKey);
        }
        if iv.len() != V::BLOCK_SIZE {
            return Err(CryptoError::InvalidNonce);
        }
        if info.len() > INFO_SIZE {
            return Err(CryptoError::InvalidParam);
        }
        self.profile.validate()?;

        if self.state.is_initialized {
            self.reset();
        }

        let shake_mode = match key.len() {
            IK256_SIZE => ShakeMode::Shake256,
            IK512_SIZE => ShakeMode::Shake512,
            _ => ShakeMode::Shake1024,
        };
        let kmac_mode = if self.state.is_authenticated {
            Some(match key.len() {
                IK256_SIZE => KmacMode::Kmac256,
                IK512_SIZE => KmacMode::Kmac512,
                _ => KmacMode::Kmac1024,
            })
        } else {
            None
        };

        self.state.counter = V::COUNTER_BASE;
        self.state.rounds = V::rounds(key.len()) as u32;
        self.state.mode = Some(shake_mode);
        self.state.authenticator = kmac_mode;

        if !info.is_empty() {
            self.state.custom = info.to_vec();
        }

        // name header: session counter, key bits, then the cipher name
        let cipher_name = self.name();
        let mut name = Vec::with_capacity(8 + 2 + cipher_name.len());
        name.extend_from_slice(&self.state.counter.to_le_bytes());
        name.extend_from_slice(&((key.len() * 8) as u16).to_le_bytes());
        name.extend_from_slice(cipher_name.as_bytes());
        self.state.name = name;

        self.state.nonce = iv.to_vec();

        // key the generator with cSHAKE(k, c, n)
        let mut generator = Shake::new(shake_mode);
        generator.initialize(key, &self.state.custom, &self.state.name);

        let schedule_words = V::WORDS_PER_BLOCK * (self.state.rounds as usize + 1);
        let mut schedule = Zeroizing::new(vec![0u8; schedule_words * V::WORD_SIZE]);
        generator.generate(&mut schedule);
        self.state.round_keys = V::words_from_xof(&schedule);

        if let Some(kmode) = kmac_mode {
            let mut mac_key = Zeroizing::new(vec![0u8; kmode.recommended_key_size()]);
            generator.generate(&mut mac_key);
            let mut mac = Kmac::new(kmode);
            mac.initialize(&mac_key);
            self.state.mac_key = mac_key.to_vec();
            self.state.mac_tag = vec![0u8; kmode.tag_size()];
            self.mac = Some(mac);
        }

        self.state.is_encryption = encryption;
        self.state.is_initialized = true;
        Ok(())
    }

    /// Stages associated data for the next transform. The data is bound
    /// into that transform's tag and cleared afterwards.
    pub fn set_associated_data(&mut self, data: &[u8]) -> Result<(), CryptoError> {
        if !self.state.is_initialized {
            return Err(CryptoError::NotInitialized);
        }
        if self.mac.is_none() {
            return Err(CryptoError::IllegalOperation);
        }
        self.state.associated = data.to_vec();
        Ok(())
    }

    /// Transforms `length` bytes of `input` into `output`.
    ///
    /// Encrypting with authentication appends the tag after the
    /// ciphertext, so `output` must hold `length + tag_size` bytes.
    /// Decrypting with authentication expects the tag after the
    /// ciphertext in `input` and verifies it, in constant time, before
    /// any plaintext is produced.
    pub fn transform(
        &mut self,
        input: &[u8],
        output: &mut [u8],
        length: usize,
    ) -> Result<(), CryptoError> {
        if !self.state.is_initialized {
            return Err(CryptoError::NotInitialized);
        }
        if input.len() < length || output.len() < length {
            return Err(CryptoError::InvalidSize);
        }

        if self.state.is_encryption {
            if self.state.is_authenticated {
                let tag_size = self.state.mac_tag.len();
                if output.len() < length + tag_size {
                    return Err(CryptoError::InvalidSize);
                }
                // bind the starting nonce position
                if let Some(mac) = self.mac.as_mut() {
                    mac.update(&self.state.nonce);
                }
                self.process(input, output, length);
                if let Some(mac) = self.mac.as_mut() {
                    mac.update(&output[..length]);
                }
                self.state.counter += length as u64;
                self.finalize_mac();
                output[length..length + tag_size].copy_from_slice(&self.state.mac_tag);
            } else {
                self.process(input, output, length);
            }
        } else if self.state.is_authenticated {
            let tag_size = self.state.mac_tag.len();
            if input.len() < length + tag_size {
                return Err(CryptoError::InvalidSize);
            }
            if let Some(mac) = self.mac.as_mut() {
                mac.update(&self.state.nonce);
                mac.update(&input[..length]);
            }
            self.state.counter += length as u64;
            self.finalize_mac();
            let matches: bool = self.state.mac_tag[..]
                .ct_eq(&input[length..length + tag_size])
                .into();
            if !matches {
                return Err(CryptoError::AuthenticationFailure);
            }
            self.process(input, output, length);
        } else {
            self.process(input, output, length);
        }
        Ok(())
    }

    /// Wipes the session. The instance keeps its authentication setting
    /// and parallel profile; `initialize` starts a fresh session.
    pub fn reset(&mut self) {
        self.state.reset();
        if let Some(mac) = self.mac.as_mut() {
            mac.reset();
        }
    }

    /// Serializes the full cipher state as length-prefixed little-endian
    /// records. The buffer holds key material and is wiped on drop.
    pub fn serialize(&self) -> Zeroizing<Vec<u8>> {
        self.state.serialize()
    }

    /// Seals the MAC: associated data (cleared afterwards), then the
    /// little-endian total of bytes processed.
    fn finalize_mac(&mut self) {
        let total = self.state.counter
            + self.state.nonce.len() as u64
            + self.state.associated.len() as u64
            + 8;
        let trailer = total.to_le_bytes();

        if !self.state.associated.is_empty() {
            if let Some(mac) = self.mac.as_mut() {
                mac.update(&self.state.associated);
            }
            // cleared per transform; restage with set_associated_data
            self.state.associated.zeroize();
        }

        if let Some(mac) = self.mac.as_mut() {
            mac.update(&trailer);
            mac.finalize(&mut self.state.mac_tag);
        }
    }

    /// Splits the request into parallel rounds of `parallel_block_size`
    /// bytes, processing any remainder sequentially.
    fn process(&mut self, input: &[u8], output: &mut [u8], length: usize) {
        let parallel_block = self.profile.parallel_block_size();

        if self.profile.is_parallel() && length >= parallel_block {
            let rounds = length / parallel_block;
            for i in 0..rounds {
                let start = i * parallel_block;
                self.process_parallel(
                    &input[start..start + parallel_block],
                    &mut output[start..start + parallel_block],
                );
            }
            let consumed = rounds * parallel_block;
            if consumed != length {
                self.process_sequential(&input[consumed..length], &mut output[consumed..length]);
            }
        } else {
            self.process_sequential(&input[..length], &mut output[..length]);
        }
    }

    /// One parallel round: disjoint output chunks, each task owning a
    /// stride-offset copy of the counter.
    fn process_parallel(&mut self, input: &[u8], output: &mut [u8]) {
        let degree = self.profile.max_degree();
        let chunk_len = output.len() / degree;
        let counter_stride = (chunk_len / V::BLOCK_SIZE) as u64;
        let aligned = chunk_len * degree;

        {
            let round_keys = &self.state.round_keys;
            let nonce = &self.state.nonce;
            output[..aligned]
                .par_chunks_exact_mut(chunk_len)
                .zip(input[..aligned].par_chunks_exact(chunk_len))
                .enumerate()
                .for_each(|(task, (out_chunk, in_chunk))| {
                    // task-level counter, offset by whole chunks
                    let mut task_counter = Zeroizing::new(vec![0u8; V::BLOCK_SIZE]);
                    utils::le_increase(nonce, &mut task_counter, counter_stride * task as u64);
                    generate_keystream::<V>(round_keys, out_chunk, &mut task_counter);
                    utils::xor_bytes(out_chunk, in_chunk);
                });
        }

        // the session nonce advances to the last task's end counter
        let mut next = Zeroizing::new(vec![0u8; V::BLOCK_SIZE]);
        utils::le_increase(&self.state.nonce, &mut next, counter_stride * degree as u64);
        self.state.nonce.copy_from_slice(&next);

        if aligned < output.len() {
            generate_keystream::<V>(
                &self.state.round_keys,
                &mut output[aligned..],
                &mut self.state.nonce,
            );
            utils::xor_bytes(&mut output[aligned..], &input[aligned..]);
        }
    }

    fn process_sequential(&mut self, input: &[u8], output: &mut [u8]) {
        generate_keystream::<V>(&self.state.round_keys, output, &mut self.state.nonce);
        utils::xor_bytes(output, input);
    }
}

/// Fills `output` with keystream, advancing `counter` by one per block.
pub(crate) fn generate_keystream<V: WideVariant>(
    round_keys: &[V::Word],
    output: &mut [u8],
    counter: &mut [u8],
) {
    generate_with_fan_out::<V>(simd::tier().fan_out(), round_keys, output, counter);
}

/// Keystream generation at an explicit batch width. The width is a pure
/// throughput choice; all widths emit identical bytes.
pub(crate) fn generate_with_fan_out<V: WideVariant>(
    fan_out: usize,
    round_keys: &[V::Word],
    output: &mut [u8],
    counter: &mut [u8],
) {
    let block_size = V::BLOCK_SIZE;
    let length = output.len();
    let mut position = 0;

    if fan_out > 1 && length >= fan_out * block_size {
        let wide = fan_out * block_size;
        let aligned = length - (length % wide);
        let mut staged = vec![0u8; wide];
        while position != aligned {
            // stagger the counters through the batch buffer
            for slot in staged.chunks_exact_mut(block_size) {
                slot.copy_from_slice(counter);
                utils::le_increment(counter);
            }
            V::transform_batch(round_keys, &staged, &mut output[position..position + wide]);
            position += wide;
        }
    }

    let aligned = length - (length % block_size);
    while position != aligned {
        V::transform_block(round_keys, counter, &mut output[position..position + block_size]);
        utils::le_increment(counter);
        position += block_size;
    }

    if position != length {
        let mut pad = Zeroizing::new(vec![0u8; block_size]);
        V::transform_block(round_keys, counter, &mut pad);
        utils::le_increment(counter);
        let remainder = length % block_size;
        output[length - remainder..].copy_from_slice(&pad[..remainder]);
    }
}
