//======================================================================
// src/lib.rs
// Crate entry point. Declares the public API and wires the modules.
//======================================================================

//! Wide-block authenticated stream ciphers.
//!
//! This crate implements two closely related AEAD stream ciphers built on
//! the pattern *wide-block keystream permutation + KMAC tag + SHAKE key
//! schedule*, running in a parallelised counter mode:
//!
//! * **ACS**: a 32-byte block built from two 128-bit halves mixed by a
//!   byte blend/shuffle step and AES rounds; uses AES-NI when the CPU has
//!   it, with a byte-identical software fallback.
//! * **RWS**: a portable 64-byte software Rijndael operating on a
//!   512-bit state.
//!
//! Both share the cSHAKE-driven key expansion (round keys and MAC key from
//! one squeeze), a nonce-indexed CTR keystream with striped counters for
//! the parallel driver, encrypt-then-MAC framing with associated data, and
//! an opaque serialisable state.
//!
//! # Examples
//!
//! Authenticated encrypt and decrypt:
//!
//! ```
//! use widestream::AcsStream;
//!
//! let key = [0x01u8; 64];
//! let nonce = [0x02u8; 32];
//! let plaintext = b"the quick brown fox";
//!
//! let mut cipher = AcsStream::new(true);
//! cipher.initialize(true, &key, &nonce, &[]).unwrap();
//! cipher.set_associated_data(b"header").unwrap();
//!
//! let tag_size = cipher.tag_size().unwrap();
//! let mut sealed = vec![0u8; plaintext.len() + tag_size];
//! cipher.transform(plaintext, &mut sealed, plaintext.len()).unwrap();
//!
//! let mut cipher = AcsStream::new(true);
//! cipher.initialize(false, &key, &nonce, &[]).unwrap();
//! cipher.set_associated_data(b"header").unwrap();
//!
//! let mut opened = vec![0u8; plaintext.len()];
//! cipher.transform(&sealed, &mut opened, plaintext.len()).unwrap();
//! assert_eq!(&opened, plaintext);
//! ```

// --- Module declarations ---
pub mod error;

mod acs;
mod parallel;
mod rijndael;
mod rws;
mod simd;
mod stream;
mod utils;
mod variant;


// --- Re-exports ---
pub use acs::Acs;
pub use error::CryptoError;
pub use rws::Rws;
pub use stream::{SymmetricKeySize, WideStream, INFO_SIZE};
pub use variant::{WideVariant, IK1024_SIZE, IK256_SIZE, IK512_SIZE};

pub use shakex;

// --- Convenience Type Aliases for Users ---

/// The AES-NI half-block stream cipher.
pub type AcsStream = WideStream<Acs>;

/// The portable wide Rijndael stream cipher.
pub type RwsStream = WideStream<Rws>;
