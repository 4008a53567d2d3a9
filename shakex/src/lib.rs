//======================================================================
// src/lib.rs
// Crate entry point. Declares the public API and wires the modules.
//======================================================================

//! Sponge primitives for the widestream cipher family.
//!
//! This crate implements the Keccak permutation together with the three
//! SHAKE/cSHAKE output modes and the matching KMAC modes consumed by the
//! `widestream` engine:
//!
//! * `Shake256` / `Kmac256`: the FIPS-202 parameters (136-byte rate).
//! * `Shake512` / `Kmac512`: the 512-bit strength extension (72-byte rate).
//! * `Shake1024` / `Kmac1024`: the widened 1024-bit mode, a 36-byte rate
//!   over a 48-round permutation whose round constants continue the FIPS
//!   LFSR schedule.
//!
//! The XOF is exposed in its three-argument cSHAKE form
//! `initialize(key, custom, name)`; when both `custom` and `name` are empty
//! the instance degrades to plain SHAKE. KMAC follows SP 800-185 and
//! restarts itself after `finalize`, so one keyed instance can authenticate
//! a sequence of messages.

// --- Module declarations ---
mod keccak;
pub mod kmac;
pub mod shake;


// --- Re-exports ---
pub use keccak::keccak_p;
pub use kmac::{Kmac, KmacMode};
pub use shake::{Shake, ShakeMode};
