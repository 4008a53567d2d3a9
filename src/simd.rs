//======================================================================
// src/simd.rs
// Runtime SIMD capability detection. The tier only widens the keystream
// fan-out; every tier produces identical bytes.
//======================================================================

use cfg_if::cfg_if;
use std::sync::OnceLock;

/// Vector width available on the running CPU.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SimdTier {
    Scalar,
    V128,
    V256,
    V512,
}

impl SimdTier {
    /// Blocks generated per batch at this tier.
    pub(crate) fn fan_out(self) -> usize {
        match self {
            SimdTier::Scalar => 1,
            SimdTier::V128 => 4,
            SimdTier::V256 => 8,
            SimdTier::V512 => 16,
        }
    }
}

static TIER: OnceLock<SimdTier> = OnceLock::new();
static AESNI: OnceLock<bool> = OnceLock::new();

/// The detected vector tier, probed once per process.
pub fn tier() -> SimdTier {
    *TIER.get_or_init(detect_tier)
}

/// Whether the AES and byte-shuffle instruction sets are available for the
/// hardware half-block path.
pub(crate) fn has_aesni() -> bool {
    *AESNI.get_or_init(detect_aesni)
}

fn detect_tier() -> SimdTier {
    cfg_if! {
        if #[cfg(any(target_arch = "x86", target_arch = "x86_64"))] {
            if std::arch::is_x86_feature_detected!("avx512f") {
                return SimdTier::V512;
            }
            if std::arch::is_x86_feature_detected!("avx2") {
                return SimdTier::V256;
            }
            if std::arch::is_x86_feature_detected!("sse2") {
                return SimdTier::V128;
            }
            return SimdTier::Scalar;
        } else if #[cfg(target_arch = "aarch64")] {
            return SimdTier::V128;
        } else {
            return SimdTier::Scalar;
        }
    }
}

fn detect_aesni() -> bool {
    cfg_if! {
        if #[cfg(any(target_arch = "x86", target_arch = "x86_64"))] {
            return std::arch::is_x86_feature_detected!("aes")
                && std::arch::is_x86_feature_detected!("ssse3")
                && std::arch::is_x86_feature_detected!("sse4.1");
        } else {
            return false;
        }
    }
}
