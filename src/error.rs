//======================================================================
// src/error.rs
// Error surface of the cipher engine.
//======================================================================

use thiserror::Error;

/// Errors produced by the widestream ciphers.
///
/// Every failure surfaces to the caller of the public API; the engine never
/// retries. `AuthenticationFailure` is raised on the decrypt path before any
/// plaintext is produced.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum CryptoError {
    /// Key length is not one of the legal key sizes, or a serialized state
    /// record is malformed or truncated.
    #[error("invalid key; the key must be one of the legal key sizes and state records must be intact")]
    InvalidKey,

    /// Nonce length differs from the cipher block size.
    #[error("invalid nonce; the nonce must be equal in length to the cipher block size")]
    InvalidNonce,

    /// A buffer is too small for the requested operation, or the parallel
    /// block size is out of bounds.
    #[error("invalid size; the buffer or parallel block size is out of bounds")]
    InvalidSize,

    /// A parameter is malformed, e.g. the parallel block size is not a
    /// multiple of the parallel minimum size.
    #[error("invalid parameter; the value is not aligned to the required boundary")]
    InvalidParam,

    /// The operation requires a prior call to `initialize`.
    #[error("the cipher has not been initialized")]
    NotInitialized,

    /// The operation requires the authenticated construction.
    #[error("the cipher has not been configured for authentication")]
    IllegalOperation,

    /// The option is outside what this system supports, e.g. a parallel
    /// degree above the processor count.
    #[error("the option is not supported on this system")]
    NotSupported,

    /// The authentication tag did not match the ciphertext.
    #[error("the authentication tag does not match")]
    AuthenticationFailure,
}
