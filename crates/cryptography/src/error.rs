//! Error types for cryptographic operations.

use thiserror::Error;

/// Result type alias for cryptographic operations.
pub type Result<T> = std::result::Result<T, CryptoError>;

/// Errors produced by the cryptography crate.
#[derive(Error, Debug)]
pub enum CryptoError {
    /// A private or public key failed validation.
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// A signature was malformed or failed to parse.
    #[error("Invalid signature: {0}")]
    InvalidSignature(String),

    /// An encoded EC point could not be decoded.
    #[error("Invalid point encoding: {0}")]
    InvalidPoint(String),

    /// Hexadecimal decoding error.
    #[error("Hex decoding error: {0}")]
    HexError(#[from] hex::FromHexError),

    /// Base64 decoding error.
    #[error("Base64 decoding error: {0}")]
    Base64Error(#[from] base64::DecodeError),
}
