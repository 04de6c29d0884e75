//! Error types for the oracle service.

use thiserror::Error;

/// The JSON-RPC error code all oracle rejections are reported under.
pub const RPC_ERROR_CODE: i32 = -100;

/// Result type alias for oracle service operations.
pub type Result<T> = std::result::Result<T, OracleError>;

/// Errors produced by the oracle service.
///
/// The first four variants carry the exact messages peers see on the wire;
/// changing them breaks cross-node compatibility.
#[derive(Error, Debug)]
pub enum OracleError {
    /// The message signature over a gossiped partial did not verify.
    #[error("Invalid sign")]
    InvalidSign,

    /// The request was already finalized and submitted.
    #[error("Request has already finished")]
    AlreadyFinished,

    /// The chain has no record of the request.
    #[error("Request is not found")]
    RequestNotFound,

    /// The partial signature matched neither the primary nor the backup
    /// response transaction.
    #[error("Invalid response transaction sign")]
    InvalidTxSign,

    /// The wallet holds no key designated as an oracle.
    #[error("Oracle account is not found")]
    AccountNotFound,

    /// The service is not in the right state for the operation.
    #[error("Oracle service status error: {0}")]
    Status(String),

    /// The result filter failed to parse or matched nothing.
    #[error("Filter error: {0}")]
    Filter(String),

    /// Malformed RPC parameters.
    #[error("Invalid params: {0}")]
    InvalidParams(String),

    /// Cryptographic error from the underlying primitives.
    #[error("Crypto error: {0}")]
    Crypto(#[from] oracle_cryptography::CryptoError),

    /// Model or serialization error.
    #[error("Core error: {0}")]
    Core(#[from] oracle_core::CoreError),

    /// Configuration could not be loaded or was invalid.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}
