// Copyright (C) 2015-2025 The Neo Project.
//
// error.rs file belongs to the neo project and is free
// software distributed under the MIT software license, see the
// accompanying file LICENSE in the main directory of the
// repository or http://www.opensource.org/licenses/mit-license.php
// for more details.
//
// Redistribution and use in source and binary forms with or without
// modifications are permitted.

//! Error types for the core model.

use thiserror::Error;

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors produced by serialization and model validation.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Encoded data did not match the expected wire format.
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    /// A value violated a model constraint.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// A read ran past the end of the input.
    #[error("End of stream")]
    EndOfStream,

    /// Cryptographic error from the underlying primitives.
    #[error("Crypto error: {0}")]
    Crypto(#[from] oracle_cryptography::CryptoError),
}
