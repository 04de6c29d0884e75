//! Cryptographic primitives for the oracle node service.
//!
//! This crate provides the secp256r1 ECDSA operations, hash functions and
//! compressed EC point handling the oracle protocol is built on.

pub mod ecdsa;
pub mod ec_point;
pub mod error;
pub mod hash;
pub mod key_pair;

pub use ecdsa::ECDsa;
pub use ec_point::ECPoint;
pub use error::{CryptoError, Result};
pub use key_pair::KeyPair;
