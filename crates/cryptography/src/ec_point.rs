//! Compressed secp256r1 points.
//!
//! Oracle public keys travel and sort in their 33-byte compressed SEC1
//! encoding. The byte-lexicographic ordering defined here is the ordering
//! multisig contracts are assembled in, so it must stay stable.

use crate::{CryptoError, Result};
use base64::Engine;
use p256::PublicKey;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;

/// Size of a compressed SEC1 point in bytes.
pub const COMPRESSED_POINT_SIZE: usize = 33;

/// A validated compressed secp256r1 public key.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ECPoint {
    encoded: [u8; COMPRESSED_POINT_SIZE],
}

impl ECPoint {
    /// Decodes a compressed SEC1 point, validating it lies on the curve.
    pub fn decode(data: &[u8]) -> Result<Self> {
        if data.len() != COMPRESSED_POINT_SIZE || (data[0] != 0x02 && data[0] != 0x03) {
            return Err(CryptoError::InvalidPoint(
                "expected 33-byte compressed encoding".to_string(),
            ));
        }
        PublicKey::from_sec1_bytes(data)
            .map_err(|e| CryptoError::InvalidPoint(format!("not on curve: {e}")))?;

        let mut encoded = [0u8; COMPRESSED_POINT_SIZE];
        encoded.copy_from_slice(data);
        Ok(Self { encoded })
    }

    /// Decodes a point from its hex representation.
    pub fn from_hex(s: &str) -> Result<Self> {
        let bytes = hex::decode(s)?;
        Self::decode(&bytes)
    }

    /// Decodes a point from its base64 representation.
    pub fn from_base64(s: &str) -> Result<Self> {
        let bytes = base64::engine::general_purpose::STANDARD.decode(s)?;
        Self::decode(&bytes)
    }

    /// The compressed encoding of this point.
    pub fn as_bytes(&self) -> &[u8; COMPRESSED_POINT_SIZE] {
        &self.encoded
    }

    /// The compressed encoding as a vector.
    pub fn to_vec(&self) -> Vec<u8> {
        self.encoded.to_vec()
    }

    /// Hex representation of the compressed encoding.
    pub fn to_hex_string(&self) -> String {
        hex::encode(self.encoded)
    }

    /// Base64 representation of the compressed encoding.
    pub fn to_base64(&self) -> String {
        base64::engine::general_purpose::STANDARD.encode(self.encoded)
    }
}

impl Ord for ECPoint {
    fn cmp(&self, other: &Self) -> Ordering {
        self.encoded.cmp(&other.encoded)
    }
}

impl PartialOrd for ECPoint {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Debug for ECPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ECPoint({})", self.to_hex_string())
    }
}

impl fmt::Display for ECPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex_string())
    }
}

impl Serialize for ECPoint {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex_string())
    }
}

impl<'de> Deserialize<'de> for ECPoint {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}
