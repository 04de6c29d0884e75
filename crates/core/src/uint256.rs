// Copyright (C) 2015-2025 The Neo Project.
//
// uint256.rs file belongs to the neo project and is free
// software distributed under the MIT software license, see the
// accompanying file LICENSE in the main directory of the
// repository or http://www.opensource.org/licenses/mit-license.php
// for more details.
//
// Redistribution and use in source and binary forms with or without
// modifications are permitted.

//! Implementation of UInt256, a 256-bit value used for transaction hashes.

use crate::{CoreError, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Size of a UInt256 in bytes.
pub const UINT256_SIZE: usize = 32;

/// A 256-bit unsigned value, stored little-endian like the chain stores it.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UInt256 {
    value: [u8; UINT256_SIZE],
}

impl UInt256 {
    /// Creates a zero-valued UInt256.
    pub fn zero() -> Self {
        Self::default()
    }

    /// Checks whether this value is zero.
    pub fn is_zero(&self) -> bool {
        self.value.iter().all(|&b| b == 0)
    }

    /// Creates a UInt256 from exactly 32 bytes in storage order.
    pub fn from_bytes(value: &[u8]) -> Result<Self> {
        let value: [u8; UINT256_SIZE] = value.try_into().map_err(|_| {
            CoreError::InvalidFormat(format!("UInt256 requires {UINT256_SIZE} bytes"))
        })?;
        Ok(Self { value })
    }

    /// Gets the bytes in storage order.
    pub fn as_bytes(&self) -> &[u8; UINT256_SIZE] {
        &self.value
    }

    /// Copies the bytes in storage order.
    pub fn to_array(&self) -> [u8; UINT256_SIZE] {
        self.value
    }

    /// Parses the `0x`-prefixed big-endian hex representation.
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(s)
            .map_err(|e| CoreError::InvalidFormat(format!("invalid hex: {e}")))?;
        if bytes.len() != UINT256_SIZE {
            return Err(CoreError::InvalidFormat(format!(
                "UInt256 requires {UINT256_SIZE} bytes"
            )));
        }
        let mut value = [0u8; UINT256_SIZE];
        for (i, b) in bytes.iter().rev().enumerate() {
            value[i] = *b;
        }
        Ok(Self { value })
    }

    /// Formats as `0x`-prefixed big-endian hex.
    pub fn to_hex_string(&self) -> String {
        let mut reversed = self.value;
        reversed.reverse();
        format!("0x{}", hex::encode(reversed))
    }
}

impl From<[u8; UINT256_SIZE]> for UInt256 {
    fn from(value: [u8; UINT256_SIZE]) -> Self {
        Self { value }
    }
}

impl fmt::Debug for UInt256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UInt256({})", self.to_hex_string())
    }
}

impl fmt::Display for UInt256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex_string())
    }
}

impl Serialize for UInt256 {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex_string())
    }
}

impl<'de> Deserialize<'de> for UInt256 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}
