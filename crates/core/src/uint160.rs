// Copyright (C) 2015-2025 The Neo Project.
//
// uint160.rs file belongs to the neo project and is free
// software distributed under the MIT software license, see the
// accompanying file LICENSE in the main directory of the
// repository or http://www.opensource.org/licenses/mit-license.php
// for more details.
//
// Redistribution and use in source and binary forms with or without
// modifications are permitted.

//! Implementation of UInt160, a 160-bit value used for script hashes.

use crate::{CoreError, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Size of a UInt160 in bytes.
pub const UINT160_SIZE: usize = 20;

/// A 160-bit unsigned value, stored little-endian like the chain stores it.
///
/// The hex representation is big-endian with a `0x` prefix, i.e. the byte
/// order is reversed relative to storage.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UInt160 {
    value: [u8; UINT160_SIZE],
}

impl UInt160 {
    /// Creates a zero-valued UInt160.
    pub fn zero() -> Self {
        Self::default()
    }

    /// Checks whether this value is zero.
    pub fn is_zero(&self) -> bool {
        self.value.iter().all(|&b| b == 0)
    }

    /// Creates a UInt160 from a fixed array in storage order.
    pub const fn from_array(value: [u8; UINT160_SIZE]) -> Self {
        Self { value }
    }

    /// Creates a UInt160 from exactly 20 bytes in storage order.
    pub fn from_bytes(value: &[u8]) -> Result<Self> {
        let value: [u8; UINT160_SIZE] = value.try_into().map_err(|_| {
            CoreError::InvalidFormat(format!("UInt160 requires {UINT160_SIZE} bytes"))
        })?;
        Ok(Self { value })
    }

    /// Computes the script hash (RIPEMD160 of SHA256) of a verification script.
    pub fn from_script(script: &[u8]) -> Self {
        Self {
            value: oracle_cryptography::hash::hash160(script),
        }
    }

    /// Gets the bytes in storage order.
    pub fn as_bytes(&self) -> &[u8; UINT160_SIZE] {
        &self.value
    }

    /// Copies the bytes in storage order.
    pub fn to_array(&self) -> [u8; UINT160_SIZE] {
        self.value
    }

    /// Parses the `0x`-prefixed big-endian hex representation.
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(s)
            .map_err(|e| CoreError::InvalidFormat(format!("invalid hex: {e}")))?;
        if bytes.len() != UINT160_SIZE {
            return Err(CoreError::InvalidFormat(format!(
                "UInt160 requires {UINT160_SIZE} bytes"
            )));
        }
        let mut value = [0u8; UINT160_SIZE];
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

impl fmt::Debug for UInt160 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UInt160({})", self.to_hex_string())
    }
}

impl fmt::Display for UInt160 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex_string())
    }
}

impl Serialize for UInt160 {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex_string())
    }
}

impl<'de> Deserialize<'de> for UInt160 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}
