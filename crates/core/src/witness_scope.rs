// Copyright (C) 2015-2025 The Neo Project.
//
// witness_scope.rs file belongs to the neo project and is free
// software distributed under the MIT software license, see the
// accompanying file LICENSE in the main directory of the
// repository or http://www.opensource.org/licenses/mit-license.php
// for more details.
//
// Redistribution and use in source and binary forms with or without
// modifications are permitted.

//! Witness scope flags restricting where a signature is valid.

use crate::{CoreError, Result};
use serde::{Deserialize, Serialize};

/// The scope of a transaction witness, encoded as a flag byte.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WitnessScope(u8);

impl WitnessScope {
    /// The signature is only valid for fee payment; no contract may consume it.
    pub const NONE: WitnessScope = WitnessScope(0x00);

    /// The signature is valid for the entry script only.
    pub const CALLED_BY_ENTRY: WitnessScope = WitnessScope(0x01);

    /// The signature is valid for the contracts listed by the signer.
    pub const CUSTOM_CONTRACTS: WitnessScope = WitnessScope(0x10);

    /// The signature is valid everywhere.
    pub const GLOBAL: WitnessScope = WitnessScope(0x80);

    /// Decodes a scope byte, rejecting undefined flag bits.
    pub fn from_byte(value: u8) -> Result<Self> {
        if value & !0x91 != 0 {
            return Err(CoreError::InvalidFormat(format!(
                "undefined witness scope bits: {value:#04x}"
            )));
        }
        Ok(Self(value))
    }

    /// The encoded flag byte.
    pub fn bits(&self) -> u8 {
        self.0
    }

    /// Checks whether all bits of `flag` are set.
    pub fn has_flag(&self, flag: WitnessScope) -> bool {
        self.0 & flag.0 == flag.0 && (flag.0 != 0 || self.0 == 0)
    }
}
