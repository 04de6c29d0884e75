// Copyright (C) 2015-2025 The Neo Project.
//
// signer.rs file belongs to the neo project and is free
// software distributed under the MIT software license, see the
// accompanying file LICENSE in the main directory of the
// repository or http://www.opensource.org/licenses/mit-license.php
// for more details.
//
// Redistribution and use in source and binary forms with or without
// modifications are permitted.

//! Implementation of Signer for transactions.

use crate::io::{var_size, BinaryWriter, MemoryReader, Serializable};
use crate::{CoreError, Result, UInt160, WitnessScope};
use serde::{Deserialize, Serialize};

/// Maximum number of allowed contracts per signer.
const MAX_SUBITEMS: usize = 16;

/// A signer of a transaction: who signs and what scope the signature covers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signer {
    /// The account of the signer.
    pub account: UInt160,

    /// The scopes of the witness.
    pub scopes: WitnessScope,

    /// The contracts allowed to consume the witness.
    /// Only serialized when the CustomContracts flag is set.
    pub allowed_contracts: Vec<UInt160>,
}

impl Signer {
    /// Creates a signer with the given scope and no contract restrictions.
    pub fn with_scope(account: UInt160, scopes: WitnessScope) -> Self {
        Self {
            account,
            scopes,
            allowed_contracts: Vec::new(),
        }
    }

    /// Creates a signer restricted to the given contracts.
    pub fn with_allowed_contracts(account: UInt160, allowed_contracts: Vec<UInt160>) -> Self {
        Self {
            account,
            scopes: WitnessScope::CUSTOM_CONTRACTS,
            allowed_contracts,
        }
    }
}

impl Serializable for Signer {
    fn size(&self) -> usize {
        let mut size = 20 + 1;
        if self.scopes.has_flag(WitnessScope::CUSTOM_CONTRACTS) {
            size += var_size(self.allowed_contracts.len()) + self.allowed_contracts.len() * 20;
        }
        size
    }

    fn serialize(&self, writer: &mut BinaryWriter) {
        writer.write_bytes(self.account.as_bytes());
        writer.write_u8(self.scopes.bits());
        if self.scopes.has_flag(WitnessScope::CUSTOM_CONTRACTS) {
            writer.write_var_int(self.allowed_contracts.len() as u64);
            for contract in &self.allowed_contracts {
                writer.write_bytes(contract.as_bytes());
            }
        }
    }

    fn deserialize(reader: &mut MemoryReader) -> Result<Self> {
        let account = UInt160::from_bytes(reader.read_bytes(20)?)?;
        let scopes = WitnessScope::from_byte(reader.read_u8()?)?;
        if scopes.has_flag(WitnessScope::GLOBAL) && scopes.bits() != WitnessScope::GLOBAL.bits() {
            return Err(CoreError::InvalidFormat(
                "global scope cannot combine with other scopes".to_string(),
            ));
        }
        let mut allowed_contracts = Vec::new();
        if scopes.has_flag(WitnessScope::CUSTOM_CONTRACTS) {
            let count = reader.read_var_int(MAX_SUBITEMS as u64)?;
            for _ in 0..count {
                allowed_contracts.push(UInt160::from_bytes(reader.read_bytes(20)?)?);
            }
        }
        Ok(Self {
            account,
            scopes,
            allowed_contracts,
        })
    }
}
