// Copyright (C) 2015-2025 The Neo Project.
//
// witness.rs file belongs to the neo project and is free
// software distributed under the MIT software license, see the
// accompanying file LICENSE in the main directory of the
// repository or http://www.opensource.org/licenses/mit-license.php
// for more details.
//
// Redistribution and use in source and binary forms with or without
// modifications are permitted.

//! Implementation of Witness for transactions.

use crate::io::{var_size, BinaryWriter, MemoryReader, Serializable};
use crate::{Result, UInt160};
use serde::{Deserialize, Serialize};

/// Maximum size of an invocation script in bytes.
/// Sized for a committee-scale multisig: 21 signatures of 66 bytes each.
const MAX_INVOCATION_SCRIPT: usize = 1024;

/// Maximum size of a verification script in bytes.
const MAX_VERIFICATION_SCRIPT: usize = 1024;

/// A witness of a verifiable object.
///
/// The invocation script pushes arguments (signatures); the verification
/// script is the contract code that consumes them.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Witness {
    /// The invocation script of the witness.
    pub invocation_script: Vec<u8>,

    /// The verification script of the witness. Empty for deployed contracts.
    pub verification_script: Vec<u8>,
}

impl Witness {
    /// Creates a witness with the given scripts.
    pub fn new_with_scripts(invocation_script: Vec<u8>, verification_script: Vec<u8>) -> Self {
        Self {
            invocation_script,
            verification_script,
        }
    }

    /// Creates a witness with empty invocation and verification scripts.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The hash of the verification script.
    pub fn script_hash(&self) -> UInt160 {
        UInt160::from_script(&self.verification_script)
    }
}

impl Serializable for Witness {
    fn size(&self) -> usize {
        var_size(self.invocation_script.len())
            + self.invocation_script.len()
            + var_size(self.verification_script.len())
            + self.verification_script.len()
    }

    fn serialize(&self, writer: &mut BinaryWriter) {
        writer.write_var_bytes(&self.invocation_script);
        writer.write_var_bytes(&self.verification_script);
    }

    fn deserialize(reader: &mut MemoryReader) -> Result<Self> {
        let invocation_script = reader.read_var_bytes(MAX_INVOCATION_SCRIPT)?;
        let verification_script = reader.read_var_bytes(MAX_VERIFICATION_SCRIPT)?;
        Ok(Self {
            invocation_script,
            verification_script,
        })
    }
}
