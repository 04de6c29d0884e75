// Copyright (C) 2015-2025 The Neo Project.
//
// oracle_response.rs file belongs to the neo project and is free
// software distributed under the MIT software license, see the
// accompanying file LICENSE in the main directory of the
// repository or http://www.opensource.org/licenses/mit-license.php
// for more details.
//
// Redistribution and use in source and binary forms with or without
// modifications are permitted.

use crate::io::{var_size, BinaryWriter, MemoryReader, Serializable};
use crate::script::ScriptBuilder;
use crate::{CoreError, OracleResponseCode, Result, ORACLE_CONTRACT_HASH};
use serde::{Deserialize, Serialize};

/// Indicates the maximum size of the Result field.
pub const MAX_RESULT_SIZE: usize = u16::MAX as usize;

/// Indicates that the transaction is an oracle response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OracleResponse {
    /// The ID of the oracle request.
    pub id: u64,

    /// The response code for the oracle request.
    pub code: OracleResponseCode,

    /// The result for the oracle request.
    pub result: Vec<u8>,
}

impl OracleResponse {
    /// Creates a new oracle response attribute.
    pub fn new(id: u64, code: OracleResponseCode, result: Vec<u8>) -> Self {
        Self { id, code, result }
    }

    /// Creates the degenerate response used when oracles cannot agree.
    pub fn consensus_unreachable(id: u64) -> Self {
        Self::new(id, OracleResponseCode::ConsensusUnreachable, Vec::new())
    }

    /// The fixed script every response transaction carries: a dynamic call
    /// of `finish` on the native Oracle contract.
    pub fn fixed_script() -> Vec<u8> {
        let mut sb = ScriptBuilder::new();
        sb.emit_dynamic_call(&ORACLE_CONTRACT_HASH, "finish");
        sb.to_bytes()
    }
}

impl Serializable for OracleResponse {
    fn size(&self) -> usize {
        8 + // id
        1 + // code
        var_size(self.result.len()) + self.result.len()
    }

    fn serialize(&self, writer: &mut BinaryWriter) {
        writer.write_u64(self.id);
        writer.write_u8(self.code as u8);
        writer.write_var_bytes(&self.result);
    }

    fn deserialize(reader: &mut MemoryReader) -> Result<Self> {
        let id = reader.read_u64()?;
        let code_byte = reader.read_u8()?;
        let code = OracleResponseCode::from_byte(code_byte)
            .ok_or_else(|| CoreError::InvalidFormat(format!("invalid response code: {code_byte}")))?;
        let result = reader.read_var_bytes(MAX_RESULT_SIZE)?;
        if code != OracleResponseCode::Success && !result.is_empty() {
            return Err(CoreError::InvalidFormat(
                "non-success response cannot carry a result".to_string(),
            ));
        }
        Ok(Self { id, code, result })
    }
}
