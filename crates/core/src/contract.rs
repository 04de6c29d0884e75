// Copyright (C) 2015-2025 The Neo Project.
//
// contract.rs file belongs to the neo project and is free
// software distributed under the MIT software license, see the
// accompanying file LICENSE in the main directory of the
// repository or http://www.opensource.org/licenses/mit-license.php
// for more details.
//
// Redistribution and use in source and binary forms with or without
// modifications are permitted.

//! Verification contracts for single and multi-signature accounts.

use crate::script::{interop, ScriptBuilder};
use crate::{CoreError, Result, UInt160};
use oracle_cryptography::ECPoint;

/// Execution fee for one signature check, in the engine's price units.
const CHECK_SIG_PRICE: i64 = 1 << 15;
/// Opcode prices from the engine's price table.
const PUSHDATA1_PRICE: i64 = 1 << 3;
const PUSHINT8_PRICE: i64 = 1 << 0;
const SYSCALL_PRICE: i64 = 1 << 15;

/// A verification contract in a wallet: a script plus its hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contract {
    /// The verification script of the contract.
    pub script: Vec<u8>,

    script_hash: UInt160,
}

impl Contract {
    fn from_script(script: Vec<u8>) -> Self {
        let script_hash = UInt160::from_script(&script);
        Self {
            script,
            script_hash,
        }
    }

    /// Creates a standard single-signature contract.
    pub fn create_signature_contract(public_key: &ECPoint) -> Self {
        let mut sb = ScriptBuilder::new();
        sb.emit_push_bytes(public_key.as_bytes());
        sb.emit_syscall(interop::SYSTEM_CRYPTO_CHECK_SIG);
        Self::from_script(sb.to_bytes())
    }

    /// Creates an `m`-of-`n` multi-signature contract.
    ///
    /// Keys are sorted into their canonical ascending order before
    /// emission, so every node derives the same script from the same set.
    pub fn create_multi_sig_contract(m: usize, public_keys: &[ECPoint]) -> Result<Self> {
        if m == 0 || m > public_keys.len() {
            return Err(CoreError::InvalidData(format!(
                "invalid signature threshold {m} for {} keys",
                public_keys.len()
            )));
        }
        if public_keys.len() > 127 {
            return Err(CoreError::InvalidData(
                "too many public keys for a multi-signature contract".to_string(),
            ));
        }

        let mut sorted = public_keys.to_vec();
        sorted.sort();

        let mut sb = ScriptBuilder::new();
        sb.emit_push_int(m as i64);
        for key in &sorted {
            sb.emit_push_bytes(key.as_bytes());
        }
        sb.emit_push_int(sorted.len() as i64);
        sb.emit_syscall(interop::SYSTEM_CRYPTO_CHECK_MULTISIG);
        Ok(Self::from_script(sb.to_bytes()))
    }

    /// Gets the script hash of the contract.
    pub fn script_hash(&self) -> UInt160 {
        self.script_hash
    }
}

/// Execution cost of verifying an `m`-of-`n` multi-signature witness.
pub fn multisig_contract_cost(m: usize, n: usize) -> i64 {
    PUSHDATA1_PRICE * (m + n) as i64
        + PUSHINT8_PRICE * 2
        + SYSCALL_PRICE
        + CHECK_SIG_PRICE * n as i64
}

/// The oracle signing threshold for a designated set of size `n`:
/// `m = n - (n - 1) / 3`.
pub fn oracle_threshold(n: usize) -> usize {
    n - (n - 1) / 3
}
