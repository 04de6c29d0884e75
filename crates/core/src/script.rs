// Copyright (C) 2015-2025 The Neo Project.
//
// script.rs file belongs to the neo project and is free
// software distributed under the MIT software license, see the
// accompanying file LICENSE in the main directory of the
// repository or http://www.opensource.org/licenses/mit-license.php
// for more details.
//
// Redistribution and use in source and binary forms with or without
// modifications are permitted.

//! Minimal script builder for the verification and call scripts the
//! oracle service emits. Only the opcodes those scripts use are defined.

use crate::UInt160;

/// Opcodes used by oracle scripts.
pub mod op_code {
    /// Pushes a 1-byte signed integer.
    pub const PUSHINT8: u8 = 0x00;
    /// Pushes the next `n` bytes, where `n` is a 1-byte operand.
    pub const PUSHDATA1: u8 = 0x0C;
    /// Pushes the number 0.
    pub const PUSH0: u8 = 0x10;
    /// Pushes the number 1; PUSH2..PUSH16 follow contiguously.
    pub const PUSH1: u8 = 0x11;
    /// Calls an interop service by hash.
    pub const SYSCALL: u8 = 0x41;
    /// Pushes an empty array.
    pub const NEWARRAY0: u8 = 0xC2;
}

/// Interop service hashes (first four bytes of the SHA-256 of the name).
pub mod interop {
    /// System.Contract.Call
    pub const SYSTEM_CONTRACT_CALL: u32 = 0x525b7d62;
    /// System.Crypto.CheckSig
    pub const SYSTEM_CRYPTO_CHECK_SIG: u32 = 0x27b3e756;
    /// System.Crypto.CheckMultisig
    pub const SYSTEM_CRYPTO_CHECK_MULTISIG: u32 = 0x3adcd09e;
}

/// Call flags passed to System.Contract.Call. Only `All` is emitted here.
pub const CALL_FLAGS_ALL: i64 = 0b1111;

/// An append-only script builder.
#[derive(Default)]
pub struct ScriptBuilder {
    script: Vec<u8>,
}

impl ScriptBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Emits a bare opcode.
    pub fn emit(&mut self, op: u8) -> &mut Self {
        self.script.push(op);
        self
    }

    /// Emits a small non-negative integer push.
    ///
    /// Values 0..=16 use the single-byte PUSH opcodes; larger values up to
    /// 127 use PUSHINT8. Oracle scripts never need more.
    pub fn emit_push_int(&mut self, value: i64) -> &mut Self {
        match value {
            0 => self.emit(op_code::PUSH0),
            1..=16 => self.emit(op_code::PUSH1 + (value as u8 - 1)),
            17..=127 => {
                self.emit(op_code::PUSHINT8);
                self.script.push(value as u8);
                self
            }
            _ => panic!("script integer out of supported range: {value}"),
        }
    }

    /// Emits a PUSHDATA1 byte-string push. Data must fit a 1-byte length.
    pub fn emit_push_bytes(&mut self, data: &[u8]) -> &mut Self {
        assert!(data.len() <= u8::MAX as usize, "PUSHDATA1 operand too long");
        self.emit(op_code::PUSHDATA1);
        self.script.push(data.len() as u8);
        self.script.extend_from_slice(data);
        self
    }

    /// Emits an interop call.
    pub fn emit_syscall(&mut self, hash: u32) -> &mut Self {
        self.emit(op_code::SYSCALL);
        self.script.extend_from_slice(&hash.to_le_bytes());
        self
    }

    /// Emits a dynamic call of `method` on `script_hash` with no arguments
    /// and full call flags.
    pub fn emit_dynamic_call(&mut self, script_hash: &UInt160, method: &str) -> &mut Self {
        self.emit(op_code::NEWARRAY0);
        self.emit_push_int(CALL_FLAGS_ALL);
        self.emit_push_bytes(method.as_bytes());
        self.emit_push_bytes(script_hash.as_bytes());
        self.emit_syscall(interop::SYSTEM_CONTRACT_CALL)
    }

    /// Consumes the builder, returning the script bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.script.clone()
    }
}
