// Copyright (C) 2015-2025 The Neo Project.
//
// lib.rs file belongs to the neo project and is free
// software distributed under the MIT software license, see the
// accompanying file LICENSE in the main directory of the
// repository or http://www.opensource.org/licenses/mit-license.php
// for more details.
//
// Redistribution and use in source and binary forms with or without
// modifications are permitted.

//! Transaction, witness and oracle payload model for the oracle node service.
//!
//! Everything here serializes to the chain's wire format; response
//! transactions built from the same inputs must be byte-identical across
//! oracle nodes, so the serialization in this crate is the source of truth
//! for what gets signed.

pub mod constants;
pub mod contract;
pub mod error;
pub mod io;
pub mod oracle_request;
pub mod oracle_response;
pub mod oracle_response_code;
pub mod script;
pub mod signer;
pub mod transaction;
pub mod uint160;
pub mod uint256;
pub mod witness;
pub mod witness_scope;

pub use constants::{MAX_VALID_UNTIL_BLOCK_INCREMENT, ORACLE_CONTRACT_HASH};
pub use contract::Contract;
pub use error::{CoreError, Result};
pub use oracle_request::OracleRequest;
pub use oracle_response::{OracleResponse, MAX_RESULT_SIZE};
pub use oracle_response_code::OracleResponseCode;
pub use signer::Signer;
pub use transaction::{Transaction, TransactionAttribute};
pub use uint160::UInt160;
pub use uint256::UInt256;
pub use witness::Witness;
pub use witness_scope::WitnessScope;
