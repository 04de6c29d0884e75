// Copyright (C) 2015-2025 The Neo Project.
//
// oracle_request.rs file belongs to the neo project and is free
// software distributed under the MIT software license, see the
// accompanying file LICENSE in the main directory of the
// repository or http://www.opensource.org/licenses/mit-license.php
// for more details.
//
// Redistribution and use in source and binary forms with or without
// modifications are permitted.

use crate::{UInt160, UInt256};
use serde::{Deserialize, Serialize};

/// An oracle request as recorded on chain. Immutable once observed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OracleRequest {
    /// Hash of the transaction that created the request.
    pub original_tx_id: UInt256,

    /// Gas reserved for executing the response, in datoshi.
    pub gas_for_response: u64,

    /// The URL to fetch.
    pub url: String,

    /// Result-selection expression applied to the fetched body.
    pub filter: Option<String>,

    /// The contract to call back with the result.
    pub callback_contract: UInt160,

    /// The method to call back.
    pub callback_method: String,

    /// Opaque user data forwarded into the callback.
    pub user_data: Vec<u8>,
}
