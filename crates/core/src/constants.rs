// Copyright (C) 2015-2025 The Neo Project.
//
// constants.rs file belongs to the neo project and is free
// software distributed under the MIT software license, see the
// accompanying file LICENSE in the main directory of the
// repository or http://www.opensource.org/licenses/mit-license.php
// for more details.
//
// Redistribution and use in source and binary forms with or without
// modifications are permitted.

//! Chain constants the oracle service depends on.

use crate::UInt160;

/// A response transaction expires this many blocks after the block that
/// carried the original request (one day at 15s blocks).
pub const MAX_VALID_UNTIL_BLOCK_INCREMENT: u32 = 5760;

/// Storage-order bytes of the native Oracle contract hash
/// (0xfe924b7cfe89ddd271abaf7210a80a7e11178758).
const ORACLE_CONTRACT_HASH_BYTES: [u8; 20] = [
    0x58, 0x87, 0x17, 0x11, 0x7e, 0x0a, 0xa8, 0x10, 0x72, 0xaf, 0xab, 0x71, 0xd2, 0xdd, 0x89,
    0xfe, 0x7c, 0x4b, 0x92, 0xfe,
];

/// The native Oracle contract account.
pub const ORACLE_CONTRACT_HASH: UInt160 = UInt160::from_array(ORACLE_CONTRACT_HASH_BYTES);
