// Copyright (C) 2015-2025 The Neo Project.
//
// serializable.rs file belongs to the neo project and is free
// software distributed under the MIT software license, see the
// accompanying file LICENSE in the main directory of the
// repository or http://www.opensource.org/licenses/mit-license.php
// for more details.
//
// Redistribution and use in source and binary forms with or without
// modifications are permitted.

//! The serialization contract shared by all wire-format types.

use super::{BinaryWriter, MemoryReader};
use crate::Result;

/// A type with a canonical binary representation.
pub trait Serializable: Sized {
    /// The serialized size in bytes.
    fn size(&self) -> usize;

    /// Writes the canonical representation.
    fn serialize(&self, writer: &mut BinaryWriter);

    /// Reads the canonical representation.
    fn deserialize(reader: &mut MemoryReader) -> Result<Self>;

    /// Serializes to a fresh byte vector.
    fn to_bytes(&self) -> Vec<u8> {
        let mut writer = BinaryWriter::with_capacity(self.size());
        self.serialize(&mut writer);
        writer.into_bytes()
    }
}

/// The encoded size of a variable-length integer.
pub fn var_size(value: usize) -> usize {
    if value < 0xFD {
        1
    } else if value <= 0xFFFF {
        3
    } else if value <= 0xFFFF_FFFF {
        5
    } else {
        9
    }
}
