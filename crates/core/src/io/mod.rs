// Copyright (C) 2015-2025 The Neo Project.
//
// mod.rs file belongs to the neo project and is free
// software distributed under the MIT software license, see the
// accompanying file LICENSE in the main directory of the
// repository or http://www.opensource.org/licenses/mit-license.php
// for more details.
//
// Redistribution and use in source and binary forms with or without
// modifications are permitted.

//! Binary serialization for the chain wire format.

pub mod binary_writer;
pub mod memory_reader;
pub mod serializable;

pub use binary_writer::BinaryWriter;
pub use memory_reader::MemoryReader;
pub use serializable::{var_size, Serializable};
