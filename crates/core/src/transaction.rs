// Copyright (C) 2015-2025 The Neo Project.
//
// transaction.rs file belongs to the neo project and is free
// software distributed under the MIT software license, see the
// accompanying file LICENSE in the main directory of the
// repository or http://www.opensource.org/licenses/mit-license.php
// for more details.
//
// Redistribution and use in source and binary forms with or without
// modifications are permitted.

//! The transaction model for oracle response transactions.
//!
//! The unsigned serialization defined here is what gets hashed and signed;
//! two nodes that build a response from the same snapshot must produce the
//! same bytes.

use crate::io::{var_size, BinaryWriter, MemoryReader, Serializable};
use crate::{CoreError, OracleResponse, Result, Signer, UInt160, UInt256, Witness};
use oracle_cryptography::{hash, KeyPair};
use serde::{Deserialize, Serialize};

/// The size of a transaction header in bytes.
pub const HEADER_SIZE: usize = 1 +  // version
    4 +  // nonce
    8 +  // system fee
    8 +  // network fee
    4; // valid until block

/// Maximum number of attributes in a transaction.
pub const MAX_TRANSACTION_ATTRIBUTES: usize = 16;

/// Attribute type byte for oracle responses.
const ORACLE_RESPONSE_TYPE: u8 = 0x11;

/// An attribute attached to a transaction.
///
/// The oracle service only ever deals in `OracleResponse` attributes; other
/// chain attribute types never reach it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionAttribute {
    /// Marks the transaction as an oracle response.
    OracleResponse(OracleResponse),
}

impl Serializable for TransactionAttribute {
    fn size(&self) -> usize {
        match self {
            Self::OracleResponse(response) => 1 + response.size(),
        }
    }

    fn serialize(&self, writer: &mut BinaryWriter) {
        match self {
            Self::OracleResponse(response) => {
                writer.write_u8(ORACLE_RESPONSE_TYPE);
                Serializable::serialize(response, writer);
            }
        }
    }

    fn deserialize(reader: &mut MemoryReader) -> Result<Self> {
        let attribute_type = reader.read_u8()?;
        match attribute_type {
            ORACLE_RESPONSE_TYPE => Ok(Self::OracleResponse(
                <OracleResponse as Serializable>::deserialize(reader)?,
            )),
            other => Err(CoreError::InvalidFormat(format!(
                "unsupported attribute type: {other:#04x}"
            ))),
        }
    }
}

/// A chain transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// The version of the transaction.
    pub version: u8,

    /// The nonce of the transaction.
    pub nonce: u32,

    /// The system fee, in datoshi.
    pub system_fee: i64,

    /// The network fee, in datoshi.
    pub network_fee: i64,

    /// The transaction is only valid before this block height.
    pub valid_until_block: u32,

    /// The signers of the transaction.
    pub signers: Vec<Signer>,

    /// The attributes of the transaction.
    pub attributes: Vec<TransactionAttribute>,

    /// The script of the transaction.
    pub script: Vec<u8>,

    /// The witnesses of the transaction, positionally matching `signers`.
    pub witnesses: Vec<Witness>,
}

impl Transaction {
    /// Creates an empty transaction.
    pub fn new() -> Self {
        Self {
            version: 0,
            nonce: 0,
            system_fee: 0,
            network_fee: 0,
            valid_until_block: 0,
            signers: Vec::new(),
            attributes: Vec::new(),
            script: Vec::new(),
            witnesses: Vec::new(),
        }
    }

    /// The hash of the transaction: SHA-256 over the unsigned serialization.
    pub fn hash(&self) -> UInt256 {
        UInt256::from(hash::sha256(&self.unsigned_bytes()))
    }

    /// The bytes that get signed: network magic followed by the hash.
    pub fn sign_data(&self, network_magic: u32) -> Vec<u8> {
        let mut data = Vec::with_capacity(4 + 32);
        data.extend_from_slice(&network_magic.to_le_bytes());
        data.extend_from_slice(self.hash().as_bytes());
        data
    }

    /// Signs the transaction with the given key pair.
    pub fn sign(&self, key_pair: &KeyPair, network_magic: u32) -> Result<[u8; 64]> {
        Ok(key_pair.sign(&self.sign_data(network_magic))?)
    }

    /// The accounts whose witnesses must verify, in signer order.
    pub fn script_hashes_for_verifying(&self) -> Vec<UInt160> {
        self.signers.iter().map(|s| s.account).collect()
    }

    /// Looks up the oracle response attribute, if any.
    pub fn oracle_response(&self) -> Option<&OracleResponse> {
        self.attributes.iter().find_map(|attribute| match attribute {
            TransactionAttribute::OracleResponse(response) => Some(response),
        })
    }

    /// Serializes the unsigned portion (everything but witnesses).
    pub fn serialize_unsigned(&self, writer: &mut BinaryWriter) {
        writer.write_u8(self.version);
        writer.write_u32(self.nonce);
        writer.write_i64(self.system_fee);
        writer.write_i64(self.network_fee);
        writer.write_u32(self.valid_until_block);
        writer.write_var_int(self.signers.len() as u64);
        for signer in &self.signers {
            Serializable::serialize(signer, writer);
        }
        writer.write_var_int(self.attributes.len() as u64);
        for attribute in &self.attributes {
            Serializable::serialize(attribute, writer);
        }
        writer.write_var_bytes(&self.script);
    }

    /// The unsigned serialization as a byte vector.
    pub fn unsigned_bytes(&self) -> Vec<u8> {
        let mut writer = BinaryWriter::with_capacity(self.unsigned_size());
        self.serialize_unsigned(&mut writer);
        writer.into_bytes()
    }

    /// The size of the unsigned serialization.
    pub fn unsigned_size(&self) -> usize {
        HEADER_SIZE
            + var_size(self.signers.len())
            + self.signers.iter().map(Serializable::size).sum::<usize>()
            + self.attributes_size()
            + var_size(self.script.len())
            + self.script.len()
    }

    /// The serialized size of the attribute list, including its count prefix.
    pub fn attributes_size(&self) -> usize {
        var_size(self.attributes.len())
            + self.attributes.iter().map(Serializable::size).sum::<usize>()
    }
}

impl Default for Transaction {
    fn default() -> Self {
        Self::new()
    }
}

impl Serializable for Transaction {
    fn size(&self) -> usize {
        self.unsigned_size()
            + var_size(self.witnesses.len())
            + self.witnesses.iter().map(Serializable::size).sum::<usize>()
    }

    fn serialize(&self, writer: &mut BinaryWriter) {
        self.serialize_unsigned(writer);
        writer.write_var_int(self.witnesses.len() as u64);
        for witness in &self.witnesses {
            Serializable::serialize(witness, writer);
        }
    }

    fn deserialize(reader: &mut MemoryReader) -> Result<Self> {
        let version = reader.read_u8()?;
        if version > 0 {
            return Err(CoreError::InvalidFormat(format!(
                "unsupported transaction version: {version}"
            )));
        }
        let nonce = reader.read_u32()?;
        let system_fee = reader.read_i64()?;
        let network_fee = reader.read_i64()?;
        if system_fee < 0 || network_fee < 0 {
            return Err(CoreError::InvalidFormat("negative fee".to_string()));
        }
        let valid_until_block = reader.read_u32()?;

        let signer_count = reader.read_var_int(16)?;
        let mut signers = Vec::with_capacity(signer_count as usize);
        for _ in 0..signer_count {
            signers.push(<Signer as Serializable>::deserialize(reader)?);
        }

        let attribute_count = reader.read_var_int(MAX_TRANSACTION_ATTRIBUTES as u64)?;
        let mut attributes = Vec::with_capacity(attribute_count as usize);
        for _ in 0..attribute_count {
            attributes.push(<TransactionAttribute as Serializable>::deserialize(reader)?);
        }

        let script = reader.read_var_bytes(u16::MAX as usize)?;

        let witness_count = reader.read_var_int(signer_count)?;
        let mut witnesses = Vec::with_capacity(witness_count as usize);
        for _ in 0..witness_count {
            witnesses.push(<Witness as Serializable>::deserialize(reader)?);
        }

        Ok(Self {
            version,
            nonce,
            system_fee,
            network_fee,
            valid_until_block,
            signers,
            attributes,
            script,
            witnesses,
        })
    }
}
