//! In-memory chain double backing the service integration tests.

use oracle_core::{OracleRequest, Transaction, UInt160, UInt256};
use oracle_cryptography::ECPoint;
use oracle_service::{ChainSnapshot, OracleChain};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// Network magic of the test chain.
pub const NETWORK_MAGIC: u32 = 860_833_102;

#[derive(Default, Clone)]
struct ChainData {
    height: u32,
    oracles: Vec<ECPoint>,
    requests: HashMap<u64, OracleRequest>,
    tx_heights: HashMap<UInt256, u32>,
}

/// A deterministic, fully in-memory chain collaborator.
pub struct MemoryChain {
    data: Mutex<ChainData>,
    relayed: Mutex<Vec<Transaction>>,
}

impl MemoryChain {
    pub fn new(oracles: Vec<ECPoint>) -> Arc<Self> {
        Arc::new(Self {
            data: Mutex::new(ChainData {
                height: 200,
                oracles,
                ..ChainData::default()
            }),
            relayed: Mutex::new(Vec::new()),
        })
    }

    /// Records a pending oracle request whose originating transaction sits
    /// at height 100.
    pub fn add_request(&self, id: u64, url: &str, filter: Option<&str>, gas_for_response: u64) {
        let original_tx_id =
            UInt256::from(oracle_cryptography::hash::sha256(&id.to_le_bytes()));
        let mut data = self.data.lock();
        data.tx_heights.insert(original_tx_id, 100);
        data.requests.insert(
            id,
            OracleRequest {
                original_tx_id,
                gas_for_response,
                url: url.to_string(),
                filter: filter.map(str::to_string),
                callback_contract: UInt160::from_script(b"consumer"),
                callback_method: "callback".to_string(),
                user_data: Vec::new(),
            },
        );
    }

    /// Replaces the designated oracle set, as a role rotation would.
    pub fn set_oracles(&self, oracles: Vec<ECPoint>) {
        self.data.lock().oracles = oracles;
    }

    /// Everything relayed to the mempool so far.
    pub fn relayed(&self) -> Vec<Transaction> {
        self.relayed.lock().clone()
    }
}

impl OracleChain for MemoryChain {
    fn snapshot(&self) -> Arc<dyn ChainSnapshot> {
        Arc::new(MemorySnapshot {
            data: self.data.lock().clone(),
        })
    }

    fn relay(&self, tx: Transaction) {
        self.relayed.lock().push(tx);
    }

    fn network_magic(&self) -> u32 {
        NETWORK_MAGIC
    }
}

struct MemorySnapshot {
    data: ChainData,
}

impl ChainSnapshot for MemorySnapshot {
    fn height(&self) -> u32 {
        self.data.height
    }

    fn designated_oracles(&self, _height: u32) -> Vec<ECPoint> {
        self.data.oracles.clone()
    }

    fn pending_requests(&self) -> Vec<(u64, OracleRequest)> {
        let mut all: Vec<_> = self
            .data
            .requests
            .iter()
            .map(|(id, request)| (*id, request.clone()))
            .collect();
        all.sort_by_key(|(id, _)| *id);
        all
    }

    fn request(&self, id: u64) -> Option<OracleRequest> {
        self.data.requests.get(&id).cloned()
    }

    fn transaction_height(&self, hash: &UInt256) -> Option<u32> {
        self.data.tx_heights.get(hash).copied()
    }

    fn exec_fee_factor(&self) -> u32 {
        30
    }

    fn fee_per_byte(&self) -> i64 {
        1000
    }

    fn verify_response_fee(&self, _tx: &Transaction) -> Option<i64> {
        Some(1_000_000)
    }
}
