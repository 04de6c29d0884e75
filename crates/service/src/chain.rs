//! The blockchain collaborator surface.
//!
//! The service never owns ledger state. It reads committed state through
//! [`ChainSnapshot`] and hands finished transactions to [`OracleChain::relay`]
//! without awaiting acknowledgment, the way the node's mempool inbox is
//! told about new transactions.

use oracle_core::{OracleRequest, Transaction, UInt256};
use oracle_cryptography::ECPoint;
use std::sync::Arc;

/// The blockchain node as seen by the oracle service.
pub trait OracleChain: Send + Sync {
    /// Opens a read snapshot of committed state.
    fn snapshot(&self) -> Arc<dyn ChainSnapshot>;

    /// Submits a fully signed transaction to the mempool. Fire-and-forget.
    fn relay(&self, tx: Transaction);

    /// The network magic prefixed to transaction sign data.
    fn network_magic(&self) -> u32;
}

/// A consistent read view of committed chain state.
pub trait ChainSnapshot: Send + Sync {
    /// The current block height.
    fn height(&self) -> u32;

    /// The designated oracle public keys effective at the given height.
    fn designated_oracles(&self, height: u32) -> Vec<ECPoint>;

    /// All oracle requests not yet answered, with their ids.
    fn pending_requests(&self) -> Vec<(u64, OracleRequest)>;

    /// Looks up a single oracle request by id.
    fn request(&self, id: u64) -> Option<OracleRequest>;

    /// The height of the block that contains the given transaction.
    fn transaction_height(&self, hash: &UInt256) -> Option<u32>;

    /// The execution fee factor from chain policy.
    fn exec_fee_factor(&self) -> u32;

    /// The per-byte network fee from chain policy.
    fn fee_per_byte(&self) -> i64;

    /// Runs the native Oracle contract's `verify` method against the
    /// transaction under a verification engine over a cloned snapshot.
    /// Returns the gas consumed when the engine halts, `None` on fault.
    fn verify_response_fee(&self, tx: &Transaction) -> Option<i64>;
}
