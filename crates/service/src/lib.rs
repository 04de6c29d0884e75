//! Oracle node service.
//!
//! A distributed agent run by each designated oracle: it discovers pending
//! oracle requests on chain, fetches the requested URL, filters the result,
//! deterministically builds a response transaction, exchanges partial
//! signatures with the other designated oracles and relays the transaction
//! once the signing threshold is reached.

pub mod builder;
pub mod chain;
pub mod error;
pub mod filter;
pub mod protocols;
pub mod rpc;
pub mod service;
pub mod settings;

pub use chain::{ChainSnapshot, OracleChain};
pub use error::{OracleError, Result, RPC_ERROR_CODE};
pub use protocols::{OracleProtocol, ProtocolRegistry};
pub use rpc::OracleRpcServer;
pub use service::{signature_message, OracleService, OracleStatus, REFRESH_INTERVAL_MS};
pub use settings::Settings;
