//! Oracle service settings.

use crate::{OracleError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Oracle service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Path to the wallet file. Opening and decrypting the wallet is the
    /// embedder's job; the service only records the path.
    pub wallet: PathBuf,

    /// Peer oracle RPC URLs partial signatures are gossiped to.
    pub nodes: Vec<String>,

    /// Duration after which an unfulfilled task is evicted, in milliseconds.
    pub max_task_timeout_ms: u64,

    /// Whether the HTTPS fetcher may resolve to internal addresses.
    pub allow_private_host: bool,

    /// Media types the HTTPS fetcher accepts.
    pub allowed_content_types: Vec<String>,

    /// Total wall-clock budget per HTTPS request, in milliseconds.
    pub https_timeout_ms: u64,

    /// Whether the service starts with the node.
    pub auto_start: bool,

    /// Bind address of the inbound signature endpoint.
    pub bind_address: String,

    /// Port of the inbound signature endpoint.
    pub port: u16,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            wallet: PathBuf::new(),
            nodes: Vec::new(),
            max_task_timeout_ms: 432_000_000, // 5 days
            allow_private_host: false,
            allowed_content_types: vec!["application/json".to_string()],
            https_timeout_ms: 5000,
            auto_start: false,
            bind_address: "0.0.0.0".to_string(),
            port: 10336,
        }
    }
}

impl Settings {
    /// Loads settings from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| OracleError::InvalidConfiguration(format!("read {path:?}: {e}")))?;
        serde_json::from_str(&content)
            .map_err(|e| OracleError::InvalidConfiguration(format!("parse {path:?}: {e}")))
    }
}
