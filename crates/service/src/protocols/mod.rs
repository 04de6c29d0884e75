//! Protocol registry mapping URI schemes to fetchers.

pub mod https;

use crate::{Result, Settings};
use async_trait::async_trait;
use oracle_core::OracleResponseCode;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;
use url::Url;

pub use https::HttpsProtocol;

/// A fetcher capability for one URI scheme.
#[async_trait]
pub trait OracleProtocol: Send + Sync {
    /// Resolves the URI to a response code and an optional textual body.
    ///
    /// Expected failures (timeouts, status codes, policy rejections) are
    /// reported through the code; `Err` is reserved for faults inside the
    /// protocol itself and is mapped to [`OracleResponseCode::Error`] by
    /// the registry.
    async fn process(&self, uri: &Url) -> Result<(OracleResponseCode, Option<String>)>;
}

/// A static mapping from lowercase URI scheme to protocol.
pub struct ProtocolRegistry {
    protocols: HashMap<String, Arc<dyn OracleProtocol>>,
}

impl ProtocolRegistry {
    /// Creates a registry with the standard protocol set.
    pub fn new(settings: &Settings) -> Self {
        let mut registry = Self {
            protocols: HashMap::new(),
        };
        registry.register("https", Arc::new(HttpsProtocol::new(settings)));
        registry
    }

    /// Creates an empty registry.
    pub fn empty() -> Self {
        Self {
            protocols: HashMap::new(),
        }
    }

    /// Registers a protocol under a scheme.
    pub fn register(&mut self, scheme: &str, protocol: Arc<dyn OracleProtocol>) {
        self.protocols.insert(scheme.to_lowercase(), protocol);
    }

    /// Resolves a request URL through the protocol for its scheme.
    ///
    /// Never fails: malformed URLs, unknown schemes and protocol faults all
    /// collapse into a response code.
    pub async fn process(&self, url: &str) -> (OracleResponseCode, Option<String>) {
        let Ok(uri) = Url::parse(url) else {
            return (OracleResponseCode::Error, None);
        };
        let Some(protocol) = self.protocols.get(uri.scheme()) else {
            return (OracleResponseCode::ProtocolNotSupported, None);
        };
        match protocol.process(&uri).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!("protocol fault for {url}: {e}");
                (OracleResponseCode::Error, None)
            }
        }
    }
}
