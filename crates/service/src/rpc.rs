//! Peer signature exchange.
//!
//! Inbound: a JSON-RPC POST endpoint accepting `submitoracleresponse` from
//! peer oracles. Outbound: fire-and-forget POSTs of the same envelope to
//! every configured peer.

use crate::service::OracleService;
use crate::{OracleError, Result, RPC_ERROR_CODE};
use base64::Engine;
use oracle_cryptography::ECPoint;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};
use warp::Filter;

/// Peer responses are read up to this many bytes, then discarded.
const MAX_PEER_RESPONSE_SIZE: usize = u16::MAX as usize;

/// JSON-RPC 2.0 request envelope.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RpcRequest {
    pub jsonrpc: String,
    pub method: String,
    pub params: Option<Value>,
    pub id: Option<Value>,
}

/// JSON-RPC 2.0 response envelope.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RpcResponse {
    pub jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
    pub id: Option<Value>,
}

impl RpcResponse {
    /// Creates a success response.
    pub fn success(result: Value, id: Option<Value>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            result: Some(result),
            error: None,
            id,
        }
    }

    /// Creates an error response.
    pub fn error(code: i32, message: &str, id: Option<Value>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            result: None,
            error: Some(RpcError {
                code,
                message: message.to_string(),
            }),
            id,
        }
    }
}

/// JSON-RPC error object.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RpcError {
    pub code: i32,
    pub message: String,
}

/// The inbound signature endpoint.
pub struct OracleRpcServer {
    service: Arc<OracleService>,
    bind_address: String,
    port: u16,
}

impl OracleRpcServer {
    /// Creates the endpoint for a service.
    pub fn new(service: Arc<OracleService>, bind_address: String, port: u16) -> Self {
        Self {
            service,
            bind_address,
            port,
        }
    }

    /// Serves until the shutdown channel fires.
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) -> Result<()> {
        let addr: SocketAddr = format!("{}:{}", self.bind_address, self.port)
            .parse()
            .map_err(|e| OracleError::InvalidConfiguration(format!("bind address: {e}")))?;

        let service = self.service;
        let route = warp::post()
            .and(warp::path::end())
            .and(warp::body::json())
            .and_then(move |request: RpcRequest| {
                let service = service.clone();
                async move {
                    let response = handle_request(&service, request);
                    Ok::<_, warp::Rejection>(warp::reply::json(&response))
                }
            });

        let (bound, server) = warp::serve(route).bind_with_graceful_shutdown(addr, async move {
            let _ = shutdown.recv().await;
        });
        info!("Oracle RPC endpoint listening on {bound}");
        server.await;
        Ok(())
    }
}

fn handle_request(service: &OracleService, request: RpcRequest) -> RpcResponse {
    match request.method.as_str() {
        "submitoracleresponse" => match submit_oracle_response(service, request.params.as_ref()) {
            Ok(()) => RpcResponse::success(json!({}), request.id),
            Err(OracleError::InvalidParams(message)) => {
                RpcResponse::error(-32602, &message, request.id)
            }
            Err(e) => RpcResponse::error(RPC_ERROR_CODE, &e.to_string(), request.id),
        },
        _ => RpcResponse::error(-32601, "Method not found", request.id),
    }
}

fn submit_oracle_response(service: &OracleService, params: Option<&Value>) -> Result<()> {
    let params = params
        .and_then(Value::as_array)
        .ok_or_else(|| OracleError::InvalidParams("expected a parameter array".to_string()))?;
    if params.len() != 4 {
        return Err(OracleError::InvalidParams(format!(
            "expected 4 parameters, got {}",
            params.len()
        )));
    }

    let oracle_pub = params[0]
        .as_str()
        .ok_or_else(|| OracleError::InvalidParams("public key must be a string".to_string()))
        .and_then(|s| {
            ECPoint::from_base64(s)
                .map_err(|e| OracleError::InvalidParams(format!("public key: {e}")))
        })?;
    let request_id = params[1]
        .as_u64()
        .ok_or_else(|| OracleError::InvalidParams("request id must be a number".to_string()))?;
    let tx_sign = decode_base64(&params[2], "transaction signature")?;
    let msg_sign = decode_base64(&params[3], "message signature")?;

    debug!("submitoracleresponse: id {request_id}, pubkey {oracle_pub}");
    service.submit_oracle_response(&oracle_pub, request_id, &tx_sign, &msg_sign)
}

fn decode_base64(value: &Value, what: &str) -> Result<Vec<u8>> {
    value
        .as_str()
        .ok_or_else(|| OracleError::InvalidParams(format!("{what} must be a string")))
        .and_then(|s| {
            base64::engine::general_purpose::STANDARD
                .decode(s)
                .map_err(|e| OracleError::InvalidParams(format!("{what}: {e}")))
        })
}

/// Builds the outbound `submitoracleresponse` envelope.
pub(crate) fn signature_envelope(
    id: u64,
    oracle_pub: &ECPoint,
    request_id: u64,
    tx_sign: &[u8],
    msg_sign: &[u8],
) -> Value {
    json!({
        "id": id,
        "jsonrpc": "2.0",
        "method": "submitoracleresponse",
        "params": [
            oracle_pub.to_base64(),
            request_id,
            base64::engine::general_purpose::STANDARD.encode(tx_sign),
            base64::engine::general_purpose::STANDARD.encode(msg_sign),
        ],
    })
}

/// Posts an envelope to one peer on its own task. Failures are logged and
/// left to the janitor's re-gossip pass; the response body is read up to
/// [`MAX_PEER_RESPONSE_SIZE`] bytes and discarded.
pub(crate) fn post_to_peer(client: reqwest::Client, url: String, envelope: Value) {
    tokio::spawn(async move {
        match client.post(&url).json(&envelope).send().await {
            Ok(mut response) => {
                let mut received = 0usize;
                while let Ok(Some(chunk)) = response.chunk().await {
                    received += chunk.len();
                    if received >= MAX_PEER_RESPONSE_SIZE {
                        break;
                    }
                }
                debug!("sent response signature to {url}");
            }
            Err(e) => warn!("Failed to send the response signature to {url}: {e}"),
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_shape() {
        let key = oracle_cryptography::KeyPair::generate();
        let envelope = signature_envelope(3, &key.public_key(), 42, &[1u8; 64], &[2u8; 64]);
        assert_eq!(envelope["jsonrpc"], "2.0");
        assert_eq!(envelope["method"], "submitoracleresponse");
        assert_eq!(envelope["id"], 3);
        let params = envelope["params"].as_array().unwrap();
        assert_eq!(params.len(), 4);
        assert_eq!(params[1], 42);
        assert_eq!(
            ECPoint::from_base64(params[0].as_str().unwrap()).unwrap(),
            key.public_key()
        );
    }

    #[test]
    fn test_error_response_serialization() {
        let response = RpcResponse::error(RPC_ERROR_CODE, "Invalid sign", Some(json!(1)));
        let text = serde_json::to_string(&response).unwrap();
        assert!(text.contains("\"code\":-100"));
        assert!(text.contains("Invalid sign"));
        assert!(!text.contains("result"));
    }
}
