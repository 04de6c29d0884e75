//! HTTPS fetcher.
//!
//! One GET per request under a single wall-clock budget. The budget covers
//! DNS, connect, headers and body read together; a response that arrives in
//! pieces does not get to stretch it.

use super::OracleProtocol;
use crate::{Result, Settings};
use async_trait::async_trait;
use oracle_core::OracleResponseCode;
use reqwest::header::CONTENT_TYPE;
use std::net::IpAddr;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// HTTPS protocol implementation.
pub struct HttpsProtocol {
    client: reqwest::Client,
    timeout: Duration,
    allow_private_host: bool,
    allowed_content_types: Vec<String>,
}

impl HttpsProtocol {
    /// Creates the fetcher from service settings.
    pub fn new(settings: &Settings) -> Self {
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::limited(2))
            .user_agent("OracleService")
            .build()
            .unwrap_or_default();
        Self {
            client,
            timeout: Duration::from_millis(settings.https_timeout_ms),
            allow_private_host: settings.allow_private_host,
            allowed_content_types: settings.allowed_content_types.clone(),
        }
    }

    async fn fetch(&self, uri: &Url) -> (OracleResponseCode, Option<String>) {
        if !self.allow_private_host {
            let Some(host) = uri.host_str() else {
                return (OracleResponseCode::Error, None);
            };
            let port = uri.port_or_known_default().unwrap_or(443);
            let resolved = match tokio::net::lookup_host((host, port)).await {
                Ok(addrs) => addrs.collect::<Vec<_>>(),
                Err(_) => return (OracleResponseCode::Error, None),
            };
            if resolved.iter().any(|addr| is_internal(&addr.ip())) {
                return (OracleResponseCode::Forbidden, None);
            }
        }

        let response = match self.client.get(uri.clone()).send().await {
            Ok(response) => response,
            Err(_) => return (OracleResponseCode::Error, None),
        };

        if response.status().as_u16() == 404 {
            return (OracleResponseCode::NotFound, None);
        }
        if !response.status().is_success() {
            return (OracleResponseCode::Error, None);
        }

        let media_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.split(';').next().unwrap_or("").trim().to_lowercase())
            .unwrap_or_default();
        if !self
            .allowed_content_types
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(&media_type))
        {
            return (OracleResponseCode::ProtocolNotSupported, None);
        }

        let body = match response.bytes().await {
            Ok(bytes) => bytes,
            Err(_) => return (OracleResponseCode::Error, None),
        };
        match String::from_utf8(body.to_vec()) {
            Ok(text) => (OracleResponseCode::Success, Some(text)),
            Err(_) => (OracleResponseCode::Error, None),
        }
    }
}

#[async_trait]
impl OracleProtocol for HttpsProtocol {
    async fn process(&self, uri: &Url) -> Result<(OracleResponseCode, Option<String>)> {
        debug!("Request: {uri}");
        match tokio::time::timeout(self.timeout, self.fetch(uri)).await {
            Ok(outcome) => Ok(outcome),
            Err(_) => Ok((OracleResponseCode::Timeout, None)),
        }
    }
}

/// Whether an address must not be fetched from when private hosts are
/// disallowed: RFC1918, loopback, link-local, ULA and unspecified ranges.
fn is_internal(addr: &IpAddr) -> bool {
    match addr {
        IpAddr::V4(v4) => {
            v4.is_private() || v4.is_loopback() || v4.is_link_local() || v4.is_unspecified()
        }
        IpAddr::V6(v6) => {
            if let Some(mapped) = v6.to_ipv4_mapped() {
                return is_internal(&IpAddr::V4(mapped));
            }
            v6.is_loopback()
                || v6.is_unspecified()
                || (v6.segments()[0] & 0xfe00) == 0xfc00 // ULA fc00::/7
                || (v6.segments()[0] & 0xffc0) == 0xfe80 // link-local fe80::/10
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_internal_ipv4_ranges() {
        for addr in ["10.0.0.1", "172.16.5.5", "192.168.1.1", "127.0.0.1", "169.254.0.1", "0.0.0.0"]
        {
            let ip: IpAddr = addr.parse().unwrap();
            assert!(is_internal(&ip), "{addr} should be internal");
        }
        for addr in ["8.8.8.8", "1.1.1.1", "172.32.0.1"] {
            let ip: IpAddr = addr.parse().unwrap();
            assert!(!is_internal(&ip), "{addr} should be external");
        }
    }

    #[test]
    fn test_internal_ipv6_ranges() {
        for addr in ["::1", "::", "fc00::1", "fd12::1", "fe80::1", "::ffff:10.0.0.1"] {
            let ip: IpAddr = addr.parse().unwrap();
            assert!(is_internal(&ip), "{addr} should be internal");
        }
        let ip: IpAddr = "2001:4860:4860::8888".parse().unwrap();
        assert!(!is_internal(&ip));
    }

    #[tokio::test]
    async fn test_oversized_body_flows_through_to_the_filter() {
        use oracle_core::oracle_response::MAX_RESULT_SIZE;
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        // A document far past the result cap whose filter selects a tiny
        // value. The fetcher must hand the whole body over; the size policy
        // applies to the filtered result, not the raw fetch.
        let payload = format!(
            r#"{{"price": 42, "padding": "{}"}}"#,
            "x".repeat(MAX_RESULT_SIZE + 1)
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let served = payload.clone();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = [0u8; 4096];
            let _ = socket.read(&mut request).await;
            let response = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                served.len(),
                served
            );
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
        });

        let settings = Settings {
            allow_private_host: true,
            ..Settings::default()
        };
        let protocol = HttpsProtocol::new(&settings);
        let uri = Url::parse(&format!("http://127.0.0.1:{port}/data")).unwrap();
        let (code, body) = protocol.process(&uri).await.unwrap();
        assert_eq!(code, OracleResponseCode::Success);
        let body = body.unwrap();
        assert!(body.len() > MAX_RESULT_SIZE);

        let filtered = crate::filter::filter(&body, Some("$.price")).unwrap();
        assert_eq!(filtered, b"[42]");
    }

    #[tokio::test]
    async fn test_timeout_budget_is_wall_clock() {
        // A listener that accepts and then stays silent stalls the TLS
        // handshake; the budget must still cut the whole request off.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            loop {
                let Ok((socket, _)) = listener.accept().await else {
                    break;
                };
                tokio::spawn(async move {
                    tokio::time::sleep(Duration::from_secs(60)).await;
                    drop(socket);
                });
            }
        });

        let settings = Settings {
            https_timeout_ms: 100,
            allow_private_host: true,
            ..Settings::default()
        };
        let protocol = HttpsProtocol::new(&settings);
        let uri = Url::parse(&format!("https://127.0.0.1:{port}/slow")).unwrap();
        let started = std::time::Instant::now();
        let (code, body) = protocol.process(&uri).await.unwrap();
        assert_eq!(code, OracleResponseCode::Timeout);
        assert!(body.is_none());
        assert!(started.elapsed() < Duration::from_secs(5));
    }
}
