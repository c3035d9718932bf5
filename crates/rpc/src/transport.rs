//! HTTP transport for the JSON-RPC endpoints.
//!
//! [`Transport`] is the single seam between the client and the network:
//! post one envelope, get one decoded envelope back. [`HttpTransport`]
//! implements it with [`reqwest`], keeping the server's session cookie in
//! a jar that is replayed on every request.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::cookie::Jar;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};

use crate::envelope::{RpcRequest, RpcResponse};
use crate::error::RpcError;

/// Default per-request timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Posts JSON-RPC envelopes to a server.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send `request` to `endpoint` (a path such as `/web/dataset/call_kw`)
    /// and decode the response envelope.
    ///
    /// Fails with [`RpcError::Connection`] on network errors,
    /// [`RpcError::Protocol`] on non-2xx statuses and
    /// [`RpcError::InvalidResponse`] when the body is not an envelope. A
    /// JSON-RPC `error` member is *not* a transport failure; it is
    /// returned inside the [`RpcResponse`].
    async fn post(&self, endpoint: &str, request: &RpcRequest) -> Result<RpcResponse, RpcError>;
}

/// reqwest-backed transport for one server.
///
/// The client owns a cookie jar, so the session cookie set at login is
/// replayed on every later request.
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    /// Create a transport for a server.
    ///
    /// * `base_url` - server root, e.g. `http://localhost:8018`; a trailing
    ///   slash is ignored.
    /// * `timeout`  - applied to every request.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, RpcError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .cookie_provider(Arc::new(Jar::default()))
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Server root URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // ---- private helpers ----

    /// Ensure the response has a success status code. Returns the
    /// response unchanged on success, or a [`RpcError::Protocol`]
    /// containing the status and body text on failure.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, RpcError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(RpcError::Protocol {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    /// Decode a successful body into an envelope.
    async fn parse_response(response: reqwest::Response) -> Result<RpcResponse, RpcError> {
        let response = Self::ensure_success(response).await?;
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            RpcError::InvalidResponse(format!("{e}; body: {}", truncate(&body, 200)))
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post(&self, endpoint: &str, request: &RpcRequest) -> Result<RpcResponse, RpcError> {
        let url = format!("{}{}", self.base_url, endpoint);
        tracing::debug!(%url, request_id = request.id, "Posting JSON-RPC request");

        let response = self.client.post(url).json(request).send().await?;

        Self::parse_response(response).await
    }
}

fn truncate(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_is_trimmed() {
        let transport = HttpTransport::new("http://localhost:8018/", DEFAULT_REQUEST_TIMEOUT).unwrap();
        assert_eq!(transport.base_url(), "http://localhost:8018");
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate("héllo", 2), "hé");
        assert_eq!(truncate("abc", 10), "abc");
    }
}
