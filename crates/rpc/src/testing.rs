//! Scripted transport for tests.
//!
//! [`ScriptedTransport`] answers requests from a queue of canned
//! responses and records everything it was sent, so tests can assert on
//! the exact envelopes without a server.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::client::OdooClient;
use crate::config::ClientConfig;
use crate::envelope::{RemoteError, RpcRequest, RpcResponse, ENDPOINT_AUTHENTICATE, ENDPOINT_CALL_KW};
use crate::error::RpcError;
use crate::transport::Transport;

/// One request as the transport received it.
#[derive(Debug, Clone)]
pub struct SentRequest {
    pub endpoint: String,
    pub request: RpcRequest,
}

impl SentRequest {
    /// The model method named in a `call_kw` request.
    pub fn method(&self) -> Option<&str> {
        self.request.params.get("method").and_then(Value::as_str)
    }
}

#[derive(Default)]
struct Script {
    responses: VecDeque<Result<RpcResponse, RpcError>>,
    sent: Vec<SentRequest>,
}

#[derive(Default)]
pub struct ScriptedTransport {
    script: Mutex<Script>,
}

impl ScriptedTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Queue a successful response carrying `result`.
    pub fn push_result(&self, result: Value) {
        self.push(Ok(RpcResponse::success(result)));
    }

    /// Queue a JSON-RPC error response with `message`.
    pub fn push_error(&self, message: &str) {
        self.push_remote(RemoteError::new(message));
    }

    pub fn push_remote(&self, error: RemoteError) {
        self.push(Ok(RpcResponse::failure(error)));
    }

    /// Queue a successful login answer for `uid`.
    pub fn push_login(&self, uid: i64) {
        self.push_result(json!({"uid": uid, "session_id": format!("session-{uid}")}));
    }

    /// Queue a transport-level failure.
    pub fn push_failure(&self, error: RpcError) {
        self.push(Err(error));
    }

    /// Every request received so far, in order.
    pub fn sent(&self) -> Vec<SentRequest> {
        self.script.lock().expect("script lock").sent.clone()
    }

    /// Requests to the model-call endpoint.
    pub fn calls(&self) -> Vec<SentRequest> {
        self.sent()
            .into_iter()
            .filter(|s| s.endpoint == ENDPOINT_CALL_KW)
            .collect()
    }

    /// Model calls whose method is `method`.
    pub fn calls_to(&self, method: &str) -> Vec<SentRequest> {
        self.calls()
            .into_iter()
            .filter(|s| s.method() == Some(method))
            .collect()
    }

    /// Number of login requests received.
    pub fn logins(&self) -> usize {
        self.sent()
            .iter()
            .filter(|s| s.endpoint == ENDPOINT_AUTHENTICATE)
            .count()
    }

    fn push(&self, response: Result<RpcResponse, RpcError>) {
        self.script
            .lock()
            .expect("script lock")
            .responses
            .push_back(response);
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn post(&self, endpoint: &str, request: &RpcRequest) -> Result<RpcResponse, RpcError> {
        let mut script = self.script.lock().expect("script lock");
        script.sent.push(SentRequest {
            endpoint: endpoint.to_string(),
            request: request.clone(),
        });
        script.responses.pop_front().unwrap_or_else(|| {
            Err(RpcError::InvalidResponse(format!(
                "no scripted response left for {endpoint}"
            )))
        })
    }
}

/// Client settings pointing nowhere; only usable with a scripted transport.
pub fn test_config() -> ClientConfig {
    ClientConfig::new("http://odoo.test", "test_db", "admin", "admin")
}

/// A client that has already logged in through `transport` (uid 2).
pub async fn logged_in(transport: &Arc<ScriptedTransport>) -> OdooClient {
    transport.push_login(2);
    let mut client = OdooClient::with_transport(&test_config(), transport.clone());
    client
        .authenticate()
        .await
        .expect("scripted login succeeds");
    client
}
