//! JSON-RPC 2.0 request and response envelopes.
//!
//! Every request uses the protocol-level method `"call"`; what actually
//! runs on the server is selected by the endpoint path and the `params`
//! object.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Login endpoint, params `{db, login, password}`.
pub const ENDPOINT_AUTHENTICATE: &str = "/web/session/authenticate";

/// Generic model-method endpoint, params `{model, method, args, kwargs, context}`.
pub const ENDPOINT_CALL_KW: &str = "/web/dataset/call_kw";

/// Substring the server puts in the error message or debug payload when
/// the session cookie is no longer valid.
pub const SESSION_EXPIRED_MARKER: &str = "Session expired";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RpcRequest {
    pub jsonrpc: &'static str,
    pub method: &'static str,
    pub params: Value,
    pub id: u64,
}

impl RpcRequest {
    pub fn call(id: u64, params: Value) -> Self {
        Self {
            jsonrpc: "2.0",
            method: "call",
            params,
            id,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RpcResponse {
    /// `None` only when the member is absent; a present `null` is kept.
    #[serde(default, deserialize_with = "present")]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<RemoteError>,
}

impl RpcResponse {
    pub fn success(result: Value) -> Self {
        Self {
            result: Some(result),
            error: None,
        }
    }

    pub fn failure(error: RemoteError) -> Self {
        Self {
            result: None,
            error: Some(error),
        }
    }

    /// Split into the result payload or the server's error.
    ///
    /// A missing result becomes an empty object; an explicit `null` (a
    /// method that returns nothing) stays `null`.
    pub fn into_result(self) -> Result<Value, RemoteError> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(self
                .result
                .unwrap_or_else(|| Value::Object(Default::default()))),
        }
    }
}

// `Option<Value>` alone would read `null` as `None`.
fn present<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Value>, D::Error> {
    Value::deserialize(deserializer).map(Some)
}

/// The `error` member of a failed response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteError {
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default = "RemoteError::default_message")]
    pub message: String,
    /// Server debug payload (exception name, traceback, ...).
    #[serde(default)]
    pub data: Value,
}

impl RemoteError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
            data: Value::Null,
        }
    }

    fn default_message() -> String {
        "Unknown error".to_string()
    }

    pub fn is_session_expired(&self) -> bool {
        self.message.contains(SESSION_EXPIRED_MARKER)
            || self.data.to_string().contains(SESSION_EXPIRED_MARKER)
    }
}

impl fmt::Display for RemoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.data.is_null() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{} - {}", self.message, self.data)
        }
    }
}
