use stockline_core::types::RecordId;

use crate::envelope::RemoteError;

/// Errors from the transport and client layers.
#[derive(Debug, thiserror::Error)]
pub enum RpcError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("Connection error: {0}")]
    Connection(#[from] reqwest::Error),

    /// The server returned a non-2xx status code.
    #[error("HTTP error ({status}): {body}")]
    Protocol {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The response body was not a JSON-RPC envelope.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// The server answered with a JSON-RPC `error` object.
    #[error("JSON-RPC error: {0}")]
    Remote(RemoteError),

    /// The session expired, re-authentication succeeded, and the retried
    /// request still failed.
    #[error("JSON-RPC error after re-auth: {0}")]
    RemoteAfterReauth(RemoteError),

    /// The session expired and logging in again failed.
    #[error("JSON-RPC error: {message} - Failed to re-authenticate: {source}")]
    ReauthFailed {
        message: String,
        #[source]
        source: Box<RpcError>,
    },

    /// Login was rejected.
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// A model call was attempted before `authenticate()`.
    #[error("Not authenticated. Call authenticate() first.")]
    NotAuthenticated,

    /// A caller-side contract was violated before any request was sent.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// `read` found no record with the requested id.
    #[error("Record {id} not found in model {model}")]
    NotFound { model: String, id: RecordId },
}

impl RpcError {
    /// Whether the server itself reported the failure, including the
    /// session-expiry retry outcomes.
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            Self::Remote(_) | Self::RemoteAfterReauth(_) | Self::ReauthFailed { .. }
        )
    }
}

pub type RpcResult<T> = Result<T, RpcError>;
