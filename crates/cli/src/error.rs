use std::path::PathBuf;

use stockline_core::error::CoreError;
use stockline_rpc::RpcError;

/// Errors that abort a workflow before it can produce a report.
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error(transparent)]
    Rpc(#[from] RpcError),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Operator input that cannot be turned into a request.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

pub type WorkflowResult<T> = Result<T, WorkflowError>;
