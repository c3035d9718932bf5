/// Errors from decoding server records into typed shapes.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Malformed {model} record: {source}")]
    Malformed {
        model: &'static str,
        #[source]
        source: serde_json::Error,
    },
}
