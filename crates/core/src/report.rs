//! Operator-facing result records.
//!
//! Every workflow step produces one of these instead of printing or
//! aborting: a success flag, a human-readable message, and on failure an
//! error detail. Batch steps also carry per-item counts.

use serde_json::Value;

use crate::types::RecordId;

/// Result of a write step (bulk update or fixed-field write).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateReport {
    pub success: bool,
    pub message: String,
    pub updated: usize,
    pub failed: usize,
    pub errors: Vec<String>,
    /// Ids whose write the server confirmed.
    pub updated_ids: Vec<RecordId>,
}

impl UpdateReport {
    /// A report for input rejected before any server call.
    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            ..Default::default()
        }
    }

    pub fn record_success(&mut self, ids: &[RecordId]) {
        self.updated += ids.len();
        self.updated_ids.extend_from_slice(ids);
    }

    pub fn record_failure(&mut self, count: usize, error: impl Into<String>) {
        self.failed += count;
        self.errors.push(error.into());
    }

    /// Set `success` and the summary message from the counts.
    pub fn finish(mut self) -> Self {
        self.success = self.failed == 0;
        self.message = if self.success {
            format!("Updated {} record(s)", self.updated)
        } else {
            format!(
                "Updated {} record(s), {} failed",
                self.updated, self.failed
            )
        };
        self
    }
}

/// Result of invoking a single server-side business method.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodOutcome {
    pub success: bool,
    pub record_id: RecordId,
    pub message: String,
    /// Raw return value of the method on success; `None` when the method
    /// returned nothing.
    pub result: Option<Value>,
    /// Error detail on failure.
    pub error: Option<String>,
}

impl MethodOutcome {
    pub fn succeeded(record_id: RecordId, message: impl Into<String>, result: Value) -> Self {
        Self {
            success: true,
            record_id,
            message: message.into(),
            result: (!result.is_null()).then_some(result),
            error: None,
        }
    }

    pub fn failed(record_id: RecordId, message: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            success: false,
            record_id,
            message: message.into(),
            result: None,
            error: Some(error.into()),
        }
    }
}
