//! Fixed-field write to pickings followed by a read-back check.

use serde_json::{json, Value};
use stockline_core::report::UpdateReport;
use stockline_core::stock::MODEL_STOCK_PICKING;
use stockline_core::types::{Record, RecordId};
use stockline_core::verification::VerificationReport;
use stockline_rpc::batch::write_records;
use stockline_rpc::verify::verify_updates;
use stockline_rpc::OdooClient;

use crate::error::{WorkflowError, WorkflowResult};

/// Values written when no `--set` is given: mark the order shipped and
/// delivered.
pub fn default_status_values() -> Record {
    let mut values = Record::new();
    values.insert("salla_order_status_id".to_string(), json!(2));
    values.insert("x_studio_delivered".to_string(), json!(true));
    values
}

/// Parse a `field=value` assignment. The value is read as JSON when it
/// parses (`2`, `true`, `[1, 2]`) and as a plain string otherwise.
pub fn parse_assignment(raw: &str) -> WorkflowResult<(String, Value)> {
    let (field, value) = raw
        .split_once('=')
        .ok_or_else(|| WorkflowError::InvalidInput(format!("expected field=value, got {raw:?}")))?;

    let field = field.trim();
    if field.is_empty() {
        return Err(WorkflowError::InvalidInput(format!(
            "missing field name in {raw:?}"
        )));
    }

    let value = value.trim();
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((field.to_string(), value))
}

/// Build the write values from `--set` assignments, falling back to
/// [`default_status_values`] when none are given.
pub fn status_values(assignments: &[String]) -> WorkflowResult<Record> {
    if assignments.is_empty() {
        return Ok(default_status_values());
    }
    assignments
        .iter()
        .map(|raw| parse_assignment(raw))
        .collect()
}

#[derive(Debug, Clone)]
pub struct StatusUpdateOutcome {
    pub update: UpdateReport,
    /// Present only when the write succeeded.
    pub verification: Option<VerificationReport>,
}

impl StatusUpdateOutcome {
    pub fn success(&self) -> bool {
        self.update.success
            && self
                .verification
                .as_ref()
                .map_or(true, VerificationReport::is_clean)
    }
}

/// Write `values` to every picking in `ids` in one call, then re-read them
/// to confirm the server kept the values.
pub async fn update_picking_status(
    client: &mut OdooClient,
    ids: &[RecordId],
    values: &Record,
) -> StatusUpdateOutcome {
    let update = write_records(client, MODEL_STOCK_PICKING, ids, values).await;

    let verification = if update.success {
        Some(verify_updates(client, MODEL_STOCK_PICKING, "Picking", &update.updated_ids, values).await)
    } else {
        tracing::warn!(message = %update.message, "Skipping verification after failed write");
        None
    };

    StatusUpdateOutcome {
        update,
        verification,
    }
}
