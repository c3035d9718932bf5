//! Grouped writes with partial-failure semantics.
//!
//! One failing group never blocks the others: each group's error is
//! recorded in the [`UpdateReport`] and processing moves on.

use stockline_core::report::UpdateReport;
use stockline_core::types::{Record, RecordId};
use stockline_core::update_batch::{normalize, plan_groups, UpdateRequest};

use crate::client::OdooClient;

/// Normalize, group, and write `updates` to `model`, one write per group.
pub async fn bulk_update(
    client: &mut OdooClient,
    model: &str,
    updates: Vec<UpdateRequest>,
) -> UpdateReport {
    if updates.is_empty() {
        return UpdateReport::rejected("No records to update");
    }

    let plan = plan_groups(normalize(model, updates));
    tracing::info!(
        model,
        groups = plan.groups.len(),
        rejected = plan.rejected.len(),
        "Planned bulk update",
    );

    let mut report = UpdateReport::default();
    for rejection in plan.rejected {
        tracing::warn!(model, "{rejection}");
        report.record_failure(1, rejection);
    }

    for group in plan.groups {
        write_group(client, model, &group.ids, &group.values, &mut report).await;
    }

    report.finish()
}

/// Write the same `values` to every id in `ids` with a single call.
pub async fn write_records(
    client: &mut OdooClient,
    model: &str,
    ids: &[RecordId],
    values: &Record,
) -> UpdateReport {
    if values.is_empty() {
        return UpdateReport::rejected("No fields to update");
    }
    if ids.is_empty() {
        return UpdateReport::rejected("No record IDs provided");
    }

    let mut report = UpdateReport::default();
    write_group(client, model, ids, values, &mut report).await;
    report.finish()
}

async fn write_group(
    client: &mut OdooClient,
    model: &str,
    ids: &[RecordId],
    values: &Record,
    report: &mut UpdateReport,
) {
    match client.write_many(model, ids, values).await {
        Ok(true) => {
            tracing::info!(model, count = ids.len(), ?ids, "Updated records");
            report.record_success(ids);
        }
        Ok(false) => {
            tracing::warn!(model, ?ids, "Write was not confirmed by the server");
            report.record_failure(ids.len(), format!("Update returned False for IDs: {ids:?}"));
        }
        Err(e) => {
            tracing::error!(model, ?ids, error = %e, "Write failed");
            report.record_failure(ids.len(), format!("Error updating IDs {ids:?}: {e}"));
        }
    }
}
