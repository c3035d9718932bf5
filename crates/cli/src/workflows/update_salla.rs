//! Trigger the storefront sync on a picking.

use serde_json::json;
use stockline_core::report::MethodOutcome;
use stockline_core::stock::MODEL_STOCK_PICKING;
use stockline_core::types::RecordId;
use stockline_rpc::{Kwargs, OdooClient};

/// Call `update_salla` on `picking_id`. Failures are reported in the
/// outcome rather than returned.
pub async fn call_update_salla(client: &mut OdooClient, picking_id: RecordId) -> MethodOutcome {
    match client
        .call_method(
            MODEL_STOCK_PICKING,
            "update_salla",
            vec![json!(picking_id)],
            Kwargs::new(),
        )
        .await
    {
        Ok(result) => {
            tracing::info!(picking_id, "update_salla succeeded");
            MethodOutcome::succeeded(
                picking_id,
                format!("Successfully called update_salla on picking {picking_id}"),
                result,
            )
        }
        Err(e) => {
            tracing::error!(picking_id, error = %e, "update_salla failed");
            MethodOutcome::failed(
                picking_id,
                format!("Failed to call update_salla on picking {picking_id}: {e}"),
                e.to_string(),
            )
        }
    }
}
