//! Validate a picking, finishing any wizard the server opens on the way.

use serde_json::{json, Value};
use stockline_core::report::MethodOutcome;
use stockline_core::stock::{MODEL_BACKORDER_WIZARD, MODEL_STOCK_PICKING};
use stockline_core::types::{is_truthy, RecordId};
use stockline_rpc::{Kwargs, OdooClient, RpcResult};

const WINDOW_ACTION: &str = "ir.actions.act_window";

/// Context flags sent with every validation call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidateOptions {
    pub skip_sms: bool,
    /// Validate without leaving a backorder for unprocessed quantities.
    pub cancel_backorder: bool,
}

impl Default for ValidateOptions {
    fn default() -> Self {
        Self {
            skip_sms: true,
            cancel_backorder: true,
        }
    }
}

impl ValidateOptions {
    /// `skip_backorder` and `cancel_backorder` both carry the backorder
    /// flag; servers honor one or the other.
    pub fn context(&self) -> Kwargs {
        let mut context = Kwargs::new();
        context.insert("skip_sms".to_string(), json!(self.skip_sms));
        context.insert("skip_backorder".to_string(), json!(self.cancel_backorder));
        context.insert("cancel_backorder".to_string(), json!(self.cancel_backorder));
        context
    }
}

/// A window action returned instead of completing the validation.
#[derive(Debug, PartialEq)]
struct WizardAction {
    res_model: String,
    default_pick_ids: Option<Value>,
}

impl WizardAction {
    fn from_result(result: &Value) -> Option<Self> {
        if result.get("type").and_then(Value::as_str) != Some(WINDOW_ACTION) {
            return None;
        }
        let res_model = result
            .get("res_model")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let default_pick_ids = result
            .get("context")
            .and_then(|c| c.get("default_pick_ids"))
            .filter(|ids| is_truthy(ids))
            .cloned();
        Some(Self {
            res_model,
            default_pick_ids,
        })
    }
}

/// Run `button_validate` on `picking_id` under `options`.
pub async fn validate_picking(
    client: &mut OdooClient,
    picking_id: RecordId,
    options: ValidateOptions,
) -> MethodOutcome {
    match run_validation(client, picking_id, &options.context()).await {
        Ok(result) => {
            tracing::info!(picking_id, "Picking validated");
            MethodOutcome::succeeded(
                picking_id,
                format!("Successfully validated picking {picking_id}"),
                result,
            )
        }
        Err(e) => {
            tracing::error!(picking_id, error = %e, "Validation failed");
            MethodOutcome::failed(
                picking_id,
                format!("Failed to validate picking {picking_id}: {e}"),
                e.to_string(),
            )
        }
    }
}

async fn run_validation(
    client: &mut OdooClient,
    picking_id: RecordId,
    context: &Kwargs,
) -> RpcResult<Value> {
    let result = client
        .call_method_with_context(
            MODEL_STOCK_PICKING,
            "button_validate",
            vec![json!([picking_id])],
            Kwargs::new(),
            context.clone(),
        )
        .await?;

    let Some(wizard) = WizardAction::from_result(&result) else {
        return Ok(result);
    };

    if wizard.res_model == MODEL_BACKORDER_WIZARD {
        let pick_ids = wizard.default_pick_ids.unwrap_or_else(|| json!([picking_id]));
        tracing::info!(picking_id, %pick_ids, "Backorder wizard opened, cancelling backorder");

        let wizard_id = client
            .call_method_with_context(
                MODEL_BACKORDER_WIZARD,
                "create",
                vec![json!({"pick_ids": [[6, 0, pick_ids]]})],
                Kwargs::new(),
                context.clone(),
            )
            .await?;

        client
            .call_method_with_context(
                MODEL_BACKORDER_WIZARD,
                "process_cancel_backorder",
                vec![json!([wizard_id])],
                Kwargs::new(),
                context.clone(),
            )
            .await
    } else {
        tracing::warn!(
            picking_id,
            wizard = %wizard.res_model,
            "Wizard opened, finishing picking directly",
        );
        client
            .call_method_with_context(
                MODEL_STOCK_PICKING,
                "_action_done",
                vec![json!([picking_id])],
                Kwargs::new(),
                context.clone(),
            )
            .await
    }
}
