//! Fetch the whole order-status reference table.

use stockline_core::stock::{
    decode, OrderStatus, OrderStatusSnapshot, MODEL_ORDER_STATUS, ORDER_STATUS_FIELDS,
};
use stockline_rpc::OdooClient;

use crate::error::WorkflowResult;

pub async fn fetch_order_statuses(client: &mut OdooClient) -> WorkflowResult<OrderStatusSnapshot> {
    let records = client
        .read_all(MODEL_ORDER_STATUS, ORDER_STATUS_FIELDS, None)
        .await?
        .into_iter()
        .map(|record| decode::<OrderStatus>(MODEL_ORDER_STATUS, record))
        .collect::<Result<Vec<_>, _>>()?;

    tracing::info!(total = records.len(), "Fetched order statuses");
    Ok(OrderStatusSnapshot::new(records))
}
