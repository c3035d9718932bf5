//! Fetch a picking and its moves into a snapshot.

use stockline_core::stock::{
    decode, PickingSnapshot, StockMove, StockPicking, MODEL_STOCK_MOVE, MODEL_STOCK_PICKING,
    STOCK_MOVE_FIELDS, STOCK_PICKING_FIELDS,
};
use stockline_core::types::{Domain, RecordId};
use stockline_rpc::OdooClient;

use crate::error::WorkflowResult;

/// Read `picking_id` and its moves, whitelisted fields only.
///
/// Moves come from a single `search_read` over the picking's move ids; a
/// picking without moves makes no second request.
pub async fn fetch_picking(
    client: &mut OdooClient,
    picking_id: RecordId,
) -> WorkflowResult<PickingSnapshot> {
    let record = client
        .read(MODEL_STOCK_PICKING, picking_id, STOCK_PICKING_FIELDS)
        .await?;
    let picking: StockPicking = decode(MODEL_STOCK_PICKING, record)?;

    let moves = if picking.move_ids_without_package.is_empty() {
        Vec::new()
    } else {
        let domain = Domain::ids(&picking.move_ids_without_package);
        client
            .search_read(MODEL_STOCK_MOVE, &domain, STOCK_MOVE_FIELDS)
            .await?
            .into_iter()
            .map(|record| decode::<StockMove>(MODEL_STOCK_MOVE, record))
            .collect::<Result<Vec<_>, _>>()?
    };

    tracing::info!(picking_id, moves = moves.len(), "Fetched picking");
    Ok(PickingSnapshot::new(picking, moves))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::{json, Number};
    use stockline_rpc::testing::{logged_in, ScriptedTransport};
    use stockline_rpc::RpcError;

    use crate::error::WorkflowError;

    #[tokio::test]
    async fn reads_picking_then_moves_in_one_search() {
        let transport = ScriptedTransport::new();
        let mut client = logged_in(&transport).await;
        transport.push_result(json!([{
            "id": 108080,
            "name": "WH/OUT/00042",
            "state": "assigned",
            "origin": false,
            "location_id": [8, "WH/Stock"],
            "move_ids_without_package": [501, 502],
            "salla_order_status_id": false,
        }]));
        transport.push_result(json!([
            {"id": 501, "product_id": [7, "Desk"], "product_qty": 2.0, "product_uom_qty": 2.0},
            {"id": 502, "product_id": [9, "Lamp"], "product_qty": 1, "product_uom_qty": 1},
        ]));

        let snapshot = fetch_picking(&mut client, 108080).await.unwrap();

        let calls = transport.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].method(), Some("read"));
        assert_eq!(calls[0].request.params["args"], json!([[108080]]));
        assert_eq!(
            calls[0].request.params["kwargs"]["fields"],
            json!(STOCK_PICKING_FIELDS)
        );
        assert_eq!(calls[1].method(), Some("search_read"));
        assert_eq!(
            calls[1].request.params["args"],
            json!([[["id", "in", [501, 502]]]])
        );
        assert_eq!(
            calls[1].request.params["kwargs"]["fields"],
            json!(STOCK_MOVE_FIELDS)
        );

        let picking = &snapshot.stock_picking;
        assert_eq!(snapshot.file_name(), "stock_picking_108080.json");
        assert_eq!(picking.name.as_deref(), Some("WH/OUT/00042"));
        assert_eq!(picking.origin, None);
        assert_eq!(picking.move_ids, vec![501, 502]);
        assert_eq!(picking.moves.len(), 2);
        assert_eq!(picking.moves[1].product_qty, Some(Number::from(1u64)));
    }

    #[tokio::test]
    async fn picking_without_moves_skips_move_search() {
        let transport = ScriptedTransport::new();
        let mut client = logged_in(&transport).await;
        transport.push_result(json!([{"id": 7, "name": "WH/IN/1", "move_ids_without_package": []}]));

        let snapshot = fetch_picking(&mut client, 7).await.unwrap();

        assert_eq!(transport.calls().len(), 1);
        assert!(snapshot.stock_picking.moves.is_empty());
    }

    #[tokio::test]
    async fn missing_picking_is_not_found() {
        let transport = ScriptedTransport::new();
        let mut client = logged_in(&transport).await;
        transport.push_result(json!([]));

        let result = fetch_picking(&mut client, 999).await;

        assert_matches!(
            result,
            Err(WorkflowError::Rpc(RpcError::NotFound { id: 999, .. }))
        );
    }
}
