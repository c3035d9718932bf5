//! Typed record shapes for the inventory models the workflows touch.
//!
//! Each model has an explicit field whitelist; every read issued for that
//! model requests exactly these fields, in this order. The shapes decode
//! a whitelisted [`Record`] and re-serialize into the snapshot files.

use serde::{Deserialize, Serialize};
use serde_json::Number;

use crate::error::CoreError;
use crate::relation::{falsy_none, id_list, Many2One};
use crate::types::{Record, RecordId};

// ---------------------------------------------------------------------------
// Model names
// ---------------------------------------------------------------------------

pub const MODEL_STOCK_PICKING: &str = "stock.picking";
pub const MODEL_STOCK_MOVE: &str = "stock.move";
pub const MODEL_ORDER_STATUS: &str = "salla.order.status";
pub const MODEL_BACKORDER_WIZARD: &str = "stock.backorder.confirmation";

// ---------------------------------------------------------------------------
// Field whitelists
// ---------------------------------------------------------------------------

pub const STOCK_PICKING_FIELDS: &[&str] = &[
    "id",
    "name",
    "origin",
    "move_type",
    "state",
    "location_id",
    "location_dest_id",
    "move_ids_without_package",
    "picking_type_id",
    "warehouse_address_id",
    "picking_type_code",
    "partner_id",
    "sale_id",
    "salla_order_status_id",
];

pub const STOCK_MOVE_FIELDS: &[&str] = &[
    "id",
    "product_id",
    "never_product_template_attribute_value_ids",
    "description_picking",
    "product_qty",
    "product_uom_qty",
    "product_uom",
    "product_uom_category_id",
    "product_tmpl_id",
];

pub const ORDER_STATUS_FIELDS: &[&str] = &["id", "salla_status_id", "name", "type", "slug"];

// ---------------------------------------------------------------------------
// Shapes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockPicking {
    pub id: RecordId,
    #[serde(default, deserialize_with = "falsy_none")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "falsy_none")]
    pub origin: Option<String>,
    #[serde(default, deserialize_with = "falsy_none")]
    pub move_type: Option<String>,
    #[serde(default, deserialize_with = "falsy_none")]
    pub state: Option<String>,
    #[serde(default, deserialize_with = "falsy_none")]
    pub location_id: Option<Many2One>,
    #[serde(default, deserialize_with = "falsy_none")]
    pub location_dest_id: Option<Many2One>,
    #[serde(default, deserialize_with = "id_list")]
    pub move_ids_without_package: Vec<RecordId>,
    #[serde(default, deserialize_with = "falsy_none")]
    pub picking_type_id: Option<Many2One>,
    #[serde(default, deserialize_with = "falsy_none")]
    pub warehouse_address_id: Option<Many2One>,
    #[serde(default, deserialize_with = "falsy_none")]
    pub picking_type_code: Option<String>,
    #[serde(default, deserialize_with = "falsy_none")]
    pub partner_id: Option<Many2One>,
    #[serde(default, deserialize_with = "falsy_none")]
    pub sale_id: Option<Many2One>,
    #[serde(default, deserialize_with = "falsy_none")]
    pub salla_order_status_id: Option<Many2One>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockMove {
    pub id: RecordId,
    #[serde(default, deserialize_with = "falsy_none")]
    pub product_id: Option<Many2One>,
    #[serde(default, deserialize_with = "id_list")]
    pub never_product_template_attribute_value_ids: Vec<RecordId>,
    #[serde(default, deserialize_with = "falsy_none")]
    pub description_picking: Option<String>,
    /// Quantities keep the server's number form (`5` stays `5`).
    #[serde(default, deserialize_with = "falsy_none")]
    pub product_qty: Option<Number>,
    #[serde(default, deserialize_with = "falsy_none")]
    pub product_uom_qty: Option<Number>,
    #[serde(default, deserialize_with = "falsy_none")]
    pub product_uom: Option<Many2One>,
    #[serde(default, deserialize_with = "falsy_none")]
    pub product_uom_category_id: Option<Many2One>,
    #[serde(default, deserialize_with = "falsy_none")]
    pub product_tmpl_id: Option<Many2One>,
}

/// A row of the storefront order-status reference table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderStatus {
    pub id: RecordId,
    #[serde(default, deserialize_with = "falsy_none")]
    pub salla_status_id: Option<i64>,
    #[serde(default, deserialize_with = "falsy_none")]
    pub name: Option<String>,
    #[serde(rename = "type", default, deserialize_with = "falsy_none")]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "falsy_none")]
    pub slug: Option<String>,
}

/// Decode a whitelisted record into one of the typed shapes.
pub fn decode<T: serde::de::DeserializeOwned>(
    model: &'static str,
    record: Record,
) -> Result<T, CoreError> {
    serde_json::from_value(serde_json::Value::Object(record))
        .map_err(|source| CoreError::Malformed { model, source })
}

// ---------------------------------------------------------------------------
// Snapshot files
// ---------------------------------------------------------------------------

/// A picking with its moves expanded, as written to `stock_picking_<id>.json`.
#[derive(Debug, Clone, Serialize)]
pub struct PickingGraph {
    pub id: RecordId,
    pub name: Option<String>,
    pub origin: Option<String>,
    pub move_type: Option<String>,
    pub state: Option<String>,
    pub location_id: Option<Many2One>,
    pub location_dest_id: Option<Many2One>,
    pub picking_type_id: Option<Many2One>,
    pub warehouse_address_id: Option<Many2One>,
    pub picking_type_code: Option<String>,
    pub partner_id: Option<Many2One>,
    pub sale_id: Option<Many2One>,
    pub salla_order_status_id: Option<Many2One>,
    pub move_ids: Vec<RecordId>,
    pub moves: Vec<StockMove>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PickingSnapshot {
    pub stock_picking: PickingGraph,
}

impl PickingSnapshot {
    pub fn new(picking: StockPicking, moves: Vec<StockMove>) -> Self {
        Self {
            stock_picking: PickingGraph {
                id: picking.id,
                name: picking.name,
                origin: picking.origin,
                move_type: picking.move_type,
                state: picking.state,
                location_id: picking.location_id,
                location_dest_id: picking.location_dest_id,
                picking_type_id: picking.picking_type_id,
                warehouse_address_id: picking.warehouse_address_id,
                picking_type_code: picking.picking_type_code,
                partner_id: picking.partner_id,
                sale_id: picking.sale_id,
                salla_order_status_id: picking.salla_order_status_id,
                move_ids: picking.move_ids_without_package,
                moves,
            },
        }
    }

    /// File name the snapshot is saved under.
    pub fn file_name(&self) -> String {
        format!("stock_picking_{}.json", self.stock_picking.id)
    }
}

/// The full order-status table, as written to `salla_order_status_all.json`.
#[derive(Debug, Clone, Serialize)]
pub struct OrderStatusSnapshot {
    pub model: &'static str,
    pub total_records: usize,
    pub records: Vec<OrderStatus>,
}

impl OrderStatusSnapshot {
    pub const FILE_NAME: &'static str = "salla_order_status_all.json";

    pub fn new(records: Vec<OrderStatus>) -> Self {
        Self {
            model: MODEL_ORDER_STATUS,
            total_records: records.len(),
            records,
        }
    }
}
