//! Bulk update planning.
//!
//! Turns a list of per-record update requests into the minimum number of
//! multi-id writes: requests carrying an identical set of field values
//! are collapsed into one [`UpdateGroup`]. This module only plans; the
//! RPC crate executes the groups. The `core` crate does no I/O; all
//! evaluation is done against data passed in by the caller.

use std::collections::HashMap;

use serde_json::Value;

use crate::stock::MODEL_STOCK_MOVE;
use crate::types::{is_truthy, Record, RecordId};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Key carrying the target record id inside a raw update request.
pub const ID_KEY: &str = "id";

/// On `stock.move`, a `quantity` update is mirrored onto `product_uom_qty`
/// so both quantities stay consistent.
pub const QUANTITY_FIELD: &str = "quantity";
pub const UOM_QUANTITY_FIELD: &str = "product_uom_qty";

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One record's requested changes.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateRequest {
    /// Target record; `None` when the request carried no usable id.
    pub id: Option<RecordId>,
    /// Field values to write, without the id.
    pub values: Record,
}

impl UpdateRequest {
    pub fn new(id: RecordId, values: Record) -> Self {
        Self {
            id: Some(id),
            values,
        }
    }

    /// Split a raw `{id, field: value, ...}` mapping into id and values.
    ///
    /// A missing, falsy, or non-integer id yields `id: None`; the request
    /// is rejected later, during planning.
    pub fn from_record(record: Record) -> Self {
        let id = record
            .get(ID_KEY)
            .filter(|v| is_truthy(v))
            .and_then(Value::as_i64);
        let values = record.into_iter().filter(|(k, _)| k != ID_KEY).collect();
        Self { id, values }
    }

    fn describe(&self) -> String {
        let mut shown = Record::new();
        if let Some(id) = self.id {
            shown.insert(ID_KEY.to_string(), Value::from(id));
        }
        shown.extend(self.values.clone());
        Value::Object(shown).to_string()
    }
}

/// A set of record ids that receive identical field values in one write.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateGroup {
    pub ids: Vec<RecordId>,
    pub values: Record,
}

/// Outcome of planning: the groups to write plus a message for every
/// request rejected before reaching the server.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdatePlan {
    pub groups: Vec<UpdateGroup>,
    pub rejected: Vec<String>,
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

/// Apply the fixed per-model field mappings to every request.
///
/// Only one rule exists: on `stock.move`, `quantity` is copied onto
/// `product_uom_qty`.
pub fn normalize(model: &str, updates: Vec<UpdateRequest>) -> Vec<UpdateRequest> {
    if model != MODEL_STOCK_MOVE {
        return updates;
    }

    updates
        .into_iter()
        .map(|mut update| {
            if let Some(quantity) = update.values.get(QUANTITY_FIELD).cloned() {
                tracing::info!(
                    record_id = ?update.id,
                    %quantity,
                    "Mirroring quantity onto {UOM_QUANTITY_FIELD}",
                );
                update
                    .values
                    .insert(UOM_QUANTITY_FIELD.to_string(), quantity);
            }
            update
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Grouping
// ---------------------------------------------------------------------------

/// Partition requests into write groups.
///
/// Groups appear in the order their value set was first seen and ids keep
/// their input order. Requests without an id, or with nothing to write,
/// are rejected.
pub fn plan_groups(updates: Vec<UpdateRequest>) -> UpdatePlan {
    let mut plan = UpdatePlan::default();
    let mut index_by_key: HashMap<String, usize> = HashMap::new();

    for update in updates {
        let Some(id) = update.id else {
            plan.rejected
                .push(format!("Missing 'id' in update: {}", update.describe()));
            continue;
        };

        if update.values.is_empty() {
            plan.rejected
                .push(format!("No fields to update for record {id}"));
            continue;
        }

        let key = grouping_key(&update.values);
        match index_by_key.get(&key) {
            Some(&index) => plan.groups[index].ids.push(id),
            None => {
                index_by_key.insert(key, plan.groups.len());
                plan.groups.push(UpdateGroup {
                    ids: vec![id],
                    values: update.values,
                });
            }
        }
    }

    plan
}

/// Canonical serialization of a value set: object keys sorted at every
/// level, so field order in the request does not split groups.
pub fn grouping_key(values: &Record) -> String {
    canonicalize(&Value::Object(values.clone())).to_string()
}

fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            Value::Object(
                keys.into_iter()
                    .map(|k| (k.clone(), canonicalize(&map[k])))
                    .collect(),
            )
        }
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        other => other.clone(),
    }
}
