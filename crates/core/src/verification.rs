//! Post-write verification: compare re-fetched records against the values
//! that were just written.

use std::collections::HashMap;

use serde_json::Value;

use crate::relation::Many2One;
use crate::types::{is_truthy, Record, RecordId};

/// Result of comparing one field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldCheck {
    pub matches: bool,
    /// The actual value as it was compared (truthiness for booleans, the
    /// id component for relationship pairs).
    pub compared: Value,
}

/// Counts and messages for a verification pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VerificationReport {
    pub verified: usize,
    pub failed: usize,
    pub errors: Vec<String>,
}

impl VerificationReport {
    pub fn is_clean(&self) -> bool {
        self.failed == 0 && self.errors.is_empty()
    }
}

/// Compare one field's actual value against the expected one.
///
/// * expected boolean: compare by truthiness, missing/null reads as false;
/// * actual relationship pair `[id, label]` against a scalar: compare the
///   id only;
/// * anything else: equality, with numbers compared numerically.
pub fn compare_field(expected: &Value, actual: Option<&Value>) -> FieldCheck {
    let null = Value::Null;
    let actual = actual.unwrap_or(&null);

    if let Value::Bool(expected) = expected {
        let truthy = is_truthy(actual);
        return FieldCheck {
            matches: truthy == *expected,
            compared: Value::Bool(truthy),
        };
    }

    let compared = if expected.is_array() {
        actual
    } else {
        Many2One::id_of(actual).unwrap_or(actual)
    };
    FieldCheck {
        matches: values_equal(compared, expected),
        compared: compared.clone(),
    }
}

fn values_equal(actual: &Value, expected: &Value) -> bool {
    match (actual, expected) {
        (Value::Number(a), Value::Number(b)) => match (a.as_i64(), b.as_i64()) {
            (Some(a), Some(b)) => a == b,
            _ => a.as_f64() == b.as_f64(),
        },
        _ => actual == expected,
    }
}

/// Verify that every id in `ids` now carries the `expected` values.
///
/// `records` is the re-fetched data; a record absent from it counts as
/// failed. `label` names the record kind in messages (e.g. `Picking`).
pub fn verify_records(
    label: &str,
    ids: &[RecordId],
    expected: &Record,
    records: &[Record],
) -> VerificationReport {
    let by_id: HashMap<RecordId, &Record> = records
        .iter()
        .filter_map(|r| r.get("id").and_then(Value::as_i64).map(|id| (id, r)))
        .collect();

    let mut report = VerificationReport::default();

    for &id in ids {
        let Some(record) = by_id.get(&id) else {
            report.failed += 1;
            report.errors.push(format!("{label} {id} not found"));
            continue;
        };

        let mut all_match = true;
        for (field, expected_value) in expected {
            let check = compare_field(expected_value, record.get(field));
            if !check.matches {
                all_match = false;
                report.errors.push(format!(
                    "{label} {id}: {field} = {} (expected {expected_value})",
                    check.compared
                ));
            }
        }

        if all_match {
            tracing::info!(record_id = id, "Verified {label} {id}");
            report.verified += 1;
        } else {
            tracing::warn!(record_id = id, "Verification failed for {label} {id}");
            report.failed += 1;
        }
    }

    report
}
