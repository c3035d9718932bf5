//! Re-fetch written records and check the server kept the values.

use stockline_core::types::{Domain, Record, RecordId};
use stockline_core::verification::{verify_records, VerificationReport};

use crate::client::OdooClient;

/// Re-read `ids` from `model` in one `search_read` and compare each against
/// `expected`.
///
/// A failed re-fetch counts every id as failed rather than aborting.
pub async fn verify_updates(
    client: &mut OdooClient,
    model: &str,
    label: &str,
    ids: &[RecordId],
    expected: &Record,
) -> VerificationReport {
    if ids.is_empty() {
        return VerificationReport::default();
    }

    let fields: Vec<&str> = expected.keys().map(String::as_str).collect();
    match client.search_read(model, &Domain::ids(ids), &fields).await {
        Ok(records) => verify_records(label, ids, expected, &records),
        Err(e) => {
            tracing::error!(model, error = %e, "Verification fetch failed");
            VerificationReport {
                verified: 0,
                failed: ids.len(),
                errors: vec![format!("Verification error: {e}")],
            }
        }
    }
}
