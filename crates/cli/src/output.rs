//! Snapshot files and the operator-facing text reports.
//!
//! Reports go to the writer passed in (stdout in the binary); logs go to
//! stderr through `tracing`, so the two never interleave on one stream.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use stockline_core::report::{MethodOutcome, UpdateReport};
use stockline_core::stock::{OrderStatusSnapshot, PickingSnapshot};
use stockline_core::verification::VerificationReport;

use crate::error::{WorkflowError, WorkflowResult};
use crate::workflows::update_status::StatusUpdateOutcome;

const RULE_WIDTH: usize = 60;

/// Write `snapshot` as pretty-printed UTF-8 JSON to `dir/file_name`,
/// creating `dir` if needed.
pub fn write_snapshot<T: Serialize>(
    dir: &Path,
    file_name: &str,
    snapshot: &T,
) -> WorkflowResult<PathBuf> {
    let path = dir.join(file_name);

    let json = serde_json::to_string_pretty(snapshot).map_err(|source| WorkflowError::Json {
        path: path.clone(),
        source,
    })?;

    fs::create_dir_all(dir).map_err(|source| WorkflowError::Io {
        path: dir.to_path_buf(),
        source,
    })?;
    fs::write(&path, json).map_err(|source| WorkflowError::Io {
        path: path.clone(),
        source,
    })?;

    tracing::info!(path = %path.display(), "Snapshot written");
    Ok(path)
}

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

pub fn banner(out: &mut impl Write, title: &str) -> io::Result<()> {
    rule(out)?;
    writeln!(out, "{title}")?;
    rule(out)
}

pub fn rule(out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "{}", "=".repeat(RULE_WIDTH))
}

pub fn picking_summary(
    out: &mut impl Write,
    snapshot: &PickingSnapshot,
    path: &Path,
) -> io::Result<()> {
    let picking = &snapshot.stock_picking;
    writeln!(out, "Data fetched successfully")?;
    writeln!(out, "   Picking: {}", picking.name.as_deref().unwrap_or("-"))?;
    writeln!(out, "   State: {}", picking.state.as_deref().unwrap_or("-"))?;
    writeln!(out, "   Moves: {}", picking.moves.len())?;
    writeln!(out, "   File: {}", path.display())
}

pub fn order_status_summary(
    out: &mut impl Write,
    snapshot: &OrderStatusSnapshot,
    path: &Path,
) -> io::Result<()> {
    writeln!(out, "Data fetched successfully")?;
    writeln!(out, "   Total Records: {}", snapshot.total_records)?;
    writeln!(out, "   File: {}", path.display())?;

    if let Some(sample) = snapshot.records.first() {
        writeln!(out)?;
        writeln!(out, "Sample Record:")?;
        writeln!(out, "   ID: {}", sample.id)?;
        writeln!(out, "   Name: {}", sample.name.as_deref().unwrap_or("-"))?;
        writeln!(out, "   Slug: {}", sample.slug.as_deref().unwrap_or("-"))?;
    }
    Ok(())
}

pub fn method_outcome(out: &mut impl Write, outcome: &MethodOutcome) -> io::Result<()> {
    if outcome.success {
        writeln!(out, "OK: {}", outcome.message)?;
        match &outcome.result {
            Some(result) => writeln!(out, "   Result: {result}"),
            None => writeln!(out, "   Result: No return value"),
        }
    } else {
        writeln!(out, "FAILED: {}", outcome.message)?;
        writeln!(
            out,
            "   Error: {}",
            outcome.error.as_deref().unwrap_or("Unknown error")
        )
    }
}

pub fn update_report(out: &mut impl Write, report: &UpdateReport) -> io::Result<()> {
    let status = if report.success { "OK" } else { "FAILED" };
    writeln!(out, "{status}: {}", report.message)?;
    writeln!(out, "   Updated: {}", report.updated)?;
    writeln!(out, "   Failed: {}", report.failed)?;
    errors(out, &report.errors)
}

pub fn verification_report(out: &mut impl Write, report: &VerificationReport) -> io::Result<()> {
    writeln!(out, "Verification:")?;
    writeln!(out, "   Verified: {}", report.verified)?;
    writeln!(out, "   Failed: {}", report.failed)?;
    errors(out, &report.errors)
}

pub fn status_update(out: &mut impl Write, outcome: &StatusUpdateOutcome) -> io::Result<()> {
    update_report(out, &outcome.update)?;
    if let Some(verification) = &outcome.verification {
        writeln!(out)?;
        verification_report(out, verification)?;
    }
    Ok(())
}

fn errors(out: &mut impl Write, errors: &[String]) -> io::Result<()> {
    if errors.is_empty() {
        return Ok(());
    }
    writeln!(out, "   Errors:")?;
    for error in errors {
        writeln!(out, "      - {error}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use stockline_core::stock::OrderStatus;

    fn render(f: impl FnOnce(&mut Vec<u8>) -> io::Result<()>) -> String {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn snapshot_is_pretty_utf8_json_in_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("out");
        let snapshot = OrderStatusSnapshot::new(vec![OrderStatus {
            id: 1,
            salla_status_id: Some(566146469),
            name: Some("قيد التنفيذ".to_string()),
            kind: Some("original".to_string()),
            slug: None,
        }]);

        let path = write_snapshot(&nested, OrderStatusSnapshot::FILE_NAME, &snapshot).unwrap();

        assert_eq!(path, nested.join("salla_order_status_all.json"));
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("\n  \"model\": \"salla.order.status\""));
        assert!(text.contains("قيد التنفيذ"));

        let parsed: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed["total_records"], 1);
        assert_eq!(parsed["records"][0]["type"], "original");
        assert_eq!(parsed["records"][0]["slug"], Value::Null);
    }

    #[test]
    fn failed_update_report_lists_errors() {
        let mut report = UpdateReport::default();
        report.record_success(&[1]);
        report.record_failure(1, "Update returned False for IDs: [2]");
        let report = report.finish();

        let text = render(|out| update_report(out, &report));

        assert!(text.starts_with("FAILED: Updated 1 record(s), 1 failed\n"));
        assert!(text.contains("      - Update returned False for IDs: [2]\n"));
    }

    #[test]
    fn method_outcome_shows_result_or_error() {
        let ok = MethodOutcome::succeeded(7, "Successfully validated picking 7", json!(true));
        let failed = MethodOutcome::failed(7, "Failed to validate picking 7: boom", "boom");

        assert!(render(|out| method_outcome(out, &ok)).contains("   Result: true\n"));
        assert!(render(|out| method_outcome(out, &failed)).contains("   Error: boom\n"));
    }

    #[test]
    fn method_without_return_value_says_so() {
        let outcome = MethodOutcome::succeeded(7, "Successfully called update_salla on picking 7", Value::Null);

        assert!(render(|out| method_outcome(out, &outcome)).contains("   Result: No return value\n"));
    }

    #[test]
    fn banner_frames_title() {
        let text = render(|out| banner(out, "Fetch Stock Picking"));
        let rule = "=".repeat(RULE_WIDTH);

        assert_eq!(text, format!("{rule}\nFetch Stock Picking\n{rule}\n"));
    }
}
