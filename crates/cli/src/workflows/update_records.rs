//! Bulk updates loaded from a JSON file.

use std::path::Path;

use serde_json::Value;
use stockline_core::update_batch::UpdateRequest;

use crate::error::{WorkflowError, WorkflowResult};

/// Parse a JSON array of `{"id": .., field: value, ..}` objects.
pub fn parse_updates(text: &str, path: &Path) -> WorkflowResult<Vec<UpdateRequest>> {
    let value: Value = serde_json::from_str(text).map_err(|source| WorkflowError::Json {
        path: path.to_path_buf(),
        source,
    })?;

    let Value::Array(items) = value else {
        return Err(WorkflowError::InvalidInput(format!(
            "{} must contain a JSON array of update objects",
            path.display()
        )));
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| match item {
            Value::Object(record) => Ok(UpdateRequest::from_record(record)),
            other => Err(WorkflowError::InvalidInput(format!(
                "update #{index} in {} is not an object: {other}",
                path.display()
            ))),
        })
        .collect()
}

/// Read and parse the update file at `path`.
pub fn load_updates(path: &Path) -> WorkflowResult<Vec<UpdateRequest>> {
    let text = std::fs::read_to_string(path).map_err(|source| WorkflowError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_updates(&text, path)
}
