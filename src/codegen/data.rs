//! Bulk data loading and dumping for `NEW`, `LOAD`, and `SAVE`.

use std::path::Path;

use serde_json::Value;

use crate::error::{KestrelError, Result};
use crate::store::Row;

/// Infers the entity type from the first record's `type` field when the
/// statement did not name one explicitly (`NEW var = [{...}]` with no
/// `AS type`).
pub fn infer_entity_type(data: &Value) -> Result<String> {
    let first = data
        .as_array()
        .and_then(|rows| rows.first())
        .ok_or_else(|| KestrelError::Internal("NEW/LOAD given no records to infer a type from".into()))?;
    first
        .get("type")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| KestrelError::Internal("record has no 'type' field and none was given".into()))
}

/// Converts a JSON array of STIX-object-ish records into the row shape
/// the store trait consumes.
pub fn load_data(data: &Value) -> Result<Vec<Row>> {
    let array = data
        .as_array()
        .ok_or_else(|| KestrelError::Internal("NEW/LOAD data must be a JSON array".into()))?;
    array
        .iter()
        .map(|v| {
            v.as_object()
                .cloned()
                .map(|o| o.into_iter().collect())
                .ok_or_else(|| KestrelError::Internal("NEW/LOAD record must be a JSON object".into()))
        })
        .collect()
}

/// Reads and parses a `LOAD`'s backing file.
pub fn load_data_file(path: &Path) -> Result<Value> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| KestrelError::Internal(format!("reading '{}': {e}", path.display())))?;
    serde_json::from_str(&text)
        .map_err(|e| KestrelError::Internal(format!("parsing '{}': {e}", path.display())))
}

/// Writes `SAVE`'s rows back out as JSON.
pub fn dump_data_to_file(path: &Path, rows: &[Row]) -> Result<()> {
    let value: Vec<Value> = rows.iter().map(|r| Value::Object(r.clone().into_iter().collect())).collect();
    let text = serde_json::to_string_pretty(&value)
        .map_err(|e| KestrelError::Internal(format!("serializing rows: {e}")))?;
    std::fs::write(path, text).map_err(|e| KestrelError::Internal(format!("writing '{}': {e}", path.display())))
}
