use crate::domain::error::{AppError, Result};
use crate::domain::test_case::{GenerationMode, ResultSet, TestCaseRecord};

/// Pretty-printed array of record objects.
pub fn write_json(result_set: &ResultSet) -> Result<String> {
    serde_json::to_string_pretty(&result_set.records)
        .map_err(|e| AppError::ExportError(format!("Failed to encode JSON: {}", e)))
}

/// Parse a JSON export. The record shape is taken from the first record, or
/// from `empty_mode` when the array is empty.
pub fn read_json(content: &str, empty_mode: GenerationMode) -> Result<ResultSet> {
    let records: Vec<TestCaseRecord> = serde_json::from_str(content)
        .map_err(|e| AppError::ParseError(format!("Failed to parse JSON export: {}", e)))?;

    let mode = records
        .first()
        .map(|record| record.fields.mode())
        .unwrap_or(empty_mode);

    if let Some(position) = records.iter().position(|record| record.fields.mode() != mode) {
        return Err(AppError::ParseError(format!(
            "JSON record {} does not match the {} result shape",
            position + 1,
            mode.as_str()
        )));
    }

    Ok(ResultSet::new(mode, records))
}
