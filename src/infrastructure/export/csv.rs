use csv::{ReaderBuilder, StringRecord, Trim, WriterBuilder};

use crate::domain::error::{AppError, Result};
use crate::domain::test_case::{
    parse_timestamp, ComplianceTag, FreeformFields, GenerationMode, ResultSet, StructuredFields,
    TestCaseFields, TestCaseRecord, FREEFORM_COLUMNS, STRUCTURED_COLUMNS,
};

/// Header row plus one row per record.
pub fn write_csv(result_set: &ResultSet) -> Result<String> {
    let mut writer = WriterBuilder::new().from_writer(Vec::new());

    writer
        .write_record(result_set.columns())
        .map_err(|e| AppError::ExportError(format!("Failed to write CSV header: {}", e)))?;

    for (index, record) in result_set.records.iter().enumerate() {
        if record.fields.mode() != result_set.mode {
            return Err(AppError::ExportError(format!(
                "Record {} does not match the {} result shape",
                index + 1,
                result_set.mode.as_str()
            )));
        }
        writer
            .write_record(record.cells())
            .map_err(|e| AppError::ExportError(format!("Failed to write CSV row {}: {}", index + 1, e)))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| AppError::ExportError(format!("Failed to flush CSV: {}", e)))?;
    String::from_utf8(bytes).map_err(|e| AppError::ExportError(format!("CSV is not UTF-8: {}", e)))
}

/// Parse a CSV produced by [`write_csv`]. The header decides the record shape.
pub fn read_csv(content: &str) -> Result<ResultSet> {
    let mut reader = ReaderBuilder::new()
        .trim(Trim::None)
        .from_reader(content.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| AppError::ParseError(format!("Failed to read CSV headers: {}", e)))?
        .clone();
    let mode = mode_for_headers(&headers)?;

    let mut records = Vec::new();
    for (index, row) in reader.records().enumerate() {
        let row = row.map_err(|e| {
            AppError::ParseError(format!("Failed to parse CSV row {}: {}", index + 1, e))
        })?;
        records.push(parse_row(mode, index, &row)?);
    }

    Ok(ResultSet::new(mode, records))
}

fn mode_for_headers(headers: &StringRecord) -> Result<GenerationMode> {
    let names: Vec<&str> = headers.iter().collect();
    if names == STRUCTURED_COLUMNS {
        Ok(GenerationMode::Local)
    } else if names == FREEFORM_COLUMNS {
        Ok(GenerationMode::Remote)
    } else {
        Err(AppError::ParseError(format!(
            "Unrecognized CSV header: {}",
            names.join(",")
        )))
    }
}

fn parse_row(mode: GenerationMode, index: usize, row: &StringRecord) -> Result<TestCaseRecord> {
    let cell = |column: usize| -> Result<String> {
        row.get(column).map(str::to_string).ok_or_else(|| {
            AppError::ParseError(format!("CSV row {} is missing column {}", index + 1, column + 1))
        })
    };

    let fields = match mode {
        GenerationMode::Local => {
            let raw_tag = cell(7)?;
            let compliance_tag = ComplianceTag::parse(&raw_tag).ok_or_else(|| {
                AppError::ParseError(format!(
                    "CSV row {} has unknown compliance tag '{}'",
                    index + 1,
                    raw_tag
                ))
            })?;
            TestCaseFields::Structured(StructuredFields {
                title: cell(3)?,
                preconditions: cell(4)?,
                steps: cell(5)?,
                expected_result: cell(6)?,
                compliance_tag,
            })
        }
        GenerationMode::Remote => TestCaseFields::Freeform(FreeformFields { details: cell(3)? }),
    };

    let created_at_column = mode.columns().len() - 1;
    Ok(TestCaseRecord {
        requirement_id: cell(0)?,
        requirement: cell(1)?,
        test_case_id: cell(2)?,
        fields,
        created_at: parse_timestamp(&cell(created_at_column)?)?,
    })
}
