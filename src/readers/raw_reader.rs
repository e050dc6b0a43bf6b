use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::error::{ProcessingError, Result};
use crate::models::{CellValue, Dataset, DatasetKey, Row};

/// Parses one raw extractor file (CSV or JSON) into a `Dataset`.
///
/// Schemas are not trusted: cells are typed individually and unknown columns
/// pass through untouched. Nested JSON objects are flattened with `.`-joined
/// keys, the same shape the extractor produces when it normalizes API
/// responses into CSV.
pub struct RawReader;

impl RawReader {
    pub fn new() -> Self {
        Self
    }

    /// Read a raw file, dispatching on its extension.
    pub fn read_dataset(&self, path: &Path, key: DatasetKey) -> Result<Dataset> {
        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");

        let (columns, rows) = match extension {
            "csv" => self.read_csv(path)?,
            "json" => self.read_json(path)?,
            other => {
                return Err(ProcessingError::InvalidFormat(format!(
                    "Unsupported raw file extension '{}': {}",
                    other,
                    path.display()
                )))
            }
        };

        Ok(Dataset::from_rows(key, columns, rows))
    }

    fn read_csv(&self, path: &Path) -> Result<(Vec<String>, Vec<Row>)> {
        let mut reader = csv::ReaderBuilder::new().flexible(true).from_path(path)?;

        let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        let mut columns: Vec<String> = Vec::with_capacity(headers.len());
        for header in &headers {
            if !columns.contains(header) {
                columns.push(header.clone());
            }
        }

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            let mut row: Row = HashMap::with_capacity(headers.len());
            for (header, field) in headers.iter().zip(record.iter()) {
                row.insert(header.clone(), CellValue::from_csv_field(field));
            }
            rows.push(row);
        }

        Ok((columns, rows))
    }

    fn read_json(&self, path: &Path) -> Result<(Vec<String>, Vec<Row>)> {
        let file = File::open(path)?;
        let value: serde_json::Value = serde_json::from_reader(BufReader::new(file))?;

        let records = extract_record_array(&value).ok_or_else(|| {
            ProcessingError::InvalidFormat(format!(
                "JSON file is not a record array: {}",
                path.display()
            ))
        })?;

        let mut columns: Vec<String> = Vec::new();
        let mut rows = Vec::new();

        for record in records {
            let serde_json::Value::Object(object) = record else {
                tracing::warn!("Skipping non-object JSON record in {}", path.display());
                continue;
            };

            let mut row: Row = HashMap::new();
            flatten_object("", object, &mut row, &mut columns);
            rows.push(row);
        }

        Ok((columns, rows))
    }
}

impl Default for RawReader {
    fn default() -> Self {
        Self::new()
    }
}

/// Locate the record array in a raw JSON payload. The extractor saves either
/// a bare array or the whole API response with records under `results` or
/// `data`.
fn extract_record_array(value: &serde_json::Value) -> Option<&Vec<serde_json::Value>> {
    match value {
        serde_json::Value::Array(records) => Some(records),
        serde_json::Value::Object(object) => ["results", "data"]
            .iter()
            .find_map(|field| object.get(*field).and_then(|v| v.as_array())),
        _ => None,
    }
}

/// Flatten a JSON object into a row, joining nested keys with `.` so the
/// cleaner's dot-to-underscore normalization applies uniformly to both
/// input formats.
fn flatten_object(
    prefix: &str,
    object: &serde_json::Map<String, serde_json::Value>,
    row: &mut Row,
    columns: &mut Vec<String>,
) {
    for (field, value) in object {
        let name = if prefix.is_empty() {
            field.clone()
        } else {
            format!("{prefix}.{field}")
        };

        if let serde_json::Value::Object(nested) = value {
            flatten_object(&name, nested, row, columns);
        } else {
            if !columns.contains(&name) {
                columns.push(name.clone());
            }
            row.insert(name, CellValue::from_json_value(value));
        }
    }
}
