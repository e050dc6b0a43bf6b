use serde::{Deserialize, Serialize};

/// A single cell of a raw or processed dataset.
///
/// Raw files arrive with inconsistent schemas, so cells are typed at parse
/// time rather than per column. Missing, empty, and NaN-like inputs all
/// collapse to `Null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Null,
    Bool(bool),
    Integer(i64),
    Number(f64),
    Text(String),
}

/// Markers treated as missing when reading CSV fields.
const MISSING_MARKERS: [&str; 5] = ["", "nan", "NaN", "null", "NA"];

impl CellValue {
    /// Parse a raw CSV field into a typed cell.
    ///
    /// Integers are preferred over floats so that identifier-like columns
    /// survive a round trip without gaining a fractional part.
    pub fn from_csv_field(field: &str) -> Self {
        let trimmed = field.trim();

        if MISSING_MARKERS.contains(&trimmed) {
            return CellValue::Null;
        }

        if let Ok(i) = trimmed.parse::<i64>() {
            return CellValue::Integer(i);
        }

        if let Ok(f) = trimmed.parse::<f64>() {
            if f.is_nan() {
                return CellValue::Null;
            }
            return CellValue::Number(f);
        }

        CellValue::Text(trimmed.to_string())
    }

    /// Convert a JSON scalar into a cell. Arrays and objects are stored as
    /// their JSON text since the pipeline preserves but never interprets them.
    pub fn from_json_value(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => CellValue::Null,
            serde_json::Value::Bool(b) => CellValue::Bool(*b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    CellValue::Integer(i)
                } else {
                    n.as_f64().map(CellValue::Number).unwrap_or(CellValue::Null)
                }
            }
            serde_json::Value::String(s) => CellValue::Text(s.clone()),
            other => CellValue::Text(other.to_string()),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// Numeric view of the cell. Text is deliberately not parsed here: a
    /// column holding text is treated as non-numeric, matching the imputation
    /// and outlier rules.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Integer(i) => Some(*i as f64),
            CellValue::Number(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Render the cell as a CSV field. Nulls serialize as empty fields.
    pub fn to_csv_field(&self) -> String {
        match self {
            CellValue::Null => String::new(),
            CellValue::Bool(b) => b.to_string(),
            CellValue::Integer(i) => i.to_string(),
            CellValue::Number(f) => f.to_string(),
            CellValue::Text(s) => s.clone(),
        }
    }

    pub fn to_json_value(&self) -> serde_json::Value {
        match self {
            CellValue::Null => serde_json::Value::Null,
            CellValue::Bool(b) => serde_json::Value::Bool(*b),
            CellValue::Integer(i) => serde_json::Value::Number((*i).into()),
            CellValue::Number(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            CellValue::Text(s) => serde_json::Value::String(s.clone()),
        }
    }
}

impl std::fmt::Display for CellValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_csv_field())
    }
}
