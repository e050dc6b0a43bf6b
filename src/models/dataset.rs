use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::models::CellValue;
use crate::utils::constants::TWO_WORD_CITIES;

/// One row of a dataset. Rows may omit columns entirely; an absent column
/// carries the same meaning as a `Null` cell.
pub type Row = HashMap<String, CellValue>;

/// Identity of a dataset: one city, one pollutant parameter.
///
/// The composite form `"<city>_<parameter>"` is the key the whole pipeline
/// is organized around, and the prefix/suffix parsing here mirrors the raw
/// filename convention (city words may themselves be underscore-separated).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DatasetKey {
    pub city: String,
    pub parameter: String,
}

impl DatasetKey {
    pub fn new(city: impl Into<String>, parameter: impl Into<String>) -> Self {
        Self {
            city: city.into(),
            parameter: parameter.into(),
        }
    }

    pub fn composite(&self) -> String {
        format!("{}_{}", self.city, self.parameter)
    }

    /// Recover a key from its composite string form.
    ///
    /// The city is the prefix before the first underscore, re-joined for the
    /// recognized two-word cities; the parameter is the trailing segment.
    pub fn from_composite(key: &str) -> Self {
        let parameter = key.rsplit('_').next().unwrap_or_default().to_string();
        Self {
            city: city_from_composite(key),
            parameter,
        }
    }
}

impl std::fmt::Display for DatasetKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.composite())
    }
}

/// Extract the city from a composite key, re-joining two-word city names
/// whose words were split by underscores.
pub fn city_from_composite(key: &str) -> String {
    let first = key.split('_').next().unwrap_or(key);

    for (head, tail) in TWO_WORD_CITIES {
        if first == head && key.contains(tail) {
            return format!("{head} {tail}");
        }
    }

    first.to_string()
}

/// An ordered collection of rows sharing one `(city, parameter)` key.
///
/// Columns record first-seen order so artifacts reproduce the source layout;
/// the set of columns is a union over rows and individual rows may be sparse.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dataset {
    key: DatasetKey,
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl Dataset {
    pub fn new(key: DatasetKey) -> Self {
        Self {
            key,
            columns: Vec::new(),
            rows: Vec::new(),
        }
    }

    pub fn from_rows(key: DatasetKey, columns: Vec<String>, rows: Vec<Row>) -> Self {
        Self { key, columns, rows }
    }

    pub fn key(&self) -> &DatasetKey {
        &self.key
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    /// Register a column without touching any rows. No-op if already known.
    pub fn ensure_column(&mut self, name: &str) {
        if !self.has_column(name) {
            self.columns.push(name.to_string());
        }
    }

    /// Rename columns in place, preserving order. Duplicate targets collapse
    /// to the first occurrence.
    pub fn rename_columns(&mut self, rename: impl Fn(&str) -> String) {
        let mut renamed: Vec<String> = Vec::with_capacity(self.columns.len());
        let mut mapping: Vec<(String, String)> = Vec::new();

        for column in &self.columns {
            let new_name = rename(column);
            if !renamed.contains(&new_name) {
                renamed.push(new_name.clone());
            }
            if new_name != *column {
                mapping.push((column.clone(), new_name));
            }
        }

        for row in &mut self.rows {
            for (old, new) in &mapping {
                if let Some(value) = row.remove(old) {
                    row.insert(new.clone(), value);
                }
            }
        }

        self.columns = renamed;
    }

    pub fn push_row(&mut self, row: Row) {
        self.rows.push(row);
    }

    pub fn get(&self, row: usize, column: &str) -> Option<&CellValue> {
        self.rows.get(row).and_then(|r| r.get(column))
    }

    pub fn set(&mut self, row: usize, column: &str, value: CellValue) {
        self.ensure_column(column);
        if let Some(r) = self.rows.get_mut(row) {
            r.insert(column.to_string(), value);
        }
    }

    /// Append a whole column. Shorter value vectors leave trailing rows
    /// untouched (absent cell semantics).
    pub fn append_column(&mut self, name: &str, values: Vec<CellValue>) {
        self.ensure_column(name);
        for (row, value) in self.rows.iter_mut().zip(values) {
            row.insert(name.to_string(), value);
        }
    }

    /// All non-null numeric values of a column, in row order.
    pub fn numeric_values(&self, column: &str) -> Vec<f64> {
        self.rows
            .iter()
            .filter_map(|row| row.get(column).and_then(CellValue::as_f64))
            .collect()
    }

    /// A column is numeric when it has at least one non-null cell and every
    /// non-null cell is an integer or float. Mixed text/number columns count
    /// as non-numeric, the same way an object-dtype column would.
    pub fn is_numeric_column(&self, column: &str) -> bool {
        let mut seen = false;
        for row in &self.rows {
            match row.get(column) {
                None | Some(CellValue::Null) => continue,
                Some(cell) => {
                    if cell.as_f64().is_none() {
                        return false;
                    }
                    seen = true;
                }
            }
        }
        seen
    }
}
