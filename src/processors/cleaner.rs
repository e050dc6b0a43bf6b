use std::collections::HashMap;

use tracing::{debug, info, warn};

use crate::models::{CellValue, Dataset};
use crate::utils::constants::{
    COL_CITY, COL_PARAMETER, COL_VALUE, DEFAULT_OUTLIER_SIGMA, UNKNOWN_FILL, VALUE_ALTERNATIVES,
};

/// Where a canonical column's content came from during schema resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldSource {
    /// The column was already present in the source
    Existing,
    /// Adopted from a recognized alternative column
    Alternate(String),
    /// Derived from the dataset's composite key
    DatasetKey,
    /// No source could be found; downstream stages degrade per row
    Unresolved,
}

#[derive(Debug, Clone)]
pub struct FieldResolution {
    pub field: &'static str,
    pub source: FieldSource,
}

/// Per-dataset record of every repair the cleaner performed. Repairs are
/// heuristic defaults, so the outcome is reported rather than silently
/// applied.
#[derive(Debug, Clone, Default)]
pub struct CleaningReport {
    pub dataset_key: String,
    /// Imputed cell count per (normalized) column name
    pub imputed_cells: HashMap<String, usize>,
    pub resolutions: Vec<FieldResolution>,
    pub outliers_capped: usize,
    /// Bounds used for capping, when value statistics could be computed
    pub outlier_bounds: Option<(f64, f64)>,
    pub warnings: Vec<String>,
}

impl CleaningReport {
    fn new(dataset_key: String) -> Self {
        Self {
            dataset_key,
            ..Default::default()
        }
    }

    pub fn total_imputed(&self) -> usize {
        self.imputed_cells.values().sum()
    }

    pub fn resolution_for(&self, field: &str) -> Option<&FieldSource> {
        self.resolutions
            .iter()
            .find(|r| r.field == field)
            .map(|r| &r.source)
    }

    fn warn(&mut self, message: String) {
        warn!("{}: {}", self.dataset_key, message);
        self.warnings.push(message);
    }
}

/// Normalizes schemas, imputes missing values, repairs required columns,
/// and caps statistical outliers. Cleaning never fails: unrecoverable
/// absences degrade to warnings and a best-effort dataset.
pub struct Cleaner {
    outlier_sigma: f64,
}

impl Cleaner {
    pub fn new() -> Self {
        Self {
            outlier_sigma: DEFAULT_OUTLIER_SIGMA,
        }
    }

    pub fn with_outlier_sigma(outlier_sigma: f64) -> Self {
        Self { outlier_sigma }
    }

    /// Clean one dataset, producing a new dataset and the repair record.
    ///
    /// Step order is part of the observable behavior: imputation runs before
    /// required-column repair, and outlier bounds are computed over the
    /// already-imputed value column.
    pub fn clean(&self, dataset: &Dataset) -> (Dataset, CleaningReport) {
        let mut report = CleaningReport::new(dataset.key().composite());
        info!("Cleaning dataset: {}", report.dataset_key);

        let mut cleaned = dataset.clone();

        cleaned.rename_columns(|name| name.to_lowercase().replace('.', "_"));
        self.impute_missing(&mut cleaned, &mut report);
        self.resolve_value_column(&mut cleaned, &mut report);
        self.resolve_parameter_column(&mut cleaned, &mut report);
        self.resolve_city_column(&mut cleaned, &mut report);
        self.cap_outliers(&mut cleaned, &mut report);

        info!(
            "Cleaned dataset: {}, rows: {}, columns: {}",
            report.dataset_key,
            cleaned.len(),
            cleaned.columns().len()
        );
        (cleaned, report)
    }

    /// Fill missing cells column by column: numeric columns take the column
    /// median, other columns the most frequent value, falling back to
    /// "Unknown" when nothing was observed at all.
    fn impute_missing(&self, dataset: &mut Dataset, report: &mut CleaningReport) {
        let columns: Vec<String> = dataset.columns().to_vec();

        for column in columns {
            let missing: Vec<usize> = (0..dataset.len())
                .filter(|&i| dataset.get(i, &column).map_or(true, CellValue::is_null))
                .collect();

            if missing.is_empty() {
                continue;
            }
            debug!(
                "Found {} missing values in column {}",
                missing.len(),
                column
            );

            let fill = if dataset.is_numeric_column(&column) {
                let median = median(&dataset.numeric_values(&column));
                CellValue::Number(median)
            } else {
                most_frequent(dataset, &column)
                    .unwrap_or_else(|| CellValue::Text(UNKNOWN_FILL.to_string()))
            };

            for index in &missing {
                dataset.set(*index, &column, fill.clone());
            }
            report.imputed_cells.insert(column, missing.len());
        }
    }

    /// Adopt the first recognized alternative column as `value` when the
    /// canonical column is absent.
    fn resolve_value_column(&self, dataset: &mut Dataset, report: &mut CleaningReport) {
        if dataset.has_column(COL_VALUE) {
            report.resolutions.push(FieldResolution {
                field: COL_VALUE,
                source: FieldSource::Existing,
            });
            return;
        }

        for alternative in VALUE_ALTERNATIVES {
            if dataset.has_column(alternative) {
                let values: Vec<Option<CellValue>> = (0..dataset.len())
                    .map(|i| dataset.get(i, alternative).cloned())
                    .collect();
                for (index, value) in values.into_iter().enumerate() {
                    dataset.set(index, COL_VALUE, value.unwrap_or(CellValue::Null));
                }
                info!("Used '{}' column for 'value'", alternative);
                report.resolutions.push(FieldResolution {
                    field: COL_VALUE,
                    source: FieldSource::Alternate(alternative.to_string()),
                });
                return;
            }
        }

        report.warn("missing 'value' column and no recognized alternative".to_string());
        report.resolutions.push(FieldResolution {
            field: COL_VALUE,
            source: FieldSource::Unresolved,
        });
    }

    /// Derive `parameter` from the dataset key's trailing segment when the
    /// column is absent.
    fn resolve_parameter_column(&self, dataset: &mut Dataset, report: &mut CleaningReport) {
        if dataset.has_column(COL_PARAMETER) {
            report.resolutions.push(FieldResolution {
                field: COL_PARAMETER,
                source: FieldSource::Existing,
            });
            return;
        }

        let parameter = dataset.key().parameter.clone();
        for index in 0..dataset.len() {
            dataset.set(index, COL_PARAMETER, CellValue::Text(parameter.clone()));
        }
        info!("Added 'parameter' column with value '{}'", parameter);
        report.resolutions.push(FieldResolution {
            field: COL_PARAMETER,
            source: FieldSource::DatasetKey,
        });
    }

    /// Derive `city` from the dataset key's prefix when the column is
    /// absent, re-joining the recognized two-word city names.
    fn resolve_city_column(&self, dataset: &mut Dataset, report: &mut CleaningReport) {
        if dataset.has_column(COL_CITY) {
            report.resolutions.push(FieldResolution {
                field: COL_CITY,
                source: FieldSource::Existing,
            });
            return;
        }

        let city = dataset.key().city.clone();
        for index in 0..dataset.len() {
            dataset.set(index, COL_CITY, CellValue::Text(city.clone()));
        }
        info!("Added 'city' column with value '{}'", city);
        report.resolutions.push(FieldResolution {
            field: COL_CITY,
            source: FieldSource::DatasetKey,
        });
    }

    /// Clamp `value` entries outside mean ± sigma·std to the nearest bound.
    /// Statistics are per dataset and come from the pre-capping column.
    fn cap_outliers(&self, dataset: &mut Dataset, report: &mut CleaningReport) {
        if !dataset.has_column(COL_VALUE) {
            return;
        }

        if !dataset.is_numeric_column(COL_VALUE) {
            report.warn("'value' column has no numeric data; skipping outlier check".to_string());
            return;
        }

        let values = dataset.numeric_values(COL_VALUE);
        let Some((mean, std)) = sample_statistics(&values) else {
            return;
        };
        if std == 0.0 {
            return;
        }

        let lower = mean - self.outlier_sigma * std;
        let upper = mean + self.outlier_sigma * std;
        report.outlier_bounds = Some((lower, upper));

        let mut capped = 0;
        for index in 0..dataset.len() {
            let Some(value) = dataset.get(index, COL_VALUE).and_then(CellValue::as_f64) else {
                continue;
            };
            if value < lower {
                dataset.set(index, COL_VALUE, CellValue::Number(lower));
                capped += 1;
            } else if value > upper {
                dataset.set(index, COL_VALUE, CellValue::Number(upper));
                capped += 1;
            }
        }

        if capped > 0 {
            info!(
                "Capped {} outliers in 'value' to range [{:.2}, {:.2}]",
                capped, lower, upper
            );
        }
        report.outliers_capped = capped;
    }
}

impl Default for Cleaner {
    fn default() -> Self {
        Self::new()
    }
}

/// Median with interpolation for even-sized samples.
fn median(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let n = sorted.len();
    if n % 2 == 1 {
        sorted[n / 2]
    } else {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    }
}

/// Mean and sample standard deviation; `None` when fewer than two values.
fn sample_statistics(values: &[f64]) -> Option<(f64, f64)> {
    let n = values.len();
    if n < 2 {
        return None;
    }

    let mean = values.iter().sum::<f64>() / n as f64;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
    Some((mean, variance.sqrt()))
}

/// Most frequent non-null value of a column; ties break toward the value
/// seen first.
fn most_frequent(dataset: &Dataset, column: &str) -> Option<CellValue> {
    let mut counts: HashMap<String, (usize, usize, CellValue)> = HashMap::new();

    for (index, row) in dataset.rows().iter().enumerate() {
        let Some(cell) = row.get(column) else { continue };
        if cell.is_null() {
            continue;
        }
        counts
            .entry(cell.to_csv_field())
            .or_insert((0, index, cell.clone()))
            .0 += 1;
    }

    let mut ranked: Vec<(usize, usize, CellValue)> = counts.into_values().collect();
    ranked.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
    ranked.into_iter().next().map(|(_, _, value)| value)
}
