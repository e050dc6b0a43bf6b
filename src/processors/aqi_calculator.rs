use tracing::{info, warn};

use crate::models::{AqiCategory, CellValue, Dataset, Pollutant, Row};
use crate::utils::constants::{
    AQI_MAX, COL_AQI, COL_AQI_CATEGORY, COL_HEALTH_RECOMMENDATION, COL_PARAMETER, COL_VALUE,
};

/// Why one row could not be scored. Degraded rows keep all their other
/// fields; only the AQI columns fall back to null/"Unknown".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowFailureReason {
    /// The value cell is absent or null
    MissingValue,
    /// The value cell holds text that is not a number
    NonNumericValue(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowFailure {
    pub row: usize,
    pub reason: RowFailureReason,
}

/// Per-dataset account of the AQI stage: how many rows were scored, which
/// rows degraded and why, and which parameter names fell back to the PM2.5
/// table.
#[derive(Debug, Clone, Default)]
pub struct TransformReport {
    pub dataset_key: String,
    pub rows_processed: usize,
    pub rows_defaulted: usize,
    pub failures: Vec<RowFailure>,
    /// Distinct unrecognized parameter names, in first-seen order
    pub unknown_parameters: Vec<String>,
    /// True when the dataset lacked the columns needed to score at all
    pub skipped: bool,
}

/// Maps each row's `(parameter, value)` to AQI score, category, and health
/// recommendation via the pollutant breakpoint tables.
pub struct AqiCalculator;

impl AqiCalculator {
    pub fn new() -> Self {
        Self
    }

    /// Annotate a dataset with `aqi`, `aqi_category`, and
    /// `health_recommendation` columns.
    ///
    /// Row-level conversion failures degrade that row only; a dataset
    /// without `value`/`parameter` columns passes through unchanged.
    pub fn annotate(&self, dataset: &Dataset) -> (Dataset, TransformReport) {
        let mut report = TransformReport {
            dataset_key: dataset.key().composite(),
            ..Default::default()
        };
        info!("Transforming dataset: {}", report.dataset_key);

        if !dataset.has_column(COL_VALUE) || !dataset.has_column(COL_PARAMETER) {
            warn!(
                "Dataset {} missing required columns for AQI calculation",
                report.dataset_key
            );
            report.skipped = true;
            return (dataset.clone(), report);
        }

        let mut annotated = dataset.clone();
        let mut scores = Vec::with_capacity(dataset.len());
        let mut categories = Vec::with_capacity(dataset.len());
        let mut recommendations = Vec::with_capacity(dataset.len());

        for (index, row) in dataset.rows().iter().enumerate() {
            let pollutant = self.resolve_pollutant(row, &mut report);

            match row_concentration(row) {
                Ok(concentration) => {
                    let (aqi, category) = compute_aqi(pollutant, concentration);
                    scores.push(CellValue::Integer(aqi));
                    categories.push(CellValue::Text(category.as_str().to_string()));
                    recommendations.push(CellValue::Text(
                        category.health_recommendation().to_string(),
                    ));
                }
                Err(reason) => {
                    warn!(
                        "Error calculating AQI for row {} of {}: {:?}",
                        index, report.dataset_key, reason
                    );
                    report.failures.push(RowFailure { row: index, reason });
                    scores.push(CellValue::Null);
                    categories.push(CellValue::Text(AqiCategory::Unknown.as_str().to_string()));
                    recommendations.push(CellValue::Text(
                        AqiCategory::Unknown.health_recommendation().to_string(),
                    ));
                }
            }
        }

        report.rows_processed = dataset.len();
        report.rows_defaulted = report.failures.len();

        annotated.append_column(COL_AQI, scores);
        annotated.append_column(COL_AQI_CATEGORY, categories);
        annotated.append_column(COL_HEALTH_RECOMMENDATION, recommendations);

        info!(
            "Transformed dataset: {}, scored {} of {} rows",
            report.dataset_key,
            report.rows_processed - report.rows_defaulted,
            report.rows_processed
        );
        (annotated, report)
    }

    /// Resolve the row's pollutant, falling back to PM2.5 for missing,
    /// non-text, or unrecognized parameter names.
    fn resolve_pollutant(&self, row: &Row, report: &mut TransformReport) -> Pollutant {
        let Some(name) = row.get(COL_PARAMETER).and_then(CellValue::as_str) else {
            return Pollutant::Pm25;
        };

        match Pollutant::from_name(name) {
            Some(pollutant) => pollutant,
            None => {
                if !report.unknown_parameters.iter().any(|p| p == name) {
                    warn!("Unknown parameter: {}, defaulting to PM2.5", name);
                    report.unknown_parameters.push(name.to_string());
                }
                Pollutant::Pm25
            }
        }
    }
}

impl Default for AqiCalculator {
    fn default() -> Self {
        Self::new()
    }
}

/// The row's concentration. Numeric text is accepted, matching the lenient
/// float conversion the readings actually need (mixed columns arrive as
/// text).
fn row_concentration(row: &Row) -> Result<f64, RowFailureReason> {
    match row.get(COL_VALUE) {
        None | Some(CellValue::Null) => Err(RowFailureReason::MissingValue),
        Some(cell) => {
            if let Some(value) = cell.as_f64() {
                return Ok(value);
            }
            cell.as_str()
                .and_then(|s| s.trim().parse::<f64>().ok())
                .ok_or_else(|| RowFailureReason::NonNumericValue(cell.to_csv_field()))
        }
    }
}

/// Piecewise-linear AQI for a concentration.
///
/// Tiers are inclusive on both ends and the first match in ascending order
/// wins. Above the top tier the index saturates at 500; anything that
/// matches no tier (negative readings, the small gaps between tiers) scores
/// 0 with the below-index category.
pub fn compute_aqi(pollutant: Pollutant, concentration: f64) -> (i64, AqiCategory) {
    let tiers = pollutant.breakpoints();

    for (index, tier) in tiers.iter().enumerate() {
        if tier.c_low <= concentration && concentration <= tier.c_high {
            let span = (tier.i_high - tier.i_low) as f64 / (tier.c_high - tier.c_low);
            let aqi = (span * (concentration - tier.c_low) + tier.i_low as f64).round() as i64;
            return (aqi, AqiCategory::for_tier(index));
        }
    }

    if concentration > tiers[tiers.len() - 1].c_high {
        return (AQI_MAX, AqiCategory::HazardousBeyondIndex);
    }

    (0, AqiCategory::GoodBelowIndex)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DatasetKey;
    use std::collections::HashMap;

    fn row(cells: &[(&str, CellValue)]) -> Row {
        cells
            .iter()
            .map(|(name, value)| (name.to_string(), value.clone()))
            .collect::<HashMap<_, _>>()
    }

    fn reading(parameter: &str, value: CellValue) -> Row {
        row(&[
            ("parameter", CellValue::Text(parameter.to_string())),
            ("value", value),
        ])
    }

    fn dataset(key: &str, rows: Vec<Row>) -> Dataset {
        Dataset::from_rows(
            DatasetKey::from_composite(key),
            vec!["parameter".to_string(), "value".to_string()],
            rows,
        )
    }

    #[test]
    fn test_known_concentrations() {
        assert_eq!(
            compute_aqi(Pollutant::Pm25, 12.0),
            (50, AqiCategory::Good)
        );
        assert_eq!(
            compute_aqi(Pollutant::Pm25, 35.5),
            (101, AqiCategory::UnhealthySensitive)
        );
        assert_eq!(
            compute_aqi(Pollutant::O3, 90.0),
            (161, AqiCategory::Unhealthy)
        );
    }

    #[test]
    fn test_beyond_index_saturates() {
        assert_eq!(
            compute_aqi(Pollutant::Pm25, 600.0),
            (500, AqiCategory::HazardousBeyondIndex)
        );
        assert_eq!(
            compute_aqi(Pollutant::No2, 5000.0),
            (500, AqiCategory::HazardousBeyondIndex)
        );
    }

    #[test]
    fn test_below_index_floors_at_zero() {
        assert_eq!(
            compute_aqi(Pollutant::Pm25, -3.0),
            (0, AqiCategory::GoodBelowIndex)
        );
        // Values falling in the gap between two tiers score the same way.
        assert_eq!(
            compute_aqi(Pollutant::Pm25, 12.05),
            (0, AqiCategory::GoodBelowIndex)
        );
    }

    #[test]
    fn test_tier_endpoints_map_to_index_endpoints() {
        for pollutant in [Pollutant::Pm25, Pollutant::O3, Pollutant::No2] {
            for (index, tier) in pollutant.breakpoints().iter().enumerate() {
                let (low, low_category) = compute_aqi(pollutant, tier.c_low);
                assert_eq!(low, tier.i_low, "{pollutant} tier {index} lower endpoint");
                assert_eq!(low_category, AqiCategory::for_tier(index));

                let (high, high_category) = compute_aqi(pollutant, tier.c_high);
                assert_eq!(high, tier.i_high, "{pollutant} tier {index} upper endpoint");
                assert_eq!(high_category, AqiCategory::for_tier(index));
            }
        }
    }

    #[test]
    fn test_monotonic_over_tier_bounds() {
        for pollutant in [Pollutant::Pm25, Pollutant::O3, Pollutant::No2] {
            let mut grid: Vec<f64> = pollutant
                .breakpoints()
                .iter()
                .flat_map(|t| [t.c_low, t.c_high])
                .collect();
            grid.push(pollutant.breakpoints().last().unwrap().c_high + 10.0);

            let mut previous = i64::MIN;
            for concentration in grid {
                let (aqi, _) = compute_aqi(pollutant, concentration);
                assert!(aqi >= previous, "{pollutant} not monotonic at {concentration}");
                previous = aqi;
            }
        }
    }

    #[test]
    fn test_annotate_adds_all_three_columns() {
        let ds = dataset(
            "Los Angeles_pm25",
            vec![reading("pm25", CellValue::Number(12.0))],
        );

        let (annotated, report) = AqiCalculator::new().annotate(&ds);
        assert_eq!(annotated.get(0, "aqi"), Some(&CellValue::Integer(50)));
        assert_eq!(
            annotated.get(0, "aqi_category"),
            Some(&CellValue::Text("Good".into()))
        );
        assert_eq!(
            annotated.get(0, "health_recommendation"),
            Some(&CellValue::Text(
                AqiCategory::Good.health_recommendation().into()
            ))
        );
        assert_eq!(report.rows_processed, 1);
        assert_eq!(report.rows_defaulted, 0);
    }

    #[test]
    fn test_numeric_text_value_is_scored() {
        let ds = dataset(
            "London_no2",
            vec![reading("no2", CellValue::Text("53".into()))],
        );

        let (annotated, report) = AqiCalculator::new().annotate(&ds);
        assert_eq!(annotated.get(0, "aqi"), Some(&CellValue::Integer(50)));
        assert!(report.failures.is_empty());
    }

    #[test]
    fn test_bad_row_degrades_alone() {
        let ds = dataset(
            "London_no2",
            vec![
                reading("no2", CellValue::Number(53.0)),
                reading("no2", CellValue::Text("n/a".into())),
                reading("no2", CellValue::Null),
            ],
        );

        let (annotated, report) = AqiCalculator::new().annotate(&ds);

        assert_eq!(annotated.get(0, "aqi"), Some(&CellValue::Integer(50)));
        assert_eq!(annotated.get(1, "aqi"), Some(&CellValue::Null));
        assert_eq!(
            annotated.get(1, "aqi_category"),
            Some(&CellValue::Text("Unknown".into()))
        );
        assert_eq!(annotated.get(2, "aqi"), Some(&CellValue::Null));

        assert_eq!(report.rows_defaulted, 2);
        assert_eq!(
            report.failures,
            vec![
                RowFailure {
                    row: 1,
                    reason: RowFailureReason::NonNumericValue("n/a".into())
                },
                RowFailure {
                    row: 2,
                    reason: RowFailureReason::MissingValue
                },
            ]
        );
    }

    #[test]
    fn test_unknown_parameter_defaults_to_pm25() {
        let ds = dataset(
            "London_so2",
            vec![
                reading("so2", CellValue::Number(12.0)),
                reading("so2", CellValue::Number(35.5)),
            ],
        );

        let (annotated, report) = AqiCalculator::new().annotate(&ds);
        // Scored against the PM2.5 table.
        assert_eq!(annotated.get(0, "aqi"), Some(&CellValue::Integer(50)));
        assert_eq!(annotated.get(1, "aqi"), Some(&CellValue::Integer(101)));
        // Recorded once, not per row.
        assert_eq!(report.unknown_parameters, vec!["so2".to_string()]);
    }

    #[test]
    fn test_dataset_without_required_columns_passes_through() {
        let ds = Dataset::from_rows(
            DatasetKey::from_composite("London_no2"),
            vec!["unit".to_string()],
            vec![row(&[("unit", CellValue::Text("ppb".into()))])],
        );

        let (annotated, report) = AqiCalculator::new().annotate(&ds);
        assert!(report.skipped);
        assert!(!annotated.has_column("aqi"));
        assert_eq!(annotated.len(), 1);
    }
}
