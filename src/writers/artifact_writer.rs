use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use tracing::{error, info};

use crate::error::Result;
use crate::models::{CellValue, Dataset, Row};
use crate::utils::filename::{combined_artifact_name, dataset_artifact_name};

/// Outcome of one persistence pass. Failures are per artifact; one bad
/// write never blocks the others.
#[derive(Debug, Clone, Default)]
pub struct WriteSummary {
    pub artifacts_written: usize,
    pub failures: usize,
    /// Row count of the combined artifact (sum over per-key datasets)
    pub combined_rows: usize,
}

/// Persists per-dataset artifacts plus one combined artifact, in both CSV
/// and JSON, under a single shared run timestamp.
pub struct ArtifactWriter {
    output_dir: PathBuf,
}

impl ArtifactWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Write every artifact for this run.
    pub fn write_all(&self, datasets: &[Dataset], timestamp: &str) -> Result<WriteSummary> {
        fs::create_dir_all(&self.output_dir)?;

        let mut summary = WriteSummary::default();

        for dataset in datasets {
            let rows: Vec<&Row> = dataset.rows().iter().collect();

            let csv_path = self
                .output_dir
                .join(dataset_artifact_name(dataset.key(), timestamp, "csv"));
            self.record(
                write_csv(dataset.columns(), &rows, &csv_path),
                &csv_path,
                &mut summary,
            );

            let json_path = self
                .output_dir
                .join(dataset_artifact_name(dataset.key(), timestamp, "json"));
            self.record(
                write_json(dataset.columns(), &rows, &json_path),
                &json_path,
                &mut summary,
            );
        }

        let columns = combined_columns(datasets);
        let rows: Vec<&Row> = datasets.iter().flat_map(|d| d.rows().iter()).collect();
        summary.combined_rows = rows.len();

        let csv_path = self.output_dir.join(combined_artifact_name(timestamp, "csv"));
        self.record(write_csv(&columns, &rows, &csv_path), &csv_path, &mut summary);

        let json_path = self.output_dir.join(combined_artifact_name(timestamp, "json"));
        self.record(
            write_json(&columns, &rows, &json_path),
            &json_path,
            &mut summary,
        );

        Ok(summary)
    }

    fn record(&self, result: Result<()>, path: &Path, summary: &mut WriteSummary) {
        match result {
            Ok(()) => {
                info!("Saved processed data to {}", path.display());
                summary.artifacts_written += 1;
            }
            Err(e) => {
                error!("Failed to write {}: {}", path.display(), e);
                summary.failures += 1;
            }
        }
    }
}

/// Union of the datasets' columns, in first-seen order. Cells absent from a
/// source dataset serialize as missing.
pub fn combined_columns(datasets: &[Dataset]) -> Vec<String> {
    let mut columns: Vec<String> = Vec::new();

    for dataset in datasets {
        for column in dataset.columns() {
            if !columns.contains(column) {
                columns.push(column.clone());
            }
        }
    }

    columns
}

fn write_csv(columns: &[String], rows: &[&Row], path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(columns)?;

    for row in rows {
        let record: Vec<String> = columns
            .iter()
            .map(|column| row.get(column).map(CellValue::to_csv_field).unwrap_or_default())
            .collect();
        writer.write_record(&record)?;
    }

    writer.flush()?;
    Ok(())
}

fn write_json(columns: &[String], rows: &[&Row], path: &Path) -> Result<()> {
    let records: Vec<serde_json::Value> = rows
        .iter()
        .map(|row| {
            let mut object = serde_json::Map::new();
            for column in columns {
                let value = row
                    .get(column)
                    .map(CellValue::to_json_value)
                    .unwrap_or(serde_json::Value::Null);
                object.insert(column.clone(), value);
            }
            serde_json::Value::Object(object)
        })
        .collect();

    let file = File::create(path)?;
    serde_json::to_writer_pretty(BufWriter::new(file), &records)?;
    Ok(())
}
