use tracing::info;

use crate::config::PipelineConfig;
use crate::error::Result;
use crate::models::Dataset;
use crate::processors::{AqiCalculator, Cleaner, CleaningReport, GeoEnricher, TransformReport};
use crate::readers::DatasetLoader;
use crate::utils::filename::run_timestamp;
use crate::utils::progress::ProgressReporter;
use crate::writers::{ArtifactWriter, WriteSummary};

/// Everything the transform stages produced for one run, before
/// persistence: the enriched datasets plus the per-dataset stage reports.
#[derive(Debug, Default)]
pub struct TransformOutcome {
    pub datasets: Vec<Dataset>,
    pub cleaning: Vec<CleaningReport>,
    pub transform: Vec<TransformReport>,
}

impl TransformOutcome {
    pub fn total_rows(&self) -> usize {
        self.datasets.iter().map(Dataset::len).sum()
    }
}

/// Aggregated result of one full pipeline run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub timestamp: String,
    pub datasets: usize,
    pub total_rows: usize,
    pub cells_imputed: usize,
    pub outliers_capped: usize,
    pub rows_defaulted: usize,
    pub artifacts_written: usize,
    pub write_failures: usize,
    pub combined_rows: usize,
}

impl RunSummary {
    fn new(timestamp: String, outcome: &TransformOutcome, writes: &WriteSummary) -> Self {
        Self {
            timestamp,
            datasets: outcome.datasets.len(),
            total_rows: outcome.total_rows(),
            cells_imputed: outcome.cleaning.iter().map(CleaningReport::total_imputed).sum(),
            outliers_capped: outcome.cleaning.iter().map(|r| r.outliers_capped).sum(),
            rows_defaulted: outcome.transform.iter().map(|r| r.rows_defaulted).sum(),
            artifacts_written: writes.artifacts_written,
            write_failures: writes.failures,
            combined_rows: writes.combined_rows,
        }
    }

    /// Render a human-readable run report.
    pub fn generate_summary(&self) -> String {
        let mut summary = String::new();

        summary.push_str("=== Pipeline Run Report ===\n");
        summary.push_str(&format!("Run Timestamp: {}\n", self.timestamp));
        summary.push_str(&format!("Datasets Processed: {}\n", self.datasets));
        summary.push_str(&format!("Total Rows: {}\n", self.total_rows));
        summary.push_str(&format!("Cells Imputed: {}\n", self.cells_imputed));
        summary.push_str(&format!("Outliers Capped: {}\n", self.outliers_capped));
        summary.push_str(&format!(
            "Rows With Degraded AQI: {}\n",
            self.rows_defaulted
        ));
        summary.push_str(&format!(
            "Artifacts Written: {} ({} failed)\n",
            self.artifacts_written, self.write_failures
        ));
        summary.push_str(&format!("Combined Rows: {}\n", self.combined_rows));

        summary
    }
}

/// Sequences Loader → Cleaner → AQI → Geo → Writer for one run.
///
/// The stages run strictly in order within a single thread; every dataset is
/// owned by the run that loaded it, so no coordination is needed.
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Run the transform stages without persisting anything.
    ///
    /// Fatal only when no input can be loaded; every later condition
    /// degrades locally and is surfaced through the stage reports.
    pub fn transform(&self, progress: Option<&ProgressReporter>) -> Result<TransformOutcome> {
        self.config.validate()?;

        info!("Starting data transformation process");

        let loader = DatasetLoader::new(&self.config.raw_dir);
        let raw_datasets = loader.load_latest()?;

        let cleaner = Cleaner::with_outlier_sigma(self.config.outlier_sigma);
        let calculator = AqiCalculator::new();
        let enricher = GeoEnricher::new();

        let mut outcome = TransformOutcome::default();

        for dataset in raw_datasets {
            if let Some(progress) = progress {
                progress.set_message(&format!("Processing {}", dataset.key()));
            }

            let (cleaned, cleaning_report) = cleaner.clean(&dataset);
            let (annotated, transform_report) = calculator.annotate(&cleaned);
            let enriched = enricher.enrich(&annotated);

            outcome.cleaning.push(cleaning_report);
            outcome.transform.push(transform_report);
            outcome.datasets.push(enriched);

            if let Some(progress) = progress {
                progress.increment(1);
            }
        }

        Ok(outcome)
    }

    /// Run the whole pipeline: transform plus artifact persistence.
    pub fn run(&self, progress: Option<&ProgressReporter>) -> Result<RunSummary> {
        let timestamp = run_timestamp();
        let outcome = self.transform(progress)?;

        let writer = ArtifactWriter::new(&self.config.processed_dir);
        let writes = writer.write_all(&outcome.datasets, &timestamp)?;

        let summary = RunSummary::new(timestamp, &outcome, &writes);
        info!("Data transformation process completed");
        Ok(summary)
    }
}
