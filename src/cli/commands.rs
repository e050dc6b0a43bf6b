use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use crate::cli::args::{Cli, Commands};
use crate::config::PipelineConfig;
use crate::error::Result;
use crate::processors::{FieldSource, Pipeline, TransformOutcome};
use crate::utils::progress::ProgressReporter;

pub async fn run(cli: Cli) -> Result<()> {
    setup_logging(cli.verbose, cli.log_file.as_deref())?;

    match cli.command {
        Commands::Process {
            raw_dir,
            output_dir,
            sigma,
            validate_only,
            silent,
        } => {
            println!("Processing air quality data...");
            println!("Raw directory: {}", raw_dir.display());
            println!("Output directory: {}", output_dir.display());

            let config = PipelineConfig::default()
                .with_raw_dir(raw_dir)
                .with_processed_dir(output_dir)
                .with_outlier_sigma(sigma)
                .with_silent(silent);

            let progress = ProgressReporter::new_spinner("Processing datasets...", config.silent);
            let pipeline = Pipeline::new(config);

            if validate_only {
                let outcome = pipeline.transform(Some(&progress))?;
                progress.finish_with_message(&format!(
                    "Validated {} datasets",
                    outcome.datasets.len()
                ));
                print_stage_reports(&outcome);
                println!("Validation complete - no artifacts written");
                return Ok(());
            }

            let summary = pipeline.run(Some(&progress))?;
            progress.finish_with_message(&format!("Processed {} datasets", summary.datasets));

            println!("\n{}", summary.generate_summary());
            println!("Processing complete!");
        }

        Commands::Validate { raw_dir, sigma } => {
            println!("Validating air quality data...");
            println!("Raw directory: {}", raw_dir.display());

            let config = PipelineConfig::default()
                .with_raw_dir(raw_dir)
                .with_outlier_sigma(sigma);

            let progress = ProgressReporter::new_spinner("Validating datasets...", false);
            let outcome = Pipeline::new(config).transform(Some(&progress))?;
            progress.finish_with_message("Validation complete");

            print_stage_reports(&outcome);

            let degraded: usize = outcome.transform.iter().map(|r| r.rows_defaulted).sum();
            if degraded == 0 {
                println!("All rows scored cleanly");
            } else {
                println!("{} rows degraded to Unknown AQI", degraded);
            }
        }

        Commands::Info { file, sample } => {
            print_artifact_info(&file, sample)?;
        }
    }

    Ok(())
}

/// Print every repair the cleaning and scoring stages recorded.
fn print_stage_reports(outcome: &TransformOutcome) {
    for report in &outcome.cleaning {
        println!(
            "\nDataset {}: {} cells imputed, {} outliers capped",
            report.dataset_key,
            report.total_imputed(),
            report.outliers_capped
        );

        for resolution in &report.resolutions {
            match &resolution.source {
                FieldSource::Existing => {}
                FieldSource::Alternate(name) => {
                    println!("  '{}' adopted from column '{}'", resolution.field, name)
                }
                FieldSource::DatasetKey => {
                    println!("  '{}' derived from the dataset key", resolution.field)
                }
                FieldSource::Unresolved => {
                    println!("  '{}' could not be resolved", resolution.field)
                }
            }
        }

        for warning in &report.warnings {
            println!("  warning: {}", warning);
        }
    }

    for report in &outcome.transform {
        if report.rows_defaulted > 0 {
            println!(
                "Dataset {}: {} of {} rows degraded to Unknown AQI",
                report.dataset_key, report.rows_defaulted, report.rows_processed
            );
        }
        for parameter in &report.unknown_parameters {
            println!(
                "Dataset {}: unknown parameter '{}' scored with the PM2.5 table",
                report.dataset_key, parameter
            );
        }
    }
}

/// Summarize a processed CSV artifact: shape, category distribution, and a
/// few sample rows.
fn print_artifact_info(file: &Path, sample: usize) -> Result<()> {
    println!("Analyzing artifact: {}", file.display());

    let mut reader = csv::Reader::from_path(file)?;
    let headers = reader.headers()?.clone();

    let category_index = headers.iter().position(|h| h == "aqi_category");
    let mut categories: HashMap<String, usize> = HashMap::new();
    let mut samples: Vec<csv::StringRecord> = Vec::new();
    let mut rows = 0usize;

    for record in reader.records() {
        let record = record?;
        rows += 1;

        if samples.len() < sample {
            samples.push(record.clone());
        }
        if let Some(index) = category_index {
            if let Some(category) = record.get(index) {
                *categories.entry(category.to_string()).or_default() += 1;
            }
        }
    }

    println!("Rows: {}", rows);
    println!("Columns: {}", headers.len());

    if !categories.is_empty() {
        println!("\nAQI Category Distribution:");
        let mut ranked: Vec<(String, usize)> = categories.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        for (category, count) in ranked {
            println!("  {:>6}  {}", count, category);
        }
    }

    if !samples.is_empty() {
        println!("\nSample Records (showing {}):", samples.len());
        for (index, record) in samples.iter().enumerate() {
            let fields: Vec<&str> = record.iter().collect();
            println!("{}. {}", index + 1, fields.join(" | "));
        }
    }

    Ok(())
}

/// Set up structured logging: stderr always, plus a plain-text file writer
/// when a log path is given.
fn setup_logging(verbose: bool, log_file: Option<&Path>) -> Result<()> {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("aqi_processor={}", level)));

    let stderr_layer = fmt::layer()
        .with_target(false)
        .with_level(true)
        .with_timer(fmt::time::uptime())
        .with_writer(std::io::stderr);

    match log_file {
        Some(path) => {
            let file = std::fs::File::create(path)?;
            tracing_subscriber::registry()
                .with(filter)
                .with(stderr_layer)
                .with(
                    fmt::layer()
                        .with_target(false)
                        .with_level(true)
                        .with_ansi(false)
                        .with_writer(Arc::new(file)),
                )
                .init();
        }
        None => {
            tracing_subscriber::registry()
                .with(filter)
                .with(stderr_layer)
                .init();
        }
    }

    debug!("Logging initialized at level: {}", level);
    Ok(())
}
