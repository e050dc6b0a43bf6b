use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "aqi-processor")]
#[command(about = "Air quality transform pipeline: raw pollutant readings to AQI datasets")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Log file path")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the full pipeline: load, clean, score, enrich, and write artifacts
    Process {
        #[arg(short, long, default_value = "data/raw", help = "Directory of raw extractor files")]
        raw_dir: PathBuf,

        #[arg(
            short,
            long,
            default_value = "data/processed",
            help = "Directory processed artifacts are written into"
        )]
        output_dir: PathBuf,

        #[arg(long, default_value_t = 3.0, help = "Outlier capping bound in standard deviations")]
        sigma: f64,

        #[arg(long, default_value = "false", help = "Run every stage but skip writing artifacts")]
        validate_only: bool,

        #[arg(long, help = "Suppress progress output")]
        silent: bool,
    },

    /// Load and clean raw data, reporting every repair without writing
    Validate {
        #[arg(short, long, default_value = "data/raw", help = "Directory of raw extractor files")]
        raw_dir: PathBuf,

        #[arg(long, default_value_t = 3.0, help = "Outlier capping bound in standard deviations")]
        sigma: f64,
    },

    /// Display information about a processed CSV artifact
    Info {
        #[arg(short, long)]
        file: PathBuf,

        #[arg(short, long, default_value = "10")]
        sample: usize,
    },
}
