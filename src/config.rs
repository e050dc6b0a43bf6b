//! Pipeline configuration.
//!
//! One value object carries every tunable a run needs, so stages stay
//! testable without process-global state.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{ProcessingError, Result};
use crate::utils::constants::{DEFAULT_OUTLIER_SIGMA, DEFAULT_PROCESSED_DIR, DEFAULT_RAW_DIR};

/// Configuration for one transform-pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Directory scanned for raw extractor output
    pub raw_dir: PathBuf,

    /// Directory processed artifacts are written into
    pub processed_dir: PathBuf,

    /// Outlier bounds are mean ± `outlier_sigma` standard deviations
    pub outlier_sigma: f64,

    /// Suppress progress output
    pub silent: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            raw_dir: PathBuf::from(DEFAULT_RAW_DIR),
            processed_dir: PathBuf::from(DEFAULT_PROCESSED_DIR),
            outlier_sigma: DEFAULT_OUTLIER_SIGMA,
            silent: false,
        }
    }
}

impl PipelineConfig {
    pub fn with_raw_dir(mut self, raw_dir: impl Into<PathBuf>) -> Self {
        self.raw_dir = raw_dir.into();
        self
    }

    pub fn with_processed_dir(mut self, processed_dir: impl Into<PathBuf>) -> Self {
        self.processed_dir = processed_dir.into();
        self
    }

    pub fn with_outlier_sigma(mut self, sigma: f64) -> Self {
        self.outlier_sigma = sigma;
        self
    }

    pub fn with_silent(mut self, silent: bool) -> Self {
        self.silent = silent;
        self
    }

    /// Reject configurations no run could satisfy.
    pub fn validate(&self) -> Result<()> {
        if self.outlier_sigma <= 0.0 {
            return Err(ProcessingError::Config(format!(
                "outlier sigma must be positive, got {}",
                self.outlier_sigma
            )));
        }
        Ok(())
    }
}
