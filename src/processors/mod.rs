pub mod aqi_calculator;
pub mod cleaner;
pub mod geo_enricher;
pub mod pipeline;

pub use aqi_calculator::{
    compute_aqi, AqiCalculator, RowFailure, RowFailureReason, TransformReport,
};
pub use cleaner::{Cleaner, CleaningReport, FieldResolution, FieldSource};
pub use geo_enricher::GeoEnricher;
pub use pipeline::{Pipeline, RunSummary, TransformOutcome};
