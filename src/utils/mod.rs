pub mod constants;
pub mod coordinates;
pub mod filename;
pub mod progress;

pub use constants::*;
pub use coordinates::centroid_for_city;
pub use filename::{combined_artifact_name, dataset_artifact_name, parse_raw_filename, run_timestamp};
pub use progress::ProgressReporter;
