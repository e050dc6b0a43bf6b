pub mod dataset_loader;
pub mod raw_reader;

pub use dataset_loader::{load_datasets, resolve_latest_per_key, DatasetLoader};
pub use raw_reader::RawReader;
