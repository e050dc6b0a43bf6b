pub mod cell;
pub mod dataset;
pub mod pollutant;

pub use cell::CellValue;
pub use dataset::{city_from_composite, Dataset, DatasetKey, Row};
pub use pollutant::{AqiCategory, BreakpointTier, Pollutant};
