use chrono::Local;
use std::path::Path;

use crate::error::{ProcessingError, Result};
use crate::models::DatasetKey;
use crate::utils::constants::{COMBINED_PREFIX, RUN_TIMESTAMP_FORMAT, TWO_WORD_CITIES};

/// Generate the shared timestamp for one pipeline run.
///
/// The format is fixed-width and monotonic, so downstream consumers can sort
/// artifact filenames lexicographically to find the latest run. Changing it
/// breaks the loader collaborator's contract.
pub fn run_timestamp() -> String {
    Local::now().format(RUN_TIMESTAMP_FORMAT).to_string()
}

/// Parse the `(city, parameter)` key out of a raw data filename.
///
/// Raw files are named `<City>_<parameter>_<timestamp>.csv|.json`, with
/// two-word city names contributing one underscore-separated part per word
/// (e.g. `Los_Angeles_pm25_20250301_120000.csv`).
pub fn parse_raw_filename(path: &Path) -> Result<DatasetKey> {
    let filename = path
        .file_stem()
        .and_then(|f| f.to_str())
        .ok_or_else(|| ProcessingError::InvalidFilename(path.display().to_string()))?;

    let parts: Vec<&str> = filename.split('_').collect();
    if parts.len() < 3 {
        return Err(ProcessingError::InvalidFilename(filename.to_string()));
    }

    for (head, tail) in TWO_WORD_CITIES {
        if parts[0] == head && parts[1] == tail {
            return Ok(DatasetKey::new(format!("{head} {tail}"), parts[2]));
        }
    }

    Ok(DatasetKey::new(parts[0], parts[1]))
}

/// True for the file extensions the loader accepts as raw input.
pub fn is_raw_data_file(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext == "csv" || ext == "json")
}

/// Per-dataset artifact filename: `<city>_<parameter>_<timestamp>.<ext>`.
pub fn dataset_artifact_name(key: &DatasetKey, timestamp: &str, extension: &str) -> String {
    format!("{}_{}.{}", key.composite(), timestamp, extension)
}

/// Combined artifact filename: `combined_<timestamp>.<ext>`. The downstream
/// loader scans for this prefix.
pub fn combined_artifact_name(timestamp: &str, extension: &str) -> String {
    format!("{COMBINED_PREFIX}_{timestamp}.{extension}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_run_timestamp_shape() {
        let ts = run_timestamp();
        // YYYYMMDD_HHMMSS
        assert_eq!(ts.len(), 15);
        assert_eq!(ts.as_bytes()[8], b'_');
        assert!(ts.chars().filter(|c| c.is_ascii_digit()).count() == 14);
    }

    #[test]
    fn test_parse_single_word_city() {
        let key =
            parse_raw_filename(&PathBuf::from("London_no2_20250301_120000.csv")).unwrap();
        assert_eq!(key.city, "London");
        assert_eq!(key.parameter, "no2");
    }

    #[test]
    fn test_parse_two_word_cities() {
        let key =
            parse_raw_filename(&PathBuf::from("Los_Angeles_pm25_20250301_120000.csv")).unwrap();
        assert_eq!(key.city, "Los Angeles");
        assert_eq!(key.parameter, "pm25");

        let key =
            parse_raw_filename(&PathBuf::from("New_York_o3_20250301_120000.json")).unwrap();
        assert_eq!(key.city, "New York");
        assert_eq!(key.parameter, "o3");
    }

    #[test]
    fn test_parse_rejects_short_names() {
        assert!(parse_raw_filename(&PathBuf::from("readme.csv")).is_err());
        assert!(parse_raw_filename(&PathBuf::from("London_no2.csv")).is_err());
    }

    #[test]
    fn test_is_raw_data_file() {
        assert!(is_raw_data_file(Path::new("London_no2_20250301_120000.csv")));
        assert!(is_raw_data_file(Path::new("London_no2_20250301_120000.json")));
        assert!(!is_raw_data_file(Path::new("London_no2_20250301_120000.txt")));
        assert!(!is_raw_data_file(Path::new("notes")));
    }

    #[test]
    fn test_artifact_names() {
        let key = DatasetKey::new("Los Angeles", "pm25");
        assert_eq!(
            dataset_artifact_name(&key, "20250301_120000", "csv"),
            "Los Angeles_pm25_20250301_120000.csv"
        );
        assert_eq!(
            combined_artifact_name("20250301_120000", "json"),
            "combined_20250301_120000.json"
        );
    }
}
