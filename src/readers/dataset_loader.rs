use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{error, info, warn};

use crate::error::{ProcessingError, Result};
use crate::models::{Dataset, DatasetKey};
use crate::readers::RawReader;
use crate::utils::filename::{is_raw_data_file, parse_raw_filename};

/// Selects and parses the most recent raw file per `(city, parameter)` key.
pub struct DatasetLoader {
    raw_dir: PathBuf,
    reader: RawReader,
}

impl DatasetLoader {
    pub fn new(raw_dir: impl Into<PathBuf>) -> Self {
        Self {
            raw_dir: raw_dir.into(),
            reader: RawReader::new(),
        }
    }

    /// Load the latest dataset for every key found in the raw directory.
    ///
    /// A file that fails to read is logged and skipped; the run only aborts
    /// when no dataset can be produced at all.
    pub fn load_latest(&self) -> Result<Vec<Dataset>> {
        let files = self.list_raw_files()?;

        if files.is_empty() {
            error!("No raw data files found in {}", self.raw_dir.display());
            return Err(ProcessingError::EmptyInput {
                dir: self.raw_dir.clone(),
            });
        }

        let mut datasets = Vec::new();
        for (key, path) in resolve_latest_per_key(&files) {
            match self.reader.read_dataset(&path, key.clone()) {
                Ok(dataset) => {
                    info!(
                        "Loaded {} rows for {} from {}",
                        dataset.len(),
                        key,
                        path.display()
                    );
                    datasets.push(dataset);
                }
                Err(e) => error!("Error loading {}: {}", path.display(), e),
            }
        }

        if datasets.is_empty() {
            return Err(ProcessingError::EmptyInput {
                dir: self.raw_dir.clone(),
            });
        }

        info!("Loaded {} city-parameter datasets", datasets.len());
        Ok(datasets)
    }

    /// Enumerate candidate raw files directly under the raw directory.
    fn list_raw_files(&self) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();

        for entry in fs::read_dir(&self.raw_dir)? {
            let path = entry?.path();
            if path.is_file() && is_raw_data_file(&path) {
                files.push(path);
            }
        }

        Ok(files)
    }
}

/// Resolve the authoritative (most recent) file per dataset key.
///
/// Filenames embed a fixed-width timestamp, so descending lexicographic
/// order is descending chronological order; the first file seen for a key
/// wins and older duplicates are dropped. This is the single place the
/// timestamp-format coupling lives.
pub fn resolve_latest_per_key(files: &[PathBuf]) -> Vec<(DatasetKey, PathBuf)> {
    let mut sorted: Vec<&PathBuf> = files.iter().collect();
    sorted.sort_by(|a, b| b.file_name().cmp(&a.file_name()));

    let mut seen: HashSet<String> = HashSet::new();
    let mut selected = Vec::new();

    for path in sorted {
        match parse_raw_filename(path) {
            Ok(key) => {
                if seen.insert(key.composite()) {
                    selected.push((key, path.clone()));
                }
            }
            Err(e) => warn!("Skipping raw file {}: {}", path.display(), e),
        }
    }

    selected
}

/// Convenience constructor used by tests and the validate command.
pub fn load_datasets(raw_dir: &Path) -> Result<Vec<Dataset>> {
    DatasetLoader::new(raw_dir).load_latest()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_raw(dir: &TempDir, name: &str, contents: &str) {
        let mut file = File::create(dir.path().join(name)).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
    }

    #[test]
    fn test_latest_file_wins_per_key() {
        let dir = TempDir::new().unwrap();
        write_raw(
            &dir,
            "London_no2_20250301_080000.csv",
            "value,parameter\n10,no2\n",
        );
        write_raw(
            &dir,
            "London_no2_20250301_120000.csv",
            "value,parameter\n99,no2\n20,no2\n",
        );

        let loader = DatasetLoader::new(dir.path());
        let datasets = loader.load_latest().unwrap();

        assert_eq!(datasets.len(), 1);
        // Two rows: the newer file, not the older single-row one.
        assert_eq!(datasets[0].len(), 2);
        assert_eq!(datasets[0].key().composite(), "London_no2");
    }

    #[test]
    fn test_two_word_city_key() {
        let dir = TempDir::new().unwrap();
        write_raw(
            &dir,
            "Los_Angeles_pm25_20250301_120000.csv",
            "value\n12.0\n",
        );

        let datasets = load_datasets(dir.path()).unwrap();
        assert_eq!(datasets[0].key().city, "Los Angeles");
        assert_eq!(datasets[0].key().parameter, "pm25");
    }

    #[test]
    fn test_unreadable_file_is_skipped() {
        let dir = TempDir::new().unwrap();
        write_raw(&dir, "London_no2_20250301_120000.json", "{not valid json");
        write_raw(
            &dir,
            "London_pm25_20250301_120000.csv",
            "value\n8.5\n",
        );

        let datasets = load_datasets(dir.path()).unwrap();
        assert_eq!(datasets.len(), 1);
        assert_eq!(datasets[0].key().parameter, "pm25");
    }

    #[test]
    fn test_empty_directory_is_fatal() {
        let dir = TempDir::new().unwrap();
        let result = load_datasets(dir.path());
        assert!(matches!(result, Err(ProcessingError::EmptyInput { .. })));
    }

    #[test]
    fn test_non_raw_files_are_ignored() {
        let dir = TempDir::new().unwrap();
        write_raw(&dir, "notes.txt", "not data");
        let result = load_datasets(dir.path());
        assert!(matches!(result, Err(ProcessingError::EmptyInput { .. })));
    }

    #[test]
    fn test_resolve_latest_per_key_ordering() {
        let files = vec![
            PathBuf::from("London_no2_20250301_080000.csv"),
            PathBuf::from("London_no2_20250302_080000.csv"),
            PathBuf::from("New_York_o3_20250301_080000.csv"),
        ];

        let selected = resolve_latest_per_key(&files);
        assert_eq!(selected.len(), 2);
        assert_eq!(selected[0].0.composite(), "New York_o3");
        assert_eq!(
            selected[1].1.file_name().unwrap(),
            "London_no2_20250302_080000.csv"
        );
    }
}
