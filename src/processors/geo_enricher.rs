use tracing::{info, warn};

use crate::models::{CellValue, Dataset};
use crate::utils::constants::{COL_CITY, COL_DISTRICT, COL_LATITUDE, COL_LONGITUDE, DEFAULT_DISTRICT};
use crate::utils::coordinates::{centroid_for_city, validate_coordinates};

/// Ensures every output row carries usable `latitude`, `longitude`, and
/// `district` fields.
pub struct GeoEnricher;

impl GeoEnricher {
    pub fn new() -> Self {
        Self
    }

    /// Enrich a dataset with coordinates and a district.
    ///
    /// Sources win over the static table: city centroids are assigned only
    /// when the dataset has no coordinate-like columns at all, and any
    /// alternate-named coordinate column is then copied into the canonical
    /// fields.
    pub fn enrich(&self, dataset: &Dataset) -> Dataset {
        let key = dataset.key().composite();
        info!("Adding geographical data to dataset: {}", key);

        let mut enriched = dataset.clone();

        let has_lat = has_column_containing(dataset, "lat");
        let has_lon = has_column_containing(dataset, "lon");

        if !(has_lat && has_lon) && dataset.has_column(COL_CITY) {
            self.assign_centroids(&mut enriched);
        }

        self.canonicalize_coordinate_columns(&mut enriched);
        self.check_coordinate_bounds(&enriched, &key);

        if !enriched.has_column(COL_DISTRICT) {
            for index in 0..enriched.len() {
                enriched.set(
                    index,
                    COL_DISTRICT,
                    CellValue::Text(DEFAULT_DISTRICT.to_string()),
                );
            }
            info!("Added placeholder district information for {}", key);
        }

        enriched
    }

    /// Backfill coordinates from the static city centroid table. Cities
    /// outside the table keep missing coordinates.
    fn assign_centroids(&self, dataset: &mut Dataset) {
        let mut assigned = 0;

        for index in 0..dataset.len() {
            let Some((latitude, longitude)) = dataset
                .get(index, COL_CITY)
                .and_then(CellValue::as_str)
                .and_then(centroid_for_city)
            else {
                continue;
            };

            dataset.set(index, COL_LATITUDE, CellValue::Number(latitude));
            dataset.set(index, COL_LONGITUDE, CellValue::Number(longitude));
            assigned += 1;
        }

        if assigned > 0 {
            info!("Added coordinates based on city names to {} rows", assigned);
        }
    }

    /// Copy alternate-named coordinate columns into the canonical fields.
    /// When several candidates exist the last one in column order wins.
    fn canonicalize_coordinate_columns(&self, dataset: &mut Dataset) {
        let columns: Vec<String> = dataset.columns().to_vec();

        for column in columns {
            let lowered = column.to_lowercase();
            let target = if lowered.contains("lat") && column != COL_LATITUDE {
                COL_LATITUDE
            } else if lowered.contains("lon") && column != COL_LONGITUDE {
                COL_LONGITUDE
            } else {
                continue;
            };

            for index in 0..dataset.len() {
                let value = dataset.get(index, &column).cloned().unwrap_or(CellValue::Null);
                dataset.set(index, target, value);
            }
            info!("Standardized '{}' to '{}'", column, target);
        }
    }

    /// Sanity-check the final coordinates; out-of-bounds values are kept
    /// but reported, since upstream sensors do emit garbage.
    fn check_coordinate_bounds(&self, dataset: &Dataset, key: &str) {
        let mut invalid = 0;

        for row in dataset.rows() {
            let latitude = row.get(COL_LATITUDE).and_then(CellValue::as_f64);
            let longitude = row.get(COL_LONGITUDE).and_then(CellValue::as_f64);

            if let (Some(latitude), Some(longitude)) = (latitude, longitude) {
                if validate_coordinates(latitude, longitude).is_err() {
                    invalid += 1;
                }
            }
        }

        if invalid > 0 {
            warn!("{}: {} rows carry out-of-bounds coordinates", key, invalid);
        }
    }
}

impl Default for GeoEnricher {
    fn default() -> Self {
        Self::new()
    }
}

fn has_column_containing(dataset: &Dataset, fragment: &str) -> bool {
    dataset
        .columns()
        .iter()
        .any(|column| column.to_lowercase().contains(fragment))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DatasetKey, Row};
    use std::collections::HashMap;

    fn row(cells: &[(&str, CellValue)]) -> Row {
        cells
            .iter()
            .map(|(name, value)| (name.to_string(), value.clone()))
            .collect::<HashMap<_, _>>()
    }

    fn dataset(key: &str, columns: &[&str], rows: Vec<Row>) -> Dataset {
        Dataset::from_rows(
            DatasetKey::from_composite(key),
            columns.iter().map(|c| c.to_string()).collect(),
            rows,
        )
    }

    #[test]
    fn test_centroid_backfill_for_known_city() {
        let ds = dataset(
            "Los Angeles_pm25",
            &["city", "value"],
            vec![row(&[
                ("city", CellValue::Text("Los Angeles".into())),
                ("value", CellValue::Number(12.0)),
            ])],
        );

        let enriched = GeoEnricher::new().enrich(&ds);
        assert_eq!(
            enriched.get(0, "latitude"),
            Some(&CellValue::Number(34.0522))
        );
        assert_eq!(
            enriched.get(0, "longitude"),
            Some(&CellValue::Number(-118.2437))
        );
    }

    #[test]
    fn test_unknown_city_keeps_missing_coordinates() {
        let ds = dataset(
            "Paris_pm25",
            &["city", "value"],
            vec![row(&[
                ("city", CellValue::Text("Paris".into())),
                ("value", CellValue::Number(12.0)),
            ])],
        );

        let enriched = GeoEnricher::new().enrich(&ds);
        assert_eq!(enriched.get(0, "latitude"), None);
        assert_eq!(enriched.get(0, "longitude"), None);
    }

    #[test]
    fn test_alternate_columns_are_canonicalized() {
        let ds = dataset(
            "London_no2",
            &["city", "gps_lat", "gps_lon"],
            vec![row(&[
                ("city", CellValue::Text("London".into())),
                ("gps_lat", CellValue::Number(51.6)),
                ("gps_lon", CellValue::Number(-0.2)),
            ])],
        );

        let enriched = GeoEnricher::new().enrich(&ds);
        // Source coordinates win; the centroid table is not consulted.
        assert_eq!(enriched.get(0, "latitude"), Some(&CellValue::Number(51.6)));
        assert_eq!(enriched.get(0, "longitude"), Some(&CellValue::Number(-0.2)));
        // Original columns are preserved.
        assert!(enriched.has_column("gps_lat"));
    }

    #[test]
    fn test_partial_coordinates_fall_back_to_centroid_then_copy() {
        // A lat-like column exists but no lon-like one: centroids are
        // assigned first, then the source latitude overrides.
        let ds = dataset(
            "London_no2",
            &["city", "sensor_lat"],
            vec![row(&[
                ("city", CellValue::Text("London".into())),
                ("sensor_lat", CellValue::Number(51.6)),
            ])],
        );

        let enriched = GeoEnricher::new().enrich(&ds);
        assert_eq!(enriched.get(0, "latitude"), Some(&CellValue::Number(51.6)));
        assert_eq!(
            enriched.get(0, "longitude"),
            Some(&CellValue::Number(-0.1278))
        );
    }

    #[test]
    fn test_district_placeholder() {
        let ds = dataset(
            "London_no2",
            &["city"],
            vec![
                row(&[("city", CellValue::Text("London".into()))]),
                row(&[("city", CellValue::Text("London".into()))]),
            ],
        );

        let enriched = GeoEnricher::new().enrich(&ds);
        for index in 0..enriched.len() {
            assert_eq!(
                enriched.get(index, "district"),
                Some(&CellValue::Text("Downtown".into()))
            );
        }
    }

    #[test]
    fn test_existing_district_is_preserved() {
        let ds = dataset(
            "London_no2",
            &["city", "district"],
            vec![row(&[
                ("city", CellValue::Text("London".into())),
                ("district", CellValue::Text("Camden".into())),
            ])],
        );

        let enriched = GeoEnricher::new().enrich(&ds);
        assert_eq!(
            enriched.get(0, "district"),
            Some(&CellValue::Text("Camden".into()))
        );
    }
}
