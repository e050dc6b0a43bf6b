use validator::Validate;

use crate::error::{ProcessingError, Result};

/// A city centroid used to backfill coordinates when a source provides none.
#[derive(Debug, Clone, Validate)]
pub struct CityCentroid {
    pub city: &'static str,

    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,

    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,
}

/// Static centroid table for the cities the extractor polls.
pub const CITY_CENTROIDS: [CityCentroid; 3] = [
    CityCentroid { city: "Los Angeles", latitude: 34.0522, longitude: -118.2437 },
    CityCentroid { city: "New York", latitude: 40.7128, longitude: -74.0060 },
    CityCentroid { city: "London", latitude: 51.5074, longitude: -0.1278 },
];

/// Look up the centroid coordinates for a city, if it is a known one.
pub fn centroid_for_city(city: &str) -> Option<(f64, f64)> {
    CITY_CENTROIDS
        .iter()
        .find(|c| c.city == city)
        .map(|c| (c.latitude, c.longitude))
}

/// Validate that a coordinate pair lies within world bounds.
pub fn validate_coordinates(latitude: f64, longitude: f64) -> Result<()> {
    if !(-90.0..=90.0).contains(&latitude) {
        return Err(ProcessingError::InvalidCoordinate(format!(
            "Latitude {} is outside bounds [-90, 90]",
            latitude
        )));
    }

    if !(-180.0..=180.0).contains(&longitude) {
        return Err(ProcessingError::InvalidCoordinate(format!(
            "Longitude {} is outside bounds [-180, 180]",
            longitude
        )));
    }

    Ok(())
}
