/// Canonical column names of the combined-artifact contract
pub const COL_VALUE: &str = "value";
pub const COL_PARAMETER: &str = "parameter";
pub const COL_CITY: &str = "city";
pub const COL_DISTRICT: &str = "district";
pub const COL_LATITUDE: &str = "latitude";
pub const COL_LONGITUDE: &str = "longitude";
pub const COL_AQI: &str = "aqi";
pub const COL_AQI_CATEGORY: &str = "aqi_category";
pub const COL_HEALTH_RECOMMENDATION: &str = "health_recommendation";

/// Alternative source columns adopted for `value`, tried in priority order
pub const VALUE_ALTERNATIVES: [&str; 4] = ["average", "mean", "concentration", "result"];

/// City names whose words get split by underscores in filenames and keys
pub const TWO_WORD_CITIES: [(&str, &str); 2] = [("Los", "Angeles"), ("New", "York")];

/// District placeholder assigned when the source carries no district data
pub const DEFAULT_DISTRICT: &str = "Downtown";

/// Filler for non-numeric columns with no observed values
pub const UNKNOWN_FILL: &str = "Unknown";

/// Outlier bounds are mean ± this many standard deviations
pub const DEFAULT_OUTLIER_SIGMA: f64 = 3.0;

/// AQI index ceiling for concentrations beyond the top breakpoint tier
pub const AQI_MAX: i64 = 500;

/// Run timestamp format; fixed-width so filenames sort chronologically
pub const RUN_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Directory defaults matching the collaborating extractor/loader layout
pub const DEFAULT_RAW_DIR: &str = "data/raw";
pub const DEFAULT_PROCESSED_DIR: &str = "data/processed";

/// Filename prefix of the combined artifact the downstream loader scans for
pub const COMBINED_PREFIX: &str = "combined";
