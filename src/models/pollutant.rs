use serde::{Deserialize, Serialize};

/// One tier of a pollutant's breakpoint table: the concentration range
/// `[c_low, c_high]` maps linearly onto the index range `[i_low, i_high]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BreakpointTier {
    pub c_low: f64,
    pub c_high: f64,
    pub i_low: i64,
    pub i_high: i64,
}

/// PM2.5 breakpoints, 24-hour average, µg/m³.
const PM25_BREAKPOINTS: [BreakpointTier; 6] = [
    BreakpointTier { c_low: 0.0, c_high: 12.0, i_low: 0, i_high: 50 },
    BreakpointTier { c_low: 12.1, c_high: 35.4, i_low: 51, i_high: 100 },
    BreakpointTier { c_low: 35.5, c_high: 55.4, i_low: 101, i_high: 150 },
    BreakpointTier { c_low: 55.5, c_high: 150.4, i_low: 151, i_high: 200 },
    BreakpointTier { c_low: 150.5, c_high: 250.4, i_low: 201, i_high: 300 },
    BreakpointTier { c_low: 250.5, c_high: 500.4, i_low: 301, i_high: 500 },
];

/// Ozone breakpoints, 8-hour average, ppb.
const O3_BREAKPOINTS: [BreakpointTier; 6] = [
    BreakpointTier { c_low: 0.0, c_high: 54.0, i_low: 0, i_high: 50 },
    BreakpointTier { c_low: 55.0, c_high: 70.0, i_low: 51, i_high: 100 },
    BreakpointTier { c_low: 71.0, c_high: 85.0, i_low: 101, i_high: 150 },
    BreakpointTier { c_low: 86.0, c_high: 105.0, i_low: 151, i_high: 200 },
    BreakpointTier { c_low: 106.0, c_high: 200.0, i_low: 201, i_high: 300 },
    BreakpointTier { c_low: 201.0, c_high: 604.0, i_low: 301, i_high: 500 },
];

/// NO2 breakpoints, 1-hour average, ppb.
const NO2_BREAKPOINTS: [BreakpointTier; 6] = [
    BreakpointTier { c_low: 0.0, c_high: 53.0, i_low: 0, i_high: 50 },
    BreakpointTier { c_low: 54.0, c_high: 100.0, i_low: 51, i_high: 100 },
    BreakpointTier { c_low: 101.0, c_high: 360.0, i_low: 101, i_high: 150 },
    BreakpointTier { c_low: 361.0, c_high: 649.0, i_low: 151, i_high: 200 },
    BreakpointTier { c_low: 650.0, c_high: 1249.0, i_low: 201, i_high: 300 },
    BreakpointTier { c_low: 1250.0, c_high: 2049.0, i_low: 301, i_high: 500 },
];

/// Pollutant families with a declared AQI breakpoint table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Pollutant {
    Pm25,
    O3,
    No2,
}

impl Pollutant {
    /// Resolve a parameter name as it appears in raw data. Unrecognized
    /// names return `None`; the calculator decides the fallback.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "pm25" => Some(Pollutant::Pm25),
            "o3" => Some(Pollutant::O3),
            "no2" => Some(Pollutant::No2),
            _ => None,
        }
    }

    pub fn breakpoints(&self) -> &'static [BreakpointTier] {
        match self {
            Pollutant::Pm25 => &PM25_BREAKPOINTS,
            Pollutant::O3 => &O3_BREAKPOINTS,
            Pollutant::No2 => &NO2_BREAKPOINTS,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Pollutant::Pm25 => "PM2.5",
            Pollutant::O3 => "Ozone",
            Pollutant::No2 => "Nitrogen Dioxide",
        }
    }

    pub fn units(&self) -> &'static str {
        match self {
            Pollutant::Pm25 => "µg/m³",
            Pollutant::O3 | Pollutant::No2 => "ppb",
        }
    }
}

impl std::fmt::Display for Pollutant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// AQI severity categories: the six breakpoint tiers plus the two
/// out-of-table boundary categories and the degraded-row fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AqiCategory {
    Good,
    Moderate,
    UnhealthySensitive,
    Unhealthy,
    VeryUnhealthy,
    Hazardous,
    HazardousBeyondIndex,
    GoodBelowIndex,
    Unknown,
}

impl AqiCategory {
    /// Category of the breakpoint tier at `index` (ascending severity).
    pub fn for_tier(index: usize) -> Self {
        match index {
            0 => AqiCategory::Good,
            1 => AqiCategory::Moderate,
            2 => AqiCategory::UnhealthySensitive,
            3 => AqiCategory::Unhealthy,
            4 => AqiCategory::VeryUnhealthy,
            _ => AqiCategory::Hazardous,
        }
    }

    /// The literal category string of the output contract.
    pub fn as_str(&self) -> &'static str {
        match self {
            AqiCategory::Good => "Good",
            AqiCategory::Moderate => "Moderate",
            AqiCategory::UnhealthySensitive => "Unhealthy for Sensitive Groups",
            AqiCategory::Unhealthy => "Unhealthy",
            AqiCategory::VeryUnhealthy => "Very Unhealthy",
            AqiCategory::Hazardous => "Hazardous",
            AqiCategory::HazardousBeyondIndex => "Hazardous (Beyond Index)",
            AqiCategory::GoodBelowIndex => "Good (Below Index)",
            AqiCategory::Unknown => "Unknown",
        }
    }

    /// The fixed health guidance sentence attached to every output row.
    pub fn health_recommendation(&self) -> &'static str {
        match self {
            AqiCategory::Good | AqiCategory::GoodBelowIndex => {
                "Air quality is satisfactory, and air pollution poses little or no risk."
            }
            AqiCategory::Moderate => {
                "Air quality is acceptable. However, there may be a risk for some people, \
                 particularly those who are unusually sensitive to air pollution."
            }
            AqiCategory::UnhealthySensitive => {
                "Members of sensitive groups may experience health effects. The general \
                 public is less likely to be affected."
            }
            AqiCategory::Unhealthy => {
                "Some members of the general public may experience health effects; members \
                 of sensitive groups may experience more serious health effects."
            }
            AqiCategory::VeryUnhealthy => {
                "Health alert: The risk of health effects is increased for everyone."
            }
            AqiCategory::Hazardous => {
                "Health warning of emergency conditions: everyone is more likely to be affected."
            }
            AqiCategory::HazardousBeyondIndex => {
                "Health warning of emergency conditions: everyone is at risk of serious \
                 health effects."
            }
            AqiCategory::Unknown => {
                "Unable to determine health risk due to missing or invalid data."
            }
        }
    }
}

impl std::fmt::Display for AqiCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
