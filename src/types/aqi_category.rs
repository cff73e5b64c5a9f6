//! Defines the `AqiCategory` enum and the per-pollutant category taxonomies
//! used by the `AQIBYPM2.5` and `AQIBYPM10` columns.

use serde::Serialize;
use std::fmt;

/// An Air Quality Index rating, ordered from best to worst.
///
/// The source data carries one precomputed label per row and pollutant. The
/// labels are the literal strings returned by [`AqiCategory::label`].
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Serialize)]
pub enum AqiCategory {
    Good,
    Moderate,
    /// Only part of the PM2.5 taxonomy.
    UnhealthyForSensitiveGroups,
    Unhealthy,
    VeryUnhealthy,
    Hazardous,
}

impl AqiCategory {
    /// Parses a category label as it appears in the source file.
    ///
    /// Surrounding whitespace is ignored, the comparison itself is exact.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use aqdash::AqiCategory;
    ///
    /// assert_eq!(AqiCategory::from_label("Very Unhealthy"), Some(AqiCategory::VeryUnhealthy));
    /// assert_eq!(AqiCategory::from_label("Dusty"), None);
    /// ```
    pub fn from_label(value: &str) -> Option<Self> {
        match value.trim() {
            "Good" => Some(AqiCategory::Good),
            "Moderate" => Some(AqiCategory::Moderate),
            "Unhealthy for Sensitive Groups" => Some(AqiCategory::UnhealthyForSensitiveGroups),
            "Unhealthy" => Some(AqiCategory::Unhealthy),
            "Very Unhealthy" => Some(AqiCategory::VeryUnhealthy),
            "Hazardous" => Some(AqiCategory::Hazardous),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AqiCategory::Good => "Good",
            AqiCategory::Moderate => "Moderate",
            AqiCategory::UnhealthyForSensitiveGroups => "Unhealthy for Sensitive Groups",
            AqiCategory::Unhealthy => "Unhealthy",
            AqiCategory::VeryUnhealthy => "Very Unhealthy",
            AqiCategory::Hazardous => "Hazardous",
        }
    }
}

impl fmt::Display for AqiCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

const PM2_5_TAXONOMY: [AqiCategory; 6] = [
    AqiCategory::Good,
    AqiCategory::Moderate,
    AqiCategory::UnhealthyForSensitiveGroups,
    AqiCategory::Unhealthy,
    AqiCategory::VeryUnhealthy,
    AqiCategory::Hazardous,
];

const PM10_TAXONOMY: [AqiCategory; 5] = [
    AqiCategory::Good,
    AqiCategory::Moderate,
    AqiCategory::Unhealthy,
    AqiCategory::VeryUnhealthy,
    AqiCategory::Hazardous,
];

/// The pollutants that carry a precomputed AQI category in the dataset.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, Serialize)]
pub enum AqiPollutant {
    Pm25,
    Pm10,
}

impl AqiPollutant {
    /// The ordered category taxonomy of this pollutant.
    ///
    /// PM10 has no "Unhealthy for Sensitive Groups" band.
    ///
    /// ```rust
    /// use aqdash::{AqiCategory, AqiPollutant};
    ///
    /// assert_eq!(AqiPollutant::Pm25.taxonomy().len(), 6);
    /// assert!(!AqiPollutant::Pm10
    ///     .taxonomy()
    ///     .contains(&AqiCategory::UnhealthyForSensitiveGroups));
    /// ```
    pub fn taxonomy(&self) -> &'static [AqiCategory] {
        match self {
            AqiPollutant::Pm25 => &PM2_5_TAXONOMY,
            AqiPollutant::Pm10 => &PM10_TAXONOMY,
        }
    }

    pub fn admits(&self, category: AqiCategory) -> bool {
        self.taxonomy().contains(&category)
    }
}

impl fmt::Display for AqiPollutant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AqiPollutant::Pm25 => f.write_str("PM2.5"),
            AqiPollutant::Pm10 => f.write_str("PM10"),
        }
    }
}
