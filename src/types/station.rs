//! Defines the station choice offered to the user: one monitoring station or
//! all of them.

use serde::Serialize;
use std::fmt;

/// Label used for [`StationSelection::All`] unless the dashboard is configured
/// with a different one.
pub const DEFAULT_ALL_STATIONS_LABEL: &str = "All stations";

/// Which monitoring stations feed the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize)]
pub enum StationSelection {
    /// Sentinel for "no station narrowing".
    #[default]
    All,
    /// A single station, by identifier.
    Station(String),
}

impl StationSelection {
    pub fn station(name: impl Into<String>) -> Self {
        StationSelection::Station(name.into())
    }

    pub fn is_all(&self) -> bool {
        matches!(self, StationSelection::All)
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            StationSelection::All => None,
            StationSelection::Station(name) => Some(name),
        }
    }

    /// Text for a selection widget, using `all_label` for the sentinel.
    pub fn display_with<'a>(&'a self, all_label: &'a str) -> &'a str {
        self.name().unwrap_or(all_label)
    }
}

impl fmt::Display for StationSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_with(DEFAULT_ALL_STATIONS_LABEL))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_uses_sentinel_label() {
        assert_eq!(StationSelection::All.to_string(), "All stations");
        assert_eq!(StationSelection::All.display_with("Semua Distrik"), "Semua Distrik");
        assert_eq!(StationSelection::station("Dongsi").to_string(), "Dongsi");
    }
}
