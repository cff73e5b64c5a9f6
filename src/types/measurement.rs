//! Typed representation of one row of the air-quality table.

use crate::types::aqi_category::{AqiCategory, AqiPollutant};
use chrono::NaiveDateTime;
use serde::Serialize;
use std::fmt;

/// The pollutant concentrations recorded for every measurement (μg/m³).
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, Serialize)]
pub enum Pollutant {
    Pm25,
    Pm10,
    So2,
    No2,
    Co,
}

impl Pollutant {
    pub const ALL: [Pollutant; 5] = [
        Pollutant::Pm25,
        Pollutant::Pm10,
        Pollutant::So2,
        Pollutant::No2,
        Pollutant::Co,
    ];

    /// Column name in the input file.
    pub(crate) fn source_column(&self) -> &'static str {
        match self {
            Pollutant::Pm25 => "PM2.5",
            Pollutant::Pm10 => "PM10",
            Pollutant::So2 => "SO2",
            Pollutant::No2 => "NO2",
            Pollutant::Co => "CO",
        }
    }

    /// Column name in the normalised dataset frame.
    pub fn column(&self) -> &'static str {
        match self {
            Pollutant::Pm25 => "pm2_5",
            Pollutant::Pm10 => "pm10",
            Pollutant::So2 => "so2",
            Pollutant::No2 => "no2",
            Pollutant::Co => "co",
        }
    }
}

impl From<AqiPollutant> for Pollutant {
    fn from(value: AqiPollutant) -> Self {
        match value {
            AqiPollutant::Pm25 => Pollutant::Pm25,
            AqiPollutant::Pm10 => Pollutant::Pm10,
        }
    }
}

impl fmt::Display for Pollutant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.source_column())
    }
}

/// One value per pollutant, addressable by [`Pollutant`].
#[derive(Debug, Default, PartialEq, Clone, Copy, Serialize)]
pub struct PollutantSet<T> {
    pub pm2_5: T,
    pub pm10: T,
    pub so2: T,
    pub no2: T,
    pub co: T,
}

impl<T> PollutantSet<T> {
    pub fn from_fn(mut f: impl FnMut(Pollutant) -> T) -> Self {
        Self {
            pm2_5: f(Pollutant::Pm25),
            pm10: f(Pollutant::Pm10),
            so2: f(Pollutant::So2),
            no2: f(Pollutant::No2),
            co: f(Pollutant::Co),
        }
    }

    pub fn get(&self, pollutant: Pollutant) -> &T {
        match pollutant {
            Pollutant::Pm25 => &self.pm2_5,
            Pollutant::Pm10 => &self.pm10,
            Pollutant::So2 => &self.so2,
            Pollutant::No2 => &self.no2,
            Pollutant::Co => &self.co,
        }
    }

    pub fn get_mut(&mut self, pollutant: Pollutant) -> &mut T {
        match pollutant {
            Pollutant::Pm25 => &mut self.pm2_5,
            Pollutant::Pm10 => &mut self.pm10,
            Pollutant::So2 => &mut self.so2,
            Pollutant::No2 => &mut self.no2,
            Pollutant::Co => &mut self.co,
        }
    }

    pub fn map<U>(self, mut f: impl FnMut(T) -> U) -> PollutantSet<U> {
        PollutantSet {
            pm2_5: f(self.pm2_5),
            pm10: f(self.pm10),
            so2: f(self.so2),
            no2: f(self.no2),
            co: f(self.co),
        }
    }
}

/// A single station reading.
#[derive(Debug, PartialEq, Clone, Serialize)]
pub struct Measurement {
    /// Stable identifier assigned when the dataset is loaded.
    pub record_id: u64,
    pub timestamp: NaiveDateTime,
    pub station: String,
    pub concentrations: PollutantSet<Option<f64>>,
    /// Empty when the row is not assigned to a named period.
    pub annual_period: String,
    pub aqi_category_pm25: Option<AqiCategory>,
    pub aqi_category_pm10: Option<AqiCategory>,
    pub hour: u32,
}

impl Measurement {
    pub fn value(&self, pollutant: Pollutant) -> Option<f64> {
        *self.concentrations.get(pollutant)
    }

    pub fn aqi_category(&self, pollutant: AqiPollutant) -> Option<AqiCategory> {
        match pollutant {
            AqiPollutant::Pm25 => self.aqi_category_pm25,
            AqiPollutant::Pm10 => self.aqi_category_pm10,
        }
    }
}
