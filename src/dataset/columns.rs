//! Column names of the input file and of the normalised dataset frame.
//!
//! Pollutant columns keep their upper-case names (`PM2.5`, `CO`, ...) in the
//! input and are renamed to [`crate::Pollutant::column`] in the normalised
//! frame.

pub(crate) const SOURCE_DATE_TIME: &str = "date_time";
pub(crate) const SOURCE_STATION: &str = "station";
pub(crate) const SOURCE_HOUR: &str = "hour";
pub(crate) const SOURCE_ANNUAL_PERIOD: &str = "annually_period";
pub(crate) const SOURCE_AQI_PM2_5: &str = "AQIBYPM2.5";
pub(crate) const SOURCE_AQI_PM10: &str = "AQIBYPM10";
/// Optional; used as the record id when present.
pub(crate) const SOURCE_RECORD_ID: &str = "idx";

pub(crate) const REQUIRED_SOURCE_COLUMNS: [&str; 11] = [
    SOURCE_DATE_TIME,
    SOURCE_STATION,
    "PM2.5",
    "PM10",
    "SO2",
    "NO2",
    "CO",
    SOURCE_HOUR,
    SOURCE_ANNUAL_PERIOD,
    SOURCE_AQI_PM2_5,
    SOURCE_AQI_PM10,
];

pub const RECORD_ID: &str = "record_id";
pub const TIMESTAMP: &str = "timestamp";
pub const STATION: &str = "station";
pub const HOUR: &str = "hour";
pub const ANNUAL_PERIOD: &str = "annual_period";
pub const AQI_PM2_5: &str = "aqi_pm2_5";
pub const AQI_PM10: &str = "aqi_pm10";

pub(crate) const ROW_POSITION: &str = "__row_position";
