use crate::dataset::columns::*;
use crate::dataset::error::LoadError;
use crate::types::aqi_category::{AqiCategory, AqiPollutant};
use crate::types::measurement::{Measurement, Pollutant, PollutantSet};
use chrono::{DateTime, NaiveDateTime};
use polars::prelude::*;

fn get_opt_float(ca: &Float64Chunked, idx: usize) -> Option<f64> {
    ca.get(idx).filter(|value| !value.is_nan())
}

fn get_timestamp(ca: &Int64Chunked, idx: usize) -> Option<NaiveDateTime> {
    ca.get(idx)
        .and_then(DateTime::from_timestamp_millis)
        .map(|dt| dt.naive_utc())
}

fn get_category(
    ca: &StringChunked,
    idx: usize,
    pollutant: AqiPollutant,
    column: &str,
) -> Result<Option<AqiCategory>, LoadError> {
    let Some(value) = ca.get(idx).filter(|v| !v.trim().is_empty()) else {
        return Ok(None);
    };
    AqiCategory::from_label(value)
        .filter(|category| pollutant.admits(*category))
        .map(Some)
        .ok_or_else(|| LoadError::UnknownCategory {
            column: column.to_string(),
            value: value.to_string(),
        })
}

/// Converts a normalised frame into typed rows, validating station, hour and
/// category values on the way.
pub(crate) fn extract_measurements(df: &DataFrame) -> Result<Vec<Measurement>, LoadError> {
    let record_ids = df.column(RECORD_ID)?.u64()?;
    let timestamp_millis = df.column(TIMESTAMP)?.cast(&DataType::Int64)?;
    let timestamps = timestamp_millis.i64()?;
    let stations = df.column(STATION)?.str()?;
    let hours = df.column(HOUR)?.i64()?;
    let periods = df.column(ANNUAL_PERIOD)?.str()?;
    let pm25_categories = df.column(AQI_PM2_5)?.str()?;
    let pm10_categories = df.column(AQI_PM10)?.str()?;
    let values = PollutantSet {
        pm2_5: df.column(Pollutant::Pm25.column())?.f64()?,
        pm10: df.column(Pollutant::Pm10.column())?.f64()?,
        so2: df.column(Pollutant::So2.column())?.f64()?,
        no2: df.column(Pollutant::No2.column())?.f64()?,
        co: df.column(Pollutant::Co.column())?.f64()?,
    };

    (0..df.height())
        .map(|row| {
            let timestamp =
                get_timestamp(timestamps, row).ok_or(LoadError::MissingTimestamp(row))?;
            let station = stations
                .get(row)
                .filter(|s| !s.is_empty())
                .ok_or(LoadError::MissingStation(row))?;
            let hour = hours.get(row).ok_or(LoadError::MissingHour(row))?;
            if !(0..=23).contains(&hour) {
                return Err(LoadError::HourOutOfRange { row, value: hour });
            }

            Ok(Measurement {
                record_id: record_ids.get(row).ok_or(LoadError::InvalidRecordId)?,
                timestamp,
                station: station.to_string(),
                concentrations: PollutantSet::from_fn(|p| get_opt_float(values.get(p), row)),
                annual_period: periods.get(row).unwrap_or_default().to_string(),
                aqi_category_pm25: get_category(
                    pm25_categories,
                    row,
                    AqiPollutant::Pm25,
                    SOURCE_AQI_PM2_5,
                )?,
                aqi_category_pm10: get_category(
                    pm10_categories,
                    row,
                    AqiPollutant::Pm10,
                    SOURCE_AQI_PM10,
                )?,
                hour: hour as u32,
            })
        })
        .collect()
}
