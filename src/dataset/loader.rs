use crate::dataset::columns::*;
use crate::dataset::error::LoadError;
use crate::types::measurement::Pollutant;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use log::{debug, info};
use polars::prelude::*;
use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;

const TIMESTAMP_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Reads a delimited text file with a header row into a DataFrame.
pub(crate) fn read_csv_file(path: &Path) -> Result<DataFrame, LoadError> {
    if !path.exists() {
        return Err(LoadError::FileNotFound(path.to_path_buf()));
    }
    info!("Reading air quality data from {:?}", path);
    csv_options()
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .map_err(|e| LoadError::CsvRead(path.to_path_buf(), e))?
        .finish()
        .map_err(|e| LoadError::CsvRead(path.to_path_buf(), e))
}

/// Same as [`read_csv_file`], for CSV content that is already in memory.
pub(crate) fn read_csv_bytes(bytes: Vec<u8>) -> Result<DataFrame, LoadError> {
    csv_options()
        .into_reader_with_file_handle(Cursor::new(bytes))
        .finish()
        .map_err(LoadError::CsvParse)
}

/// Reader options shared by the file and in-memory readers.
///
/// Pollutant and text columns get fixed types so that a late decimal or a
/// late label past the inference window does not fail the read.
fn csv_options() -> CsvReadOptions {
    let text = [
        SOURCE_DATE_TIME,
        SOURCE_STATION,
        SOURCE_ANNUAL_PERIOD,
        SOURCE_AQI_PM2_5,
        SOURCE_AQI_PM10,
    ]
    .into_iter()
    .map(|name| Field::new(PlSmallStr::from_static(name), DataType::String));
    let pollutants = Pollutant::ALL
        .iter()
        .map(|p| Field::new(PlSmallStr::from_static(p.source_column()), DataType::Float64));
    let overwrite: Schema = text.chain(pollutants).collect();

    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(10_000))
        .with_schema_overwrite(Some(Arc::new(overwrite)))
}

/// Validates the input columns and converts them into the normalised schema:
/// parsed millisecond timestamps, `f64` pollutant columns, a filled `hour`
/// column, empty-string annual periods instead of nulls, and a `record_id`.
pub(crate) fn normalize(mut df: DataFrame) -> Result<DataFrame, LoadError> {
    for name in REQUIRED_SOURCE_COLUMNS {
        if df.get_column_index(name).is_none() {
            return Err(LoadError::MissingColumn(name.to_string()));
        }
    }

    let millis = timestamp_millis(df.column(SOURCE_DATE_TIME)?)?;
    let timestamps = Int64Chunked::from_vec(PlSmallStr::from_static(TIMESTAMP), millis)
        .into_datetime(TimeUnit::Milliseconds, None)
        .into_series();
    df.with_column(timestamps)?;

    let record_id = if df.get_column_index(SOURCE_RECORD_ID).is_some() {
        debug!("Using '{}' column as record id", SOURCE_RECORD_ID);
        col(SOURCE_RECORD_ID)
    } else {
        df = df.with_row_index(PlSmallStr::from_static(ROW_POSITION), None)?;
        col(ROW_POSITION)
    };

    let mut columns = vec![
        record_id.cast(DataType::UInt64).alias(RECORD_ID),
        col(TIMESTAMP),
        col(SOURCE_STATION).cast(DataType::String).alias(STATION),
    ];
    columns.extend(
        Pollutant::ALL
            .iter()
            .map(|p| col(p.source_column()).cast(DataType::Float64).alias(p.column())),
    );
    columns.extend([
        col(SOURCE_HOUR)
            .cast(DataType::Int64)
            .fill_null(col(TIMESTAMP).dt().hour().cast(DataType::Int64))
            .alias(HOUR),
        col(SOURCE_ANNUAL_PERIOD)
            .cast(DataType::String)
            .fill_null(lit(""))
            .alias(ANNUAL_PERIOD),
        col(SOURCE_AQI_PM2_5).cast(DataType::String).alias(AQI_PM2_5),
        col(SOURCE_AQI_PM10).cast(DataType::String).alias(AQI_PM10),
    ]);

    let normalized = df.lazy().select(columns).collect()?;
    if normalized.column(RECORD_ID)?.null_count() > 0 {
        return Err(LoadError::InvalidRecordId);
    }
    Ok(normalized)
}

/// Converts the `date_time` column into epoch milliseconds.
///
/// Text columns are parsed row by row so that the first offending value can be
/// reported; columns the CSV reader already typed as dates are cast.
fn timestamp_millis(column: &Column) -> Result<Vec<i64>, LoadError> {
    match column.dtype() {
        DataType::String => column
            .str()?
            .into_iter()
            .enumerate()
            .map(|(row, value)| {
                let value = value.ok_or(LoadError::MissingTimestamp(row))?;
                parse_timestamp(value)
                    .map(|ts| ts.and_utc().timestamp_millis())
                    .ok_or_else(|| LoadError::TimestampParse {
                        row,
                        value: value.to_string(),
                    })
            })
            .collect(),
        DataType::Datetime(_, _) | DataType::Date => {
            let millis = column
                .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?
                .cast(&DataType::Int64)?;
            millis
                .i64()?
                .into_iter()
                .enumerate()
                .map(|(row, value)| value.ok_or(LoadError::MissingTimestamp(row)))
                .collect()
        }
        other => Err(LoadError::UnsupportedColumnType {
            column: SOURCE_DATE_TIME.to_string(),
            dtype: other.clone(),
        }),
    }
}

pub(crate) fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .map(|date| date.and_time(NaiveTime::MIN))
        })
}
