use polars::error::PolarsError;
use polars::prelude::DataType;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Input file '{0}' does not exist")]
    FileNotFound(PathBuf),

    #[error("Failed to read CSV file '{0}'")]
    CsvRead(PathBuf, #[source] PolarsError),

    #[error("Failed to parse in-memory CSV data")]
    CsvParse(#[source] PolarsError),

    #[error("Required column '{0}' not found in input")]
    MissingColumn(String),

    #[error("Column '{column}' has unsupported type {dtype:?}")]
    UnsupportedColumnType { column: String, dtype: DataType },

    #[error("Missing timestamp in row {0}")]
    MissingTimestamp(usize),

    #[error("Unparseable timestamp '{value}' in row {row}")]
    TimestampParse { row: usize, value: String },

    #[error("Missing station in row {0}")]
    MissingStation(usize),

    #[error("Missing hour in row {0}")]
    MissingHour(usize),

    #[error("Hour {value} in row {row} is outside 0-23")]
    HourOutOfRange { row: usize, value: i64 },

    #[error("Unknown AQI category '{value}' in column '{column}'")]
    UnknownCategory { column: String, value: String },

    #[error("Record id column contains missing or negative values")]
    InvalidRecordId,

    #[error("Dataset contains no rows")]
    Empty,

    #[error("Failed processing DataFrame: {0}")]
    DataFrameProcessing(#[from] PolarsError),
}
