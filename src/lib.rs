mod aggregation;
mod classification;
mod dashboard;
mod dataset;
mod error;
mod filtering;
mod ranking;
mod types;

pub use error::AirQualityError;

pub use dashboard::*;

pub use dataset::columns;
pub use dataset::error::LoadError;
pub use dataset::{Dataset, FilteredView};

pub use filtering::{resolve, FilterAdvisory, FilterMode, FilterParams, FilterState, PeriodSelection};

pub use aggregation::{aggregate, summarize, AggregateRow, BucketKey, PollutantStats};
pub use classification::{classify_and_count, CategoryCount, Emphasis};
pub use ranking::{rank_stations, StationMean, StationRanking, DEFAULT_RANKING_SIZE};

pub use types::aqi_category::{AqiCategory, AqiPollutant};
pub use types::granularity::Granularity;
pub use types::measurement::{Measurement, Pollutant, PollutantSet};
pub use types::period::{AnnualPeriod, DateWindow};
pub use types::station::{StationSelection, DEFAULT_ALL_STATIONS_LABEL};
