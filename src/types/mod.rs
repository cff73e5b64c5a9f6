pub mod aqi_category;
pub mod granularity;
pub mod measurement;
pub mod period;
pub mod station;
