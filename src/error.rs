use crate::dataset::error::LoadError;
use polars::error::PolarsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AirQualityError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("Failed to evaluate filter predicate: {0}")]
    FilterEvaluation(#[from] PolarsError),
}
