//! Best and worst stations by average concentration.

use crate::aggregation::{AggregateRow, BucketKey};
use crate::types::aqi_category::AqiPollutant;
use crate::types::measurement::Pollutant;
use ordered_float::OrderedFloat;
use serde::Serialize;
use std::cmp::Reverse;

/// Number of stations in each ranking unless configured otherwise.
pub const DEFAULT_RANKING_SIZE: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationMean {
    pub station: String,
    pub mean: f64,
    pub row_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationRanking {
    pub pollutant: AqiPollutant,
    /// Highest average first.
    pub worst: Vec<StationMean>,
    /// Lowest average first.
    pub best: Vec<StationMean>,
}

/// Ranks the rows of a [`crate::Granularity::Station`] aggregation by the
/// mean of `pollutant`.
///
/// Rows that are not station buckets, or whose mean is `NaN`, are skipped.
/// Equal means are ordered by station name.
pub fn rank_stations(rows: &[AggregateRow], pollutant: AqiPollutant, size: usize) -> StationRanking {
    let mut candidates: Vec<(OrderedFloat<f64>, StationMean)> = rows
        .iter()
        .filter_map(|row| {
            let BucketKey::Station(station) = &row.key else {
                return None;
            };
            let mean = row.mean(Pollutant::from(pollutant));
            (!mean.is_nan()).then(|| {
                (
                    OrderedFloat(mean),
                    StationMean {
                        station: station.clone(),
                        mean,
                        row_count: row.row_count,
                    },
                )
            })
        })
        .collect();

    candidates.sort_by(|(a, sa), (b, sb)| a.cmp(b).then_with(|| sa.station.cmp(&sb.station)));
    let best = candidates
        .iter()
        .take(size)
        .map(|(_, m)| m.clone())
        .collect();

    candidates.sort_by_key(|(mean, m)| (Reverse(*mean), m.station.clone()));
    let worst = candidates
        .into_iter()
        .take(size)
        .map(|(_, m)| m)
        .collect();

    StationRanking {
        pollutant,
        worst,
        best,
    }
}
