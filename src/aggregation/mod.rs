//! Resampling of filtered measurements into period, weekday, hour or station
//! buckets.
//!
//! Every pollutant is aggregated in the same pass, and each bucket carries
//! mean, minimum and maximum together so a chart and a metric card reading
//! the same bucket never trigger a second computation.

mod buckets;
mod stats;

pub use buckets::BucketKey;
pub use stats::PollutantStats;

use crate::aggregation::buckets::LabelContext;
use crate::aggregation::stats::BucketAccumulator;
use crate::types::granularity::Granularity;
use crate::types::measurement::{Measurement, Pollutant, PollutantSet};
use chrono::NaiveDate;
use log::debug;
use serde::Serialize;
use std::collections::BTreeMap;

/// One bucket of an aggregated series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateRow {
    pub key: BucketKey,
    pub label: String,
    /// Measurements that fell into the bucket. Zero for calendar buckets
    /// inserted to close a gap.
    pub row_count: usize,
    pub stats: PollutantSet<PollutantStats>,
}

impl AggregateRow {
    pub fn stats(&self, pollutant: Pollutant) -> &PollutantStats {
        self.stats.get(pollutant)
    }

    pub fn mean(&self, pollutant: Pollutant) -> f64 {
        self.stats(pollutant).mean
    }

    pub fn avg_pm2_5(&self) -> f64 {
        self.stats.pm2_5.mean
    }

    pub fn avg_pm10(&self) -> f64 {
        self.stats.pm10.mean
    }

    pub fn avg_so2(&self) -> f64 {
        self.stats.so2.mean
    }

    pub fn avg_no2(&self) -> f64 {
        self.stats.no2.mean
    }

    pub fn avg_co(&self) -> f64 {
        self.stats.co.mean
    }
}

/// Groups `measurements` by `granularity` and averages every pollutant per
/// group.
///
/// Calendar granularities return one row per bucket from the first to the
/// last observed bucket, including empty buckets in between. The other
/// granularities return only buckets that received measurements. Rows are
/// sorted by [`BucketKey`]. Missing and `NaN` values are ignored; a bucket
/// without any value for a pollutant reports `NaN` for it.
///
/// # Examples
///
/// ```rust
/// use aqdash::{aggregate, Granularity};
///
/// assert!(aggregate(&[], Granularity::Day).is_empty());
/// ```
pub fn aggregate(measurements: &[Measurement], granularity: Granularity) -> Vec<AggregateRow> {
    let scheme = granularity.scheme();

    let mut buckets: BTreeMap<BucketKey, BucketAccumulator> = BTreeMap::new();
    for measurement in measurements {
        buckets
            .entry((scheme.bucket)(measurement))
            .or_default()
            .push(measurement);
    }
    if let Some(successor) = scheme.successor {
        fill_gaps(&mut buckets, successor);
    }

    let context = LabelContext::of(measurements);
    debug!(
        "Aggregated {} measurements into {} {} buckets",
        measurements.len(),
        buckets.len(),
        granularity
    );

    buckets
        .into_iter()
        .map(|(key, acc)| AggregateRow {
            label: (scheme.label)(&key, &context),
            row_count: acc.rows,
            stats: acc.finish(),
            key,
        })
        .collect()
}

/// Statistics over all of `measurements` as a single bucket.
pub fn summarize(measurements: &[Measurement]) -> PollutantSet<PollutantStats> {
    let mut acc = BucketAccumulator::default();
    for measurement in measurements {
        acc.push(measurement);
    }
    acc.finish()
}

fn fill_gaps(
    buckets: &mut BTreeMap<BucketKey, BucketAccumulator>,
    successor: fn(NaiveDate) -> Option<NaiveDate>,
) {
    let first = buckets.keys().next().and_then(BucketKey::start_date);
    let last = buckets.keys().next_back().and_then(BucketKey::start_date);
    let (Some(mut current), Some(last)) = (first, last) else {
        return;
    };
    while current < last {
        buckets.entry(BucketKey::Period(current)).or_default();
        match successor(current) {
            Some(next) => current = next,
            None => break,
        }
    }
}
