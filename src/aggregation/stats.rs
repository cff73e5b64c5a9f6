use crate::types::measurement::{Measurement, Pollutant, PollutantSet};
use serde::Serialize;

/// Mean, minimum and maximum of one pollutant over a bucket.
///
/// All three are `NaN` when no measurement in the bucket carried a value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PollutantStats {
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    /// Number of values that contributed.
    pub count: usize,
}

impl PollutantStats {
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

impl Default for PollutantStats {
    fn default() -> Self {
        StatsAccumulator::default().finish()
    }
}

/// Running sum, extremes and count, skipping missing and `NaN` values.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct StatsAccumulator {
    sum: f64,
    min: Option<f64>,
    max: Option<f64>,
    count: usize,
}

impl StatsAccumulator {
    pub fn push(&mut self, value: Option<f64>) {
        let Some(value) = value.filter(|v| !v.is_nan()) else {
            return;
        };
        self.sum += value;
        self.count += 1;
        self.min = Some(self.min.map_or(value, |m| m.min(value)));
        self.max = Some(self.max.map_or(value, |m| m.max(value)));
    }

    pub fn finish(&self) -> PollutantStats {
        PollutantStats {
            mean: if self.count == 0 {
                f64::NAN
            } else {
                self.sum / self.count as f64
            },
            min: self.min.unwrap_or(f64::NAN),
            max: self.max.unwrap_or(f64::NAN),
            count: self.count,
        }
    }
}

/// Accumulates every pollutant of the rows falling into one bucket.
#[derive(Debug, Clone, Default)]
pub(crate) struct BucketAccumulator {
    pub rows: usize,
    stats: PollutantSet<StatsAccumulator>,
}

impl BucketAccumulator {
    pub fn push(&mut self, measurement: &Measurement) {
        self.rows += 1;
        for pollutant in Pollutant::ALL {
            self.stats
                .get_mut(pollutant)
                .push(measurement.value(pollutant));
        }
    }

    pub fn finish(&self) -> PollutantSet<PollutantStats> {
        self.stats.map(|acc| acc.finish())
    }
}
