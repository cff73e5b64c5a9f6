//! The in-memory store holding the validated measurement table.
//!
//! A [`Dataset`] is loaded once, never mutated, and answers the read-only
//! questions the selection widgets need: which stations exist, which annual
//! periods exist and which dates are covered. Filtering is done lazily on the
//! underlying polars frame; the surviving row positions select from the typed
//! [`Measurement`]s validated at load time.

pub mod columns;
pub mod error;
mod extractor;
mod loader;

use crate::dataset::columns::ROW_POSITION;
use crate::dataset::error::LoadError;
use crate::dataset::extractor::extract_measurements;
use crate::dataset::loader::{normalize, read_csv_bytes, read_csv_file};
use crate::error::AirQualityError;
use crate::filtering::FilterState;
use crate::types::measurement::Measurement;
use crate::types::period::{AnnualPeriod, DateWindow};
use crate::types::station::StationSelection;
use chrono::NaiveDateTime;
use log::{debug, info};
use polars::prelude::*;
use std::collections::{BTreeSet, HashMap};
use std::path::Path;

#[derive(Debug, Clone)]
pub struct Dataset {
    frame: DataFrame,
    /// Row `i` of `frame`, validated.
    measurements: Vec<Measurement>,
    stations: BTreeSet<String>,
    annual_periods: Vec<AnnualPeriod>,
    full_window: DateWindow,
}

impl Dataset {
    /// Loads and validates a CSV file.
    ///
    /// # Errors
    ///
    /// Returns a [`LoadError`] when the file is missing or unreadable, a
    /// required column is absent, or any row fails validation.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        Self::from_frame(read_csv_file(path.as_ref())?)
    }

    pub fn from_csv_bytes(bytes: impl Into<Vec<u8>>) -> Result<Self, LoadError> {
        Self::from_frame(read_csv_bytes(bytes.into())?)
    }

    /// Builds a dataset from a frame with the input file's column names.
    pub fn from_frame(df: DataFrame) -> Result<Self, LoadError> {
        let frame = normalize(df)?;
        let measurements = extract_measurements(&frame)?;

        let (Some(first), Some(last)) = (
            measurements.iter().map(|m| m.timestamp).min(),
            measurements.iter().map(|m| m.timestamp).max(),
        ) else {
            return Err(LoadError::Empty);
        };
        let full_window = DateWindow {
            start: first.date(),
            end: last.date(),
        };
        let stations: BTreeSet<String> =
            measurements.iter().map(|m| m.station.clone()).collect();
        let annual_periods = collect_annual_periods(&measurements);

        info!(
            "Loaded {} measurements from {} stations covering {} ({} annual periods)",
            frame.height(),
            stations.len(),
            full_window,
            annual_periods.len()
        );

        Ok(Self {
            frame,
            measurements,
            stations,
            annual_periods,
            full_window,
        })
    }

    pub fn len(&self) -> usize {
        self.frame.height()
    }

    pub fn is_empty(&self) -> bool {
        self.frame.height() == 0
    }

    /// The normalised frame, see [`columns`] for its column names.
    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn lazy(&self) -> LazyFrame {
        self.frame.clone().lazy()
    }

    /// Every row as a typed measurement, in file order.
    pub fn measurements(&self) -> &[Measurement] {
        &self.measurements
    }

    /// Station choices for a selection widget: the `All` sentinel first,
    /// followed by every station alphabetically.
    pub fn stations(&self) -> Vec<StationSelection> {
        std::iter::once(StationSelection::All)
            .chain(self.stations.iter().cloned().map(StationSelection::Station))
            .collect()
    }

    pub fn station_names(&self) -> &BTreeSet<String> {
        &self.stations
    }

    pub fn has_station(&self, name: &str) -> bool {
        self.stations.contains(name)
    }

    /// Distinct non-empty annual periods, ordered by their earliest measurement.
    pub fn annual_periods(&self) -> &[AnnualPeriod] {
        &self.annual_periods
    }

    pub fn annual_period(&self, label: &str) -> Option<&AnnualPeriod> {
        self.annual_periods.iter().find(|p| p.label == label)
    }

    /// First and last measured calendar day.
    pub fn full_window(&self) -> DateWindow {
        self.full_window
    }

    /// Evaluates the predicate of `state` and returns the matching rows.
    pub fn apply(&self, state: &FilterState) -> Result<FilteredView, AirQualityError> {
        let positions = self
            .lazy()
            .with_row_index(PlSmallStr::from_static(ROW_POSITION), None)
            .filter(state.predicate.clone())
            .select([col(ROW_POSITION).cast(DataType::UInt64)])
            .collect()?;
        let measurements: Vec<Measurement> = positions
            .column(ROW_POSITION)?
            .u64()?
            .into_iter()
            .flatten()
            .filter_map(|row| self.measurements.get(row as usize).cloned())
            .collect();
        debug!(
            "Filter {} kept {} of {} rows",
            state.mode,
            measurements.len(),
            self.len()
        );
        Ok(FilteredView { measurements })
    }
}

fn collect_annual_periods(measurements: &[Measurement]) -> Vec<AnnualPeriod> {
    let mut observed: HashMap<&str, (NaiveDateTime, NaiveDateTime)> = HashMap::new();
    for m in measurements.iter().filter(|m| !m.annual_period.is_empty()) {
        observed
            .entry(m.annual_period.as_str())
            .and_modify(|(first, last)| {
                *first = (*first).min(m.timestamp);
                *last = (*last).max(m.timestamp);
            })
            .or_insert((m.timestamp, m.timestamp));
    }

    let mut periods: Vec<(NaiveDateTime, AnnualPeriod)> = observed
        .into_iter()
        .map(|(label, (first, last))| {
            let (start, end) = AnnualPeriod::parse_bounds(label)
                .unwrap_or((first.date(), last.date()));
            let period = AnnualPeriod {
                label: label.to_string(),
                start,
                end,
            };
            (first, period)
        })
        .collect();
    periods.sort_by(|(a, pa), (b, pb)| a.cmp(b).then_with(|| pa.label.cmp(&pb.label)));
    periods.into_iter().map(|(_, period)| period).collect()
}

/// The rows surviving a filter, in dataset order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilteredView {
    measurements: Vec<Measurement>,
}

impl FilteredView {
    pub fn measurements(&self) -> &[Measurement] {
        &self.measurements
    }

    pub fn len(&self) -> usize {
        self.measurements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.measurements.is_empty()
    }

    pub fn into_measurements(self) -> Vec<Measurement> {
        self.measurements
    }
}
