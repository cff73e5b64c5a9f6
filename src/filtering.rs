//! Turns the user's period and station choices into a polars predicate and the
//! date window the charts are drawn over.
//!
//! Resolution never fails: invalid input falls back to a sensible filter and
//! is reported through [`FilterAdvisory`] values on the returned
//! [`FilterState`].

use crate::dataset::columns::{ANNUAL_PERIOD, STATION, TIMESTAMP};
use crate::dataset::Dataset;
use crate::types::period::DateWindow;
use crate::types::station::StationSelection;
use chrono::NaiveDate;
use log::{debug, warn};
use polars::prelude::{col, lit, DataType, Expr, TimeUnit};
use serde::Serialize;
use std::fmt;

/// The period part of a user's filter choice.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub enum PeriodSelection {
    /// Every measurement in the dataset.
    #[default]
    FullRange,
    /// An inclusive range of days. Both bounds are needed and `start` must not
    /// be after `end`, otherwise the full range is used instead.
    CustomRange {
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    },
    /// Annual-period labels, expected in chronological order.
    AnnualPeriods(Vec<String>),
}

/// Everything the user picked in one interaction.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct FilterParams {
    pub period: PeriodSelection,
    pub station: StationSelection,
}

impl FilterParams {
    pub fn new(period: PeriodSelection, station: StationSelection) -> Self {
        Self { period, station }
    }

    pub fn full_range() -> Self {
        Self::default()
    }

    pub fn custom_range(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            period: PeriodSelection::CustomRange {
                start: Some(start),
                end: Some(end),
            },
            station: StationSelection::All,
        }
    }

    pub fn annual_periods<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            period: PeriodSelection::AnnualPeriods(labels.into_iter().map(Into::into).collect()),
            station: StationSelection::All,
        }
    }

    pub fn with_station(mut self, station: StationSelection) -> Self {
        self.station = station;
        self
    }
}

/// The period mode that was actually applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FilterMode {
    FullRange,
    CustomRange,
    AnnualPeriods,
}

impl fmt::Display for FilterMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FilterMode::FullRange => "full-range",
            FilterMode::CustomRange => "custom-range",
            FilterMode::AnnualPeriods => "annual-periods",
        };
        f.write_str(name)
    }
}

/// Non-fatal problems with the filter input.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum FilterAdvisory {
    /// A custom range was incomplete or inverted; the full range was used.
    InvalidDateRange {
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    },
    /// No annual period was selected, so nothing matches.
    EmptyPeriodSelection,
    /// A selected label does not occur in the dataset.
    UnknownAnnualPeriod(String),
    /// The selected station does not occur in the dataset.
    UnknownStation(String),
}

impl fmt::Display for FilterAdvisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterAdvisory::InvalidDateRange { start, end } => {
                let show = |d: &Option<NaiveDate>| d.map_or("?".to_string(), |d| d.to_string());
                write!(
                    f,
                    "Invalid date range {} - {}, showing the full range",
                    show(start),
                    show(end)
                )
            }
            FilterAdvisory::EmptyPeriodSelection => f.write_str("No annual period selected"),
            FilterAdvisory::UnknownAnnualPeriod(label) => {
                write!(f, "Unknown annual period '{}'", label)
            }
            FilterAdvisory::UnknownStation(name) => write!(f, "Unknown station '{}'", name),
        }
    }
}

/// A resolved filter, built fresh for every interaction.
#[derive(Debug, Clone, Serialize)]
pub struct FilterState {
    pub mode: FilterMode,
    pub window: DateWindow,
    /// Labels in effect for [`FilterMode::AnnualPeriods`], in caller order.
    pub selected_periods: Vec<String>,
    pub station: StationSelection,
    #[serde(skip)]
    pub predicate: Expr,
    pub advisories: Vec<FilterAdvisory>,
}

/// Resolves `params` against `dataset`.
///
/// # Examples
///
/// ```rust,no_run
/// use aqdash::{resolve, Dataset, FilterAdvisory, FilterMode, FilterParams, PeriodSelection};
/// use chrono::NaiveDate;
///
/// let dataset = Dataset::from_path("data/air_quality.csv")?;
/// let params = FilterParams {
///     period: PeriodSelection::CustomRange {
///         start: NaiveDate::from_ymd_opt(2015, 6, 1),
///         end: NaiveDate::from_ymd_opt(2015, 5, 1),
///     },
///     ..Default::default()
/// };
/// let state = resolve(&dataset, &params);
/// assert_eq!(state.mode, FilterMode::FullRange);
/// assert!(matches!(state.advisories[0], FilterAdvisory::InvalidDateRange { .. }));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn resolve(dataset: &Dataset, params: &FilterParams) -> FilterState {
    let mut advisories = Vec::new();
    let full_window = dataset.full_window();

    let (mode, window, selected_periods, time_predicate) = match &params.period {
        PeriodSelection::FullRange => (
            FilterMode::FullRange,
            full_window,
            Vec::new(),
            window_predicate(&full_window),
        ),
        PeriodSelection::CustomRange { start, end } => {
            match (*start).zip(*end).and_then(|(s, e)| DateWindow::new(s, e)) {
                Some(window) => (
                    FilterMode::CustomRange,
                    window,
                    Vec::new(),
                    window_predicate(&window),
                ),
                None => {
                    advisories.push(FilterAdvisory::InvalidDateRange {
                        start: *start,
                        end: *end,
                    });
                    (
                        FilterMode::FullRange,
                        full_window,
                        Vec::new(),
                        window_predicate(&full_window),
                    )
                }
            }
        }
        PeriodSelection::AnnualPeriods(labels) => {
            let (window, predicate) =
                annual_period_filter(dataset, labels, &mut advisories);
            (FilterMode::AnnualPeriods, window, labels.clone(), predicate)
        }
    };

    let predicate = match &params.station {
        StationSelection::All => time_predicate,
        StationSelection::Station(name) => {
            if !dataset.has_station(name) {
                advisories.push(FilterAdvisory::UnknownStation(name.clone()));
            }
            time_predicate.and(col(STATION).eq(lit(name.as_str())))
        }
    };

    for advisory in &advisories {
        warn!("{}", advisory);
    }
    debug!(
        "Resolved {} filter over {} for {}",
        mode, window, params.station
    );

    FilterState {
        mode,
        window,
        selected_periods,
        station: params.station.clone(),
        predicate,
        advisories,
    }
}

/// Matches timestamps from the first instant of `window` up to, but excluding,
/// midnight after its last day.
fn window_predicate(window: &DateWindow) -> Expr {
    let timestamp = || col(TIMESTAMP).cast(DataType::Datetime(TimeUnit::Milliseconds, None));
    let lower = timestamp().gt_eq(lit(window.first_instant()));
    match window.end_exclusive() {
        Some(end) => lower.and(timestamp().lt(lit(end))),
        None => lower,
    }
}

fn annual_period_filter(
    dataset: &Dataset,
    labels: &[String],
    advisories: &mut Vec<FilterAdvisory>,
) -> (DateWindow, Expr) {
    let full_window = dataset.full_window();
    let Some(predicate) = labels
        .iter()
        .map(|label| col(ANNUAL_PERIOD).eq(lit(label.as_str())))
        .reduce(|acc, eq| acc.or(eq))
    else {
        advisories.push(FilterAdvisory::EmptyPeriodSelection);
        return (full_window, lit(false));
    };

    let mut known = Vec::with_capacity(labels.len());
    for label in labels {
        match dataset.annual_period(label) {
            Some(period) => known.push(period.window()),
            None => advisories.push(FilterAdvisory::UnknownAnnualPeriod(label.clone())),
        }
    }

    let window = match (known.first(), known.last()) {
        (Some(first), Some(last)) => DateWindow::new(first.start, last.end).unwrap_or_else(|| {
            debug!("Annual periods selected out of order, using their combined span");
            known.iter().fold(*first, |acc, w| DateWindow {
                start: acc.start.min(w.start),
                end: acc.end.max(w.end),
            })
        }),
        _ => full_window,
    };
    (window, predicate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::tests::{sample_dataset, HEADER};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    const FIRST: &str = "(2013-03-01 - 2014-02-28)";
    const SECOND: &str = "(2014-03-01 - 2015-02-28)";

    #[test]
    fn test_full_range_keeps_everything() -> Result<(), Box<dyn std::error::Error>> {
        let dataset = sample_dataset();
        let state = resolve(&dataset, &FilterParams::full_range());
        assert_eq!(state.mode, FilterMode::FullRange);
        assert_eq!(state.window, dataset.full_window());
        assert!(state.advisories.is_empty());
        assert_eq!(dataset.apply(&state)?.len(), 4);
        Ok(())
    }

    #[test]
    fn test_inverted_custom_range_falls_back_to_full_range() -> Result<(), Box<dyn std::error::Error>>
    {
        let dataset = sample_dataset();
        let state = resolve(
            &dataset,
            &FilterParams::custom_range(date(2014, 3, 2), date(2013, 3, 1)),
        );
        assert_eq!(state.mode, FilterMode::FullRange);
        assert_eq!(state.window, dataset.full_window());
        assert_eq!(
            state.advisories,
            vec![FilterAdvisory::InvalidDateRange {
                start: Some(date(2014, 3, 2)),
                end: Some(date(2013, 3, 1)),
            }]
        );
        assert_eq!(dataset.apply(&state)?.len(), 4);
        Ok(())
    }

    #[test]
    fn test_incomplete_custom_range_falls_back_to_full_range() {
        let dataset = sample_dataset();
        let params = FilterParams {
            period: PeriodSelection::CustomRange {
                start: Some(date(2013, 3, 1)),
                end: None,
            },
            ..Default::default()
        };
        let state = resolve(&dataset, &params);
        assert_eq!(state.mode, FilterMode::FullRange);
        assert_eq!(state.advisories.len(), 1);
    }

    #[test]
    fn test_custom_range_includes_whole_end_day() -> Result<(), Box<dyn std::error::Error>> {
        let csv = format!(
            "{HEADER}\n\
             2014-01-01 00:00:00,A,1,1,1,1,1,0,,Good,Good\n\
             2014-01-02 23:00:00,A,2,2,2,2,2,23,,Good,Good\n\
             2014-01-03 00:00:00,A,3,3,3,3,3,0,,Good,Good\n"
        );
        let dataset = Dataset::from_csv_bytes(csv)?;
        let state = resolve(
            &dataset,
            &FilterParams::custom_range(date(2014, 1, 1), date(2014, 1, 2)),
        );
        assert_eq!(state.mode, FilterMode::CustomRange);
        let view = dataset.apply(&state)?;
        let values: Vec<Option<f64>> = view.measurements().iter().map(|m| m.concentrations.pm2_5).collect();
        assert_eq!(values, vec![Some(1.0), Some(2.0)]);
        Ok(())
    }

    #[test]
    fn test_empty_period_selection_matches_nothing() -> Result<(), Box<dyn std::error::Error>> {
        let dataset = sample_dataset();
        let state = resolve(&dataset, &FilterParams::annual_periods(Vec::<String>::new()));
        assert_eq!(state.mode, FilterMode::AnnualPeriods);
        assert_eq!(state.advisories, vec![FilterAdvisory::EmptyPeriodSelection]);
        assert_eq!(state.window, dataset.full_window());
        assert!(dataset.apply(&state)?.is_empty());
        Ok(())
    }

    #[test]
    fn test_empty_period_selection_skips_unassigned_rows() -> Result<(), Box<dyn std::error::Error>>
    {
        let csv = format!(
            "{HEADER}\n\
             2013-03-01 00:00:00,A,1,1,1,1,1,0,(2013-03-01 - 2014-02-28),Good,Good\n\
             2013-03-01 01:00:00,A,2,2,2,2,2,1,,Good,Good\n"
        );
        let dataset = Dataset::from_csv_bytes(csv)?;
        let state = resolve(&dataset, &FilterParams::annual_periods(Vec::<String>::new()));
        assert_eq!(state.advisories, vec![FilterAdvisory::EmptyPeriodSelection]);
        assert!(dataset.apply(&state)?.is_empty());
        Ok(())
    }

    #[test]
    fn test_period_selection_window_and_rows() -> Result<(), Box<dyn std::error::Error>> {
        let dataset = sample_dataset();

        let state = resolve(&dataset, &FilterParams::annual_periods([SECOND]));
        assert_eq!(state.window, DateWindow::new(date(2014, 3, 1), date(2015, 2, 28)).unwrap());
        assert_eq!(state.selected_periods, vec![SECOND.to_string()]);
        assert_eq!(dataset.apply(&state)?.len(), 2);

        let state = resolve(&dataset, &FilterParams::annual_periods([FIRST, SECOND]));
        assert_eq!(state.window, DateWindow::new(date(2013, 3, 1), date(2015, 2, 28)).unwrap());
        assert_eq!(dataset.apply(&state)?.len(), 4);
        Ok(())
    }

    #[test]
    fn test_out_of_order_selection_uses_combined_span() {
        let dataset = sample_dataset();
        let state = resolve(&dataset, &FilterParams::annual_periods([SECOND, FIRST]));
        assert_eq!(state.window, DateWindow::new(date(2013, 3, 1), date(2015, 2, 28)).unwrap());
    }

    #[test]
    fn test_unknown_period_is_reported() -> Result<(), Box<dyn std::error::Error>> {
        let dataset = sample_dataset();
        let state = resolve(&dataset, &FilterParams::annual_periods([FIRST, "(1999)"]));
        assert_eq!(
            state.advisories,
            vec![FilterAdvisory::UnknownAnnualPeriod("(1999)".to_string())]
        );
        assert_eq!(state.window, DateWindow::new(date(2013, 3, 1), date(2014, 2, 28)).unwrap());
        assert_eq!(dataset.apply(&state)?.len(), 2);
        Ok(())
    }

    #[test]
    fn test_station_narrowing() -> Result<(), Box<dyn std::error::Error>> {
        let dataset = sample_dataset();
        let params = FilterParams::full_range().with_station(StationSelection::station("Dongsi"));
        let view = dataset.apply(&resolve(&dataset, &params))?;
        assert_eq!(view.len(), 2);
        assert!(view.measurements().iter().all(|m| m.station == "Dongsi"));

        let params = FilterParams::annual_periods([FIRST])
            .with_station(StationSelection::station("Aotizhongxin"));
        assert_eq!(dataset.apply(&resolve(&dataset, &params))?.len(), 1);
        Ok(())
    }

    #[test]
    fn test_unknown_station_matches_nothing() -> Result<(), Box<dyn std::error::Error>> {
        let dataset = sample_dataset();
        let params = FilterParams::full_range().with_station(StationSelection::station("Nowhere"));
        let state = resolve(&dataset, &params);
        assert_eq!(
            state.advisories,
            vec![FilterAdvisory::UnknownStation("Nowhere".to_string())]
        );
        assert!(dataset.apply(&state)?.is_empty());
        Ok(())
    }
}
