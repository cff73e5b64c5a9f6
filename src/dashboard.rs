//! The entry point for a presentation layer: load a dataset once, then ask for
//! a [`DashboardSnapshot`] on every user interaction.

use crate::aggregation::{aggregate, summarize, AggregateRow, PollutantStats};
use crate::classification::{classify_and_count, CategoryCount};
use crate::dataset::Dataset;
use crate::error::AirQualityError;
use crate::filtering::{resolve, FilterAdvisory, FilterParams, FilterState};
use crate::ranking::{rank_stations, StationRanking, DEFAULT_RANKING_SIZE};
use crate::types::aqi_category::AqiPollutant;
use crate::types::granularity::Granularity;
use crate::types::measurement::{Measurement, PollutantSet};
use crate::types::period::{AnnualPeriod, DateWindow};
use crate::types::station::{StationSelection, DEFAULT_ALL_STATIONS_LABEL};
use bon::bon;
use log::{debug, warn};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardSettings {
    /// Stations listed in each best/worst ranking.
    pub ranking_size: usize,
    /// Display text of [`StationSelection::All`].
    pub all_stations_label: String,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            ranking_size: DEFAULT_RANKING_SIZE,
            all_stations_label: DEFAULT_ALL_STATIONS_LABEL.to_string(),
        }
    }
}

/// Something the user should be told about a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum Advisory {
    Filter(FilterAdvisory),
    /// The filter matched no measurements.
    NoData,
    /// The selected window is too short to chart this granularity.
    WindowTooShort(Granularity),
}

impl fmt::Display for Advisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Advisory::Filter(advisory) => write!(f, "{}", advisory),
            Advisory::NoData => f.write_str("No data to display"),
            Advisory::WindowTooShort(granularity) => {
                write!(f, "Selected range is too short for a {} chart", granularity)
            }
        }
    }
}

/// One trend chart. `rows` is `None` when the window is too short for the
/// granularity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPanel {
    pub granularity: Granularity,
    pub rows: Option<Vec<AggregateRow>>,
}

/// An entry of the station selection widget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StationOption {
    pub selection: StationSelection,
    pub label: String,
}

/// Every table of the dashboard page for one filter.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSnapshot {
    pub filter: FilterState,
    pub row_count: usize,
    /// Mean, minimum and maximum over the whole filtered window.
    pub summary: PollutantSet<PollutantStats>,
    /// One panel per calendar granularity, finest first.
    pub trends: Vec<TrendPanel>,
    pub weekday_profile: Option<Vec<AggregateRow>>,
    pub hourly_profile: Option<Vec<AggregateRow>>,
    /// Only present when all stations are selected and data was found.
    pub station_ranking_pm2_5: Option<StationRanking>,
    pub station_ranking_pm10: Option<StationRanking>,
    pub categories_pm2_5: Vec<CategoryCount>,
    pub categories_pm10: Vec<CategoryCount>,
    pub advisories: Vec<Advisory>,
}

impl DashboardSnapshot {
    pub fn trend(&self, granularity: Granularity) -> Option<&[AggregateRow]> {
        self.trends
            .iter()
            .find(|panel| panel.granularity == granularity)
            .and_then(|panel| panel.rows.as_deref())
    }
}

#[derive(Debug, Clone)]
pub struct AirQualityDashboard {
    dataset: Dataset,
    settings: DashboardSettings,
}

#[bon]
impl AirQualityDashboard {
    /// Loads the dataset at `path` and configures a dashboard over it.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use aqdash::{AirQualityDashboard, FilterParams, StationSelection};
    ///
    /// let dashboard = AirQualityDashboard::open("data/air_quality.csv")
    ///     .ranking_size(3)
    ///     .all_stations_label("Semua Distrik")
    ///     .call()?;
    ///
    /// let snapshot = dashboard.snapshot(&FilterParams::full_range())?;
    /// println!("{} rows, mean PM2.5 {:.1}", snapshot.row_count, snapshot.summary.pm2_5.mean);
    /// # Ok::<(), aqdash::AirQualityError>(())
    /// ```
    #[builder]
    pub fn open(
        #[builder(start_fn, into)] path: PathBuf,
        ranking_size: Option<usize>,
        #[builder(into)] all_stations_label: Option<String>,
    ) -> Result<Self, AirQualityError> {
        let dataset = Dataset::from_path(&path)?;
        Ok(Self::from_dataset(dataset)
            .maybe_ranking_size(ranking_size)
            .maybe_all_stations_label(all_stations_label)
            .call())
    }

    #[builder]
    pub fn from_dataset(
        #[builder(start_fn)] dataset: Dataset,
        ranking_size: Option<usize>,
        #[builder(into)] all_stations_label: Option<String>,
    ) -> Self {
        let defaults = DashboardSettings::default();
        Self::with_settings(
            dataset,
            DashboardSettings {
                ranking_size: ranking_size.unwrap_or(defaults.ranking_size),
                all_stations_label: all_stations_label.unwrap_or(defaults.all_stations_label),
            },
        )
    }

    pub fn with_settings(dataset: Dataset, settings: DashboardSettings) -> Self {
        Self { dataset, settings }
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn settings(&self) -> &DashboardSettings {
        &self.settings
    }

    pub fn station_options(&self) -> Vec<StationOption> {
        self.dataset
            .stations()
            .into_iter()
            .map(|selection| StationOption {
                label: selection
                    .display_with(&self.settings.all_stations_label)
                    .to_string(),
                selection,
            })
            .collect()
    }

    pub fn annual_periods(&self) -> &[AnnualPeriod] {
        self.dataset.annual_periods()
    }

    /// Resolves `params`, filters the dataset and computes every table.
    ///
    /// # Errors
    ///
    /// Fails only when polars cannot evaluate the filter or the filtered frame
    /// cannot be read back; invalid selections are reported as advisories.
    pub fn snapshot(&self, params: &FilterParams) -> Result<DashboardSnapshot, AirQualityError> {
        let filter = resolve(&self.dataset, params);
        let view = self.dataset.apply(&filter)?;
        let measurements = view.measurements();

        let mut advisories: Vec<Advisory> = filter
            .advisories
            .iter()
            .cloned()
            .map(Advisory::Filter)
            .collect();
        if measurements.is_empty() {
            warn!("No measurements match the {} filter", filter.mode);
            advisories.push(Advisory::NoData);
        }

        let full_window = self.dataset.full_window();
        let mut gated = |granularity: Granularity| {
            let rows = self.gated_series(measurements, granularity, &filter.window, &full_window);
            if rows.is_none() {
                advisories.push(Advisory::WindowTooShort(granularity));
            }
            rows
        };

        let trends = Granularity::CALENDAR
            .into_iter()
            .map(|granularity| TrendPanel {
                granularity,
                rows: gated(granularity),
            })
            .collect();
        let weekday_profile = gated(Granularity::DayOfWeek);
        let hourly_profile = gated(Granularity::Hour);

        let (station_ranking_pm2_5, station_ranking_pm10) =
            if filter.station.is_all() && !measurements.is_empty() {
                let station_rows = aggregate(measurements, Granularity::Station);
                let size = self.settings.ranking_size;
                (
                    Some(rank_stations(&station_rows, AqiPollutant::Pm25, size)),
                    Some(rank_stations(&station_rows, AqiPollutant::Pm10, size)),
                )
            } else {
                (None, None)
            };

        debug!(
            "Snapshot for {} over {}: {} rows, {} advisories",
            filter.station,
            filter.window,
            measurements.len(),
            advisories.len()
        );

        Ok(DashboardSnapshot {
            row_count: measurements.len(),
            summary: summarize(measurements),
            trends,
            weekday_profile,
            hourly_profile,
            station_ranking_pm2_5,
            station_ranking_pm10,
            categories_pm2_5: classify_and_count(measurements, AqiPollutant::Pm25),
            categories_pm10: classify_and_count(measurements, AqiPollutant::Pm10),
            advisories,
            filter,
        })
    }

    fn gated_series(
        &self,
        measurements: &[Measurement],
        granularity: Granularity,
        window: &DateWindow,
        full_window: &DateWindow,
    ) -> Option<Vec<AggregateRow>> {
        if !granularity.is_supported_by(window, full_window) {
            debug!("Skipping {} series over {}", granularity, window);
            return None;
        }
        Some(aggregate(measurements, granularity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classification::Emphasis;
    use crate::dataset::tests::{sample_csv, sample_dataset, HEADER};
    use crate::types::aqi_category::AqiCategory;
    use chrono::{Duration, NaiveDate};
    use std::io::Write;

    /// Two stations with one reading every six hours through January and
    /// February 2014.
    fn winter_csv() -> String {
        let start = NaiveDate::from_ymd_opt(2014, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let mut csv = format!("{HEADER}\n");
        for step in 0..(59 * 4) {
            let ts = start + Duration::hours(step * 6);
            for (station, base) in [("Dongsi", 80.0), ("Shunyi", 20.0)] {
                let category = if base > 50.0 { "Moderate" } else { "Good" };
                csv.push_str(&format!(
                    "{},{},{},{},4,30,700,{},(2013-03-01 - 2014-02-28),{},{}\n",
                    ts.format("%Y-%m-%d %H:%M:%S"),
                    station,
                    base,
                    base * 1.5,
                    ts.format("%-H"),
                    category,
                    category
                ));
            }
        }
        csv
    }

    fn winter_dashboard() -> AirQualityDashboard {
        AirQualityDashboard::from_dataset(Dataset::from_csv_bytes(winter_csv()).unwrap())
            .ranking_size(1)
            .call()
    }

    #[test]
    fn test_full_range_snapshot() -> Result<(), Box<dyn std::error::Error>> {
        let dashboard = winter_dashboard();
        let snapshot = dashboard.snapshot(&FilterParams::full_range())?;

        assert_eq!(snapshot.row_count, 59 * 4 * 2);
        assert!(snapshot.advisories.iter().all(|a| matches!(a, Advisory::WindowTooShort(_))));
        assert_eq!(snapshot.summary.pm2_5.mean, 50.0);
        assert_eq!(snapshot.summary.pm2_5.min, 20.0);
        assert_eq!(snapshot.summary.pm10.max, 120.0);

        let daily = snapshot.trend(Granularity::Day).unwrap();
        assert_eq!(daily.len(), 59);
        assert_eq!(daily[0].label, "2014-01-01");
        assert_eq!(snapshot.trend(Granularity::Week).unwrap()[0].label, "2013-12-30");
        // Two months touched: too short for a monthly or quarterly chart.
        assert!(snapshot.trend(Granularity::Month).is_none());
        assert!(snapshot.trend(Granularity::Quarter).is_none());
        assert!(snapshot
            .advisories
            .contains(&Advisory::WindowTooShort(Granularity::Month)));
        // The full range always qualifies for a semester chart.
        assert_eq!(snapshot.trend(Granularity::Semester).unwrap().len(), 1);

        assert_eq!(snapshot.weekday_profile.as_ref().unwrap().len(), 7);
        let hourly = snapshot.hourly_profile.as_ref().unwrap();
        let labels: Vec<&str> = hourly.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, vec!["0:00", "6:00", "12:00", "18:00"]);

        let ranking = snapshot.station_ranking_pm2_5.as_ref().unwrap();
        assert_eq!(ranking.worst[0].station, "Dongsi");
        assert_eq!(ranking.best[0].station, "Shunyi");
        assert_eq!(ranking.best.len(), 1);

        let good = &snapshot.categories_pm2_5[0];
        assert_eq!(good.category, AqiCategory::Good);
        assert_eq!(good.count, 59 * 4);
        assert_eq!(good.emphasis, Emphasis::Highlight);
        assert_eq!(snapshot.categories_pm2_5[1].emphasis, Emphasis::Highlight);
        Ok(())
    }

    #[test]
    fn test_single_station_has_no_ranking() -> Result<(), Box<dyn std::error::Error>> {
        let dashboard = winter_dashboard();
        let params = FilterParams::custom_range(
            NaiveDate::from_ymd_opt(2014, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2014, 1, 3).unwrap(),
        )
        .with_station(StationSelection::station("Dongsi"));
        let snapshot = dashboard.snapshot(&params)?;

        assert_eq!(snapshot.row_count, 3 * 4);
        assert!(snapshot.station_ranking_pm2_5.is_none());
        assert!(snapshot.station_ranking_pm10.is_none());
        // Three days: no daily chart, no weekday profile, hourly still shown.
        assert!(snapshot.trend(Granularity::Day).is_none());
        assert!(snapshot.weekday_profile.is_none());
        assert!(snapshot.hourly_profile.is_some());
        assert!(snapshot
            .advisories
            .contains(&Advisory::WindowTooShort(Granularity::DayOfWeek)));
        assert!(snapshot.trend(Granularity::Semester).is_none());
        Ok(())
    }

    #[test]
    fn test_empty_selection_reports_no_data() -> Result<(), Box<dyn std::error::Error>> {
        let dashboard = AirQualityDashboard::from_dataset(sample_dataset()).call();
        let snapshot = dashboard.snapshot(&FilterParams::annual_periods(Vec::<String>::new()))?;

        assert_eq!(snapshot.row_count, 0);
        assert!(snapshot
            .advisories
            .contains(&Advisory::Filter(FilterAdvisory::EmptyPeriodSelection)));
        assert!(snapshot.advisories.contains(&Advisory::NoData));
        assert!(snapshot.station_ranking_pm2_5.is_none());
        assert!(snapshot.summary.pm2_5.mean.is_nan());
        assert!(snapshot
            .categories_pm10
            .iter()
            .all(|c| c.count == 0 && c.emphasis == Emphasis::Normal));
        assert!(snapshot
            .trends
            .iter()
            .filter_map(|panel| panel.rows.as_ref())
            .all(|rows| rows.is_empty()));
        Ok(())
    }

    #[test]
    fn test_open_with_builder() -> Result<(), Box<dyn std::error::Error>> {
        let mut file = tempfile::NamedTempFile::new()?;
        file.write_all(sample_csv().as_bytes())?;

        let dashboard = AirQualityDashboard::open(file.path())
            .all_stations_label("Semua Distrik")
            .call()?;
        assert_eq!(dashboard.settings().ranking_size, DEFAULT_RANKING_SIZE);

        let labels: Vec<String> = dashboard
            .station_options()
            .into_iter()
            .map(|option| option.label)
            .collect();
        assert_eq!(labels, vec!["Semua Distrik", "Aotizhongxin", "Dongsi"]);
        assert_eq!(dashboard.annual_periods().len(), 2);
        Ok(())
    }

    #[test]
    fn test_open_missing_file() {
        let err = AirQualityDashboard::open("/no/such/air_quality.csv")
            .call()
            .unwrap_err();
        assert!(matches!(err, AirQualityError::Load(_)));
    }

    #[test]
    fn test_snapshot_serializes() -> Result<(), Box<dyn std::error::Error>> {
        let dashboard = AirQualityDashboard::from_dataset(sample_dataset()).call();
        let snapshot = dashboard.snapshot(&FilterParams::full_range())?;
        let json = serde_json::to_value(&snapshot)?;

        assert_eq!(json["row_count"], 4);
        assert_eq!(json["filter"]["mode"], "FullRange");
        assert!(json["filter"].get("predicate").is_none());
        assert_eq!(json["categories_pm2_5"][0]["category"], "Good");
        assert_eq!(json["categories_pm2_5"][0]["emphasis"], "Highlight");
        assert_eq!(json["trends"][0]["granularity"], "Day");
        Ok(())
    }
}
