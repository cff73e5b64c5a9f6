//! Defines the granularities the temporal aggregator can bucket measurements by,
//! together with the minimum window each of them needs to be worth charting.

use crate::types::period::DateWindow;
use chrono::TimeDelta;
use serde::Serialize;
use std::fmt;

/// How measurements are partitioned into buckets before averaging.
///
/// Calendar granularities (`Day`, `Week`, `Month`, `Quarter`, `Semester`,
/// `AnnualPerYearMonth`) follow the timeline and are ordered by bucket start.
/// `Hour` and `DayOfWeek` fold the whole window onto a fixed cycle, and
/// `Station` groups by monitoring station.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Granularity {
    /// One bucket per calendar date.
    Day,
    /// ISO weeks, starting on Monday.
    Week,
    /// Calendar months. Labelled by month abbreviation alone when the data
    /// spans fewer than two annual periods.
    Month,
    /// Calendar quarters starting in January, April, July and October.
    Quarter,
    /// Half years starting in January and July.
    Semester,
    /// Hour of the day, 0 through 23.
    Hour,
    /// Day of the week, Sunday through Saturday.
    DayOfWeek,
    /// Monitoring station.
    Station,
    /// Calendar months, always labelled by month abbreviation.
    AnnualPerYearMonth,
}

impl Granularity {
    pub const CALENDAR: [Granularity; 5] = [
        Granularity::Day,
        Granularity::Week,
        Granularity::Month,
        Granularity::Quarter,
        Granularity::Semester,
    ];

    pub(crate) fn name(&self) -> &'static str {
        match self {
            Granularity::Day => "daily",
            Granularity::Week => "weekly",
            Granularity::Month => "monthly",
            Granularity::Quarter => "quarterly",
            Granularity::Semester => "semester",
            Granularity::Hour => "hourly",
            Granularity::DayOfWeek => "day-of-week",
            Granularity::Station => "station",
            Granularity::AnnualPerYearMonth => "monthly-per-year",
        }
    }

    /// Whether `window` is long enough for this granularity to produce a
    /// meaningful series.
    ///
    /// `full_window` is the window of the whole dataset; semester series are
    /// only drawn over (nearly) the complete timeline.
    ///
    /// ```rust
    /// use aqdash::{DateWindow, Granularity};
    /// use chrono::NaiveDate;
    ///
    /// let full = DateWindow::new(
    ///     NaiveDate::from_ymd_opt(2013, 3, 1).unwrap(),
    ///     NaiveDate::from_ymd_opt(2017, 2, 28).unwrap(),
    /// ).unwrap();
    /// let week = DateWindow::new(
    ///     NaiveDate::from_ymd_opt(2014, 1, 1).unwrap(),
    ///     NaiveDate::from_ymd_opt(2014, 1, 7).unwrap(),
    /// ).unwrap();
    ///
    /// assert!(Granularity::Day.is_supported_by(&week, &full));
    /// assert!(!Granularity::Month.is_supported_by(&week, &full));
    /// assert!(Granularity::Semester.is_supported_by(&full, &full));
    /// ```
    pub fn is_supported_by(&self, window: &DateWindow, full_window: &DateWindow) -> bool {
        match self {
            Granularity::Day | Granularity::DayOfWeek => window.day_count() > 6,
            Granularity::Week => window.month_count() > 0,
            Granularity::Month | Granularity::AnnualPerYearMonth => window.month_count() > 3,
            Granularity::Quarter => window.quarter_count() > 3,
            Granularity::Semester => {
                window.length() >= full_window.length() - TimeDelta::days(1)
            }
            Granularity::Hour | Granularity::Station => true,
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn window(start: (i32, u32, u32), end: (i32, u32, u32)) -> DateWindow {
        DateWindow::new(
            NaiveDate::from_ymd_opt(start.0, start.1, start.2).unwrap(),
            NaiveDate::from_ymd_opt(end.0, end.1, end.2).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn test_daily_needs_more_than_six_days() {
        let full = window((2013, 3, 1), (2017, 2, 28));
        assert!(!Granularity::Day.is_supported_by(&window((2014, 1, 1), (2014, 1, 6)), &full));
        assert!(Granularity::Day.is_supported_by(&window((2014, 1, 1), (2014, 1, 7)), &full));
        assert!(!Granularity::DayOfWeek.is_supported_by(&window((2014, 1, 1), (2014, 1, 6)), &full));
    }

    #[test]
    fn test_monthly_and_quarterly_thresholds() {
        let full = window((2013, 3, 1), (2017, 2, 28));
        assert!(!Granularity::Month.is_supported_by(&window((2014, 1, 1), (2014, 3, 31)), &full));
        assert!(Granularity::Month.is_supported_by(&window((2014, 1, 1), (2014, 4, 1)), &full));
        assert!(!Granularity::Quarter.is_supported_by(&window((2014, 1, 1), (2014, 9, 30)), &full));
        assert!(Granularity::Quarter.is_supported_by(&window((2014, 1, 1), (2014, 10, 1)), &full));
    }

    #[test]
    fn test_semester_requires_nearly_full_range() {
        let full = window((2013, 3, 1), (2017, 2, 28));
        assert!(Granularity::Semester.is_supported_by(&window((2013, 3, 2), (2017, 2, 28)), &full));
        assert!(!Granularity::Semester.is_supported_by(&window((2014, 3, 1), (2017, 2, 28)), &full));
    }

    #[test]
    fn test_hour_and_station_always_supported() {
        let full = window((2013, 3, 1), (2017, 2, 28));
        let single_day = window((2014, 1, 1), (2014, 1, 1));
        assert!(Granularity::Hour.is_supported_by(&single_day, &full));
        assert!(Granularity::Station.is_supported_by(&single_day, &full));
        assert!(Granularity::Week.is_supported_by(&single_day, &full));
    }
}
