//! Bucketing, labelling and gap-filling rules per [`Granularity`].

use crate::types::granularity::Granularity;
use crate::types::measurement::Measurement;
use chrono::{Datelike, Days, Months, NaiveDate, TimeDelta};
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;

const WEEKDAY_NAMES: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

/// Identifies the bucket a measurement falls into.
///
/// The derived ordering is the output order: calendar buckets by start date,
/// weekdays from Sunday, hours from midnight and stations by name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum BucketKey {
    /// Calendar bucket starting on this date.
    Period(NaiveDate),
    /// Days since Sunday, 0 through 6.
    Weekday(u8),
    Hour(u32),
    Station(String),
}

impl BucketKey {
    pub fn start_date(&self) -> Option<NaiveDate> {
        match self {
            BucketKey::Period(date) => Some(*date),
            _ => None,
        }
    }
}

impl fmt::Display for BucketKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BucketKey::Period(date) => write!(f, "{}", date.format("%Y-%m-%d")),
            BucketKey::Weekday(day) => {
                f.write_str(WEEKDAY_NAMES.get(*day as usize).copied().unwrap_or("?"))
            }
            BucketKey::Hour(hour) => write!(f, "{}:00", hour),
            BucketKey::Station(name) => f.write_str(name),
        }
    }
}

/// Facts about the whole input that influence labelling.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct LabelContext {
    /// Distinct non-empty annual periods among the measurements.
    pub annual_periods: usize,
    /// Calendar months from the earliest to the latest measurement, both
    /// included. Zero without measurements.
    pub months_spanned: u32,
}

impl LabelContext {
    pub fn of(measurements: &[Measurement]) -> Self {
        let periods: HashSet<&str> = measurements
            .iter()
            .map(|m| m.annual_period.as_str())
            .filter(|p| !p.is_empty())
            .collect();
        let month_index = |m: &Measurement| m.timestamp.year() * 12 + m.timestamp.month0() as i32;
        let first = measurements.iter().map(month_index).min();
        let last = measurements.iter().map(month_index).max();
        let months_spanned = match (first, last) {
            (Some(first), Some(last)) => (last - first + 1) as u32,
            _ => 0,
        };
        Self {
            annual_periods: periods.len(),
            months_spanned,
        }
    }
}

pub(crate) struct BucketScheme {
    pub bucket: fn(&Measurement) -> BucketKey,
    pub label: fn(&BucketKey, &LabelContext) -> String,
    /// Start of the next calendar bucket. Schemes with a successor emit every
    /// bucket between the first and the last observed one.
    pub successor: Option<fn(NaiveDate) -> Option<NaiveDate>>,
}

impl Granularity {
    pub(crate) fn scheme(&self) -> &'static BucketScheme {
        match self {
            Granularity::Day => &DAY,
            Granularity::Week => &WEEK,
            Granularity::Month => &MONTH,
            Granularity::Quarter => &QUARTER,
            Granularity::Semester => &SEMESTER,
            Granularity::Hour => &HOUR,
            Granularity::DayOfWeek => &DAY_OF_WEEK,
            Granularity::Station => &STATION,
            Granularity::AnnualPerYearMonth => &ANNUAL_PER_YEAR_MONTH,
        }
    }
}

static DAY: BucketScheme = BucketScheme {
    bucket: by_day,
    label: plain_label,
    successor: Some(next_day),
};

static WEEK: BucketScheme = BucketScheme {
    bucket: by_week,
    label: plain_label,
    successor: Some(next_week),
};

static MONTH: BucketScheme = BucketScheme {
    bucket: by_month,
    label: month_label,
    successor: Some(next_month),
};

static QUARTER: BucketScheme = BucketScheme {
    bucket: by_quarter,
    label: plain_label,
    successor: Some(next_quarter),
};

static SEMESTER: BucketScheme = BucketScheme {
    bucket: by_semester,
    label: plain_label,
    successor: Some(next_semester),
};

static ANNUAL_PER_YEAR_MONTH: BucketScheme = BucketScheme {
    bucket: by_month,
    label: month_name_label,
    successor: Some(next_month),
};

static HOUR: BucketScheme = BucketScheme {
    bucket: by_hour,
    label: plain_label,
    successor: None,
};

static DAY_OF_WEEK: BucketScheme = BucketScheme {
    bucket: by_weekday,
    label: plain_label,
    successor: None,
};

static STATION: BucketScheme = BucketScheme {
    bucket: by_station,
    label: plain_label,
    successor: None,
};

fn by_day(m: &Measurement) -> BucketKey {
    BucketKey::Period(m.timestamp.date())
}

fn by_week(m: &Measurement) -> BucketKey {
    BucketKey::Period(week_start(m.timestamp.date()))
}

fn by_month(m: &Measurement) -> BucketKey {
    BucketKey::Period(month_start(m.timestamp.date()))
}

fn by_quarter(m: &Measurement) -> BucketKey {
    BucketKey::Period(months_block_start(m.timestamp.date(), 3))
}

fn by_semester(m: &Measurement) -> BucketKey {
    BucketKey::Period(months_block_start(m.timestamp.date(), 6))
}

fn by_hour(m: &Measurement) -> BucketKey {
    BucketKey::Hour(m.hour)
}

fn by_weekday(m: &Measurement) -> BucketKey {
    BucketKey::Weekday(m.timestamp.weekday().num_days_from_sunday() as u8)
}

fn by_station(m: &Measurement) -> BucketKey {
    BucketKey::Station(m.station.clone())
}

fn next_day(date: NaiveDate) -> Option<NaiveDate> {
    date.checked_add_days(Days::new(1))
}

fn next_week(date: NaiveDate) -> Option<NaiveDate> {
    date.checked_add_days(Days::new(7))
}

fn next_month(date: NaiveDate) -> Option<NaiveDate> {
    date.checked_add_months(Months::new(1))
}

fn next_quarter(date: NaiveDate) -> Option<NaiveDate> {
    date.checked_add_months(Months::new(3))
}

fn next_semester(date: NaiveDate) -> Option<NaiveDate> {
    date.checked_add_months(Months::new(6))
}

/// Month abbreviation while the data stays within one annual period and at
/// most twelve consecutive months, so no abbreviation repeats. Full dates
/// otherwise.
fn month_label(key: &BucketKey, context: &LabelContext) -> String {
    if context.annual_periods < 2 && context.months_spanned <= 12 {
        month_name_label(key, context)
    } else {
        plain_label(key, context)
    }
}

fn plain_label(key: &BucketKey, _: &LabelContext) -> String {
    key.to_string()
}

fn month_name_label(key: &BucketKey, context: &LabelContext) -> String {
    match key {
        BucketKey::Period(date) => date.format("%b").to_string(),
        other => plain_label(other, context),
    }
}

/// Monday of the ISO week containing `date`.
pub(crate) fn week_start(date: NaiveDate) -> NaiveDate {
    date - TimeDelta::days(date.weekday().num_days_from_monday() as i64)
}

pub(crate) fn month_start(date: NaiveDate) -> NaiveDate {
    date - TimeDelta::days(date.day0() as i64)
}

/// First day of the block of `months` calendar months containing `date`,
/// blocks being aligned to January.
fn months_block_start(date: NaiveDate, months: u32) -> NaiveDate {
    month_start(date) - Months::new(date.month0() % months)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_calendar_bucket_starts() {
        // 2014-05-15 is a Thursday
        assert_eq!(week_start(date(2014, 5, 15)), date(2014, 5, 12));
        assert_eq!(week_start(date(2014, 5, 12)), date(2014, 5, 12));
        assert_eq!(week_start(date(2014, 1, 1)), date(2013, 12, 30));
        assert_eq!(month_start(date(2014, 5, 15)), date(2014, 5, 1));
        assert_eq!(months_block_start(date(2014, 5, 15), 3), date(2014, 4, 1));
        assert_eq!(months_block_start(date(2014, 12, 31), 3), date(2014, 10, 1));
        assert_eq!(months_block_start(date(2014, 5, 15), 6), date(2014, 1, 1));
        assert_eq!(months_block_start(date(2014, 7, 1), 6), date(2014, 7, 1));
    }

    #[test]
    fn test_key_ordering() {
        let mut keys = vec![
            BucketKey::Weekday(6),
            BucketKey::Weekday(0),
            BucketKey::Weekday(3),
        ];
        keys.sort();
        let labels: Vec<String> = keys.iter().map(ToString::to_string).collect();
        assert_eq!(labels, vec!["Sunday", "Wednesday", "Saturday"]);

        let mut hours = vec![BucketKey::Hour(13), BucketKey::Hour(2), BucketKey::Hour(0)];
        hours.sort();
        assert_eq!(hours, vec![BucketKey::Hour(0), BucketKey::Hour(2), BucketKey::Hour(13)]);
    }

    #[test]
    fn test_labels() {
        let single = LabelContext {
            annual_periods: 1,
            months_spanned: 12,
        };
        let several = LabelContext {
            annual_periods: 3,
            months_spanned: 36,
        };
        let unassigned_years = LabelContext {
            annual_periods: 0,
            months_spanned: 13,
        };
        let march = BucketKey::Period(date(2014, 3, 1));

        assert_eq!((Granularity::Day.scheme().label)(&march, &single), "2014-03-01");
        assert_eq!((Granularity::Month.scheme().label)(&march, &single), "Mar");
        assert_eq!((Granularity::Month.scheme().label)(&march, &several), "2014-03-01");
        assert_eq!(
            (Granularity::Month.scheme().label)(&march, &unassigned_years),
            "2014-03-01"
        );
        assert_eq!(
            (Granularity::AnnualPerYearMonth.scheme().label)(&march, &several),
            "Mar"
        );
        assert_eq!(
            (Granularity::Hour.scheme().label)(&BucketKey::Hour(7), &single),
            "7:00"
        );
    }
}
