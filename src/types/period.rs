use chrono::{Datelike, Days, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use serde::Serialize;
use std::fmt;
use std::fmt::{Display, Formatter};

/// An inclusive range of calendar days.
///
/// A timestamp lies inside the window when it falls on any day from `start`
/// through `end`, so the whole end day is included.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    /// Returns `None` when `start` is after `end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Option<Self> {
        (start <= end).then_some(Self { start, end })
    }

    pub fn contains(&self, timestamp: NaiveDateTime) -> bool {
        let date = timestamp.date();
        self.start <= date && date <= self.end
    }

    pub fn first_instant(&self) -> NaiveDateTime {
        self.start.and_time(NaiveTime::MIN)
    }

    /// Midnight after the last day, the exclusive upper bound of the window.
    pub fn end_exclusive(&self) -> Option<NaiveDateTime> {
        self.end
            .checked_add_days(Days::new(1))
            .map(|next| next.and_time(NaiveTime::MIN))
    }

    pub fn length(&self) -> TimeDelta {
        self.end - self.start
    }

    /// Number of calendar days touched.
    pub fn day_count(&self) -> i64 {
        self.length().num_days() + 1
    }

    /// Number of calendar months touched.
    pub fn month_count(&self) -> i64 {
        month_index(self.end) - month_index(self.start) + 1
    }

    /// Number of calendar quarters touched.
    pub fn quarter_count(&self) -> i64 {
        month_index(self.end) / 3 - month_index(self.start) / 3 + 1
    }
}

impl Display for DateWindow {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.start, self.end)
    }
}

fn month_index(date: NaiveDate) -> i64 {
    date.year() as i64 * 12 + date.month0() as i64
}

/// A named period from the `annually_period` column together with its bounds.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct AnnualPeriod {
    pub label: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl AnnualPeriod {
    pub fn window(&self) -> DateWindow {
        DateWindow {
            start: self.start.min(self.end),
            end: self.end.max(self.start),
        }
    }

    /// Reads the bounds out of a label shaped like `(2013-03-01 - 2014-02-28)`.
    ///
    /// ```rust
    /// use aqdash::AnnualPeriod;
    /// use chrono::NaiveDate;
    ///
    /// let (start, end) = AnnualPeriod::parse_bounds("(2013-03-01 - 2014-02-28)").unwrap();
    /// assert_eq!(start, NaiveDate::from_ymd_opt(2013, 3, 1).unwrap());
    /// assert_eq!(end, NaiveDate::from_ymd_opt(2014, 2, 28).unwrap());
    /// assert!(AnnualPeriod::parse_bounds("first year").is_none());
    /// ```
    pub fn parse_bounds(label: &str) -> Option<(NaiveDate, NaiveDate)> {
        let inner = label.trim().trim_start_matches('(').trim_end_matches(')');
        let (start, end) = inner.split_once(" - ")?;
        let start = NaiveDate::parse_from_str(start.trim(), "%Y-%m-%d").ok()?;
        let end = NaiveDate::parse_from_str(end.trim(), "%Y-%m-%d").ok()?;
        Some((start, end))
    }
}

impl Display for AnnualPeriod {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}
