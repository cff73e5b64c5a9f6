//! Counts measurements per AQI category for the category bar charts.

use crate::types::aqi_category::{AqiCategory, AqiPollutant};
use crate::types::measurement::Measurement;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// How the presentation layer should draw a category bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Emphasis {
    Highlight,
    Normal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub category: AqiCategory,
    /// Distinct record ids carrying the category.
    pub count: usize,
    /// Rows carrying the category, duplicates included.
    pub rows: usize,
    pub emphasis: Emphasis,
}

/// Counts the distinct records per category of `pollutant`'s taxonomy.
///
/// Every taxonomy category is listed, in taxonomy order, even with a zero
/// count. Rows without a category are skipped. Every category whose count
/// equals the largest count is highlighted; when all counts are zero none is.
///
/// # Examples
///
/// ```rust
/// use aqdash::{classify_and_count, AqiPollutant};
///
/// let counts = classify_and_count(&[], AqiPollutant::Pm10);
/// assert_eq!(counts.len(), 5);
/// assert!(counts.iter().all(|c| c.count == 0));
/// ```
pub fn classify_and_count(
    measurements: &[Measurement],
    pollutant: AqiPollutant,
) -> Vec<CategoryCount> {
    let mut ids: HashMap<AqiCategory, HashSet<u64>> = HashMap::new();
    let mut rows: HashMap<AqiCategory, usize> = HashMap::new();
    for m in measurements {
        if let Some(category) = m.aqi_category(pollutant) {
            ids.entry(category).or_default().insert(m.record_id);
            *rows.entry(category).or_default() += 1;
        }
    }

    let counts: Vec<(AqiCategory, usize, usize)> = pollutant
        .taxonomy()
        .iter()
        .map(|category| {
            (
                *category,
                ids.get(category).map_or(0, HashSet::len),
                rows.get(category).copied().unwrap_or(0),
            )
        })
        .collect();
    let max = counts.iter().map(|(_, count, _)| *count).max().unwrap_or(0);

    counts
        .into_iter()
        .map(|(category, count, rows)| CategoryCount {
            category,
            count,
            rows,
            emphasis: if max > 0 && count == max {
                Emphasis::Highlight
            } else {
                Emphasis::Normal
            },
        })
        .collect()
}
