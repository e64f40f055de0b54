//! Result types produced by the statistics calculators
//!
//! Calculators return these structures rather than printing, so the CLI,
//! tests and the JSON formatter all consume the same values. Stored values are
//! never rounded; rounding is left to the formatters.

use chrono::{Month, Weekday};
use serde::Serialize;
use std::collections::BTreeMap;

/// Most frequent value of a column and how often it occurred
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModeCount<T> {
    /// The most frequent value (smallest value among ties)
    pub value: T,
    /// Number of rows holding that value
    pub count: usize,
}

/// Most frequent times of travel
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimeStats {
    pub most_common_month: ModeCount<Month>,
    pub most_common_day: ModeCount<Weekday>,
    /// Start hour, 0-23
    pub most_common_hour: ModeCount<u32>,
}

/// Most popular stations and trip
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StationStats {
    pub most_common_start_station: ModeCount<String>,
    pub most_common_end_station: ModeCount<String>,
    /// Rendered as "<start> and <end>"
    pub most_common_trip: ModeCount<String>,
}

/// Total and average trip duration
///
/// # Examples
/// ```
/// use bikeshare_core::stats_types::TripDurationStats;
///
/// let stats = TripDurationStats::new(2, 7200.0);
/// assert_eq!(stats.total_hours(), 2.0);
/// assert_eq!(stats.mean_minutes(), 60.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TripDurationStats {
    pub trip_count: usize,
    pub total_seconds: f64,
    pub mean_seconds: f64,
}

impl TripDurationStats {
    /// Build from a non-zero trip count and the summed duration
    pub fn new(trip_count: usize, total_seconds: f64) -> Self {
        Self {
            trip_count,
            total_seconds,
            mean_seconds: total_seconds / trip_count as f64,
        }
    }

    pub fn total_hours(&self) -> f64 {
        self.total_seconds / 3600.0
    }

    pub fn total_days(&self) -> f64 {
        self.total_seconds / 86400.0
    }

    pub fn mean_minutes(&self) -> f64 {
        self.mean_seconds / 60.0
    }
}

/// Count and percentage share of one category value
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryShare {
    pub label: String,
    pub count: usize,
    /// Share of the non-blank total, 0-100
    pub percentage: f64,
}

impl CategoryShare {
    /// Turn raw counts into shares ordered by descending count, then label
    ///
    /// # Examples
    /// ```
    /// use bikeshare_core::stats_types::CategoryShare;
    /// use std::collections::BTreeMap;
    ///
    /// let counts = BTreeMap::from([("Customer".to_string(), 1), ("Subscriber".to_string(), 3)]);
    /// let shares = CategoryShare::from_counts(counts);
    /// assert_eq!(shares[0].label, "Subscriber");
    /// assert_eq!(shares[0].percentage, 75.0);
    /// ```
    pub fn from_counts(counts: BTreeMap<String, usize>) -> Vec<CategoryShare> {
        let total: usize = counts.values().sum();
        let mut shares: Vec<CategoryShare> = counts
            .into_iter()
            .map(|(label, count)| CategoryShare {
                label,
                count,
                percentage: if total == 0 {
                    0.0
                } else {
                    count as f64 / total as f64 * 100.0
                },
            })
            .collect();
        shares.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.label.cmp(&b.label)));
        shares
    }
}

/// Gender and birth-year breakdown for datasets that carry it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DemographicStats {
    pub genders: Vec<CategoryShare>,
    /// Rows with a blank gender
    pub unknown_genders: usize,
    /// `None` when no row in the selection has a birth year
    pub earliest_birth_year: Option<i32>,
    pub most_recent_birth_year: Option<i32>,
    pub most_common_birth_year: Option<ModeCount<i32>>,
}

/// Demographic section of the user statistics
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Demographics {
    /// The dataset has no gender or birth year columns
    Unavailable,
    Available(DemographicStats),
}

/// Rider statistics
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserStats {
    pub user_types: Vec<CategoryShare>,
    /// Rows with a blank user type
    pub unknown_user_types: usize,
    pub demographics: Demographics,
}

impl UserStats {
    /// Look up the share for one user type
    pub fn user_type(&self, label: &str) -> Option<&CategoryShare> {
        self.user_types.iter().find(|share| share.label == label)
    }
}
