//! Statistics calculators for filtered trip tables
//!
//! Four independent, stateless calculators summarize a [`TripTable`]:
//!
//! - [`time_stats`]: most common month, weekday and start hour
//! - [`station_stats`]: most common start station, end station and trip
//! - [`trip_duration_stats`]: total and mean trip duration
//! - [`user_stats`]: user type shares and, when the dataset has them,
//!   gender shares and birth year extremes
//!
//! Every calculator fails with [`BikeshareError::EmptyDataset`] on a table
//! without rows rather than inventing a value.
//!
//! # Tie-breaking
//!
//! When several values are equally frequent the smallest one is reported:
//! the lowest month number, the earliest weekday counting from Monday, the
//! lowest hour, the lexicographically smallest station name, the lowest year.
//!
//! # Examples
//!
//! ```
//! use bikeshare::statistics::trip_duration_stats;
//! use bikeshare::types::{City, TripRecord, TripTable};
//! use chrono::NaiveDate;
//!
//! let start = NaiveDate::from_ymd_opt(2017, 1, 2).unwrap().and_hms_opt(9, 0, 0).unwrap();
//! let table = TripTable::new(
//!     City::Chicago,
//!     true,
//!     vec![
//!         TripRecord::new(start, "A", "B", 600.0, Some("Subscriber".into())),
//!         TripRecord::new(start, "B", "A", 1200.0, Some("Customer".into())),
//!     ],
//! );
//!
//! let durations = trip_duration_stats(&table).unwrap();
//! assert_eq!(durations.total_seconds, 1800.0);
//! assert_eq!(durations.mean_minutes(), 15.0);
//! ```

use crate::error::{BikeshareError, Result};
use crate::filters::WEEKDAYS;
use crate::stats_types::{
    CategoryShare, DemographicStats, Demographics, ModeCount, StationStats, TimeStats,
    TripDurationStats, UserStats,
};
use crate::types::TripTable;
use chrono::Month;
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Instant;
use tracing::debug;

/// Most frequent value, smallest value winning ties
fn mode<T, I>(values: I) -> Option<ModeCount<T>>
where
    T: Ord,
    I: IntoIterator<Item = T>,
{
    let mut counts: BTreeMap<T, usize> = BTreeMap::new();
    for value in values {
        *counts.entry(value).or_insert(0) += 1;
    }

    // BTreeMap iterates in ascending order; a strict comparison keeps the
    // first (smallest) value of any tie.
    let mut best: Option<ModeCount<T>> = None;
    for (value, count) in counts {
        match &best {
            Some(current) if current.count >= count => {}
            _ => best = Some(ModeCount { value, count }),
        }
    }
    best
}

fn ensure_rows(table: &TripTable, statistic: &'static str) -> Result<()> {
    if table.is_empty() {
        debug!("Skipping {statistic}: empty selection");
        return Err(BikeshareError::EmptyDataset { statistic });
    }
    Ok(())
}

fn empty(statistic: &'static str) -> BikeshareError {
    BikeshareError::EmptyDataset { statistic }
}

/// Most frequent times of travel
pub fn time_stats(table: &TripTable) -> Result<TimeStats> {
    const NAME: &str = "time statistics";
    ensure_rows(table, NAME)?;

    let month = mode(table.iter().map(|r| r.month())).ok_or_else(|| empty(NAME))?;
    let day = mode(table.iter().map(|r| r.day_of_week().num_days_from_monday()))
        .ok_or_else(|| empty(NAME))?;
    let hour = mode(table.iter().map(|r| r.hour())).ok_or_else(|| empty(NAME))?;

    // chrono months are always 1-12
    let month_name = u8::try_from(month.value)
        .ok()
        .and_then(|m| Month::try_from(m).ok())
        .ok_or_else(|| empty(NAME))?;

    Ok(TimeStats {
        most_common_month: ModeCount {
            value: month_name,
            count: month.count,
        },
        most_common_day: ModeCount {
            value: WEEKDAYS[day.value as usize],
            count: day.count,
        },
        most_common_hour: hour,
    })
}

/// Most popular stations and station pair
pub fn station_stats(table: &TripTable) -> Result<StationStats> {
    const NAME: &str = "station statistics";
    ensure_rows(table, NAME)?;

    let owned = |m: ModeCount<&str>| ModeCount {
        value: m.value.to_string(),
        count: m.count,
    };

    let start = mode(table.iter().map(|r| r.start_station())).ok_or_else(|| empty(NAME))?;
    let end = mode(table.iter().map(|r| r.end_station())).ok_or_else(|| empty(NAME))?;
    // Pairs are formed per trip before counting
    let trip = mode(
        table
            .iter()
            .map(|r| format!("{} and {}", r.start_station(), r.end_station())),
    )
    .ok_or_else(|| empty(NAME))?;

    Ok(StationStats {
        most_common_start_station: owned(start),
        most_common_end_station: owned(end),
        most_common_trip: trip,
    })
}

/// Total and mean trip duration
pub fn trip_duration_stats(table: &TripTable) -> Result<TripDurationStats> {
    ensure_rows(table, "trip duration statistics")?;

    let total_seconds: f64 = table.iter().map(|r| r.trip_duration()).sum();
    Ok(TripDurationStats::new(table.len(), total_seconds))
}

/// User type shares and demographics
///
/// Demographics are reported as [`Demographics::Unavailable`] when the table
/// was loaded without gender and birth year columns.
pub fn user_stats(table: &TripTable) -> Result<UserStats> {
    ensure_rows(table, "user statistics")?;

    let (user_types, unknown_user_types) = category_counts(table.iter().map(|r| r.user_type()));

    let demographics = if table.has_demographics() {
        let (genders, unknown_genders) = category_counts(table.iter().map(|r| r.gender()));
        let years: Vec<i32> = table.iter().filter_map(|r| r.birth_year()).collect();

        Demographics::Available(DemographicStats {
            genders: CategoryShare::from_counts(genders),
            unknown_genders,
            earliest_birth_year: years.iter().min().copied(),
            most_recent_birth_year: years.iter().max().copied(),
            most_common_birth_year: mode(years),
        })
    } else {
        Demographics::Unavailable
    };

    Ok(UserStats {
        user_types: CategoryShare::from_counts(user_types),
        unknown_user_types,
        demographics,
    })
}

/// Count distinct non-blank values, returning the blank count separately
fn category_counts<'a, I>(values: I) -> (BTreeMap<String, usize>, usize)
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    let mut counts = BTreeMap::new();
    let mut blank = 0;
    for value in values {
        match value {
            Some(label) => *counts.entry(label.to_string()).or_insert(0) += 1,
            None => blank += 1,
        }
    }
    (counts, blank)
}

/// Seconds spent computing each section
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SectionTimings {
    pub time: f64,
    pub stations: f64,
    pub durations: f64,
    pub users: f64,
}

/// All four statistics for one selection
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsReport {
    /// Human description of the selection
    pub selection: String,
    pub trip_count: usize,
    pub time: TimeStats,
    pub stations: StationStats,
    pub durations: TripDurationStats,
    pub users: UserStats,
    pub timings: SectionTimings,
}

fn timed<T>(section: &str, f: impl FnOnce() -> Result<T>) -> Result<(T, f64)> {
    let started = Instant::now();
    let value = f()?;
    let elapsed = started.elapsed().as_secs_f64();
    debug!("{section} took {elapsed:.6}s");
    Ok((value, elapsed))
}

impl StatsReport {
    /// Run every calculator over `table`
    ///
    /// # Errors
    ///
    /// Propagates the first calculator error, which for a table without rows
    /// is [`BikeshareError::EmptyDataset`].
    pub fn compute(selection: impl Into<String>, table: &TripTable) -> Result<Self> {
        let (time, time_secs) = timed("time statistics", || time_stats(table))?;
        let (stations, station_secs) = timed("station statistics", || station_stats(table))?;
        let (durations, duration_secs) =
            timed("trip duration statistics", || trip_duration_stats(table))?;
        let (users, user_secs) = timed("user statistics", || user_stats(table))?;

        Ok(Self {
            selection: selection.into(),
            trip_count: table.len(),
            time,
            stations,
            durations,
            users,
            timings: SectionTimings {
                time: time_secs,
                stations: station_secs,
                durations: duration_secs,
                users: user_secs,
            },
        })
    }
}
