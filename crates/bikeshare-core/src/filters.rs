//! Filtering module for trip tables
//!
//! Trips can be narrowed by calendar month (the datasets only cover January
//! through June) and by day of the week. Both selectors accept `"all"` to
//! disable the restriction and compose with a logical AND.
//!
//! # Examples
//!
//! ```
//! use bikeshare_core::filters::{DaySelector, MonthSelector, TripFilter};
//!
//! let filter = TripFilter::parse("march", "all").unwrap();
//! assert_eq!(filter.month, MonthSelector::Month(chrono::Month::March));
//! assert_eq!(filter.day, DaySelector::All);
//!
//! assert!(TripFilter::parse("july", "all").is_err());
//! ```

use crate::error::{BikeshareError, Result};
use crate::types::{City, TripRecord, TripTable};
use chrono::{Month, Weekday};
use serde::Serialize;
use std::fmt;
use tracing::debug;

/// Months present in the datasets, in calendar order
pub const MONTHS: [Month; 6] = [
    Month::January,
    Month::February,
    Month::March,
    Month::April,
    Month::May,
    Month::June,
];

/// Days of the week in prompt order
pub const WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

const OTHER_MONTHS: [&str; 6] = [
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

/// Full English name of a weekday ("Monday")
pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Month restriction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MonthSelector {
    /// No restriction
    #[default]
    All,
    /// Only trips starting in this month
    Month(Month),
}

impl MonthSelector {
    /// Lowercase names accepted by the parser, `all` last
    pub fn choices() -> Vec<String> {
        MONTHS
            .iter()
            .map(|m| m.name().to_lowercase())
            .chain(std::iter::once("all".to_string()))
            .collect()
    }

    /// Check whether a trip falls in the selected month
    pub fn matches(&self, record: &TripRecord) -> bool {
        match self {
            MonthSelector::All => true,
            MonthSelector::Month(month) => record.month() == month.number_from_month(),
        }
    }

    /// Human description ("January" or "all months")
    pub fn describe(&self) -> String {
        match self {
            MonthSelector::All => "all months".to_string(),
            MonthSelector::Month(month) => month.name().to_string(),
        }
    }
}

impl std::str::FromStr for MonthSelector {
    type Err = BikeshareError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_lowercase();
        if wanted == "all" {
            return Ok(MonthSelector::All);
        }
        if let Some(month) = MONTHS.iter().find(|m| m.name().to_lowercase() == wanted) {
            return Ok(MonthSelector::Month(*month));
        }
        if OTHER_MONTHS.contains(&wanted.as_str()) {
            return Err(BikeshareError::InvalidFilter(format!(
                "'{s}' is outside the available data (January through June only)"
            )));
        }
        Err(BikeshareError::InvalidFilter(format!(
            "unrecognized month '{s}', expected one of: {}",
            MonthSelector::choices().join(", ")
        )))
    }
}

impl fmt::Display for MonthSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MonthSelector::All => write!(f, "all"),
            MonthSelector::Month(month) => write!(f, "{}", month.name().to_lowercase()),
        }
    }
}

/// Day-of-week restriction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DaySelector {
    /// No restriction
    #[default]
    All,
    /// Only trips starting on this weekday
    Day(Weekday),
}

impl DaySelector {
    /// Lowercase names accepted by the parser, `all` last
    pub fn choices() -> Vec<String> {
        WEEKDAYS
            .iter()
            .map(|d| weekday_name(*d).to_lowercase())
            .chain(std::iter::once("all".to_string()))
            .collect()
    }

    /// Check whether a trip falls on the selected weekday
    pub fn matches(&self, record: &TripRecord) -> bool {
        match self {
            DaySelector::All => true,
            DaySelector::Day(day) => record.day_of_week() == *day,
        }
    }

    /// Human description ("Mondays" or "all days of the week")
    pub fn describe(&self) -> String {
        match self {
            DaySelector::All => "all days of the week".to_string(),
            DaySelector::Day(day) => format!("{}s", weekday_name(*day)),
        }
    }
}

impl std::str::FromStr for DaySelector {
    type Err = BikeshareError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_lowercase();
        if wanted == "all" {
            return Ok(DaySelector::All);
        }
        WEEKDAYS
            .iter()
            .find(|d| weekday_name(**d).to_lowercase() == wanted)
            .map(|d| DaySelector::Day(*d))
            .ok_or_else(|| {
                BikeshareError::InvalidFilter(format!(
                    "unrecognized day '{s}', expected one of: {}",
                    DaySelector::choices().join(", ")
                ))
            })
    }
}

impl fmt::Display for DaySelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DaySelector::All => write!(f, "all"),
            DaySelector::Day(day) => write!(f, "{}", weekday_name(*day).to_lowercase()),
        }
    }
}

/// Filter configuration for trip tables
///
/// The default filter keeps every trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct TripFilter {
    /// Month restriction
    pub month: MonthSelector,
    /// Day-of-week restriction
    pub day: DaySelector,
}

impl TripFilter {
    /// Create a new filter with no restrictions
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the month restriction
    pub fn with_month(mut self, month: MonthSelector) -> Self {
        self.month = month;
        self
    }

    /// Set the day restriction
    pub fn with_day(mut self, day: DaySelector) -> Self {
        self.day = day;
        self
    }

    /// Build a filter from the textual selectors
    ///
    /// # Errors
    ///
    /// Returns [`BikeshareError::InvalidFilter`] if either selector is not
    /// recognized or the month lies outside January through June.
    pub fn parse(month: &str, day: &str) -> Result<Self> {
        Ok(Self {
            month: month.parse()?,
            day: day.parse()?,
        })
    }

    /// Check if a trip passes the filter
    pub fn matches(&self, record: &TripRecord) -> bool {
        self.month.matches(record) && self.day.matches(record)
    }

    /// Apply the filter, returning a new table with the surviving rows in
    /// their original order
    pub fn apply(&self, table: &TripTable) -> TripTable {
        if *self == TripFilter::default() {
            return table.clone();
        }
        let filtered = table.select(|record| self.matches(record));
        debug!(
            "Filter {}/{} kept {} of {} trips",
            self.month,
            self.day,
            filtered.len(),
            table.len()
        );
        filtered
    }
}

/// Filter a table by textual month and day selectors
///
/// # Example
///
/// ```
/// use bikeshare_core::filters::filter_table;
/// use bikeshare_core::types::{City, TripTable};
///
/// let table = TripTable::new(City::Chicago, true, Vec::new());
/// let filtered = filter_table(&table, "all", "monday").unwrap();
/// assert!(filtered.is_empty());
/// ```
pub fn filter_table(table: &TripTable, month: &str, day: &str) -> Result<TripTable> {
    Ok(TripFilter::parse(month, day)?.apply(table))
}

/// Everything needed to run the pipeline once
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TripQuery {
    /// City whose dataset is loaded
    pub city: City,
    /// Month and day restriction
    pub filter: TripFilter,
}

impl TripQuery {
    /// Create a query for a city with no restrictions
    pub fn new(city: City) -> Self {
        Self {
            city,
            filter: TripFilter::default(),
        }
    }

    /// Replace the filter
    pub fn with_filter(mut self, filter: TripFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Sentence summarizing the selection
    pub fn describe(&self) -> String {
        format!(
            "{} during {} on {}",
            self.city,
            self.filter.month.describe(),
            self.filter.day.describe()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};

    fn trip(month: u32, day: u32) -> TripRecord {
        let start: NaiveDateTime = NaiveDate::from_ymd_opt(2017, month, day)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        TripRecord::new(start, format!("{month}-{day}"), "End", 100.0, None)
    }

    fn sample_table() -> TripTable {
        // 2017-01-02 Mon, 2017-01-03 Tue, 2017-02-06 Mon, 2017-03-07 Tue
        TripTable::new(
            City::Chicago,
            true,
            vec![trip(1, 2), trip(1, 3), trip(2, 6), trip(3, 7)],
        )
    }

    #[test]
    fn test_month_parsing() {
        assert_eq!("all".parse::<MonthSelector>().unwrap(), MonthSelector::All);
        assert_eq!(
            "June".parse::<MonthSelector>().unwrap(),
            MonthSelector::Month(Month::June)
        );

        let err = "july".parse::<MonthSelector>().unwrap_err();
        assert!(err.to_string().contains("January through June"));
        assert!("jan".parse::<MonthSelector>().is_err());
    }

    #[test]
    fn test_day_parsing() {
        assert_eq!(
            "Wednesday".parse::<DaySelector>().unwrap(),
            DaySelector::Day(Weekday::Wed)
        );
        assert_eq!("ALL".parse::<DaySelector>().unwrap(), DaySelector::All);
        assert!("wed".parse::<DaySelector>().is_err());
        assert!(matches!(
            "someday".parse::<DaySelector>(),
            Err(BikeshareError::InvalidFilter(_))
        ));
    }

    #[test]
    fn test_choices_listing() {
        assert_eq!(MonthSelector::choices().len(), 7);
        assert_eq!(MonthSelector::choices()[0], "january");
        assert_eq!(DaySelector::choices().len(), 8);
        assert_eq!(DaySelector::choices()[6], "sunday");
    }

    #[test]
    fn test_month_filter() {
        let table = sample_table();
        let filtered = filter_table(&table, "january", "all").unwrap();
        assert_eq!(filtered.len(), 2);
        assert!(filtered.iter().all(|r| r.month() == 1));
    }

    #[test]
    fn test_day_filter() {
        let table = sample_table();
        let filtered = filter_table(&table, "all", "monday").unwrap();
        let stations: Vec<_> = filtered.iter().map(|r| r.start_station()).collect();
        assert_eq!(stations, vec!["1-2", "2-6"]);
    }

    #[test]
    fn test_combined_filter() {
        let table = sample_table();
        let filtered = filter_table(&table, "january", "tuesday").unwrap();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered.records()[0].start_station(), "1-3");
    }

    #[test]
    fn test_all_all_is_identity() {
        let table = sample_table();
        assert_eq!(filter_table(&table, "all", "all").unwrap(), table);
    }

    #[test]
    fn test_empty_selection() {
        let table = sample_table();
        let filtered = filter_table(&table, "april", "all").unwrap();
        assert!(filtered.is_empty());
        assert!(filtered.has_demographics());
    }

    #[test]
    fn test_invalid_selectors_rejected() {
        let table = sample_table();
        assert!(filter_table(&table, "december", "all").is_err());
        assert!(filter_table(&table, "all", "funday").is_err());
    }

    #[test]
    fn test_query_description() {
        let query = TripQuery::new(City::Chicago).with_filter(
            TripFilter::new()
                .with_month(MonthSelector::Month(Month::January))
                .with_day(DaySelector::Day(Weekday::Mon)),
        );
        assert_eq!(query.describe(), "Chicago during January on Mondays");
        assert_eq!(
            TripQuery::new(City::Washington).describe(),
            "Washington during all months on all days of the week"
        );
    }
}
