//! Core domain types for bikeshare
//!
//! This module contains the fundamental types used throughout the bikeshare
//! crates: the supported cities, a single trip record with its derived
//! calendar fields, and the in-memory trip table.

use crate::error::BikeshareError;
use chrono::{Datelike, NaiveDateTime, Timelike, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Cities with a published trip dataset
///
/// # Examples
/// ```
/// use bikeshare_core::types::City;
///
/// let city: City = "New York City".parse().unwrap();
/// assert_eq!(city, City::NewYorkCity);
/// assert_eq!(city.file_name(), "new_york_city.csv");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum City {
    Chicago,
    NewYorkCity,
    Washington,
}

impl City {
    /// All cities in prompt order
    pub const ALL: [City; 3] = [City::Chicago, City::NewYorkCity, City::Washington];

    /// Stable identifier
    pub fn id(&self) -> &'static str {
        match self {
            City::Chicago => "chicago",
            City::NewYorkCity => "new_york_city",
            City::Washington => "washington",
        }
    }

    /// Name of the CSV file holding this city's trips
    pub fn file_name(&self) -> &'static str {
        match self {
            City::Chicago => "chicago.csv",
            City::NewYorkCity => "new_york_city.csv",
            City::Washington => "washington.csv",
        }
    }

    /// Lowercase name as typed at the prompt
    pub fn prompt_name(&self) -> &'static str {
        match self {
            City::Chicago => "chicago",
            City::NewYorkCity => "new york city",
            City::Washington => "washington",
        }
    }
}

impl fmt::Display for City {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            City::Chicago => write!(f, "Chicago"),
            City::NewYorkCity => write!(f, "New York City"),
            City::Washington => write!(f, "Washington"),
        }
    }
}

impl std::str::FromStr for City {
    type Err = BikeshareError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(' ', "_");
        City::ALL
            .into_iter()
            .find(|city| city.id() == normalized)
            .ok_or_else(|| {
                BikeshareError::InvalidCity(format!(
                    "'{s}', expected one of: chicago, new york city, washington"
                ))
            })
    }
}

/// One trip from a city dataset
///
/// `month` and `day_of_week` are derived from `start_time` on construction and
/// cannot be set independently.
///
/// # Examples
/// ```
/// use bikeshare_core::types::TripRecord;
/// use chrono::{NaiveDate, Weekday};
///
/// let start = NaiveDate::from_ymd_opt(2017, 3, 6)
///     .unwrap()
///     .and_hms_opt(8, 15, 0)
///     .unwrap();
/// let trip = TripRecord::new(start, "Canal St", "Clark St", 540.0, Some("Subscriber".into()));
/// assert_eq!(trip.month(), 3);
/// assert_eq!(trip.day_of_week(), Weekday::Mon);
/// assert_eq!(trip.hour(), 8);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TripRecord {
    start_time: NaiveDateTime,
    #[serde(skip_serializing_if = "Option::is_none")]
    end_time: Option<NaiveDateTime>,
    start_station: String,
    end_station: String,
    trip_duration: f64,
    user_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    gender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    birth_year: Option<i32>,
    month: u32,
    day_of_week: Weekday,
}

impl TripRecord {
    /// Create a trip with the required fields
    pub fn new(
        start_time: NaiveDateTime,
        start_station: impl Into<String>,
        end_station: impl Into<String>,
        trip_duration: f64,
        user_type: Option<String>,
    ) -> Self {
        Self {
            start_time,
            end_time: None,
            start_station: start_station.into(),
            end_station: end_station.into(),
            trip_duration,
            user_type,
            gender: None,
            birth_year: None,
            month: start_time.month(),
            day_of_week: start_time.weekday(),
        }
    }

    /// Set the end time
    pub fn with_end_time(mut self, end_time: Option<NaiveDateTime>) -> Self {
        self.end_time = end_time;
        self
    }

    /// Set the rider's gender
    pub fn with_gender(mut self, gender: Option<String>) -> Self {
        self.gender = gender;
        self
    }

    /// Set the rider's birth year
    pub fn with_birth_year(mut self, birth_year: Option<i32>) -> Self {
        self.birth_year = birth_year;
        self
    }

    pub fn start_time(&self) -> NaiveDateTime {
        self.start_time
    }

    pub fn end_time(&self) -> Option<NaiveDateTime> {
        self.end_time
    }

    pub fn start_station(&self) -> &str {
        &self.start_station
    }

    pub fn end_station(&self) -> &str {
        &self.end_station
    }

    /// Trip duration in seconds
    pub fn trip_duration(&self) -> f64 {
        self.trip_duration
    }

    pub fn user_type(&self) -> Option<&str> {
        self.user_type.as_deref()
    }

    pub fn gender(&self) -> Option<&str> {
        self.gender.as_deref()
    }

    pub fn birth_year(&self) -> Option<i32> {
        self.birth_year
    }

    /// Calendar month of the start time (January = 1)
    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn day_of_week(&self) -> Weekday {
        self.day_of_week
    }

    /// Hour of day of the start time (0-23)
    pub fn hour(&self) -> u32 {
        self.start_time.hour()
    }
}

/// In-memory trips for a single city
///
/// `has_demographics` records whether the source carried gender and birth
/// year columns. Statistics consult this flag instead of the city.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TripTable {
    city: City,
    has_demographics: bool,
    records: Vec<TripRecord>,
}

impl TripTable {
    /// Create a new table
    pub fn new(city: City, has_demographics: bool, records: Vec<TripRecord>) -> Self {
        Self {
            city,
            has_demographics,
            records,
        }
    }

    pub fn city(&self) -> City {
        self.city
    }

    pub fn has_demographics(&self) -> bool {
        self.has_demographics
    }

    pub fn records(&self) -> &[TripRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TripRecord> {
        self.records.iter()
    }

    /// Rows `offset..offset + count`, clamped to the table length
    pub fn page(&self, offset: usize, count: usize) -> &[TripRecord] {
        let start = offset.min(self.records.len());
        let end = offset.saturating_add(count).min(self.records.len());
        &self.records[start..end]
    }

    /// Copy the rows matching `predicate` into a new table, keeping order
    pub fn select<F>(&self, mut predicate: F) -> TripTable
    where
        F: FnMut(&TripRecord) -> bool,
    {
        TripTable {
            city: self.city,
            has_demographics: self.has_demographics,
            records: self
                .records
                .iter()
                .filter(|record| predicate(record))
                .cloned()
                .collect(),
        }
    }
}
