//! Common test utilities and helpers for bikeshare tests
//!
//! This module provides a builder for trip records and helpers that write
//! CSV fixtures into a temporary data directory.

#![allow(dead_code)]

use bikeshare::types::{City, TripRecord, TripTable};
use chrono::{NaiveDate, NaiveDateTime};
use std::path::Path;
use tempfile::TempDir;

/// Header used by the Chicago and New York City files
pub const DEMOGRAPHIC_HEADER: &str =
    ",Start Time,End Time,Trip Duration,Start Station,End Station,User Type,Gender,Birth Year";

/// Header used by the Washington file
pub const BASIC_HEADER: &str =
    ",Start Time,End Time,Trip Duration,Start Station,End Station,User Type";

/// Common station names
pub const TEST_STATIONS: &[&str] = &[
    "Canal St & Adams St",
    "Clinton St & Washington Blvd",
    "Lake Shore Dr & Monroe St",
    "Streeter Dr & Grand Ave",
];

/// Builder for creating test TripRecord instances
pub struct TripRecordBuilder {
    start_time: NaiveDateTime,
    start_station: String,
    end_station: String,
    duration: f64,
    user_type: Option<String>,
    gender: Option<String>,
    birth_year: Option<i32>,
}

impl TripRecordBuilder {
    /// Create a new builder with default values
    pub fn new() -> Self {
        Self {
            start_time: at(2017, 1, 2, 8),
            start_station: TEST_STATIONS[0].to_string(),
            end_station: TEST_STATIONS[1].to_string(),
            duration: 600.0,
            user_type: Some("Subscriber".to_string()),
            gender: None,
            birth_year: None,
        }
    }

    pub fn with_start(mut self, year: i32, month: u32, day: u32, hour: u32) -> Self {
        self.start_time = at(year, month, day, hour);
        self
    }

    pub fn with_stations(mut self, start: &str, end: &str) -> Self {
        self.start_station = start.to_string();
        self.end_station = end.to_string();
        self
    }

    pub fn with_duration(mut self, seconds: f64) -> Self {
        self.duration = seconds;
        self
    }

    pub fn with_user_type(mut self, user_type: &str) -> Self {
        self.user_type = Some(user_type.to_string());
        self
    }

    pub fn with_gender(mut self, gender: &str) -> Self {
        self.gender = Some(gender.to_string());
        self
    }

    pub fn with_birth_year(mut self, year: i32) -> Self {
        self.birth_year = Some(year);
        self
    }

    pub fn build(self) -> TripRecord {
        TripRecord::new(
            self.start_time,
            self.start_station,
            self.end_station,
            self.duration,
            self.user_type,
        )
        .with_gender(self.gender)
        .with_birth_year(self.birth_year)
    }
}

impl Default for TripRecordBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Timestamp at the top of `hour`
pub fn at(year: i32, month: u32, day: u32, hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .unwrap()
        .and_hms_opt(hour, 0, 0)
        .unwrap()
}

/// One CSV row in the Chicago/New York layout
pub fn demographic_row(index: usize, record: &TripRecord) -> String {
    format!(
        "{},{},{},{},{},{},{},{},{}",
        index,
        record.start_time().format("%Y-%m-%d %H:%M:%S"),
        (record.start_time() + chrono::Duration::seconds(record.trip_duration() as i64))
            .format("%Y-%m-%d %H:%M:%S"),
        record.trip_duration(),
        record.start_station(),
        record.end_station(),
        record.user_type().unwrap_or(""),
        record.gender().unwrap_or(""),
        record
            .birth_year()
            .map(|y| format!("{y}.0"))
            .unwrap_or_default(),
    )
}

/// One CSV row in the Washington layout
pub fn basic_row(index: usize, record: &TripRecord) -> String {
    format!(
        "{},{},,{},{},{},{}",
        index,
        record.start_time().format("%Y-%m-%d %H:%M:%S"),
        record.trip_duration(),
        record.start_station(),
        record.end_station(),
        record.user_type().unwrap_or(""),
    )
}

/// Write `records` as `city`'s CSV file inside `dir`
///
/// Washington gets the layout without demographic columns.
pub fn write_city_csv(dir: &Path, city: City, records: &[TripRecord]) {
    let mut contents = String::new();
    if city == City::Washington {
        contents.push_str(BASIC_HEADER);
        contents.push('\n');
        for (i, record) in records.iter().enumerate() {
            contents.push_str(&basic_row(i, record));
            contents.push('\n');
        }
    } else {
        contents.push_str(DEMOGRAPHIC_HEADER);
        contents.push('\n');
        for (i, record) in records.iter().enumerate() {
            contents.push_str(&demographic_row(i, record));
            contents.push('\n');
        }
    }
    std::fs::write(dir.join(city.file_name()), contents).unwrap();
}

/// A spread of trips across January-June, all weekdays and several hours
pub fn sample_trips(count: usize) -> Vec<TripRecord> {
    (0..count)
        .map(|i| {
            let month = (i % 6) as u32 + 1;
            let day = (i % 28) as u32 + 1;
            let hour = (i % 24) as u32;
            let user_type = if i % 5 == 0 { "Customer" } else { "Subscriber" };
            let gender = if i % 3 == 0 { "Female" } else { "Male" };
            TripRecordBuilder::new()
                .with_start(2017, month, day, hour)
                .with_stations(
                    TEST_STATIONS[i % TEST_STATIONS.len()],
                    TEST_STATIONS[(i + 1) % TEST_STATIONS.len()],
                )
                .with_duration(60.0 * (i % 30 + 1) as f64)
                .with_user_type(user_type)
                .with_gender(gender)
                .with_birth_year(1960 + (i % 40) as i32)
                .build()
        })
        .collect()
}

/// Temporary data directory populated with all three city files
pub fn create_data_dir(rows_per_city: usize) -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    let trips = sample_trips(rows_per_city);
    for city in City::ALL {
        write_city_csv(temp_dir.path(), city, &trips);
    }
    temp_dir
}

/// In-memory table with demographics
pub fn table_of(records: Vec<TripRecord>) -> TripTable {
    TripTable::new(City::Chicago, true, records)
}
