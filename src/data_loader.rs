//! Data loader module for locating and parsing city trip files
//!
//! Each city has one CSV file (`chicago.csv`, `new_york_city.csv`,
//! `washington.csv`). The loader searches a list of data directories for the
//! city's file, reads it completely into memory, and parses every row into a
//! [`TripRecord`]. A row with an unparseable start time, a non-numeric or
//! negative trip duration, or a malformed birth year aborts the whole load.
//!
//! # Search Order
//!
//! - The directory passed to [`DataLoader::new`] (from `--data-dir` or the
//!   `BIKESHARE_DATA_DIR` environment variable), exclusively when given
//! - Otherwise the current working directory, then
//!   `<platform data dir>/bikeshare`
//!
//! # Examples
//!
//! ```no_run
//! use bikeshare::data_loader::{DataLoader, TripSource};
//! use bikeshare::types::City;
//!
//! # async fn example() -> bikeshare::Result<()> {
//! let loader = DataLoader::new(None);
//! let table = loader.load(City::Chicago).await?;
//! println!("Loaded {} trips", table.len());
//! # Ok(())
//! # }
//! ```

use crate::error::{BikeshareError, Result};
use crate::filters::TripQuery;
use crate::types::{City, TripRecord, TripTable};
use async_trait::async_trait;
use chrono::NaiveDateTime;
use csv::StringRecord;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const START_TIME: &str = "Start Time";
const END_TIME: &str = "End Time";
const TRIP_DURATION: &str = "Trip Duration";
const START_STATION: &str = "Start Station";
const END_STATION: &str = "End Station";
const USER_TYPE: &str = "User Type";
const GENDER: &str = "Gender";
const BIRTH_YEAR: &str = "Birth Year";

const TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Anything that can produce a city's trip table
///
/// The pipeline only depends on this trait, so it can run against in-memory
/// tables as well as CSV files.
#[async_trait]
pub trait TripSource: Send + Sync {
    /// Load every trip for `city`
    async fn load(&self, city: City) -> Result<TripTable>;
}

/// Load the query's city and apply its filter
///
/// The loaded table is dropped once filtered; nothing is cached between
/// calls.
pub async fn load_selection(source: &dyn TripSource, query: &TripQuery) -> Result<TripTable> {
    let table = source.load(query.city).await?;
    let filtered = query.filter.apply(&table);
    info!(
        "Selected {} of {} trips for {}",
        filtered.len(),
        table.len(),
        query.describe()
    );
    Ok(filtered)
}

/// CSV-backed trip loader
pub struct DataLoader {
    /// Directories searched for city files, in priority order
    search_paths: Vec<PathBuf>,
    show_progress: bool,
}

impl DataLoader {
    /// Create a new DataLoader
    ///
    /// With an explicit `data_dir` only that directory is searched; otherwise
    /// the default locations are used.
    pub fn new(data_dir: Option<PathBuf>) -> Self {
        let search_paths = match data_dir {
            Some(dir) => vec![dir],
            None => Self::default_search_paths(),
        };
        debug!("Data search paths: {:?}", search_paths);
        Self {
            search_paths,
            show_progress: false,
        }
    }

    /// Enable or disable the loading spinner
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    fn default_search_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();
        if let Ok(cwd) = std::env::current_dir() {
            paths.push(cwd);
        }
        if let Some(data_dir) = dirs::data_dir() {
            paths.push(data_dir.join("bikeshare"));
        }
        paths
    }

    /// Find the file holding `city`'s trips
    ///
    /// # Errors
    ///
    /// Returns [`BikeshareError::DataFileNotFound`] listing every candidate
    /// path when no search directory contains the file.
    pub fn locate(&self, city: City) -> Result<PathBuf> {
        let candidates: Vec<PathBuf> = self
            .search_paths
            .iter()
            .map(|dir| dir.join(city.file_name()))
            .collect();

        candidates
            .iter()
            .find(|path| path.is_file())
            .cloned()
            .ok_or_else(|| BikeshareError::DataFileNotFound {
                city: city.to_string(),
                searched: candidates,
            })
    }

    fn spinner(&self, city: City) -> Option<ProgressBar> {
        if !self.show_progress {
            return None;
        }
        let pb = ProgressBar::new_spinner();
        let style = ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg} [{elapsed_precise}]")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        pb.set_style(style);
        pb.set_message(format!("Loading {city} trips"));
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        Some(pb)
    }
}

#[async_trait]
impl TripSource for DataLoader {
    async fn load(&self, city: City) -> Result<TripTable> {
        let path = self.locate(city)?;
        let progress = self.spinner(city);

        let result = read_and_parse(city, &path).await;
        if let Some(pb) = progress {
            pb.finish_and_clear();
        }

        let table = result?;
        info!(
            "Loaded {} {} trips from {} (demographics: {})",
            table.len(),
            city,
            path.display(),
            table.has_demographics()
        );
        Ok(table)
    }
}

async fn read_and_parse(city: City, path: &Path) -> Result<TripTable> {
    // The file handle is released before parsing starts
    let bytes = tokio::fs::read(path).await?;
    debug!("Read {} bytes from {}", bytes.len(), path.display());
    parse_trip_csv(city, path, &bytes)
}

/// Column positions resolved from the header row
struct ColumnIndex {
    start_time: usize,
    end_time: Option<usize>,
    trip_duration: usize,
    start_station: usize,
    end_station: usize,
    user_type: usize,
    gender: Option<usize>,
    birth_year: Option<usize>,
}

impl ColumnIndex {
    fn from_headers(headers: &StringRecord, file: &Path) -> Result<Self> {
        let find = |name: &str| headers.iter().position(|h| h.trim() == name);
        let require = |name: &str| {
            find(name).ok_or_else(|| BikeshareError::MissingColumn {
                file: file.to_path_buf(),
                column: name.to_string(),
            })
        };

        Ok(Self {
            start_time: require(START_TIME)?,
            end_time: find(END_TIME),
            trip_duration: require(TRIP_DURATION)?,
            start_station: require(START_STATION)?,
            end_station: require(END_STATION)?,
            user_type: require(USER_TYPE)?,
            gender: find(GENDER),
            birth_year: find(BIRTH_YEAR),
        })
    }

    /// Gender and birth year are only meaningful together
    fn has_demographics(&self) -> bool {
        self.gender.is_some() && self.birth_year.is_some()
    }
}

/// Parse an in-memory CSV document into a trip table
///
/// `path` is only used for error messages.
pub fn parse_trip_csv(city: City, path: &Path, bytes: &[u8]) -> Result<TripTable> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(bytes);

    let columns = ColumnIndex::from_headers(reader.headers()?, path)?;
    let has_demographics = columns.has_demographics();
    if !has_demographics {
        debug!("{} has no gender/birth year columns", path.display());
    }

    let mut records = Vec::new();
    for (index, row) in reader.records().enumerate() {
        let row = row?;
        records.push(parse_row(&row, &columns, has_demographics, path, index + 1)?);
    }

    Ok(TripTable::new(city, has_demographics, records))
}

fn parse_row(
    row: &StringRecord,
    columns: &ColumnIndex,
    has_demographics: bool,
    path: &Path,
    row_number: usize,
) -> Result<TripRecord> {
    let malformed = |message: String| BikeshareError::DataFormat {
        file: path.to_path_buf(),
        row: row_number,
        message,
    };
    let field = |index: usize| row.get(index).unwrap_or("");
    let optional = |index: Option<usize>| {
        index
            .map(field)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
    };

    let raw_start = field(columns.start_time);
    let start_time = parse_timestamp(raw_start)
        .ok_or_else(|| malformed(format!("unparseable start time '{raw_start}'")))?;

    let end_time = columns
        .end_time
        .map(field)
        .filter(|value| !value.is_empty())
        .and_then(parse_timestamp);

    let raw_duration = field(columns.trip_duration);
    let trip_duration = raw_duration
        .parse::<f64>()
        .ok()
        .filter(|d| d.is_finite() && *d >= 0.0)
        .ok_or_else(|| malformed(format!("invalid trip duration '{raw_duration}'")))?;

    let mut record = TripRecord::new(
        start_time,
        field(columns.start_station),
        field(columns.end_station),
        trip_duration,
        optional(Some(columns.user_type)),
    )
    .with_end_time(end_time);

    if has_demographics {
        let birth_year = match optional(columns.birth_year) {
            Some(raw) => Some(
                parse_birth_year(&raw)
                    .ok_or_else(|| malformed(format!("invalid birth year '{raw}'")))?,
            ),
            None => None,
        };
        record = record
            .with_gender(optional(columns.gender))
            .with_birth_year(birth_year);
    }

    Ok(record)
}

/// Parse a start/end timestamp in any of the accepted layouts
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
}

/// Birth years are stored either as `1989` or `1989.0`
fn parse_birth_year(value: &str) -> Option<i32> {
    if let Ok(year) = value.parse::<i32>() {
        return Some(year);
    }
    value
        .parse::<f64>()
        .ok()
        .filter(|year| year.fract() == 0.0)
        .filter(|year| (f64::from(i32::MIN)..=f64::from(i32::MAX)).contains(year))
        .map(|year| year as i32)
}
