//! bikeshare - Explore US bikeshare trip data from the command line
//!
//! This library provides functionality to:
//! - Load a city's trip CSV into memory with derived month and weekday fields
//! - Filter trips by month (January to June) and day of week
//! - Compute travel time, station, trip duration and rider statistics
//! - Render the results as tables or JSON
//! - Drive the whole pipeline from an interactive prompt
//!
//! # Examples
//!
//! ```no_run
//! use bikeshare::{
//!     data_loader::{DataLoader, load_selection},
//!     filters::{TripFilter, TripQuery},
//!     output::get_formatter,
//!     statistics::StatsReport,
//!     types::City,
//! };
//!
//! #[tokio::main]
//! async fn main() -> bikeshare::Result<()> {
//!     let loader = DataLoader::new(None);
//!     let query = TripQuery::new(City::Chicago).with_filter(TripFilter::parse("march", "all")?);
//!
//!     let table = load_selection(&loader, &query).await?;
//!     let report = StatsReport::compute(query.describe(), &table)?;
//!     println!("{}", get_formatter(false).format_report(&report));
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod data_loader;
pub mod output;
pub mod shell;
pub mod statistics;

// Re-export core modules under the familiar paths
pub use bikeshare_core::{error, filters, stats_types, types};

// Re-export commonly used types
pub use bikeshare_core::{BikeshareError, City, Result, TripFilter, TripQuery, TripRecord, TripTable};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
