//! Core types, filters, and error handling for bikeshare
//!
//! This crate provides the domain types (cities, trip records, trip tables),
//! the month/day filter engine, the statistics result types, and the error
//! taxonomy shared by the `bikeshare` binary crate.

pub mod error;
pub mod filters;
pub mod stats_types;
pub mod types;

// Re-export commonly used types
pub use error::{BikeshareError, Result};
pub use filters::{DaySelector, MonthSelector, TripFilter, TripQuery};
pub use types::{City, TripRecord, TripTable};
