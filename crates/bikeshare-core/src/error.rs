//! Error types for bikeshare
//!
//! This module defines the error types used throughout the bikeshare crates.
//! All errors are derived from `thiserror` for convenient error handling
//! and automatic `From` implementations.
//!
//! # Example
//!
//! ```
//! use bikeshare_core::error::{BikeshareError, Result};
//!
//! fn example_function() -> Result<()> {
//!     // This will automatically convert io::Error to BikeshareError
//!     let _file = std::fs::read_to_string("nonexistent.csv")?;
//!     Ok(())
//! }
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for bikeshare operations
///
/// Malformed source data and I/O failures are terminal. Invalid selectors and
/// empty selections are recoverable, see [`BikeshareError::is_recoverable`].
#[derive(Error, Debug)]
pub enum BikeshareError {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV reader error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A row in a source file could not be parsed
    #[error("Malformed data in {} (row {row}): {message}", file.display())]
    DataFormat {
        /// The file containing the bad row
        file: PathBuf,
        /// 1-based data row number (header excluded)
        row: usize,
        /// What was wrong with the row
        message: String,
    },

    /// A required column is missing from a source file
    #[error("Missing column '{column}' in {}", file.display())]
    MissingColumn {
        /// The file missing the column
        file: PathBuf,
        /// Column header that was expected
        column: String,
    },

    /// No data file for the requested city was found
    #[error("No data file for {city} found (searched: {})", format_paths(searched))]
    DataFileNotFound {
        /// City display name
        city: String,
        /// Every candidate path that was checked
        searched: Vec<PathBuf>,
    },

    /// Month or day selector outside the recognized set
    #[error("Invalid filter: {0}")]
    InvalidFilter(String),

    /// Unknown city identifier
    #[error("Invalid city: {0}")]
    InvalidCity(String),

    /// A statistic was requested on a selection without rows
    #[error("No data for this selection ({statistic} needs at least one trip)")]
    EmptyDataset {
        /// Name of the statistic that was requested
        statistic: &'static str,
    },
}

impl BikeshareError {
    /// Whether an interactive session can carry on after this error
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::InvalidFilter(_) | Self::InvalidCity(_) | Self::EmptyDataset { .. }
        )
    }
}

fn format_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Convenience type alias for Results in bikeshare
///
/// # Example
///
/// ```
/// use bikeshare_core::Result;
///
/// fn process_data() -> Result<String> {
///     Ok("Processed successfully".to_string())
/// }
/// ```
pub type Result<T> = std::result::Result<T, BikeshareError>;
