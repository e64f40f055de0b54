//! CLI interface for bikeshare
//!
//! This module defines the command-line interface using clap. Passing
//! `--city` runs the pipeline once and exits; without it the interactive
//! shell prompts for every choice.
//!
//! # Example
//!
//! ```bash
//! # Interactive session
//! bikeshare
//!
//! # One-shot report for Mondays in March, data files in ./data
//! bikeshare --city chicago --month march --day monday --data-dir ./data
//!
//! # JSON output with the first 10 matching trips
//! bikeshare --city washington --json --raw 10
//! ```

use crate::error::Result;
use crate::filters::{DaySelector, MonthSelector, TripFilter, TripQuery};
use crate::types::City;
use clap::Parser;
use std::path::PathBuf;

/// Explore US bikeshare trip data
#[derive(Parser, Debug, Clone)]
#[command(name = "bikeshare")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Show informational output (default is quiet mode with only warnings and errors)
    #[arg(long, short = 'v')]
    pub verbose: bool,

    /// Directory containing chicago.csv, new_york_city.csv and washington.csv
    #[arg(long, env = "BIKESHARE_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// City to analyze (chicago, new_york_city, washington); skips the prompts
    #[arg(long, short = 'c', value_parser = parse_city)]
    pub city: Option<City>,

    /// Month to analyze (january-june) or "all"
    #[arg(long, short = 'm', default_value = "all", requires = "city", value_parser = parse_month)]
    pub month: MonthSelector,

    /// Day of week to analyze (monday-sunday) or "all"
    #[arg(long, short = 'd', default_value = "all", requires = "city", value_parser = parse_day)]
    pub day: DaySelector,

    /// Print the first N matching trips before the statistics
    #[arg(long, requires = "city")]
    pub raw: Option<usize>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl Cli {
    /// The one-shot query, when `--city` was given
    pub fn query(&self) -> Option<TripQuery> {
        let filter = TripFilter::new().with_month(self.month).with_day(self.day);
        self.city.map(|city| TripQuery::new(city).with_filter(filter))
    }
}

fn parse_city(value: &str) -> Result<City> {
    value.parse()
}

fn parse_month(value: &str) -> Result<MonthSelector> {
    value.parse()
}

fn parse_day(value: &str) -> Result<DaySelector> {
    value.parse()
}
