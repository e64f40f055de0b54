//! Output formatting module for bikeshare
//!
//! This module provides formatters for displaying statistics in different
//! formats:
//! - Table format for human-readable terminal output
//! - JSON format for machine-readable output
//!
//! Rounding to two decimal places happens here and nowhere else.
//!
//! # Examples
//!
//! ```no_run
//! use bikeshare::output::get_formatter;
//! use bikeshare::statistics::StatsReport;
//! use bikeshare::types::TripTable;
//!
//! # fn example(table: &TripTable) -> bikeshare::Result<()> {
//! let report = StatsReport::compute("Chicago during all months", table)?;
//! println!("{}", get_formatter(false).format_report(&report));
//! println!("{}", get_formatter(true).format_report(&report));
//! # Ok(())
//! # }
//! ```

use crate::filters::weekday_name;
use crate::statistics::StatsReport;
use crate::stats_types::{CategoryShare, Demographics};
use crate::types::TripRecord;
use colored::Colorize;
use prettytable::{Table, format, row};
use serde_json::json;

const DIVIDER_WIDTH: usize = 40;

/// Trait for output formatters
pub trait OutputFormatter {
    /// Format every statistics section of a report
    fn format_report(&self, report: &StatsReport) -> String;

    /// Format raw trip rows; `offset` is the index of the first row
    fn format_raw_rows(&self, rows: &[TripRecord], offset: usize) -> String;
}

/// Table formatter for human-readable output
pub struct TableFormatter;

impl TableFormatter {
    fn new_table() -> Table {
        let mut table = Table::new();
        table.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);
        table
    }

    fn heading(title: &str) -> String {
        format!("\n{}\n", title.bold().cyan())
    }

    fn footer(seconds: f64) -> String {
        format!("\nThis took {seconds:.6} seconds.\n{}\n", "-".repeat(DIVIDER_WIDTH))
    }

    /// Format a count with thousands separators
    fn format_number(n: usize) -> String {
        let s = n.to_string();
        let mut result = String::new();

        for (count, ch) in s.chars().rev().enumerate() {
            if count > 0 && count % 3 == 0 {
                result.push(',');
            }
            result.push(ch);
        }

        result.chars().rev().collect()
    }

    fn format_percentage(value: f64) -> String {
        format!("{value:.2}%")
    }

    fn share_table(header: &str, shares: &[CategoryShare], unknown: usize) -> String {
        let mut table = Self::new_table();
        table.set_titles(row![b -> header, b -> "Count", b -> "Share"]);
        for share in shares {
            table.add_row(row![
                share.label,
                r -> Self::format_number(share.count),
                r -> Self::format_percentage(share.percentage)
            ]);
        }
        if unknown > 0 {
            table.add_row(row![i -> "(not recorded)", r -> Self::format_number(unknown), ""]);
        }
        table.to_string()
    }

    fn format_time(report: &StatsReport) -> String {
        let time = &report.time;
        let mut table = Self::new_table();
        table.set_titles(row![b -> "Most common", b -> "Value", b -> "Trips"]);
        table.add_row(row![
            "Month",
            time.most_common_month.value.name(),
            r -> Self::format_number(time.most_common_month.count)
        ]);
        table.add_row(row![
            "Day of week",
            weekday_name(time.most_common_day.value),
            r -> Self::format_number(time.most_common_day.count)
        ]);
        table.add_row(row![
            "Start hour",
            format!("{}:00", time.most_common_hour.value),
            r -> Self::format_number(time.most_common_hour.count)
        ]);

        let mut output = Self::heading("The Most Frequent Times of Travel");
        output.push_str(&table.to_string());
        output.push_str(&Self::footer(report.timings.time));
        output
    }

    fn format_stations(report: &StatsReport) -> String {
        let stations = &report.stations;
        let mut table = Self::new_table();
        table.set_titles(row![b -> "Most common", b -> "Station", b -> "Trips"]);
        table.add_row(row![
            "Start station",
            stations.most_common_start_station.value,
            r -> Self::format_number(stations.most_common_start_station.count)
        ]);
        table.add_row(row![
            "End station",
            stations.most_common_end_station.value,
            r -> Self::format_number(stations.most_common_end_station.count)
        ]);
        table.add_row(row![
            "Trip",
            stations.most_common_trip.value,
            r -> Self::format_number(stations.most_common_trip.count)
        ]);

        let mut output = Self::heading("The Most Popular Stations and Trip");
        output.push_str(&table.to_string());
        output.push_str(&Self::footer(report.timings.stations));
        output
    }

    fn format_durations(report: &StatsReport) -> String {
        let d = &report.durations;
        let mut table = Self::new_table();
        table.set_titles(row![b -> "Trip duration", b -> "Value"]);
        table.add_row(row![
            "Total travel time",
            format!("{:.2} hours or {:.2} days", d.total_hours(), d.total_days())
        ]);
        table.add_row(row![
            "Mean travel time",
            format!("{:.2} seconds or {:.2} minutes", d.mean_seconds, d.mean_minutes())
        ]);
        table.add_row(row!["Trips", r -> Self::format_number(d.trip_count)]);

        let mut output = Self::heading("Trip Duration");
        output.push_str(&table.to_string());
        output.push_str(&Self::footer(report.timings.durations));
        output
    }

    fn format_users(report: &StatsReport) -> String {
        let users = &report.users;
        let mut output = Self::heading("User Stats");
        output.push_str(&Self::share_table(
            "User type",
            &users.user_types,
            users.unknown_user_types,
        ));

        match &users.demographics {
            Demographics::Unavailable => {
                output.push_str("\nGender and year of birth data not available for this city.\n");
            }
            Demographics::Available(demo) => {
                output.push('\n');
                output.push_str(&Self::share_table("Gender", &demo.genders, demo.unknown_genders));

                let year = |y: Option<i32>| y.map_or_else(|| "-".to_string(), |y| y.to_string());
                let mut table = Self::new_table();
                table.set_titles(row![b -> "Year of birth", b -> "Value"]);
                table.add_row(row!["Earliest", year(demo.earliest_birth_year)]);
                table.add_row(row!["Most recent", year(demo.most_recent_birth_year)]);
                table.add_row(row![
                    "Most common",
                    year(demo.most_common_birth_year.as_ref().map(|m| m.value))
                ]);
                output.push('\n');
                output.push_str(&table.to_string());
            }
        }

        output.push_str(&Self::footer(report.timings.users));
        output
    }
}

impl OutputFormatter for TableFormatter {
    fn format_report(&self, report: &StatsReport) -> String {
        let mut output = format!(
            "Statistics for {} ({} trips)\n",
            report.selection,
            Self::format_number(report.trip_count)
        );
        output.push_str(&Self::format_time(report));
        output.push_str(&Self::format_stations(report));
        output.push_str(&Self::format_durations(report));
        output.push_str(&Self::format_users(report));
        output
    }

    fn format_raw_rows(&self, rows: &[TripRecord], offset: usize) -> String {
        let mut table = Self::new_table();
        table.set_titles(row![
            b -> "#",
            b -> "Start Time",
            b -> "End Time",
            b -> "Duration (s)",
            b -> "Start Station",
            b -> "End Station",
            b -> "User Type",
            b -> "Gender",
            b -> "Birth Year"
        ]);

        for (i, trip) in rows.iter().enumerate() {
            table.add_row(row![
                r -> offset + i + 1,
                trip.start_time().format("%Y-%m-%d %H:%M:%S"),
                trip.end_time()
                    .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
                    .unwrap_or_default(),
                r -> format!("{:.2}", trip.trip_duration()),
                trip.start_station(),
                trip.end_station(),
                trip.user_type().unwrap_or(""),
                trip.gender().unwrap_or(""),
                trip.birth_year().map(|y| y.to_string()).unwrap_or_default()
            ]);
        }

        table.to_string()
    }
}

/// JSON formatter for machine-readable output
///
/// Values are emitted unrounded.
pub struct JsonFormatter;

impl OutputFormatter for JsonFormatter {
    fn format_report(&self, report: &StatsReport) -> String {
        let d = &report.durations;
        let output = json!({
            "selection": report.selection,
            "trip_count": report.trip_count,
            "time": {
                "most_common_month": report.time.most_common_month.value.name(),
                "most_common_month_count": report.time.most_common_month.count,
                "most_common_day": weekday_name(report.time.most_common_day.value),
                "most_common_day_count": report.time.most_common_day.count,
                "most_common_hour": report.time.most_common_hour.value,
                "most_common_hour_count": report.time.most_common_hour.count,
            },
            "stations": report.stations,
            "durations": {
                "trip_count": d.trip_count,
                "total_seconds": d.total_seconds,
                "total_hours": d.total_hours(),
                "total_days": d.total_days(),
                "mean_seconds": d.mean_seconds,
                "mean_minutes": d.mean_minutes(),
            },
            "users": report.users,
            "timings": report.timings,
        });
        serde_json::to_string_pretty(&output).unwrap_or_else(|_| "{}".to_string())
    }

    fn format_raw_rows(&self, rows: &[TripRecord], offset: usize) -> String {
        let output = json!({
            "offset": offset,
            "rows": rows,
        });
        serde_json::to_string_pretty(&output).unwrap_or_else(|_| "{}".to_string())
    }
}

/// Get the appropriate formatter based on output preference
pub fn get_formatter(json: bool) -> Box<dyn OutputFormatter> {
    if json {
        Box::new(JsonFormatter)
    } else {
        Box::new(TableFormatter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{City, TripTable};
    use chrono::NaiveDate;

    fn sample_table(has_demographics: bool) -> TripTable {
        let start = NaiveDate::from_ymd_opt(2017, 1, 2)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap();
        let records = vec![
            TripRecord::new(start, "Canal St", "Clark St", 600.0, Some("Subscriber".into()))
                .with_gender(Some("Female".into()))
                .with_birth_year(Some(1990)),
            TripRecord::new(start, "Canal St", "State St", 900.0, Some("Customer".into()))
                .with_gender(Some("Male".into()))
                .with_birth_year(Some(1985)),
        ];
        TripTable::new(City::Chicago, has_demographics, records)
    }

    #[test]
    fn test_number_formatting() {
        assert_eq!(TableFormatter::format_number(0), "0");
        assert_eq!(TableFormatter::format_number(999), "999");
        assert_eq!(TableFormatter::format_number(1000), "1,000");
        assert_eq!(TableFormatter::format_number(1234567), "1,234,567");
    }

    #[test]
    fn test_percentage_formatting() {
        assert_eq!(TableFormatter::format_percentage(80.0), "80.00%");
        assert_eq!(TableFormatter::format_percentage(33.33333), "33.33%");
    }

    #[test]
    fn test_table_report() {
        colored::control::set_override(false);
        let report = StatsReport::compute("Chicago during January", &sample_table(true)).unwrap();
        let output = TableFormatter.format_report(&report);

        assert!(output.contains("Statistics for Chicago during January (2 trips)"));
        assert!(output.contains("January"));
        assert!(output.contains("Monday"));
        assert!(output.contains("8:00"));
        assert!(output.contains("Canal St and Clark St"));
        assert!(output.contains("0.42 hours or 0.02 days"));
        assert!(output.contains("750.00 seconds or 12.50 minutes"));
        assert!(output.contains("50.00%"));
        assert!(output.contains("1985"));
        assert!(output.contains("This took"));
    }

    #[test]
    fn test_table_report_without_demographics() {
        colored::control::set_override(false);
        let report = StatsReport::compute("Washington", &sample_table(false)).unwrap();
        let output = TableFormatter.format_report(&report);
        assert!(output.contains("not available"));
        assert!(!output.contains("Year of birth"));
    }

    #[test]
    fn test_raw_rows() {
        let table = sample_table(true);
        let output = TableFormatter.format_raw_rows(table.page(0, 5), 5);
        assert!(output.contains("2017-01-02 08:00:00"));
        assert!(output.contains("State St"));
        assert!(output.contains('6'));
    }

    #[test]
    fn test_json_report() {
        let report = StatsReport::compute("Chicago", &sample_table(true)).unwrap();
        let output = JsonFormatter.format_report(&report);
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(parsed["trip_count"], 2);
        assert_eq!(parsed["time"]["most_common_month"], "January");
        assert_eq!(parsed["time"]["most_common_day"], "Monday");
        assert_eq!(parsed["durations"]["total_seconds"], 1500.0);
        assert_eq!(parsed["users"]["demographics"]["status"], "available");
        assert_eq!(
            parsed["stations"]["most_common_start_station"]["value"],
            "Canal St"
        );
    }

    #[test]
    fn test_json_raw_rows() {
        let table = sample_table(false);
        let output = JsonFormatter.format_raw_rows(table.records(), 0);
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed["rows"].as_array().unwrap().len(), 2);
        assert_eq!(parsed["rows"][0]["start_station"], "Canal St");
    }

    #[test]
    fn test_get_formatter() {
        let report = StatsReport::compute("Chicago", &sample_table(true)).unwrap();
        let json_output = get_formatter(true).format_report(&report);
        assert!(serde_json::from_str::<serde_json::Value>(&json_output).is_ok());
        let table_output = get_formatter(false).format_report(&report);
        assert!(serde_json::from_str::<serde_json::Value>(&table_output).is_err());
    }
}
