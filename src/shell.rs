//! Interactive shell
//!
//! Prompts for a city, month and day, optionally pages through the raw trips
//! five at a time, prints the statistics, and offers to start over. Invalid
//! answers re-prompt with the list of accepted values. End of input ends the
//! session quietly.
//!
//! The shell is generic over its input and output so it can be driven from
//! tests without a terminal.

use crate::data_loader::{TripSource, load_selection};
use crate::error::Result;
use crate::filters::{DaySelector, MonthSelector, TripFilter, TripQuery};
use crate::output::OutputFormatter;
use crate::statistics::StatsReport;
use crate::types::{City, TripTable};
use std::io::{BufRead, Write};
use tracing::{info, warn};

/// Rows shown per page of raw data
pub const PAGE_SIZE: usize = 5;

const DIVIDER_WIDTH: usize = 40;

/// Interactive session state
pub struct Shell<'a, R, W> {
    source: &'a dyn TripSource,
    formatter: Box<dyn OutputFormatter>,
    input: R,
    output: W,
}

impl<'a, R: BufRead, W: Write> Shell<'a, R, W> {
    /// Create a shell reading answers from `input` and writing to `output`
    pub fn new(
        source: &'a dyn TripSource,
        formatter: Box<dyn OutputFormatter>,
        input: R,
        output: W,
    ) -> Self {
        Self {
            source,
            formatter,
            input,
            output,
        }
    }

    /// Consume the shell, returning its output sink
    pub fn into_output(self) -> W {
        self.output
    }

    /// Run sessions until the user declines to restart or input ends
    ///
    /// # Errors
    ///
    /// Recoverable errors (empty selections, invalid filters) are reported to
    /// the user and the loop continues. Anything else, such as a malformed
    /// data file, is returned.
    pub async fn run(&mut self) -> Result<()> {
        loop {
            let Some(query) = self.prompt_query()? else {
                break;
            };

            if let Err(e) = self.run_query(&query).await {
                if !e.is_recoverable() {
                    return Err(e);
                }
                warn!("Recoverable error for {}: {}", query.describe(), e);
                writeln!(self.output, "\n{e}")?;
            }

            let restart = self.prompt_line("\nWould you like to restart? Enter yes or no.\n")?;
            if !restart.is_some_and(|answer| answer.eq_ignore_ascii_case("yes")) {
                break;
            }
        }
        Ok(())
    }

    /// Load, filter, page and summarize a single selection
    async fn run_query(&mut self, query: &TripQuery) -> Result<()> {
        let table = load_selection(self.source, query).await?;
        if self.page_raw_data(&table)?.is_none() {
            return Ok(());
        }

        let report = StatsReport::compute(query.describe(), &table)?;
        writeln!(self.output, "{}", self.formatter.format_report(&report))?;
        Ok(())
    }

    /// Ask for city, month and day; `None` when input ends
    pub fn prompt_query(&mut self) -> Result<Option<TripQuery>> {
        writeln!(self.output, "Hello! Let's explore some US bikeshare data!\n")?;

        let cities: Vec<String> = City::ALL.iter().map(|c| c.prompt_name().to_string()).collect();
        let Some(city) = self.prompt_choice(
            "Would you like data on 'chicago', 'new york city', or 'washington': ",
            &cities,
        )?
        else {
            return Ok(None);
        };
        let city: City = city.parse()?;
        writeln!(self.output, "\nGreat, let's look at data for {city}.\n")?;

        let Some(month) = self.prompt_choice(
            "Would you like data on 'all' months or a specific month like 'january', \
             'february', 'march', etc? (NOTE: data only available January - June): ",
            &MonthSelector::choices(),
        )?
        else {
            return Ok(None);
        };
        let month: MonthSelector = month.parse()?;
        writeln!(
            self.output,
            "\nGreat, let's look at data for {}.\n",
            month.describe()
        )?;

        let Some(day) = self.prompt_choice(
            "Would you like data on 'all' days of the week or a specific day like 'monday', \
             'tuesday', 'wednesday', etc?: ",
            &DaySelector::choices(),
        )?
        else {
            return Ok(None);
        };
        let day: DaySelector = day.parse()?;
        writeln!(
            self.output,
            "\nGreat, let's look at data for {}.\n",
            day.describe()
        )?;

        let query =
            TripQuery::new(city).with_filter(TripFilter::new().with_month(month).with_day(day));
        writeln!(self.output, "{}", "-".repeat(DIVIDER_WIDTH))?;
        writeln!(
            self.output,
            "\nWe will look at data for {}.\n",
            query.describe()
        )?;
        info!("Query selected: {}", query.describe());
        Ok(Some(query))
    }

    /// Offer raw rows five at a time
    ///
    /// Returns the number of rows shown, or `None` if input ended.
    pub fn page_raw_data(&mut self, table: &TripTable) -> Result<Option<usize>> {
        let mut offset = 0;
        while let Some(answer) =
            self.prompt_line("Would you like to view 5 lines of the raw data? ('y'/'n'): ")?
        {
            match answer.to_lowercase().as_str() {
                "y" => {
                    let page = table.page(offset, PAGE_SIZE);
                    if page.is_empty() {
                        writeln!(self.output, "No further data to view")?;
                        return Ok(Some(offset));
                    }
                    writeln!(self.output, "{}", self.formatter.format_raw_rows(page, offset))?;
                    offset += page.len();
                }
                "n" => return Ok(Some(offset)),
                _ => writeln!(
                    self.output,
                    "Input was not understood. Please use 'y' for yes or 'n' for no."
                )?,
            }
        }
        Ok(None)
    }

    /// Re-prompt until the answer is one of `choices`; `None` when input ends
    fn prompt_choice(&mut self, prompt: &str, choices: &[String]) -> Result<Option<String>> {
        while let Some(answer) = self.prompt_line(prompt)? {
            let answer = answer.to_lowercase();
            if choices.contains(&answer) {
                return Ok(Some(answer));
            }
            writeln!(
                self.output,
                "Input not recognized. Please choose from the following: {}",
                choices.join(", ")
            )?;
        }
        Ok(None)
    }

    /// Print `prompt` and read one trimmed line; `None` at end of input
    fn prompt_line(&mut self, prompt: &str) -> Result<Option<String>> {
        write!(self.output, "{prompt}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BikeshareError;
    use crate::output::TableFormatter;
    use crate::types::TripRecord;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use std::io::Cursor;

    struct MemorySource {
        table: TripTable,
    }

    #[async_trait]
    impl TripSource for MemorySource {
        async fn load(&self, city: City) -> Result<TripTable> {
            if city == self.table.city() {
                Ok(self.table.clone())
            } else {
                Err(BikeshareError::DataFileNotFound {
                    city: city.to_string(),
                    searched: Vec::new(),
                })
            }
        }
    }

    fn source(rows: usize) -> MemorySource {
        // January 2017, day 2 is a Monday
        let records = (0..rows)
            .map(|i| {
                let start = NaiveDate::from_ymd_opt(2017, 1, 2 + (i % 7) as u32)
                    .unwrap()
                    .and_hms_opt(9, 0, 0)
                    .unwrap();
                TripRecord::new(
                    start,
                    format!("Station {i}"),
                    "Depot",
                    120.0,
                    Some("Subscriber".into()),
                )
            })
            .collect();
        MemorySource {
            table: TripTable::new(City::Washington, false, records),
        }
    }

    async fn run_with(source: &MemorySource, input: &str) -> (Result<()>, String) {
        colored::control::set_override(false);
        let mut shell = Shell::new(
            source,
            Box::new(TableFormatter),
            Cursor::new(input.as_bytes().to_vec()),
            Vec::new(),
        );
        let result = shell.run().await;
        let output = String::from_utf8(shell.into_output()).unwrap();
        (result, output)
    }

    #[tokio::test]
    async fn test_full_session() {
        let source = source(3);
        let (result, output) = run_with(&source, "washington\nall\nall\nn\nno\n").await;

        assert!(result.is_ok());
        assert!(output.contains("We will look at data for Washington during all months"));
        assert!(output.contains("Statistics for Washington"));
        assert!(output.contains("not available"));
    }

    #[tokio::test]
    async fn test_invalid_input_reprompts() {
        let source = source(3);
        let (result, output) =
            run_with(&source, "boston\nWashington\njuly\njanuary\nfunday\nmonday\nn\nno\n").await;

        assert!(result.is_ok());
        assert_eq!(output.matches("Input not recognized").count(), 3);
        assert!(output.contains("chicago, new york city, washington"));
        assert!(output.contains("Washington during January on Mondays"));
    }

    #[tokio::test]
    async fn test_empty_selection_is_recoverable() {
        let source = source(3);
        let (result, output) = run_with(&source, "washington\nmarch\nall\nn\nno\n").await;

        assert!(result.is_ok());
        assert!(output.contains("No data for this selection"));
    }

    #[tokio::test]
    async fn test_restart_loops() {
        let source = source(3);
        let input = "washington\nall\nall\nn\nyes\nwashington\nall\nmonday\nn\nno\n";
        let (result, output) = run_with(&source, input).await;

        assert!(result.is_ok());
        assert_eq!(output.matches("Hello! Let's explore").count(), 2);
    }

    #[tokio::test]
    async fn test_missing_file_is_fatal() {
        let source = source(3);
        let (result, _) = run_with(&source, "chicago\nall\nall\n").await;
        assert!(matches!(result, Err(BikeshareError::DataFileNotFound { .. })));
    }

    #[tokio::test]
    async fn test_end_of_input_stops_quietly() {
        let source = source(3);
        let (result, output) = run_with(&source, "washing").await;
        assert!(result.is_ok());
        assert!(output.contains("Input not recognized"));
    }

    #[test]
    fn test_pager_pages_by_five() {
        colored::control::set_override(false);
        let source = source(7);
        let mut shell = Shell::new(
            &source,
            Box::new(TableFormatter),
            Cursor::new(b"y\nmaybe\ny\ny\n".to_vec()),
            Vec::new(),
        );

        let shown = shell.page_raw_data(&source.table).unwrap();
        assert_eq!(shown, Some(7));

        let output = String::from_utf8(shell.into_output()).unwrap();
        assert!(output.contains("Station 4"));
        assert!(output.contains("Station 6"));
        assert!(output.contains("Input was not understood"));
        assert!(output.contains("No further data to view"));
    }

    #[test]
    fn test_pager_stops_on_no() {
        let source = source(7);
        let mut shell = Shell::new(
            &source,
            Box::new(TableFormatter),
            Cursor::new(b"N\n".to_vec()),
            Vec::new(),
        );
        assert_eq!(shell.page_raw_data(&source.table).unwrap(), Some(0));
    }

    #[test]
    fn test_pager_end_of_input() {
        let source = source(7);
        let mut shell = Shell::new(
            &source,
            Box::new(TableFormatter),
            Cursor::new(b"maybe\n".to_vec()),
            Vec::new(),
        );
        assert_eq!(shell.page_raw_data(&source.table).unwrap(), None);
    }
}
