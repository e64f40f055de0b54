//! bikeshare - Explore US bikeshare trip data from the command line

use anyhow::Context;
use bikeshare::{
    cli::Cli,
    data_loader::{DataLoader, load_selection},
    filters::TripQuery,
    output::{OutputFormatter, get_formatter},
    shell::Shell,
    statistics::StatsReport,
};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Run a single query without prompting
async fn run_once(
    loader: &DataLoader,
    query: &TripQuery,
    formatter: &dyn OutputFormatter,
    raw_rows: Option<usize>,
) -> bikeshare::Result<()> {
    let table = load_selection(loader, query).await?;

    if let Some(count) = raw_rows {
        println!("{}", formatter.format_raw_rows(table.page(0, count), 0));
    }

    match StatsReport::compute(query.describe(), &table) {
        Ok(report) => println!("{}", formatter.format_report(&report)),
        Err(e) if e.is_recoverable() => eprintln!("{e}"),
        Err(e) => return Err(e),
    }
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging. --verbose overrides RUST_LOG.
    let filter = if cli.verbose {
        tracing_subscriber::EnvFilter::new("bikeshare=info,bikeshare_core=info")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            tracing_subscriber::EnvFilter::new("bikeshare=warn,bikeshare_core=warn")
        })
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let show_progress = !cli.json && is_terminal::is_terminal(std::io::stdout());
    let loader = DataLoader::new(cli.data_dir.clone()).with_progress(show_progress);
    let formatter = get_formatter(cli.json);

    match cli.query() {
        Some(query) => {
            info!("Running one-shot report for {}", query.describe());
            run_once(&loader, &query, formatter.as_ref(), cli.raw)
                .await
                .with_context(|| format!("failed to analyze {}", query.describe()))?;
        }
        None => {
            info!("Starting interactive session");
            let stdin = std::io::stdin();
            let mut shell = Shell::new(&loader, formatter, stdin.lock(), std::io::stdout());
            shell.run().await.context("interactive session failed")?;
        }
    }

    Ok(())
}
