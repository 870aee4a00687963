//! CLI entry point for the bike-share statistics tool.
//!
//! Provides subcommands for a one-shot statistics report, paging through a
//! city's raw trip log, and an interactive explore loop.

use std::ffi::OsStr;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use bikeshare_stats::{
    calendar::{City, Month},
    config::DataConfig,
    filter::{FilterSpec, filter},
    output::{print_pretty, render_page, render_report, to_json},
    pager::{next_offset, page},
    stats::summarize,
    store::{Dataset, load},
};
use chrono::Weekday;
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "bikeshare_stats")]
#[command(about = "Descriptive statistics over US bike-share trip data", long_about = None)]
struct Cli {
    /// Directory holding the city CSV files (overrides config and BIKESHARE_DATA_DIR)
    #[arg(short, long, global = true)]
    data_dir: Option<PathBuf>,

    /// JSON config file mapping cities to data files
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print statistics for a city, optionally filtered by month and day
    Stats {
        /// chicago, new york city or washington
        #[arg(value_name = "CITY", value_parser = parse_city)]
        city: City,

        /// Month to restrict to (January..June)
        #[arg(short, long)]
        month: Option<Month>,

        /// Day of week to restrict to (e.g. Monday)
        #[arg(short = 'D', long, value_parser = bikeshare_stats::calendar::parse_weekday)]
        day: Option<Weekday>,

        /// Print JSON instead of the text report
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Print one page of raw, unfiltered trip records
    Raw {
        #[arg(value_name = "CITY", value_parser = parse_city)]
        city: City,

        /// Index of the first record to show
        #[arg(short, long, default_value_t = 0)]
        offset: usize,
    },
    /// Interactively choose filters, view statistics and browse raw data
    Explore,
}

fn parse_city(s: &str) -> Result<City, String> {
    s.parse::<City>().map_err(|e| e.to_string())
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/bikeshare_stats.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("bikeshare_stats.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();
    let config = data_config(cli.config.as_deref(), cli.data_dir)?;

    match cli.command {
        Commands::Stats {
            city,
            month,
            day,
            json,
        } => {
            let dataset = load(city, &config)?;
            let spec = FilterSpec::new(month, day);
            let result = summarize(&filter(&dataset, &spec));
            print_pretty(&result);

            if json {
                println!("{}", to_json(&result)?);
            } else {
                print!("{}", render_report(&result, &spec));
            }
        }
        Commands::Raw { city, offset } => {
            let dataset = load(city, &config)?;
            let rows = page(&dataset, offset);
            if rows.is_empty() {
                info!(offset, total = dataset.len(), "No records at this offset");
            }
            print!("{}", render_page(rows, offset));
        }
        Commands::Explore => {
            let stdin = io::stdin();
            explore(&config, &mut stdin.lock())?;
        }
    }

    Ok(())
}

/// Resolves the data location: config file first, then env, then `--data-dir`.
fn data_config(config_path: Option<&Path>, data_dir: Option<PathBuf>) -> Result<DataConfig> {
    let mut config = match config_path {
        Some(path) => DataConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => DataConfig::from_env(),
    };
    if let Some(dir) = data_dir {
        config.data_dir = dir;
    }
    Ok(config)
}

/// Prompts until `accept` returns a value. `None` means input was closed.
fn prompt<T>(
    input: &mut impl BufRead,
    question: &str,
    accept: impl Fn(&str) -> Result<T, String>,
) -> Result<Option<T>> {
    loop {
        print!("{question}\n> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        match accept(line.trim()) {
            Ok(value) => return Ok(Some(value)),
            Err(e) => println!("\nThat's not a valid entry: {e}\n"),
        }
    }
}

fn yes_no(answer: &str) -> Result<bool, String> {
    match answer.to_lowercase().as_str() {
        "yes" | "y" => Ok(true),
        "no" | "n" => Ok(false),
        other => Err(format!("expected yes or no, got '{other}'")),
    }
}

/// The interactive session: choose filters, print statistics, page raw data,
/// and optionally start over. Each pass reloads the city's data.
fn explore(config: &DataConfig, input: &mut impl BufRead) -> Result<()> {
    println!("Hello! Let's explore some US bikeshare data!\n");

    loop {
        let Some(city) = prompt(
            input,
            "Which city do you want to explore: Chicago, New York City, or Washington?",
            parse_city,
        )?
        else {
            return Ok(());
        };
        let Some(month) = prompt(
            input,
            "Which month (January..June)? Leave blank for all months.",
            |s| FilterSpec::parse(s, "").map(|spec| spec.month),
        )?
        else {
            return Ok(());
        };
        let Some(day) = prompt(
            input,
            "Which day of the week? Leave blank for all days.",
            |s| FilterSpec::parse("", s).map(|spec| spec.day),
        )?
        else {
            return Ok(());
        };

        let spec = FilterSpec::new(month, day);
        match load(city, config) {
            Ok(dataset) => {
                print!("{}", render_report(&summarize(&filter(&dataset, &spec)), &spec));
                if !browse_raw(&dataset, input)? {
                    return Ok(());
                }
            }
            Err(e) => {
                warn!(error = %e, city = %city, "Failed to load trip data");
                println!("\nCould not load data for {city}: {e}\n");
            }
        }

        match prompt(input, "Would you like to restart? Enter yes or no.", yes_no)? {
            Some(true) => continue,
            _ => return Ok(()),
        }
    }
}

/// Shows the unfiltered data five rows at a time while the user keeps saying yes.
/// Returns `false` if input was closed.
fn browse_raw(dataset: &Dataset, input: &mut impl BufRead) -> Result<bool> {
    let mut offset = 0;
    let mut question = "Do you want to see the first 5 rows of raw data? Enter yes or no.";

    loop {
        match prompt(input, question, yes_no)? {
            None => return Ok(false),
            Some(false) => return Ok(true),
            Some(true) => {}
        }

        let rows = page(dataset, offset);
        if rows.is_empty() {
            println!("No more rows.");
            return Ok(true);
        }
        print!("{}", render_page(rows, offset));
        offset = next_offset(offset);
        question = "Do you want to see 5 more rows? Enter yes or no.";
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bikeshare_stats::store::TripRecord;
    use chrono::NaiveDate;
    use std::io::Cursor;

    fn dataset(n: usize) -> Dataset {
        let t = NaiveDate::from_ymd_opt(2017, 3, 14)
            .unwrap()
            .and_hms_opt(7, 30, 0)
            .unwrap();
        let records = (0..n)
            .map(|_| TripRecord::new(t, t, 300.0, "Canal St", "Clark St", "Subscriber"))
            .collect();
        Dataset::new(City::Chicago, records, false, false)
    }

    #[test]
    fn test_browse_raw_stops_on_no() {
        let mut input = Cursor::new("no\n");
        assert!(browse_raw(&dataset(3), &mut input).unwrap());
    }

    #[test]
    fn test_browse_raw_reprompts_on_invalid_answer() {
        let mut input = Cursor::new("maybe\nno\nyes\n");
        assert!(browse_raw(&dataset(3), &mut input).unwrap());
        // The trailing "yes" is never consumed.
        let mut rest = String::new();
        input.read_line(&mut rest).unwrap();
        assert_eq!(rest, "yes\n");
    }

    #[test]
    fn test_browse_raw_stops_on_empty_page() {
        let mut input = Cursor::new("yes\nyes\nyes\n");
        assert!(browse_raw(&dataset(3), &mut input).unwrap());
        // First page holds all 3 rows, the second is empty and ends browsing.
        let mut rest = String::new();
        input.read_line(&mut rest).unwrap();
        assert_eq!(rest, "yes\n");
    }

    #[test]
    fn test_browse_raw_input_closed_mid_prompt() {
        let mut input = Cursor::new("yes\n");
        assert!(!browse_raw(&dataset(7), &mut input).unwrap());
    }

    #[test]
    fn test_explore_returns_on_closed_input() {
        let config = DataConfig::new("/nonexistent");
        let mut input = Cursor::new("");
        assert!(explore(&config, &mut input).is_ok());
    }

    #[test]
    fn test_explore_survives_missing_data_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = DataConfig::new(dir.path());
        let mut input = Cursor::new("chicago\n\n\nno\n");
        assert!(explore(&config, &mut input).is_ok());
    }

    #[test]
    fn test_yes_no() {
        assert_eq!(yes_no("Y"), Ok(true));
        assert_eq!(yes_no("no"), Ok(false));
        assert!(yes_no("later").is_err());
    }
}
