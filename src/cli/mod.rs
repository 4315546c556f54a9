//! Command-line parsing for the power consumption service.
//!
//! Argument parsing and command dispatch stay separate from the data and
//! model code. Every option can also be set through the environment (or a
//! `.env` file).

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use crate::data::sample::SampleConfig;
use crate::domain::{
    DEFAULT_DATASET_PATH, DEFAULT_DATE_COLUMN, DEFAULT_DATE_FORMAT, DEFAULT_TARGET_COLUMN,
    DatasetConfig, ServerConfig,
};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "pwr", version, about = "Household power consumption time-series service")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Serve the JSON API (the default when no subcommand is given).
    Serve(ServeArgs),
    /// Load the dataset once and print its structure and statistics.
    Summary(DatasetArgs),
    /// Write a synthetic dataset in the expected CSV schema.
    Sample(SampleArgs),
}

/// Where the dataset lives and how to read it.
#[derive(Debug, Args, Clone)]
pub struct DatasetArgs {
    /// CSV file to serve.
    #[arg(long, env = "PWR_DATASET", default_value = DEFAULT_DATASET_PATH)]
    pub dataset: PathBuf,

    /// Field delimiter (a single ASCII character).
    #[arg(long, env = "PWR_DELIMITER", default_value_t = ',')]
    pub delimiter: char,

    /// Name of the date column.
    #[arg(long, env = "PWR_DATE_COLUMN", default_value = DEFAULT_DATE_COLUMN)]
    pub date_column: String,

    /// strftime-style format of the date column.
    #[arg(long, env = "PWR_DATE_FORMAT", default_value = DEFAULT_DATE_FORMAT)]
    pub date_format: String,

    /// Numeric column analysed by the plot and forecast endpoints.
    #[arg(long, env = "PWR_TARGET_COLUMN", default_value = DEFAULT_TARGET_COLUMN)]
    pub target_column: String,

    /// Additional column the file must contain (repeatable).
    #[arg(long = "expect-column", value_name = "NAME")]
    pub expect_columns: Vec<String>,
}

impl DatasetArgs {
    pub fn to_config(&self) -> DatasetConfig {
        // Non-ASCII delimiters map to NUL, which `validate` rejects.
        let delimiter = if self.delimiter.is_ascii() { self.delimiter as u8 } else { 0 };
        DatasetConfig {
            path: self.dataset.clone(),
            delimiter,
            date_column: self.date_column.clone(),
            date_format: self.date_format.clone(),
            target_column: self.target_column.clone(),
            extra_columns: self.expect_columns.clone(),
        }
    }
}

/// Options for `pwr serve`.
#[derive(Debug, Args, Clone)]
pub struct ServeArgs {
    /// Interface to bind.
    #[arg(long, env = "HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port to bind.
    #[arg(short = 'p', long, env = "PORT", default_value_t = 8000)]
    pub port: u16,

    #[command(flatten)]
    pub dataset: DatasetArgs,
}

impl ServeArgs {
    pub fn server_config(&self) -> ServerConfig {
        ServerConfig {
            host: self.host.clone(),
            port: self.port,
        }
    }
}

/// Options for `pwr sample`.
#[derive(Debug, Args, Clone)]
pub struct SampleArgs {
    /// Output CSV path.
    #[arg(short = 'o', long, default_value = DEFAULT_DATASET_PATH)]
    pub output: PathBuf,

    /// First day of the sample (YYYY-MM-DD).
    #[arg(long, default_value = "2006-12-16")]
    pub start: NaiveDate,

    /// Number of days to generate.
    #[arg(long, default_value_t = 30)]
    pub days: usize,

    /// Minutes between readings.
    #[arg(long, default_value_t = 1)]
    pub step_minutes: u32,

    /// Random seed.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Share of readings written as missing (`?`).
    #[arg(long, default_value_t = 0.01)]
    pub missing_prob: f64,
}

impl SampleArgs {
    pub fn to_config(&self) -> SampleConfig {
        SampleConfig {
            start: self.start,
            days: self.days,
            step_minutes: self.step_minutes,
            seed: self.seed,
            missing_prob: self.missing_prob,
            ..SampleConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serve_defaults() {
        let cli = Cli::try_parse_from(["pwr", "serve"]).unwrap();
        let Command::Serve(args) = cli.command else {
            panic!("expected serve");
        };
        let cfg = args.dataset.to_config();
        assert_eq!(cfg.delimiter, b',');
        assert_eq!(cfg.target_column, DEFAULT_TARGET_COLUMN);
        assert!(cfg.extra_columns.is_empty());
    }

    #[test]
    fn expect_column_is_repeatable() {
        let cli = Cli::try_parse_from([
            "pwr",
            "summary",
            "--dataset",
            "x.csv",
            "--expect-column",
            "Time",
            "--expect-column",
            "Voltage",
        ])
        .unwrap();
        let Command::Summary(args) = cli.command else {
            panic!("expected summary");
        };
        assert_eq!(args.to_config().extra_columns, vec!["Time", "Voltage"]);
        assert_eq!(args.dataset, PathBuf::from("x.csv"));
    }

    #[test]
    fn sample_parses_start_date() {
        let cli = Cli::try_parse_from(["pwr", "sample", "--start", "2010-01-02", "--days", "3"]).unwrap();
        let Command::Sample(args) = cli.command else {
            panic!("expected sample");
        };
        let cfg = args.to_config();
        assert_eq!(cfg.start, NaiveDate::from_ymd_opt(2010, 1, 2).unwrap());
        assert_eq!(cfg.days, 3);
    }

    #[test]
    fn non_ascii_delimiter_fails_validation() {
        let cli = Cli::try_parse_from(["pwr", "summary", "--delimiter", "é"]).unwrap();
        let Command::Summary(args) = cli.command else {
            panic!("expected summary");
        };
        assert!(args.to_config().validate().is_err());
    }
}
