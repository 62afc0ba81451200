//! Command-line parsing for the used-car listing pipeline.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the cleaning/aggregation code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::{DEFAULT_REFERENCE_YEAR, Locale};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "car-report", version, about = "Used-car listing cleaner and price reports")]
pub struct Cli {
    /// Log filter used when `RUST_LOG` is unset (error, warn, info, debug, trace).
    #[arg(long, global = true, env = "CAR_REPORT_LOG", default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Add a `brand` column derived from `leixing` (raw CSV -> intermediate CSV).
    Extract(ExtractArgs),
    /// Clean the intermediate CSV, print the reports, draw the charts and export the spreadsheet.
    Analyze(AnalyzeArgs),
    /// Run `extract` followed by `analyze`.
    Run(RunArgs),
    /// Print the report tables from a JSON file written with `--export-reports`.
    Show(ShowArgs),
}

/// Options for the brand extractor.
#[derive(Debug, Args, Clone)]
pub struct ExtractArgs {
    /// Raw listing CSV.
    #[arg(long, env = "CAR_REPORT_RAW", default_value = "guazi.csv")]
    pub input: PathBuf,

    /// Intermediate CSV with the added `brand` column.
    #[arg(long, env = "CAR_REPORT_BRANDED", default_value = "guolv.csv")]
    pub output: PathBuf,
}

/// Options for the cleaning/reporting stage.
#[derive(Debug, Args, Clone)]
pub struct AnalyzeArgs {
    /// Brand-augmented CSV (the extractor's output).
    #[arg(long, env = "CAR_REPORT_BRANDED", default_value = "guolv.csv")]
    pub input: PathBuf,

    /// Spreadsheet with cleaned and derived columns.
    #[arg(long, env = "CAR_REPORT_OUTPUT", default_value = "processed_cars.xlsx")]
    pub output: PathBuf,

    /// Directory for the three PNG charts.
    #[arg(long, env = "CAR_REPORT_CHART_DIR", default_value = ".")]
    pub chart_dir: PathBuf,

    /// Year that listing ages are measured against.
    #[arg(long, default_value_t = DEFAULT_REFERENCE_YEAR)]
    pub reference_year: i32,

    /// Chart width (pixels).
    #[arg(long, default_value_t = 2000)]
    pub width: u32,

    /// Chart height (pixels).
    #[arg(long, default_value_t = 1000)]
    pub height: u32,

    /// Language of chart titles and axis labels.
    #[arg(long, value_enum, default_value_t = Locale::Zh)]
    pub locale: Locale,

    /// TOML file overriding individual chart labels.
    #[arg(long, value_name = "TOML")]
    pub labels: Option<PathBuf>,

    /// Font file for chart text (must cover CJK glyphs for the default labels).
    #[arg(long, env = "CAR_REPORT_FONT", value_name = "FILE")]
    pub font: Option<PathBuf>,

    /// Rows shown in the terminal preview (0 disables the preview).
    #[arg(long, default_value_t = 5)]
    pub preview: usize,

    /// Export the three report tables to JSON.
    #[arg(long = "export-reports", value_name = "JSON")]
    pub export_reports: Option<PathBuf>,
}

/// Options for the full pipeline.
#[derive(Debug, Args, Clone)]
pub struct RunArgs {
    /// Raw listing CSV.
    #[arg(long, env = "CAR_REPORT_RAW", default_value = "guazi.csv")]
    pub raw: PathBuf,

    #[command(flatten)]
    pub analyze: AnalyzeArgs,
}

/// Options for printing saved reports.
#[derive(Debug, Args)]
pub struct ShowArgs {
    /// Report JSON file produced by `--export-reports`.
    #[arg(long, value_name = "JSON")]
    pub reports: PathBuf,
}
