//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - sets up logging
//! - runs the extraction and analysis stages
//! - prints schema, preview, reports and the run summary

use std::path::PathBuf;

use clap::Parser;

use crate::cli::{AnalyzeArgs, Cli, Command, ExtractArgs, RunArgs, ShowArgs};
use crate::domain::{RunConfig, Schema};
use crate::error::AppError;

pub mod pipeline;
pub mod session;

/// Entry point for the `car-report` binary.
pub fn run() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    match cli.command {
        Command::Extract(args) => handle_extract(args),
        Command::Analyze(args) => handle_analyze(args),
        Command::Run(args) => handle_run(args),
        Command::Show(args) => handle_show(args),
    }
}

/// Logs go to stderr so stdout carries only the report output.
fn init_logging(level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn handle_extract(args: ExtractArgs) -> Result<(), AppError> {
    let config = RunConfig {
        raw_path: args.input,
        branded_path: args.output,
        ..RunConfig::default()
    };
    extract_and_report(&config)
}

fn handle_analyze(args: AnalyzeArgs) -> Result<(), AppError> {
    let config = config_from_args(&args, None);
    analyze_and_report(&config)
}

fn handle_run(args: RunArgs) -> Result<(), AppError> {
    let config = config_from_args(&args.analyze, Some(args.raw.clone()));
    extract_and_report(&config)?;
    analyze_and_report(&config)
}

fn handle_show(args: ShowArgs) -> Result<(), AppError> {
    let file = crate::io::reports::read_report_json(&args.reports)?;
    println!(
        "Reports for {} ({} rows, reference year {}, generated {})\n",
        file.input,
        file.rows,
        file.reference_year,
        file.generated_at.format("%Y-%m-%d %H:%M:%S")
    );
    println!("{}", crate::report::format_reports(&file.reports()));
    Ok(())
}

fn extract_and_report(config: &RunConfig) -> Result<(), AppError> {
    let summary = pipeline::run_extract(config)?;
    println!(
        "Extracted brands for {} rows -> {}",
        summary.rows,
        config.branded_path.display()
    );
    Ok(())
}

fn analyze_and_report(config: &RunConfig) -> Result<(), AppError> {
    let run = pipeline::run_analysis(config)?;

    println!(
        "{}",
        crate::report::format_schema(&run.headers, &Schema::branded_listings())
    );
    if config.preview_rows > 0 {
        println!("{}", crate::report::format_preview(&run.table, config.preview_rows));
    }
    println!("{}", crate::report::format_reports(&run.reports));
    println!("{}", crate::report::format_run_summary(&run));
    Ok(())
}

/// Resolve `analyze` flags into a run configuration.
///
/// `raw` is only known to the `run` subcommand; other callers keep the default.
pub fn config_from_args(args: &AnalyzeArgs, raw: Option<PathBuf>) -> RunConfig {
    let defaults = RunConfig::default();
    RunConfig {
        raw_path: raw.unwrap_or(defaults.raw_path),
        branded_path: args.input.clone(),
        output_path: args.output.clone(),
        chart_dir: args.chart_dir.clone(),
        reference_year: args.reference_year,
        chart_width: args.width,
        chart_height: args.height,
        locale: args.locale,
        labels_path: args.labels.clone(),
        font_path: args.font.clone(),
        preview_rows: args.preview,
        export_reports: args.export_reports.clone(),
    }
}
