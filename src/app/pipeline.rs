//! Shared pipeline logic used by every CLI subcommand.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! raw CSV -> brand extraction -> cleaning/derivation -> reports -> charts -> export
//!
//! The CLI layer then only decides what to print.

use std::fs;
use std::path::PathBuf;

use tracing::info;

use crate::app::session::Session;
use crate::clean::{NullCounts, clean_table};
use crate::domain::{RunConfig, Schema};
use crate::error::{AppError, EXIT_NO_DATA};
use crate::extract::{ExtractSummary, extract_brands};
use crate::io::export::{AugmentedTable, augmented_table, write_xlsx};
use crate::io::ingest::{listing_columns, read_table, validate_schema};
use crate::io::reports::{ReportFile, write_report_json};
use crate::plot::{ChartOutcome, Labels, render_report_charts};
use crate::report::{Reports, compute_reports};

const ANALYZE_STAGE: &str = "analyze";

/// All computed outputs of one `analyze` run.
#[derive(Debug, Clone)]
pub struct AnalysisOutput {
    pub input: PathBuf,
    pub output: PathBuf,
    pub reference_year: i32,
    pub rows: usize,
    /// Source headers of the brand-augmented table.
    pub headers: Vec<String>,
    pub nulls: NullCounts,
    pub reports: Reports,
    pub charts: Vec<ChartOutcome>,
    /// The exported table (source columns, cleaned values, derived columns).
    pub table: AugmentedTable,
    pub font: Option<PathBuf>,
}

/// Stage 1: derive `brand` for every raw listing.
pub fn run_extract(config: &RunConfig) -> Result<ExtractSummary, AppError> {
    let _session = Session::open("extract");
    extract_brands(&config.raw_path, &config.branded_path)
}

/// Stage 2: clean, aggregate, chart and export the brand-augmented table.
pub fn run_analysis(config: &RunConfig) -> Result<AnalysisOutput, AppError> {
    let session = Session::open_with_charts(ANALYZE_STAGE, config.font_path.clone())?;
    let stage = session.stage();
    let labels = Labels::load(config.locale, config.labels_path.as_deref())?;

    // 1) Load and validate against the declared schema.
    let input = &config.branded_path;
    let table = read_table(input, stage)?;
    validate_schema(&table, &Schema::branded_listings(), input, stage)?;
    if table.rows.is_empty() {
        return Err(AppError::new(
            EXIT_NO_DATA,
            format!("[{stage}] No listing rows in '{}'.", input.display()),
        ));
    }

    // 2) Clean the four numeric fields and derive the computed columns.
    let cols = listing_columns(&table)?;
    let cleaned = clean_table(&table, cols, config.reference_year);

    // 3) Aggregate and render. Charts only read columns derived above.
    let reports = compute_reports(&cleaned.records);
    fs::create_dir_all(&config.chart_dir).map_err(|e| {
        AppError::output(format!(
            "[{stage}] Failed to create chart directory '{}': {e}",
            config.chart_dir.display()
        ))
    })?;
    let charts = render_report_charts(
        &reports,
        &labels,
        &config.chart_dir,
        (config.chart_width, config.chart_height),
    );

    // 4) Export the full augmented table.
    let augmented = augmented_table(&table.headers, cols, &cleaned.records);
    write_xlsx(&config.output_path, &augmented)?;

    if let Some(path) = &config.export_reports {
        let file = ReportFile::new(&reports, input, config.reference_year, cleaned.records.len());
        write_report_json(path, &file)?;
        info!(path = %path.display(), "wrote report JSON");
    }

    Ok(AnalysisOutput {
        input: input.clone(),
        output: config.output_path.clone(),
        reference_year: config.reference_year,
        rows: cleaned.records.len(),
        headers: table.headers,
        nulls: cleaned.nulls,
        reports,
        charts,
        table: augmented,
        font: session.font().cloned(),
    })
}
