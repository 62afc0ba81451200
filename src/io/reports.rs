//! Read/write report JSON files.
//!
//! Report JSON is the portable form of one analysis run:
//! - the three aggregate tables (brand price, age curve, resale rate)
//! - run metadata (input file, reference year, generation time, row count)
//!
//! The schema is defined by `ReportFile`.

use std::fs::File;
use std::path::Path;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::report::{BrandAvgPrice, BrandResaleRate, Reports, UsageAvgPrice};

/// A saved report file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportFile {
    pub tool: String,
    pub generated_at: DateTime<Local>,
    pub input: String,
    pub reference_year: i32,
    pub rows: usize,
    pub brand_avg_price: Vec<BrandAvgPrice>,
    pub usage_avg_price: Vec<UsageAvgPrice>,
    pub annual_resale_rate: Vec<BrandResaleRate>,
}

impl ReportFile {
    pub fn new(reports: &Reports, input: &Path, reference_year: i32, rows: usize) -> Self {
        Self {
            tool: env!("CARGO_PKG_NAME").to_string(),
            generated_at: Local::now(),
            input: input.display().to_string(),
            reference_year,
            rows,
            brand_avg_price: reports.brand_avg_price.clone(),
            usage_avg_price: reports.usage_avg_price.clone(),
            annual_resale_rate: reports.annual_resale_rate.clone(),
        }
    }

    /// The saved aggregate tables.
    pub fn reports(&self) -> Reports {
        Reports {
            brand_avg_price: self.brand_avg_price.clone(),
            usage_avg_price: self.usage_avg_price.clone(),
            annual_resale_rate: self.annual_resale_rate.clone(),
        }
    }
}

/// Write a report JSON file.
pub fn write_report_json(path: &Path, report: &ReportFile) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::output(format!("Failed to create report JSON '{}': {e}", path.display())))?;

    serde_json::to_writer_pretty(file, report)
        .map_err(|e| AppError::output(format!("Failed to write report JSON: {e}")))?;

    Ok(())
}

/// Read a report JSON file.
pub fn read_report_json(path: &Path) -> Result<ReportFile, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::input(format!("Failed to open report JSON '{}': {e}", path.display())))?;
    let report: ReportFile =
        serde_json::from_reader(file).map_err(|e| AppError::input(format!("Invalid report JSON: {e}")))?;
    Ok(report)
}
