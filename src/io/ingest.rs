//! CSV ingest and schema validation.
//!
//! This module is responsible for turning a listing CSV into an in-memory
//! `Table` and checking it against the declared `Schema`.
//!
//! Design goals:
//! - **Strict schema** for required columns (clear errors + exit code 2)
//! - **Verbatim cells**: values are not trimmed or retyped here, so the
//!   extractor can write them back unchanged
//! - **Separation of concerns**: no cleaning logic here

use std::fs::File;
use std::path::Path;

use csv::StringRecord;
use tracing::debug;

use crate::domain::{
    COL_BRAND, COL_MILEAGE, COL_ORIGINAL_PRICE, COL_SALE_PRICE, COL_YEAR, ListingColumns, Schema, Table,
};
use crate::error::AppError;

/// Read a whole CSV file (header row required) into memory.
///
/// `stage` names the pipeline stage in error messages.
pub fn read_table(path: &Path, stage: &str) -> Result<Table, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::input(format!("[{stage}] Failed to open CSV '{}': {e}", path.display())))?;

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(file);

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| AppError::input(format!("[{stage}] Failed to read CSV headers of '{}': {e}", path.display())))?
        .iter()
        .map(normalize_header_name)
        .collect();

    let mut rows = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        // +2: records() starts after the header line and lines are 1-based.
        let line = idx + 2;
        let record = result.map_err(|e| {
            AppError::input(format!(
                "[{stage}] CSV parse error in '{}' at line {line}: {e}",
                path.display()
            ))
        })?;
        rows.push(record_to_row(&record, headers.len()));
    }

    debug!(path = %path.display(), rows = rows.len(), columns = headers.len(), "loaded CSV");

    Ok(Table { headers, rows })
}

/// Check that every declared column exists in the table.
pub fn validate_schema(table: &Table, schema: &Schema, path: &Path, stage: &str) -> Result<(), AppError> {
    let missing: Vec<&str> = schema
        .columns
        .iter()
        .filter(|c| table.column_index(c.name).is_none())
        .map(|c| c.name)
        .collect();

    if missing.is_empty() {
        return Ok(());
    }

    let list = missing
        .iter()
        .map(|name| format!("`{name}`"))
        .collect::<Vec<_>>()
        .join(", ");
    Err(AppError::input(format!(
        "[{stage}] Missing required column(s) in '{}': {list}",
        path.display()
    )))
}

/// Resolve the positions of the cleaned fields in a validated table.
pub fn listing_columns(table: &Table) -> Result<ListingColumns, AppError> {
    let find = |name: &str| {
        table
            .column_index(name)
            .ok_or_else(|| AppError::input(format!("Missing required column: `{name}`")))
    };

    Ok(ListingColumns {
        year: find(COL_YEAR)?,
        sale_price: find(COL_SALE_PRICE)?,
        original_price: find(COL_ORIGINAL_PRICE)?,
        mileage: find(COL_MILEAGE)?,
        brand: find(COL_BRAND)?,
    })
}

/// Write a table back to CSV (UTF-8, header row first).
pub fn write_table_csv(path: &Path, table: &Table, stage: &str) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::output(format!("[{stage}] Failed to create CSV '{}': {e}", path.display())))?;

    let mut writer = csv::WriterBuilder::new().flexible(true).from_writer(file);

    let write_err = |e: csv::Error| AppError::output(format!("[{stage}] Failed to write CSV '{}': {e}", path.display()));

    writer.write_record(&table.headers).map_err(write_err)?;
    for row in &table.rows {
        writer.write_record(row).map_err(write_err)?;
    }
    writer
        .flush()
        .map_err(|e| AppError::output(format!("[{stage}] Failed to flush CSV '{}': {e}", path.display())))?;

    Ok(())
}

fn normalize_header_name(name: &str) -> String {
    // Excel and other tools sometimes emit UTF-8 CSVs with a BOM prefix on the
    // first header. If we don't strip it, schema validation will incorrectly
    // report missing columns.
    name.trim().trim_start_matches('\u{feff}').to_string()
}

fn record_to_row(record: &StringRecord, width: usize) -> Vec<String> {
    let mut row: Vec<String> = record.iter().map(str::to_string).collect();
    if row.len() < width {
        row.resize(width, String::new());
    }
    row
}
