//! Brand extraction stage.
//!
//! Reads the raw listing CSV, derives `brand` from `leixing` for every row and
//! writes the full table to the intermediate CSV. An existing `brand` column is
//! overwritten in place, otherwise a new trailing column is appended.

pub mod brand;

pub use brand::extract_brand;

use std::path::Path;

use tracing::{info, warn};

use crate::domain::{COL_BRAND, COL_TYPE, Schema, Table};
use crate::error::AppError;
use crate::io::ingest::{read_table, validate_schema, write_table_csv};

const STAGE: &str = "extract";

/// Outcome of one extractor run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractSummary {
    pub rows: usize,
    /// Rows whose `leixing` yielded no brand.
    pub empty_brands: usize,
    /// True when the input already carried a `brand` column.
    pub replaced_existing: bool,
}

/// Run the extractor from `input` to `output`.
pub fn extract_brands(input: &Path, output: &Path) -> Result<ExtractSummary, AppError> {
    let mut table = read_table(input, STAGE)?;
    validate_schema(&table, &Schema::raw_listings(), input, STAGE)?;

    let summary = add_brand_column(&mut table)?;
    if summary.empty_brands > 0 {
        warn!(
            rows = summary.empty_brands,
            "no brand could be extracted for some listings"
        );
    }

    write_table_csv(output, &table, STAGE)?;
    info!(
        input = %input.display(),
        output = %output.display(),
        rows = summary.rows,
        "brand extraction complete"
    );

    Ok(summary)
}

/// Fill the `brand` column of `table` from its `leixing` column.
pub fn add_brand_column(table: &mut Table) -> Result<ExtractSummary, AppError> {
    let type_idx = table
        .column_index(COL_TYPE)
        .ok_or_else(|| AppError::input(format!("[{STAGE}] Missing required column: `{COL_TYPE}`")))?;

    let existing = table.column_index(COL_BRAND);
    let brand_idx = match existing {
        Some(idx) => idx,
        None => {
            table.headers.push(COL_BRAND.to_string());
            table.headers.len() - 1
        }
    };

    let mut empty_brands = 0;
    for row in &mut table.rows {
        let brand = extract_brand(row.get(type_idx).map(String::as_str).unwrap_or(""));
        if brand.is_empty() {
            empty_brands += 1;
        }
        if row.len() <= brand_idx {
            row.resize(brand_idx + 1, String::new());
        }
        row[brand_idx] = brand;
    }

    Ok(ExtractSummary {
        rows: table.rows.len(),
        empty_brands,
        replaced_existing: existing.is_some(),
    })
}
