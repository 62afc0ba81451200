//! Shared domain types.
//!
//! This module defines:
//!
//! - the explicit listing schema (`Schema`, `ColumnSpec`, `ColumnKind`)
//! - the in-memory table read from CSV (`Table`)
//! - cleaned and derived listing rows (`CarRecord`)
//! - the resolved run configuration (`RunConfig`)

use std::path::PathBuf;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Year that `usage_years` is measured against unless overridden.
pub const DEFAULT_REFERENCE_YEAR: i32 = 2024;

pub const COL_TYPE: &str = "leixing";
pub const COL_YEAR: &str = "nianfen";
pub const COL_SALE_PRICE: &str = "shoujia";
pub const COL_ORIGINAL_PRICE: &str = "yuanjia";
pub const COL_MILEAGE: &str = "licheng";
pub const COL_BRAND: &str = "brand";

pub const COL_USAGE_YEARS: &str = "usage_years";
pub const COL_PRICE_DROP: &str = "price_drop";
pub const COL_ANNUAL_PRICE_DROP: &str = "annual_price_drop";
pub const COL_DROP_PER_10K_KM: &str = "drop_per_10k_km";

/// Derived columns, in the order they are appended to exports.
pub const DERIVED_COLUMNS: [&str; 4] = [
    COL_USAGE_YEARS,
    COL_PRICE_DROP,
    COL_ANNUAL_PRICE_DROP,
    COL_DROP_PER_10K_KM,
];

/// Semantic type of a listing column.
///
/// The text-encoded numeric kinds carry the literal unit suffix that has to be
/// removed before parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    /// Free text, kept verbatim.
    Text,
    /// Brand label derived from `leixing`.
    Brand,
    /// Integer year with a `年` suffix.
    Year,
    /// Amount in units of 10k yuan with a `万` suffix.
    WanYuan,
    /// Distance in units of 10k km with a `万公里` suffix.
    WanKm,
    /// Integer computed by the pipeline.
    DerivedInt,
    /// Float computed by the pipeline.
    DerivedFloat,
}

impl ColumnKind {
    /// Literal suffix stripped before parsing, if any.
    pub fn unit_suffix(self) -> Option<&'static str> {
        match self {
            ColumnKind::Year => Some("年"),
            ColumnKind::WanYuan => Some("万"),
            ColumnKind::WanKm => Some("万公里"),
            _ => None,
        }
    }

    /// Type name shown in the printed schema.
    pub fn type_name(self) -> &'static str {
        match self {
            ColumnKind::Text | ColumnKind::Brand => "string",
            ColumnKind::Year | ColumnKind::DerivedInt => "integer",
            ColumnKind::WanYuan | ColumnKind::WanKm | ColumnKind::DerivedFloat => "double",
        }
    }
}

/// One declared column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    pub name: &'static str,
    pub kind: ColumnKind,
}

/// Explicit column declarations checked when a table is loaded.
///
/// Columns of the input that are not declared are carried through as text.
#[derive(Debug, Clone)]
pub struct Schema {
    pub columns: Vec<ColumnSpec>,
}

impl Schema {
    /// Columns the brand extractor needs.
    pub fn raw_listings() -> Self {
        Self {
            columns: vec![ColumnSpec {
                name: COL_TYPE,
                kind: ColumnKind::Text,
            }],
        }
    }

    /// Columns the aggregation stage needs from the brand-augmented table.
    pub fn branded_listings() -> Self {
        Self {
            columns: vec![
                ColumnSpec {
                    name: COL_YEAR,
                    kind: ColumnKind::Year,
                },
                ColumnSpec {
                    name: COL_SALE_PRICE,
                    kind: ColumnKind::WanYuan,
                },
                ColumnSpec {
                    name: COL_ORIGINAL_PRICE,
                    kind: ColumnKind::WanYuan,
                },
                ColumnSpec {
                    name: COL_MILEAGE,
                    kind: ColumnKind::WanKm,
                },
                ColumnSpec {
                    name: COL_BRAND,
                    kind: ColumnKind::Brand,
                },
            ],
        }
    }

    pub fn kind_of(&self, name: &str) -> Option<ColumnKind> {
        self.columns
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name.trim()))
            .map(|c| c.kind)
    }
}

/// A CSV table held in memory: header names plus raw string cells.
///
/// Rows are padded to the header width on load, so `rows[i][j]` is always
/// valid for `j < headers.len()`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Position of a column, matched case-insensitively.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(name))
    }
}

/// Column positions of the declared fields inside a loaded `Table`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListingColumns {
    pub year: usize,
    pub sale_price: usize,
    pub original_price: usize,
    pub mileage: usize,
    pub brand: usize,
}

/// A listing after cleaning and derivation.
///
/// `fields` keeps every raw cell of the source row so pass-through columns
/// survive to the export untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct CarRecord {
    pub fields: Vec<String>,
    pub brand: String,

    /// Manufacture year (`nianfen`).
    pub year: Option<i32>,
    /// Sale price in 10k yuan (`shoujia`).
    pub sale_price: Option<f64>,
    /// Original price in 10k yuan (`yuanjia`).
    pub original_price: Option<f64>,
    /// Mileage in 10k km (`licheng`).
    pub mileage: Option<f64>,

    pub usage_years: Option<i32>,
    pub price_drop: Option<f64>,
    pub annual_price_drop: Option<f64>,
    pub drop_per_10k_km: Option<f64>,
}

/// Locale used for chart titles and axis labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    Zh,
    En,
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Raw listing CSV read by the extractor.
    pub raw_path: PathBuf,
    /// Brand-augmented CSV written by the extractor and read by `analyze`.
    pub branded_path: PathBuf,
    /// Final spreadsheet.
    pub output_path: PathBuf,
    /// Directory the three chart images are written into.
    pub chart_dir: PathBuf,

    pub reference_year: i32,

    pub chart_width: u32,
    pub chart_height: u32,
    pub locale: Locale,
    /// Optional TOML file overriding individual chart labels.
    pub labels_path: Option<PathBuf>,
    /// Font used for chart text. When unset, common system CJK fonts are probed.
    pub font_path: Option<PathBuf>,

    /// Rows shown in the terminal preview (0 disables it).
    pub preview_rows: usize,
    /// Optional JSON dump of the three aggregate tables.
    pub export_reports: Option<PathBuf>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            raw_path: PathBuf::from("guazi.csv"),
            branded_path: PathBuf::from("guolv.csv"),
            output_path: PathBuf::from("processed_cars.xlsx"),
            chart_dir: PathBuf::from("."),
            reference_year: DEFAULT_REFERENCE_YEAR,
            chart_width: 2000,
            chart_height: 1000,
            locale: Locale::Zh,
            labels_path: None,
            font_path: None,
            preview_rows: 5,
            export_reports: None,
        }
    }
}
