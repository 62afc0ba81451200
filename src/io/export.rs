//! Export the augmented listing table to a spreadsheet.
//!
//! Layout: every source column in its original position (the four cleaned
//! columns carry their numeric values), followed by the derived columns.
//! Null values are written as empty cells. There is no index column.

use std::path::Path;

use rust_xlsxwriter::{Format, Workbook, XlsxError};
use tracing::info;

use crate::domain::{CarRecord, DERIVED_COLUMNS, ListingColumns};
use crate::error::AppError;

/// Worksheet name used in the exported workbook.
pub const SHEET_NAME: &str = "processed_cars";

const STAGE: &str = "export";

/// One typed output cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Int(i32),
    Float(f64),
    Null,
}

impl Cell {
    fn from_int(v: Option<i32>) -> Self {
        v.map_or(Cell::Null, Cell::Int)
    }

    fn from_float(v: Option<f64>) -> Self {
        v.map_or(Cell::Null, Cell::Float)
    }

    /// Plain-text rendering used by the terminal preview.
    pub fn display(&self) -> String {
        match self {
            Cell::Text(s) => s.clone(),
            Cell::Int(v) => v.to_string(),
            Cell::Float(v) => format!("{v:.4}").trim_end_matches('0').trim_end_matches('.').to_string(),
            Cell::Null => "null".to_string(),
        }
    }
}

/// The augmented table as headers plus typed rows.
#[derive(Debug, Clone)]
pub struct AugmentedTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

/// Build the output layout for `records` read from a table with `headers`.
pub fn augmented_table(headers: &[String], cols: ListingColumns, records: &[CarRecord]) -> AugmentedTable {
    let mut out_headers = headers.to_vec();
    out_headers.extend(DERIVED_COLUMNS.iter().map(|c| c.to_string()));

    let rows = records
        .iter()
        .map(|r| augmented_row(headers.len(), cols, r))
        .collect();

    AugmentedTable {
        headers: out_headers,
        rows,
    }
}

fn augmented_row(width: usize, cols: ListingColumns, r: &CarRecord) -> Vec<Cell> {
    let mut row = Vec::with_capacity(width + DERIVED_COLUMNS.len());
    for idx in 0..width {
        let cell = if idx == cols.year {
            Cell::from_int(r.year)
        } else if idx == cols.sale_price {
            Cell::from_float(r.sale_price)
        } else if idx == cols.original_price {
            Cell::from_float(r.original_price)
        } else if idx == cols.mileage {
            Cell::from_float(r.mileage)
        } else if idx == cols.brand {
            Cell::Text(r.brand.clone())
        } else {
            Cell::Text(r.fields.get(idx).cloned().unwrap_or_default())
        };
        row.push(cell);
    }
    row.push(Cell::from_int(r.usage_years));
    row.push(Cell::from_float(r.price_drop));
    row.push(Cell::from_float(r.annual_price_drop));
    row.push(Cell::from_float(r.drop_per_10k_km));
    row
}

/// Write the augmented table to an `.xlsx` file.
pub fn write_xlsx(path: &Path, table: &AugmentedTable) -> Result<(), AppError> {
    let map_err = |e: XlsxError| {
        AppError::output(format!(
            "[{STAGE}] Failed to write spreadsheet '{}': {e}",
            path.display()
        ))
    };

    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME).map_err(map_err)?;

    for (c, name) in table.headers.iter().enumerate() {
        worksheet
            .write_string_with_format(0, col_num(c, path)?, name.as_str(), &header_format)
            .map_err(map_err)?;
    }

    for (r, row) in table.rows.iter().enumerate() {
        let row_num = u32::try_from(r + 1).map_err(|_| too_large(path))?;
        for (c, cell) in row.iter().enumerate() {
            let col = col_num(c, path)?;
            match cell {
                Cell::Text(s) => {
                    worksheet.write_string(row_num, col, s.as_str()).map_err(map_err)?;
                }
                Cell::Int(v) => {
                    worksheet.write_number(row_num, col, f64::from(*v)).map_err(map_err)?;
                }
                Cell::Float(v) => {
                    worksheet.write_number(row_num, col, *v).map_err(map_err)?;
                }
                Cell::Null => {}
            }
        }
    }

    workbook.save(path).map_err(map_err)?;
    info!(path = %path.display(), rows = table.rows.len(), "exported spreadsheet");

    Ok(())
}

fn col_num(c: usize, path: &Path) -> Result<u16, AppError> {
    u16::try_from(c).map_err(|_| too_large(path))
}

fn too_large(path: &Path) -> AppError {
    AppError::output(format!(
        "[{STAGE}] Table is too large for a spreadsheet: '{}'",
        path.display()
    ))
}

#[cfg(test)]
mod tests {
    use calamine::{Data, Reader, Xlsx, open_workbook};

    use super::*;
    use crate::clean::clean_table;
    use crate::domain::Table;
    use crate::io::ingest::listing_columns;

    fn sample_table() -> Table {
        let rows = [
            ["大众朗逸 2019款", "2019年", "8.5万", "15万", "3万公里", "大众朗逸", "北京"],
            ["BMW 3系", "2024年", "30万", "35万", "0万公里", "BMW", "上海"],
            ["本田雅阁", "老车", "6万", "12万", "很多", "本田雅阁", ""],
        ];
        Table {
            headers: ["leixing", "nianfen", "shoujia", "yuanjia", "licheng", "brand", "city"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            rows: rows
                .iter()
                .map(|r| r.iter().map(|s| s.to_string()).collect())
                .collect(),
        }
    }

    fn as_f64(cell: &Data) -> Option<f64> {
        match cell {
            Data::Float(v) => Some(*v),
            Data::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    #[test]
    fn layout_replaces_cleaned_columns_and_appends_derived() {
        let table = sample_table();
        let cols = listing_columns(&table).unwrap();
        let cleaned = clean_table(&table, cols, 2024);
        let out = augmented_table(&table.headers, cols, &cleaned.records);

        assert_eq!(out.headers.len(), 11);
        assert_eq!(&out.headers[7..], &DERIVED_COLUMNS.map(String::from));
        assert_eq!(out.rows[0][1], Cell::Int(2019));
        assert_eq!(out.rows[0][2], Cell::Float(8.5));
        assert_eq!(out.rows[0][6], Cell::Text("北京".to_string()));
        assert_eq!(out.rows[0][7], Cell::Int(5));
        assert_eq!(out.rows[1][9], Cell::Null);
        assert_eq!(out.rows[1][10], Cell::Null);
        assert_eq!(out.rows[2][1], Cell::Null);
        assert_eq!(out.rows[2][7], Cell::Null);
    }

    #[test]
    fn xlsx_round_trip_preserves_rows_columns_and_values() {
        let table = sample_table();
        let cols = listing_columns(&table).unwrap();
        let cleaned = clean_table(&table, cols, 2024);
        let out = augmented_table(&table.headers, cols, &cleaned.records);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("processed_cars.xlsx");
        write_xlsx(&path, &out).unwrap();

        let mut workbook: Xlsx<_> = open_workbook(&path).unwrap();
        let range = workbook.worksheet_range(SHEET_NAME).unwrap();
        let rows: Vec<&[Data]> = range.rows().collect();

        assert_eq!(rows.len(), 1 + table.rows.len());
        let headers: Vec<String> = rows[0].iter().map(|c| c.to_string()).collect();
        assert_eq!(headers, out.headers);

        // Derived values recomputed from the raw inputs must match the file.
        for (row, record) in rows[1..].iter().zip(&cleaned.records) {
            let derived = [
                record.usage_years.map(f64::from),
                record.price_drop,
                record.annual_price_drop,
                record.drop_per_10k_km,
            ];
            for (offset, expected) in derived.iter().enumerate() {
                let actual = row.get(7 + offset).and_then(as_f64);
                match (actual, expected) {
                    (Some(a), Some(e)) => assert!((a - e).abs() < 1e-9),
                    (None, None) => {}
                    other => panic!("mismatch at derived column {offset}: {other:?}"),
                }
            }
        }

        assert_eq!(rows[1][0].to_string(), "大众朗逸 2019款");
        assert_eq!(rows[1][6].to_string(), "北京");
    }

    #[test]
    fn unwritable_path_is_an_output_error() {
        let out = AugmentedTable {
            headers: vec!["a".to_string()],
            rows: vec![],
        };
        let err = write_xlsx(Path::new("/nonexistent/dir/out.xlsx"), &out).unwrap_err();
        assert_eq!(err.exit_code(), crate::error::EXIT_OUTPUT);
        assert!(err.message().contains("[export]"));
    }
}
