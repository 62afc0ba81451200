//! Field cleaning and derived columns.
//!
//! Turns the four unit-suffixed text fields of a brand-augmented table into
//! numbers and computes the derived depreciation columns.
//!
//! Every failure here is local: a cell that does not parse becomes `None`, and
//! `None` flows through every derived value that depends on it. Division by
//! zero also yields `None` (never an infinity).

use rayon::prelude::*;
use tracing::{debug, warn};

use crate::domain::{
    COL_MILEAGE, COL_ORIGINAL_PRICE, COL_SALE_PRICE, COL_YEAR, CarRecord, ColumnKind, ListingColumns, Table,
};

/// Per-field counts of values that came out null after cleaning.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NullCounts {
    pub year: usize,
    pub sale_price: usize,
    pub original_price: usize,
    pub mileage: usize,
}

impl NullCounts {
    pub fn total(&self) -> usize {
        self.year + self.sale_price + self.original_price + self.mileage
    }

    /// `(column, count)` pairs in schema order.
    pub fn by_column(&self) -> [(&'static str, usize); 4] {
        [
            (COL_YEAR, self.year),
            (COL_SALE_PRICE, self.sale_price),
            (COL_ORIGINAL_PRICE, self.original_price),
            (COL_MILEAGE, self.mileage),
        ]
    }
}

/// Cleaned rows plus what went missing along the way.
#[derive(Debug, Clone)]
pub struct CleanedData {
    pub records: Vec<CarRecord>,
    pub nulls: NullCounts,
}

/// Clean every row of `table` and derive the computed columns.
///
/// Output order equals input order.
pub fn clean_table(table: &Table, cols: ListingColumns, reference_year: i32) -> CleanedData {
    let records: Vec<CarRecord> = table
        .rows
        .par_iter()
        .map(|row| clean_row(row, cols, reference_year))
        .collect();

    let mut nulls = NullCounts::default();
    for r in &records {
        nulls.year += usize::from(r.year.is_none());
        nulls.sale_price += usize::from(r.sale_price.is_none());
        nulls.original_price += usize::from(r.original_price.is_none());
        nulls.mileage += usize::from(r.mileage.is_none());
    }

    for (column, count) in nulls.by_column() {
        if count > 0 {
            warn!(column, rows = count, "values could not be parsed and were set to null");
        }
    }
    debug!(rows = records.len(), "cleaned listing rows");

    CleanedData { records, nulls }
}

/// Clean a single raw row.
pub fn clean_row(row: &[String], cols: ListingColumns, reference_year: i32) -> CarRecord {
    let cell = |idx: usize| row.get(idx).map(String::as_str).unwrap_or("");

    let mut record = CarRecord {
        fields: row.to_vec(),
        brand: cell(cols.brand).to_string(),
        year: parse_year(cell(cols.year)),
        sale_price: parse_amount(cell(cols.sale_price), ColumnKind::WanYuan),
        original_price: parse_amount(cell(cols.original_price), ColumnKind::WanYuan),
        mileage: parse_amount(cell(cols.mileage), ColumnKind::WanKm),
        usage_years: None,
        price_drop: None,
        annual_price_drop: None,
        drop_per_10k_km: None,
    };
    derive_columns(&mut record, reference_year);
    record
}

/// Compute `usage_years`, `price_drop`, `annual_price_drop` and
/// `drop_per_10k_km` from the cleaned fields.
pub fn derive_columns(record: &mut CarRecord, reference_year: i32) {
    record.usage_years = record.year.and_then(|y| reference_year.checked_sub(y));
    record.price_drop = match (record.original_price, record.sale_price) {
        (Some(original), Some(sale)) => finite(original - sale),
        _ => None,
    };
    record.annual_price_drop = ratio(record.price_drop, record.usage_years.map(f64::from));
    record.drop_per_10k_km = ratio(record.price_drop, record.mileage);
}

/// Parse a `nianfen` cell such as `2019年`.
pub fn parse_year(raw: &str) -> Option<i32> {
    strip_unit(raw, ColumnKind::Year).parse::<i32>().ok()
}

/// Parse a `万` / `万公里` cell such as `12.5万`.
pub fn parse_amount(raw: &str, kind: ColumnKind) -> Option<f64> {
    strip_unit(raw, kind).parse::<f64>().ok().and_then(finite)
}

/// `numerator / denominator`, or `None` if either side is missing or the
/// denominator is zero.
pub fn ratio(numerator: Option<f64>, denominator: Option<f64>) -> Option<f64> {
    let (n, d) = (numerator?, denominator?);
    if d == 0.0 {
        return None;
    }
    finite(n / d)
}

fn strip_unit(raw: &str, kind: ColumnKind) -> &str {
    let trimmed = raw.trim();
    let stripped = match kind.unit_suffix() {
        Some(suffix) => trimmed.strip_suffix(suffix).unwrap_or(trimmed),
        None => trimmed,
    };
    stripped.trim()
}

fn finite(v: f64) -> Option<f64> {
    if v.is_finite() { Some(v) } else { None }
}

#[cfg(test)]
mod tests {
    use super::*;

    const COLS: ListingColumns = ListingColumns {
        year: 1,
        sale_price: 2,
        original_price: 3,
        mileage: 4,
        brand: 5,
    };

    fn row(cells: [&str; 6]) -> Vec<String> {
        cells.iter().map(|s| s.to_string()).collect()
    }

    fn approx(a: Option<f64>, b: f64) -> bool {
        a.is_some_and(|a| (a - b).abs() < 1e-9)
    }

    #[test]
    fn parses_unit_suffixed_values() {
        assert_eq!(parse_year("2019年"), Some(2019));
        assert_eq!(parse_year(" 2019 "), Some(2019));
        assert_eq!(parse_year("2019.5年"), None);
        assert_eq!(parse_year("未知"), None);
        assert_eq!(parse_year(""), None);

        assert_eq!(parse_amount("12.5万", ColumnKind::WanYuan), Some(12.5));
        assert_eq!(parse_amount("3.2万公里", ColumnKind::WanKm), Some(3.2));
        assert_eq!(parse_amount("8", ColumnKind::WanYuan), Some(8.0));
        assert_eq!(parse_amount("500公里", ColumnKind::WanKm), None);
        assert_eq!(parse_amount("面议", ColumnKind::WanYuan), None);
        assert_eq!(parse_amount("inf万", ColumnKind::WanYuan), None);
        assert_eq!(parse_amount("NaN万", ColumnKind::WanYuan), None);
    }

    #[test]
    fn reference_example_row() {
        let r = clean_row(&row(["大众朗逸 2019款", "2019年", "8.5万", "15万", "3万公里", "大众朗逸"]), COLS, 2024);

        assert_eq!(r.brand, "大众朗逸");
        assert_eq!(r.year, Some(2019));
        assert_eq!(r.usage_years, Some(5));
        assert!(approx(r.price_drop, 6.5));
        assert!(approx(r.annual_price_drop, 1.3));
        assert!(approx(r.drop_per_10k_km, 6.5 / 3.0));
        assert_eq!(r.fields[0], "大众朗逸 2019款");
    }

    #[test]
    fn null_year_propagates() {
        let r = clean_row(&row(["x", "不详", "8.5万", "15万", "3万公里", "x"]), COLS, 2024);

        assert_eq!(r.year, None);
        assert_eq!(r.usage_years, None);
        assert_eq!(r.annual_price_drop, None);
        assert!(approx(r.price_drop, 6.5));
        assert!(r.drop_per_10k_km.is_some());
    }

    #[test]
    fn bad_mileage_only_nulls_its_ratio() {
        let r = clean_row(&row(["x", "2019年", "8.5万", "15万", "很少", "x"]), COLS, 2024);

        assert_eq!(r.usage_years, Some(5));
        assert!(approx(r.price_drop, 6.5));
        assert!(approx(r.annual_price_drop, 1.3));
        assert_eq!(r.drop_per_10k_km, None);
    }

    #[test]
    fn missing_price_nulls_every_drop() {
        let r = clean_row(&row(["x", "2019年", "", "15万", "3万公里", "x"]), COLS, 2024);

        assert_eq!(r.price_drop, None);
        assert_eq!(r.annual_price_drop, None);
        assert_eq!(r.drop_per_10k_km, None);
        assert_eq!(r.usage_years, Some(5));
    }

    #[test]
    fn division_by_zero_is_null() {
        let same_year = clean_row(&row(["x", "2024年", "8万", "10万", "1万公里", "x"]), COLS, 2024);
        assert_eq!(same_year.usage_years, Some(0));
        assert_eq!(same_year.annual_price_drop, None);
        assert!(approx(same_year.drop_per_10k_km, 2.0));

        let zero_km = clean_row(&row(["x", "2020年", "8万", "10万", "0万公里", "x"]), COLS, 2024);
        assert_eq!(zero_km.drop_per_10k_km, None);
        assert!(approx(zero_km.annual_price_drop, 0.5));

        assert_eq!(ratio(Some(1.0), Some(0.0)), None);
        assert_eq!(ratio(Some(1.0), None), None);
        assert_eq!(ratio(None, Some(2.0)), None);
    }

    #[test]
    fn inconsistent_prices_give_negative_drop() {
        let r = clean_row(&row(["x", "2021年", "12万", "10万", "2万公里", "x"]), COLS, 2024);
        assert!(approx(r.price_drop, -2.0));
        assert!(approx(r.annual_price_drop, -2.0 / 3.0));
    }

    #[test]
    fn table_cleaning_keeps_order_and_counts_nulls() {
        let table = Table {
            headers: row(["leixing", "nianfen", "shoujia", "yuanjia", "licheng", "brand"]),
            rows: vec![
                row(["a", "2019年", "8.5万", "15万", "3万公里", "a"]),
                row(["b", "?", "x", "15万", "", "b"]),
                row(["c", "2010年", "2万", "9万", "12万公里", "c"]),
            ],
        };

        let cleaned = clean_table(&table, COLS, 2024);
        let brands: Vec<&str> = cleaned.records.iter().map(|r| r.brand.as_str()).collect();
        assert_eq!(brands, vec!["a", "b", "c"]);
        assert_eq!(
            cleaned.nulls,
            NullCounts {
                year: 1,
                sale_price: 1,
                original_price: 0,
                mileage: 1,
            }
        );
        assert_eq!(cleaned.nulls.total(), 3);
    }

    #[test]
    fn reference_year_is_configurable() {
        let r = clean_row(&row(["x", "2019年", "8.5万", "15万", "3万公里", "x"]), COLS, 2026);
        assert_eq!(r.usage_years, Some(7));
    }
}
