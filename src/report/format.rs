//! Formatted terminal output: schema, row preview, report tables, run summary.
//!
//! We keep formatting code in one place so the cleaning and aggregation code
//! stays free of presentation concerns.

use crate::app::pipeline::AnalysisOutput;
use crate::domain::{ColumnKind, DERIVED_COLUMNS, Schema};
use crate::io::export::AugmentedTable;
use crate::report::Reports;

/// Print the typed schema of the augmented table.
///
/// Undeclared source columns are shown as strings.
pub fn format_schema(headers: &[String], schema: &Schema) -> String {
    let mut out = String::from("root\n");
    for name in headers {
        let kind = schema.kind_of(name).unwrap_or(ColumnKind::Text);
        out.push_str(&format!(" |-- {name}: {} (nullable = true)\n", kind.type_name()));
    }
    for (i, name) in DERIVED_COLUMNS.iter().enumerate() {
        let kind = if i == 0 {
            ColumnKind::DerivedInt
        } else {
            ColumnKind::DerivedFloat
        };
        out.push_str(&format!(" |-- {name}: {} (nullable = true)\n", kind.type_name()));
    }
    out
}

/// Render the first `n` rows as a boxed text table.
pub fn format_preview(table: &AugmentedTable, n: usize) -> String {
    let rows: Vec<Vec<String>> = table
        .rows
        .iter()
        .take(n)
        .map(|r| r.iter().map(|c| c.display()).collect())
        .collect();

    let mut out = render_grid(&table.headers, &rows);
    if table.rows.len() > n {
        out.push_str(&format!("only showing top {n} rows\n"));
    }
    out
}

/// Render the three aggregate tables.
pub fn format_reports(reports: &Reports) -> String {
    let mut out = String::new();

    out.push_str("Average price by brand (10k yuan)\n");
    let rows: Vec<Vec<String>> = reports
        .brand_avg_price
        .iter()
        .map(|r| vec![r.brand.clone(), fmt_opt(r.avg_price)])
        .collect();
    out.push_str(&render_grid(&["brand".to_string(), "avg_price".to_string()], &rows));

    out.push_str("\nAverage price by usage years (10k yuan)\n");
    let rows: Vec<Vec<String>> = reports
        .usage_avg_price
        .iter()
        .map(|r| {
            vec![
                r.usage_years.map(|v| v.to_string()).unwrap_or_else(|| "null".to_string()),
                fmt_opt(r.avg_price),
            ]
        })
        .collect();
    out.push_str(&render_grid(&["usage_years".to_string(), "avg_price".to_string()], &rows));

    out.push_str("\nAnnual resale rate by brand (%)\n");
    let rows: Vec<Vec<String>> = reports
        .annual_resale_rate
        .iter()
        .map(|r| vec![r.brand.clone(), format!("{:.2}", r.annual_resale_rate)])
        .collect();
    out.push_str(&render_grid(
        &["brand".to_string(), "annual_resale_rate".to_string()],
        &rows,
    ));

    out
}

/// Print a summary of one analysis run.
pub fn format_run_summary(run: &AnalysisOutput) -> String {
    let mut out = String::new();

    out.push_str(&format!("Input: {}\n", run.input.display()));
    out.push_str(&format!("Rows: {} (reference year {})\n", run.rows, run.reference_year));

    if run.nulls.total() == 0 {
        out.push_str("Unparsed values: none\n");
    } else {
        let parts: Vec<String> = run
            .nulls
            .by_column()
            .iter()
            .filter(|(_, n)| *n > 0)
            .map(|(col, n)| format!("{col}={n}"))
            .collect();
        out.push_str(&format!("Unparsed values: {}\n", parts.join(", ")));
    }

    out.push_str(&format!(
        "Reports: brands={}, ages={}, resale rates={}\n",
        run.reports.brand_avg_price.len(),
        run.reports.usage_avg_price.len(),
        run.reports.annual_resale_rate.len()
    ));

    for chart in &run.charts {
        match &chart.error {
            None => out.push_str(&format!("Chart written: {}\n", chart.path.display())),
            Some(err) => out.push_str(&format!("Chart failed: {} ({err})\n", chart.path.display())),
        }
    }

    out.push_str(&format!("Data exported to {}\n", run.output.display()));
    out
}

fn fmt_opt(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v:.2}"),
        None => "null".to_string(),
    }
}

fn render_grid(headers: &[String], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(cell.chars().count());
            }
        }
    }

    let border = {
        let mut s = String::from("+");
        for w in &widths {
            s.push_str(&"-".repeat(w + 2));
            s.push('+');
        }
        s
    };

    let line = |cells: &[String]| {
        let mut s = String::from("|");
        for (i, w) in widths.iter().enumerate() {
            let cell = cells.get(i).map(String::as_str).unwrap_or("");
            let pad = w.saturating_sub(cell.chars().count());
            s.push(' ');
            s.push_str(cell);
            s.push_str(&" ".repeat(pad + 1));
            s.push('|');
        }
        s
    };

    let mut out = String::new();
    out.push_str(&format!("{border}\n"));
    out.push_str(&format!("{}\n", line(headers)));
    out.push_str(&format!("{border}\n"));
    for row in rows {
        out.push_str(&format!("{}\n", line(row.as_slice())));
    }
    out.push_str(&format!("{border}\n"));
    out
}
