//! Plotters-powered PNG charts for the three reports.
//!
//! Chart descriptions are data-driven: categories, values and labels are
//! prepared outside `render()`, which only draws. Each chart renders to its own
//! bitmap, so one failing chart leaves the others untouched.

use std::error::Error;
use std::path::Path;

use plotters::prelude::*;
use plotters::style::FontTransform;

use crate::error::AppError;
use crate::plot::font::CHART_FONT;

const TITLE_SIZE: u32 = 40;
const AXIS_DESC_SIZE: u32 = 26;
const TICK_SIZE: u32 = 20;

/// Bar chart over named categories.
pub struct BarChart<'a> {
    pub categories: &'a [String],
    pub values: &'a [f64],
    pub title: &'a str,
    pub x_label: &'a str,
    pub y_label: &'a str,
    pub color: RGBColor,
    pub size: (u32, u32),
}

/// Line chart with a circle marker on every point.
pub struct LineChart<'a> {
    pub points: &'a [(f64, f64)],
    pub title: &'a str,
    pub x_label: &'a str,
    pub y_label: &'a str,
    pub color: RGBColor,
    pub size: (u32, u32),
}

impl BarChart<'_> {
    pub fn render(&self, path: &Path) -> Result<(), AppError> {
        if self.values.is_empty() {
            return Err(AppError::output(format!(
                "Nothing to plot for '{}'",
                path.display()
            )));
        }
        self.draw(path).map_err(|e| render_error(path, &*e))
    }

    fn draw(&self, path: &Path) -> Result<(), Box<dyn Error>> {
        let root = BitMapBackend::new(path, self.size).into_drawing_area();
        root.fill(&WHITE)?;

        let n = self.values.len();
        let (y0, y1) = padded_range(self.values.iter().copied().chain([0.0]));

        // Category labels are rotated, so the bottom area has to fit the
        // longest label laid out vertically.
        let longest = self.categories.iter().map(|c| c.chars().count()).max().unwrap_or(1);
        let bottom = (longest as u32 * TICK_SIZE).max(60).min((self.size.1 / 3).max(1));

        let mut chart = ChartBuilder::on(&root)
            .caption(self.title, (CHART_FONT, TITLE_SIZE))
            .margin(20)
            .x_label_area_size(bottom)
            .y_label_area_size(90)
            .build_cartesian_2d((0..n as i32).into_segmented(), y0..y1)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(n)
            .x_label_formatter(&|v| category_label(self.categories, v))
            .x_label_style((CHART_FONT, TICK_SIZE).into_font().transform(FontTransform::Rotate90))
            .y_label_style((CHART_FONT, TICK_SIZE))
            .x_desc(self.x_label)
            .y_desc(self.y_label)
            .axis_desc_style((CHART_FONT, AXIS_DESC_SIZE))
            .draw()?;

        chart.draw_series(self.values.iter().enumerate().map(|(i, &v)| {
            let i = i as i32;
            let mut bar = Rectangle::new(
                [(SegmentValue::Exact(i), 0.0), (SegmentValue::Exact(i + 1), v)],
                self.color.filled(),
            );
            bar.set_margin(0, 0, 3, 3);
            bar
        }))?;

        root.present()?;
        Ok(())
    }
}

impl LineChart<'_> {
    pub fn render(&self, path: &Path) -> Result<(), AppError> {
        if self.points.is_empty() {
            return Err(AppError::output(format!(
                "Nothing to plot for '{}'",
                path.display()
            )));
        }
        self.draw(path).map_err(|e| render_error(path, &*e))
    }

    fn draw(&self, path: &Path) -> Result<(), Box<dyn Error>> {
        let root = BitMapBackend::new(path, self.size).into_drawing_area();
        root.fill(&WHITE)?;

        let (x0, x1) = padded_range(self.points.iter().map(|p| p.0));
        let (y0, y1) = padded_range(self.points.iter().map(|p| p.1));

        let mut chart = ChartBuilder::on(&root)
            .caption(self.title, (CHART_FONT, TITLE_SIZE))
            .margin(20)
            .x_label_area_size(70)
            .y_label_area_size(90)
            .build_cartesian_2d(x0..x1, y0..y1)?;

        // Mesh lines stay on: they are the chart's grid.
        chart
            .configure_mesh()
            .x_label_formatter(&|v| format!("{v:.0}"))
            .y_label_formatter(&|v| format!("{v:.1}"))
            .label_style((CHART_FONT, TICK_SIZE))
            .x_desc(self.x_label)
            .y_desc(self.y_label)
            .axis_desc_style((CHART_FONT, AXIS_DESC_SIZE))
            .draw()?;

        chart.draw_series(LineSeries::new(
            self.points.iter().copied(),
            self.color.stroke_width(3),
        ))?;
        chart.draw_series(
            self.points
                .iter()
                .map(|&p| Circle::new(p, 6, self.color.filled())),
        )?;

        root.present()?;
        Ok(())
    }
}

fn category_label(categories: &[String], v: &SegmentValue<i32>) -> String {
    match v {
        SegmentValue::CenterOf(i) => usize::try_from(*i)
            .ok()
            .and_then(|i| categories.get(i))
            .cloned()
            .unwrap_or_default(),
        _ => String::new(),
    }
}

/// Min/max of `values` widened by 10% of the span (or by 1 when flat).
fn padded_range(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (lo, hi) = values
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if !(lo.is_finite() && hi.is_finite()) {
        return (0.0, 1.0);
    }
    let span = hi - lo;
    if span < 1e-9 {
        return (lo - 1.0, hi + 1.0);
    }
    let pad = span * 0.1;
    let lo = if lo == 0.0 { 0.0 } else { lo - pad };
    (lo, hi + pad)
}

fn render_error(path: &Path, e: &dyn Error) -> AppError {
    AppError::output(format!("Failed to render chart '{}': {e}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn padded_range_keeps_zero_baseline() {
        let (lo, hi) = padded_range([0.0, 10.0].into_iter());
        assert_eq!(lo, 0.0);
        assert!((hi - 11.0).abs() < 1e-9);
    }

    #[test]
    fn padded_range_handles_flat_and_empty() {
        assert_eq!(padded_range([5.0, 5.0].into_iter()), (4.0, 6.0));
        assert_eq!(padded_range(std::iter::empty::<f64>()), (0.0, 1.0));
        assert_eq!(padded_range([f64::NAN].into_iter()), (0.0, 1.0));
    }

    #[test]
    fn category_labels_only_at_segment_centers() {
        let cats = vec!["宝马".to_string(), "大众".to_string()];
        assert_eq!(category_label(&cats, &SegmentValue::CenterOf(1)), "大众");
        assert_eq!(category_label(&cats, &SegmentValue::CenterOf(5)), "");
        assert_eq!(category_label(&cats, &SegmentValue::Exact(0)), "");
        assert_eq!(category_label(&cats, &SegmentValue::Last), "");
    }

    #[test]
    fn empty_series_is_an_error_without_touching_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.png");
        let chart = BarChart {
            categories: &[],
            values: &[],
            title: "t",
            x_label: "x",
            y_label: "y",
            color: BLUE,
            size: (400, 300),
        };
        let err = chart.render(&path).unwrap_err();
        assert_eq!(err.exit_code(), crate::error::EXIT_OUTPUT);
        assert!(!path.exists());
    }
}
