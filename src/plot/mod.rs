//! Chart rendering for the three reports.
//!
//! - PNG chart widgets on Plotters (`charts`)
//! - chart text per locale (`labels`)
//! - font registration for the `ab_glyph` text backend (`font`)

pub mod charts;
pub mod font;
pub mod labels;

pub use charts::{BarChart, LineChart};
pub use labels::Labels;

use std::path::{Path, PathBuf};

use plotters::style::RGBColor;
use tracing::{info, warn};

use crate::error::AppError;
use crate::report::Reports;

pub const BRAND_PRICE_CHART: &str = "brand_avg_price.png";
pub const USAGE_PRICE_CHART: &str = "usage_years_avg_price.png";
pub const RESALE_RATE_CHART: &str = "annual_resale_rate.png";

const SKY_BLUE: RGBColor = RGBColor(135, 206, 235);
const ORANGE: RGBColor = RGBColor(255, 165, 0);
const PURPLE: RGBColor = RGBColor(128, 0, 128);

/// Result of rendering one chart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartOutcome {
    pub path: PathBuf,
    /// `None` when the image was written.
    pub error: Option<String>,
}

impl ChartOutcome {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Render all three report charts into `dir`.
///
/// Every chart is attempted; a failure is logged and recorded in its outcome.
pub fn render_report_charts(reports: &Reports, labels: &Labels, dir: &Path, size: (u32, u32)) -> Vec<ChartOutcome> {
    let brand_price: Vec<(String, f64)> = reports
        .brand_avg_price
        .iter()
        .filter_map(|r| r.avg_price.map(|v| (r.brand.clone(), v)))
        .collect();
    let (brands, prices): (Vec<String>, Vec<f64>) = brand_price.into_iter().unzip();

    let usage_points: Vec<(f64, f64)> = reports
        .usage_avg_price
        .iter()
        .filter_map(|r| Some((f64::from(r.usage_years?), r.avg_price?)))
        .collect();

    let (resale_brands, resale_rates): (Vec<String>, Vec<f64>) = reports
        .annual_resale_rate
        .iter()
        .map(|r| (r.brand.clone(), r.annual_resale_rate))
        .unzip();

    vec![
        finish(dir.join(BRAND_PRICE_CHART), |path| {
            BarChart {
                categories: &brands,
                values: &prices,
                title: &labels.brand_price_title,
                x_label: &labels.brand_axis,
                y_label: &labels.avg_price_axis,
                color: SKY_BLUE,
                size,
            }
            .render(path)
        }),
        finish(dir.join(USAGE_PRICE_CHART), |path| {
            LineChart {
                points: &usage_points,
                title: &labels.usage_price_title,
                x_label: &labels.usage_years_axis,
                y_label: &labels.avg_deal_price_axis,
                color: ORANGE,
                size,
            }
            .render(path)
        }),
        finish(dir.join(RESALE_RATE_CHART), |path| {
            BarChart {
                categories: &resale_brands,
                values: &resale_rates,
                title: &labels.resale_rate_title,
                x_label: &labels.brand_axis,
                y_label: &labels.resale_rate_axis,
                color: PURPLE,
                size,
            }
            .render(path)
        }),
    ]
}

fn finish(path: PathBuf, render: impl FnOnce(&Path) -> Result<(), AppError>) -> ChartOutcome {
    match render(&path) {
        Ok(()) => {
            info!(chart = %path.display(), "chart written");
            ChartOutcome { path, error: None }
        }
        Err(e) => {
            warn!(chart = %path.display(), error = %e, "chart rendering failed");
            ChartOutcome {
                path,
                error: Some(e.message().to_string()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Locale;
    use crate::plot::font::register_chart_font;
    use crate::report::{BrandAvgPrice, BrandResaleRate, UsageAvgPrice};

    /// Latin fonts found on common CI images; the English labels need no CJK glyphs.
    const TEST_FONTS: &[&str] = &[
        "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/TTF/DejaVuSans.ttf",
        "/Library/Fonts/Arial.ttf",
        "/System/Library/Fonts/Supplemental/Arial.ttf",
        "C:\\Windows\\Fonts\\arial.ttf",
    ];

    #[test]
    fn every_chart_is_attempted_even_when_some_fail() {
        // Report A only has a null average and Report C is empty, so both fail
        // before drawing; Report B still gets its own attempt.
        let reports = Reports {
            brand_avg_price: vec![BrandAvgPrice {
                brand: "大众".to_string(),
                avg_price: None,
            }],
            usage_avg_price: vec![UsageAvgPrice {
                usage_years: None,
                avg_price: Some(3.0),
            }],
            annual_resale_rate: vec![],
        };
        let dir = tempfile::tempdir().unwrap();

        let outcomes = render_report_charts(&reports, &Labels::for_locale(Locale::En), dir.path(), (400, 300));

        assert_eq!(outcomes.len(), 3);
        assert_eq!(outcomes[0].path, dir.path().join(BRAND_PRICE_CHART));
        assert_eq!(outcomes[1].path, dir.path().join(USAGE_PRICE_CHART));
        assert_eq!(outcomes[2].path, dir.path().join(RESALE_RATE_CHART));
        assert!(outcomes.iter().all(|o| !o.is_ok()));
        assert!(outcomes.iter().all(|o| !o.path.exists()));
    }

    #[test]
    fn all_three_charts_are_written_when_a_font_is_available() {
        let Some(font) = TEST_FONTS.iter().map(Path::new).find(|p| p.is_file()) else {
            eprintln!("skipping: no test font installed");
            return;
        };
        register_chart_font(Some(font)).unwrap();

        let reports = Reports {
            brand_avg_price: vec![
                BrandAvgPrice {
                    brand: "Audi".to_string(),
                    avg_price: Some(32.5),
                },
                BrandAvgPrice {
                    brand: "Toyota".to_string(),
                    avg_price: Some(12.25),
                },
                BrandAvgPrice {
                    brand: "Unknown".to_string(),
                    avg_price: None,
                },
            ],
            usage_avg_price: vec![
                UsageAvgPrice {
                    usage_years: None,
                    avg_price: Some(8.0),
                },
                UsageAvgPrice {
                    usage_years: Some(1),
                    avg_price: Some(20.0),
                },
                UsageAvgPrice {
                    usage_years: Some(4),
                    avg_price: Some(11.5),
                },
                UsageAvgPrice {
                    usage_years: Some(9),
                    avg_price: Some(4.75),
                },
            ],
            annual_resale_rate: vec![
                BrandResaleRate {
                    brand: "Audi".to_string(),
                    annual_resale_rate: 14.2,
                },
                BrandResaleRate {
                    brand: "Odd".to_string(),
                    annual_resale_rate: -3.5,
                },
            ],
        };
        let dir = tempfile::tempdir().unwrap();

        let outcomes = render_report_charts(&reports, &Labels::for_locale(Locale::En), dir.path(), (800, 400));

        assert_eq!(outcomes.len(), 3);
        for outcome in &outcomes {
            assert!(outcome.is_ok(), "{outcome:?}");
            let bytes = std::fs::read(&outcome.path).unwrap();
            assert!(bytes.starts_with(b"\x89PNG"), "{} is not a PNG", outcome.path.display());
        }
    }
}
