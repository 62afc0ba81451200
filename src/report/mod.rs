//! Grouped aggregations behind the three charts.
//!
//! Each report is computed independently from the cleaned records. Averages
//! skip null inputs; a group with nothing to average has a `None` average.
//! Values are rounded to 2 decimals before sorting.

pub mod format;

pub use format::*;

use std::cmp::Ordering;
use std::collections::HashMap;
use std::hash::Hash;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::domain::CarRecord;

/// Report A row: average sale price of one brand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrandAvgPrice {
    pub brand: String,
    pub avg_price: Option<f64>,
}

/// Report B row: average sale price for one age.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageAvgPrice {
    pub usage_years: Option<i32>,
    pub avg_price: Option<f64>,
}

/// Report C row: annual resale rate (percent per year) of one brand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrandResaleRate {
    pub brand: String,
    pub annual_resale_rate: f64,
}

/// All three aggregate tables of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reports {
    pub brand_avg_price: Vec<BrandAvgPrice>,
    pub usage_avg_price: Vec<UsageAvgPrice>,
    pub annual_resale_rate: Vec<BrandResaleRate>,
}

pub fn compute_reports(records: &[CarRecord]) -> Reports {
    Reports {
        brand_avg_price: brand_avg_price(records),
        usage_avg_price: usage_avg_price(records),
        annual_resale_rate: annual_resale_rate(records),
    }
}

/// Report A, sorted by average price descending (ties keep first-seen brand
/// order, null averages last).
pub fn brand_avg_price(records: &[CarRecord]) -> Vec<BrandAvgPrice> {
    let mut out: Vec<BrandAvgPrice> = group_by(records, |r| r.brand.clone())
        .into_iter()
        .map(|(brand, rows)| BrandAvgPrice {
            brand,
            avg_price: mean(rows.iter().map(|r| r.sale_price)).map(round2),
        })
        .collect();
    out.sort_by(|a, b| cmp_desc_nulls_last(a.avg_price, b.avg_price));
    out
}

/// Report B, sorted by `usage_years` ascending (null age first).
pub fn usage_avg_price(records: &[CarRecord]) -> Vec<UsageAvgPrice> {
    let mut out: Vec<UsageAvgPrice> = group_by(records, |r| r.usage_years)
        .into_iter()
        .map(|(usage_years, rows)| UsageAvgPrice {
            usage_years,
            avg_price: mean(rows.iter().map(|r| r.sale_price)).map(round2),
        })
        .collect();
    out.sort_by_key(|r| r.usage_years);
    out
}

/// Report C: `avg(sale) / avg(original) * 100 / avg(usage_years)` per brand.
///
/// Brands whose rate is undefined (a missing average or a zero divisor) are
/// dropped. Sorted descending, ties in first-seen order.
pub fn annual_resale_rate(records: &[CarRecord]) -> Vec<BrandResaleRate> {
    let mut out: Vec<BrandResaleRate> = group_by(records, |r| r.brand.clone())
        .into_iter()
        .filter_map(|(brand, rows)| {
            let sale = mean(rows.iter().map(|r| r.sale_price))?;
            let original = mean(rows.iter().map(|r| r.original_price))?;
            let years = mean(rows.iter().map(|r| r.usage_years.map(f64::from)))?;
            if original == 0.0 || years == 0.0 {
                return None;
            }
            let rate = round2(sale / original * 100.0 / years);
            rate.is_finite().then_some(BrandResaleRate {
                brand,
                annual_resale_rate: rate,
            })
        })
        .collect();
    out.sort_by(|a, b| cmp_desc_nulls_last(Some(a.annual_resale_rate), Some(b.annual_resale_rate)));
    out
}

/// Round half away from zero to 2 decimals, on the value as it prints.
///
/// `1.005` rounds to `1.01` even though its binary value is slightly below the
/// midpoint. Values outside `Decimal`'s range fall back to float rounding.
pub fn round2(v: f64) -> f64 {
    v.to_string()
        .parse::<Decimal>()
        .ok()
        .and_then(|d| {
            d.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
                .to_string()
                .parse::<f64>()
                .ok()
        })
        .unwrap_or_else(|| (v * 100.0).round() / 100.0)
}

/// Mean of the present values, `None` if there are none.
fn mean(values: impl Iterator<Item = Option<f64>>) -> Option<f64> {
    let (sum, n) = values
        .flatten()
        .fold((0.0_f64, 0usize), |(sum, n), v| (sum + v, n + 1));
    if n == 0 { None } else { Some(sum / n as f64) }
}

/// Group rows by key, groups ordered by first appearance.
fn group_by<'a, K, F>(records: &'a [CarRecord], key: F) -> Vec<(K, Vec<&'a CarRecord>)>
where
    K: Eq + Hash + Clone,
    F: Fn(&CarRecord) -> K,
{
    let mut index: HashMap<K, usize> = HashMap::new();
    let mut groups: Vec<(K, Vec<&CarRecord>)> = Vec::new();
    for r in records {
        let k = key(r);
        match index.get(&k) {
            Some(&i) => groups[i].1.push(r),
            None => {
                index.insert(k.clone(), groups.len());
                groups.push((k, vec![r]));
            }
        }
    }
    groups
}

fn cmp_desc_nulls_last(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
