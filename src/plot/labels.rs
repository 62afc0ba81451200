//! Chart titles and axis labels, per locale.
//!
//! Built-in tables exist for `zh` and `en`. A TOML file can override any
//! subset of keys; keys it leaves out keep the locale default.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::Locale;
use crate::error::AppError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Labels {
    pub brand_axis: String,
    pub avg_price_axis: String,
    pub brand_price_title: String,
    pub usage_years_axis: String,
    pub avg_deal_price_axis: String,
    pub usage_price_title: String,
    pub resale_rate_axis: String,
    pub resale_rate_title: String,
}

/// Partial label table as read from an override file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct LabelOverrides {
    brand_axis: Option<String>,
    avg_price_axis: Option<String>,
    brand_price_title: Option<String>,
    usage_years_axis: Option<String>,
    avg_deal_price_axis: Option<String>,
    usage_price_title: Option<String>,
    resale_rate_axis: Option<String>,
    resale_rate_title: Option<String>,
}

impl Labels {
    pub fn for_locale(locale: Locale) -> Self {
        let s = |v: &str| v.to_string();
        match locale {
            Locale::Zh => Self {
                brand_axis: s("品牌"),
                avg_price_axis: s("平均价格 (万元)"),
                brand_price_title: s("品牌与平均价格的关系"),
                usage_years_axis: s("使用年限 (年)"),
                avg_deal_price_axis: s("平均交易价格 (万元)"),
                usage_price_title: s("使用年限与平均交易价格的关系"),
                resale_rate_axis: s("年度保值率 (%)"),
                resale_rate_title: s("不同品牌的年度保值率"),
            },
            Locale::En => Self {
                brand_axis: s("Brand"),
                avg_price_axis: s("Average price (10k CNY)"),
                brand_price_title: s("Average price by brand"),
                usage_years_axis: s("Usage years"),
                avg_deal_price_axis: s("Average sale price (10k CNY)"),
                usage_price_title: s("Average sale price by usage years"),
                resale_rate_axis: s("Annual resale rate (%)"),
                resale_rate_title: s("Annual resale rate by brand"),
            },
        }
    }

    /// Locale defaults, overridden by the TOML file at `path` when given.
    pub fn load(locale: Locale, path: Option<&Path>) -> Result<Self, AppError> {
        let mut labels = Self::for_locale(locale);
        let Some(path) = path else {
            return Ok(labels);
        };

        let text = fs::read_to_string(path)
            .map_err(|e| AppError::input(format!("Failed to read labels file '{}': {e}", path.display())))?;
        let overrides = parse_overrides(&text)
            .map_err(|e| AppError::input(format!("Invalid labels file '{}': {e}", path.display())))?;
        labels.apply(overrides);
        Ok(labels)
    }

    fn apply(&mut self, o: LabelOverrides) {
        let set = |slot: &mut String, value: Option<String>| {
            if let Some(v) = value {
                *slot = v;
            }
        };
        set(&mut self.brand_axis, o.brand_axis);
        set(&mut self.avg_price_axis, o.avg_price_axis);
        set(&mut self.brand_price_title, o.brand_price_title);
        set(&mut self.usage_years_axis, o.usage_years_axis);
        set(&mut self.avg_deal_price_axis, o.avg_deal_price_axis);
        set(&mut self.usage_price_title, o.usage_price_title);
        set(&mut self.resale_rate_axis, o.resale_rate_axis);
        set(&mut self.resale_rate_title, o.resale_rate_title);
    }
}

fn parse_overrides(text: &str) -> Result<LabelOverrides, toml::de::Error> {
    toml::from_str(text)
}
