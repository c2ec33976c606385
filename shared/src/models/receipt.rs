//! Receipt model

use serde::{Deserialize, Serialize};

use crate::types::RatePercent;

/// Discount applied to a whole receipt
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiscountType {
    /// `discount_value` is a percentage of the receipt's base total
    Percent,
    /// `discount_value` is a flat currency amount
    Amount,
}

/// A sub-bill grouping items under one shared tax/discount/rounding
/// policy (one restaurant check).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Receipt {
    pub id: String,
    pub name: String,
    /// Service charge rate in percent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sc_rate: Option<RatePercent>,
    /// VAT rate in percent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vat_rate: Option<RatePercent>,
    /// Force service charge off even when a rate is set
    #[serde(default)]
    pub exclude_service_charge: bool,
    /// Force VAT off even when a rate is set
    #[serde(default)]
    pub exclude_vat: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_type: Option<DiscountType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_value: Option<f64>,
    /// Manually entered true total. Overrides the computed total and
    /// triggers the rounding correction.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manual_total: Option<f64>,
}

impl Receipt {
    /// Bare receipt with zero rates and no discount
    pub fn named(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            sc_rate: Some(0.0),
            vat_rate: Some(0.0),
            exclude_service_charge: false,
            exclude_vat: false,
            discount_type: None,
            discount_value: None,
            manual_total: None,
        }
    }

    /// Service-charge rate after the exclusion flag; missing rate is 0
    pub fn effective_sc_rate(&self) -> f64 {
        if self.exclude_service_charge {
            0.0
        } else {
            self.sc_rate.unwrap_or(0.0)
        }
    }

    /// VAT rate after the exclusion flag; missing rate is 0
    pub fn effective_vat_rate(&self) -> f64 {
        if self.exclude_vat {
            0.0
        } else {
            self.vat_rate.unwrap_or(0.0)
        }
    }
}
