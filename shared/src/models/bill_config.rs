//! Legacy bill-level configuration

use serde::{Deserialize, Serialize};

use crate::types::RatePercent;

/// Where a manual-total rounding difference should be booked
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoundingMethod {
    /// Book the whole difference against the payer
    #[default]
    Payer,
    /// Split the difference across consumers
    Split,
}

/// Bill-level fallback rates.
///
/// Kept for payloads predating per-receipt rates; receipt and item
/// settings supersede these and the engine takes no arithmetic from
/// them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BillConfig {
    #[serde(default)]
    pub vat_rate: RatePercent,
    #[serde(default)]
    pub service_charge_rate: RatePercent,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_bill_total: Option<f64>,
    #[serde(default)]
    pub rounding_method: RoundingMethod,
}

impl Default for BillConfig {
    fn default() -> Self {
        Self {
            vat_rate: 0.0,
            service_charge_rate: 0.0,
            final_bill_total: None,
            rounding_method: RoundingMethod::Payer,
        }
    }
}
