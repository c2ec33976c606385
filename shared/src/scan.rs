//! External receipt-scanning contract
//!
//! Shape of the best-effort result a document-understanding service
//! produces from one receipt image. The service is a black box; the
//! engine ingests these as ordinary receipt/item records with no
//! special-cased trust (see the ingestion rules in `hantao-engine`).

use serde::{Deserialize, Serialize};

/// One recognized line item. `price` is the unit price, never the
/// printed line total.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScannedItem {
    pub name: String,
    pub price: f64,
    /// Missing or non-positive counts are ingested as 1
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<i32>,
}

/// Recognition result for one receipt image
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ScannedReceipt {
    #[serde(default)]
    pub items: Vec<ScannedItem>,
    /// Printed grand total, when legible; becomes the receipt's manual
    /// total and activates the rounding correction
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grand_total: Option<f64>,
    /// Detected VAT percent; an explicit 0 means "net price" receipts
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vat_rate: Option<f64>,
    /// Detected service-charge percent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_charge_rate: Option<f64>,
}
