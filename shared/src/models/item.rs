//! Item model

use serde::{Deserialize, Serialize};

/// Explicit "this member pays exactly this amount" claim on an item,
/// resolved before any proportional splitting.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FixedDeduction {
    pub member_id: String,
    pub amount: f64,
}

/// One purchased line.
///
/// `assigned_member_ids` is a multiset, not a set: the same member id
/// repeated counts once per occurrence (multiple shares or multiple
/// physical units). Never deduplicate it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Item {
    pub id: String,
    pub name: String,
    /// Unit price (price of one physical unit, not the line total)
    pub price: f64,
    /// Count of physical units
    pub quantity: i32,
    #[serde(default)]
    pub assigned_member_ids: Vec<String>,
    /// Explicit payer; `None` falls back to the bill's default payer
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paid_by: Option<String>,
    /// Exclude this item from service charge regardless of receipt settings
    #[serde(default)]
    pub exclude_service_charge: bool,
    /// Exclude this item from VAT regardless of receipt settings
    #[serde(default)]
    pub exclude_vat: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fixed_deductions: Vec<FixedDeduction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receipt_id: Option<String>,
}

impl Item {
    /// Pre-tax cost of the whole line (`price × quantity`)
    pub fn line_base(&self) -> f64 {
        self.price * self.quantity as f64
    }

    /// Number of assignment occurrences, counting duplicates
    pub fn assigned_share_count(&self) -> usize {
        self.assigned_member_ids.len()
    }
}

/// Item input - for adding items
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemInput {
    pub name: String,
    pub price: f64,
    pub quantity: i32,
    #[serde(default)]
    pub assigned_member_ids: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paid_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub receipt_id: String,
}

/// Item changes for modification (None = no change)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ItemChanges {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paid_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclude_service_charge: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclude_vat: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_tolerates_minimal_payload() {
        // Older saved bills carry neither assignments nor flags
        let item: Item = serde_json::from_str(
            r#"{"id":"i1","name":"ข้าวผัด","price":60.0,"quantity":2}"#,
        )
        .unwrap();
        assert_eq!(item.assigned_member_ids.len(), 0);
        assert!(!item.exclude_vat);
        assert!(item.fixed_deductions.is_empty());
        assert_eq!(item.line_base(), 120.0);
    }
}
