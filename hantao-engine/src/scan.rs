//! Scanned-receipt ingestion
//!
//! Converts one document-understanding result into an ordinary receipt
//! plus items on a [`Bill`]. The scanner is untrusted: zero-priced
//! lines are filtered, missing rates are defaulted, and a bad payload
//! rejects the whole scan leaving the bill untouched.

use shared::error::{BillError, BillResult};
use shared::models::{Item, Receipt};
use shared::scan::ScannedReceipt;
use shared::util::new_entity_id;
use tracing::warn;

use crate::bill::{Bill, DEFAULT_RECEIPT_ID};

/// VAT percent assumed when the scanner reports nothing (the Thai
/// standard rate); an explicit detected 0 means a net-price receipt
const DEFAULT_SCAN_VAT_RATE: f64 = 7.0;
/// Service-charge percent assumed when the scanner reports nothing
const DEFAULT_SCAN_SC_RATE: f64 = 0.0;

impl Bill {
    /// Ingest one scan result as a new receipt.
    ///
    /// All-or-nothing: any validation failure leaves the bill untouched,
    /// and independent scans never affect each other. The detected grand
    /// total, when present, becomes the receipt's manual total. Returns
    /// the new receipt's id.
    pub fn ingest_scan(
        &mut self,
        scan: &ScannedReceipt,
        override_payer: Option<&str>,
    ) -> BillResult<String> {
        // Validate the whole payload before touching any state
        if let Some(payer) = override_payer
            && !self.members.iter().any(|m| m.id == payer)
        {
            return Err(BillError::member_not_found(payer));
        }
        for value in [scan.grand_total, scan.vat_rate, scan.service_charge_rate]
            .into_iter()
            .flatten()
        {
            if !value.is_finite() {
                return Err(BillError::invalid_amount(
                    "scan payload contains a non-finite number",
                ));
            }
        }
        if scan.vat_rate.is_some_and(|r| r < 0.0)
            || scan.service_charge_rate.is_some_and(|r| r < 0.0)
        {
            return Err(BillError::invalid_amount("scan rates must not be negative"));
        }
        for scanned in &scan.items {
            if !scanned.price.is_finite() {
                return Err(BillError::invalid_amount(format!(
                    "scanned price for '{}' is not finite",
                    scanned.name
                )));
            }
        }

        let target_payer = override_payer
            .map(str::to_owned)
            .or_else(|| self.default_payer().map(|m| m.id.clone()))
            .or_else(|| self.members.first().map(|m| m.id.clone()));

        let vat_rate = scan.vat_rate.unwrap_or(DEFAULT_SCAN_VAT_RATE);
        let sc_rate = scan.service_charge_rate.unwrap_or(DEFAULT_SCAN_SC_RATE);

        self.scan_count += 1;
        let receipt_id = new_entity_id();
        let receipt = Receipt {
            id: receipt_id.clone(),
            name: format!("Scan {}", self.scan_count),
            sc_rate: Some(sc_rate),
            vat_rate: Some(vat_rate),
            exclude_service_charge: sc_rate == 0.0,
            exclude_vat: vat_rate == 0.0,
            discount_type: None,
            discount_value: None,
            manual_total: scan.grand_total,
        };

        let mut new_items = Vec::new();
        let mut dropped = 0usize;
        for scanned in &scan.items {
            // Zero-priced lines are recognition noise
            if scanned.price <= 0.0 {
                dropped += 1;
                continue;
            }
            new_items.push(Item {
                id: new_entity_id(),
                name: scanned.name.clone(),
                price: scanned.price,
                quantity: scanned.quantity.filter(|q| *q >= 1).unwrap_or(1),
                assigned_member_ids: Vec::new(),
                paid_by: target_payer.clone(),
                exclude_service_charge: false,
                exclude_vat: false,
                fixed_deductions: Vec::new(),
                note: None,
                receipt_id: Some(receipt_id.clone()),
            });
        }
        if dropped > 0 {
            warn!(dropped, receipt = %receipt.name, "discarded non-positive-priced scan lines");
        }

        // A pristine bill (only the untouched default receipt, no items)
        // is replaced by the scan rather than appended to
        if self.items.is_empty()
            && self.receipts.len() == 1
            && self.receipts[0].id == DEFAULT_RECEIPT_ID
        {
            self.receipts.clear();
        }
        self.receipts.push(receipt);
        self.items.extend(new_items);
        Ok(receipt_id)
    }
}

#[cfg(test)]
mod tests {
    use shared::models::MemberCreate;
    use shared::scan::{ScannedItem, ScannedReceipt};

    use super::*;

    fn scanned(name: &str, price: f64, quantity: Option<i32>) -> ScannedItem {
        ScannedItem {
            name: name.to_string(),
            price,
            quantity,
        }
    }

    fn bill_with_members() -> (Bill, String, String) {
        let mut bill = Bill::new("ทดสอบ");
        let a = bill.add_member(MemberCreate::named("กาย"));
        let b = bill.add_member(MemberCreate::named("ใบเฟิร์น"));
        (bill, a, b)
    }

    #[test]
    fn test_scan_replaces_pristine_default_receipt() {
        let (mut bill, payer, _) = bill_with_members();
        let scan = ScannedReceipt {
            items: vec![scanned("ข้าวมันไก่", 60.0, Some(2))],
            grand_total: Some(128.4),
            vat_rate: Some(7.0),
            service_charge_rate: None,
        };
        let rid = bill.ingest_scan(&scan, None).unwrap();

        assert_eq!(bill.receipts.len(), 1);
        assert_eq!(bill.receipts[0].id, rid);
        assert_eq!(bill.receipts[0].name, "Scan 1");
        assert_eq!(bill.receipts[0].manual_total, Some(128.4));
        assert_eq!(bill.items.len(), 1);
        assert_eq!(bill.items[0].paid_by.as_deref(), Some(payer.as_str()));
        assert_eq!(bill.items[0].quantity, 2);
    }

    #[test]
    fn test_scan_appends_once_bill_is_dirty() {
        let (mut bill, _, _) = bill_with_members();
        let scan = ScannedReceipt {
            items: vec![scanned("กาแฟ", 55.0, None)],
            ..ScannedReceipt::default()
        };
        bill.ingest_scan(&scan, None).unwrap();
        bill.ingest_scan(&scan, None).unwrap();

        assert_eq!(bill.receipts.len(), 2);
        assert_eq!(bill.receipts[1].name, "Scan 2");
        assert_eq!(bill.items.len(), 2);
    }

    #[test]
    fn test_scan_defaults_vat_and_flags_explicit_zero() {
        let (mut bill, _, _) = bill_with_members();

        // Rates missing entirely: VAT defaults to 7, SC to 0
        let rid = bill
            .ingest_scan(&ScannedReceipt::default(), None)
            .unwrap();
        let receipt = bill.receipts.iter().find(|r| r.id == rid).unwrap();
        assert_eq!(receipt.vat_rate, Some(7.0));
        assert!(!receipt.exclude_vat);
        assert_eq!(receipt.sc_rate, Some(0.0));
        assert!(receipt.exclude_service_charge);

        // Explicit zero VAT means a net-price receipt
        let scan = ScannedReceipt {
            vat_rate: Some(0.0),
            ..ScannedReceipt::default()
        };
        let rid = bill.ingest_scan(&scan, None).unwrap();
        let receipt = bill.receipts.iter().find(|r| r.id == rid).unwrap();
        assert_eq!(receipt.vat_rate, Some(0.0));
        assert!(receipt.exclude_vat);
    }

    #[test]
    fn test_scan_filters_non_positive_prices_and_defaults_quantity() {
        let (mut bill, _, _) = bill_with_members();
        let scan = ScannedReceipt {
            items: vec![
                scanned("น้ำเปล่า", 0.0, Some(1)),
                scanned("ส้มตำ", 80.0, Some(0)),
                scanned("ลาบหมู", -5.0, None),
            ],
            ..ScannedReceipt::default()
        };
        bill.ingest_scan(&scan, None).unwrap();

        assert_eq!(bill.items.len(), 1);
        assert_eq!(bill.items[0].name, "ส้มตำ");
        assert_eq!(bill.items[0].quantity, 1);
    }

    #[test]
    fn test_scan_override_payer() {
        let (mut bill, _, other) = bill_with_members();
        let scan = ScannedReceipt {
            items: vec![scanned("ชานม", 45.0, None)],
            ..ScannedReceipt::default()
        };
        bill.ingest_scan(&scan, Some(other.as_str())).unwrap();
        assert_eq!(bill.items[0].paid_by.as_deref(), Some(other.as_str()));
    }

    #[test]
    fn test_bad_scan_leaves_bill_untouched() {
        let (mut bill, _, _) = bill_with_members();
        let before = bill.clone();

        let err = bill
            .ingest_scan(&ScannedReceipt::default(), Some("ghost"))
            .unwrap_err();
        assert_eq!(err.code, shared::error::BillErrorCode::MemberNotFound);
        assert_eq!(bill, before);

        let scan = ScannedReceipt {
            items: vec![scanned("เบียร์", f64::NAN, None)],
            ..ScannedReceipt::default()
        };
        assert!(bill.ingest_scan(&scan, None).is_err());
        assert_eq!(bill, before);

        let scan = ScannedReceipt {
            vat_rate: Some(-7.0),
            ..ScannedReceipt::default()
        };
        assert!(bill.ingest_scan(&scan, None).is_err());
        assert_eq!(bill, before);
    }

    #[test]
    fn test_scan_with_no_members_leaves_items_payerless() {
        let mut bill = Bill::new("ว่าง");
        let scan = ScannedReceipt {
            items: vec![scanned("ข้าวผัด", 60.0, None)],
            ..ScannedReceipt::default()
        };
        bill.ingest_scan(&scan, None).unwrap();
        assert_eq!(bill.items[0].paid_by, None);
    }
}
