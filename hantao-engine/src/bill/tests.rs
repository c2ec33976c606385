use shared::error::BillErrorCode;
use shared::models::{DiscountType, ItemChanges, ItemInput, MemberCreate};

use super::*;

fn input(name: &str, price: f64, quantity: i32, receipt_id: &str) -> ItemInput {
    ItemInput {
        name: name.to_string(),
        price,
        quantity,
        assigned_member_ids: Vec::new(),
        paid_by: None,
        note: None,
        receipt_id: receipt_id.to_string(),
    }
}

// ============================================================================
// Members
// ============================================================================

#[test]
fn test_new_bill_seeds_default_receipt() {
    let bill = Bill::new("บิลใหม่");
    assert_eq!(bill.receipts.len(), 1);
    assert_eq!(bill.receipts[0].id, DEFAULT_RECEIPT_ID);
    assert_eq!(bill.receipts[0].name, DEFAULT_RECEIPT_NAME);
    assert_eq!(bill.receipts[0].effective_sc_rate(), 0.0);
    assert_eq!(bill.receipts[0].effective_vat_rate(), 0.0);
}

#[test]
fn test_first_member_becomes_default_payer() {
    let mut bill = Bill::new("บิล");
    let first = bill.add_member(MemberCreate::named("หนึ่ง"));
    let second = bill.add_member(MemberCreate::named("สอง"));

    assert_eq!(bill.default_payer().map(|m| m.id.clone()), Some(first));
    let second_member = bill.members.iter().find(|m| m.id == second).unwrap();
    assert!(!second_member.is_payer);
}

#[test]
fn test_remove_payer_hands_flag_to_first_remaining() {
    let mut bill = Bill::new("บิล");
    let a = bill.add_member(MemberCreate::named("เอ"));
    let b = bill.add_member(MemberCreate::named("บี"));
    bill.add_member(MemberCreate::named("ซี"));

    bill.remove_member(&a).unwrap();

    assert_eq!(bill.default_payer().map(|m| m.id.clone()), Some(b));
}

#[test]
fn test_remove_member_cascades_into_items() {
    let mut bill = Bill::new("บิล");
    let a = bill.add_member(MemberCreate::named("เอ"));
    let b = bill.add_member(MemberCreate::named("บี"));
    let c = bill.add_member(MemberCreate::named("ซี"));

    let item_id = bill
        .add_item(input("หมึกย่าง", 120.0, 1, DEFAULT_RECEIPT_ID))
        .unwrap();
    bill.assign_member(&item_id, &b).unwrap();
    bill.assign_member(&item_id, &b).unwrap();
    bill.assign_member(&item_id, &c).unwrap();
    bill.update_item(
        &item_id,
        ItemChanges {
            paid_by: Some(b.clone()),
            ..ItemChanges::default()
        },
    )
    .unwrap();

    bill.remove_member(&b).unwrap();

    let item = &bill.items[0];
    assert_eq!(item.assigned_member_ids, vec![c.clone()]);
    // Explicit payer fell back to the default payer, not just any member
    assert_eq!(item.paid_by.as_deref(), Some(a.as_str()));
}

#[test]
fn test_remove_last_member_leaves_no_payer() {
    let mut bill = Bill::new("บิล");
    let only = bill.add_member(MemberCreate::named("เดี่ยว"));
    let item_id = bill
        .add_item(input("ข้าวต้ม", 40.0, 1, DEFAULT_RECEIPT_ID))
        .unwrap();
    bill.update_item(
        &item_id,
        ItemChanges {
            paid_by: Some(only.clone()),
            ..ItemChanges::default()
        },
    )
    .unwrap();

    bill.remove_member(&only).unwrap();

    assert!(bill.default_payer().is_none());
    assert_eq!(bill.items[0].paid_by, None);
}

#[test]
fn test_remove_unknown_member_errors() {
    let mut bill = Bill::new("บิล");
    let err = bill.remove_member("ghost").unwrap_err();
    assert_eq!(err.code, BillErrorCode::MemberNotFound);
}

#[test]
fn test_prompt_pay_lands_on_current_payer() {
    let mut bill = Bill::new("บิล");
    bill.add_member(MemberCreate::named("เอ"));
    bill.add_member(MemberCreate::named("บี"));

    bill.set_payer_prompt_pay(Some("089-999-9999".to_string()));

    let payer = bill.default_payer().unwrap();
    assert_eq!(payer.prompt_pay_id.as_deref(), Some("089-999-9999"));
}

// ============================================================================
// Receipts
// ============================================================================

#[test]
fn test_new_receipts_start_at_zero_rates() {
    let mut bill = Bill::new("บิล");
    let rid = bill.add_receipt("ร้านใหม่");
    let receipt = bill.receipts.iter().find(|r| r.id == rid).unwrap();
    assert_eq!(receipt.sc_rate, Some(0.0));
    assert_eq!(receipt.vat_rate, Some(0.0));
    assert_eq!(receipt.discount_type, Some(DiscountType::Percent));
    assert_eq!(receipt.discount_value, Some(0.0));
}

#[test]
fn test_update_receipt_settings_restores_standard_rates() {
    let mut bill = Bill::new("บิล");
    let rid = bill.add_receipt("ร้าน");
    bill.update_receipt_total(&rid, Some(500.0)).unwrap();

    // Re-enabling taxes on zero rates bumps them to the standard 10/7
    // and invalidates the manual total
    bill.update_receipt_settings(&rid, false, false).unwrap();

    let receipt = bill.receipts.iter().find(|r| r.id == rid).unwrap();
    assert_eq!(receipt.sc_rate, Some(10.0));
    assert_eq!(receipt.vat_rate, Some(7.0));
    assert_eq!(receipt.manual_total, None);

    // Excluding keeps the configured rates untouched
    bill.update_receipt_settings(&rid, true, true).unwrap();
    let receipt = bill.receipts.iter().find(|r| r.id == rid).unwrap();
    assert_eq!(receipt.sc_rate, Some(10.0));
    assert!(receipt.exclude_service_charge);
    assert_eq!(receipt.effective_sc_rate(), 0.0);
}

#[test]
fn test_remove_receipt_cascades_items() {
    let mut bill = Bill::new("บิล");
    bill.add_member(MemberCreate::named("เอ"));
    let rid = bill.add_receipt("ร้านสอง");
    bill.add_item(input("ของร้านแรก", 50.0, 1, DEFAULT_RECEIPT_ID))
        .unwrap();
    bill.add_item(input("ของร้านสอง", 60.0, 1, &rid)).unwrap();

    bill.remove_receipt(&rid).unwrap();

    assert_eq!(bill.items.len(), 1);
    assert_eq!(bill.items[0].name, "ของร้านแรก");
    assert_eq!(bill.receipts.len(), 1);
}

#[test]
fn test_removing_last_receipt_reseeds_default() {
    let mut bill = Bill::new("บิล");
    bill.remove_receipt(DEFAULT_RECEIPT_ID).unwrap();

    assert_eq!(bill.receipts.len(), 1);
    assert_eq!(bill.receipts[0].id, DEFAULT_RECEIPT_ID);
}

#[test]
fn test_receipt_validation_errors() {
    let mut bill = Bill::new("บิล");
    assert_eq!(
        bill.update_receipt_name("ghost", "x").unwrap_err().code,
        BillErrorCode::ReceiptNotFound
    );
    assert_eq!(
        bill.update_receipt_rates(DEFAULT_RECEIPT_ID, -5.0, 7.0)
            .unwrap_err()
            .code,
        BillErrorCode::InvalidAmount
    );
    assert_eq!(
        bill.update_receipt_discount(DEFAULT_RECEIPT_ID, DiscountType::Percent, f64::NAN)
            .unwrap_err()
            .code,
        BillErrorCode::InvalidAmount
    );
}

// ============================================================================
// Items
// ============================================================================

#[test]
fn test_add_item_validates_boundaries() {
    let mut bill = Bill::new("บิล");
    bill.add_member(MemberCreate::named("เอ"));

    assert_eq!(
        bill.add_item(input("x", 50.0, 1, "ghost")).unwrap_err().code,
        BillErrorCode::ReceiptNotFound
    );
    assert_eq!(
        bill.add_item(input("x", 0.0, 1, DEFAULT_RECEIPT_ID))
            .unwrap_err()
            .code,
        BillErrorCode::InvalidAmount
    );
    assert_eq!(
        bill.add_item(input("x", 50.0, 0, DEFAULT_RECEIPT_ID))
            .unwrap_err()
            .code,
        BillErrorCode::InvalidQuantity
    );

    let mut bad_payer = input("x", 50.0, 1, DEFAULT_RECEIPT_ID);
    bad_payer.paid_by = Some("ghost".to_string());
    assert_eq!(
        bill.add_item(bad_payer).unwrap_err().code,
        BillErrorCode::MemberNotFound
    );
}

#[test]
fn test_unassign_removes_last_occurrence_only() {
    let mut bill = Bill::new("บิล");
    let a = bill.add_member(MemberCreate::named("เอ"));
    let b = bill.add_member(MemberCreate::named("บี"));
    let item_id = bill
        .add_item(input("ชาบู", 299.0, 1, DEFAULT_RECEIPT_ID))
        .unwrap();
    bill.assign_member(&item_id, &a).unwrap();
    bill.assign_member(&item_id, &b).unwrap();
    bill.assign_member(&item_id, &a).unwrap();

    bill.unassign_member(&item_id, &a).unwrap();

    assert_eq!(bill.items[0].assigned_member_ids, vec![a.clone(), b.clone()]);

    // Unassigning someone not on the list is a quiet no-op
    bill.unassign_member(&item_id, "ghost").unwrap();
    assert_eq!(bill.items[0].assigned_member_ids.len(), 2);
}

#[test]
fn test_assign_all_replaces_multiset() {
    let mut bill = Bill::new("บิล");
    let a = bill.add_member(MemberCreate::named("เอ"));
    let b = bill.add_member(MemberCreate::named("บี"));
    let item_id = bill
        .add_item(input("หมูกระทะ", 199.0, 1, DEFAULT_RECEIPT_ID))
        .unwrap();
    bill.assign_member(&item_id, &a).unwrap();
    bill.assign_member(&item_id, &a).unwrap();

    bill.assign_all(&item_id).unwrap();

    assert_eq!(bill.items[0].assigned_member_ids, vec![a, b]);
}

#[test]
fn test_fixed_deduction_upsert_and_remove() {
    let mut bill = Bill::new("บิล");
    let a = bill.add_member(MemberCreate::named("เอ"));
    let item_id = bill
        .add_item(input("ทะเลเผา", 500.0, 1, DEFAULT_RECEIPT_ID))
        .unwrap();

    bill.set_fixed_deduction(&item_id, &a, 100.0).unwrap();
    bill.set_fixed_deduction(&item_id, &a, 150.0).unwrap();
    assert_eq!(bill.items[0].fixed_deductions.len(), 1);
    assert_eq!(bill.items[0].fixed_deductions[0].amount, 150.0);

    // Non-positive amount clears the claim
    bill.set_fixed_deduction(&item_id, &a, 0.0).unwrap();
    assert!(bill.items[0].fixed_deductions.is_empty());
}

#[test]
fn test_update_item_applies_partial_changes() {
    let mut bill = Bill::new("บิล");
    bill.add_member(MemberCreate::named("เอ"));
    let item_id = bill
        .add_item(input("ข้าวซอย", 70.0, 1, DEFAULT_RECEIPT_ID))
        .unwrap();

    bill.update_item(
        &item_id,
        ItemChanges {
            price: Some(75.0),
            exclude_vat: Some(true),
            ..ItemChanges::default()
        },
    )
    .unwrap();

    let item = &bill.items[0];
    assert_eq!(item.price, 75.0);
    assert!(item.exclude_vat);
    assert_eq!(item.name, "ข้าวซอย");
    assert_eq!(item.quantity, 1);
}

// ============================================================================
// Whole-bill behavior
// ============================================================================

#[test]
fn test_demo_bill_shape_and_total() {
    let bill = Bill::demo().unwrap();

    assert_eq!(bill.members.len(), 5);
    assert_eq!(bill.receipts.len(), 3);
    assert_eq!(bill.items.len(), 9);
    assert_eq!(bill.default_payer().map(|m| m.name.as_str()), Some("นัท (คนจ่าย)"));

    // 1177.00 (MK) + 695.50 (cafe) + 2235.123 (bar after discount)
    assert!((bill.grand_total() - 4107.623).abs() < 0.01);
}

#[test]
fn test_summary_covers_every_member() {
    let bill = Bill::demo().unwrap();
    let output = bill.summary();
    assert_eq!(output.summaries.len(), bill.members.len());
    for (summary, member) in output.summaries.iter().zip(&bill.members) {
        assert_eq!(summary.member_id, member.id);
    }
}

#[test]
fn test_bill_serde_round_trip() {
    let bill = Bill::demo().unwrap();
    let json = serde_json::to_string(&bill).unwrap();
    let back: Bill = serde_json::from_str(&json).unwrap();
    assert_eq!(bill, back);
}
