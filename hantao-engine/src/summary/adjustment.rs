//! Adjustment phase: receipt discounts and manual-total rounding
//!
//! Discounts run for every receipt before any rounding does: the
//! rounding diff is measured against the discount-adjusted calculated
//! total.

use shared::models::{DiscountType, Item, Receipt};
use tracing::debug;

use super::allocation::{AllocationState, effective_rates};
use crate::money::{AMOUNT_EPSILON, CostBreakdown};

pub(super) fn apply_receipt_adjustments(
    state: &mut AllocationState,
    items: &[Item],
    receipts: &[Receipt],
) {
    for receipt in receipts {
        apply_discount(state, items, receipt);
    }
    for receipt in receipts {
        apply_manual_total(state, items, receipt);
    }
}

fn receipt_items<'a>(items: &'a [Item], receipt: &'a Receipt) -> impl Iterator<Item = &'a Item> {
    items
        .iter()
        .filter(move |i| i.receipt_id.as_deref() == Some(receipt.id.as_str()))
}

/// Gross totals for a receipt, recomputed independently from its items:
/// (base-only, tax-inclusive, per-payer tax-inclusive in first-seen
/// order). Must agree numerically with the allocation-phase ledger.
fn receipt_gross(
    state: &AllocationState,
    items: &[Item],
    receipt: &Receipt,
) -> (f64, f64, Vec<(String, f64)>) {
    let mut gross_base = 0.0;
    let mut gross_with_tax = 0.0;
    let mut payer_gross: Vec<(String, f64)> = Vec::new();
    for item in receipt_items(items, receipt) {
        let (sc_rate, vat_rate) = effective_rates(item, Some(receipt));
        let line = CostBreakdown::cascade(item.line_base(), sc_rate, vat_rate);
        gross_base += line.base;
        gross_with_tax += line.total;
        if let Some(pid) = state.resolve_payer(item) {
            match payer_gross.iter_mut().find(|(p, _)| *p == pid) {
                Some((_, total)) => *total += line.total,
                None => payer_gross.push((pid, line.total)),
            }
        }
    }
    (gross_base, gross_with_tax, payer_gross)
}

fn apply_discount(state: &mut AllocationState, items: &[Item], receipt: &Receipt) {
    let discount_value = receipt.discount_value.unwrap_or(0.0);
    if discount_value <= 0.0 {
        return;
    }
    let (gross_base, gross_with_tax, payer_gross) = receipt_gross(state, items, receipt);
    if gross_with_tax <= 0.0 {
        return;
    }

    let discount_base = match receipt.discount_type {
        Some(DiscountType::Percent) => gross_base * (discount_value / 100.0),
        _ => discount_value,
    };
    // The discount grosses up through the same SC → VAT cascade as the
    // line items it offsets
    let saving = CostBreakdown::cascade(
        discount_base,
        receipt.effective_sc_rate(),
        receipt.effective_vat_rate(),
    );
    let total_saving = saving.total;

    // Consumers give back proportionally to their recorded share of the
    // receipt
    let recorded_total = state.receipt_calculated_total(&receipt.id);
    if recorded_total > 0.0 {
        let consumers: Vec<(String, f64)> = state.receipt_consumers(&receipt.id).to_vec();
        for (member_id, consumption) in &consumers {
            let member_saving = total_saving * (consumption / recorded_total);
            state.reduce_consumption(member_id, member_saving, format!("ส่วนลด ({})", receipt.name));
        }
        state.reduce_receipt_calculated_total(&receipt.id, total_saving);
    }

    // Payers are treated as having fronted proportionally less, keeping
    // paid/consumed balances self-consistent per receipt
    for (payer_id, gross_paid) in payer_gross {
        state.reduce_paid(&payer_id, total_saving * (gross_paid / gross_with_tax));
    }

    debug!(receipt = %receipt.name, total_saving, "applied receipt discount");
}

fn apply_manual_total(state: &mut AllocationState, items: &[Item], receipt: &Receipt) {
    let Some(manual_total) = receipt.manual_total else {
        return;
    };
    let calculated = state.receipt_calculated_total(&receipt.id);
    let diff = manual_total - calculated;
    if diff.abs() <= AMOUNT_EPSILON {
        return;
    }

    // Everyone with real consumption on the receipt absorbs an even
    // slice of the difference
    let consumers: Vec<String> = state
        .receipt_consumers(&receipt.id)
        .iter()
        .filter(|(_, amount)| amount.abs() > AMOUNT_EPSILON)
        .map(|(member_id, _)| member_id.clone())
        .collect();
    if consumers.is_empty() {
        return;
    }
    let share = diff / consumers.len() as f64;
    for member_id in &consumers {
        state.add_rounding(member_id, share, format!("Rounding ({})", receipt.name));
    }

    // The whole diff flows to the dominant payer: whoever fronted the
    // largest base cost on this receipt (not split proportionally)
    let mut payer_base: Vec<(String, f64)> = Vec::new();
    for item in receipt_items(items, receipt) {
        if let Some(pid) = state.resolve_payer(item) {
            match payer_base.iter_mut().find(|(p, _)| *p == pid) {
                Some((_, base)) => *base += item.line_base(),
                None => payer_base.push((pid, item.line_base())),
            }
        }
    }
    let mut dominant = state.default_payer().map(str::to_owned);
    let mut max_base = -1.0;
    for (payer_id, base) in &payer_base {
        if *base > max_base {
            max_base = *base;
            dominant = Some(payer_id.clone());
        }
    }
    if let Some(payer_id) = dominant {
        state.add_paid(&payer_id, diff);
    }

    debug!(receipt = %receipt.name, diff, "applied manual-total rounding");
}
