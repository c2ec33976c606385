//! Allocation phase: distribute each item's tax-inclusive cost
//!
//! Walks items in input order. For each item: credit the resolved payer
//! with the full line total, settle fixed deductions against the line,
//! then split the remainder by unit or share mode. Receipt-level running
//! totals recorded here feed the adjustment phase.

use std::collections::HashMap;

use shared::models::{Item, Member, Receipt};
use shared::summary::{MemberSummary, SummaryEntry};
use tracing::warn;

use crate::money::{AMOUNT_EPSILON, CostBreakdown};

/// How an item's (post-deduction) cost is distributed among assignees.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitMode {
    /// Each assignment occurrence claims one physical unit at the full
    /// unit cost; unclaimed units fall to the payer
    Unit,
    /// Cost divided evenly across assignment occurrences, ignoring
    /// quantity
    Share,
}

/// Classify an item's split mode.
///
/// Any fixed deduction, or more assignment occurrences than physical
/// units, forces share mode; the two modes are mutually exclusive.
pub fn classify_split(item: &Item) -> SplitMode {
    if !item.fixed_deductions.is_empty() || item.assigned_share_count() as i32 > item.quantity {
        SplitMode::Share
    } else {
        SplitMode::Unit
    }
}

/// Effective rates for an item under its receipt: the receipt rate,
/// zeroed by the receipt's exclusion flag, zeroed again by the item's
/// own flag. Item-level exclusion always wins.
pub(super) fn effective_rates(item: &Item, receipt: Option<&Receipt>) -> (f64, f64) {
    let receipt_sc = receipt.map(Receipt::effective_sc_rate).unwrap_or(0.0);
    let receipt_vat = receipt.map(Receipt::effective_vat_rate).unwrap_or(0.0);
    let sc_rate = if item.exclude_service_charge {
        0.0
    } else {
        receipt_sc
    };
    let vat_rate = if item.exclude_vat { 0.0 } else { receipt_vat };
    (sc_rate, vat_rate)
}

/// Per-receipt running totals recorded during allocation
struct ReceiptLedger {
    receipt_id: String,
    /// member id → recorded consumption, in first-credit order
    consumption: Vec<(String, f64)>,
    /// Tax-inclusive recorded total
    calculated_total: f64,
    /// Base-only recorded total
    subtotal: f64,
}

/// Accumulation state shared by the allocation and adjustment phases.
///
/// Summaries stay in member input order; every map that feeds ordered
/// output accumulates in first-seen order, never hash order.
pub(super) struct AllocationState {
    index: HashMap<String, usize>,
    summaries: Vec<MemberSummary>,
    default_payer: Option<String>,
    ledgers: Vec<ReceiptLedger>,
}

impl AllocationState {
    pub(super) fn new(members: &[Member], receipts: &[Receipt]) -> Self {
        let summaries: Vec<MemberSummary> =
            members.iter().map(MemberSummary::for_member).collect();
        let index = members
            .iter()
            .enumerate()
            .map(|(i, m)| (m.id.clone(), i))
            .collect();
        let default_payer = members
            .iter()
            .find(|m| m.is_payer)
            .or_else(|| members.first())
            .map(|m| m.id.clone());
        let ledgers = receipts
            .iter()
            .map(|r| ReceiptLedger {
                receipt_id: r.id.clone(),
                consumption: Vec::new(),
                calculated_total: 0.0,
                subtotal: 0.0,
            })
            .collect();
        Self {
            index,
            summaries,
            default_payer,
            ledgers,
        }
    }

    pub(super) fn knows(&self, member_id: &str) -> bool {
        self.index.contains_key(member_id)
    }

    pub(super) fn default_payer(&self) -> Option<&str> {
        self.default_payer.as_deref()
    }

    /// The item's explicit payer if it names a live member, else the
    /// bill's default payer, else `None`
    pub(super) fn resolve_payer(&self, item: &Item) -> Option<String> {
        item.paid_by
            .as_deref()
            .filter(|id| self.knows(id))
            .map(str::to_owned)
            .or_else(|| self.default_payer.clone())
    }

    fn summary_mut(&mut self, member_id: &str) -> Option<&mut MemberSummary> {
        let idx = self.index.get(member_id).copied()?;
        self.summaries.get_mut(idx)
    }

    pub(super) fn add_paid(&mut self, member_id: &str, amount: f64) {
        if let Some(s) = self.summary_mut(member_id) {
            s.total_paid += amount;
        }
    }

    pub(super) fn reduce_paid(&mut self, member_id: &str, amount: f64) {
        if let Some(s) = self.summary_mut(member_id) {
            s.total_paid -= amount;
        }
    }

    /// Credit a member with a consumption slice and its audit entry,
    /// mirroring the amount into the receipt's consumption ledger
    pub(super) fn add_consumption(
        &mut self,
        member_id: &str,
        cost: &CostBreakdown,
        label: String,
        receipt_id: Option<&str>,
    ) {
        let Some(s) = self.summary_mut(member_id) else {
            return;
        };
        s.base_consumption += cost.base;
        s.service_charge_share += cost.service_charge;
        s.vat_share += cost.vat;
        s.total_consumption += cost.total;
        s.items.push(SummaryEntry {
            name: label,
            share: cost.total,
        });
        if let Some(rid) = receipt_id {
            self.credit_receipt_consumption(rid, member_id, cost.total);
        }
    }

    /// Reduce a member's consumption (discount application); the audit
    /// entry carries a negative share
    pub(super) fn reduce_consumption(&mut self, member_id: &str, saving: f64, label: String) {
        if let Some(s) = self.summary_mut(member_id) {
            s.total_consumption -= saving;
            s.items.push(SummaryEntry {
                name: label,
                share: -saving,
            });
        }
    }

    /// Add a flat rounding share to a member's consumption
    pub(super) fn add_rounding(&mut self, member_id: &str, share: f64, label: String) {
        if let Some(s) = self.summary_mut(member_id) {
            s.total_consumption += share;
            s.items.push(SummaryEntry { name: label, share });
        }
    }

    fn credit_receipt_consumption(&mut self, receipt_id: &str, member_id: &str, amount: f64) {
        let Some(ledger) = self
            .ledgers
            .iter_mut()
            .find(|l| l.receipt_id == receipt_id)
        else {
            return;
        };
        match ledger
            .consumption
            .iter_mut()
            .find(|(m, _)| m.as_str() == member_id)
        {
            Some((_, total)) => *total += amount,
            None => ledger.consumption.push((member_id.to_string(), amount)),
        }
    }

    /// Bump a receipt's recorded totals; unknown receipts are not tracked
    pub(super) fn record_receipt_totals(&mut self, receipt_id: Option<&str>, total: f64, base: f64) {
        let Some(rid) = receipt_id else { return };
        if let Some(ledger) = self.ledgers.iter_mut().find(|l| l.receipt_id == rid) {
            ledger.calculated_total += total;
            ledger.subtotal += base;
        }
    }

    pub(super) fn receipt_calculated_total(&self, receipt_id: &str) -> f64 {
        self.ledgers
            .iter()
            .find(|l| l.receipt_id == receipt_id)
            .map(|l| l.calculated_total)
            .unwrap_or(0.0)
    }

    pub(super) fn reduce_receipt_calculated_total(&mut self, receipt_id: &str, amount: f64) {
        if let Some(ledger) = self.ledgers.iter_mut().find(|l| l.receipt_id == receipt_id) {
            ledger.calculated_total -= amount;
        }
    }

    /// Recorded (member, consumption) pairs for a receipt, in
    /// first-credit order
    pub(super) fn receipt_consumers(&self, receipt_id: &str) -> &[(String, f64)] {
        self.ledgers
            .iter()
            .find(|l| l.receipt_id == receipt_id)
            .map(|l| l.consumption.as_slice())
            .unwrap_or(&[])
    }

    /// Finalize: fill net balances, keeping member input order
    pub(super) fn into_summaries(self) -> Vec<MemberSummary> {
        let mut summaries = self.summaries;
        for s in &mut summaries {
            s.net_balance = s.total_paid - s.total_consumption;
        }
        summaries
    }
}

/// Run the allocation phase over every item, in input order
pub(super) fn allocate(
    members: &[Member],
    items: &[Item],
    receipts: &[Receipt],
) -> AllocationState {
    let mut state = AllocationState::new(members, receipts);
    for item in items {
        allocate_item(&mut state, item, receipts);
    }
    state
}

fn allocate_item(state: &mut AllocationState, item: &Item, receipts: &[Receipt]) {
    let receipt = item
        .receipt_id
        .as_deref()
        .and_then(|rid| receipts.iter().find(|r| r.id == rid));
    let (sc_rate, vat_rate) = effective_rates(item, receipt);
    let line = CostBreakdown::cascade(item.line_base(), sc_rate, vat_rate);
    let rid = receipt.map(|r| r.id.as_str());

    // The payer fronts the full line cost no matter who eats it
    let payer = state.resolve_payer(item);
    match &payer {
        Some(pid) => state.add_paid(pid, line.total),
        None => warn!(item = %item.name, "no payer resolvable, paid credit skipped"),
    }

    // Fixed deductions come off the line first. The claimed amount is
    // taken verbatim; its base/SC/VAT parts are pro-rated off the full
    // line.
    let mut remaining = line;
    let mut claimed = 0.0;
    for deduction in &item.fixed_deductions {
        if deduction.amount <= 0.0 || !state.knows(&deduction.member_id) {
            continue;
        }
        let fixed = line.fraction_for_amount(deduction.amount);
        state.add_consumption(
            &deduction.member_id,
            &fixed,
            format!("{} (ระบุยอด)", item.name),
            rid,
        );
        state.record_receipt_totals(rid, fixed.total, fixed.base);
        remaining = remaining.minus(&fixed);
        claimed += deduction.amount;
    }
    if claimed > line.total + AMOUNT_EPSILON {
        warn!(
            item = %item.name,
            claimed,
            line_total = line.total,
            "fixed deductions exceed line total, remainder clamped to zero"
        );
    }

    let shares = item.assigned_share_count();
    if shares > 0 {
        let has_fixed = !item.fixed_deductions.is_empty();
        let mode = classify_split(item);
        let per_share = match mode {
            SplitMode::Share => remaining.scale(1.0 / shares as f64),
            SplitMode::Unit => CostBreakdown::cascade(item.price, sc_rate, vat_rate),
        };

        // Receipt totals cover every occurrence, valid member or not
        state.record_receipt_totals(
            rid,
            per_share.total * shares as f64,
            per_share.base * shares as f64,
        );

        for (member_id, units) in occurrence_counts(&item.assigned_member_ids) {
            if !state.knows(member_id) {
                continue;
            }
            let cost = per_share.scale(units as f64);
            let label = if units > 1 {
                if has_fixed {
                    format!("{} (ส่วนแบ่ง x{})", item.name, units)
                } else {
                    format!("{} (x{})", item.name, units)
                }
            } else {
                item.name.clone()
            };
            state.add_consumption(member_id, &cost, label, rid);
        }

        // Unit mode only: units nobody claimed stay with the payer
        if mode == SplitMode::Unit && (shares as i32) < item.quantity {
            let leftover_units = item.quantity - shares as i32;
            let leftover = per_share.scale(leftover_units as f64);
            if let Some(pid) = &payer {
                state.add_consumption(
                    pid,
                    &leftover,
                    format!("{} (เหลือ x{})", item.name, leftover_units),
                    rid,
                );
            }
            state.record_receipt_totals(rid, leftover.total, leftover.base);
        }
    } else if remaining.total > AMOUNT_EPSILON {
        // Nobody assigned: the whole remainder sticks with the payer
        if let Some(pid) = &payer {
            state.add_consumption(
                pid,
                &remaining,
                format!("{} (ยังไม่ระบุ)", item.name),
                rid,
            );
        }
        state.record_receipt_totals(rid, remaining.total, remaining.base);
    }
}

/// Occurrences per member id in first-seen order (the multiset counts)
fn occurrence_counts(ids: &[String]) -> Vec<(&str, usize)> {
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for id in ids {
        match counts.iter_mut().find(|(m, _)| *m == id.as_str()) {
            Some((_, n)) => *n += 1,
            None => counts.push((id.as_str(), 1)),
        }
    }
    counts
}
