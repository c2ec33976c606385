//! Settlement phase: greedy transfer matching
//!
//! Largest debtor against largest creditor, two pointers, until one
//! side drains. Minimal for the debtor/creditor multiset under the
//! greedy strategy; deterministic for a given summary order.

use shared::summary::{MemberSummary, Transfer};

use crate::money::SETTLE_TOLERANCE;

/// Match debtors to creditors into a transfer list that drives every
/// net balance to within [`SETTLE_TOLERANCE`] of zero.
///
/// Members already within tolerance produce and receive nothing.
pub fn calculate_transfers(summaries: &[MemberSummary]) -> Vec<Transfer> {
    let mut debtors: Vec<(&MemberSummary, f64)> = summaries
        .iter()
        .filter(|s| s.net_balance < -SETTLE_TOLERANCE)
        .map(|s| (s, s.net_balance))
        .collect();
    // Most negative first
    debtors.sort_by(|a, b| a.1.total_cmp(&b.1));

    let mut creditors: Vec<(&MemberSummary, f64)> = summaries
        .iter()
        .filter(|s| s.net_balance > SETTLE_TOLERANCE)
        .map(|s| (s, s.net_balance))
        .collect();
    // Largest first
    creditors.sort_by(|a, b| b.1.total_cmp(&a.1));

    let mut transfers = Vec::new();
    let (mut i, mut j) = (0, 0);
    while i < debtors.len() && j < creditors.len() {
        let amount = debtors[i].1.abs().min(creditors[j].1);
        if amount > 0.0 {
            transfers.push(Transfer {
                from_id: debtors[i].0.member_id.clone(),
                from_name: debtors[i].0.member_name.clone(),
                to_id: creditors[j].0.member_id.clone(),
                to_name: creditors[j].0.member_name.clone(),
                amount,
            });
        }
        debtors[i].1 += amount;
        creditors[j].1 -= amount;
        if debtors[i].1.abs() < SETTLE_TOLERANCE {
            i += 1;
        }
        if creditors[j].1 < SETTLE_TOLERANCE {
            j += 1;
        }
    }
    transfers
}
