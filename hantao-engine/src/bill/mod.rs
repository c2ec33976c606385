//! Bill aggregate
//!
//! In-memory members/receipts/items state with the lifecycle rules the
//! calculator relies on: default-payer hand-off, cascading removals,
//! assignment toggling, and fixed-deduction upserts. Mutations validate
//! at the boundary; reads feed the pure summary engine.

mod demo;

use serde::{Deserialize, Serialize};
use shared::error::{BillError, BillResult};
use shared::models::{
    BillConfig, DiscountType, FixedDeduction, Item, ItemChanges, ItemInput, Member, MemberCreate,
    Receipt,
};
use shared::types::Timestamp;
use shared::util::{new_entity_id, now_millis};

use crate::money;
use crate::summary::{SummaryOutput, calculate_summary};

/// Id of the synthetic receipt every new bill starts with
pub const DEFAULT_RECEIPT_ID: &str = "manual-default";
/// Display name of the synthetic default receipt
pub const DEFAULT_RECEIPT_NAME: &str = "บิล / ร้านค้า";

/// A bill being edited: participants, receipts, and purchased lines.
///
/// Invariants: a bill always holds at least one receipt; at most one
/// member carries the default-payer flag.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Bill {
    pub name: String,
    /// Creation time (Unix milliseconds), stamped for saved-bill lists
    #[serde(default)]
    pub created_at: Timestamp,
    #[serde(default)]
    pub members: Vec<Member>,
    #[serde(default)]
    pub receipts: Vec<Receipt>,
    #[serde(default)]
    pub items: Vec<Item>,
    #[serde(default)]
    pub config: BillConfig,
    /// Number of scanned receipts ingested so far (drives "Scan N" names)
    #[serde(default)]
    pub scan_count: u32,
}

impl Bill {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            created_at: now_millis(),
            members: Vec::new(),
            receipts: vec![Receipt::named(DEFAULT_RECEIPT_ID, DEFAULT_RECEIPT_NAME)],
            items: Vec::new(),
            config: BillConfig::default(),
            scan_count: 0,
        }
    }

    // ========== Members ==========

    /// Add a member; the first member added becomes the default payer.
    /// Returns the new member's id.
    pub fn add_member(&mut self, create: MemberCreate) -> String {
        let id = new_entity_id();
        self.members.push(Member {
            id: id.clone(),
            name: create.name,
            is_payer: self.members.is_empty(),
            prompt_pay_id: create.prompt_pay_id,
        });
        id
    }

    /// Remove a member.
    ///
    /// Cascades: the default-payer flag hands off to the first remaining
    /// member, the id disappears from every assignment multiset, and
    /// items the member explicitly paid for fall back to the new default
    /// payer.
    pub fn remove_member(&mut self, member_id: &str) -> BillResult<()> {
        let Some(pos) = self.members.iter().position(|m| m.id == member_id) else {
            return Err(BillError::member_not_found(member_id));
        };
        let removed = self.members.remove(pos);
        if removed.is_payer
            && let Some(first) = self.members.first_mut()
        {
            first.is_payer = true;
        }

        let fallback = self.default_payer().map(|m| m.id.clone());
        for item in &mut self.items {
            item.assigned_member_ids.retain(|id| id != member_id);
            if item.paid_by.as_deref() == Some(member_id) {
                item.paid_by = fallback.clone();
            }
        }
        Ok(())
    }

    /// Current default payer
    pub fn default_payer(&self) -> Option<&Member> {
        self.members.iter().find(|m| m.is_payer)
    }

    /// Update the payout identifier on the current default payer
    pub fn set_payer_prompt_pay(&mut self, prompt_pay_id: Option<String>) {
        if let Some(payer) = self.members.iter_mut().find(|m| m.is_payer) {
            payer.prompt_pay_id = prompt_pay_id;
        }
    }

    // ========== Receipts ==========

    /// Add a receipt. New receipts start at zero rates with an empty
    /// percent discount. Returns the new receipt's id.
    pub fn add_receipt(&mut self, name: impl Into<String>) -> String {
        let id = new_entity_id();
        let mut receipt = Receipt::named(id.clone(), name);
        receipt.discount_type = Some(DiscountType::Percent);
        receipt.discount_value = Some(0.0);
        self.receipts.push(receipt);
        id
    }

    fn receipt_mut(&mut self, receipt_id: &str) -> BillResult<&mut Receipt> {
        self.receipts
            .iter_mut()
            .find(|r| r.id == receipt_id)
            .ok_or_else(|| BillError::receipt_not_found(receipt_id))
    }

    pub fn update_receipt_name(
        &mut self,
        receipt_id: &str,
        name: impl Into<String>,
    ) -> BillResult<()> {
        self.receipt_mut(receipt_id)?.name = name.into();
        Ok(())
    }

    pub fn update_receipt_rates(
        &mut self,
        receipt_id: &str,
        sc_rate: f64,
        vat_rate: f64,
    ) -> BillResult<()> {
        money::validate_rate_percent(sc_rate, "service charge rate")?;
        money::validate_rate_percent(vat_rate, "VAT rate")?;
        let receipt = self.receipt_mut(receipt_id)?;
        receipt.sc_rate = Some(sc_rate);
        receipt.vat_rate = Some(vat_rate);
        Ok(())
    }

    pub fn update_receipt_discount(
        &mut self,
        receipt_id: &str,
        discount_type: DiscountType,
        value: f64,
    ) -> BillResult<()> {
        if !value.is_finite() || value < 0.0 {
            return Err(BillError::invalid_amount(format!(
                "discount value must be a non-negative number, got {}",
                value
            )));
        }
        let receipt = self.receipt_mut(receipt_id)?;
        receipt.discount_type = Some(discount_type);
        receipt.discount_value = Some(value);
        Ok(())
    }

    /// Set or clear the manually-entered true total
    pub fn update_receipt_total(
        &mut self,
        receipt_id: &str,
        manual_total: Option<f64>,
    ) -> BillResult<()> {
        if let Some(total) = manual_total
            && !total.is_finite()
        {
            return Err(BillError::invalid_amount(
                "manual total must be a finite number",
            ));
        }
        self.receipt_mut(receipt_id)?.manual_total = manual_total;
        Ok(())
    }

    /// Toggle tax exclusions. Re-enabling a tax whose rate sits at zero
    /// restores the standard rate (SC 10%, VAT 7%); any manual total is
    /// cleared because the computed total it corrected has changed
    /// meaning.
    pub fn update_receipt_settings(
        &mut self,
        receipt_id: &str,
        exclude_service_charge: bool,
        exclude_vat: bool,
    ) -> BillResult<()> {
        let receipt = self.receipt_mut(receipt_id)?;
        if !exclude_service_charge && receipt.sc_rate == Some(0.0) {
            receipt.sc_rate = Some(10.0);
        }
        if !exclude_vat && receipt.vat_rate == Some(0.0) {
            receipt.vat_rate = Some(7.0);
        }
        receipt.exclude_service_charge = exclude_service_charge;
        receipt.exclude_vat = exclude_vat;
        receipt.manual_total = None;
        Ok(())
    }

    /// Remove a receipt and every item on it. A bill keeps at least one
    /// receipt: removing the last one re-seeds the synthetic default.
    pub fn remove_receipt(&mut self, receipt_id: &str) -> BillResult<()> {
        let Some(pos) = self.receipts.iter().position(|r| r.id == receipt_id) else {
            return Err(BillError::receipt_not_found(receipt_id));
        };
        self.receipts.remove(pos);
        self.items
            .retain(|i| i.receipt_id.as_deref() != Some(receipt_id));
        if self.receipts.is_empty() {
            self.receipts
                .push(Receipt::named(DEFAULT_RECEIPT_ID, DEFAULT_RECEIPT_NAME));
        }
        Ok(())
    }

    // ========== Items ==========

    /// Add a validated item to one of the bill's receipts. Returns the
    /// new item's id.
    pub fn add_item(&mut self, input: ItemInput) -> BillResult<String> {
        money::validate_item_input(&input)?;
        if !self.receipts.iter().any(|r| r.id == input.receipt_id) {
            return Err(BillError::receipt_not_found(&input.receipt_id));
        }
        if let Some(paid_by) = &input.paid_by
            && !self.members.iter().any(|m| m.id == *paid_by)
        {
            return Err(BillError::member_not_found(paid_by));
        }
        let id = new_entity_id();
        self.items.push(Item {
            id: id.clone(),
            name: input.name,
            price: input.price,
            quantity: input.quantity,
            assigned_member_ids: input.assigned_member_ids,
            paid_by: input.paid_by,
            exclude_service_charge: false,
            exclude_vat: false,
            fixed_deductions: Vec::new(),
            note: input.note,
            receipt_id: Some(input.receipt_id),
        });
        Ok(id)
    }

    fn item_mut(&mut self, item_id: &str) -> BillResult<&mut Item> {
        self.items
            .iter_mut()
            .find(|i| i.id == item_id)
            .ok_or_else(|| BillError::item_not_found(item_id))
    }

    pub fn remove_item(&mut self, item_id: &str) -> BillResult<()> {
        let Some(pos) = self.items.iter().position(|i| i.id == item_id) else {
            return Err(BillError::item_not_found(item_id));
        };
        self.items.remove(pos);
        Ok(())
    }

    pub fn update_item(&mut self, item_id: &str, changes: ItemChanges) -> BillResult<()> {
        money::validate_item_changes(&changes)?;
        if let Some(paid_by) = &changes.paid_by
            && !self.members.iter().any(|m| m.id == *paid_by)
        {
            return Err(BillError::member_not_found(paid_by));
        }
        let item = self.item_mut(item_id)?;
        if let Some(name) = changes.name {
            item.name = name;
        }
        if let Some(price) = changes.price {
            item.price = price;
        }
        if let Some(quantity) = changes.quantity {
            item.quantity = quantity;
        }
        if let Some(paid_by) = changes.paid_by {
            item.paid_by = Some(paid_by);
        }
        if let Some(flag) = changes.exclude_service_charge {
            item.exclude_service_charge = flag;
        }
        if let Some(flag) = changes.exclude_vat {
            item.exclude_vat = flag;
        }
        if let Some(note) = changes.note {
            item.note = Some(note);
        }
        Ok(())
    }

    /// Append one assignment occurrence. Assigning past `quantity` is
    /// allowed and flips the item into share mode.
    pub fn assign_member(&mut self, item_id: &str, member_id: &str) -> BillResult<()> {
        if !self.members.iter().any(|m| m.id == member_id) {
            return Err(BillError::member_not_found(member_id));
        }
        self.item_mut(item_id)?
            .assigned_member_ids
            .push(member_id.to_string());
        Ok(())
    }

    /// Remove the last occurrence of a member from the assignment
    /// multiset; a no-op when the member is not assigned
    pub fn unassign_member(&mut self, item_id: &str, member_id: &str) -> BillResult<()> {
        let item = self.item_mut(item_id)?;
        if let Some(pos) = item
            .assigned_member_ids
            .iter()
            .rposition(|id| id == member_id)
        {
            item.assigned_member_ids.remove(pos);
        }
        Ok(())
    }

    /// Assign every member once, replacing the current multiset (the
    /// "split equally" shortcut)
    pub fn assign_all(&mut self, item_id: &str) -> BillResult<()> {
        let everyone: Vec<String> = self.members.iter().map(|m| m.id.clone()).collect();
        self.item_mut(item_id)?.assigned_member_ids = everyone;
        Ok(())
    }

    /// Upsert a member's fixed "I pay exactly this much" claim on an
    /// item; a non-positive amount removes the claim
    pub fn set_fixed_deduction(
        &mut self,
        item_id: &str,
        member_id: &str,
        amount: f64,
    ) -> BillResult<()> {
        money::validate_deduction_amount(amount)?;
        if !self.members.iter().any(|m| m.id == member_id) {
            return Err(BillError::member_not_found(member_id));
        }
        let item = self.item_mut(item_id)?;
        item.fixed_deductions.retain(|d| d.member_id != member_id);
        if amount > 0.0 {
            item.fixed_deductions.push(FixedDeduction {
                member_id: member_id.to_string(),
                amount,
            });
        }
        Ok(())
    }

    // ========== Summary ==========

    /// Run the settlement engine over the current state
    pub fn summary(&self) -> SummaryOutput {
        calculate_summary(&self.members, &self.items, &self.receipts, &self.config)
    }

    /// Total of everyone's post-tax, post-discount consumption
    pub fn grand_total(&self) -> f64 {
        self.summary()
            .summaries
            .iter()
            .map(|s| s.total_consumption)
            .sum()
    }
}

#[cfg(test)]
mod tests;
