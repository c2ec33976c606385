//! Monetary helpers and boundary validation
//!
//! All arithmetic is plain `f64`; correctness rests on the two named
//! tolerances below rather than on exact representation. Validation
//! rejects malformed numbers at the ingestion boundary so the engine
//! itself never has to.

use shared::error::{BillError, BillResult};
use shared::models::{ItemChanges, ItemInput};

/// Amounts below this are treated as zero (floating-point noise guard)
pub const AMOUNT_EPSILON: f64 = 0.0001;

/// Balances within this of zero are considered settled (0.01 currency units)
pub const SETTLE_TOLERANCE: f64 = 0.01;

/// Maximum allowed unit price (฿1,000,000)
const MAX_PRICE: f64 = 1_000_000.0;
/// Maximum allowed quantity per item
const MAX_QUANTITY: i32 = 9999;

/// Compare two monetary values for equality (within settle tolerance)
pub fn money_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < SETTLE_TOLERANCE
}

/// Validate that a f64 value is finite (not NaN, not Infinity)
#[inline]
fn require_finite(value: f64, field_name: &str) -> BillResult<()> {
    if !value.is_finite() {
        return Err(BillError::invalid_amount(format!(
            "{} must be a finite number, got {}",
            field_name, value
        )));
    }
    Ok(())
}

/// Validate an ItemInput before it enters a bill
pub fn validate_item_input(input: &ItemInput) -> BillResult<()> {
    require_finite(input.price, "price")?;
    if input.price <= 0.0 {
        return Err(BillError::invalid_amount(format!(
            "price must be positive, got {}",
            input.price
        )));
    }
    if input.price > MAX_PRICE {
        return Err(BillError::invalid_amount(format!(
            "price exceeds maximum allowed ({}), got {}",
            MAX_PRICE, input.price
        )));
    }

    if input.quantity < 1 {
        return Err(BillError::invalid_quantity(format!(
            "quantity must be positive, got {}",
            input.quantity
        )));
    }
    if input.quantity > MAX_QUANTITY {
        return Err(BillError::invalid_quantity(format!(
            "quantity exceeds maximum allowed ({}), got {}",
            MAX_QUANTITY, input.quantity
        )));
    }

    Ok(())
}

/// Validate item changes (None fields are no-ops)
pub fn validate_item_changes(changes: &ItemChanges) -> BillResult<()> {
    if let Some(p) = changes.price {
        require_finite(p, "price")?;
        if p <= 0.0 {
            return Err(BillError::invalid_amount(format!(
                "price must be positive, got {}",
                p
            )));
        }
        if p > MAX_PRICE {
            return Err(BillError::invalid_amount(format!(
                "price exceeds maximum allowed ({}), got {}",
                MAX_PRICE, p
            )));
        }
    }

    if let Some(q) = changes.quantity {
        if q < 1 {
            return Err(BillError::invalid_quantity(format!(
                "quantity must be positive, got {}",
                q
            )));
        }
        if q > MAX_QUANTITY {
            return Err(BillError::invalid_quantity(format!(
                "quantity exceeds maximum allowed ({}), got {}",
                MAX_QUANTITY, q
            )));
        }
    }

    Ok(())
}

/// Validate a percent rate (service charge or VAT)
pub fn validate_rate_percent(rate: f64, field_name: &str) -> BillResult<()> {
    require_finite(rate, field_name)?;
    if rate < 0.0 {
        return Err(BillError::invalid_amount(format!(
            "{} must not be negative, got {}",
            field_name, rate
        )));
    }
    Ok(())
}

/// Validate a fixed-deduction amount (non-positive means "remove")
pub fn validate_deduction_amount(amount: f64) -> BillResult<()> {
    require_finite(amount, "deduction amount")?;
    if amount > MAX_PRICE {
        return Err(BillError::invalid_amount(format!(
            "deduction amount exceeds maximum allowed ({}), got {}",
            MAX_PRICE, amount
        )));
    }
    Ok(())
}

/// A monetary amount split into its tax-cascade components.
///
/// VAT applies to the service-charge-inclusive base, not the raw base:
/// `base` → `service_charge = base × sc%` → `vat = (base + sc) × vat%`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CostBreakdown {
    pub base: f64,
    pub service_charge: f64,
    pub vat: f64,
    pub total: f64,
}

impl CostBreakdown {
    /// Cascade a base amount through service charge, then VAT
    pub fn cascade(base: f64, sc_rate: f64, vat_rate: f64) -> Self {
        let service_charge = base * (sc_rate / 100.0);
        let vat = (base + service_charge) * (vat_rate / 100.0);
        Self {
            base,
            service_charge,
            vat,
            total: base + service_charge + vat,
        }
    }

    /// Scale every component by `factor`
    pub fn scale(&self, factor: f64) -> Self {
        Self {
            base: self.base * factor,
            service_charge: self.service_charge * factor,
            vat: self.vat * factor,
            total: self.total * factor,
        }
    }

    /// The slice of this cost that a fixed `amount` represents.
    ///
    /// Components are pro-rated by `amount / total`; `total` is the
    /// exact claimed amount, not the rounded product.
    pub fn fraction_for_amount(&self, amount: f64) -> Self {
        let ratio = if self.total > 0.0 {
            amount / self.total
        } else {
            0.0
        };
        Self {
            base: self.base * ratio,
            service_charge: self.service_charge * ratio,
            vat: self.vat * ratio,
            total: amount,
        }
    }

    /// Componentwise subtraction; `total` is clamped at zero when
    /// deductions exceed the line (over-allocation is absorbed, not an
    /// error)
    pub fn minus(&self, other: &Self) -> Self {
        let total = self.total - other.total;
        Self {
            base: self.base - other.base,
            service_charge: self.service_charge - other.service_charge,
            vat: self.vat - other.vat,
            total: if total < 0.0 { 0.0 } else { total },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {}, got {}",
            expected,
            actual
        );
    }

    #[test]
    fn test_cascade_vat_applies_after_service_charge() {
        // 100 base, SC 10%, VAT 7%: VAT is 7% of 110, not of 100
        let cost = CostBreakdown::cascade(100.0, 10.0, 7.0);
        assert_close(cost.base, 100.0);
        assert_close(cost.service_charge, 10.0);
        assert_close(cost.vat, 7.7);
        assert_close(cost.total, 117.7);
    }

    #[test]
    fn test_cascade_zero_rates() {
        let cost = CostBreakdown::cascade(250.0, 0.0, 0.0);
        assert_close(cost.total, 250.0);
        assert_close(cost.service_charge, 0.0);
        assert_close(cost.vat, 0.0);
    }

    #[test]
    fn test_fraction_for_amount_keeps_exact_total() {
        let line = CostBreakdown::cascade(300.0, 10.0, 7.0);
        let fixed = line.fraction_for_amount(100.0);
        assert_eq!(fixed.total, 100.0);
        // Components keep the cascade proportions
        let ratio = 100.0 / line.total;
        assert_close(fixed.base, 300.0 * ratio);
        assert_close(fixed.service_charge, 30.0 * ratio);
    }

    #[test]
    fn test_minus_clamps_total_at_zero() {
        let line = CostBreakdown::cascade(100.0, 0.0, 0.0);
        let over = line.fraction_for_amount(150.0);
        let remaining = line.minus(&over);
        assert_eq!(remaining.total, 0.0);
    }

    #[test]
    fn test_money_eq() {
        assert!(money_eq(100.0, 100.0));
        assert!(money_eq(100.004, 100.006));
        assert!(!money_eq(100.0, 100.02));
    }

    #[test]
    fn test_validate_item_input_bounds() {
        let mut input = ItemInput {
            name: "เป็ดย่าง".to_string(),
            price: 350.0,
            quantity: 1,
            assigned_member_ids: vec![],
            paid_by: None,
            note: None,
            receipt_id: "r1".to_string(),
        };
        assert!(validate_item_input(&input).is_ok());

        input.price = 0.0;
        assert!(validate_item_input(&input).is_err());
        input.price = f64::NAN;
        assert!(validate_item_input(&input).is_err());
        input.price = 2_000_000.0;
        assert!(validate_item_input(&input).is_err());

        input.price = 350.0;
        input.quantity = 0;
        assert!(validate_item_input(&input).is_err());
        input.quantity = 10_000;
        assert!(validate_item_input(&input).is_err());
    }
}
