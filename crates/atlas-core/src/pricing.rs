//! # Pricing Calculator
//!
//! Turns priced cart lines plus the two charge settings into an order's
//! monetary breakdown.
//!
//! ## Formula
//! ```text
//! line_subtotal  = (unit_price - round(unit_price × line_discount)) × quantity
//! subtotal       = Σ line_subtotal
//! service_charge = round((subtotal - discount) × service_charge_rate)
//! tax            = round((subtotal - discount + service_charge) × tax_rate)
//! total          = subtotal - discount + service_charge + tax
//! change         = payment - total            (must be >= 0)
//! ```
//!
//! `round` is half away from zero to the minor unit ([`Money::percent_of`]).

use std::fmt;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::{Money, Percentage};

/// One cart line joined against the product's current price and discount.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricedLine {
    pub product_id: i64,
    pub product_name: String,
    pub unit_price: Money,
    pub discount_rate: Percentage,
    pub quantity: i64,
    pub notes: Option<String>,
}

impl PricedLine {
    pub fn new(
        product_id: i64,
        product_name: impl Into<String>,
        unit_price: Money,
        discount_rate: Percentage,
        quantity: i64,
    ) -> Self {
        PricedLine {
            product_id,
            product_name: product_name.into(),
            unit_price,
            discount_rate,
            quantity,
            notes: None,
        }
    }

    pub fn with_notes(mut self, notes: Option<String>) -> Self {
        self.notes = notes;
        self
    }

    /// Unit price after the line discount.
    pub fn net_unit_price(&self) -> Money {
        self.unit_price.apply_percentage_discount(self.discount_rate)
    }

    /// Net unit price times quantity.
    ///
    /// ## Errors
    /// `InvalidAmount` when the product does not fit in an i64.
    pub fn subtotal(&self) -> CoreResult<Money> {
        self.net_unit_price()
            .checked_mul_quantity(self.quantity)
            .ok_or_else(|| out_of_range(format!("line subtotal for {}", self.product_name)))
    }
}

fn out_of_range(what: impl fmt::Display) -> CoreError {
    CoreError::invalid_amount(format!("{what} exceeds the representable amount"))
}

/// Order-level rates read from settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Charges {
    pub service_charge_rate: Percentage,
    pub tax_rate: Percentage,
}

impl Charges {
    pub const fn new(service_charge_rate: Percentage, tax_rate: Percentage) -> Self {
        Charges {
            service_charge_rate,
            tax_rate,
        }
    }
}

/// Monetary breakdown of a priced cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PriceBreakdown {
    pub subtotal: Money,
    pub discount: Money,
    pub charges: Charges,
    pub service_charge: Money,
    pub tax: Money,
    pub total: Money,
}

/// Result of settling a breakdown against the tendered amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settlement {
    pub payment: Money,
    pub change: Money,
}

/// Prices a cart.
///
/// ## Errors
/// `InvalidAmount` when `discount` is negative or exceeds the subtotal,
/// or when any intermediate amount overflows.
///
/// ```rust
/// use atlas_core::money::{Money, Percentage};
/// use atlas_core::pricing::{price_cart, Charges, PricedLine};
///
/// let lines = [PricedLine::new(1, "Towel", Money::from_minor(20_000), Percentage::zero(), 1)];
/// let breakdown = price_cart(&lines, Money::from_minor(5_000), Charges::default()).unwrap();
/// assert_eq!(breakdown.total.minor(), 15_000);
/// ```
pub fn price_cart(lines: &[PricedLine], discount: Money, charges: Charges) -> CoreResult<PriceBreakdown> {
    let subtotal = lines.iter().try_fold(Money::zero(), |acc, line| {
        acc.checked_add(line.subtotal()?).ok_or_else(|| out_of_range("subtotal"))
    })?;

    if discount.is_negative() {
        return Err(CoreError::invalid_amount("discount must not be negative"));
    }
    if discount > subtotal {
        return Err(CoreError::invalid_amount(format!(
            "discount {discount} exceeds subtotal {subtotal}"
        )));
    }

    let discounted = subtotal - discount;
    let service_charge = discounted
        .checked_percent_of(charges.service_charge_rate)
        .ok_or_else(|| out_of_range("service charge"))?;
    let taxable = discounted
        .checked_add(service_charge)
        .ok_or_else(|| out_of_range("taxable amount"))?;
    let tax = taxable
        .checked_percent_of(charges.tax_rate)
        .ok_or_else(|| out_of_range("tax"))?;
    let total = taxable.checked_add(tax).ok_or_else(|| out_of_range("total"))?;

    Ok(PriceBreakdown {
        subtotal,
        discount,
        charges,
        service_charge,
        tax,
        total,
    })
}

impl PriceBreakdown {
    /// Checks the tendered amount against the final total.
    ///
    /// ## Errors
    /// `InvalidAmount` when `payment < total`.
    pub fn settle(&self, payment: Money) -> CoreResult<Settlement> {
        let change = payment
            .checked_sub(self.total)
            .ok_or_else(|| out_of_range("change"))?;
        if change.is_negative() {
            return Err(CoreError::invalid_amount(format!(
                "payment {payment} is less than total {}",
                self.total
            )));
        }
        Ok(Settlement { payment, change })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn whey(qty: i64) -> PricedLine {
        PricedLine::new(7, "Whey Protein", Money::from_minor(50_000), Percentage::from_bps(1_000), qty)
    }

    fn gym_charges() -> Charges {
        Charges::new(Percentage::from_bps(500), Percentage::from_bps(1_000))
    }

    #[test]
    fn test_reference_cart_breakdown() {
        let breakdown = price_cart(&[whey(2)], Money::zero(), gym_charges()).unwrap();

        assert_eq!(breakdown.subtotal.minor(), 90_000);
        assert_eq!(breakdown.service_charge.minor(), 4_500);
        assert_eq!(breakdown.tax.minor(), 9_450);
        assert_eq!(breakdown.total.minor(), 103_950);
    }

    #[test]
    fn test_short_payment_is_rejected() {
        let breakdown = price_cart(&[whey(2)], Money::zero(), gym_charges()).unwrap();

        let err = breakdown.settle(Money::from_minor(100_000)).unwrap_err();
        assert!(matches!(err, CoreError::InvalidAmount { .. }));

        let settlement = breakdown.settle(Money::from_minor(110_000)).unwrap();
        assert_eq!(settlement.change.minor(), 6_050);
    }

    #[test]
    fn test_exact_payment_gives_zero_change() {
        let breakdown = price_cart(&[whey(1)], Money::zero(), Charges::default()).unwrap();
        let settlement = breakdown.settle(Money::from_minor(45_000)).unwrap();
        assert!(settlement.change.is_zero());
    }

    #[test]
    fn test_subtotal_is_sum_of_line_subtotals() {
        let lines = vec![
            whey(3),
            PricedLine::new(8, "Shaker", Money::from_minor(35_999), Percentage::from_bps(1_250), 2),
            PricedLine::new(9, "Day Pass", Money::from_minor(25_000), Percentage::zero(), 1),
        ];
        let breakdown = price_cart(&lines, Money::zero(), gym_charges()).unwrap();

        let independent: i64 = lines.iter().map(|l| l.subtotal().unwrap().minor()).sum();
        assert_eq!(breakdown.subtotal.minor(), independent);
        // 35_999 × 12.5% = 4_499.875 → 4_500; net 31_499 × 2
        assert_eq!(lines[1].subtotal().unwrap().minor(), 62_998);
    }

    #[test]
    fn test_total_identity_holds_with_discount() {
        let breakdown = price_cart(&[whey(2)], Money::from_minor(10_001), gym_charges()).unwrap();

        assert_eq!(
            breakdown.total,
            breakdown.subtotal - breakdown.discount + breakdown.service_charge + breakdown.tax
        );
        // (90_000 - 10_001) × 5% = 3_999.95 → 4_000
        assert_eq!(breakdown.service_charge.minor(), 4_000);
    }

    #[test]
    fn test_discount_bounds() {
        let err = price_cart(&[whey(1)], Money::from_minor(45_001), Charges::default()).unwrap_err();
        assert!(matches!(err, CoreError::InvalidAmount { .. }));

        let err = price_cart(&[whey(1)], Money::from_minor(-1), Charges::default()).unwrap_err();
        assert!(matches!(err, CoreError::InvalidAmount { .. }));

        let full = price_cart(&[whey(1)], Money::from_minor(45_000), gym_charges()).unwrap();
        assert!(full.total.is_zero());
    }

    #[test]
    fn test_oversized_amounts_are_rejected_not_wrapped() {
        let huge = |qty| PricedLine::new(1, "Gold Bar", Money::from_minor(i64::MAX / 2), Percentage::zero(), qty);

        let err = huge(3).subtotal().unwrap_err();
        assert!(matches!(err, CoreError::InvalidAmount { .. }));

        let err = price_cart(&[huge(3)], Money::zero(), Charges::default()).unwrap_err();
        assert!(matches!(err, CoreError::InvalidAmount { .. }));

        // each line fits, their sum does not
        let err = price_cart(&[huge(2), huge(1)], Money::zero(), Charges::default()).unwrap_err();
        assert!(matches!(err, CoreError::InvalidAmount { .. }));

        // subtotal fits, the service charge pushes it over
        let near_max = PricedLine::new(2, "Gold Bar", Money::from_minor(i64::MAX - 10), Percentage::zero(), 1);
        let err = price_cart(&[near_max], Money::zero(), gym_charges()).unwrap_err();
        assert!(matches!(err, CoreError::InvalidAmount { .. }));
    }

    #[test]
    fn test_settle_rejects_change_overflow() {
        let breakdown = price_cart(&[whey(1)], Money::zero(), Charges::default()).unwrap();
        let err = breakdown.settle(Money::from_minor(i64::MIN)).unwrap_err();
        assert!(matches!(err, CoreError::InvalidAmount { .. }));
    }
}
