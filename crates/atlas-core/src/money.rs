//! # Money Module
//!
//! `Money` and `Percentage`: the two numeric types every price, charge and
//! change amount flows through.
//!
//! ## Why Integers?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌                                  │
//! │                                                                         │
//! │  OUR SOLUTION                                                           │
//! │    Money       = i64 count of the currency's minor unit                 │
//! │    Percentage  = u32 basis points (1000 = 10%, 525 = 5.25%)             │
//! │    amount × percentage is computed in i128 and rounded half-up          │
//! │    (away from zero) back to a whole minor unit                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use atlas_core::money::{Money, Percentage};
//!
//! let price = Money::from_minor(50_000);
//! let discount = Percentage::from_bps(1_000); // 10%
//!
//! assert_eq!(price.percent_of(discount).minor(), 5_000);
//! assert_eq!(price.apply_percentage_discount(discount).minor(), 45_000);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;

/// Basis points in 100%.
const BPS_SCALE: i128 = 10_000;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit.
///
/// ## Where Money is Used
/// ```text
/// Product.price ──► PricedLine.unit_price ──► line subtotal ──► Order.subtotal
///                                                                    │
///   Order.discount_amount ◄── operator input                         ▼
///                              service charge ──► tax ──► total ──► change
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from minor units.
    ///
    /// ```rust
    /// use atlas_core::money::Money;
    ///
    /// let price = Money::from_minor(103_950);
    /// assert_eq!(price.minor(), 103_950);
    /// ```
    #[inline]
    pub const fn from_minor(minor: i64) -> Self {
        Money(minor)
    }

    /// Returns the value in minor units.
    #[inline]
    pub const fn minor(&self) -> i64 {
        self.0
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns `rate` of this amount, rounded half away from zero.
    ///
    /// ## Implementation
    /// Integer math on i128: `(amount * bps ± 5000) / 10000`.
    /// The ±5000 is half a unit after division.
    ///
    /// ```rust
    /// use atlas_core::money::{Money, Percentage};
    ///
    /// // 94_500 × 10% = 9_450
    /// let tax = Money::from_minor(94_500).percent_of(Percentage::from_bps(1_000));
    /// assert_eq!(tax.minor(), 9_450);
    ///
    /// // 1_005 × 5% = 50.25 → 50
    /// assert_eq!(Money::from_minor(1_005).percent_of(Percentage::from_bps(500)).minor(), 50);
    /// // 1_010 × 5% = 50.5 → 51
    /// assert_eq!(Money::from_minor(1_010).percent_of(Percentage::from_bps(500)).minor(), 51);
    /// ```
    pub fn percent_of(&self, rate: Percentage) -> Money {
        self.checked_percent_of(rate)
            .unwrap_or(if self.0 < 0 { Money(i64::MIN) } else { Money(i64::MAX) })
    }

    /// Like [`Money::percent_of`], but `None` when the result does not
    /// fit in an i64 (rates above 100% on very large amounts).
    pub fn checked_percent_of(&self, rate: Percentage) -> Option<Money> {
        let scaled = self.0 as i128 * rate.bps() as i128;
        let half = BPS_SCALE / 2;
        let rounded = if scaled >= 0 {
            (scaled + half) / BPS_SCALE
        } else {
            (scaled - half) / BPS_SCALE
        };
        i64::try_from(rounded).ok().map(Money)
    }

    /// Subtracts `rate` of this amount from itself.
    ///
    /// Rates are at most 100% for product discounts, so the result lies
    /// between zero and `self`.
    pub fn apply_percentage_discount(&self, rate: Percentage) -> Money {
        Money(self.0.saturating_sub(self.percent_of(rate).0))
    }

    /// Multiplies money by a quantity, `None` on overflow.
    ///
    /// ```rust
    /// use atlas_core::money::Money;
    ///
    /// assert_eq!(Money::from_minor(45_000).checked_mul_quantity(2), Some(Money::from_minor(90_000)));
    /// assert_eq!(Money::from_minor(i64::MAX / 2).checked_mul_quantity(3), None);
    /// ```
    #[inline]
    pub const fn checked_mul_quantity(&self, qty: i64) -> Option<Self> {
        match self.0.checked_mul(qty) {
            Some(v) => Some(Money(v)),
            None => None,
        }
    }

    #[inline]
    pub const fn checked_add(&self, other: Money) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(v) => Some(Money(v)),
            None => None,
        }
    }

    #[inline]
    pub const fn checked_sub(&self, other: Money) -> Option<Self> {
        match self.0.checked_sub(other.0) {
            Some(v) => Some(Money(v)),
            None => None,
        }
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

// =============================================================================
// Percentage
// =============================================================================

/// A rate in basis points (1 bps = 0.01%).
///
/// Setting values such as `"5"`, `"2.5"` or `"10.25"` parse into
/// 500, 250 and 1025 bps. A third fractional digit rounds half-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Percentage(u32);

impl Percentage {
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        Percentage(bps)
    }

    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn zero() -> Self {
        Percentage(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Reads a percentage from a stored setting value.
    ///
    /// Absent, negative or non-numeric values count as zero.
    ///
    /// ```rust
    /// use atlas_core::money::Percentage;
    ///
    /// assert_eq!(Percentage::parse_setting(Some("10")).bps(), 1_000);
    /// assert_eq!(Percentage::parse_setting(Some("abc")).bps(), 0);
    /// assert_eq!(Percentage::parse_setting(None).bps(), 0);
    /// ```
    pub fn parse_setting(value: Option<&str>) -> Self {
        value
            .and_then(|v| v.parse::<Percentage>().ok())
            .unwrap_or_default()
    }
}

impl FromStr for Percentage {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| ValidationError::InvalidFormat {
            field: "percentage".to_string(),
            reason: reason.to_string(),
        };

        let s = s.trim();
        let (whole, frac) = s.split_once('.').unwrap_or((s, ""));

        if whole.is_empty() && frac.is_empty() {
            return Err(invalid("expected a number"));
        }
        if !whole.bytes().all(|b| b.is_ascii_digit()) || !frac.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid("expected a non-negative decimal number"));
        }

        let whole: u32 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| invalid("value too large"))?
        };

        let mut digits = frac.bytes().map(|b| u32::from(b - b'0'));
        let tenths = digits.next().unwrap_or(0);
        let hundredths = digits.next().unwrap_or(0);
        let round_up = u32::from(digits.next().is_some_and(|d| d >= 5));

        whole
            .checked_mul(100)
            .and_then(|bps| bps.checked_add(tenths * 10 + hundredths + round_up))
            .map(Percentage)
            .ok_or_else(|| invalid("value too large"))
    }
}

/// Shortest decimal form: `5`, `2.5`, `10.25`.
impl fmt::Display for Percentage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / 100;
        let frac = self.0 % 100;
        match frac {
            0 => write!(f, "{whole}"),
            f10 if f10 % 10 == 0 => write!(f, "{whole}.{}", f10 / 10),
            _ => write!(f, "{whole}.{frac:02}"),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
