//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In naive floating point:                                               │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  Summed over many invoice lines the drift becomes visible on the       │
//! │  printed total.                                                         │
//! │                                                                         │
//! │  OUR SOLUTION: round at every boundary, store integer cents.           │
//! │    Line totals, subtotals, discounts and balances are all held as      │
//! │    i64 cents; decimal values only exist at the JSON boundary.          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Rounding Contract
//! All decimal input is rounded **half-up to 2 decimal places** before it
//! becomes cents, and every arithmetic step that could produce sub-cent
//! precision (quantity × price, percentage discounts) rounds its result.
//! Summation of already-rounded cents is exact, so no further drift can
//! accumulate across line items.
//!
//! ## Wire Format
//! `Money` serializes as a plain decimal number (`20.01`), never as cents.
//! This is part of the JSON API contract.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in integer cents.
///
/// ## Design Decisions
/// - **i64 (signed)**: intermediate results (total − paid) may be negative
/// - **Single field tuple struct**: zero-cost abstraction over i64
/// - **Decimal at the boundary**: serde converts to/from 2-decimal numbers
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(transparent))]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from a decimal amount, rounding half-up to
    /// 2 decimal places.
    ///
    /// ## Example
    /// ```rust
    /// use billing_core::money::Money;
    ///
    /// assert_eq!(Money::from_decimal(10.99).cents(), 1099);
    /// assert_eq!(Money::from_decimal(0.005).cents(), 1); // half rounds up
    /// ```
    ///
    /// ## Note
    /// Non-finite input maps to zero; callers validate before converting.
    pub fn from_decimal(value: f64) -> Self {
        if !value.is_finite() {
            return Money(0);
        }
        Money((value * 100.0).round() as i64)
    }

    /// Computes `round2(quantity × unit_price)` in a single step.
    ///
    /// The multiplication happens in decimal space and is rounded once,
    /// so a sub-cent unit price contributes its full precision to the line:
    ///
    /// ```rust
    /// use billing_core::money::Money;
    ///
    /// // 2 × 10.005 = 20.01 (not 2 × 10.01 = 20.02)
    /// assert_eq!(Money::from_product(2.0, 10.005).cents(), 2001);
    /// ```
    pub fn from_product(quantity: f64, unit_price: f64) -> Self {
        Money::from_decimal(quantity * unit_price)
    }

    /// Computes a percentage of this amount, rounded half-up.
    ///
    /// `percent` is a plain percentage (10.0 = 10%), not basis points.
    pub fn percent_of(&self, percent: f64) -> Money {
        Money((self.0 as f64 * percent / 100.0).round() as i64)
    }

    /// Returns the value in cents (smallest currency unit).
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the value as a decimal amount (for display and wire output).
    #[inline]
    pub fn to_decimal(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns this value floored at zero.
    ///
    /// Used for balances: `balance = max(0, total − paid)`.
    #[inline]
    pub const fn floor_at_zero(&self) -> Self {
        if self.0 < 0 {
            Money(0)
        } else {
            *self
        }
    }

    /// Returns the smaller of two values.
    #[inline]
    pub fn min(self, other: Self) -> Self {
        Money(self.0.min(other.0))
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display shows money as a plain 2-decimal amount (currency-agnostic).
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, (self.0 / 100).abs(), (self.0 % 100).abs())
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

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

/// Serializes as a decimal number with 2 meaningful fraction digits.
///
/// The JSON API contract carries monetary values as decimals (`180.0`,
/// `20.01`), never as raw cents.
impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.to_decimal())
    }
}

/// Deserializes from a decimal number, rounding half-up to 2 decimals.
impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = f64::deserialize(deserializer)?;
        Ok(Money::from_decimal(value))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_decimal_rounds_half_up() {
        assert_eq!(Money::from_decimal(10.99).cents(), 1099);
        assert_eq!(Money::from_decimal(0.005).cents(), 1);
        assert_eq!(Money::from_decimal(0.004).cents(), 0);
        assert_eq!(Money::from_decimal(0.0).cents(), 0);
    }

    #[test]
    fn test_from_decimal_non_finite_is_zero() {
        assert_eq!(Money::from_decimal(f64::NAN).cents(), 0);
        assert_eq!(Money::from_decimal(f64::INFINITY).cents(), 0);
    }

    #[test]
    fn test_from_product_rounds_once() {
        // 2 × 10.005 → 20.01 (one rounding step), 1 × 5 → 5.00
        assert_eq!(Money::from_product(2.0, 10.005).cents(), 2001);
        assert_eq!(Money::from_product(1.0, 5.0).cents(), 500);
    }

    #[test]
    fn test_percent_of() {
        let subtotal = Money::from_cents(20000); // 200.00
        assert_eq!(subtotal.percent_of(10.0).cents(), 2000); // 20.00
        assert_eq!(subtotal.percent_of(0.0).cents(), 0);
        assert_eq!(subtotal.percent_of(100.0).cents(), 20000);
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        assert_eq!((b - a).cents(), -500);

        let sum: Money = [a, b, b].into_iter().sum();
        assert_eq!(sum.cents(), 2000);
    }

    #[test]
    fn test_floor_at_zero() {
        assert_eq!(Money::from_cents(-500).floor_at_zero().cents(), 0);
        assert_eq!(Money::from_cents(500).floor_at_zero().cents(), 500);
        assert_eq!(Money::zero().floor_at_zero().cents(), 0);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_cents(1099)), "10.99");
        assert_eq!(format!("{}", Money::from_cents(500)), "5.00");
        assert_eq!(format!("{}", Money::from_cents(-550)), "-5.50");
        assert_eq!(format!("{}", Money::from_cents(0)), "0.00");
    }

    #[test]
    fn test_json_round_trip_as_decimal() {
        let m = Money::from_cents(2001);
        let json = serde_json::to_string(&m).unwrap();
        assert_eq!(json, "20.01");

        let back: Money = serde_json::from_str("20.01").unwrap();
        assert_eq!(back, m);

        // Integers on the wire are fine too
        let whole: Money = serde_json::from_str("100").unwrap();
        assert_eq!(whole.cents(), 10000);
    }
}
