//! # Discount Engine
//!
//! Pure computation of discount amounts and resulting invoice totals.
//!
//! ## Discount Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Discount Computation                               │
//! │                                                                         │
//! │  subtotal (clamped ≥ 0)                                                │
//! │       │                                                                 │
//! │       ├── type = percent → value clamped to [0, 100]                   │
//! │       │                    amount = round2(subtotal × value / 100)     │
//! │       │                                                                 │
//! │       ├── type = amount  → value clamped to [0, subtotal]              │
//! │       │                    amount = round2(value)                      │
//! │       │                                                                 │
//! │       └── type = none    → value = 0, amount = 0                       │
//! │                                                                         │
//! │  total = round2(subtotal − amount)   guaranteed ≥ 0 by the clamps      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The engine is a pure function: no side effects, same inputs always
//! produce the same outputs.

use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::types::DiscountType;

// =============================================================================
// Discount Outcome
// =============================================================================

/// Result of applying a discount to a subtotal.
///
/// All four fields are persisted on the invoice header so the discount can
/// be displayed and re-audited without re-running the engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DiscountOutcome {
    /// Normalized discount type (unrecognized input becomes `None`).
    pub discount_type: DiscountType,
    /// The clamped discount value (percentage or flat amount as entered).
    pub discount_value: f64,
    /// The computed discount in money terms.
    pub discount_amount: Money,
    /// `subtotal − discount_amount`, never negative.
    pub total: Money,
}

// =============================================================================
// Engine
// =============================================================================

/// Computes the discount amount and resulting total for a subtotal.
///
/// ## Clamping Rules
/// - `subtotal` is floored at zero before use
/// - percent values are clamped to `[0, 100]`
/// - flat amounts are clamped to `[0, subtotal]`: a discount can never
///   push the total below zero
/// - a non-finite `raw_value` is treated as zero
///
/// ## Example
/// ```rust
/// use billing_core::discount::compute_discount;
/// use billing_core::money::Money;
/// use billing_core::types::DiscountType;
///
/// let out = compute_discount(Money::from_cents(20000), DiscountType::Percent, 10.0);
/// assert_eq!(out.discount_amount.cents(), 2000); // 20.00
/// assert_eq!(out.total.cents(), 18000);          // 180.00
/// ```
pub fn compute_discount(
    subtotal: Money,
    discount_type: DiscountType,
    raw_value: f64,
) -> DiscountOutcome {
    let subtotal = subtotal.floor_at_zero();
    let raw_value = if raw_value.is_finite() { raw_value } else { 0.0 };

    let (discount_type, discount_value, discount_amount) = match discount_type {
        DiscountType::Percent => {
            let value = raw_value.clamp(0.0, 100.0);
            (DiscountType::Percent, value, subtotal.percent_of(value))
        }
        DiscountType::Amount => {
            let value = raw_value.clamp(0.0, subtotal.to_decimal());
            (
                DiscountType::Amount,
                value,
                Money::from_decimal(value).min(subtotal),
            )
        }
        DiscountType::None => (DiscountType::None, 0.0, Money::zero()),
    };

    DiscountOutcome {
        discount_type,
        discount_value,
        discount_amount,
        total: (subtotal - discount_amount).floor_at_zero(),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
