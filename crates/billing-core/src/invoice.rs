//! # Invoice Computation
//!
//! The pure half of the invoice lifecycle: line-item normalization,
//! subtotal/discount/total computation, and the paid/balance/status
//! projection used by the payment ledger.
//!
//! ## Invoice Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Invoice Lifecycle                                 │
//! │                                                                         │
//! │  1. BUILD                                                              │
//! │     └── normalize_items() → drop invalid lines, round line totals      │
//! │     └── compute_totals()  → subtotal + discount engine → total         │
//! │     └── paid = 0, balance = total, status = pending                    │
//! │                                                                         │
//! │  2. EDIT                                                               │
//! │     └── items supplied → same path, items fully replaced               │
//! │     └── items omitted  → caller-supplied header financials trusted     │
//! │     └── balance/status re-derived from existing paid_amount            │
//! │                                                                         │
//! │  3. PAY (append-only ledger)                                           │
//! │     └── apply_payment() → paid += amount                               │
//! │     └── balance = max(0, total − paid), status = paid | partial        │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};

use crate::discount::{compute_discount, DiscountOutcome};
use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{DiscountType, InvoiceStatus};

// =============================================================================
// Line Items
// =============================================================================

/// A raw line item as submitted by the client, before validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawLineItem {
    pub product_id: i64,
    pub quantity: f64,
    pub unit_price: f64,
    #[serde(default)]
    pub description: Option<String>,
}

/// A validated line with its rounded line total.
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceLine {
    pub product_id: i64,
    pub quantity: f64,
    pub unit_price: Money,
    pub line_total: Money,
    pub description: Option<String>,
}

/// Validates and normalizes raw line items.
///
/// ## Rules (per item)
/// - `product_id` must be positive
/// - `quantity` must be finite and > 0
/// - `unit_price` must be finite and ≥ 0
///
/// Items failing validation are **silently dropped** rather than rejecting
/// the whole request; the caller checks for the empty-result case.
/// Each surviving line gets `line_total = round2(quantity × unit_price)`.
pub fn normalize_items(raw: &[RawLineItem]) -> Vec<InvoiceLine> {
    raw.iter()
        .filter(|item| {
            item.product_id > 0
                && item.quantity.is_finite()
                && item.quantity > 0.0
                && item.unit_price.is_finite()
                && item.unit_price >= 0.0
        })
        .map(|item| InvoiceLine {
            product_id: item.product_id,
            quantity: item.quantity,
            unit_price: Money::from_decimal(item.unit_price),
            line_total: Money::from_product(item.quantity, item.unit_price),
            description: item.description.clone(),
        })
        .collect()
}

// =============================================================================
// Totals
// =============================================================================

/// Computed financial header of an invoice.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InvoiceTotals {
    pub subtotal: Money,
    pub discount_type: DiscountType,
    pub discount_value: f64,
    pub discount_amount: Money,
    pub total_amount: Money,
}

impl From<(Money, DiscountOutcome)> for InvoiceTotals {
    fn from((subtotal, outcome): (Money, DiscountOutcome)) -> Self {
        InvoiceTotals {
            subtotal,
            discount_type: outcome.discount_type,
            discount_value: outcome.discount_value,
            discount_amount: outcome.discount_amount,
            total_amount: outcome.total,
        }
    }
}

/// Computes subtotal and discount outcome for a set of normalized lines.
///
/// The subtotal is the sum of per-line rounded totals; summation of
/// integer cents is exact, so no further rounding drift can occur.
///
/// ## Errors
/// `CoreError::EmptyInvoice` if no lines survive normalization.
pub fn compute_totals(
    lines: &[InvoiceLine],
    discount_type: DiscountType,
    discount_value: f64,
) -> CoreResult<InvoiceTotals> {
    if lines.is_empty() {
        return Err(CoreError::EmptyInvoice);
    }

    let subtotal: Money = lines.iter().map(|l| l.line_total).sum();
    let outcome = compute_discount(subtotal, discount_type, discount_value);

    Ok(InvoiceTotals::from((subtotal, outcome)))
}

// =============================================================================
// Balance / Status Projection
// =============================================================================

/// `balance = max(0, total − paid)`. Overpayment floors at zero.
#[inline]
pub fn balance_for(total: Money, paid: Money) -> Money {
    (total - paid).floor_at_zero()
}

/// Derives the invoice status from its financial state.
///
/// - `Paid` iff `balance ≤ 0`
/// - `Partial` iff `0 < paid < total`
/// - `Pending` otherwise
pub fn derive_status(total: Money, paid: Money) -> InvoiceStatus {
    if (total - paid).cents() <= 0 {
        InvoiceStatus::Paid
    } else if paid.is_positive() {
        InvoiceStatus::Partial
    } else {
        InvoiceStatus::Pending
    }
}

// =============================================================================
// Payment Application
// =============================================================================

/// The result of applying one payment to an invoice's running totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaymentOutcome {
    pub paid_amount: Money,
    pub balance_amount: Money,
    pub status: InvoiceStatus,
}

/// Applies a payment against the invoice's running paid/total.
///
/// Overpayment is accepted: there is no cap on `amount` relative to the
/// balance. The resulting balance floors at zero and the excess is
/// absorbed silently (the discount engine clamps, the ledger does not;
/// that asymmetry is deliberate).
///
/// ## Errors
/// `CoreError::InvalidPaymentAmount` for non-positive amounts. Non-finite
/// decimal input must be rejected before conversion to [`Money`].
pub fn apply_payment(total: Money, paid: Money, amount: Money) -> CoreResult<PaymentOutcome> {
    if !amount.is_positive() {
        return Err(CoreError::InvalidPaymentAmount {
            reason: "payment amount must be positive".to_string(),
        });
    }

    let new_paid = paid + amount;
    Ok(PaymentOutcome {
        paid_amount: new_paid,
        balance_amount: balance_for(total, new_paid),
        status: derive_status(total, new_paid),
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(product_id: i64, quantity: f64, unit_price: f64) -> RawLineItem {
        RawLineItem {
            product_id,
            quantity,
            unit_price,
            description: None,
        }
    }

    #[test]
    fn test_normalize_rounds_each_line() {
        let lines = normalize_items(&[raw(1, 2.0, 10.005), raw(2, 1.0, 5.0)]);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].line_total.cents(), 2001); // 20.01
        assert_eq!(lines[1].line_total.cents(), 500); // 5.00
    }

    #[test]
    fn test_normalize_drops_invalid_items_silently() {
        let lines = normalize_items(&[
            raw(1, 0.0, 10.0),            // zero quantity
            raw(1, -2.0, 10.0),           // negative quantity
            raw(1, 1.0, -5.0),            // negative price
            raw(0, 1.0, 10.0),            // non-positive product id
            raw(1, f64::NAN, 10.0),       // non-finite quantity
            raw(1, 1.0, f64::INFINITY),   // non-finite price
            raw(7, 3.0, 4.0),             // the one valid line
        ]);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].product_id, 7);
        assert_eq!(lines[0].line_total.cents(), 1200);
    }

    #[test]
    fn test_zero_price_line_is_valid() {
        let lines = normalize_items(&[raw(1, 2.0, 0.0)]);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].line_total.cents(), 0);
    }

    #[test]
    fn test_compute_totals_subtotal_and_discount() {
        let lines = normalize_items(&[raw(1, 2.0, 10.005), raw(2, 1.0, 5.0)]);
        let totals = compute_totals(&lines, DiscountType::None, 0.0).unwrap();
        assert_eq!(totals.subtotal.cents(), 2501); // 25.01
        assert_eq!(totals.total_amount.cents(), 2501);

        let lines = normalize_items(&[raw(1, 2.0, 100.0)]);
        let totals = compute_totals(&lines, DiscountType::Percent, 10.0).unwrap();
        assert_eq!(totals.subtotal.cents(), 20000);
        assert_eq!(totals.discount_amount.cents(), 2000);
        assert_eq!(totals.total_amount.cents(), 18000);
    }

    #[test]
    fn test_empty_invoice_rejected() {
        let lines = normalize_items(&[raw(1, 0.0, 10.0)]);
        assert!(lines.is_empty());
        assert!(matches!(
            compute_totals(&lines, DiscountType::None, 0.0),
            Err(CoreError::EmptyInvoice)
        ));
    }

    #[test]
    fn test_derive_status() {
        let total = Money::from_cents(10000);
        assert_eq!(derive_status(total, Money::zero()), InvoiceStatus::Pending);
        assert_eq!(
            derive_status(total, Money::from_cents(3000)),
            InvoiceStatus::Partial
        );
        assert_eq!(
            derive_status(total, Money::from_cents(10000)),
            InvoiceStatus::Paid
        );
        assert_eq!(
            derive_status(total, Money::from_cents(11000)),
            InvoiceStatus::Paid
        );
        // A zero-total invoice has nothing left to pay
        assert_eq!(
            derive_status(Money::zero(), Money::zero()),
            InvoiceStatus::Paid
        );
    }

    #[test]
    fn test_payment_sequence_partial_then_paid_then_overpay() {
        let total = Money::from_cents(10000); // 100.00

        let first = apply_payment(total, Money::zero(), Money::from_cents(3000)).unwrap();
        assert_eq!(first.paid_amount.cents(), 3000);
        assert_eq!(first.balance_amount.cents(), 7000);
        assert_eq!(first.status, InvoiceStatus::Partial);

        let second = apply_payment(total, first.paid_amount, Money::from_cents(7000)).unwrap();
        assert_eq!(second.paid_amount.cents(), 10000);
        assert_eq!(second.balance_amount.cents(), 0);
        assert_eq!(second.status, InvoiceStatus::Paid);

        // Overpayment: accepted, balance floors at zero, status stays paid
        let third = apply_payment(total, second.paid_amount, Money::from_cents(1000)).unwrap();
        assert_eq!(third.paid_amount.cents(), 11000);
        assert_eq!(third.balance_amount.cents(), 0);
        assert_eq!(third.status, InvoiceStatus::Paid);
    }

    #[test]
    fn test_non_positive_payment_rejected() {
        let total = Money::from_cents(10000);
        assert!(apply_payment(total, Money::zero(), Money::zero()).is_err());
        assert!(apply_payment(total, Money::zero(), Money::from_cents(-100)).is_err());
    }
}
