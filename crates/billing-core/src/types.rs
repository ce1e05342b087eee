//! # Domain Types
//!
//! Core domain types for the billing service.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Customer     │   │     Invoice     │   │    Payment      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │◄──│  customer_id    │◄──│  invoice_id     │       │
//! │  │  name, tax_id   │   │  invoice_number │   │  amount         │       │
//! │  │  credit_limit   │   │  totals, status │   │  method         │       │
//! │  └─────────────────┘   └────────┬────────┘   └─────────────────┘       │
//! │                                 │ owns                                  │
//! │  ┌─────────────────┐   ┌────────▼────────┐                             │
//! │  │    Product      │◄──│  InvoiceItem    │                             │
//! │  │  ─────────────  │   │  ─────────────  │                             │
//! │  │  unit_price     │   │  qty × price    │                             │
//! │  │  is_active      │   │  line_total     │                             │
//! │  └─────────────────┘   └─────────────────┘                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Ownership
//! An invoice exclusively owns its items (full replacement on edit) and is
//! referenced by payments, which form an append-only ledger against it.
//! Customers and products belong to the catalog and are only referenced.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;

// =============================================================================
// Discount Type
// =============================================================================

/// How a discount value on an invoice is interpreted.
///
/// Unrecognized wire values deserialize to `None`: the engine normalizes
/// rather than rejects (see the discount module).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum DiscountType {
    /// No discount applied.
    #[default]
    None,
    /// Flat amount off the subtotal.
    Amount,
    /// Percentage off the subtotal.
    Percent,
}

/// Anything other than "amount"/"percent" (unknown strings, explicit
/// null) normalizes to `None`.
impl<'de> Deserialize<'de> for DiscountType {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(match raw.as_deref() {
            Some("amount") => DiscountType::Amount,
            Some("percent") => DiscountType::Percent,
            _ => DiscountType::None,
        })
    }
}

// =============================================================================
// Invoice Status
// =============================================================================

/// Payment status of an invoice.
///
/// Status is a projection of `(total_amount, paid_amount)`: it is
/// re-derived on every mutation rather than freely assigned, so it cannot
/// drift out of sync with the balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    /// Nothing paid yet.
    #[default]
    Pending,
    /// Some but not all of the total paid.
    Partial,
    /// Balance fully settled (overpayment included).
    Paid,
}

// =============================================================================
// Payment Method
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Physical cash payment.
    #[default]
    Cash,
    /// UPI transfer.
    Upi,
    /// Direct bank transfer (NEFT/RTGS/IMPS).
    BankTransfer,
    /// Cheque payment.
    Cheque,
    /// Card payment.
    Card,
}

// =============================================================================
// Customer
// =============================================================================

/// A customer of the business.
///
/// Identity (`id`) is immutable; every other field is mutable via explicit
/// update. There is no lifecycle coupling to invoices beyond the foreign
/// reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Customer {
    pub id: i64,
    pub name: String,
    pub business_name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub pincode: Option<String>,
    /// Tax registration number (GSTIN or equivalent).
    pub tax_id: Option<String>,
    #[cfg_attr(feature = "sqlx", sqlx(rename = "credit_limit_cents"))]
    pub credit_limit: Money,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Product
// =============================================================================

/// A catalog product.
///
/// Soft-deleted via `is_active` (listing APIs filter to active only);
/// hard delete is also supported.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub size: Option<String>,
    pub color: Option<String>,
    pub material: Option<String>,
    /// Non-negative, 2-decimal precision.
    #[cfg_attr(feature = "sqlx", sqlx(rename = "unit_price_cents"))]
    pub unit_price: Money,
    pub stock_quantity: i64,
    pub minimum_stock: i64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Invoice
// =============================================================================

/// An invoice header.
///
/// ## Invariants
/// - `total_amount = subtotal − discount_amount` (each 2-decimal rounded)
/// - `discount_amount ≤ subtotal`
/// - `balance_amount = max(0, total_amount − paid_amount)`
/// - `status` is derived from `(total_amount, paid_amount)`
/// - `invoice_number` is unique, assigned once at creation, never
///   regenerated on update
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Invoice {
    pub id: i64,
    /// Format `INV-YYYY-MM-NNN`, unique across all invoices.
    pub invoice_number: String,
    pub customer_id: i64,
    pub invoice_date: NaiveDate,
    pub due_date: Option<NaiveDate>,
    #[cfg_attr(feature = "sqlx", sqlx(rename = "subtotal_cents"))]
    pub subtotal: Money,
    pub discount_type: DiscountType,
    pub discount_value: f64,
    #[cfg_attr(feature = "sqlx", sqlx(rename = "discount_amount_cents"))]
    pub discount_amount: Money,
    #[cfg_attr(feature = "sqlx", sqlx(rename = "total_amount_cents"))]
    pub total_amount: Money,
    #[cfg_attr(feature = "sqlx", sqlx(rename = "paid_amount_cents"))]
    pub paid_amount: Money,
    #[cfg_attr(feature = "sqlx", sqlx(rename = "balance_amount_cents"))]
    pub balance_amount: Money,
    pub status: InvoiceStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Invoice Item
// =============================================================================

/// A line item belonging to exactly one invoice.
///
/// Items are fully replaced (delete-all, insert-all) on invoice edit;
/// there is no partial item patching.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct InvoiceItem {
    pub id: i64,
    pub invoice_id: i64,
    pub product_id: i64,
    /// Positive; fractional quantities are allowed.
    pub quantity: f64,
    #[cfg_attr(feature = "sqlx", sqlx(rename = "unit_price_cents"))]
    pub unit_price: Money,
    /// `round2(quantity × unit_price)`.
    #[cfg_attr(feature = "sqlx", sqlx(rename = "line_total_cents"))]
    pub line_total: Money,
    /// Optional free-text override of the product description.
    pub description: Option<String>,
}

// =============================================================================
// Payment
// =============================================================================

/// A payment recorded against an invoice.
///
/// Payments are append-only: never updated or deleted. Each insertion
/// recomputes the owning invoice's paid/balance/status.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Payment {
    pub id: i64,
    pub invoice_id: i64,
    pub payment_date: NaiveDate,
    /// Strictly positive.
    #[cfg_attr(feature = "sqlx", sqlx(rename = "amount_cents"))]
    pub amount: Money,
    #[cfg_attr(feature = "sqlx", sqlx(rename = "method"))]
    pub payment_method: PaymentMethod,
    pub reference_number: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discount_type_unknown_normalizes_to_none() {
        let ty: DiscountType = serde_json::from_str("\"percent\"").unwrap();
        assert_eq!(ty, DiscountType::Percent);

        let ty: DiscountType = serde_json::from_str("\"coupon\"").unwrap();
        assert_eq!(ty, DiscountType::None);

        let ty: DiscountType = serde_json::from_str("null").unwrap();
        assert_eq!(ty, DiscountType::None);
    }

    #[test]
    fn test_status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&InvoiceStatus::Partial).unwrap(),
            "\"partial\""
        );
    }

    #[test]
    fn test_payment_method_snake_case() {
        assert_eq!(
            serde_json::to_string(&PaymentMethod::BankTransfer).unwrap(),
            "\"bank_transfer\""
        );
        let m: PaymentMethod = serde_json::from_str("\"upi\"").unwrap();
        assert_eq!(m, PaymentMethod::Upi);
    }
}
