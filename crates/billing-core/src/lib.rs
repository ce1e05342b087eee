//! # billing-core: Pure Business Logic for the Billing Service
//!
//! This crate is the **heart** of the billing system. It contains the
//! invoice lifecycle and financial computation logic as pure functions with
//! zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Billing Architecture                              │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 billing-server (axum)                           │   │
//! │  │    JSON API routes ── HTML dashboard ── print view             │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ billing-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   money   │  │ discount  │  │  invoice  │  │ numbering │  │   │
//! │  │   │  rounding │  │  engine   │  │  builder  │  │  format   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 billing-db (Database Layer)                     │   │
//! │  │           SQLite queries, migrations, repositories              │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Customer, Product, Invoice, Payment, ...)
//! - [`money`] - Money type: integer cents, half-up decimal rounding
//! - [`discount`] - Discount engine (percent / flat amount / none)
//! - [`invoice`] - Invoice builder and payment-ledger projections
//! - [`numbering`] - Invoice number formatting (`INV-YYYY-MM-NNN`)
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: same input = same output, always
//! 2. **No I/O**: database, network, file system access is FORBIDDEN here
//! 3. **Rounded Money**: every monetary value is rounded to 2 decimals
//!    before it is stored or compared
//! 4. **Derived Status**: an invoice's status is a projection of
//!    `(total, paid)`, never freely assignable state

// =============================================================================
// Module Declarations
// =============================================================================

pub mod discount;
pub mod error;
pub mod invoice;
pub mod money;
pub mod numbering;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use billing_core::Money` instead of
// `use billing_core::money::Money`

pub use discount::{compute_discount, DiscountOutcome};
pub use error::{CoreError, CoreResult, ValidationError};
pub use invoice::{
    apply_payment, balance_for, compute_totals, derive_status, normalize_items, InvoiceLine,
    InvoiceTotals, PaymentOutcome, RawLineItem,
};
pub use money::Money;
pub use numbering::{format_invoice_number, period_key};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// How many times a conflicting invoice-number insert is retried before
/// the conflict is surfaced to the caller.
///
/// ## Why a constant?
/// The per-period counter makes collisions effectively impossible in normal
/// operation; the retry only covers counters that were seeded behind
/// already-existing invoices. A small bound keeps worst-case latency flat.
pub const NUMBERING_MAX_RETRIES: u32 = 3;
