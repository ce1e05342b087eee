//! # Invoice Numbering
//!
//! The pure half of the invoice numbering service: period keys and the
//! human-readable number format. The atomic per-period sequence that backs
//! the numbers lives in the database layer (`invoice_counters` table),
//! because uniqueness under concurrency is a storage concern.
//!
//! ## Format
//! `INV-YYYY-MM-NNN`: year and month of the issuing period, then a
//! sequence number zero-padded to 3 digits (the 1000th invoice in a month
//! simply widens to 4 digits rather than truncating).

use chrono::{Datelike, NaiveDate};

/// Returns the `"YYYY-MM"` period key for a date.
///
/// This is the key of the counter row that issues sequence numbers, and
/// matches the `strftime('%Y-%m', invoice_date)` grouping used when a
/// counter is seeded from existing invoices.
pub fn period_key(date: NaiveDate) -> String {
    format!("{:04}-{:02}", date.year(), date.month())
}

/// Formats an invoice number for a period and sequence value.
///
/// ## Example
/// ```rust
/// use billing_core::numbering::format_invoice_number;
/// use chrono::NaiveDate;
///
/// let date = NaiveDate::from_ymd_opt(2026, 3, 14).unwrap();
/// assert_eq!(format_invoice_number(date, 7), "INV-2026-03-007");
/// ```
pub fn format_invoice_number(date: NaiveDate, seq: i64) -> String {
    format!("INV-{:04}-{:02}-{:03}", date.year(), date.month(), seq)
}

// =============================================================================
// Unit Tests
// =============================================================================
