//! # Invoice Repository
//!
//! The transactional heart of the billing service: invoice creation with
//! atomic numbering, full-replacement edits, the append-only payment
//! ledger, and detail/list projections.
//!
//! ## Creation Transaction
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                   Invoice Creation (one transaction)                    │
//! │                                                                         │
//! │  1. UPSERT invoice_counters(period) → seq   (atomic increment)          │
//! │     └── seeded from COUNT(*) of existing invoices in the period         │
//! │  2. Format number: INV-YYYY-MM-NNN                                      │
//! │  3. INSERT invoice header  ── UNIQUE(invoice_number) backstop           │
//! │  4. INSERT each line item                                               │
//! │  5. COMMIT                                                              │
//! │                                                                         │
//! │  A unique-constraint hit (counter seeded behind pre-existing rows)      │
//! │  rolls back and retries with a freshly incremented counter, at most     │
//! │  NUMBERING_MAX_RETRIES times.                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Payment Transaction
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                  Payment Recording (one transaction)                    │
//! │                                                                         │
//! │  1. UPDATE invoices SET paid += amount   ← acquires the write lock      │
//! │     └── rows_affected == 0 → NotFound                                   │
//! │  2. SELECT total, paid (now consistent under the lock)                  │
//! │  3. Derive balance/status in billing-core                               │
//! │  4. UPDATE balance/status, INSERT payment row                           │
//! │  5. COMMIT                                                              │
//! │                                                                         │
//! │  Incrementing first means two concurrent payments can never read the    │
//! │  same starting paid_amount.                                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{NaiveDate, Utc};
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::{debug, info};

use billing_core::{
    balance_for, derive_status, format_invoice_number, period_key, Customer, DiscountType,
    Invoice, InvoiceItem, InvoiceLine, InvoiceStatus, InvoiceTotals, Money, Payment,
    PaymentMethod, NUMBERING_MAX_RETRIES,
};

use crate::error::{DbError, DbResult};

// =============================================================================
// Input Types
// =============================================================================

/// Input for creating an invoice.
///
/// Lines and totals arrive pre-computed by billing-core; this layer only
/// persists them atomically.
#[derive(Debug, Clone)]
pub struct NewInvoice {
    pub customer_id: i64,
    pub invoice_date: NaiveDate,
    pub due_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub lines: Vec<InvoiceLine>,
    pub totals: InvoiceTotals,
}

/// Replacement line items for an edit, with their recomputed totals.
#[derive(Debug, Clone)]
pub struct ItemReplacement {
    pub lines: Vec<InvoiceLine>,
    pub totals: InvoiceTotals,
}

/// Input for editing an invoice. `None` fields keep their stored value.
///
/// When `replacement` is set, the financial header comes from the
/// recomputed totals and the override fields below it are ignored.
/// Without it, caller-supplied header financials are trusted as-is.
#[derive(Debug, Clone, Default)]
pub struct InvoiceUpdate {
    pub customer_id: Option<i64>,
    pub invoice_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub replacement: Option<ItemReplacement>,
    pub subtotal: Option<Money>,
    pub discount_type: Option<DiscountType>,
    pub discount_value: Option<f64>,
    pub discount_amount: Option<Money>,
    pub total_amount: Option<Money>,
    pub paid_amount: Option<Money>,
    pub status: Option<InvoiceStatus>,
}

/// Input for recording a payment. Amount is validated (positive, finite)
/// before it reaches this layer.
#[derive(Debug, Clone)]
pub struct NewPayment {
    pub amount: Money,
    pub payment_date: NaiveDate,
    pub payment_method: PaymentMethod,
    pub reference_number: Option<String>,
    pub notes: Option<String>,
}

// =============================================================================
// Projection Types
// =============================================================================

/// An invoice row joined with its customer's name, for listings.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct InvoiceSummary {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub invoice: Invoice,
    pub customer_name: String,
}

/// A line item joined with its product's name.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct InvoiceItemDetail {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub item: InvoiceItem,
    pub product_name: Option<String>,
}

/// Full invoice detail: header, customer, items, and payment ledger.
#[derive(Debug, Clone, Serialize)]
pub struct InvoiceDetail {
    #[serde(flatten)]
    pub invoice: Invoice,
    pub customer: Customer,
    pub items: Vec<InvoiceItemDetail>,
    pub payments: Vec<Payment>,
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for invoices, their items, and their payment ledger.
#[derive(Debug, Clone)]
pub struct InvoiceRepository {
    pool: SqlitePool,
}

impl InvoiceRepository {
    pub fn new(pool: SqlitePool) -> Self {
        InvoiceRepository { pool }
    }

    // =========================================================================
    // Creation
    // =========================================================================

    /// Creates an invoice with an atomically assigned number.
    ///
    /// ## Errors
    /// - `DbError::ForeignKeyViolation` for an unknown customer or product
    /// - `DbError::ConcurrencyConflict` if the numbering retries are
    ///   exhausted (a counter seeded behind pre-existing invoice rows)
    pub async fn create(&self, input: NewInvoice) -> DbResult<Invoice> {
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            match self.try_create(&input).await {
                Ok(invoice) => {
                    info!(
                        invoice_id = invoice.id,
                        invoice_number = %invoice.invoice_number,
                        "Invoice created"
                    );
                    return Ok(invoice);
                }
                Err(DbError::UniqueViolation { field, .. })
                    if field.contains("invoice_number") =>
                {
                    if attempt >= NUMBERING_MAX_RETRIES {
                        return Err(DbError::ConcurrencyConflict {
                            entity: "invoice_number".to_string(),
                        });
                    }
                    debug!(attempt, "Invoice number collision, retrying");
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// One creation attempt: counter upsert, header insert, item inserts,
    /// all in a single transaction.
    async fn try_create(&self, input: &NewInvoice) -> DbResult<Invoice> {
        let mut tx = self.pool.begin().await?;

        // Atomic per-period sequence. The INSERT arm seeds the counter from
        // the count of invoices already in the period, so numbering continues
        // where a pre-counter database left off; the UPDATE arm is the normal
        // path. Either way exactly one writer sees each seq value.
        let period = period_key(input.invoice_date);
        let seq: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO invoice_counters (period, seq)
            SELECT ?1, COUNT(*) + 1 FROM invoices
            WHERE strftime('%Y-%m', invoice_date) = ?1
            ON CONFLICT (period) DO UPDATE SET seq = seq + 1
            RETURNING seq
            "#,
        )
        .bind(&period)
        .fetch_one(&mut *tx)
        .await?;

        let invoice_number = format_invoice_number(input.invoice_date, seq);
        let now = Utc::now();
        let totals = &input.totals;

        // New invoices start with nothing paid; a zero-total invoice is
        // immediately paid.
        let paid = Money::zero();
        let balance = balance_for(totals.total_amount, paid);
        let status = derive_status(totals.total_amount, paid);

        let invoice_id = sqlx::query(
            r#"
            INSERT INTO invoices
                (invoice_number, customer_id, invoice_date, due_date,
                 subtotal_cents, discount_type, discount_value,
                 discount_amount_cents, total_amount_cents, paid_amount_cents,
                 balance_amount_cents, status, notes, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
            "#,
        )
        .bind(&invoice_number)
        .bind(input.customer_id)
        .bind(input.invoice_date)
        .bind(input.due_date)
        .bind(totals.subtotal)
        .bind(totals.discount_type)
        .bind(totals.discount_value)
        .bind(totals.discount_amount)
        .bind(totals.total_amount)
        .bind(paid)
        .bind(balance)
        .bind(status)
        .bind(&input.notes)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

        insert_items(&mut tx, invoice_id, &input.lines).await?;

        tx.commit().await?;
        self.get_by_id(invoice_id).await
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Fetches an invoice header by ID.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Invoice> {
        sqlx::query_as::<_, Invoice>("SELECT * FROM invoices WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Invoice", id))
    }

    /// Fetches the full detail: header, customer, items (with product
    /// names), and the payment ledger.
    pub async fn get_detail(&self, id: i64) -> DbResult<InvoiceDetail> {
        let invoice = self.get_by_id(id).await?;

        let customer =
            sqlx::query_as::<_, Customer>("SELECT * FROM customers WHERE id = ?1")
                .bind(invoice.customer_id)
                .fetch_optional(&self.pool)
                .await?
                .ok_or_else(|| DbError::not_found("Customer", invoice.customer_id))?;

        let items = sqlx::query_as::<_, InvoiceItemDetail>(
            r#"
            SELECT ii.*, p.name AS product_name
            FROM invoice_items ii
            LEFT JOIN products p ON p.id = ii.product_id
            WHERE ii.invoice_id = ?1
            ORDER BY ii.id
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        let payments = self.payments_for(id).await?;

        Ok(InvoiceDetail {
            invoice,
            customer,
            items,
            payments,
        })
    }

    /// Lists all invoices with customer names, newest invoice date first.
    pub async fn list(&self) -> DbResult<Vec<InvoiceSummary>> {
        let summaries = sqlx::query_as::<_, InvoiceSummary>(
            r#"
            SELECT i.*, c.name AS customer_name
            FROM invoices i
            JOIN customers c ON c.id = i.customer_id
            ORDER BY i.invoice_date DESC, i.id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(summaries)
    }

    /// Lists payments for an invoice, newest first.
    pub async fn payments_for(&self, invoice_id: i64) -> DbResult<Vec<Payment>> {
        let payments = sqlx::query_as::<_, Payment>(
            "SELECT * FROM payments WHERE invoice_id = ?1 ORDER BY payment_date DESC, id DESC",
        )
        .bind(invoice_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(payments)
    }

    // =========================================================================
    // Edit
    // =========================================================================

    /// Edits an invoice. The invoice number is never regenerated.
    ///
    /// With an [`ItemReplacement`], all items are deleted and re-inserted
    /// and the financial header comes from the recomputed totals. Without
    /// one, supplied header overrides are stored as-is. Status can be
    /// overridden; the balance cannot and is always re-derived.
    pub async fn update(&self, id: i64, input: InvoiceUpdate) -> DbResult<Invoice> {
        let mut tx = self.pool.begin().await?;

        let existing =
            sqlx::query_as::<_, Invoice>("SELECT * FROM invoices WHERE id = ?1")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or_else(|| DbError::not_found("Invoice", id))?;

        let customer_id = input.customer_id.unwrap_or(existing.customer_id);
        let invoice_date = input.invoice_date.unwrap_or(existing.invoice_date);
        let due_date = input.due_date.or(existing.due_date);
        let notes = input.notes.or(existing.notes);

        let (subtotal, discount_type, discount_value, discount_amount, total_amount, paid_amount) =
            match &input.replacement {
                Some(rep) => {
                    // Full item replacement: delete-all, insert-all.
                    sqlx::query("DELETE FROM invoice_items WHERE invoice_id = ?1")
                        .bind(id)
                        .execute(&mut *tx)
                        .await?;
                    insert_items(&mut tx, id, &rep.lines).await?;

                    let t = &rep.totals;
                    (
                        t.subtotal,
                        t.discount_type,
                        t.discount_value,
                        t.discount_amount,
                        t.total_amount,
                        input.paid_amount.unwrap_or(existing.paid_amount),
                    )
                }
                None => (
                    input.subtotal.unwrap_or(existing.subtotal),
                    input.discount_type.unwrap_or(existing.discount_type),
                    input.discount_value.unwrap_or(existing.discount_value),
                    input.discount_amount.unwrap_or(existing.discount_amount),
                    input.total_amount.unwrap_or(existing.total_amount),
                    input.paid_amount.unwrap_or(existing.paid_amount),
                ),
            };

        // The balance has no override field: it is always re-derived from
        // (total, paid) so the stored header cannot contradict itself.
        let balance = balance_for(total_amount, paid_amount);
        let status = input
            .status
            .unwrap_or_else(|| derive_status(total_amount, paid_amount));

        sqlx::query(
            r#"
            UPDATE invoices SET
                customer_id = ?1, invoice_date = ?2, due_date = ?3,
                subtotal_cents = ?4, discount_type = ?5, discount_value = ?6,
                discount_amount_cents = ?7, total_amount_cents = ?8,
                paid_amount_cents = ?9, balance_amount_cents = ?10,
                status = ?11, notes = ?12, updated_at = ?13
            WHERE id = ?14
            "#,
        )
        .bind(customer_id)
        .bind(invoice_date)
        .bind(due_date)
        .bind(subtotal)
        .bind(discount_type)
        .bind(discount_value)
        .bind(discount_amount)
        .bind(total_amount)
        .bind(paid_amount)
        .bind(balance)
        .bind(status)
        .bind(&notes)
        .bind(Utc::now())
        .bind(id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        debug!(invoice_id = id, "Invoice updated");
        self.get_by_id(id).await
    }

    // =========================================================================
    // Delete
    // =========================================================================

    /// Deletes an invoice with its items and payments in one transaction.
    ///
    /// The invoice's number is never reused: the period counter only ever
    /// moves forward.
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM payments WHERE invoice_id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM invoice_items WHERE invoice_id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM invoices WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Invoice", id));
        }

        tx.commit().await?;
        info!(invoice_id = id, "Invoice deleted");
        Ok(())
    }

    // =========================================================================
    // Payments
    // =========================================================================

    /// Records a payment and recomputes the invoice's paid/balance/status,
    /// all in one transaction.
    ///
    /// The paid-amount increment is the first statement, so it takes the
    /// write lock before anything is read; concurrent payments serialize
    /// and each observes the other's increment.
    pub async fn record_payment(
        &self,
        invoice_id: i64,
        input: NewPayment,
    ) -> DbResult<(Payment, Invoice)> {
        // Caller-side validation backstop: a non-positive amount must never
        // reach the ledger.
        if !input.amount.is_positive() {
            return Err(DbError::QueryFailed(
                "payment amount must be positive".to_string(),
            ));
        }

        let mut tx = self.pool.begin().await?;
        let now = Utc::now();

        let result = sqlx::query(
            "UPDATE invoices SET paid_amount_cents = paid_amount_cents + ?1, updated_at = ?2 \
             WHERE id = ?3",
        )
        .bind(input.amount)
        .bind(now)
        .bind(invoice_id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Invoice", invoice_id));
        }

        let (total, paid): (Money, Money) = sqlx::query_as(
            "SELECT total_amount_cents, paid_amount_cents FROM invoices WHERE id = ?1",
        )
        .bind(invoice_id)
        .fetch_one(&mut *tx)
        .await?;

        let balance = balance_for(total, paid);
        let status = derive_status(total, paid);

        sqlx::query(
            "UPDATE invoices SET balance_amount_cents = ?1, status = ?2 WHERE id = ?3",
        )
        .bind(balance)
        .bind(status)
        .bind(invoice_id)
        .execute(&mut *tx)
        .await?;

        let payment_id = sqlx::query(
            r#"
            INSERT INTO payments
                (invoice_id, payment_date, amount_cents, method,
                 reference_number, notes, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(invoice_id)
        .bind(input.payment_date)
        .bind(input.amount)
        .bind(input.payment_method)
        .bind(&input.reference_number)
        .bind(&input.notes)
        .bind(now)
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

        tx.commit().await?;

        info!(
            invoice_id,
            payment_id,
            amount = %input.amount,
            status = ?status,
            "Payment recorded"
        );

        let payment = sqlx::query_as::<_, Payment>("SELECT * FROM payments WHERE id = ?1")
            .bind(payment_id)
            .fetch_one(&self.pool)
            .await?;
        let invoice = self.get_by_id(invoice_id).await?;

        Ok((payment, invoice))
    }
}

/// Inserts line items for an invoice within an open transaction.
async fn insert_items(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    invoice_id: i64,
    lines: &[InvoiceLine],
) -> DbResult<()> {
    for line in lines {
        sqlx::query(
            r#"
            INSERT INTO invoice_items
                (invoice_id, product_id, quantity, unit_price_cents,
                 line_total_cents, description)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(invoice_id)
        .bind(line.product_id)
        .bind(line.quantity)
        .bind(line.unit_price)
        .bind(line.line_total)
        .bind(&line.description)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
