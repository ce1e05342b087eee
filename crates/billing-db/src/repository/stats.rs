//! # Dashboard Statistics Repository
//!
//! Read-only aggregates for the dashboard view: entity counts, revenue
//! totals, and the most recent invoices. Sums COALESCE to zero so an
//! empty database renders a clean all-zeros dashboard.

use serde::Serialize;
use sqlx::SqlitePool;

use billing_core::Money;

use crate::error::DbResult;
use crate::repository::invoice::InvoiceSummary;

/// How many invoices the dashboard's recent list shows.
const RECENT_INVOICE_LIMIT: i64 = 5;

// =============================================================================
// Projection
// =============================================================================

/// Aggregate figures for the dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardStats {
    pub total_customers: i64,
    pub total_products: i64,
    pub total_invoices: i64,
    pub pending_invoices: i64,
    /// Sum of all invoice totals.
    pub total_revenue: Money,
    /// Sum of all recorded payments (via invoice paid amounts).
    pub total_paid: Money,
    /// Sum of all open balances.
    pub total_outstanding: Money,
    pub recent_invoices: Vec<InvoiceSummary>,
}

// =============================================================================
// Repository
// =============================================================================

/// Read-only repository for dashboard aggregates.
#[derive(Debug, Clone)]
pub struct StatsRepository {
    pool: SqlitePool,
}

impl StatsRepository {
    pub fn new(pool: SqlitePool) -> Self {
        StatsRepository { pool }
    }

    /// Computes all dashboard figures.
    ///
    /// Counts and sums run as separate read queries; under WAL each sees a
    /// consistent snapshot and the dashboard tolerates skew between them.
    pub async fn dashboard(&self) -> DbResult<DashboardStats> {
        let total_customers: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM customers")
            .fetch_one(&self.pool)
            .await?;

        let total_products: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE is_active = 1")
                .fetch_one(&self.pool)
                .await?;

        let (total_invoices, pending_invoices, total_revenue, total_paid, total_outstanding): (
            i64,
            i64,
            Money,
            Money,
            Money,
        ) = sqlx::query_as(
            r#"
            SELECT
                COUNT(*),
                COUNT(CASE WHEN status != 'paid' THEN 1 END),
                COALESCE(SUM(total_amount_cents), 0),
                COALESCE(SUM(paid_amount_cents), 0),
                COALESCE(SUM(balance_amount_cents), 0)
            FROM invoices
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        let recent_invoices = sqlx::query_as::<_, InvoiceSummary>(
            r#"
            SELECT i.*, c.name AS customer_name
            FROM invoices i
            JOIN customers c ON c.id = i.customer_id
            ORDER BY i.created_at DESC, i.id DESC
            LIMIT ?1
            "#,
        )
        .bind(RECENT_INVOICE_LIMIT)
        .fetch_all(&self.pool)
        .await?;

        Ok(DashboardStats {
            total_customers,
            total_products,
            total_invoices,
            pending_invoices,
            total_revenue,
            total_paid,
            total_outstanding,
            recent_invoices,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use crate::repository::customer::NewCustomer;
    use crate::repository::invoice::{NewInvoice, NewPayment};
    use crate::repository::product::NewProduct;
    use billing_core::{compute_totals, normalize_items, DiscountType, PaymentMethod, RawLineItem};
    use chrono::NaiveDate;

    #[tokio::test]
    async fn test_empty_database_all_zeros() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let stats = db.stats().dashboard().await.unwrap();

        assert_eq!(stats.total_customers, 0);
        assert_eq!(stats.total_invoices, 0);
        assert_eq!(stats.total_revenue.cents(), 0);
        assert!(stats.recent_invoices.is_empty());
    }

    #[tokio::test]
    async fn test_aggregates_reflect_invoices_and_payments() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let customer = db
            .customers()
            .create(NewCustomer {
                name: "Stat Customer".to_string(),
                business_name: None,
                phone: None,
                email: None,
                address: None,
                city: None,
                state: None,
                pincode: None,
                tax_id: None,
                credit_limit: 0.0,
            })
            .await
            .unwrap();
        let product = db
            .products()
            .create(NewProduct {
                name: "Stat Widget".to_string(),
                description: None,
                category: None,
                size: None,
                color: None,
                material: None,
                unit_price: 25.0,
                stock_quantity: 10,
                minimum_stock: 1,
            })
            .await
            .unwrap();

        let lines = normalize_items(&[RawLineItem {
            product_id: product.id,
            quantity: 4.0,
            unit_price: 25.0,
            description: None,
        }]);
        let totals = compute_totals(&lines, DiscountType::None, 0.0).unwrap();
        let invoice = db
            .invoices()
            .create(NewInvoice {
                customer_id: customer.id,
                invoice_date: NaiveDate::from_ymd_opt(2026, 8, 25).unwrap(),
                due_date: None,
                notes: None,
                lines,
                totals,
            })
            .await
            .unwrap();

        db.invoices()
            .record_payment(
                invoice.id,
                NewPayment {
                    amount: Money::from_cents(4000),
                    payment_date: NaiveDate::from_ymd_opt(2026, 8, 25).unwrap(),
                    payment_method: PaymentMethod::Cash,
                    reference_number: None,
                    notes: None,
                },
            )
            .await
            .unwrap();

        let stats = db.stats().dashboard().await.unwrap();
        assert_eq!(stats.total_customers, 1);
        assert_eq!(stats.total_products, 1);
        assert_eq!(stats.total_invoices, 1);
        assert_eq!(stats.pending_invoices, 1); // partial counts as open
        assert_eq!(stats.total_revenue.cents(), 10000);
        assert_eq!(stats.total_paid.cents(), 4000);
        assert_eq!(stats.total_outstanding.cents(), 6000);
        assert_eq!(stats.recent_invoices.len(), 1);
    }
}
