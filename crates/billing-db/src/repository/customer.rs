//! # Customer Repository
//!
//! CRUD operations for customers. No lifecycle coupling to invoices:
//! deleting a customer with invoices fails on the foreign key, which the
//! API surfaces as an error rather than cascading.

use chrono::Utc;
use serde::Deserialize;
use sqlx::SqlitePool;
use tracing::debug;

use billing_core::{validation, Customer, Money};

use crate::error::{DbError, DbResult};

// =============================================================================
// Input Types
// =============================================================================

/// Input for creating a customer.
#[derive(Debug, Clone, Deserialize)]
pub struct NewCustomer {
    pub name: String,
    #[serde(default)]
    pub business_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub pincode: Option<String>,
    #[serde(default)]
    pub tax_id: Option<String>,
    /// Decimal currency units; stored as cents.
    #[serde(default)]
    pub credit_limit: f64,
}

/// Input for updating a customer. All fields are replaced.
pub type CustomerUpdate = NewCustomer;

// =============================================================================
// Repository
// =============================================================================

/// Repository for customer records.
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
}

impl CustomerRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CustomerRepository { pool }
    }

    /// Creates a new customer and returns the stored row.
    pub async fn create(&self, input: NewCustomer) -> DbResult<Customer> {
        validation::validate_name(&input.name)
            .map_err(|e| DbError::Validation(format!("invalid customer name: {e}")))?;

        let now = Utc::now();
        let credit_limit = Money::from_decimal(input.credit_limit);

        let id = sqlx::query(
            r#"
            INSERT INTO customers
                (name, business_name, phone, email, address, city, state,
                 pincode, tax_id, credit_limit_cents, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            "#,
        )
        .bind(&input.name)
        .bind(&input.business_name)
        .bind(&input.phone)
        .bind(&input.email)
        .bind(&input.address)
        .bind(&input.city)
        .bind(&input.state)
        .bind(&input.pincode)
        .bind(&input.tax_id)
        .bind(credit_limit)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?
        .last_insert_rowid();

        debug!(customer_id = id, "Customer created");
        self.get_by_id(id).await
    }

    /// Fetches a customer by ID.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Customer> {
        sqlx::query_as::<_, Customer>("SELECT * FROM customers WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Customer", id))
    }

    /// Lists all customers, most recently created first.
    pub async fn list(&self) -> DbResult<Vec<Customer>> {
        let customers =
            sqlx::query_as::<_, Customer>("SELECT * FROM customers ORDER BY created_at DESC")
                .fetch_all(&self.pool)
                .await?;
        Ok(customers)
    }

    /// Replaces all mutable fields of a customer.
    pub async fn update(&self, id: i64, input: CustomerUpdate) -> DbResult<Customer> {
        validation::validate_name(&input.name)
            .map_err(|e| DbError::Validation(format!("invalid customer name: {e}")))?;

        let credit_limit = Money::from_decimal(input.credit_limit);

        let result = sqlx::query(
            r#"
            UPDATE customers SET
                name = ?1, business_name = ?2, phone = ?3, email = ?4,
                address = ?5, city = ?6, state = ?7, pincode = ?8,
                tax_id = ?9, credit_limit_cents = ?10, updated_at = ?11
            WHERE id = ?12
            "#,
        )
        .bind(&input.name)
        .bind(&input.business_name)
        .bind(&input.phone)
        .bind(&input.email)
        .bind(&input.address)
        .bind(&input.city)
        .bind(&input.state)
        .bind(&input.pincode)
        .bind(&input.tax_id)
        .bind(credit_limit)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Customer", id));
        }

        self.get_by_id(id).await
    }

    /// Deletes a customer.
    ///
    /// Fails with a foreign key violation if invoices reference the
    /// customer; the caller decides how to surface that.
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM customers WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Customer", id));
        }

        debug!(customer_id = id, "Customer deleted");
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
