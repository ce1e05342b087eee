//! # Product Repository
//!
//! Catalog CRUD. Listing returns active products only; `deactivate`
//! soft-deletes (sets `is_active = 0`) so historical invoice lines keep a
//! resolvable product reference, while `delete` removes the row outright.

use chrono::Utc;
use serde::Deserialize;
use sqlx::SqlitePool;
use tracing::debug;

use billing_core::{validation, Money, Product};

use crate::error::{DbError, DbResult};

// =============================================================================
// Input Types
// =============================================================================

/// Input for creating a product.
#[derive(Debug, Clone, Deserialize)]
pub struct NewProduct {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub material: Option<String>,
    /// Decimal currency units; stored as cents.
    pub unit_price: f64,
    #[serde(default)]
    pub stock_quantity: i64,
    #[serde(default = "default_minimum_stock")]
    pub minimum_stock: i64,
}

fn default_minimum_stock() -> i64 {
    10
}

/// Input for updating a product. All fields are replaced.
pub type ProductUpdate = NewProduct;

// =============================================================================
// Repository
// =============================================================================

/// Repository for catalog products.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Creates a new product and returns the stored row.
    pub async fn create(&self, input: NewProduct) -> DbResult<Product> {
        validation::validate_name(&input.name)
            .map_err(|e| DbError::Validation(format!("invalid product name: {e}")))?;
        validation::validate_unit_price(input.unit_price)
            .map_err(|e| DbError::Validation(format!("invalid unit price: {e}")))?;

        let now = Utc::now();
        let unit_price = Money::from_decimal(input.unit_price);

        let id = sqlx::query(
            r#"
            INSERT INTO products
                (name, description, category, size, color, material,
                 unit_price_cents, stock_quantity, minimum_stock, is_active,
                 created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, 1, ?10, ?11)
            "#,
        )
        .bind(&input.name)
        .bind(&input.description)
        .bind(&input.category)
        .bind(&input.size)
        .bind(&input.color)
        .bind(&input.material)
        .bind(unit_price)
        .bind(input.stock_quantity)
        .bind(input.minimum_stock)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?
        .last_insert_rowid();

        debug!(product_id = id, "Product created");
        self.get_by_id(id).await
    }

    /// Fetches a product by ID (active or not).
    pub async fn get_by_id(&self, id: i64) -> DbResult<Product> {
        sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))
    }

    /// Lists active products, alphabetically.
    pub async fn list(&self) -> DbResult<Vec<Product>> {
        let products =
            sqlx::query_as::<_, Product>("SELECT * FROM products WHERE is_active = 1 ORDER BY name")
                .fetch_all(&self.pool)
                .await?;
        Ok(products)
    }

    /// Replaces all mutable fields of a product.
    pub async fn update(&self, id: i64, input: ProductUpdate) -> DbResult<Product> {
        validation::validate_name(&input.name)
            .map_err(|e| DbError::Validation(format!("invalid product name: {e}")))?;
        validation::validate_unit_price(input.unit_price)
            .map_err(|e| DbError::Validation(format!("invalid unit price: {e}")))?;

        let unit_price = Money::from_decimal(input.unit_price);

        let result = sqlx::query(
            r#"
            UPDATE products SET
                name = ?1, description = ?2, category = ?3, size = ?4,
                color = ?5, material = ?6, unit_price_cents = ?7,
                stock_quantity = ?8, minimum_stock = ?9, updated_at = ?10
            WHERE id = ?11
            "#,
        )
        .bind(&input.name)
        .bind(&input.description)
        .bind(&input.category)
        .bind(&input.size)
        .bind(&input.color)
        .bind(&input.material)
        .bind(unit_price)
        .bind(input.stock_quantity)
        .bind(input.minimum_stock)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        self.get_by_id(id).await
    }

    /// Soft-deletes a product. Existing invoice lines keep referencing it;
    /// it simply stops appearing in catalog listings.
    pub async fn deactivate(&self, id: i64) -> DbResult<()> {
        let result =
            sqlx::query("UPDATE products SET is_active = 0, updated_at = ?1 WHERE id = ?2")
                .bind(Utc::now())
                .bind(id)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        debug!(product_id = id, "Product deactivated");
        Ok(())
    }

    /// Hard-deletes a product. Fails on the foreign key if any invoice
    /// line references it.
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        debug!(product_id = id, "Product deleted");
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    fn sample(name: &str, price: f64) -> NewProduct {
        NewProduct {
            name: name.to_string(),
            description: None,
            category: Some("Fasteners".to_string()),
            size: None,
            color: None,
            material: Some("Steel".to_string()),
            unit_price: price,
            stock_quantity: 100,
            minimum_stock: 10,
        }
    }

    #[tokio::test]
    async fn test_create_stores_price_as_cents() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let product = db.products().create(sample("Hex Bolt M8", 10.99)).await.unwrap();
        assert_eq!(product.unit_price.cents(), 1099);
        assert!(product.is_active);
    }

    #[tokio::test]
    async fn test_list_excludes_deactivated() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.products();

        let a = repo.create(sample("Anchor", 5.0)).await.unwrap();
        let b = repo.create(sample("Bracket", 7.5)).await.unwrap();
        repo.deactivate(a.id).await.unwrap();

        let listed = repo.list().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, b.id);

        // Still fetchable directly
        let fetched = repo.get_by_id(a.id).await.unwrap();
        assert!(!fetched.is_active);
    }

    #[tokio::test]
    async fn test_negative_price_rejected() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        assert!(matches!(
            db.products().create(sample("Bad", -1.0)).await,
            Err(DbError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_hard_delete_removes_row() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.products();
        let p = repo.create(sample("Washer", 0.5)).await.unwrap();
        repo.delete(p.id).await.unwrap();
        assert!(repo.get_by_id(p.id).await.is_err());
    }
}
