//! # Product Repository
//!
//! Database operations for products.
//!
//! ## Identity
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  A product is identified by (company_id, category_id, name):            │
//! │                                                                         │
//! │    Jewelry / "Silver Ring"   ─┐                                         │
//! │    Gifts   / "Silver Ring"   ─┴─ two different products                 │
//! │                                                                         │
//! │  base_price_cents is set once, when the product is first created.       │
//! │  Later rows naming the same product reuse it unchanged.                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::{SqliteExecutor, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;
use tally_core::{Money, Product};

const PRODUCT_COLUMNS: &str =
    "id, company_id, category_id, name, base_price_cents, created_at, updated_at";

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = ProductRepository::new(pool);
///
/// let ring = repo.find(&company_id, &category_id, "Silver Ring").await?;
/// let all = repo.list(&company_id).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Finds a product by exact name inside one category of a company.
    pub async fn find_in<'e, E>(
        executor: E,
        company_id: &str,
        category_id: &str,
        name: &str,
    ) -> DbResult<Option<Product>>
    where
        E: SqliteExecutor<'e>,
    {
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products \
             WHERE company_id = ?1 AND category_id = ?2 AND name = ?3 \
             ORDER BY created_at, id LIMIT 1"
        );

        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(company_id)
            .bind(category_id)
            .bind(name)
            .fetch_optional(executor)
            .await?;

        Ok(product)
    }

    /// Inserts a new product and returns it.
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - name already used in the category
    /// * `Err(DbError::ForeignKeyViolation)` - category doesn't exist
    pub async fn create_in<'e, E>(
        executor: E,
        company_id: &str,
        category_id: &str,
        name: &str,
        base_price: Money,
    ) -> DbResult<Product>
    where
        E: SqliteExecutor<'e>,
    {
        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4().to_string(),
            company_id: company_id.to_string(),
            category_id: category_id.to_string(),
            name: name.to_string(),
            base_price_cents: base_price.cents(),
            created_at: now,
            updated_at: now,
        };

        debug!(
            company_id = %company_id,
            category_id = %category_id,
            name = %name,
            base_price = %base_price,
            "Inserting product"
        );

        sqlx::query(
            r#"
            INSERT INTO products (
                id, company_id, category_id, name,
                base_price_cents, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&product.id)
        .bind(&product.company_id)
        .bind(&product.category_id)
        .bind(&product.name)
        .bind(product.base_price_cents)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(executor)
        .await?;

        Ok(product)
    }

    /// Finds a product by exact name inside one category of a company.
    pub async fn find(
        &self,
        company_id: &str,
        category_id: &str,
        name: &str,
    ) -> DbResult<Option<Product>> {
        Self::find_in(&self.pool, company_id, category_id, name).await
    }

    /// Gets a product by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1");

        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// Lists a company's products by name.
    pub async fn list(&self, company_id: &str) -> DbResult<Vec<Product>> {
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE company_id = ?1 ORDER BY name, category_id"
        );

        let products = sqlx::query_as::<_, Product>(&sql)
            .bind(company_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(products)
    }

    /// Counts a company's products.
    pub async fn count(&self, company_id: &str) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE company_id = ?1")
            .bind(company_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Deletes a product. Sales keep their row with `product_id` cleared.
    pub async fn delete(&self, company_id: &str, id: &str) -> DbResult<bool> {
        let result = sqlx::query("DELETE FROM products WHERE id = ?1 AND company_id = ?2")
            .bind(id)
            .bind(company_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig, DbError};

    #[tokio::test]
    async fn test_same_name_in_two_categories() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let acme = db.companies().create("Acme").await.unwrap();
        let jewelry = db.categories().create(&acme.id, "Jewelry").await.unwrap();
        let gifts = db.categories().create(&acme.id, "Gifts").await.unwrap();

        let a = ProductRepository::create_in(
            db.pool(),
            &acme.id,
            &jewelry.id,
            "Silver Ring",
            Money::from_cents(4500),
        )
        .await
        .unwrap();
        let b = ProductRepository::create_in(
            db.pool(),
            &acme.id,
            &gifts.id,
            "Silver Ring",
            Money::from_cents(3000),
        )
        .await
        .unwrap();

        assert_ne!(a.id, b.id);
        assert_eq!(db.products().count(&acme.id).await.unwrap(), 2);

        let found = db
            .products()
            .find(&acme.id, &gifts.id, "Silver Ring")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.base_price().cents(), 3000);
    }

    #[tokio::test]
    async fn test_duplicate_in_category_rejected() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let acme = db.companies().create("Acme").await.unwrap();
        let jewelry = db.categories().create(&acme.id, "Jewelry").await.unwrap();

        ProductRepository::create_in(db.pool(), &acme.id, &jewelry.id, "Ring", Money::zero())
            .await
            .unwrap();
        let err =
            ProductRepository::create_in(db.pool(), &acme.id, &jewelry.id, "Ring", Money::zero())
                .await
                .unwrap_err();

        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }
}
