//! # Category Repository
//!
//! Product categories, unique by name within a company.

use chrono::Utc;
use sqlx::{SqliteExecutor, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;
use tally_core::ProductCategory;

/// Repository for product category database operations.
#[derive(Debug, Clone)]
pub struct CategoryRepository {
    pool: SqlitePool,
}

impl CategoryRepository {
    /// Creates a new CategoryRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CategoryRepository { pool }
    }

    /// Finds a category by exact name within a company.
    pub async fn find_by_name_in<'e, E>(
        executor: E,
        company_id: &str,
        name: &str,
    ) -> DbResult<Option<ProductCategory>>
    where
        E: SqliteExecutor<'e>,
    {
        let category = sqlx::query_as::<_, ProductCategory>(
            r#"
            SELECT id, company_id, name, created_at
            FROM product_categories
            WHERE company_id = ?1 AND name = ?2
            ORDER BY created_at, id
            LIMIT 1
            "#,
        )
        .bind(company_id)
        .bind(name)
        .fetch_optional(executor)
        .await?;

        Ok(category)
    }

    /// Inserts a new category and returns it.
    pub async fn create_in<'e, E>(
        executor: E,
        company_id: &str,
        name: &str,
    ) -> DbResult<ProductCategory>
    where
        E: SqliteExecutor<'e>,
    {
        let category = ProductCategory {
            id: Uuid::new_v4().to_string(),
            company_id: company_id.to_string(),
            name: name.to_string(),
            created_at: Utc::now(),
        };

        debug!(company_id = %company_id, name = %name, "Inserting category");

        sqlx::query(
            "INSERT INTO product_categories (id, company_id, name, created_at) \
             VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(&category.id)
        .bind(&category.company_id)
        .bind(&category.name)
        .bind(category.created_at)
        .execute(executor)
        .await?;

        Ok(category)
    }

    /// Finds a category by exact name within a company.
    pub async fn find_by_name(
        &self,
        company_id: &str,
        name: &str,
    ) -> DbResult<Option<ProductCategory>> {
        Self::find_by_name_in(&self.pool, company_id, name).await
    }

    /// Creates a category.
    pub async fn create(&self, company_id: &str, name: &str) -> DbResult<ProductCategory> {
        Self::create_in(&self.pool, company_id, name).await
    }

    /// Lists a company's categories by name.
    pub async fn list(&self, company_id: &str) -> DbResult<Vec<ProductCategory>> {
        let categories = sqlx::query_as::<_, ProductCategory>(
            "SELECT id, company_id, name, created_at FROM product_categories \
             WHERE company_id = ?1 ORDER BY name",
        )
        .bind(company_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(categories)
    }

    /// Counts a company's categories.
    pub async fn count(&self, company_id: &str) -> DbResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM product_categories WHERE company_id = ?1")
                .bind(company_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
