//! # Store Repository
//!
//! Database operations for stores.
//!
//! ## Lookup Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  find_by_name_in(company, "Main Store")                                 │
//! │                                                                         │
//! │    WHERE company_id = ? AND name = ?      exact, case-sensitive         │
//! │    ORDER BY created_at, id LIMIT 1        first match wins              │
//! │                                                                         │
//! │  "main store" ≠ "Main Store"    no trimming, no case folding            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::{SqliteExecutor, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;
use tally_core::Store;

const STORE_COLUMNS: &str = "id, company_id, name, location, created_at, updated_at";

/// Repository for store database operations.
#[derive(Debug, Clone)]
pub struct StoreRepository {
    pool: SqlitePool,
}

impl StoreRepository {
    /// Creates a new StoreRepository.
    pub fn new(pool: SqlitePool) -> Self {
        StoreRepository { pool }
    }

    // =========================================================================
    // Executor-generic (usable inside a transaction)
    // =========================================================================

    /// Finds a store by exact name within a company.
    pub async fn find_by_name_in<'e, E>(
        executor: E,
        company_id: &str,
        name: &str,
    ) -> DbResult<Option<Store>>
    where
        E: SqliteExecutor<'e>,
    {
        let sql = format!(
            "SELECT {STORE_COLUMNS} FROM stores \
             WHERE company_id = ?1 AND name = ?2 \
             ORDER BY created_at, id LIMIT 1"
        );

        let store = sqlx::query_as::<_, Store>(&sql)
            .bind(company_id)
            .bind(name)
            .fetch_optional(executor)
            .await?;

        Ok(store)
    }

    /// Inserts a new store and returns it.
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - the name already exists for the company
    pub async fn create_in<'e, E>(
        executor: E,
        company_id: &str,
        name: &str,
        location: Option<&str>,
    ) -> DbResult<Store>
    where
        E: SqliteExecutor<'e>,
    {
        let now = Utc::now();
        let store = Store {
            id: Uuid::new_v4().to_string(),
            company_id: company_id.to_string(),
            name: name.to_string(),
            location: location.map(str::to_string),
            created_at: now,
            updated_at: now,
        };

        debug!(company_id = %company_id, name = %name, "Inserting store");

        sqlx::query(
            "INSERT INTO stores (id, company_id, name, location, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .bind(&store.id)
        .bind(&store.company_id)
        .bind(&store.name)
        .bind(&store.location)
        .bind(store.created_at)
        .bind(store.updated_at)
        .execute(executor)
        .await?;

        Ok(store)
    }

    // =========================================================================
    // Pool methods
    // =========================================================================

    /// Finds a store by exact name within a company.
    pub async fn find_by_name(&self, company_id: &str, name: &str) -> DbResult<Option<Store>> {
        Self::find_by_name_in(&self.pool, company_id, name).await
    }

    /// Creates a store.
    pub async fn create(
        &self,
        company_id: &str,
        name: &str,
        location: Option<&str>,
    ) -> DbResult<Store> {
        Self::create_in(&self.pool, company_id, name, location).await
    }

    /// Lists a company's stores by name.
    pub async fn list(&self, company_id: &str) -> DbResult<Vec<Store>> {
        let sql = format!("SELECT {STORE_COLUMNS} FROM stores WHERE company_id = ?1 ORDER BY name");

        let stores = sqlx::query_as::<_, Store>(&sql)
            .bind(company_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(stores)
    }

    /// Counts a company's stores.
    pub async fn count(&self, company_id: &str) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM stores WHERE company_id = ?1")
            .bind(company_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Deletes a store. Sales keep their row with `store_id` cleared.
    ///
    /// ## Returns
    /// * `Ok(true)` - a store was deleted
    /// * `Ok(false)` - no store with that ID in the company
    pub async fn delete(&self, company_id: &str, id: &str) -> DbResult<bool> {
        let result = sqlx::query("DELETE FROM stores WHERE id = ?1 AND company_id = ?2")
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
    async fn test_find_is_exact_and_company_scoped() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let acme = db.companies().create("Acme").await.unwrap();
        let other = db.companies().create("Other").await.unwrap();

        let store = db
            .stores()
            .create(&acme.id, "Main Store", Some("Downtown"))
            .await
            .unwrap();

        let found = db.stores().find_by_name(&acme.id, "Main Store").await.unwrap();
        assert_eq!(found.unwrap().id, store.id);

        assert!(db.stores().find_by_name(&acme.id, "main store").await.unwrap().is_none());
        assert!(db.stores().find_by_name(&other.id, "Main Store").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_name_is_unique_violation() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let acme = db.companies().create("Acme").await.unwrap();

        db.stores().create(&acme.id, "Main", None).await.unwrap();
        let err = db.stores().create(&acme.id, "Main", None).await.unwrap_err();

        assert!(matches!(err, DbError::UniqueViolation { .. }), "{err:?}");
        assert_eq!(db.stores().count(&acme.id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_create_inside_transaction_is_visible_to_it() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let acme = db.companies().create("Acme").await.unwrap();

        let mut tx = db.pool().begin().await.unwrap();
        let created = StoreRepository::create_in(&mut *tx, &acme.id, "Pop-up", None)
            .await
            .unwrap();
        let found = StoreRepository::find_by_name_in(&mut *tx, &acme.id, "Pop-up")
            .await
            .unwrap();
        assert_eq!(found.map(|s| s.id), Some(created.id));
        tx.rollback().await.unwrap();

        assert_eq!(db.stores().count(&acme.id).await.unwrap(), 0);
    }
}
