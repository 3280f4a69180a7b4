//! # Sale Repository
//!
//! Database operations for sales.
//!
//! ## Sale Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Sale Lifecycle                                    │
//! │                                                                         │
//! │  1. IMPORT                                                             │
//! │     └── insert_in(&mut tx, &sale)   inside the batch transaction       │
//! │                                                                         │
//! │  2. EXPORT / REPORT                                                    │
//! │     └── list_for_export(company, start, end)                           │
//! │         LEFT JOIN stores, products, product_categories                 │
//! │         so a deleted reference reads back as NULL, not a lost row      │
//! │                                                                         │
//! │  3. DELETE                                                             │
//! │     └── only through explicit user action, never by the pipeline       │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::NaiveDate;
use sqlx::{SqliteExecutor, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use tally_core::{ExportRecord, Sale};

const SALE_COLUMNS: &str = "id, company_id, user_id, store_id, product_id, sale_date, quantity, \
     total_cents, card_cents, cash_cents, notes, store_name, product_category, product_name, \
     created_at, updated_at";

/// Repository for sale database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Inserts a sale.
    ///
    /// ## Arguments
    /// * `executor` - pool or transaction connection
    /// * `sale` - Complete sale object to insert
    pub async fn insert_in<'e, E>(executor: E, sale: &Sale) -> DbResult<()>
    where
        E: SqliteExecutor<'e>,
    {
        debug!(id = %sale.id, company_id = %sale.company_id, "Inserting sale");

        sqlx::query(
            r#"
            INSERT INTO sales (
                id, company_id, user_id, store_id, product_id,
                sale_date, quantity, total_cents, card_cents, cash_cents,
                notes, store_name, product_category, product_name,
                created_at, updated_at
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5,
                ?6, ?7, ?8, ?9, ?10,
                ?11, ?12, ?13, ?14,
                ?15, ?16
            )
            "#,
        )
        .bind(&sale.id)
        .bind(&sale.company_id)
        .bind(&sale.user_id)
        .bind(&sale.store_id)
        .bind(&sale.product_id)
        .bind(sale.sale_date)
        .bind(sale.quantity)
        .bind(sale.total_cents)
        .bind(sale.card_cents)
        .bind(sale.cash_cents)
        .bind(&sale.notes)
        .bind(&sale.store_name)
        .bind(&sale.product_category)
        .bind(&sale.product_name)
        .bind(sale.created_at)
        .bind(sale.updated_at)
        .execute(executor)
        .await?;

        Ok(())
    }

    /// Inserts a sale on the pool.
    pub async fn insert(&self, sale: &Sale) -> DbResult<()> {
        Self::insert_in(&self.pool, sale).await
    }

    /// Gets a sale by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Sale>> {
        let sql = format!("SELECT {SALE_COLUMNS} FROM sales WHERE id = ?1");

        let sale = sqlx::query_as::<_, Sale>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(sale)
    }

    /// Lists a company's sales, most recent first.
    pub async fn list(&self, company_id: &str) -> DbResult<Vec<Sale>> {
        let sql = format!(
            "SELECT {SALE_COLUMNS} FROM sales WHERE company_id = ?1 \
             ORDER BY sale_date DESC, created_at DESC"
        );

        let sales = sqlx::query_as::<_, Sale>(&sql)
            .bind(company_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(sales)
    }

    /// Counts a company's sales.
    pub async fn count(&self, company_id: &str) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sales WHERE company_id = ?1")
            .bind(company_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Sales joined with their live store, category and product names.
    ///
    /// ## Filtering
    /// - `start` / `end` are inclusive; `None` leaves that side open
    /// - Ordered by `sale_date` descending, then newest insert first
    ///
    /// Names are `NULL` when the linked row is gone, never dropping the sale.
    pub async fn list_for_export(
        &self,
        company_id: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> DbResult<Vec<ExportRecord>> {
        debug!(
            company_id = %company_id,
            start = ?start,
            end = ?end,
            "Listing sales for export"
        );

        let records = sqlx::query_as::<_, ExportRecord>(
            r#"
            SELECT
                s.id,
                s.sale_date,
                s.quantity,
                s.total_cents,
                s.card_cents,
                s.cash_cents,
                s.notes,
                st.name AS store_name,
                c.name  AS category_name,
                p.name  AS product_name
            FROM sales s
            LEFT JOIN stores st            ON st.id = s.store_id
            LEFT JOIN products p           ON p.id = s.product_id
            LEFT JOIN product_categories c ON c.id = p.category_id
            WHERE s.company_id = ?1
              AND (?2 IS NULL OR s.sale_date >= ?2)
              AND (?3 IS NULL OR s.sale_date <= ?3)
            ORDER BY s.sale_date DESC, s.created_at DESC
            "#,
        )
        .bind(company_id)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        debug!(count = records.len(), "Export query returned sales");
        Ok(records)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use chrono::Utc;
    use uuid::Uuid;

    fn sale(company_id: &str, date: &str, store_id: Option<String>) -> Sale {
        let now = Utc::now();
        Sale {
            id: Uuid::new_v4().to_string(),
            company_id: company_id.to_string(),
            user_id: "importer".to_string(),
            store_id,
            product_id: None,
            sale_date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            quantity: 1,
            total_cents: 1000,
            card_cents: 1000,
            cash_cents: 0,
            notes: None,
            store_name: "Main".to_string(),
            product_category: "General".to_string(),
            product_name: "Unknown Product".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_export_range_is_inclusive_and_descending() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let acme = db.companies().create("Acme").await.unwrap();

        for date in ["2023-12-31", "2024-01-01", "2024-01-15", "2024-01-31", "2024-02-01"] {
            db.sales().insert(&sale(&acme.id, date, None)).await.unwrap();
        }

        let jan1 = NaiveDate::from_ymd_opt(2024, 1, 1);
        let jan31 = NaiveDate::from_ymd_opt(2024, 1, 31);
        let records = db.sales().list_for_export(&acme.id, jan1, jan31).await.unwrap();

        let dates: Vec<String> = records.iter().map(|r| r.sale_date.to_string()).collect();
        assert_eq!(dates, vec!["2024-01-31", "2024-01-15", "2024-01-01"]);

        let all = db.sales().list_for_export(&acme.id, None, None).await.unwrap();
        assert_eq!(all.len(), 5);
    }

    #[tokio::test]
    async fn test_deleted_store_reads_back_as_none() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let acme = db.companies().create("Acme").await.unwrap();
        let store = db.stores().create(&acme.id, "Main", None).await.unwrap();

        db.sales()
            .insert(&sale(&acme.id, "2024-01-01", Some(store.id.clone())))
            .await
            .unwrap();

        let before = db.sales().list_for_export(&acme.id, None, None).await.unwrap();
        assert_eq!(before[0].store_name.as_deref(), Some("Main"));

        assert!(db.stores().delete(&acme.id, &store.id).await.unwrap());

        let after = db.sales().list_for_export(&acme.id, None, None).await.unwrap();
        assert_eq!(after.len(), 1);
        assert_eq!(after[0].store_name, None);
        assert_eq!(after[0].store_label(), "Unknown Store");
    }

    #[tokio::test]
    async fn test_export_is_company_scoped() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let acme = db.companies().create("Acme").await.unwrap();
        let other = db.companies().create("Other").await.unwrap();

        db.sales().insert(&sale(&acme.id, "2024-01-01", None)).await.unwrap();
        db.sales().insert(&sale(&other.id, "2024-01-01", None)).await.unwrap();

        assert_eq!(db.sales().count(&acme.id).await.unwrap(), 1);
        let records = db.sales().list_for_export(&acme.id, None, None).await.unwrap();
        assert_eq!(records.len(), 1);
    }
}
