//! # Sales Importer
//!
//! Turns CSV text into persisted sales, one row at a time, without letting
//! a bad row stop the file.
//!
//! ## Transaction Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  import_with_progress (batch_size = 50)                                │
//! │                                                                         │
//! │  BEGIN ─────────────────────────────────────────────── COMMIT  batch 1 │
//! │    SAVEPOINT row 2 ─ decode ─ resolve ─ insert ─ RELEASE               │
//! │    row 3 ─ decode ✗ (no savepoint taken) ─────────────────  "Row 3: …"│
//! │    SAVEPOINT row 4 ─ decode ─ resolve ✗ ────── ROLLBACK TO   "Row 4: …"│
//! │    ...                                                                  │
//! │  BEGIN ─────────────────────────────────────────────── COMMIT  batch 2 │
//! │    ...                                                                  │
//! │                                                                         │
//! │  import: same thing with a single batch covering the whole file        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! - A failed row rolls back only its own savepoint, so a store it created
//!   doesn't outlive it.
//! - A failed batch commit loses only that batch. Earlier batches are
//!   already durable and later ones still run.
//! - Row numbers in messages count the header as row 1.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::{Connection, SqliteConnection};
use tracing::{error, info, warn};
use ts_rs::TS;
use uuid::Uuid;

use tally_core::codec::{decode_row, missing_headers_message, SaleRowReader};
use tally_core::{CoreResult, Sale, SaleRow};
use tally_db::{Database, DbError, SaleRepository};

use crate::config::ImportSettings;
use crate::error::InterchangeResult;
use crate::locks::TenantLocks;
use crate::progress::{percent_of, NoOpProgress, ProgressSink};
use crate::resolver::ReferenceResolver;

/// First data row number; the header is row 1.
const FIRST_DATA_ROW: usize = 2;

// =============================================================================
// Import Outcome
// =============================================================================

/// What an import did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ImportOutcome {
    /// Rows persisted.
    pub successful: usize,

    /// Rows that failed, including rows lost to a failed batch commit.
    pub failed: usize,

    /// Every error, in file order (`"Row <n>: <message>"`).
    pub errors: Vec<String>,
}

impl ImportOutcome {
    fn rejected(message: String) -> Self {
        ImportOutcome {
            successful: 0,
            failed: 0,
            errors: vec![message],
        }
    }

    /// The first `limit` errors, for showing to a user.
    pub fn display_errors(&self, limit: usize) -> &[String] {
        &self.errors[..self.errors.len().min(limit)]
    }

    /// Errors beyond the first `limit`.
    pub fn hidden_error_count(&self, limit: usize) -> usize {
        self.errors.len().saturating_sub(limit)
    }

    /// True when every row made it in.
    pub fn is_clean(&self) -> bool {
        self.failed == 0 && self.errors.is_empty()
    }
}

// =============================================================================
// Sales Importer
// =============================================================================

/// Imports CSV sales for one company.
#[derive(Debug, Clone)]
pub struct SalesImporter {
    db: Database,
    company_id: String,
    settings: ImportSettings,
    locks: TenantLocks,
}

impl SalesImporter {
    /// Creates an importer. Imports sharing `locks` never overlap for the
    /// same company.
    pub fn new(
        db: Database,
        company_id: impl Into<String>,
        settings: ImportSettings,
        locks: TenantLocks,
    ) -> Self {
        SalesImporter {
            db,
            company_id: company_id.into(),
            settings,
            locks,
        }
    }

    pub fn company_id(&self) -> &str {
        &self.company_id
    }

    /// Imports the whole file in one transaction.
    ///
    /// ## Returns
    /// * `Ok(outcome)` - per-row failures are inside the outcome
    /// * `Err(_)` - the CSV header couldn't be read or the database refused
    ///   to start a transaction
    pub async fn import(&self, csv: &str, user_id: &str) -> InterchangeResult<ImportOutcome> {
        self.run(csv, user_id, None, &NoOpProgress).await
    }

    /// Imports in batches of `batch_size`, reporting after every row.
    pub async fn import_with_progress(
        &self,
        csv: &str,
        user_id: &str,
        progress: &dyn ProgressSink,
    ) -> InterchangeResult<ImportOutcome> {
        self.run(csv, user_id, Some(self.settings.batch_size), progress)
            .await
    }

    async fn run(
        &self,
        csv: &str,
        user_id: &str,
        batch_size: Option<usize>,
        progress: &dyn ProgressSink,
    ) -> InterchangeResult<ImportOutcome> {
        let mut reader = SaleRowReader::new(csv)?;

        let missing = reader.missing_required_headers();
        if !missing.is_empty() {
            let message = missing_headers_message(&missing);
            warn!(company_id = %self.company_id, "{}", message);
            return Ok(ImportOutcome::rejected(message));
        }

        let rows: Vec<CoreResult<SaleRow>> = reader.rows().collect();
        let total = rows.len();
        let batch_size = batch_size.unwrap_or(total).max(1);

        let _guard = self.locks.acquire(&self.company_id).await;

        info!(
            company_id = %self.company_id,
            user_id = %user_id,
            rows = total,
            batch_size,
            "Starting sales import"
        );
        progress.report(0, "Starting import", &format!("{} rows to process", total));

        let resolver = ReferenceResolver::new(&self.company_id);
        let mut outcome = ImportOutcome::default();
        let mut processed = 0;

        for (batch_index, batch) in rows.chunks(batch_size).enumerate() {
            let first_row = batch_index * batch_size + FIRST_DATA_ROW;
            let last_row = first_row + batch.len() - 1;

            let mut tx = self.db.pool().begin().await.map_err(DbError::transaction)?;
            let mut staged = 0;

            for (offset, row) in batch.iter().enumerate() {
                let row_number = first_row + offset;

                match self.import_row(&mut tx, &resolver, row, user_id).await {
                    Ok(()) => staged += 1,
                    Err(message) => {
                        warn!(company_id = %self.company_id, row = row_number, error = %message, "Row failed");
                        outcome.failed += 1;
                        outcome.errors.push(format!("Row {}: {}", row_number, message));
                    }
                }

                processed += 1;
                progress.report(
                    percent_of(processed, total),
                    &format!("Processing row {} of {}", processed, total),
                    &format!(
                        "{} successful, {} failed",
                        outcome.successful + staged,
                        outcome.failed
                    ),
                );
            }

            match tx.commit().await {
                Ok(()) => outcome.successful += staged,
                Err(err) => {
                    error!(
                        company_id = %self.company_id,
                        first_row,
                        last_row,
                        lost = staged,
                        error = %err,
                        "Batch commit failed"
                    );
                    outcome.failed += staged;
                    outcome.errors.push(format!(
                        "Rows {}-{}: database error during commit: {}",
                        first_row, last_row, err
                    ));
                }
            }
        }

        info!(
            company_id = %self.company_id,
            successful = outcome.successful,
            failed = outcome.failed,
            "Sales import finished"
        );
        progress.report(
            100,
            "Import complete",
            &format!(
                "{} successful, {} failed",
                outcome.successful, outcome.failed
            ),
        );

        Ok(outcome)
    }

    /// Runs one row inside its own savepoint. The error is the row's message.
    async fn import_row(
        &self,
        conn: &mut SqliteConnection,
        resolver: &ReferenceResolver<'_>,
        row: &CoreResult<SaleRow>,
        user_id: &str,
    ) -> Result<(), String> {
        let row = row.as_ref().map_err(|e| e.to_string())?;
        let decoded = decode_row(row).map_err(|e| e.to_string())?;

        let mut savepoint = conn
            .begin()
            .await
            .map_err(|e| DbError::transaction(e).to_string())?;

        let staged: Result<(), DbError> = async {
            let refs = resolver.resolve(&mut savepoint, &decoded).await?;

            let now = Utc::now();
            let sale = Sale {
                id: Uuid::new_v4().to_string(),
                company_id: self.company_id.clone(),
                user_id: user_id.to_string(),
                store_id: Some(refs.store.id),
                product_id: Some(refs.product.id),
                sale_date: decoded.sale_date,
                quantity: decoded.quantity,
                total_cents: decoded.total.cents(),
                card_cents: decoded.card.cents(),
                cash_cents: decoded.cash.cents(),
                notes: decoded.notes.clone(),
                store_name: refs.store.name,
                product_category: refs.category.name,
                product_name: refs.product.name,
                created_at: now,
                updated_at: now,
            };

            SaleRepository::insert_in(&mut *savepoint, &sale).await
        }
        .await;

        match staged {
            Ok(()) => savepoint
                .commit()
                .await
                .map_err(|e| DbError::transaction(e).to_string()),
            Err(err) => {
                if let Err(rollback) = savepoint.rollback().await {
                    error!(error = %rollback, "Failed to roll back row savepoint");
                }
                Err(err.to_string())
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::FnProgress;
    use std::sync::Mutex;
    use tally_db::DbConfig;

    async fn setup() -> (Database, String) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let company = db.companies().create("Acme").await.unwrap();
        (db, company.id)
    }

    fn importer(db: &Database, company_id: &str, batch_size: usize) -> SalesImporter {
        let settings = ImportSettings {
            batch_size,
            ..ImportSettings::default()
        };
        SalesImporter::new(db.clone(), company_id, settings, TenantLocks::new())
    }

    #[test]
    fn test_display_errors_caps() {
        let outcome = ImportOutcome {
            successful: 0,
            failed: 12,
            errors: (2..14).map(|n| format!("Row {}: bad", n)).collect(),
        };
        assert_eq!(outcome.display_errors(10).len(), 10);
        assert_eq!(outcome.display_errors(10)[0], "Row 2: bad");
        assert_eq!(outcome.hidden_error_count(10), 2);
        assert_eq!(outcome.display_errors(50).len(), 12);
        assert!(!outcome.is_clean());
    }

    #[tokio::test]
    async fn test_missing_header_touches_nothing() {
        let (db, company_id) = setup().await;
        let outcome = importer(&db, &company_id, 50)
            .import("store_name,quantity\nMain,1\n", "u1")
            .await
            .unwrap();

        assert_eq!(outcome.successful, 0);
        assert_eq!(outcome.failed, 0);
        assert_eq!(outcome.errors, vec!["Missing required headers: sale_date"]);
        assert_eq!(db.stores().count(&company_id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_bad_date_row_is_skipped() {
        let (db, company_id) = setup().await;
        let csv = "sale_date,store_name,total\n\
                   2024-01-01,Main,10.00\n\
                   01/02/2024,Ghost,10.00\n\
                   2024-01-03,Main,10.00\n";

        let outcome = importer(&db, &company_id, 50).import(csv, "u1").await.unwrap();

        assert_eq!(outcome.successful, 2);
        assert_eq!(outcome.failed, 1);
        assert_eq!(
            outcome.errors,
            vec!["Row 3: Invalid date format in sale_date: 01/02/2024"]
        );
        assert!(db.stores().find_by_name(&company_id, "Ghost").await.unwrap().is_none());
        assert_eq!(db.stores().count(&company_id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_progress_reports_every_row_then_completes() {
        let (db, company_id) = setup().await;
        let csv = "sale_date,total\n2024-01-01,1.00\n2024-01-02,2.00\n2024-01-03,3.00\n";

        let reports = Mutex::new(Vec::new());
        let sink = FnProgress::new(|percent, status, detail| {
            reports
                .lock()
                .unwrap()
                .push((percent, status.to_string(), detail.to_string()));
        });

        let outcome = importer(&db, &company_id, 2)
            .import_with_progress(csv, "u1", &sink)
            .await
            .unwrap();
        assert_eq!(outcome.successful, 3);

        let reports = reports.into_inner().unwrap();
        let percents: Vec<u8> = reports.iter().map(|r| r.0).collect();
        assert_eq!(percents, vec![0, 33, 66, 100, 100]);

        let last = reports.last().unwrap();
        assert_eq!(last.1, "Import complete");
        assert_eq!(last.2, "3 successful, 0 failed");
    }

    #[tokio::test]
    async fn test_batches_commit_independently() {
        let (db, company_id) = setup().await;
        let mut csv = String::from("sale_date,store_name,total\n");
        for day in 1..=7 {
            csv.push_str(&format!("2024-01-{:02},Main,5.00\n", day));
        }

        let outcome = importer(&db, &company_id, 3)
            .import_with_progress(&csv, "u1", &NoOpProgress)
            .await
            .unwrap();

        assert_eq!(outcome.successful, 7);
        assert!(outcome.is_clean());
        assert_eq!(db.sales().count(&company_id).await.unwrap(), 7);
        assert_eq!(db.stores().count(&company_id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_failed_commit_loses_only_its_batch() {
        let (db, company_id) = setup().await;

        // A deferred foreign key only fails at COMMIT. The trigger plants a
        // dangling reference whenever a sale carries the marker note.
        for statement in [
            "CREATE TABLE commit_parent (id TEXT PRIMARY KEY)",
            "CREATE TABLE commit_child (parent_id TEXT REFERENCES commit_parent(id) \
             DEFERRABLE INITIALLY DEFERRED)",
            "CREATE TRIGGER plant_dangling_ref AFTER INSERT ON sales \
             WHEN NEW.notes = 'fail-commit' \
             BEGIN INSERT INTO commit_child (parent_id) VALUES ('missing'); END",
        ] {
            sqlx::query(statement).execute(db.pool()).await.unwrap();
        }

        let mut csv = String::from("sale_date,total,notes\n");
        for day in 1..=7 {
            let note = if day == 5 { "fail-commit" } else { "" };
            csv.push_str(&format!("2024-01-{:02},5.00,{}\n", day, note));
        }

        // Batches cover file rows 2-4, 5-7 and 8.
        let outcome = importer(&db, &company_id, 3)
            .import_with_progress(&csv, "u1", &NoOpProgress)
            .await
            .unwrap();

        assert_eq!(outcome.successful, 4);
        assert_eq!(outcome.failed, 3);
        assert_eq!(outcome.errors.len(), 1);
        assert!(
            outcome.errors[0].starts_with("Rows 5-7: database error during commit: "),
            "{}",
            outcome.errors[0]
        );

        let mut days: Vec<u32> = db
            .sales()
            .list(&company_id)
            .await
            .unwrap()
            .iter()
            .map(|sale| chrono::Datelike::day(&sale.sale_date))
            .collect();
        days.sort_unstable();
        assert_eq!(days, vec![1, 2, 3, 7]);
    }

    #[tokio::test]
    async fn test_huge_amounts_do_not_abort_the_import() {
        let (db, company_id) = setup().await;
        let csv = "sale_date,total,card_amount,cash_amount\n\
                   2024-01-01,10.00,90000000000000000,90000000000000000\n\
                   2024-01-02,99999999999999999999999,0,0\n\
                   2024-01-03,4.00,4.00,0\n";

        let outcome = importer(&db, &company_id, 50).import(csv, "u1").await.unwrap();

        assert_eq!((outcome.successful, outcome.failed), (3, 0));

        let mut sales = db.sales().list(&company_id).await.unwrap();
        sales.sort_by_key(|sale| sale.sale_date);
        let amounts: Vec<(i64, i64, i64)> = sales
            .iter()
            .map(|sale| (sale.total_cents, sale.card_cents, sale.cash_cents))
            .collect();
        assert_eq!(amounts, vec![(1000, 0, 1000), (0, 0, 0), (400, 400, 0)]);
    }

    #[tokio::test]
    async fn test_empty_file_imports_nothing() {
        let (db, company_id) = setup().await;
        let outcome = importer(&db, &company_id, 50)
            .import("sale_date,total\n", "u1")
            .await
            .unwrap();

        assert_eq!(outcome, ImportOutcome::default());
    }

    #[tokio::test]
    async fn test_unknown_company_fails_rows_not_import() {
        let (db, _) = setup().await;
        let outcome = importer(&db, "no-such-company", 50)
            .import("sale_date,total\n2024-01-01,1.00\n", "u1")
            .await
            .unwrap();

        assert_eq!(outcome.successful, 0);
        assert_eq!(outcome.failed, 1);
        assert!(outcome.errors[0].starts_with("Row 2: "));
    }
}
