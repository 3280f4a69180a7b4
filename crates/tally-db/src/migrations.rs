//! # Database Migrations
//!
//! The schema ships inside the binary and is brought up to date whenever a
//! [`Database`](crate::Database) opens with migrations enabled.
//!
//! ## What the Schema Guarantees
//! ```text
//! companies ──┬── stores              UNIQUE (company_id, name)
//!             ├── product_categories  UNIQUE (company_id, name)
//!             │       └── products    UNIQUE (company_id, category_id, name)
//!             └── sales
//!                   ├── store_id   ──► stores    ON DELETE SET NULL
//!                   └── product_id ──► products  ON DELETE SET NULL
//! ```
//!
//! - The UNIQUE keys let find-or-create detect a concurrent insert instead
//!   of producing a duplicate.
//! - A deleted store or product leaves its sales behind with a NULL link,
//!   which export renders as "Unknown Store" / "Unknown Product".
//!
//! New changes go in a new `migrations/sqlite/NNN_description.sql` file.
//! Applied files are checksummed, so never edit one.

use sqlx::SqlitePool;
use tracing::info;

use crate::error::DbResult;

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations/sqlite");

/// Applies every pending migration in filename order.
pub async fn run_migrations(pool: &SqlitePool) -> DbResult<()> {
    MIGRATOR.run(pool).await?;
    info!(migrations = MIGRATOR.migrations.len(), "Schema up to date");
    Ok(())
}

/// Returns `(embedded, applied)` migration counts.
///
/// A database that was never migrated reports zero applied.
pub async fn migration_status(pool: &SqlitePool) -> DbResult<(usize, usize)> {
    let total = MIGRATOR.migrations.len();

    let applied: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations")
        .fetch_one(pool)
        .await
        .unwrap_or(0);

    Ok((total, applied as usize))
}
