//! # tally-db: Database Layer for Tally
//!
//! This crate provides database access for Tally.
//! It uses SQLite for storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Tally Data Flow                                  │
//! │                                                                         │
//! │  tally-interchange (importer / exporter)                               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     tally-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │               │    │  (embedded)  │  │   │
//! │  │   │               │    │ CompanyRepo   │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ StoreRepo     │    │ 001_init.sql │  │   │
//! │  │   │ Connection    │    │ CategoryRepo  │    │              │  │   │
//! │  │   │ Management    │    │ ProductRepo   │    │              │  │   │
//! │  │   │               │    │ SaleRepo      │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database (tally.db)                  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations
//!
//! ## Two Ways to Query
//!
//! Repository methods taking `&self` run on the pool. The `*_in` associated
//! functions take any SQLite executor, so an importer can run lookups and
//! inserts on its own transaction and see rows it has not committed yet.
//!
//! ```rust,ignore
//! use tally_db::{Database, DbConfig, StoreRepository};
//!
//! let db = Database::new(DbConfig::new("tally.db")).await?;
//!
//! let mut tx = db.pool().begin().await?;
//! let store = StoreRepository::find_by_name_in(&mut *tx, &company_id, "Main Store").await?;
//! tx.commit().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::category::CategoryRepository;
pub use repository::company::CompanyRepository;
pub use repository::product::ProductRepository;
pub use repository::sale::SaleRepository;
pub use repository::store::StoreRepository;
