//! # tally-interchange: Sales Import / Export for Tally
//!
//! Moves a company's sales between CSV files and the database.
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Interchange Architecture                            │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │               InterchangeService (one company)                   │  │
//! │  │                                                                  │  │
//! │  │  validate(csv) ── header + sample-row pre-flight check           │  │
//! │  └───────────────┬───────────────────────────────┬──────────────────┘  │
//! │                  ▼                               ▼                      │
//! │  ┌────────────────────────────┐   ┌────────────────────────────────┐   │
//! │  │ SalesImporter              │   │ SalesExporter                  │   │
//! │  │                            │   │                                │   │
//! │  │ decode row ─► resolve refs │   │ date-filtered query ─► CSV     │   │
//! │  │ ─► insert sale, savepoint  │   │ template download              │   │
//! │  │ per row, batched commits   │   │ sales summary                  │   │
//! │  └─────────────┬──────────────┘   └────────────────────────────────┘   │
//! │                │                                                        │
//! │      ┌─────────┼──────────────┬──────────────────┐                      │
//! │      ▼         ▼              ▼                  ▼                      │
//! │  ReferenceResolver     TenantLocks        ProgressSink ◄── ImportJobs   │
//! │  find-or-create        one import per     per-row        pollable       │
//! │  store/category/       company at a time  updates        background     │
//! │  product                                                 imports        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//! - [`config`] - TOML + environment configuration
//! - [`error`] - Whole-operation error types
//! - [`exporter`] - CSV export, template and summary
//! - [`importer`] - Row-by-row import with savepoints and batches
//! - [`jobs`] - Background imports with pollable progress
//! - [`locks`] - Per-company import serialization
//! - [`progress`] - Progress sink trait and adapters
//! - [`resolver`] - Find-or-create for reference data
//! - [`service`] - Company-bound facade
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tally_db::Database;
//! use tally_interchange::{InterchangeConfig, InterchangeService, TenantLocks};
//!
//! let config = InterchangeConfig::load_or_default(None);
//! let db = Database::new(config.database.db_config()).await?;
//! let service = InterchangeService::open(db, &company_id, config, TenantLocks::new()).await?;
//!
//! let outcome = service.importer().import(&csv, "user-1").await?;
//! println!("{} imported, {} failed", outcome.successful, outcome.failed);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;
pub mod exporter;
pub mod importer;
pub mod jobs;
pub mod locks;
pub mod progress;
pub mod resolver;
pub mod service;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::{DatabaseSettings, ExportSettings, ImportSettings, InterchangeConfig};
pub use error::{InterchangeError, InterchangeResult};
pub use exporter::{ExportFile, SalesExporter};
pub use importer::{ImportOutcome, SalesImporter};
pub use jobs::{ImportJobs, JobState, JobStatus};
pub use locks::TenantLocks;
pub use progress::{FnProgress, NoOpProgress, ProgressSink};
pub use resolver::{ReferenceResolver, ResolvedRefs};
pub use service::InterchangeService;
