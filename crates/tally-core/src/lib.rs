//! # tally-core: Pure Sales Interchange Logic
//!
//! This crate is the **heart** of Tally. It contains the CSV row mapping,
//! amount reconciliation, pre-flight validation and sales aggregation as pure
//! functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Tally Architecture                               │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    tally CLI (apps/cli)                          │   │
//! │  │    validate ──► import ──► export ──► summary                    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    tally-interchange                            │   │
//! │  │    Resolver, Importer (batches), Exporter, Jobs                 │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ tally-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │   codec   │  │ validation│  │   │
//! │  │   │   Store   │  │   Money   │  │  decode   │  │  headers  │  │   │
//! │  │   │   Sale    │  │  parsing  │  │  encode   │  │ spot-check│  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    tally-db (Database Layer)                    │   │
//! │  │              SQLite queries, migrations, repositories           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Store, Product, Sale, etc.)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`codec`] - CSV row ⇄ sale mapping, reconciliation
//! - [`validation`] - Pre-flight CSV validation
//! - [`summary`] - Revenue aggregation by store/category/product/payment/time
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use tally_core::codec::{decode_row, SaleRow};
//!
//! let row = SaleRow {
//!     sale_date: "2024-01-01".to_string(),
//!     quantity: "2".to_string(),
//!     total: "50.00".to_string(),
//!     ..SaleRow::default()
//! };
//!
//! let sale = decode_row(&row).unwrap();
//! assert_eq!(sale.store_name, "Default Store");
//! assert_eq!(sale.cash.cents(), 5000);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod codec;
pub mod error;
pub mod money;
pub mod summary;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use codec::{DecodedSale, SaleRow, CSV_HEADERS};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use summary::{Breakdown, SalesSummary};
pub use types::*;
pub use validation::ValidationReport;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Headers that must be present for a file to be importable.
pub const REQUIRED_HEADERS: &[&str] = &["sale_date"];

/// Number of data rows the validator spot-checks.
pub const DEFAULT_VALIDATION_SAMPLE_ROWS: usize = 5;

/// Rows committed together by the progress-reporting import.
pub const DEFAULT_BATCH_SIZE: usize = 50;

/// How many error messages a user-facing report shows.
pub const DEFAULT_ERROR_DISPLAY_LIMIT: usize = 10;

/// Store name substituted when a row leaves `store_name` blank.
pub const DEFAULT_STORE_NAME: &str = "Default Store";

/// Category name substituted when a row leaves `product_category` blank.
pub const DEFAULT_CATEGORY_NAME: &str = "General";

/// Product name substituted when a row leaves `product_name` blank.
pub const DEFAULT_PRODUCT_NAME: &str = "Unknown Product";

/// Location recorded on stores created by an import.
pub const AUTO_CREATED_LOCATION: &str = "Auto-created from import";
