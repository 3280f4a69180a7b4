//! # Repository Module
//!
//! Database repository implementations for Tally.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern Explained                         │
//! │                                                                         │
//! │  The Repository pattern abstracts database access behind a clean API.  │
//! │                                                                         │
//! │  Importer / Exporter                                                   │
//! │       │                                                                 │
//! │       │  StoreRepository::find_by_name_in(&mut *tx, company, name)     │
//! │       │  ↓                                                              │
//! │       ▼                                                                 │
//! │  StoreRepository                                                       │
//! │  ├── find_by_name_in(executor, company, name)   transaction-aware     │
//! │  ├── create_in(executor, company, name, loc)    transaction-aware     │
//! │  ├── list(&self, company)                       pool                   │
//! │  └── delete(&self, company, id)                 pool                   │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! │  Benefits:                                                              │
//! │  • Clean separation of concerns                                        │
//! │  • SQL is isolated in one place                                        │
//! │  • Same query runs on the pool or inside a batch transaction           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`CompanyRepository`] - Tenants
//! - [`StoreRepository`] - Stores, find-or-create by name
//! - [`CategoryRepository`] - Product categories, find-or-create by name
//! - [`ProductRepository`] - Products, keyed by category and name
//! - [`SaleRepository`] - Sale insert and export queries
//!
//! [`CompanyRepository`]: company::CompanyRepository
//! [`StoreRepository`]: store::StoreRepository
//! [`CategoryRepository`]: category::CategoryRepository
//! [`ProductRepository`]: product::ProductRepository
//! [`SaleRepository`]: sale::SaleRepository

pub mod category;
pub mod company;
pub mod product;
pub mod sale;
pub mod store;
