//! # Reference Resolver
//!
//! Turns the names on a decoded row into persisted store, category and
//! product rows, creating whatever the company doesn't have yet.
//!
//! ## Resolution Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                   resolve(conn, decoded)                                │
//! │                                                                         │
//! │  store_name ──► find (company, name) ──► found? ──yes──► Store         │
//! │                                            │                            │
//! │                                            no                           │
//! │                                            ▼                            │
//! │                          create (location = auto-created sentinel)      │
//! │                                            │                            │
//! │                           UniqueViolation? ──yes──► find again once     │
//! │                                                                         │
//! │  category_name ──► same, keyed by (company, name)                       │
//! │  product_name  ──► same, keyed by (company, category, name),            │
//! │                    created with base price = total / quantity           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Everything runs on the caller's connection, which is normally a row
//! savepoint inside the batch transaction. A reference created by row 3 is
//! therefore visible to row 4 before anything is committed.

use sqlx::SqliteConnection;
use tracing::{debug, warn};

use tally_core::{DecodedSale, Money, Product, ProductCategory, Store, AUTO_CREATED_LOCATION};
use tally_db::{CategoryRepository, DbResult, ProductRepository, StoreRepository};

/// The persisted references for one row.
#[derive(Debug, Clone)]
pub struct ResolvedRefs {
    pub store: Store,
    pub category: ProductCategory,
    pub product: Product,
}

/// Find-or-create for one company's reference data.
#[derive(Debug, Clone, Copy)]
pub struct ReferenceResolver<'a> {
    company_id: &'a str,
}

impl<'a> ReferenceResolver<'a> {
    pub fn new(company_id: &'a str) -> Self {
        ReferenceResolver { company_id }
    }

    /// Resolves all three references for a decoded row.
    pub async fn resolve(
        &self,
        conn: &mut SqliteConnection,
        sale: &DecodedSale,
    ) -> DbResult<ResolvedRefs> {
        let store = self.store(&mut *conn, &sale.store_name).await?;
        let category = self.category(&mut *conn, &sale.category_name).await?;
        let product = self
            .product(&mut *conn, &category, &sale.product_name, sale.unit_price())
            .await?;

        Ok(ResolvedRefs {
            store,
            category,
            product,
        })
    }

    /// Finds or creates a store by exact name.
    pub async fn store(&self, conn: &mut SqliteConnection, name: &str) -> DbResult<Store> {
        if let Some(store) = StoreRepository::find_by_name_in(&mut *conn, self.company_id, name).await? {
            return Ok(store);
        }

        match StoreRepository::create_in(&mut *conn, self.company_id, name, Some(AUTO_CREATED_LOCATION))
            .await
        {
            Ok(store) => {
                debug!(company_id = %self.company_id, store = %name, "Auto-created store");
                Ok(store)
            }
            Err(err) if err.is_unique_violation() => {
                warn!(company_id = %self.company_id, store = %name, "Store created concurrently, re-reading");
                StoreRepository::find_by_name_in(&mut *conn, self.company_id, name)
                    .await?
                    .ok_or(err)
            }
            Err(err) => Err(err),
        }
    }

    /// Finds or creates a product category by exact name.
    pub async fn category(
        &self,
        conn: &mut SqliteConnection,
        name: &str,
    ) -> DbResult<ProductCategory> {
        if let Some(category) =
            CategoryRepository::find_by_name_in(&mut *conn, self.company_id, name).await?
        {
            return Ok(category);
        }

        match CategoryRepository::create_in(&mut *conn, self.company_id, name).await {
            Ok(category) => {
                debug!(company_id = %self.company_id, category = %name, "Auto-created category");
                Ok(category)
            }
            Err(err) if err.is_unique_violation() => {
                warn!(company_id = %self.company_id, category = %name, "Category created concurrently, re-reading");
                CategoryRepository::find_by_name_in(&mut *conn, self.company_id, name)
                    .await?
                    .ok_or(err)
            }
            Err(err) => Err(err),
        }
    }

    /// Finds or creates a product inside `category`.
    ///
    /// `base_price` only applies when the product is created; an existing
    /// product keeps its price.
    pub async fn product(
        &self,
        conn: &mut SqliteConnection,
        category: &ProductCategory,
        name: &str,
        base_price: Money,
    ) -> DbResult<Product> {
        if let Some(product) =
            ProductRepository::find_in(&mut *conn, self.company_id, &category.id, name).await?
        {
            return Ok(product);
        }

        match ProductRepository::create_in(&mut *conn, self.company_id, &category.id, name, base_price)
            .await
        {
            Ok(product) => {
                debug!(
                    company_id = %self.company_id,
                    category = %category.name,
                    product = %name,
                    base_price = %base_price,
                    "Auto-created product"
                );
                Ok(product)
            }
            Err(err) if err.is_unique_violation() => {
                warn!(company_id = %self.company_id, product = %name, "Product created concurrently, re-reading");
                ProductRepository::find_in(&mut *conn, self.company_id, &category.id, name)
                    .await?
                    .ok_or(err)
            }
            Err(err) => Err(err),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
