//! # Domain Types
//!
//! Core domain types used throughout Tally.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │                      ┌─────────────────┐                                │
//! │                      │    Company      │  tenant / isolation boundary   │
//! │                      └────────┬────────┘                                │
//! │            ┌──────────────────┼──────────────────┐                      │
//! │  ┌─────────▼───────┐ ┌────────▼────────┐ ┌───────▼─────────┐           │
//! │  │     Store       │ │ ProductCategory │ │      Sale       │           │
//! │  │  name (unique)  │ │  name (unique)  │ │  sale_date      │           │
//! │  │  location       │ └────────┬────────┘ │  quantity       │           │
//! │  └─────────────────┘          │          │  card / cash    │           │
//! │                      ┌────────▼────────┐ │  store_id  ─────┼─► Store   │
//! │                      │    Product      │◄┼─ product_id     │           │
//! │                      │  base_price     │ └─────────────────┘           │
//! │                      └─────────────────┘                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Reference Entities
//! Store, ProductCategory and Product are named, reusable dimensions. They
//! are looked up by exact name inside one company and created lazily the
//! first time an imported row names one that doesn't exist.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Company
// =============================================================================

/// A tenant. Every other entity is scoped by `company_id`.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Company {
    pub id: String,
    pub name: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Store
// =============================================================================

/// A location where sales occur.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Store {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Company this store belongs to.
    pub company_id: String,

    /// Display name, unique within the company (case-sensitive).
    pub name: String,

    /// Free-text location. Auto-created stores carry a sentinel value.
    pub location: Option<String>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Product Category
// =============================================================================

/// A product grouping, unique by name within a company.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct ProductCategory {
    pub id: String,
    pub company_id: String,
    pub name: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Product
// =============================================================================

/// A product, unique by (company, category, name).
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    pub id: String,
    pub company_id: String,
    pub category_id: String,
    pub name: String,

    /// Unit price in cents. Imports derive it as `total / quantity`.
    pub base_price_cents: i64,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the base price as Money.
    #[inline]
    pub fn base_price(&self) -> Money {
        Money::from_cents(self.base_price_cents)
    }
}

// =============================================================================
// Payment Method
// =============================================================================

/// How a sale was paid, derived from which amounts are nonzero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Card,
    Cash,
    /// Split tender: both card and cash were used.
    Both,
    /// Neither amount is positive.
    Unknown,
}

impl PaymentMethod {
    /// Derives the payment method from card and cash amounts.
    ///
    /// ## Example
    /// ```rust
    /// use tally_core::{Money, PaymentMethod};
    ///
    /// let m = PaymentMethod::from_amounts(Money::from_cents(100), Money::zero());
    /// assert_eq!(m, PaymentMethod::Card);
    /// assert_eq!(m.label(), "Card");
    /// ```
    pub fn from_amounts(card: Money, cash: Money) -> Self {
        match (card.is_positive(), cash.is_positive()) {
            (true, true) => PaymentMethod::Both,
            (true, false) => PaymentMethod::Card,
            (false, true) => PaymentMethod::Cash,
            (false, false) => PaymentMethod::Unknown,
        }
    }

    /// Label shown in reports.
    pub fn label(&self) -> &'static str {
        match self {
            PaymentMethod::Card => "Card",
            PaymentMethod::Cash => "Cash",
            PaymentMethod::Both => "Both (Card + Cash)",
            PaymentMethod::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// =============================================================================
// Sale
// =============================================================================

/// A recorded sale.
///
/// ## Snapshot Pattern
/// `store_name`, `product_category` and `product_name` copy the reference
/// names at import time for reporting convenience. Export reads the live
/// linked entities instead, falling back to "Unknown *" when a link is gone.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Sale {
    pub id: String,
    pub company_id: String,
    /// User who created or imported the sale.
    pub user_id: String,
    pub store_id: Option<String>,
    pub product_id: Option<String>,
    #[ts(as = "String")]
    pub sale_date: NaiveDate,
    pub quantity: i64,
    /// Reconciled total as imported.
    pub total_cents: i64,
    pub card_cents: i64,
    pub cash_cents: i64,
    pub notes: Option<String>,
    pub store_name: String,
    pub product_category: String,
    pub product_name: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Sale {
    /// Card portion as Money.
    #[inline]
    pub fn card(&self) -> Money {
        Money::from_cents(self.card_cents)
    }

    /// Cash portion as Money.
    #[inline]
    pub fn cash(&self) -> Money {
        Money::from_cents(self.cash_cents)
    }

    /// Total paid: card + cash.
    #[inline]
    pub fn total_amount(&self) -> Money {
        self.card() + self.cash()
    }

    /// Payment method derived from the card and cash amounts.
    pub fn payment_method(&self) -> PaymentMethod {
        PaymentMethod::from_amounts(self.card(), self.cash())
    }
}

// =============================================================================
// Export Record
// =============================================================================

/// A sale joined with its live reference names, as read for export and
/// reporting. Names are `None` when the linked entity no longer exists.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct ExportRecord {
    pub id: String,
    #[ts(as = "String")]
    pub sale_date: NaiveDate,
    pub quantity: i64,
    pub total_cents: i64,
    pub card_cents: i64,
    pub cash_cents: i64,
    pub notes: Option<String>,
    pub store_name: Option<String>,
    pub category_name: Option<String>,
    pub product_name: Option<String>,
}

impl ExportRecord {
    /// Store name, or `"Unknown Store"` when the link is absent.
    pub fn store_label(&self) -> &str {
        self.store_name.as_deref().unwrap_or("Unknown Store")
    }

    /// Category name, or `"Unknown Category"` when the link is absent.
    pub fn category_label(&self) -> &str {
        self.category_name.as_deref().unwrap_or("Unknown Category")
    }

    /// Product name, or `"Unknown Product"` when the link is absent.
    pub fn product_label(&self) -> &str {
        self.product_name.as_deref().unwrap_or("Unknown Product")
    }

    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }

    pub fn payment_method(&self) -> PaymentMethod {
        PaymentMethod::from_amounts(
            Money::from_cents(self.card_cents),
            Money::from_cents(self.cash_cents),
        )
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sale(card: i64, cash: i64) -> Sale {
        let now = Utc::now();
        Sale {
            id: "s1".to_string(),
            company_id: "c1".to_string(),
            user_id: "u1".to_string(),
            store_id: None,
            product_id: None,
            sale_date: NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
            quantity: 1,
            total_cents: card + cash,
            card_cents: card,
            cash_cents: cash,
            notes: None,
            store_name: "Main Store".to_string(),
            product_category: "Jewelry".to_string(),
            product_name: "Silver Ring".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_payment_method_labels() {
        assert_eq!(sale(2500, 2000).payment_method().label(), "Both (Card + Cash)");
        assert_eq!(sale(2500, 0).payment_method().label(), "Card");
        assert_eq!(sale(0, 2000).payment_method().label(), "Cash");
        assert_eq!(sale(0, 0).payment_method().label(), "Unknown");
    }

    #[test]
    fn test_total_amount_is_card_plus_cash() {
        assert_eq!(sale(2500, 2000).total_amount().cents(), 4500);
    }

    #[test]
    fn test_export_record_fallback_labels() {
        let record = ExportRecord {
            id: "s1".to_string(),
            sale_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            quantity: 1,
            total_cents: 100,
            card_cents: 100,
            cash_cents: 0,
            notes: None,
            store_name: None,
            category_name: None,
            product_name: Some("Ring".to_string()),
        };

        assert_eq!(record.store_label(), "Unknown Store");
        assert_eq!(record.category_label(), "Unknown Category");
        assert_eq!(record.product_label(), "Ring");
    }
}
