//! # Sales Summary
//!
//! Revenue aggregation over exported sale records.
//!
//! ```text
//! ExportRecord[] ──► SalesSummary::from_records()
//!                      ├── totals (revenue, transactions, quantity, average)
//!                      ├── by_store / by_category / by_product
//!                      ├── by_payment_method
//!                      └── by_month ("2024-01") / by_weekday ("Monday")
//! ```
//!
//! Every breakdown is sorted by revenue (highest first), ties by key.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::ExportRecord;

/// Aggregate for one value of a dimension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Breakdown {
    pub key: String,
    pub revenue: Money,
    pub average_sale: Money,
    pub transactions: i64,
    pub quantity: i64,
}

#[derive(Debug, Default)]
struct Bucket {
    revenue: Money,
    transactions: i64,
    quantity: i64,
}

/// Totals plus per-dimension breakdowns for a set of sales.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SalesSummary {
    pub total_revenue: Money,
    pub transactions: i64,
    pub total_quantity: i64,
    pub average_sale: Money,
    pub by_store: Vec<Breakdown>,
    pub by_category: Vec<Breakdown>,
    pub by_product: Vec<Breakdown>,
    pub by_payment_method: Vec<Breakdown>,
    pub by_month: Vec<Breakdown>,
    pub by_weekday: Vec<Breakdown>,
}

impl SalesSummary {
    /// Aggregates the records. An empty slice yields zero totals and
    /// empty breakdowns.
    pub fn from_records(records: &[ExportRecord]) -> Self {
        let mut stores = BTreeMap::new();
        let mut categories = BTreeMap::new();
        let mut products = BTreeMap::new();
        let mut payments = BTreeMap::new();
        let mut months = BTreeMap::new();
        let mut weekdays = BTreeMap::new();

        let mut total_revenue = Money::zero();
        let mut total_quantity = 0i64;

        for record in records {
            total_revenue += record.total();
            total_quantity += record.quantity;

            let keys = [
                (&mut stores, record.store_label().to_string()),
                (&mut categories, record.category_label().to_string()),
                (&mut products, record.product_label().to_string()),
                (&mut payments, record.payment_method().label().to_string()),
                (&mut months, record.sale_date.format("%Y-%m").to_string()),
                (&mut weekdays, record.sale_date.format("%A").to_string()),
            ];
            for (map, key) in keys {
                add(map, key, record);
            }
        }

        let transactions = records.len() as i64;

        SalesSummary {
            total_revenue,
            transactions,
            total_quantity,
            average_sale: total_revenue.per_unit(transactions),
            by_store: ranked(stores),
            by_category: ranked(categories),
            by_product: ranked(products),
            by_payment_method: ranked(payments),
            by_month: ranked(months),
            by_weekday: ranked(weekdays),
        }
    }

    /// Highest-revenue store, if any sales exist.
    pub fn top_store(&self) -> Option<&str> {
        self.by_store.first().map(|b| b.key.as_str())
    }

    /// Highest-revenue product, if any sales exist.
    pub fn top_product(&self) -> Option<&str> {
        self.by_product.first().map(|b| b.key.as_str())
    }

    /// Lowest-revenue store, if any sales exist.
    pub fn weakest_store(&self) -> Option<&str> {
        self.by_store.last().map(|b| b.key.as_str())
    }
}

fn add(map: &mut BTreeMap<String, Bucket>, key: String, record: &ExportRecord) {
    let bucket = map.entry(key).or_default();
    bucket.revenue += record.total();
    bucket.transactions += 1;
    bucket.quantity += record.quantity;
}

fn ranked(map: BTreeMap<String, Bucket>) -> Vec<Breakdown> {
    // BTreeMap iterates keys ascending; a stable sort keeps that for ties.
    let mut rows: Vec<Breakdown> = map
        .into_iter()
        .map(|(key, b)| Breakdown {
            key,
            revenue: b.revenue,
            average_sale: b.revenue.per_unit(b.transactions),
            transactions: b.transactions,
            quantity: b.quantity,
        })
        .collect();
    rows.sort_by(|a, b| b.revenue.cmp(&a.revenue));
    rows
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(date: (i32, u32, u32), store: &str, product: &str, card: i64, cash: i64) -> ExportRecord {
        ExportRecord {
            id: format!("{store}-{product}-{card}-{cash}"),
            sale_date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            quantity: 1,
            total_cents: card + cash,
            card_cents: card,
            cash_cents: cash,
            notes: None,
            store_name: Some(store.to_string()),
            category_name: Some("Jewelry".to_string()),
            product_name: Some(product.to_string()),
        }
    }

    #[test]
    fn test_empty_summary() {
        let summary = SalesSummary::from_records(&[]);
        assert_eq!(summary.transactions, 0);
        assert!(summary.total_revenue.is_zero());
        assert!(summary.average_sale.is_zero());
        assert!(summary.by_store.is_empty());
        assert_eq!(summary.top_store(), None);
    }

    #[test]
    fn test_totals_and_rankings() {
        let records = vec![
            record((2024, 1, 1), "North", "Ring", 1000, 0),
            record((2024, 1, 2), "South", "Ring", 0, 3000),
            record((2024, 2, 5), "North", "Chain", 1500, 1500),
        ];
        let summary = SalesSummary::from_records(&records);

        assert_eq!(summary.total_revenue.cents(), 7000);
        assert_eq!(summary.transactions, 3);
        assert_eq!(summary.total_quantity, 3);
        assert_eq!(summary.average_sale.cents(), 2333);

        assert_eq!(summary.by_store[0].key, "North");
        assert_eq!(summary.by_store[0].revenue.cents(), 4000);
        assert_eq!(summary.by_store[0].transactions, 2);
        assert_eq!(summary.top_store(), Some("North"));
        assert_eq!(summary.weakest_store(), Some("South"));
        assert_eq!(summary.top_product(), Some("Ring"));

        let months: Vec<_> = summary.by_month.iter().map(|b| b.key.as_str()).collect();
        assert_eq!(months, vec!["2024-01", "2024-02"]);

        // 2024-01-01 is a Monday.
        assert!(summary.by_weekday.iter().any(|b| b.key == "Monday"));
    }

    #[test]
    fn test_payment_method_breakdown_uses_labels() {
        let records = vec![
            record((2024, 1, 1), "A", "P", 1000, 0),
            record((2024, 1, 1), "A", "P", 500, 500),
            record((2024, 1, 1), "A", "P", 0, 200),
        ];
        let summary = SalesSummary::from_records(&records);
        let keys: Vec<_> = summary
            .by_payment_method
            .iter()
            .map(|b| b.key.as_str())
            .collect();
        assert_eq!(keys, vec!["Both (Card + Cash)", "Card", "Cash"]);
    }

    #[test]
    fn test_ties_sort_by_key() {
        let records = vec![
            record((2024, 1, 1), "Zeta", "P", 1000, 0),
            record((2024, 1, 1), "Alpha", "P", 1000, 0),
        ];
        let summary = SalesSummary::from_records(&records);
        assert_eq!(summary.by_store[0].key, "Alpha");
        assert_eq!(summary.by_store[1].key, "Zeta");
    }
}
