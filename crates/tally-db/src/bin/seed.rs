//! # Seed Data Generator
//!
//! Populates the database with a demo company and sample sales for
//! development.
//!
//! ## Usage
//! ```bash
//! # Generate 500 sales (default)
//! cargo run -p tally-db --bin seed
//!
//! # Generate custom amount
//! cargo run -p tally-db --bin seed -- --count 5000
//!
//! # Specify database path
//! cargo run -p tally-db --bin seed -- --db ./data/tally.db
//! ```
//!
//! ## Generated Data
//! - One company, "Demo Jewelry Co."
//! - Three stores, three categories, a handful of products each
//! - Sales spread over the 90 days before today, with a mix of card,
//!   cash and split payments

use chrono::{Duration, Utc};
use std::env;
use tally_core::{Money, Sale};
use tally_db::{
    CategoryRepository, Database, DbConfig, ProductRepository, SaleRepository, StoreRepository,
};
use uuid::Uuid;

const STORES: &[(&str, &str)] = &[
    ("Main Store", "12 High Street"),
    ("Airport Kiosk", "Terminal 2"),
    ("Outlet", "Riverside Mall"),
];

/// Categories with (product name, unit price in cents).
const CATALOG: &[(&str, &[(&str, i64)])] = &[
    (
        "Jewelry",
        &[
            ("Silver Ring", 4500),
            ("Gold Chain", 18900),
            ("Pearl Earrings", 7200),
            ("Charm Bracelet", 3900),
        ],
    ),
    (
        "Watches",
        &[("Leather Strap Watch", 12900), ("Steel Diver", 24900)],
    ),
    (
        "Accessories",
        &[
            ("Gift Box", 500),
            ("Polishing Cloth", 350),
            ("Travel Case", 2400),
        ],
    ),
];

const NOTES: &[&str] = &["", "", "Customer requested gift wrap", "Repeat customer", ""];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut count: usize = 500;
    let mut db_path = String::from("./tally_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(500);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Tally Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of sales to generate (default: 500)");
                println!("  -d, --db <PATH>    Database file path (default: ./tally_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Tally Seed Data Generator");
    println!("===========================");
    println!("Database: {}", db_path);
    println!("Sales:    {}", count);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    if !db.companies().list().await?.is_empty() {
        println!("⚠ Database already has companies");
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let company = db.companies().create("Demo Jewelry Co.").await?;
    println!("✓ Company {} ({})", company.name, company.id);

    // Reference data in one transaction
    let mut tx = db.pool().begin().await?;

    let mut stores = Vec::new();
    for (name, location) in STORES {
        stores.push(StoreRepository::create_in(&mut *tx, &company.id, name, Some(*location)).await?);
    }

    let mut products = Vec::new();
    for (category_name, items) in CATALOG {
        let category = CategoryRepository::create_in(&mut *tx, &company.id, category_name).await?;
        for (name, price) in items.iter() {
            let product = ProductRepository::create_in(
                &mut *tx,
                &company.id,
                &category.id,
                name,
                Money::from_cents(*price),
            )
            .await?;
            products.push((category.name.clone(), product));
        }
    }

    tx.commit().await?;
    println!(
        "✓ {} stores, {} categories, {} products",
        stores.len(),
        CATALOG.len(),
        products.len()
    );

    println!();
    println!("Generating sales...");
    let start = std::time::Instant::now();
    let today = Utc::now().date_naive();

    let mut tx = db.pool().begin().await?;
    for seed in 0..count {
        let store = &stores[(seed * 7) % stores.len()];
        let (category_name, product) = &products[(seed * 13) % products.len()];

        let quantity = 1 + (seed % 3) as i64;
        let total = Money::from_cents(product.base_price_cents * quantity);
        let (card, cash) = split_payment(seed, total);

        let now = Utc::now();
        let sale = Sale {
            id: Uuid::new_v4().to_string(),
            company_id: company.id.clone(),
            user_id: "seed".to_string(),
            store_id: Some(store.id.clone()),
            product_id: Some(product.id.clone()),
            sale_date: today - Duration::days((seed % 90) as i64),
            quantity,
            total_cents: total.cents(),
            card_cents: card.cents(),
            cash_cents: cash.cents(),
            notes: Some(NOTES[seed % NOTES.len()].to_string()).filter(|n| !n.is_empty()),
            store_name: store.name.clone(),
            product_category: category_name.clone(),
            product_name: product.name.clone(),
            created_at: now,
            updated_at: now,
        };

        SaleRepository::insert_in(&mut *tx, &sale).await?;

        if (seed + 1) % 100 == 0 {
            println!("  Generated {} sales...", seed + 1);
        }
    }
    tx.commit().await?;

    let elapsed = start.elapsed();
    println!();
    println!("✓ Generated {} sales in {:?}", count, elapsed);

    let total = db.sales().count(&company.id).await?;
    println!("  Company now has {} sales", total);

    println!();
    println!("✓ Seed complete!");

    Ok(())
}

/// Card-only, cash-only, or an even-ish split, cycling by seed.
fn split_payment(seed: usize, total: Money) -> (Money, Money) {
    match seed % 3 {
        0 => (total, Money::zero()),
        1 => (Money::zero(), total),
        _ => {
            let card = total.per_unit(2);
            (card, total - card)
        }
    }
}
