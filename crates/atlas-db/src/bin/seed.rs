//! # Seed Data Generator
//!
//! Populates a development database with operators, gym shop categories,
//! products and charge settings.
//!
//! ## Usage
//! ```bash
//! # Seed ./data/atlas.db with the full catalog
//! cargo run -p atlas-db --bin seed
//!
//! # Limit the number of products
//! cargo run -p atlas-db --bin seed -- --count 20
//!
//! # Specify database path
//! cargo run -p atlas-db --bin seed -- --db ./data/dev.db
//! ```
//!
//! ## Generated Data
//! - Users: `admin` (Admin), `cashier` (Staff)
//! - Categories: Supplements, Drinks, Apparel, Accessories
//! - Products: size variants per item, prices in minor units, stock 0-40,
//!   every fifth product discounted 10%
//! - Settings: service charge 5%, tax 10%

use std::env;

use anyhow::Context;
use atlas_core::{SERVICE_CHARGE_SETTING, TAX_SETTING};
use atlas_db::{Database, DbConfig, NewProduct};

/// Catalog for realistic test data: category, base price, items.
const CATEGORIES: &[(&str, i64, &[&str])] = &[
    (
        "Supplements",
        150_000,
        &["Whey Protein", "Creatine Monohydrate", "BCAA", "Pre-Workout", "Mass Gainer", "Fish Oil"],
    ),
    (
        "Drinks",
        8_000,
        &["Isotonic", "Mineral Water", "Protein Shake", "Cold Brew", "Coconut Water"],
    ),
    (
        "Apparel",
        120_000,
        &["Training Tee", "Tank Top", "Shorts", "Hoodie", "Compression Tights"],
    ),
    (
        "Accessories",
        45_000,
        &["Lifting Straps", "Shaker Bottle", "Towel", "Wrist Wraps", "Gym Gloves", "Resistance Band"],
    ),
];

/// Size variants with a price addon in minor units.
const SIZES: &[(&str, i64)] = &[("S", 0), ("M", 5_000), ("L", 10_000)];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().collect();

    let mut count: usize = usize::MAX;
    let mut db_path = String::from("./data/atlas.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().context("--count expects a number")?;
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
                println!("Atlas POS Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Maximum number of products (default: all)");
                println!("  -d, --db <PATH>    Database file path (default: ./data/atlas.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Atlas POS Seed Data Generator");
    println!("================================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path))
        .await
        .with_context(|| format!("opening {db_path}"))?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    for (id, username, full_name, role) in [(1, "admin", "Store Admin", "Admin"), (2, "cashier", "Front Desk", "Staff")] {
        sqlx::query("INSERT OR IGNORE INTO users (id, username, full_name, role) VALUES (?1, ?2, ?3, ?4)")
            .bind(id)
            .bind(username)
            .bind(full_name)
            .bind(role)
            .execute(db.pool())
            .await
            .context("inserting users")?;
    }
    println!("✓ Users: admin (id 1), cashier (id 2)");

    db.settings()
        .upsert_many(&[
            (SERVICE_CHARGE_SETTING.to_string(), "5".to_string()),
            (TAX_SETTING.to_string(), "10".to_string()),
        ])
        .await?;
    println!("✓ Settings: service charge 5%, tax 10%");

    println!();
    println!("Generating products...");

    let mut generated = 0usize;
    let start = std::time::Instant::now();

    'catalog: for (category_name, base_price, items) in CATEGORIES {
        let category = db.categories().insert(category_name, None).await?;

        for item in items.iter() {
            for (size, addon) in SIZES {
                if generated >= count {
                    break 'catalog;
                }

                let product = generate_product(category.id, item, size, base_price + addon, generated);
                if let Err(e) = db.products().insert(product).await {
                    eprintln!("Failed to insert {} {}: {}", item, size, e);
                    continue;
                }

                generated += 1;
            }
        }

        println!("  {}: done ({} products so far)", category_name, generated);
    }

    let elapsed = start.elapsed();
    println!();
    println!("✓ Generated {} products in {:?}", generated, elapsed);

    let whey = db.products().catalog(None, Some("whey")).await?;
    println!("  Search 'whey': {} results", whey.len());

    println!();
    println!("✓ Seed complete!");

    Ok(())
}

/// Generates a single product with deterministic pseudo-random stock and
/// discount.
fn generate_product(category_id: i64, name: &str, size: &str, price: i64, seed: usize) -> NewProduct {
    NewProduct {
        category_id: Some(category_id),
        name: format!("{} {}", name, size),
        description: None,
        price,
        discount_bps: if seed % 5 == 0 { 1_000 } else { 0 },
        stock: ((seed * 7) % 41) as i64,
        image: None,
    }
}
