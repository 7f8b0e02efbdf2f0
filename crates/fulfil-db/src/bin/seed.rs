//! # Seed Data Generator
//!
//! Populates a database with a demo catalogue and, optionally, a cart.
//!
//! ## Usage
//! ```bash
//! # 200 products across a few shops (default)
//! cargo run -p fulfil-db --bin seed
//!
//! # Custom amount and path
//! cargo run -p fulfil-db --bin seed -- --count 1000 --db ./data/fulfil.db
//!
//! # Also fill a cart for a user, ready for checkout
//! cargo run -p fulfil-db --bin seed -- --cart-user 7f0c5d1e-5c1b-4e0e-9f5e-6a1f0d7c2b11
//! ```
//!
//! Each product has:
//! - Name `{base} {size}`
//! - Price 1.99 - 9.98 plus a size addon, always whole cents
//! - Stock 0 - 50

use std::env;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use fulfil_core::{Money, Product};
use fulfil_db::{Database, DbConfig};

/// (shop, category, product names)
const CATALOGUE: &[(&str, &str, &[&str])] = &[
    (
        "corner-books",
        "books",
        &["Paperback Novel", "Field Guide", "Cookbook", "Atlas", "Notebook"],
    ),
    (
        "north-outfitters",
        "outdoor",
        &["Trail Socks", "Water Bottle", "Headlamp", "Rain Shell", "Daypack"],
    ),
    (
        "kitchen-co",
        "kitchen",
        &["Chef Knife", "Cutting Board", "Skillet", "Kettle", "Spice Rack"],
    ),
];

/// Size variants with their price addon.
const SIZES: &[(&str, &str)] = &[
    ("Small", "0.00"),
    ("Medium", "1.50"),
    ("Large", "3.00"),
    ("XL", "4.25"),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args: Vec<String> = env::args().collect();

    let mut count: usize = 200;
    let mut db_path = String::from("./fulfil_dev.db");
    let mut cart_user: Option<String> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(200);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--cart-user" => {
                if i + 1 < args.len() {
                    cart_user = Some(args[i + 1].clone());
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Fulfil Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>         Number of products to generate (default: 200)");
                println!("  -d, --db <PATH>         Database file path (default: ./fulfil_dev.db)");
                println!("      --cart-user <UUID>  Put three products in this user's cart");
                println!("  -h, --help              Show this help message");
                return Ok(());
            }
            other => warn!(arg = %other, "Ignoring unknown argument"),
        }
        i += 1;
    }

    info!(path = %db_path, count, "Seeding database");

    let db = Database::new(DbConfig::new(&db_path)).await?;

    let existing = db.products().count().await?;
    if existing > 0 {
        warn!(existing, "Database already has products, skipping catalogue");
    } else {
        let generated = seed_catalogue(&db, count).await?;
        info!(generated, "Catalogue generated");
    }

    if let Some(user_id) = cart_user {
        let products = db.products().list(3).await?;
        for (n, product) in products.iter().enumerate() {
            let quantity = (n as i64 + 1).min(product.stock_quantity);
            if quantity == 0 {
                continue;
            }
            db.carts().upsert(&user_id, &product.id, quantity).await?;
        }
        let lines = db.carts().snapshot(&user_id).await?;
        info!(user_id = %user_id, lines = lines.len(), "Cart filled");
    }

    info!("Seed complete");
    Ok(())
}

async fn seed_catalogue(db: &Database, count: usize) -> Result<usize, Box<dyn std::error::Error>> {
    let shop_ids: Vec<String> = CATALOGUE.iter().map(|_| Uuid::new_v4().to_string()).collect();
    let category_ids: Vec<String> = CATALOGUE.iter().map(|_| Uuid::new_v4().to_string()).collect();

    let mut generated = 0;
    let mut seed = 0usize;

    'outer: loop {
        let before = generated;
        for (idx, (shop, category, names)) in CATALOGUE.iter().enumerate() {
            for name in names.iter() {
                for (size, addon) in SIZES {
                    if generated >= count {
                        break 'outer;
                    }

                    let mut product = generate_product(
                        name,
                        size,
                        addon.parse()?,
                        &shop_ids[idx],
                        &category_ids[idx],
                        seed,
                    );
                    product.description = Some(format!("{category} from {shop}"));
                    seed += 1;

                    if let Err(e) = db.products().insert(&product).await {
                        warn!(name = %product.name, error = %e, "Failed to insert product");
                        continue;
                    }
                    generated += 1;
                }
            }
        }
        if generated == before {
            break;
        }
    }

    Ok(generated)
}

/// Generates a single product with deterministic price and stock.
fn generate_product(
    name: &str,
    size: &str,
    addon: Money,
    shop_id: &str,
    category_id: &str,
    seed: usize,
) -> Product {
    let base = Money::from_cents(199 + ((seed * 17) % 800) as i64);
    let price = base.checked_add(addon).unwrap_or(base);
    let stock = (seed % 51) as i64;

    Product::new(format!("{name} {size}"), price, stock, shop_id, category_id)
}
