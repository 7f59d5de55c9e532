//! # Seed Data Generator
//!
//! Fills an empty register database with a demo clothing catalog.
//!
//! ## Usage
//! ```bash
//! # Default database path
//! cargo run -p till-db --bin seed
//!
//! # Specify database path
//! cargo run -p till-db --bin seed -- --db ./data/till.db
//! ```
//!
//! ## Generated Products
//! Every model below in every size, with quantities spread between 0 and 12
//! so the listing shows both active and sold-out lines.

use std::env;
use till_core::{Money, ProductInput, Register};
use till_db::{Database, DbConfig};

/// Demo models: (name, cost in cents, price in cents)
const MODELS: &[(&str, i64, i64)] = &[
    ("Camisa Básica", 1000, 2500),
    ("Camisa Polo", 2200, 5990),
    ("Camiseta Estampada", 1500, 3990),
    ("Calça Jeans", 4050, 8990),
    ("Bermuda Sarja", 2500, 5990),
    ("Vestido Midi", 4500, 11990),
    ("Saia Plissada", 3000, 6990),
    ("Jaqueta Corta-Vento", 6000, 14990),
    ("Moletom Canguru", 5000, 11990),
    ("Boné Aba Curva", 800, 2990),
];

const SIZES: &[&str] = &["P", "M", "G", "GG"];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./till_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Till Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./till_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Till Seed Data Generator");
    println!("===========================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let repo = db.register_state();
    let mut register = repo.load_register().await?;
    if !register.catalog().is_empty() {
        println!("⚠ Database already has {} products", register.catalog().len());
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    println!();
    println!("Generating products...");

    let mut generated = 0usize;
    for (model_idx, (name, cost, price)) in MODELS.iter().enumerate() {
        for (size_idx, size) in SIZES.iter().enumerate() {
            let input = ProductInput {
                name: format!("{name} {size}"),
                quantity: demo_quantity(model_idx, size_idx),
                cost: Money::from_cents(*cost),
                price: Money::from_cents(*price),
            };

            if let Err(e) = register.add_product(&input) {
                eprintln!("Failed to add {}: {}", input.name, e);
                continue;
            }
            generated += 1;
        }
    }

    repo.save(&register.snapshot()).await?;

    println!();
    println!("✓ Generated {} products", generated);
    println!("  Stock valuation: {}", register.stock_valuation());
    println!(
        "  Search 'camisa': {} results",
        register.search_products("camisa").count()
    );

    println!();
    println!("✓ Seed complete!");

    db.close().await;
    Ok(())
}

/// Deterministic spread of quantities, roughly one sold-out line in seven.
fn demo_quantity(model_idx: usize, size_idx: usize) -> i64 {
    let n = (model_idx * 5 + size_idx * 3) % 13;
    if n % 7 == 0 {
        0
    } else {
        n as i64
    }
}
