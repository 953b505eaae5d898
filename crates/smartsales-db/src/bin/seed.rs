//! # Seed Data Generator
//!
//! Populates the database with a catalog, clients and a year of sales for
//! development.
//!
//! ## Usage
//! ```bash
//! # Catalog, 20 clients and 300 sales (default)
//! cargo run -p smartsales-db --bin seed
//!
//! # More history
//! cargo run -p smartsales-db --bin seed -- --sales 2000
//!
//! # Specify database path
//! cargo run -p smartsales-db --bin seed -- --db ./data/smartsales.db
//! ```
//!
//! ## Generated Data
//! - Categories with a handful of products each (prices in cents, stock 5 - 120)
//! - Clients `cliente01@smartsales.dev` ...
//! - Completed sales spread over the last 365 days, so month and category
//!   grouped reports have something to show
//!
//! The generator is deterministic: the same arguments give the same data.

use chrono::{Duration, Utc};
use smartsales_core::{Category, Client, Product, Sale, SaleStatus};
use smartsales_db::{Database, DbConfig, SaleRepository};
use std::env;
use uuid::Uuid;

/// Catalog: category name → (product name, price in cents).
const CATALOG: &[(&str, &[(&str, i64)])] = &[
    (
        "Electrónica",
        &[
            ("Auriculares Bluetooth", 4999),
            ("Teclado Mecánico", 8950),
            ("Mouse Inalámbrico", 2499),
            ("Monitor 24\"", 18900),
            ("Cargador USB-C", 1999),
        ],
    ),
    (
        "Hogar",
        &[
            ("Lámpara de Escritorio", 3250),
            ("Cafetera", 6400),
            ("Juego de Sábanas", 4500),
            ("Organizador", 1200),
        ],
    ),
    (
        "Deportes",
        &[
            ("Balón de Fútbol", 2800),
            ("Esterilla de Yoga", 2150),
            ("Botella Térmica", 1590),
            ("Mancuernas 5kg", 3900),
        ],
    ),
    (
        "Libros",
        &[
            ("Novela Clásica", 1450),
            ("Guía de Programación", 3990),
            ("Libro de Cocina", 2675),
        ],
    ),
];

const FIRST_NAMES: &[&str] = &[
    "Ana", "Luis", "María", "Carlos", "Lucía", "Jorge", "Sofía", "Diego", "Valeria", "Andrés",
];
const LAST_NAMES: &[&str] = &["García", "Rojas", "Fernández", "Vargas", "Morales", "Suárez"];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut clients: usize = 20;
    let mut sales: usize = 300;
    let mut db_path = String::from("./smartsales.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--clients" | "-c" => {
                if i + 1 < args.len() {
                    clients = args[i + 1].parse().unwrap_or(20);
                    i += 1;
                }
            }
            "--sales" | "-s" => {
                if i + 1 < args.len() {
                    sales = args[i + 1].parse().unwrap_or(300);
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
                println!("SmartSales Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --clients <N>  Number of clients to generate (default: 20)");
                println!("  -s, --sales <N>    Number of historical sales (default: 300)");
                println!("  -d, --db <PATH>    Database file path (default: ./smartsales.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 SmartSales Seed Data Generator");
    println!("=================================");
    println!("Database: {}", db_path);
    println!("Clients:  {}", clients);
    println!("Sales:    {}", sales);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let start = std::time::Instant::now();
    let now = Utc::now();

    // Catalog
    let mut products = Vec::new();
    for (category_idx, (category_name, items)) in CATALOG.iter().enumerate() {
        let category = db
            .categories()
            .insert(&Category {
                id: Uuid::new_v4().to_string(),
                name: category_name.to_string(),
                description: None,
                is_active: true,
                created_at: now,
            })
            .await?;

        for (product_idx, (name, price_cents)) in items.iter().enumerate() {
            let seed = category_idx * 10 + product_idx;
            let product = Product {
                id: Uuid::new_v4().to_string(),
                name: name.to_string(),
                description: Some(format!("{} ({})", name, category_name)),
                category_id: Some(category.id.clone()),
                price_cents: *price_cents,
                stock: 5 + ((seed * 37) % 116) as i64,
                is_active: true,
                created_at: now,
                updated_at: now,
            };
            products.push(db.products().insert(&product).await?);
        }
    }
    println!("✓ {} categories, {} products", CATALOG.len(), products.len());

    // Clients
    let mut client_ids = Vec::new();
    for n in 0..clients {
        let first = FIRST_NAMES[n % FIRST_NAMES.len()];
        let last = LAST_NAMES[(n / FIRST_NAMES.len() + n) % LAST_NAMES.len()];
        let client = Client {
            id: Uuid::new_v4().to_string(),
            name: format!("{} {}", first, last),
            email: format!("cliente{:02}@smartsales.dev", n + 1),
            phone: Some(format!("+591 7{:07}", n * 7919 % 10_000_000)),
            address: None,
            is_active: true,
            created_at: now,
        };
        if let Err(e) = db.clients().insert(&client).await {
            eprintln!("Failed to insert {}: {}", client.email, e);
            continue;
        }
        client_ids.push(client.id);
    }
    println!("✓ {} clients", client_ids.len());

    // Sales history. Inserted directly: historical stock is not replayed.
    if !client_ids.is_empty() && !products.is_empty() {
        let mut conn = db.pool().acquire().await?;
        for n in 0..sales {
            let product = &products[(n * 7 + n / 3) % products.len()];
            let client_id = &client_ids[(n * 13) % client_ids.len()];
            let sold_at = now - Duration::days(((n * 29) % 365) as i64) - Duration::minutes((n * 53 % 600) as i64);

            let mut sale = Sale {
                id: Uuid::new_v4().to_string(),
                client_id: client_id.clone(),
                product_id: product.id.clone(),
                quantity: 1 + (n % 4) as i64,
                unit_price_cents: product.price_cents,
                total_cents: 0,
                status: SaleStatus::Completed,
                sold_at,
                updated_at: sold_at,
            };
            sale.recompute_total();
            SaleRepository::insert(&mut conn, &sale).await?;

            if (n + 1) % 100 == 0 {
                println!("  Generated {} sales...", n + 1);
            }
        }
    }

    println!();
    println!("✓ Seed complete in {:?}", start.elapsed());

    let stats = db.sales().stats(Utc::now()).await?;
    println!(
        "  {} sales, best seller: {}",
        stats.total_sales,
        stats.best_selling_product.as_deref().unwrap_or("-")
    );

    Ok(())
}
