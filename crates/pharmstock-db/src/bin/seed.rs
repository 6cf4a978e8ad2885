//! # Seed Data Generator
//!
//! Populates a SQLite database with pharmaceutical stock for development.
//!
//! ## Usage
//! ```bash
//! # Generate 500 records (default)
//! cargo run -p pharmstock-db --bin seed
//!
//! # Generate custom amount
//! cargo run -p pharmstock-db --bin seed -- --count 2000
//!
//! # Specify database path
//! cargo run -p pharmstock-db --bin seed -- --db ./data/app.db
//! ```
//!
//! ## Generated Records
//! Each drug is stocked in several strengths and pack units:
//! - Barcode: `890{:010}` (EAN-13 shaped, checksum not computed)
//! - Price: 0.50 - 41.96 by drug and strength
//! - Stock: 0 - 500
//! - Stocked within the last year, expiring 6 - 36 months later

use chrono::{Duration, NaiveDate};
use pharmstock_core::NewInventory;
use pharmstock_db::{Database, DbConfig, InventoryStore};
use std::env;

/// (drug, manufacturer) pairs
const DRUGS: &[(&str, &str)] = &[
    ("Paracetamol", "GSK"),
    ("Ibuprofen", "Pfizer"),
    ("Amoxicillin", "Cipla"),
    ("Azithromycin", "Pfizer"),
    ("Metformin", "Sun Pharma"),
    ("Atorvastatin", "Pfizer"),
    ("Amlodipine", "Lupin"),
    ("Omeprazole", "AstraZeneca"),
    ("Cetirizine", "Dr. Reddy's"),
    ("Loratadine", "Bayer"),
    ("Salbutamol", "GSK"),
    ("Losartan", "Merck"),
    ("Ciprofloxacin", "Bayer"),
    ("Diclofenac", "Novartis"),
    ("Pantoprazole", "Takeda"),
    ("Levothyroxine", "Abbott"),
    ("Clopidogrel", "Sanofi"),
    ("Montelukast", "Merck"),
    ("Prednisolone", "Zydus"),
    ("Doxycycline", "Teva"),
];

/// (strength suffix, unit label, price multiplier)
const FORMS: &[(&str, &str, f64)] = &[
    ("100mg", "tablets", 1.0),
    ("250mg", "tablets", 1.6),
    ("500mg", "tablets", 2.4),
    ("250mg/5ml", "ml", 3.1),
    ("1g", "capsules", 4.0),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut count: usize = 500;
    let mut db_path = String::from("./app.db");

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
                println!("PharmStock Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of records to generate (default: 500)");
                println!("  -d, --db <PATH>    Database file path (default: ./app.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("PharmStock Seed Data Generator");
    println!("==============================");
    println!("Database: {}", db_path);
    println!("Records:  {}", count);
    println!();

    let db = Database::new(DbConfig::from_url(&db_path)).await?;
    let store = db.inventory();

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = store.count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} records", existing);
        println!("  Skipping seed to avoid duplicate barcodes.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    println!();
    println!("Generating records...");

    let start = std::time::Instant::now();
    let mut generated = 0;
    let mut seed = 0;
    let mut failed = 0;

    // Each (drug, form) pair is stocked in repeated batches until `count` is reached
    while generated < count && failed < count {
        let (drug_idx, form_idx) = (seed % DRUGS.len(), (seed / DRUGS.len()) % FORMS.len());
        let record = generate_record(DRUGS[drug_idx], FORMS[form_idx], seed);
        seed += 1;

        if let Err(e) = store.create(record.clone()).await {
            eprintln!("Failed to insert {}: {}", record.barcode, e);
            failed += 1;
            continue;
        }

        generated += 1;
        if generated % 100 == 0 {
            println!("  Generated {} records...", generated);
        }
    }

    let elapsed = start.elapsed();
    println!();
    println!("✓ Generated {} records in {:?}", generated, elapsed);
    println!(
        "  Rate: {:.0} records/second",
        generated as f64 / elapsed.as_secs_f64()
    );

    // Spot-check the barcode index
    let sample = format!("890{:010}", 0);
    match store.get_by_barcode(&sample).await {
        Ok(record) => println!("  Lookup {}: {}", sample, record.drug_name),
        Err(e) => println!("  Lookup {} failed: {}", sample, e),
    }

    db.close().await;
    println!();
    println!("✓ Seed complete!");

    Ok(())
}

/// Generates one record with deterministic, realistic-looking values.
fn generate_record(
    (drug, manufacturer): (&str, &str),
    (strength, units, multiplier): (&str, &str, f64),
    seed: usize,
) -> NewInventory {
    let base_price = 0.50 + ((seed * 37) % 1000) as f64 / 100.0;
    let price = (base_price * multiplier * 100.0).round() / 100.0;

    let epoch = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap_or_default();
    let stocked_date = epoch + Duration::days((seed % 365) as i64);
    let expiry_date = stocked_date + Duration::days(180 + ((seed * 13) % 900) as i64);

    NewInventory {
        barcode: format!("890{:010}", seed),
        drug_name: format!("{} {}", drug, strength),
        manufacturer: manufacturer.to_string(),
        units: units.to_string(),
        price,
        stock_quantity: ((seed * 7) % 501) as i64,
        stocked_date,
        expiry_date,
    }
}
