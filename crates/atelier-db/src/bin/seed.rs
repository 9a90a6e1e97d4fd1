//! # Seed Data Generator
//!
//! Populates the database with a realistic two-day cash desk history for
//! development.
//!
//! ## Usage
//! ```bash
//! # Default database path (./atelier_dev.db)
//! cargo run -p atelier-db --bin seed
//!
//! # Specify database path
//! cargo run -p atelier-db --bin seed -- --db ./data/atelier.db
//! ```
//!
//! ## Generated Data
//! - Yesterday: a CLOSED session with an opening float, three income
//!   movements (cash with tip/change, card, mobile transfer), one
//!   withdrawal, and a matching sale record for each income
//! - Today: an OPEN session ready for ticket commits

use std::env;

use atelier_core::{MovementKind, PaymentMethod, SessionState};
use atelier_db::{Database, DbConfig, NewMovement, NewSaleRecord, NewSession};
use chrono::{Days, Local, Utc};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./atelier_dev.db");

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
                println!("Atelier POS Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./atelier_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Atelier POS Seed Data Generator");
    println!("==================================");
    println!("Database: {}", db_path);
    println!();

    // Connect to database
    let config = DbConfig::new(&db_path);
    let db = Database::new(config).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    // Check for existing sessions
    let existing = db.sessions().list_sessions(None, None).await?;
    if !existing.is_empty() {
        println!("⚠ Database already has {} sessions", existing.len());
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let today = Local::now().date_naive();
    let yesterday = today
        .checked_sub_days(Days::new(1))
        .ok_or("cannot compute yesterday's date")?;

    // Yesterday: a full closed day
    let closed_day = db
        .sessions()
        .upsert_session(&NewSession {
            business_date: yesterday,
            opening_float_cents: 10000, // $100.00 float
            closing_total_cents: None,
            state: SessionState::Open,
            notes: Some("Seeded day".to_string()),
            opened_by: Some("seed".to_string()),
        })
        .await?;

    let sales_of_the_day: &[(&str, i64, i64, Option<i64>, PaymentMethod)] = &[
        ("Haircut ×1", 2500, 500, Some(4000), PaymentMethod::Cash),
        ("Color treatment ×1", 6000, 0, None, PaymentMethod::Card),
        ("Blow dry ×1", 1800, 200, None, PaymentMethod::MobileTransfer),
    ];

    for (notes, amount, tip, received, method) in sales_of_the_day {
        let movement = db
            .movements()
            .record_movement(&NewMovement {
                session_id: closed_day.id.clone(),
                kind: MovementKind::Income,
                payment_method: *method,
                amount_cents: *amount,
                tip_cents: *tip,
                cash_received_cents: *received,
                linked_appointment_id: None,
                notes: Some(notes.to_string()),
                recorded_by: Some("seed".to_string()),
            })
            .await?;

        db.sales()
            .record_sale(&NewSaleRecord {
                linked_appointment_id: None,
                customer_id: "walk-in".to_string(),
                amount_cents: movement.amount_cents,
                payment_method: movement.payment_method,
                occurred_at: Utc::now(),
                staff_id: None,
            })
            .await?;
    }

    // A supplier run in the afternoon
    db.movements()
        .record_movement(&NewMovement {
            session_id: closed_day.id.clone(),
            kind: MovementKind::Withdrawal,
            payment_method: PaymentMethod::Cash,
            amount_cents: 3000,
            tip_cents: 0,
            cash_received_cents: None,
            linked_appointment_id: None,
            notes: Some("Supplier run".to_string()),
            recorded_by: Some("seed".to_string()),
        })
        .await?;

    // Close yesterday with a counted total:
    // float 100.00 + cash income 30.00 − withdrawal 30.00 − change 10.00
    db.sessions()
        .close_session(&closed_day.id, Some(9000))
        .await?;

    println!("✓ Seeded closed session for {}", yesterday);

    // Today: open and ready
    db.sessions()
        .upsert_session(&NewSession {
            business_date: today,
            opening_float_cents: 10000,
            closing_total_cents: None,
            state: SessionState::Open,
            notes: None,
            opened_by: Some("seed".to_string()),
        })
        .await?;

    println!("✓ Seeded open session for {}", today);
    println!();
    println!("Done.");

    Ok(())
}
