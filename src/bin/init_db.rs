// src/bin/init_db.rs

//! Creates the CBT database, seeds a demo admin and demo user, and loads
//! questions from `seed_questions.csv` when the file is present.
//!
//! Safe to re-run: migrations and the account seeds are idempotent.

use std::path::Path;
use std::str::FromStr;

use cbt_backend::import::reset_questions;
use cbt_backend::utils::hash::hash_pin;
use dotenvy::dotenv;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

const SEED_CSV: &str = "seed_questions.csv";

#[tokio::main]
async fn main() {
    dotenv().ok();
    tracing_subscriber::fmt().with_target(false).init();

    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://cbt.db".to_string());

    let connect_options = SqliteConnectOptions::from_str(&database_url)
        .expect("Invalid DATABASE_URL")
        .create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(connect_options)
        .await
        .expect("Failed to open database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    seed_accounts(&pool).await.expect("Failed to seed accounts");

    let seed_csv = Path::new(SEED_CSV);
    if seed_csv.exists() {
        let summary = reset_questions(&pool, seed_csv)
            .await
            .expect("Failed to load seed questions");
        tracing::info!(
            "Loaded {} questions (skipped {} invalid rows)",
            summary.inserted,
            summary.skipped
        );
    } else {
        tracing::warn!("Seed CSV not found: {}", SEED_CSV);
    }

    tracing::info!("Database initialized with demo admin and demo user.");
}

/// Inserts a demo admin and demo user, ignoring rows that already exist.
async fn seed_accounts(pool: &SqlitePool) -> Result<(), Box<dyn std::error::Error>> {
    sqlx::query("INSERT OR IGNORE INTO admins (username, pin, active) VALUES (?, ?, 1)")
        .bind("admin")
        .bind(hash_pin("admin123")?)
        .execute(pool)
        .await?;

    sqlx::query("INSERT OR IGNORE INTO users (user_id, pin, active) VALUES (?, ?, 1)")
        .bind("demo_user")
        .bind(hash_pin("123456")?)
        .execute(pool)
        .await?;

    Ok(())
}
