// src/bin/import_questions.rs

//! Drops and reloads the question bank from a CSV file.
//!
//! Usage: `import_questions [path/to/questions.csv]`
//! (defaults to `seed_questions.csv` in the working directory).

use std::path::PathBuf;
use std::str::FromStr;

use cbt_backend::import::reset_questions;
use dotenvy::dotenv;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

#[tokio::main]
async fn main() {
    dotenv().ok();
    tracing_subscriber::fmt().with_target(false).init();

    let csv_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("seed_questions.csv"));

    if !csv_path.exists() {
        tracing::error!("CSV file not found: {}", csv_path.display());
        std::process::exit(1);
    }

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

    match reset_questions(&pool, &csv_path).await {
        Ok(summary) => {
            tracing::info!(
                "Questions table refreshed: {} rows inserted (skipped {})",
                summary.inserted,
                summary.skipped
            );
        }
        Err(e) => {
            tracing::error!("Error loading questions: {}", e);
            std::process::exit(1);
        }
    }
}
