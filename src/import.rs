// src/import.rs

//! Bulk import of the question bank from a CSV file.
//!
//! The expected header is:
//! `question, option_a, option_b, option_c, option_d, correct_option`.
//! Rows missing the question text or the answer key are skipped and counted.

use std::path::Path;

use serde::Deserialize;
use sqlx::SqlitePool;

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("failed to read CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),
}

/// One CSV row. Missing columns deserialize to empty strings so a short row
/// is skipped rather than aborting the whole import.
#[derive(Debug, Deserialize)]
struct QuestionRow {
    #[serde(default)]
    question: String,
    #[serde(default)]
    option_a: String,
    #[serde(default)]
    option_b: String,
    #[serde(default)]
    option_c: String,
    #[serde(default)]
    option_d: String,
    #[serde(default)]
    correct_option: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    pub inserted: usize,
    pub skipped: usize,
}

/// Empties the questions table and reloads it from the CSV, reassigning ids
/// from 1. Re-running with the same file yields the same row count.
pub async fn reset_questions(
    pool: &SqlitePool,
    csv_path: &Path,
) -> Result<ImportSummary, ImportError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(csv_path)?;

    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM questions").execute(&mut *tx).await?;
    // Restart the autoincrement counter so reloads assign ids from 1.
    // sqlite_sequence only exists once an AUTOINCREMENT insert has happened.
    if let Err(e) = sqlx::query("DELETE FROM sqlite_sequence WHERE name = 'questions'")
        .execute(&mut *tx)
        .await
    {
        tracing::debug!("No autoincrement counter to reset: {}", e);
    }

    let mut inserted = 0;
    let mut skipped = 0;

    for record in reader.deserialize::<QuestionRow>() {
        let row = match record {
            Ok(row) => row,
            Err(e) => {
                tracing::warn!("Skipping malformed row: {}", e);
                skipped += 1;
                continue;
            }
        };

        if row.question.is_empty() || row.correct_option.is_empty() {
            skipped += 1;
            continue;
        }

        sqlx::query(
            r#"
            INSERT INTO questions (question, option_a, option_b, option_c, option_d, correct_option)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&row.question)
        .bind(&row.option_a)
        .bind(&row.option_b)
        .bind(&row.option_c)
        .bind(&row.option_d)
        .bind(&row.correct_option)
        .execute(&mut *tx)
        .await?;

        inserted += 1;
    }

    tx.commit().await?;

    Ok(ImportSummary { inserted, skipped })
}
