// src/models/question.rs

use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use validator::Validate;

/// The four option columns, in order. `correct_option` must name one of these.
pub const OPTION_KEYS: [&str; 4] = ["option_a", "option_b", "option_c", "option_d"];

/// Maps an option column name to its display label ("A".."D").
pub fn option_label(key: &str) -> Option<&'static str> {
    match key {
        "option_a" => Some("A"),
        "option_b" => Some("B"),
        "option_c" => Some("C"),
        "option_d" => Some("D"),
        _ => None,
    }
}

/// Represents the 'questions' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Question {
    pub id: i64,

    /// The text of the question itself.
    pub question: String,

    pub option_a: String,
    pub option_b: String,
    pub option_c: String,
    pub option_d: String,

    /// One of `OPTION_KEYS`.
    pub correct_option: String,
}

/// DTO for sending a question to an examinee (excludes the answer key).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PublicQuestion {
    pub id: i64,
    pub question: String,
    pub option_a: String,
    pub option_b: String,
    pub option_c: String,
    pub option_d: String,
}

/// DTO for creating or replacing a question.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateQuestionRequest {
    #[validate(length(min = 1, max = 2000))]
    pub question: String,
    #[validate(length(min = 1, max = 500))]
    pub option_a: String,
    #[validate(length(min = 1, max = 500))]
    pub option_b: String,
    #[validate(length(min = 1, max = 500))]
    pub option_c: String,
    #[validate(length(min = 1, max = 500))]
    pub option_d: String,
    #[validate(custom(function = validate_correct_option))]
    pub correct_option: String,
}

fn validate_correct_option(value: &str) -> Result<(), validator::ValidationError> {
    if OPTION_KEYS.contains(&value) {
        Ok(())
    } else {
        Err(validator::ValidationError::new("unknown_option_key"))
    }
}
