// src/models/answer.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Represents the 'answers' table in the database.
/// At most one row per (user_id, question_id); resubmission overwrites.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Answer {
    pub id: i64,
    pub user_id: String,
    pub question_id: i64,

    /// One of the option column names ("option_a".."option_d").
    pub selected_option: String,
}
