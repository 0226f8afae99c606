// src/models/session.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sqlx::types::Json;

use crate::error::AppError;

/// Represents the 'sessions' table: one server-side record per login, keyed
/// by the opaque bearer token handed to the client.
///
/// Examinee sessions carry `user_id` plus the exam progress fields; admin
/// sessions carry `is_admin` and `admin_id` instead.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct SessionRecord {
    pub token: String,

    /// The examinee's login id. `None` for admin sessions.
    pub user_id: Option<String>,

    /// Ordered list of question ids assigned at login.
    pub question_ids: Json<Vec<i64>>,

    /// Index into `question_ids` of the question currently displayed.
    pub current_index: i64,

    /// Instructions gate: the countdown does not start until the examinee
    /// acknowledges the instructions.
    pub instructions_shown: bool,

    /// Unix timestamp set when the examinee starts the exam.
    pub exam_start: Option<i64>,

    pub is_admin: bool,
    pub admin_id: Option<i64>,

    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl SessionRecord {
    /// Returns the examinee's login id, rejecting admin or malformed
    /// sessions. The 401 here is the API analog of "redirect to login".
    pub fn examinee(&self) -> Result<&str, AppError> {
        self.user_id
            .as_deref()
            .ok_or_else(|| AppError::AuthError("Not an examinee session".to_string()))
    }

    /// Current index clamped to the assigned question list.
    pub fn clamped_index(&self) -> usize {
        let len = self.question_ids.0.len();
        if len == 0 {
            0
        } else {
            (self.current_index.max(0) as usize).min(len - 1)
        }
    }
}
