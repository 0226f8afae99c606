// src/models/admin.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Represents the 'admins' table in the database.
/// Same shape as `users`: a login name, a hashed PIN, and an active flag.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Admin {
    pub id: i64,
    pub username: String,
    #[serde(skip)]
    pub pin: String,
    pub active: bool,
}

/// DTO for admin login.
#[derive(Debug, Deserialize, Validate)]
pub struct AdminLoginRequest {
    #[validate(length(min = 1, max = 50))]
    pub username: String,
    #[validate(length(min = 1, max = 64))]
    pub pin: String,
}
