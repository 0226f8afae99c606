// src/models/user.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Represents the 'users' table in the database (exam-taker credentials).
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct User {
    pub id: i64,

    /// The login identifier the examinee types in (unique).
    pub user_id: String,

    /// Argon2 hash of the examinee's PIN.
    /// Skipped during serialization to prevent leaking sensitive data.
    #[serde(skip)]
    pub pin: String,

    /// Soft-delete flag: inactive users cannot log in but keep their rows.
    pub active: bool,

    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// The two roster states a user can be in. Admin actions that previously
/// duplicated activate/deactivate/toggle routes all funnel through this enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserState {
    Active,
    Inactive,
}

impl UserState {
    pub fn from_flag(active: bool) -> Self {
        if active {
            UserState::Active
        } else {
            UserState::Inactive
        }
    }

    pub fn as_flag(self) -> bool {
        matches!(self, UserState::Active)
    }

    pub fn toggled(self) -> Self {
        match self {
            UserState::Active => UserState::Inactive,
            UserState::Inactive => UserState::Active,
        }
    }
}

/// DTO for user login.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, max = 50))]
    pub user_id: String,
    #[validate(length(min = 1, max = 64))]
    pub pin: String,
}

/// DTO for an admin creating a new examinee account.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(length(
        min = 1,
        max = 50,
        message = "User ID length must be between 1 and 50 characters."
    ))]
    pub user_id: String,
    #[validate(length(
        min = 4,
        max = 64,
        message = "PIN length must be between 4 and 64 characters."
    ))]
    pub pin: String,
}

/// DTO for the explicit roster state transition.
#[derive(Debug, Deserialize)]
pub struct SetUserStateRequest {
    pub state: UserState,
}
