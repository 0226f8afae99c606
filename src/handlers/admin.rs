// src/handlers/admin.rs

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;
use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    error::AppError,
    models::{
        admin::{Admin, AdminLoginRequest},
        question::{CreateQuestionRequest, Question},
        user::{CreateUserRequest, SetUserStateRequest, User, UserState},
    },
    utils::{
        hash::{hash_pin, verify_pin},
        session::create_admin_session,
    },
};

/// Authenticates an administrator and opens an admin session.
pub async fn login(
    State(pool): State<SqlitePool>,
    Json(payload): Json<AdminLoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let admin = sqlx::query_as::<_, Admin>(
        "SELECT id, username, pin, active FROM admins WHERE username = ? AND active = 1",
    )
    .bind(payload.username.trim())
    .fetch_optional(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Admin login DB error: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    let admin = admin.ok_or(AppError::AuthError(
        "Invalid credentials or inactive admin".to_string(),
    ))?;

    if !verify_pin(payload.pin.trim(), &admin.pin)? {
        return Err(AppError::AuthError(
            "Invalid credentials or inactive admin".to_string(),
        ));
    }

    let token = create_admin_session(&pool, admin.id).await?;

    Ok(Json(json!({
        "token": token,
        "type": "Bearer",
    })))
}

/// Dashboard summary: row counts for the admin landing view.
pub async fn dashboard(State(pool): State<SqlitePool>) -> Result<impl IntoResponse, AppError> {
    let active_users: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE active = 1")
        .fetch_one(&pool)
        .await?;
    let inactive_users: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE active = 0")
        .fetch_one(&pool)
        .await?;
    let questions: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM questions")
        .fetch_one(&pool)
        .await?;
    let answers: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM answers")
        .fetch_one(&pool)
        .await?;

    Ok(Json(json!({
        "active_users": active_users,
        "inactive_users": inactive_users,
        "questions": questions,
        "answers": answers,
    })))
}

/// Lists active users (the roster view).
pub async fn list_users(State(pool): State<SqlitePool>) -> Result<impl IntoResponse, AppError> {
    let users = list_users_by_state(&pool, UserState::Active).await?;
    Ok(Json(users))
}

/// Lists inactive users (audit/restore view).
pub async fn list_inactive_users(
    State(pool): State<SqlitePool>,
) -> Result<impl IntoResponse, AppError> {
    let users = list_users_by_state(&pool, UserState::Inactive).await?;
    Ok(Json(users))
}

async fn list_users_by_state(
    pool: &SqlitePool,
    state: UserState,
) -> Result<Vec<User>, AppError> {
    let users = sqlx::query_as::<_, User>(
        "SELECT id, user_id, pin, active, created_at FROM users WHERE active = ? ORDER BY id",
    )
    .bind(state.as_flag())
    .fetch_all(pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to list users: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok(users)
}

/// Creates a new examinee account. Duplicate user ids conflict.
pub async fn create_user(
    State(pool): State<SqlitePool>,
    Json(payload): Json<CreateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let user_id = payload.user_id.trim().to_string();
    let hashed_pin = hash_pin(payload.pin.trim())?;

    let result = sqlx::query("INSERT INTO users (user_id, pin, active) VALUES (?, ?, 1)")
        .bind(&user_id)
        .bind(&hashed_pin)
        .execute(&pool)
        .await
        .map_err(|e| {
            if e.to_string().contains("UNIQUE constraint") {
                AppError::Conflict(format!("User ID '{}' already exists", user_id))
            } else {
                tracing::error!("Failed to create user: {:?}", e);
                AppError::InternalServerError(e.to_string())
            }
        })?;

    Ok((
        StatusCode::CREATED,
        Json(json!({"id": result.last_insert_rowid()})),
    ))
}

/// Deletes a user and manually cascades their answers and sessions.
pub async fn delete_user(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    // Resolve the login id so related rows can be removed.
    let login_id: Option<String> = sqlx::query_scalar("SELECT user_id FROM users WHERE id = ?")
        .bind(id)
        .fetch_optional(&pool)
        .await?;

    let login_id = login_id.ok_or(AppError::NotFound("User not found".to_string()))?;

    sqlx::query("DELETE FROM answers WHERE user_id = ?")
        .bind(&login_id)
        .execute(&pool)
        .await?;

    sqlx::query("DELETE FROM sessions WHERE user_id = ?")
        .bind(&login_id)
        .execute(&pool)
        .await?;

    sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(id)
        .execute(&pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to delete user: {:?}", e);
            AppError::InternalServerError(e.to_string())
        })?;

    tracing::info!("User '{}' deleted", login_id);

    Ok(StatusCode::NO_CONTENT)
}

/// The single roster state transition. Both the explicit state route and the
/// toggle route land here; deactivation keeps the user's answer rows.
async fn transition_user_state(
    pool: &SqlitePool,
    id: i64,
    target: UserState,
) -> Result<UserState, AppError> {
    let result = sqlx::query("UPDATE users SET active = ? WHERE id = ?")
        .bind(target.as_flag())
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    Ok(target)
}

/// Sets a user's roster state explicitly.
pub async fn set_user_state(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
    Json(payload): Json<SetUserStateRequest>,
) -> Result<impl IntoResponse, AppError> {
    let state = transition_user_state(&pool, id, payload.state).await?;
    Ok(Json(json!({"id": id, "state": state})))
}

/// Flips a user's roster state.
pub async fn toggle_user(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let active: Option<bool> = sqlx::query_scalar("SELECT active FROM users WHERE id = ?")
        .bind(id)
        .fetch_optional(&pool)
        .await?;

    let active = active.ok_or(AppError::NotFound("User not found".to_string()))?;
    let state = transition_user_state(&pool, id, UserState::from_flag(active).toggled()).await?;

    Ok(Json(json!({"id": id, "state": state})))
}

/// Lists the full question bank, newest first. Admin only, so the answer
/// key is included.
pub async fn list_questions(State(pool): State<SqlitePool>) -> Result<impl IntoResponse, AppError> {
    let questions = sqlx::query_as::<_, Question>(
        r#"
        SELECT id, question, option_a, option_b, option_c, option_d, correct_option
        FROM questions
        ORDER BY id DESC
        "#,
    )
    .fetch_all(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to list questions: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok(Json(questions))
}

/// Adds a question to the bank.
pub async fn create_question(
    State(pool): State<SqlitePool>,
    Json(payload): Json<CreateQuestionRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let result = sqlx::query(
        r#"
        INSERT INTO questions (question, option_a, option_b, option_c, option_d, correct_option)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(payload.question.trim())
    .bind(payload.option_a.trim())
    .bind(payload.option_b.trim())
    .bind(payload.option_c.trim())
    .bind(payload.option_d.trim())
    .bind(&payload.correct_option)
    .execute(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to create question: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok((
        StatusCode::CREATED,
        Json(json!({"id": result.last_insert_rowid()})),
    ))
}

/// Replaces a question by ID.
pub async fn update_question(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
    Json(payload): Json<CreateQuestionRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let result = sqlx::query(
        r#"
        UPDATE questions
        SET question = ?, option_a = ?, option_b = ?, option_c = ?, option_d = ?, correct_option = ?
        WHERE id = ?
        "#,
    )
    .bind(payload.question.trim())
    .bind(payload.option_a.trim())
    .bind(payload.option_b.trim())
    .bind(payload.option_c.trim())
    .bind(payload.option_d.trim())
    .bind(&payload.correct_option)
    .bind(id)
    .execute(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to update question: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Question not found".to_string()));
    }

    Ok(StatusCode::OK)
}

/// Deletes a question by ID.
pub async fn delete_question(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let result = sqlx::query("DELETE FROM questions WHERE id = ?")
        .bind(id)
        .execute(&pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to delete question: {:?}", e);
            AppError::InternalServerError(e.to_string())
        })?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Question not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}
