// src/handlers/auth.rs

use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};
use serde_json::json;
use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    config::Config,
    error::AppError,
    models::{session::SessionRecord, user::{LoginRequest, User}},
    utils::{
        hash::verify_pin,
        session::{create_exam_session, delete_session},
    },
};

/// Authenticates an examinee and opens a fresh exam session.
///
/// On success: wipes the examinee's previous answers, assigns a random
/// subset of the question bank, and returns the session token. The clock
/// does not start until the examinee acknowledges the instructions.
pub async fn login(
    State(pool): State<SqlitePool>,
    State(config): State<Config>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let user = sqlx::query_as::<_, User>(
        r#"
        SELECT id, user_id, pin, active, created_at
        FROM users
        WHERE user_id = ? AND active = 1
        "#,
    )
    .bind(payload.user_id.trim())
    .fetch_optional(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Login DB error: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    let user = user.ok_or(AppError::AuthError("Invalid ID or PIN".to_string()))?;

    let is_valid = verify_pin(payload.pin.trim(), &user.pin)?;

    if !is_valid {
        return Err(AppError::AuthError("Invalid ID or PIN".to_string()));
    }

    // A new login is a new attempt: clear any previous answers for this user.
    sqlx::query("DELETE FROM answers WHERE user_id = ?")
        .bind(&user.user_id)
        .execute(&pool)
        .await?;

    // Assign a random subset of the bank (fewer if the bank is smaller).
    let question_ids: Vec<i64> =
        sqlx::query_scalar("SELECT id FROM questions ORDER BY RANDOM() LIMIT ?")
            .bind(config.exam_question_count)
            .fetch_all(&pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to assign questions: {:?}", e);
                AppError::InternalServerError(e.to_string())
            })?;

    let question_count = question_ids.len();
    let token = create_exam_session(&pool, &user.user_id, question_ids).await?;

    tracing::info!("Examinee '{}' logged in, {} questions assigned", user.user_id, question_count);

    Ok(Json(json!({
        "token": token,
        "type": "Bearer",
        "question_count": question_count,
    })))
}

/// Ends the current session (examinee or admin).
pub async fn logout(
    State(pool): State<SqlitePool>,
    Extension(session): Extension<SessionRecord>,
) -> Result<impl IntoResponse, AppError> {
    delete_session(&pool, &session.token).await?;
    Ok(StatusCode::NO_CONTENT)
}
