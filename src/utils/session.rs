// src/utils/session.rs

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode, header},
    middleware::Next,
    response::Response,
};
use sqlx::SqlitePool;
use sqlx::types::Json;
use uuid::Uuid;

use crate::{error::AppError, models::session::SessionRecord, state::AppState};

/// Creates an examinee session with a freshly assigned question list and
/// returns the opaque token the client must present as a bearer token.
pub async fn create_exam_session(
    pool: &SqlitePool,
    user_id: &str,
    question_ids: Vec<i64>,
) -> Result<String, AppError> {
    let token = Uuid::new_v4().to_string();

    sqlx::query(
        r#"
        INSERT INTO sessions (token, user_id, question_ids, current_index, instructions_shown, is_admin)
        VALUES (?, ?, ?, 0, 0, 0)
        "#,
    )
    .bind(&token)
    .bind(user_id)
    .bind(Json(question_ids))
    .execute(pool)
    .await?;

    Ok(token)
}

/// Creates an admin session. Admin sessions carry no exam state.
pub async fn create_admin_session(pool: &SqlitePool, admin_id: i64) -> Result<String, AppError> {
    let token = Uuid::new_v4().to_string();

    sqlx::query(
        r#"
        INSERT INTO sessions (token, question_ids, is_admin, admin_id)
        VALUES (?, '[]', 1, ?)
        "#,
    )
    .bind(&token)
    .bind(admin_id)
    .execute(pool)
    .await?;

    Ok(token)
}

/// Resolves a bearer token to its session record, if any.
pub async fn load_session(
    pool: &SqlitePool,
    token: &str,
) -> Result<Option<SessionRecord>, AppError> {
    let session = sqlx::query_as::<_, SessionRecord>(
        r#"
        SELECT token, user_id, question_ids, current_index, instructions_shown,
               exam_start, is_admin, admin_id, created_at
        FROM sessions
        WHERE token = ?
        "#,
    )
    .bind(token)
    .fetch_optional(pool)
    .await?;

    Ok(session)
}

/// Deletes a session (logout).
pub async fn delete_session(pool: &SqlitePool, token: &str) -> Result<(), AppError> {
    sqlx::query("DELETE FROM sessions WHERE token = ?")
        .bind(token)
        .execute(pool)
        .await?;
    Ok(())
}

/// Axum Middleware: Session resolution.
///
/// Intercepts requests, resolves the 'Authorization: Bearer <token>' header
/// against the sessions table. If a record exists, injects `SessionRecord`
/// into the request extensions for handlers to use.
/// If missing or stale, returns 401 Unauthorized.
pub async fn session_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    let token = match auth_header {
        Some(header) if header.starts_with("Bearer ") => &header[7..],
        _ => return Err(StatusCode::UNAUTHORIZED),
    };

    match load_session(&state.pool, token).await {
        Ok(Some(session)) => {
            req.extensions_mut().insert(session);
            Ok(next.run(req).await)
        }
        Ok(None) => Err(StatusCode::UNAUTHORIZED),
        Err(_) => Err(StatusCode::INTERNAL_SERVER_ERROR),
    }
}

/// Axum Middleware: Admin Authorization.
///
/// Must be used AFTER `session_middleware`. Checks that the injected
/// `SessionRecord` belongs to an admin. If not, returns 403 Forbidden.
pub async fn admin_middleware(req: Request<Body>, next: Next) -> Result<Response, StatusCode> {
    let session = req
        .extensions()
        .get::<SessionRecord>()
        .ok_or(StatusCode::UNAUTHORIZED)?;

    if !session.is_admin {
        return Err(StatusCode::FORBIDDEN);
    }

    Ok(next.run(req).await)
}
