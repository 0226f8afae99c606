// src/routes.rs

use axum::{
    Json, Router,
    http::Method,
    middleware,
    routing::{delete, get, post, put},
};
use serde_json::json;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{admin, auth, exam},
    state::AppState,
    utils::session::{admin_middleware, session_middleware},
};

/// Landing route: a service banner instead of the old server-rendered
/// homepage.
async fn index() -> Json<serde_json::Value> {
    Json(json!({
        "service": "cbt-backend",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Assembles the main application router.
///
/// * Merges all sub-routers (auth, exam, admin).
/// * Applies global middleware (Trace, CORS).
/// * Injects global state (Database Pool + Config).
pub fn create_router(state: AppState) -> Router {
    let origins = [
        "http://localhost:3000".parse().unwrap(),
        "http://127.0.0.1:3000".parse().unwrap(),
    ];

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ]);

    let auth_routes = Router::new()
        .route("/login", post(auth::login))
        .merge(
            Router::new()
                .route("/logout", post(auth::logout))
                .layer(middleware::from_fn_with_state(
                    state.clone(),
                    session_middleware,
                )),
        );

    let exam_routes = Router::new()
        .route("/", get(exam::view_exam).post(exam::submit))
        .route("/start", post(exam::start_exam))
        .route("/results", get(exam::results))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            session_middleware,
        ));

    let admin_routes = Router::new()
        .route("/", get(admin::dashboard))
        .route("/users", get(admin::list_users).post(admin::create_user))
        .route("/users/inactive", get(admin::list_inactive_users))
        .route("/users/{id}", delete(admin::delete_user))
        .route("/users/{id}/state", put(admin::set_user_state))
        .route("/users/{id}/toggle", post(admin::toggle_user))
        .route(
            "/questions",
            get(admin::list_questions).post(admin::create_question),
        )
        .route(
            "/questions/{id}",
            put(admin::update_question).delete(admin::delete_question),
        )
        // Double middleware protection: session first, then admin check.
        .layer(middleware::from_fn(admin_middleware))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            session_middleware,
        ))
        // Admin login stays outside the session guard.
        .route("/login", post(admin::login));

    Router::new()
        .route("/", get(index))
        .nest("/api/auth", auth_routes)
        .nest("/api/exam", exam_routes)
        .nest("/api/admin", admin_routes)
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
