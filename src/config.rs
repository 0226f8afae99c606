// src/config.rs

use dotenvy::dotenv;
use std::env;

/// Exam sizing defaults (overridable via environment).
pub const DEFAULT_EXAM_DURATION_SECS: i64 = 30 * 60;
pub const DEFAULT_EXAM_QUESTION_COUNT: i64 = 50;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub rust_log: String,

    /// Optional admin account seeded at startup.
    pub admin_username: Option<String>,
    pub admin_pin: Option<String>,

    /// Wall-clock exam duration in seconds.
    pub exam_duration_secs: i64,

    /// How many random questions each examinee is assigned.
    pub exam_question_count: i64,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let admin_username = env::var("ADMIN_USERNAME").ok();
        let admin_pin = env::var("ADMIN_PIN").ok();

        let exam_duration_secs = env::var("EXAM_DURATION_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_EXAM_DURATION_SECS);

        let exam_question_count = env::var("EXAM_QUESTION_COUNT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_EXAM_QUESTION_COUNT);

        Self {
            database_url,
            rust_log,
            admin_username,
            admin_pin,
            exam_duration_secs,
            exam_question_count,
        }
    }
}
