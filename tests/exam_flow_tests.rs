// tests/exam_flow_tests.rs

use std::collections::HashSet;

use cbt_backend::{config::Config, routes, state::AppState, utils::hash::hash_pin};
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;

const EXAM_DURATION_SECS: i64 = 1800;

/// Spawns the app on a random port, sharing the in-memory pool with the test.
async fn spawn_app() -> (String, SqlitePool) {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to open in-memory database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to migrate database");

    let config = Config {
        database_url: "sqlite::memory:".to_string(),
        rust_log: "error".to_string(),
        admin_username: None,
        admin_pin: None,
        exam_duration_secs: EXAM_DURATION_SECS,
        exam_question_count: 50,
    };

    let state = AppState {
        pool: pool.clone(),
        config,
    };

    let app = routes::create_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");

    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (address, pool)
}

async fn seed_user(pool: &SqlitePool, user_id: &str, pin: &str) {
    sqlx::query("INSERT INTO users (user_id, pin, active) VALUES (?, ?, 1)")
        .bind(user_id)
        .bind(hash_pin(pin).unwrap())
        .execute(pool)
        .await
        .unwrap();
}

/// Seeds `count` questions whose correct answer is always `option_a`.
async fn seed_questions(pool: &SqlitePool, count: usize) {
    for i in 0..count {
        sqlx::query(
            "INSERT INTO questions (question, option_a, option_b, option_c, option_d, correct_option)
             VALUES (?, 'a', 'b', 'c', 'd', 'option_a')",
        )
        .bind(format!("Question {}", i))
        .execute(pool)
        .await
        .unwrap();
    }
}

async fn login(client: &reqwest::Client, address: &str) -> (String, i64) {
    let resp: serde_json::Value = client
        .post(format!("{}/api/auth/login", address))
        .json(&serde_json::json!({"user_id": "student1", "pin": "123456"}))
        .send()
        .await
        .expect("Login failed")
        .json()
        .await
        .expect("Failed to parse login json");

    let token = resp["token"].as_str().expect("Token not found").to_string();
    let count = resp["question_count"].as_i64().expect("question_count missing");
    (token, count)
}

async fn get_view(client: &reqwest::Client, address: &str, token: &str) -> serde_json::Value {
    client
        .get(format!("{}/api/exam", address))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to fetch exam view")
        .json()
        .await
        .expect("Failed to parse exam view")
}

async fn submit(
    client: &reqwest::Client,
    address: &str,
    token: &str,
    body: serde_json::Value,
) -> serde_json::Value {
    client
        .post(format!("{}/api/exam", address))
        .header("Authorization", format!("Bearer {}", token))
        .json(&body)
        .send()
        .await
        .expect("Failed to submit")
        .json()
        .await
        .expect("Failed to parse submit response")
}

#[tokio::test]
async fn login_assigns_capped_unique_subset() {
    let (address, pool) = spawn_app().await;
    let client = reqwest::Client::new();
    seed_user(&pool, "student1", "123456").await;
    seed_questions(&pool, 60).await;

    let (token, count) = login(&client, &address).await;
    assert_eq!(count, 50);

    // The session record holds 50 distinct question ids.
    let raw: String = sqlx::query_scalar("SELECT question_ids FROM sessions WHERE token = ?")
        .bind(&token)
        .fetch_one(&pool)
        .await
        .unwrap();
    let ids: Vec<i64> = serde_json::from_str(&raw).unwrap();
    let unique: HashSet<i64> = ids.iter().copied().collect();
    assert_eq!(ids.len(), 50);
    assert_eq!(unique.len(), 50);

    let view = get_view(&client, &address, &token).await;
    assert_eq!(view["total"], 50);
}

#[tokio::test]
async fn small_bank_assigns_fewer_questions() {
    let (address, pool) = spawn_app().await;
    let client = reqwest::Client::new();
    seed_user(&pool, "student1", "123456").await;
    seed_questions(&pool, 3).await;

    let (_token, count) = login(&client, &address).await;
    assert_eq!(count, 3);
}

#[tokio::test]
async fn instructions_gate_defers_countdown() {
    let (address, pool) = spawn_app().await;
    let client = reqwest::Client::new();
    seed_user(&pool, "student1", "123456").await;
    seed_questions(&pool, 3).await;

    let (token, _) = login(&client, &address).await;

    // Before starting: full duration, instructions still showing.
    let view = get_view(&client, &address, &token).await;
    assert_eq!(view["show_instructions"], true);
    assert_eq!(view["remaining"], EXAM_DURATION_SECS);
    assert_eq!(view["time_expired"], false);

    let start: serde_json::Value = client
        .post(format!("{}/api/exam/start", address))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Start failed")
        .json()
        .await
        .expect("Failed to parse start response");
    let remaining = start["remaining"].as_i64().unwrap();
    assert!(remaining > 0 && remaining <= EXAM_DURATION_SECS);

    let view = get_view(&client, &address, &token).await;
    assert_eq!(view["show_instructions"], false);

    // A second start (second tab) must not reset the clock.
    let first_start: i64 = sqlx::query_scalar("SELECT exam_start FROM sessions WHERE token = ?")
        .bind(&token)
        .fetch_one(&pool)
        .await
        .unwrap();
    sqlx::query("UPDATE sessions SET exam_start = exam_start - 60 WHERE token = ?")
        .bind(&token)
        .execute(&pool)
        .await
        .unwrap();
    client
        .post(format!("{}/api/exam/start", address))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Start failed");
    let second_start: i64 = sqlx::query_scalar("SELECT exam_start FROM sessions WHERE token = ?")
        .bind(&token)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(second_start, first_start - 60);
}

#[tokio::test]
async fn saved_answer_survives_navigation() {
    let (address, pool) = spawn_app().await;
    let client = reqwest::Client::new();
    seed_user(&pool, "student1", "123456").await;
    seed_questions(&pool, 3).await;

    let (token, _) = login(&client, &address).await;
    client
        .post(format!("{}/api/exam/start", address))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap();

    // Answer the first question and move on.
    let view = submit(
        &client,
        &address,
        &token,
        serde_json::json!({"selected_option": "option_b", "action": "next"}),
    )
    .await;
    assert_eq!(view["current"], 1);
    assert_eq!(view["saved_option"], serde_json::Value::Null);

    // Navigate back: the saved answer comes with the question.
    let view = submit(
        &client,
        &address,
        &token,
        serde_json::json!({"action": "previous"}),
    )
    .await;
    assert_eq!(view["current"], 0);
    assert_eq!(view["saved_option"], "option_b");
    assert_eq!(view["navigation"][0]["answered"], true);
    assert_eq!(view["navigation"][1]["answered"], false);
}

#[tokio::test]
async fn navigation_respects_bounds() {
    let (address, pool) = spawn_app().await;
    let client = reqwest::Client::new();
    seed_user(&pool, "student1", "123456").await;
    seed_questions(&pool, 3).await;

    let (token, _) = login(&client, &address).await;
    client
        .post(format!("{}/api/exam/start", address))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap();

    // Previous at the first question stays put.
    let view = submit(&client, &address, &token, serde_json::json!({"action": "previous"})).await;
    assert_eq!(view["current"], 0);

    // Out-of-range jumps are ignored.
    let view = submit(&client, &address, &token, serde_json::json!({"jump_to": 99})).await;
    assert_eq!(view["current"], 0);

    // In-range jump works and takes precedence over the action.
    let view = submit(
        &client,
        &address,
        &token,
        serde_json::json!({"jump_to": 2, "action": "previous"}),
    )
    .await;
    assert_eq!(view["current"], 2);
}

#[tokio::test]
async fn finished_exam_scores_match_property() {
    let (address, pool) = spawn_app().await;
    let client = reqwest::Client::new();
    seed_user(&pool, "student1", "123456").await;
    seed_questions(&pool, 4).await;

    let (token, count) = login(&client, &address).await;
    assert_eq!(count, 4);
    client
        .post(format!("{}/api/exam/start", address))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap();

    // 2 correct, 1 incorrect, 1 skipped.
    submit(&client, &address, &token, serde_json::json!({"selected_option": "option_a", "action": "next"})).await;
    submit(&client, &address, &token, serde_json::json!({"selected_option": "option_b", "action": "next"})).await;
    submit(&client, &address, &token, serde_json::json!({"action": "next"})).await;
    let view = submit(
        &client,
        &address,
        &token,
        serde_json::json!({"selected_option": "option_a", "action": "next"}),
    )
    .await;
    assert_eq!(view["finished"], true);

    let report: serde_json::Value = client
        .get(format!("{}/api/exam/results", address))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to fetch results")
        .json()
        .await
        .expect("Failed to parse results");

    assert_eq!(report["score"], 2);
    assert_eq!(report["answered"], 3);
    assert_eq!(report["skipped"], 1);
    assert_eq!(report["total"], 4);
    assert_eq!(report["results"].as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn expired_exam_reports_expiry_instead_of_question() {
    let (address, pool) = spawn_app().await;
    let client = reqwest::Client::new();
    seed_user(&pool, "student1", "123456").await;
    seed_questions(&pool, 3).await;

    let (token, _) = login(&client, &address).await;
    client
        .post(format!("{}/api/exam/start", address))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap();

    // Push the start time past the duration.
    sqlx::query("UPDATE sessions SET exam_start = exam_start - ? WHERE token = ?")
        .bind(EXAM_DURATION_SECS + 10)
        .bind(&token)
        .execute(&pool)
        .await
        .unwrap();

    let view = get_view(&client, &address, &token).await;
    assert_eq!(view["time_expired"], true);
    assert_eq!(view["remaining"], 0);
    assert_eq!(view["question"], serde_json::Value::Null);

    // Results are still reachable.
    let report: serde_json::Value = client
        .get(format!("{}/api/exam/results", address))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(report["total"], 3);
}

#[tokio::test]
async fn exam_routes_require_a_session() {
    let (address, _pool) = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/api/exam/results", address))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 401);

    let response = client
        .get(format!("{}/api/exam", address))
        .header("Authorization", "Bearer not-a-real-token")
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 401);
}

#[tokio::test]
async fn relogin_clears_previous_answers() {
    let (address, pool) = spawn_app().await;
    let client = reqwest::Client::new();
    seed_user(&pool, "student1", "123456").await;
    seed_questions(&pool, 3).await;

    let (token, _) = login(&client, &address).await;
    submit(
        &client,
        &address,
        &token,
        serde_json::json!({"selected_option": "option_c"}),
    )
    .await;

    let answers: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM answers WHERE user_id = 'student1'")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(answers, 1);

    // A fresh login is a fresh attempt.
    let (_token, _) = login(&client, &address).await;
    let answers: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM answers WHERE user_id = 'student1'")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(answers, 0);
}
