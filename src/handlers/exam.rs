// src/handlers/exam.rs

use std::collections::{HashMap, HashSet};
use std::time::{SystemTime, UNIX_EPOCH};

use axum::{Extension, Json, extract::State, response::IntoResponse};
use serde_json::json;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use crate::{
    config::Config,
    error::AppError,
    models::{
        answer::Answer,
        exam::{ExamSubmission, ExamView, NavAction, NavState, ResultDetail, ResultsReport},
        question::{OPTION_KEYS, PublicQuestion, Question, option_label},
        session::SessionRecord,
    },
};

fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

/// Seconds left on the clock, clamped at zero.
fn remaining_secs(duration: i64, start: i64, now: i64) -> i64 {
    (duration - (now - start)).max(0)
}

/// Acknowledges the instructions and starts the countdown.
///
/// Idempotent: a second call (e.g. a duplicate tab) does not reset the
/// clock, the first start time wins.
pub async fn start_exam(
    State(pool): State<SqlitePool>,
    State(config): State<Config>,
    Extension(session): Extension<SessionRecord>,
) -> Result<impl IntoResponse, AppError> {
    session.examinee()?;

    let now = unix_now();
    sqlx::query(
        r#"
        UPDATE sessions
        SET instructions_shown = 1, exam_start = COALESCE(exam_start, ?)
        WHERE token = ?
        "#,
    )
    .bind(now)
    .bind(&session.token)
    .execute(&pool)
    .await?;

    let start: i64 = sqlx::query_scalar("SELECT exam_start FROM sessions WHERE token = ?")
        .bind(&session.token)
        .fetch_one(&pool)
        .await?;

    Ok(Json(json!({
        "remaining": remaining_secs(config.exam_duration_secs, start, now),
    })))
}

/// Returns the exam screen state: the current question (answer key hidden),
/// the saved answer for it, the countdown, and the navigation palette.
pub async fn view_exam(
    State(pool): State<SqlitePool>,
    State(config): State<Config>,
    Extension(session): Extension<SessionRecord>,
) -> Result<impl IntoResponse, AppError> {
    let view = build_view(&pool, &config, &session).await?;
    Ok(Json(view))
}

/// Handles an answer/navigation submission for the current question.
///
/// Order of operations mirrors the exam form: save the answer if one was
/// provided, then apply navigation. `jump_to` takes precedence over
/// next/previous; "next" on the last question marks the attempt finished.
pub async fn submit(
    State(pool): State<SqlitePool>,
    State(config): State<Config>,
    Extension(session): Extension<SessionRecord>,
    Json(req): Json<ExamSubmission>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = session.examinee()?.to_string();
    let mut session = session;
    let ids = session.question_ids.0.clone();
    let mut finished = false;

    if !ids.is_empty() {
        let current = session.clamped_index();
        let question_id = ids[current];

        if let Some(option) = req.selected_option.as_deref() {
            if !OPTION_KEYS.contains(&option) {
                return Err(AppError::BadRequest(format!(
                    "Unknown option '{}'",
                    option
                )));
            }
            sqlx::query(
                r#"
                INSERT INTO answers (user_id, question_id, selected_option)
                VALUES (?, ?, ?)
                ON CONFLICT (user_id, question_id)
                DO UPDATE SET selected_option = excluded.selected_option
                "#,
            )
            .bind(&user_id)
            .bind(question_id)
            .bind(option)
            .execute(&pool)
            .await?;
        }

        let mut new_index = current as i64;
        if let Some(target) = req.jump_to {
            // Out-of-range jump targets are ignored.
            if target >= 0 && (target as usize) < ids.len() {
                new_index = target;
            }
        } else {
            match req.action {
                Some(NavAction::Next) => {
                    if current + 1 < ids.len() {
                        new_index = current as i64 + 1;
                    } else {
                        finished = true;
                    }
                }
                Some(NavAction::Previous) => {
                    if current > 0 {
                        new_index = current as i64 - 1;
                    }
                }
                None => {}
            }
        }

        if new_index != session.current_index {
            sqlx::query("UPDATE sessions SET current_index = ? WHERE token = ?")
                .bind(new_index)
                .bind(&session.token)
                .execute(&pool)
                .await?;
            session.current_index = new_index;
        }
    }

    let mut view = build_view(&pool, &config, &session).await?;
    view.finished = finished;
    Ok(Json(view))
}

/// Scores the session's assigned questions and returns the detailed report.
pub async fn results(
    State(pool): State<SqlitePool>,
    Extension(session): Extension<SessionRecord>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = session.examinee()?;
    let ids = &session.question_ids.0;

    let questions = fetch_assigned_questions(&pool, ids).await?;

    let answers: HashMap<i64, String> = sqlx::query_as::<_, (i64, String)>(
        "SELECT question_id, selected_option FROM answers WHERE user_id = ?",
    )
    .bind(user_id)
    .fetch_all(&pool)
    .await?
    .into_iter()
    .collect();

    Ok(Json(score_report(&questions, &answers)))
}

/// Assembles the exam screen state for one session record.
async fn build_view(
    pool: &SqlitePool,
    config: &Config,
    session: &SessionRecord,
) -> Result<ExamView, AppError> {
    let user_id = session.examinee()?;
    let ids = &session.question_ids.0;
    let now = unix_now();

    let (show_instructions, remaining) = if !session.instructions_shown {
        // Countdown has not started; the examinee still has the full duration.
        (true, config.exam_duration_secs)
    } else {
        let start = session
            .exam_start
            .ok_or_else(|| AppError::AuthError("Session has no start time".to_string()))?;
        (false, remaining_secs(config.exam_duration_secs, start, now))
    };

    if !show_instructions && remaining == 0 {
        return Ok(ExamView {
            show_instructions: false,
            time_expired: true,
            finished: false,
            remaining: 0,
            current: 0,
            total: ids.len(),
            question: None,
            saved_option: None,
            navigation: Vec::new(),
        });
    }

    let current = session.clamped_index();

    let (question, saved_option) = match ids.get(current) {
        Some(&question_id) => {
            let question = sqlx::query_as::<_, PublicQuestion>(
                r#"
                SELECT id, question, option_a, option_b, option_c, option_d
                FROM questions
                WHERE id = ?
                "#,
            )
            .bind(question_id)
            .fetch_optional(pool)
            .await?;

            let saved = sqlx::query_as::<_, Answer>(
                "SELECT id, user_id, question_id, selected_option FROM answers
                 WHERE user_id = ? AND question_id = ?",
            )
            .bind(user_id)
            .bind(question_id)
            .fetch_optional(pool)
            .await?;

            (question, saved.map(|a| a.selected_option))
        }
        None => (None, None),
    };

    let answered: HashSet<i64> =
        sqlx::query_scalar::<_, i64>("SELECT question_id FROM answers WHERE user_id = ?")
            .bind(user_id)
            .fetch_all(pool)
            .await?
            .into_iter()
            .collect();

    let navigation = ids
        .iter()
        .enumerate()
        .map(|(index, qid)| NavState {
            index,
            answered: answered.contains(qid),
            active: index == current,
        })
        .collect();

    Ok(ExamView {
        show_instructions,
        time_expired: false,
        finished: false,
        remaining,
        current,
        total: ids.len(),
        question,
        saved_option,
        navigation,
    })
}

/// Fetches the assigned questions, preserving the assignment order.
async fn fetch_assigned_questions(
    pool: &SqlitePool,
    ids: &[i64],
) -> Result<Vec<Question>, AppError> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let mut query_builder = QueryBuilder::<Sqlite>::new(
        "SELECT id, question, option_a, option_b, option_c, option_d, correct_option
         FROM questions WHERE id IN (",
    );

    let mut separated = query_builder.separated(",");
    for id in ids {
        separated.push_bind(*id);
    }
    separated.push_unseparated(")");

    let rows: Vec<Question> = query_builder
        .build_query_as()
        .fetch_all(pool)
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;

    let mut by_id: HashMap<i64, Question> = rows.into_iter().map(|q| (q.id, q)).collect();
    Ok(ids.iter().filter_map(|id| by_id.remove(id)).collect())
}

/// Scores one examinee: a point per stored answer equal to the answer key.
fn score_report(questions: &[Question], answers: &HashMap<i64, String>) -> ResultsReport {
    let mut score = 0;
    let mut answered = 0;
    let mut skipped = 0;
    let mut results = Vec::with_capacity(questions.len());

    for q in questions {
        let user_answer = answers.get(&q.id);

        if user_answer.is_some() {
            answered += 1;
        } else {
            skipped += 1;
        }

        let is_correct = user_answer.map(|a| a == &q.correct_option).unwrap_or(false);
        if is_correct {
            score += 1;
        }

        results.push(ResultDetail {
            question: q.question.clone(),
            option_a: q.option_a.clone(),
            option_b: q.option_b.clone(),
            option_c: q.option_c.clone(),
            option_d: q.option_d.clone(),
            user_answer: user_answer
                .and_then(|a| option_label(a))
                .unwrap_or("Unanswered")
                .to_string(),
            correct_answer: option_label(&q.correct_option)
                .map(str::to_string)
                .unwrap_or_else(|| q.correct_option.clone()),
            is_correct,
        });
    }

    ResultsReport {
        score,
        total: questions.len(),
        answered,
        skipped,
        results,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(id: i64, correct: &str) -> Question {
        Question {
            id,
            question: format!("Question {}", id),
            option_a: "a".to_string(),
            option_b: "b".to_string(),
            option_c: "c".to_string(),
            option_d: "d".to_string(),
            correct_option: correct.to_string(),
        }
    }

    #[test]
    fn remaining_never_negative() {
        assert_eq!(remaining_secs(1800, 1000, 1000), 1800);
        assert_eq!(remaining_secs(1800, 1000, 2000), 800);
        assert_eq!(remaining_secs(1800, 1000, 2800), 0);
        assert_eq!(remaining_secs(1800, 1000, 99_999), 0);
    }

    #[test]
    fn score_report_counts_answered_skipped_and_score() {
        // 2 correct, 1 incorrect, 1 skipped out of 4.
        let questions = vec![
            question(1, "option_a"),
            question(2, "option_b"),
            question(3, "option_c"),
            question(4, "option_d"),
        ];

        let mut answers = HashMap::new();
        answers.insert(1, "option_a".to_string());
        answers.insert(2, "option_b".to_string());
        answers.insert(3, "option_a".to_string()); // wrong

        let report = score_report(&questions, &answers);
        assert_eq!(report.score, 2);
        assert_eq!(report.answered, 3);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.total, 4);
        assert_eq!(report.answered + report.skipped, report.total);
    }

    #[test]
    fn score_report_renders_labels() {
        let questions = vec![question(1, "option_c"), question(2, "option_a")];

        let mut answers = HashMap::new();
        answers.insert(1, "option_c".to_string());

        let report = score_report(&questions, &answers);
        assert_eq!(report.results[0].user_answer, "C");
        assert_eq!(report.results[0].correct_answer, "C");
        assert!(report.results[0].is_correct);
        assert_eq!(report.results[1].user_answer, "Unanswered");
        assert_eq!(report.results[1].correct_answer, "A");
        assert!(!report.results[1].is_correct);
    }

    #[test]
    fn score_report_empty_bank() {
        let report = score_report(&[], &HashMap::new());
        assert_eq!(report.score, 0);
        assert_eq!(report.total, 0);
        assert_eq!(report.answered, 0);
        assert_eq!(report.skipped, 0);
        assert!(report.results.is_empty());
    }
}
