// src/models/exam.rs

use serde::{Deserialize, Serialize};

use crate::models::question::PublicQuestion;

/// Per-question navigation state shown in the question palette.
#[derive(Debug, Clone, Serialize)]
pub struct NavState {
    pub index: usize,
    pub answered: bool,
    pub active: bool,
}

/// Everything the exam screen needs for the current question.
#[derive(Debug, Serialize)]
pub struct ExamView {
    /// True until the examinee acknowledges the instructions; the countdown
    /// has not started yet and `remaining` shows the full duration.
    pub show_instructions: bool,

    /// True once elapsed time has reached the duration; `question` is absent
    /// and the client should fetch the results.
    pub time_expired: bool,

    /// Set by answer submission when "next" is pressed on the last question.
    pub finished: bool,

    /// Seconds left on the clock. Never negative.
    pub remaining: i64,

    pub current: usize,
    pub total: usize,

    pub question: Option<PublicQuestion>,

    /// The option previously saved for the current question, if any.
    pub saved_option: Option<String>,

    pub navigation: Vec<NavState>,
}

/// Navigation actions on the exam screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NavAction {
    Next,
    Previous,
}

/// Answer/navigation submission. Mirrors the exam form: an optional answer
/// for the current question plus either a jump target or a next/previous
/// action. `jump_to` takes precedence over `action`.
#[derive(Debug, Deserialize)]
pub struct ExamSubmission {
    pub selected_option: Option<String>,
    pub action: Option<NavAction>,
    pub jump_to: Option<i64>,
}

/// One scored row in the results report.
#[derive(Debug, Serialize)]
pub struct ResultDetail {
    pub question: String,
    pub option_a: String,
    pub option_b: String,
    pub option_c: String,
    pub option_d: String,

    /// Display label "A".."D", or "Unanswered".
    pub user_answer: String,
    pub correct_answer: String,
    pub is_correct: bool,
}

/// The scored report for one examinee.
#[derive(Debug, Serialize)]
pub struct ResultsReport {
    pub score: usize,
    pub total: usize,
    pub answered: usize,
    pub skipped: usize,
    pub results: Vec<ResultDetail>,
}
