// src/models/session.rs

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::{
    engine::{ExamSession, SessionState},
    models::question::PublicQuestion,
};

/// DTO describing a running session to the student.
#[derive(Debug, Serialize)]
pub struct SessionView {
    pub session_id: Uuid,
    pub schedule_id: String,
    pub state: SessionState,
    pub current_index: usize,
    pub total_questions: usize,
    pub question: PublicQuestion,
    pub current_answer: Option<String>,
    /// One flag per question, in session order.
    pub answered: Vec<bool>,
    pub answered_count: usize,
    pub remaining_secs: u64,
    /// Remaining time as `MM:SS`.
    pub remaining_display: String,
}

impl SessionView {
    pub fn new(session_id: Uuid, session: &ExamSession) -> Self {
        let index = session.current_index();
        let total = session.questions().len();

        Self {
            session_id,
            schedule_id: session.schedule_id().to_string(),
            state: session.state(),
            current_index: index,
            total_questions: total,
            question: PublicQuestion::from(session.current_question()),
            current_answer: session.answers()[index].answer.clone(),
            answered: (0..total).map(|i| session.is_answered(i)).collect(),
            answered_count: session.answered_count(),
            remaining_secs: session.remaining_secs(),
            remaining_display: format_remaining(session.remaining_secs()),
        }
    }
}

/// Formats seconds as zero-padded `MM:SS`; minutes may exceed two digits.
pub fn format_remaining(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// DTO for recording an answer. `answer: null` clears it.
#[derive(Debug, Deserialize, Validate)]
pub struct RecordAnswerRequest {
    #[validate(length(min = 1, max = 100))]
    pub question_id: String,
    #[validate(length(max = 20000, message = "Answer is too long."))]
    pub answer: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Next,
    Back,
}

/// DTO for moving the question cursor: either `{"to": n}` or `{"step": "next"}`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum NavigateRequest {
    To { to: usize },
    Step { step: Step },
}
