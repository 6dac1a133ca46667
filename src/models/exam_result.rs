// src/models/exam_result.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A student's answer to one materialized question.
/// `None` means the question has not been answered (or was cleared).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerEntry {
    pub question_id: String,
    pub answer: Option<String>,
}

impl AnswerEntry {
    pub fn unanswered(question_id: impl Into<String>) -> Self {
        Self {
            question_id: question_id.into(),
            answer: None,
        }
    }
}

/// Multiple-choice breakdown behind a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreDetail {
    pub correct: u32,
    pub total_multiple_choice: u32,
}

/// What ended the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmitTrigger {
    Manual,
    Timer,
}

/// A completed exam, as kept under the `results` storage key.
/// Immutable once created; deleting it is how a retake is granted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExamResult {
    pub id: Uuid,
    pub student_id: String,
    pub schedule_id: String,
    pub score: f64,
    pub answers: Vec<AnswerEntry>,
    pub completed_at: DateTime<Utc>,
    pub detail: ScoreDetail,
    pub submitted_by: SubmitTrigger,
}

/// DTO for returning a result to a student.
/// Score fields are omitted when scores are hidden by the administrator.
#[derive(Debug, Serialize)]
pub struct StudentResultView {
    pub id: Uuid,
    pub schedule_id: String,
    pub completed_at: DateTime<Utc>,
    pub submitted_by: SubmitTrigger,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<ScoreDetail>,
}

impl StudentResultView {
    pub fn new(result: &ExamResult, show_scores: bool) -> Self {
        Self {
            id: result.id,
            schedule_id: result.schedule_id.clone(),
            completed_at: result.completed_at,
            submitted_by: result.submitted_by,
            score: show_scores.then_some(result.score),
            detail: show_scores.then_some(result.detail),
        }
    }
}
