// src/engine/scoring.rs

use std::collections::HashMap;

use crate::models::{
    exam_result::{AnswerEntry, ScoreDetail},
    question::Question,
};

/// Scores the multiple-choice questions of a materialized set.
///
/// Returns the breakdown and the percentage score. Answers are matched to
/// questions by id and compared to the key label with strict, case-sensitive
/// equality. Essays are skipped entirely. With no multiple-choice questions
/// the score is exactly `0.0`.
pub fn calculate_score(questions: &[Question], answers: &[AnswerEntry]) -> (ScoreDetail, f64) {
    let answer_map: HashMap<&str, &str> = answers
        .iter()
        .filter_map(|a| a.answer.as_deref().map(|ans| (a.question_id.as_str(), ans)))
        .collect();

    let mut correct = 0u32;
    let mut total_multiple_choice = 0u32;

    for question in questions {
        let Some(key) = question.key() else {
            continue;
        };
        total_multiple_choice += 1;

        if answer_map.get(question.id.as_str()) == Some(&key.as_str()) {
            correct += 1;
        }
    }

    let score = if total_multiple_choice > 0 {
        (correct as f64 / total_multiple_choice as f64) * 100.0
    } else {
        0.0
    };

    (
        ScoreDetail {
            correct,
            total_multiple_choice,
        },
        score,
    )
}
