// src/models/settings.rs

use serde::{Deserialize, Serialize};

/// Administrator toggles that shape an exam session.
/// Read once when a session starts; never consulted as ambient state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExamSettings {
    pub shuffle_questions: bool,
    pub show_scores: bool,
}

impl Default for ExamSettings {
    fn default() -> Self {
        Self {
            shuffle_questions: true,
            show_scores: true,
        }
    }
}
