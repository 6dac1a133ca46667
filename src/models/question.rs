// src/models/question.rs

use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the five option labels of a multiple-choice question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OptionLabel {
    A,
    B,
    C,
    D,
    E,
}

impl OptionLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            OptionLabel::A => "A",
            OptionLabel::B => "B",
            OptionLabel::C => "C",
            OptionLabel::D => "D",
            OptionLabel::E => "E",
        }
    }
}

impl fmt::Display for OptionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The five option texts of a multiple-choice question, keyed A through E.
/// A value may simply repeat its label when the options live in the prompt or image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub struct ChoiceOptions {
    pub a: String,
    pub b: String,
    pub c: String,
    pub d: String,
    pub e: String,
}

impl ChoiceOptions {
    /// Options whose text equals their own label.
    pub fn labels_only() -> Self {
        Self {
            a: "A".to_string(),
            b: "B".to_string(),
            c: "C".to_string(),
            d: "D".to_string(),
            e: "E".to_string(),
        }
    }
}

/// Per-type payload of a question.
///
/// Serialized with a `type` tag of `multiple_choice` or `essay`, so a
/// multiple-choice question without options (or an essay with an answer key)
/// cannot be deserialized at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QuestionKind {
    MultipleChoice {
        options: ChoiceOptions,
        key: OptionLabel,
    },
    Essay {
        reference_answer: String,
    },
}

/// A question from the bank, as kept under the `questions` storage key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub subject_id: String,
    pub prompt: String,

    /// Base64 encoded image, passed through untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    #[serde(flatten)]
    pub kind: QuestionKind,
}

impl Question {
    /// The answer key label, for multiple-choice questions only.
    pub fn key(&self) -> Option<OptionLabel> {
        match &self.kind {
            QuestionKind::MultipleChoice { key, .. } => Some(*key),
            QuestionKind::Essay { .. } => None,
        }
    }

    /// Whether `answer` counts as answered for this question's type.
    /// Essays need non-whitespace text; multiple choice only needs a value.
    pub fn accepts_as_answered(&self, answer: Option<&str>) -> bool {
        match (&self.kind, answer) {
            (_, None) => false,
            (QuestionKind::MultipleChoice { .. }, Some(_)) => true,
            (QuestionKind::Essay { .. }, Some(text)) => !text.trim().is_empty(),
        }
    }
}

/// DTO for sending a question to a student (no key, no reference answer).
#[derive(Debug, Clone, Serialize)]
pub struct PublicQuestion {
    pub id: String,
    pub prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(rename = "type")]
    pub question_type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<ChoiceOptions>,
}

impl From<&Question> for PublicQuestion {
    fn from(q: &Question) -> Self {
        let (question_type, options) = match &q.kind {
            QuestionKind::MultipleChoice { options, .. } => {
                ("multiple_choice", Some(options.clone()))
            }
            QuestionKind::Essay { .. } => ("essay", None),
        };

        PublicQuestion {
            id: q.id.clone(),
            prompt: q.prompt.clone(),
            image: q.image.clone(),
            question_type,
            options,
        }
    }
}
