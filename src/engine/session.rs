// src/engine/session.rs

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::Serialize;
use uuid::Uuid;

use crate::{
    engine::{scoring::calculate_score, shuffle::fisher_yates},
    error::SessionError,
    models::{
        exam_result::{AnswerEntry, ExamResult, SubmitTrigger},
        question::Question,
        schedule::ScheduleDefinition,
        settings::ExamSettings,
    },
};

/// Lifecycle of a session. `Submitted` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Initializing,
    InProgress,
    Submitted,
}

/// One student's single attempt at a schedule.
///
/// Holds the materialized question set, the parallel answer list, the
/// countdown and the navigation cursor. Every mutation is a plain `&mut self`
/// call; callers that share a session between a timer and user events must
/// serialize access (see `services::runner`).
#[derive(Debug)]
pub struct ExamSession {
    student_id: String,
    schedule_id: String,
    questions: Vec<Question>,
    answers: Vec<AnswerEntry>,
    remaining_secs: u64,
    current: usize,
    state: SessionState,
}

impl ExamSession {
    /// Materializes a fresh session.
    ///
    /// * Keeps only the pool's questions for the schedule's subject.
    /// * Shuffles them when `settings.shuffle_questions` is set.
    /// * Truncates to `question_count` (all of them if there are fewer).
    ///
    /// Fails with `ExamNotAvailable` when nothing is left to ask.
    pub fn start<R: Rng + ?Sized>(
        schedule: &ScheduleDefinition,
        pool: &[Question],
        settings: &ExamSettings,
        student_id: &str,
        rng: &mut R,
    ) -> Result<Self, SessionError> {
        let mut session = ExamSession {
            student_id: student_id.to_string(),
            schedule_id: schedule.id.clone(),
            questions: Vec::new(),
            answers: Vec::new(),
            remaining_secs: 0,
            current: 0,
            state: SessionState::Initializing,
        };

        let mut questions: Vec<Question> = pool
            .iter()
            .filter(|q| q.subject_id == schedule.subject_id)
            .cloned()
            .collect();

        if settings.shuffle_questions {
            fisher_yates(&mut questions, rng);
        }
        questions.truncate(schedule.question_count as usize);

        if questions.is_empty() {
            return Err(SessionError::ExamNotAvailable {
                schedule_id: schedule.id.clone(),
            });
        }

        session.answers = questions
            .iter()
            .map(|q| AnswerEntry::unanswered(q.id.clone()))
            .collect();
        session.questions = questions;
        session.remaining_secs = schedule.duration_secs();
        session.state = SessionState::InProgress;

        Ok(session)
    }

    pub fn student_id(&self) -> &str {
        &self.student_id
    }

    pub fn schedule_id(&self) -> &str {
        &self.schedule_id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_submitted(&self) -> bool {
        self.state == SessionState::Submitted
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn answers(&self) -> &[AnswerEntry] {
        &self.answers
    }

    pub fn remaining_secs(&self) -> u64 {
        self.remaining_secs
    }

    /// Replaces the answer for `question_id`.
    ///
    /// Any string is accepted, including empty text for an essay in progress.
    /// Returns `false` (and changes nothing) for an unknown question or once
    /// the session has been submitted.
    pub fn record_answer(&mut self, question_id: &str, answer: Option<String>) -> bool {
        if self.state != SessionState::InProgress {
            return false;
        }

        match self.answers.iter_mut().find(|a| a.question_id == question_id) {
            Some(entry) => {
                entry.answer = answer;
                true
            }
            None => false,
        }
    }

    /// Whether the question at `index` counts as answered.
    pub fn is_answered(&self, index: usize) -> bool {
        match (self.questions.get(index), self.answers.get(index)) {
            (Some(q), Some(a)) => q.accepts_as_answered(a.answer.as_deref()),
            _ => false,
        }
    }

    pub fn answered_count(&self) -> usize {
        (0..self.questions.len())
            .filter(|&i| self.is_answered(i))
            .count()
    }

    // Navigation

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_question(&self) -> &Question {
        &self.questions[self.current]
    }

    /// Jumps straight to `index`. Out-of-range targets are ignored.
    pub fn go_to(&mut self, index: usize) -> bool {
        if index < self.questions.len() {
            self.current = index;
            true
        } else {
            false
        }
    }

    pub fn next(&mut self) {
        if self.current + 1 < self.questions.len() {
            self.current += 1;
        }
    }

    pub fn back(&mut self) {
        self.current = self.current.saturating_sub(1);
    }

    // Timer and submission

    /// One second of countdown.
    ///
    /// Decrements the remaining time (never below zero) and, when it hits
    /// zero, submits on the student's behalf. A tick on a submitted session
    /// does nothing.
    pub fn tick(&mut self, now: DateTime<Utc>) -> Option<ExamResult> {
        if self.state != SessionState::InProgress {
            return None;
        }

        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        if self.remaining_secs == 0 {
            return self.finish(now, SubmitTrigger::Timer);
        }
        None
    }

    /// Manual submission. Only the first call produces a result.
    pub fn submit(&mut self, now: DateTime<Utc>) -> Option<ExamResult> {
        self.finish(now, SubmitTrigger::Manual)
    }

    fn finish(&mut self, now: DateTime<Utc>, trigger: SubmitTrigger) -> Option<ExamResult> {
        if self.state != SessionState::InProgress {
            return None;
        }
        self.state = SessionState::Submitted;

        let (detail, score) = calculate_score(&self.questions, &self.answers);

        Some(ExamResult {
            id: Uuid::new_v4(),
            student_id: self.student_id.clone(),
            schedule_id: self.schedule_id.clone(),
            score,
            answers: self.answers.clone(),
            completed_at: now,
            detail,
            submitted_by: trigger,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::question::{ChoiceOptions, OptionLabel, QuestionKind};
    use rand::{SeedableRng, rngs::StdRng};
    use std::collections::HashMap;

    fn schedule(subject: &str, count: u32, minutes: u32) -> ScheduleDefinition {
        ScheduleDefinition {
            id: "sch1".into(),
            name: "Quiz".into(),
            subject_id: subject.into(),
            class_id: "7a".into(),
            date: "2026-10-16".into(),
            start_time: "08:00".into(),
            end_time: "10:00".into(),
            question_count: count,
            duration_minutes: minutes,
        }
    }

    fn mc(id: &str, subject: &str, key: OptionLabel) -> Question {
        Question {
            id: id.into(),
            subject_id: subject.into(),
            prompt: format!("q{}", id),
            image: None,
            kind: QuestionKind::MultipleChoice {
                options: ChoiceOptions::labels_only(),
                key,
            },
        }
    }

    fn essay(id: &str, subject: &str) -> Question {
        Question {
            id: id.into(),
            subject_id: subject.into(),
            prompt: format!("e{}", id),
            image: None,
            kind: QuestionKind::Essay {
                reference_answer: String::new(),
            },
        }
    }

    fn no_shuffle() -> ExamSettings {
        ExamSettings {
            shuffle_questions: false,
            show_scores: true,
        }
    }

    fn ids(session: &ExamSession) -> Vec<&str> {
        session.questions().iter().map(|q| q.id.as_str()).collect()
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    #[test]
    fn test_natural_order_without_shuffle() {
        let pool = vec![
            mc("1", "math", OptionLabel::A),
            mc("2", "bio", OptionLabel::A),
            mc("3", "math", OptionLabel::A),
            mc("4", "math", OptionLabel::A),
        ];

        let session =
            ExamSession::start(&schedule("math", 2, 10), &pool, &no_shuffle(), "stu", &mut rng())
                .unwrap();

        assert_eq!(ids(&session), vec!["1", "3"]);
        assert_eq!(session.state(), SessionState::InProgress);
        assert_eq!(session.remaining_secs(), 600);
        assert!(session.answers().iter().all(|a| a.answer.is_none()));
        assert_eq!(session.answers()[1].question_id, "3");
    }

    #[test]
    fn test_fewer_questions_than_requested_uses_all() {
        let pool = vec![mc("1", "math", OptionLabel::A), mc("2", "math", OptionLabel::B)];

        let session =
            ExamSession::start(&schedule("math", 5, 10), &pool, &no_shuffle(), "stu", &mut rng())
                .unwrap();

        assert_eq!(session.questions().len(), 2);
    }

    #[test]
    fn test_empty_subject_pool_is_not_available() {
        let pool = vec![mc("1", "bio", OptionLabel::A)];

        let err =
            ExamSession::start(&schedule("math", 5, 10), &pool, &no_shuffle(), "stu", &mut rng())
                .unwrap_err();

        assert!(matches!(err, SessionError::ExamNotAvailable { .. }));
    }

    #[test]
    fn test_shuffle_includes_each_question_evenly() {
        // Pick 2 of 4 questions; each should be included half of the time.
        let pool: Vec<Question> = (0..4)
            .map(|i| mc(&i.to_string(), "math", OptionLabel::A))
            .collect();
        let settings = ExamSettings::default();
        let mut rng = StdRng::seed_from_u64(99);
        let mut included: HashMap<String, u32> = HashMap::new();

        let runs = 20_000;
        for _ in 0..runs {
            let session =
                ExamSession::start(&schedule("math", 2, 1), &pool, &settings, "stu", &mut rng)
                    .unwrap();
            assert_eq!(session.questions().len(), 2);
            for q in session.questions() {
                *included.entry(q.id.clone()).or_default() += 1;
            }
        }

        assert_eq!(included.len(), 4);
        for (id, count) in included {
            assert!(
                (9_000..=11_000).contains(&count),
                "question {} included {} times",
                id,
                count
            );
        }
    }

    #[test]
    fn test_record_answer_and_answered_predicate() {
        let pool = vec![mc("1", "math", OptionLabel::A), essay("2", "math")];
        let mut session =
            ExamSession::start(&schedule("math", 2, 10), &pool, &no_shuffle(), "stu", &mut rng())
                .unwrap();

        assert!(!session.is_answered(0));
        assert!(!session.is_answered(1));

        assert!(session.record_answer("1", Some("A".into())));
        assert!(session.record_answer("2", Some("   ".into())));
        assert!(session.is_answered(0));
        assert!(!session.is_answered(1));
        assert_eq!(session.answered_count(), 1);

        assert!(session.record_answer("2", Some("an essay".into())));
        assert_eq!(session.answered_count(), 2);

        assert!(session.record_answer("1", None));
        assert!(!session.is_answered(0));
    }

    #[test]
    fn test_unknown_question_is_a_noop() {
        let pool = vec![mc("1", "math", OptionLabel::A)];
        let mut session =
            ExamSession::start(&schedule("math", 1, 10), &pool, &no_shuffle(), "stu", &mut rng())
                .unwrap();

        assert!(!session.record_answer("missing", Some("A".into())));
        assert_eq!(session.answers(), &[AnswerEntry::unanswered("1")]);
    }

    #[test]
    fn test_navigation_is_clamped() {
        let pool = vec![
            mc("1", "math", OptionLabel::A),
            mc("2", "math", OptionLabel::A),
            mc("3", "math", OptionLabel::A),
        ];
        let mut session =
            ExamSession::start(&schedule("math", 3, 10), &pool, &no_shuffle(), "stu", &mut rng())
                .unwrap();

        session.back();
        assert_eq!(session.current_index(), 0);

        assert!(session.go_to(2));
        session.next();
        assert_eq!(session.current_index(), 2);
        assert_eq!(session.current_question().id, "3");

        assert!(!session.go_to(3));
        assert_eq!(session.current_index(), 2);

        session.back();
        assert_eq!(session.current_index(), 1);
    }

    #[test]
    fn test_submit_is_idempotent() {
        let pool = vec![mc("1", "math", OptionLabel::A), mc("2", "math", OptionLabel::B)];
        let mut session =
            ExamSession::start(&schedule("math", 2, 10), &pool, &no_shuffle(), "stu", &mut rng())
                .unwrap();
        session.record_answer("1", Some("A".into()));

        let result = session.submit(Utc::now()).expect("first submit yields a result");
        assert_eq!(result.submitted_by, SubmitTrigger::Manual);
        assert_eq!(result.detail.correct, 1);
        assert_eq!(result.score, 50.0);
        assert_eq!(result.student_id, "stu");
        assert_eq!(result.schedule_id, "sch1");

        assert!(session.submit(Utc::now()).is_none());
        assert!(session.tick(Utc::now()).is_none());
        assert!(!session.record_answer("2", Some("B".into())));
        assert_eq!(session.state(), SessionState::Submitted);
    }

    #[test]
    fn test_timer_auto_submits_exactly_once() {
        let pool = vec![mc("1", "math", OptionLabel::A)];
        let mut session =
            ExamSession::start(&schedule("math", 1, 2), &pool, &no_shuffle(), "stu", &mut rng())
                .unwrap();

        let mut results = Vec::new();
        for _ in 0..120 {
            if let Some(r) = session.tick(Utc::now()) {
                results.push(r);
            }
        }
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].submitted_by, SubmitTrigger::Timer);
        assert_eq!(session.remaining_secs(), 0);

        // Late ticks from a leaked timer change nothing.
        for _ in 0..5 {
            assert!(session.tick(Utc::now()).is_none());
        }
        assert_eq!(session.remaining_secs(), 0);
        assert!(session.submit(Utc::now()).is_none());
    }

    #[test]
    fn test_timer_stops_before_zero_when_submitted_manually() {
        let pool = vec![mc("1", "math", OptionLabel::A)];
        let mut session =
            ExamSession::start(&schedule("math", 1, 1), &pool, &no_shuffle(), "stu", &mut rng())
                .unwrap();

        for _ in 0..30 {
            assert!(session.tick(Utc::now()).is_none());
        }
        assert!(session.submit(Utc::now()).is_some());
        let frozen = session.remaining_secs();
        assert_eq!(frozen, 30);

        for _ in 0..60 {
            assert!(session.tick(Utc::now()).is_none());
        }
        assert_eq!(session.remaining_secs(), frozen);
    }

    #[test]
    fn test_essay_answer_is_stored_verbatim() {
        let pool = vec![
            mc("1", "math", OptionLabel::A),
            mc("2", "math", OptionLabel::B),
            mc("3", "math", OptionLabel::C),
            essay("4", "math"),
        ];
        let mut session =
            ExamSession::start(&schedule("math", 4, 10), &pool, &no_shuffle(), "stu", &mut rng())
                .unwrap();
        session.record_answer("1", Some("A".into()));
        session.record_answer("2", Some("B".into()));
        session.record_answer("3", Some("X".into()));
        session.record_answer("4", Some("hello".into()));

        let result = session.submit(Utc::now()).unwrap();
        assert_eq!(result.detail.correct, 2);
        assert_eq!(result.detail.total_multiple_choice, 3);
        assert_eq!(format!("{:.2}", result.score), "66.67");
        assert_eq!(result.answers[3].answer.as_deref(), Some("hello"));
    }
}
