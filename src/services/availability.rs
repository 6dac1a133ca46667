// src/services/availability.rs

use chrono::NaiveDateTime;

use crate::models::{exam_result::ExamResult, schedule::ScheduleDefinition, student::Student};

/// Schedules the student may start at `now` (local time).
///
/// A schedule qualifies when it belongs to the student's class, the student
/// has no stored result for it, and `now` falls inside its time window.
pub fn available_schedules(
    student: &Student,
    schedules: Vec<ScheduleDefinition>,
    student_results: &[ExamResult],
    now: NaiveDateTime,
) -> Vec<ScheduleDefinition> {
    schedules
        .into_iter()
        .filter(|s| s.class_id == student.class_id)
        .filter(|s| !student_results.iter().any(|r| r.schedule_id == s.id))
        .filter(|s| s.is_open_at(now))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::exam_result::{ScoreDetail, SubmitTrigger};
    use chrono::{NaiveDate, Utc};
    use uuid::Uuid;

    fn schedule(id: &str, class_id: &str, date: &str) -> ScheduleDefinition {
        ScheduleDefinition {
            id: id.into(),
            name: id.to_uppercase(),
            subject_id: "math".into(),
            class_id: class_id.into(),
            date: date.into(),
            start_time: "08:00".into(),
            end_time: "10:00".into(),
            question_count: 5,
            duration_minutes: 60,
        }
    }

    fn student() -> Student {
        Student {
            id: "ana".into(),
            nis: "001".into(),
            name: "Ana".into(),
            class_id: "7a".into(),
        }
    }

    fn taken(schedule_id: &str) -> ExamResult {
        ExamResult {
            id: Uuid::new_v4(),
            student_id: "ana".into(),
            schedule_id: schedule_id.into(),
            score: 0.0,
            answers: Vec::new(),
            completed_at: Utc::now(),
            detail: ScoreDetail {
                correct: 0,
                total_multiple_choice: 0,
            },
            submitted_by: SubmitTrigger::Manual,
        }
    }

    #[test]
    fn test_available_schedules() {
        let now = NaiveDate::from_ymd_opt(2026, 10, 16)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        let schedules = vec![
            schedule("open", "7a", "2026-10-16"),
            schedule("other-class", "7b", "2026-10-16"),
            schedule("tomorrow", "7a", "2026-10-17"),
            schedule("done", "7a", "2026-10-16"),
        ];

        let available = available_schedules(&student(), schedules, &[taken("done")], now);
        let ids: Vec<&str> = available.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["open"]);
    }
}
