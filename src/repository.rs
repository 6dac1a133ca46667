// src/repository.rs

//! Typed access to the records kept in the key-value store: the question
//! bank, schedules, students, settings and the result store.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::{
    error::StoreError,
    models::{
        exam_result::ExamResult, question::Question, schedule::ScheduleDefinition,
        settings::ExamSettings, student::Student,
    },
    store::KvStore,
};

/// Storage keys.
pub mod keys {
    pub const QUESTIONS: &str = "questions";
    pub const SCHEDULES: &str = "schedules";
    pub const STUDENTS: &str = "students";
    pub const RESULTS: &str = "results";
    pub const SHOW_SCORES: &str = "showScores";
    pub const SHUFFLE_QUESTIONS: &str = "shuffleQuestions";
}

/// Append-only sink for completed exams.
#[async_trait]
pub trait ResultSink: Send + Sync {
    async fn append(&self, result: ExamResult) -> Result<(), StoreError>;
}

#[derive(Clone)]
pub struct Repository {
    store: Arc<dyn KvStore>,
    // Serializes read-modify-write cycles on the results list.
    results_lock: Arc<Mutex<()>>,
}

impl Repository {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self {
            store,
            results_lock: Arc::new(Mutex::new(())),
        }
    }

    async fn load_list<T: DeserializeOwned>(&self, key: &str) -> Result<Vec<T>, StoreError> {
        match self.store.get(key).await? {
            Some(value) => serde_json::from_value(value).map_err(|source| StoreError::Codec {
                key: key.to_string(),
                source,
            }),
            None => Ok(Vec::new()),
        }
    }

    async fn save_list<T: Serialize>(&self, key: &str, items: &[T]) -> Result<(), StoreError> {
        let value = serde_json::to_value(items).map_err(|source| StoreError::Codec {
            key: key.to_string(),
            source,
        })?;
        self.store.set(key, value).await
    }

    async fn load_flag(&self, key: &str) -> Result<Option<bool>, StoreError> {
        Ok(self.store.get(key).await?.and_then(|v| v.as_bool()))
    }

    // Question bank

    /// Questions of one subject, in bank order.
    pub async fn questions_by_subject(&self, subject_id: &str) -> Result<Vec<Question>, StoreError> {
        let questions: Vec<Question> = self.load_list(keys::QUESTIONS).await?;
        Ok(questions
            .into_iter()
            .filter(|q| q.subject_id == subject_id)
            .collect())
    }

    // Schedules

    pub async fn schedules(&self) -> Result<Vec<ScheduleDefinition>, StoreError> {
        self.load_list(keys::SCHEDULES).await
    }

    pub async fn schedule(&self, id: &str) -> Result<Option<ScheduleDefinition>, StoreError> {
        Ok(self.schedules().await?.into_iter().find(|s| s.id == id))
    }

    // Students

    pub async fn students(&self) -> Result<Vec<Student>, StoreError> {
        self.load_list(keys::STUDENTS).await
    }

    pub async fn student(&self, id: &str) -> Result<Option<Student>, StoreError> {
        Ok(self.students().await?.into_iter().find(|s| s.id == id))
    }

    // Settings

    /// Current exam settings; missing flags fall back to `defaults`.
    pub async fn settings(&self, defaults: ExamSettings) -> Result<ExamSettings, StoreError> {
        Ok(ExamSettings {
            shuffle_questions: self
                .load_flag(keys::SHUFFLE_QUESTIONS)
                .await?
                .unwrap_or(defaults.shuffle_questions),
            show_scores: self
                .load_flag(keys::SHOW_SCORES)
                .await?
                .unwrap_or(defaults.show_scores),
        })
    }

    // Results

    pub async fn results(&self) -> Result<Vec<ExamResult>, StoreError> {
        self.load_list(keys::RESULTS).await
    }

    pub async fn results_for_student(&self, student_id: &str) -> Result<Vec<ExamResult>, StoreError> {
        let results = self.results().await?;
        Ok(results
            .into_iter()
            .filter(|r| r.student_id == student_id)
            .collect())
    }

    pub async fn find_result(
        &self,
        student_id: &str,
        schedule_id: &str,
    ) -> Result<Option<ExamResult>, StoreError> {
        let results = self.results().await?;
        Ok(results
            .into_iter()
            .find(|r| r.student_id == student_id && r.schedule_id == schedule_id))
    }

    /// Results filtered by subject and/or class.
    ///
    /// The subject comes from the result's schedule and the class from the
    /// student record. Results whose schedule or student no longer exists
    /// are left out.
    pub async fn filter_results(
        &self,
        subject_id: Option<&str>,
        class_id: Option<&str>,
    ) -> Result<Vec<ExamResult>, StoreError> {
        let results = self.results().await?;
        let schedules = self.schedules().await?;
        let students = self.students().await?;

        Ok(results
            .into_iter()
            .filter(|r| {
                let schedule = schedules.iter().find(|s| s.id == r.schedule_id);
                let student = students.iter().find(|s| s.id == r.student_id);
                let (Some(schedule), Some(student)) = (schedule, student) else {
                    return false;
                };

                subject_id.is_none_or(|id| schedule.subject_id == id)
                    && class_id.is_none_or(|id| student.class_id == id)
            })
            .collect())
    }

    /// Removes a result so the student may sit the schedule again.
    /// Returns `false` when no such result exists.
    pub async fn delete_result(&self, id: Uuid) -> Result<bool, StoreError> {
        let _guard = self.results_lock.lock().await;
        let mut results = self.results().await?;
        let before = results.len();
        results.retain(|r| r.id != id);
        if results.len() == before {
            return Ok(false);
        }
        self.save_list(keys::RESULTS, &results).await?;
        Ok(true)
    }
}

#[async_trait]
impl ResultSink for Repository {
    async fn append(&self, result: ExamResult) -> Result<(), StoreError> {
        let _guard = self.results_lock.lock().await;
        let mut results = self.results().await?;
        results.push(result);
        self.save_list(keys::RESULTS, &results).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::exam_result::{ScoreDetail, SubmitTrigger};
    use crate::store::MemoryStore;
    use chrono::Utc;
    use serde_json::json;

    fn result(student: &str, schedule: &str) -> ExamResult {
        ExamResult {
            id: Uuid::new_v4(),
            student_id: student.into(),
            schedule_id: schedule.into(),
            score: 50.0,
            answers: Vec::new(),
            completed_at: Utc::now(),
            detail: ScoreDetail {
                correct: 1,
                total_multiple_choice: 2,
            },
            submitted_by: SubmitTrigger::Manual,
        }
    }

    async fn seeded() -> Repository {
        let store = Arc::new(MemoryStore::new());
        store
            .set(
                keys::SCHEDULES,
                json!([
                    {"id": "s-math", "name": "Math", "subject_id": "math", "class_id": "7a",
                     "date": "2026-10-16", "start_time": "08:00", "end_time": "10:00",
                     "question_count": 2, "duration_minutes": 30},
                    {"id": "s-bio", "name": "Bio", "subject_id": "bio", "class_id": "7b",
                     "date": "2026-10-16", "start_time": "08:00", "end_time": "10:00",
                     "question_count": 2, "duration_minutes": 30}
                ]),
            )
            .await
            .unwrap();
        store
            .set(
                keys::STUDENTS,
                json!([
                    {"id": "ana", "nis": "001", "name": "Ana", "class_id": "7a"},
                    {"id": "budi", "nis": "002", "name": "Budi", "class_id": "7b"}
                ]),
            )
            .await
            .unwrap();
        Repository::new(store)
    }

    #[tokio::test]
    async fn test_settings_fall_back_to_defaults() {
        let store = Arc::new(MemoryStore::new());
        let repo = Repository::new(store.clone());
        let defaults = ExamSettings {
            shuffle_questions: false,
            show_scores: true,
        };

        assert_eq!(repo.settings(defaults).await.unwrap(), defaults);

        store.set(keys::SHOW_SCORES, json!(false)).await.unwrap();
        let settings = repo.settings(defaults).await.unwrap();
        assert!(!settings.show_scores);
        assert!(!settings.shuffle_questions);
    }

    #[tokio::test]
    async fn test_append_find_and_delete() {
        let repo = seeded().await;
        let first = result("ana", "s-math");
        repo.append(first.clone()).await.unwrap();
        repo.append(result("budi", "s-bio")).await.unwrap();

        let found = repo.find_result("ana", "s-math").await.unwrap();
        assert_eq!(found.map(|r| r.id), Some(first.id));
        assert_eq!(repo.results_for_student("budi").await.unwrap().len(), 1);

        assert!(repo.delete_result(first.id).await.unwrap());
        assert!(!repo.delete_result(first.id).await.unwrap());
        assert!(repo.find_result("ana", "s-math").await.unwrap().is_none());
        assert_eq!(repo.results().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_filter_results_by_subject_and_class() {
        let repo = seeded().await;
        repo.append(result("ana", "s-math")).await.unwrap();
        repo.append(result("budi", "s-bio")).await.unwrap();
        repo.append(result("ghost", "s-math")).await.unwrap();
        repo.append(result("ana", "deleted-schedule")).await.unwrap();

        assert_eq!(repo.filter_results(None, None).await.unwrap().len(), 2);

        let math = repo.filter_results(Some("math"), None).await.unwrap();
        assert_eq!(math.len(), 1);
        assert_eq!(math[0].student_id, "ana");

        let class_7b = repo.filter_results(None, Some("7b")).await.unwrap();
        assert_eq!(class_7b.len(), 1);
        assert_eq!(class_7b[0].schedule_id, "s-bio");

        assert!(repo.filter_results(Some("math"), Some("7b")).await.unwrap().is_empty());
    }
}
