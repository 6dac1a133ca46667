// src/handlers/student.rs

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};

use crate::{
    error::AppError,
    models::exam_result::StudentResultView,
    services::availability::available_schedules,
    state::AppState,
};

/// Lists the exams a student can start right now.
///
/// * Only schedules for the student's class.
/// * Skips schedules the student already has a result for.
/// * Only while the schedule's time window is open (server local time).
pub async fn list_available_exams(
    State(state): State<AppState>,
    Path(student_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let student = state
        .repo
        .student(&student_id)
        .await?
        .ok_or(AppError::NotFound("Student not found".to_string()))?;

    let schedules = state.repo.schedules().await?;
    let results = state.repo.results_for_student(&student_id).await?;
    let now = chrono::Local::now().naive_local();

    Ok(Json(available_schedules(&student, schedules, &results, now)))
}

/// Lists a student's completed exams.
/// Scores are hidden while the administrator keeps them unpublished.
pub async fn list_results(
    State(state): State<AppState>,
    Path(student_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let settings = state.repo.settings(state.config.default_settings).await?;
    let results = state.repo.results_for_student(&student_id).await?;

    let views: Vec<StudentResultView> = results
        .iter()
        .map(|r| StudentResultView::new(r, settings.show_scores))
        .collect();

    Ok(Json(views))
}
