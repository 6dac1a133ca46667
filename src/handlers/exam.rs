// src/handlers/exam.rs

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    engine::ExamSession,
    error::AppError,
    models::{
        exam_result::StudentResultView,
        session::{NavigateRequest, RecordAnswerRequest, SessionView, Step},
    },
    services::runner::StartRejected,
    state::AppState,
};

fn session_gone() -> AppError {
    AppError::NotFound("Session not found or already submitted".to_string())
}

/// Starts an exam session for a student.
///
/// * Rejects schedules outside the student's class or time window.
/// * Rejects a schedule the student already has a result for (409).
/// * Materializes the questions with the current shuffle setting.
/// * Starts the countdown.
pub async fn start_session(
    State(state): State<AppState>,
    Path((student_id, schedule_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let student = state
        .repo
        .student(&student_id)
        .await?
        .ok_or(AppError::NotFound("Student not found".to_string()))?;

    let schedule = state
        .repo
        .schedule(&schedule_id)
        .await?
        .ok_or(AppError::NotFound("Schedule not found".to_string()))?;

    if let Err(errors) = schedule.validate() {
        tracing::error!("Schedule {} is misconfigured: {}", schedule.id, errors);
        return Err(AppError::Unprocessable(format!(
            "Schedule is misconfigured: {}",
            errors
        )));
    }

    if schedule.class_id != student.class_id {
        return Err(AppError::NotFound("Schedule not found".to_string()));
    }

    if !schedule.is_open_at(chrono::Local::now().naive_local()) {
        return Err(AppError::Conflict("Exam is not open at this time".to_string()));
    }

    if state.repo.find_result(&student_id, &schedule_id).await?.is_some() {
        return Err(AppError::Conflict("Exam already taken".to_string()));
    }

    let settings = state.repo.settings(state.config.default_settings).await?;
    let pool = state.repo.questions_by_subject(&schedule.subject_id).await?;

    let session = ExamSession::start(
        &schedule,
        &pool,
        &settings,
        &student_id,
        &mut rand::thread_rng(),
    )
    .inspect_err(|e| tracing::warn!("Cannot start session: {}", e))?;

    let session_id = state.runner.start(session).await.map_err(|e| match e {
        StartRejected::AlreadyRunning(id) => {
            AppError::Conflict(format!("Exam already in progress in session {}", id))
        }
    })?;

    tracing::info!(
        "Student {} started schedule {} (session {})",
        student_id,
        schedule_id,
        session_id
    );

    let view = state
        .runner
        .with_session(session_id, |s| SessionView::new(session_id, s))
        .await
        .ok_or_else(session_gone)?;

    Ok((StatusCode::CREATED, Json(view)))
}

/// Returns the current state of a running session.
pub async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let view = state
        .runner
        .with_session(session_id, |s| SessionView::new(session_id, s))
        .await
        .ok_or_else(session_gone)?;

    Ok(Json(view))
}

/// Records (or clears) the answer to one question.
/// An id outside the session's question set changes nothing.
pub async fn record_answer(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(payload): Json<RecordAnswerRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let view = state
        .runner
        .with_session(session_id, |s| {
            s.record_answer(&payload.question_id, payload.answer);
            SessionView::new(session_id, s)
        })
        .await
        .ok_or_else(session_gone)?;

    Ok(Json(view))
}

/// Moves the question cursor. Moves past either end are ignored.
pub async fn navigate(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(payload): Json<NavigateRequest>,
) -> Result<impl IntoResponse, AppError> {
    let view = state
        .runner
        .with_session(session_id, |s| {
            match payload {
                NavigateRequest::To { to } => {
                    s.go_to(to);
                }
                NavigateRequest::Step { step: Step::Next } => s.next(),
                NavigateRequest::Step { step: Step::Back } => s.back(),
            }
            SessionView::new(session_id, s)
        })
        .await
        .ok_or_else(session_gone)?;

    Ok(Json(view))
}

/// Submits the session and returns the result.
/// A second submission (or one after the timer ran out) gets 404.
pub async fn submit_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let result = state
        .runner
        .submit(session_id)
        .await?
        .ok_or_else(session_gone)?;

    let settings = state.repo.settings(state.config.default_settings).await?;

    Ok(Json(StudentResultView::new(&result, settings.show_scores)))
}
