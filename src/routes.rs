// src/routes.rs

use axum::{
    Router,
    http::Method,
    routing::{delete, get, post, put},
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{admin, exam, student},
    state::AppState,
};

/// Assembles the main application router.
///
/// * Merges all sub-routers (students, sessions, admin).
/// * Applies global middleware (Trace, CORS).
/// * Injects global state (repository, session runner, config).
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([axum::http::header::CONTENT_TYPE]);

    let student_routes = Router::new()
        .route("/{student_id}/exams", get(student::list_available_exams))
        .route("/{student_id}/results", get(student::list_results))
        .route(
            "/{student_id}/exams/{schedule_id}/sessions",
            post(exam::start_session),
        );

    let session_routes = Router::new()
        .route("/{session_id}", get(exam::get_session))
        .route("/{session_id}/answers", put(exam::record_answer))
        .route("/{session_id}/navigate", post(exam::navigate))
        .route("/{session_id}/submit", post(exam::submit_session));

    let admin_routes = Router::new()
        .route("/results", get(admin::list_results))
        .route("/results/{id}", delete(admin::delete_result));

    Router::new()
        .nest("/api/students", student_routes)
        .nest("/api/sessions", session_routes)
        .nest("/api/admin", admin_routes)
        // Global Middleware (applied from outside in)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}
