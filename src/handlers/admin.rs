// src/handlers/admin.rs

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{error::AppError, repository::Repository};

/// Query filters for the results overview. Empty values mean "all".
#[derive(Debug, Deserialize)]
pub struct ResultFilter {
    pub subject_id: Option<String>,
    pub class_id: Option<String>,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// Lists exam results, optionally filtered by subject and class.
pub async fn list_results(
    State(repo): State<Repository>,
    Query(filter): Query<ResultFilter>,
) -> Result<impl IntoResponse, AppError> {
    let results = repo
        .filter_results(non_empty(&filter.subject_id), non_empty(&filter.class_id))
        .await?;

    Ok(Json(results))
}

/// Deletes a result, letting the student sit that exam again.
pub async fn delete_result(
    State(repo): State<Repository>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    if !repo.delete_result(id).await? {
        return Err(AppError::NotFound("Result not found".to_string()));
    }

    tracing::info!("Result {} deleted; retake allowed", id);
    Ok(StatusCode::NO_CONTENT)
}
