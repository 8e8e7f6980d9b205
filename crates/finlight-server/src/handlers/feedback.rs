//! Feedback handlers

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Serialize;
use tracing::debug;

use crate::{AppError, AppState};
use finlight_core::{Category, NewFeedback};

/// Response for operations that only report an outcome
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
    pub message: String,
}

/// POST /feedback - Record a user correction
///
/// The correction is stored verbatim. Categories that are not part of the
/// label set are accepted here and ignored at retrain time.
pub async fn submit_feedback(
    State(state): State<Arc<AppState>>,
    Json(feedback): Json<NewFeedback>,
) -> Result<Json<StatusResponse>, AppError> {
    if feedback.description.trim().is_empty() {
        return Err(AppError::bad_request("description must not be empty"));
    }
    if feedback.correct_category.trim().is_empty() {
        return Err(AppError::bad_request("correct_category must not be empty"));
    }
    if feedback.correct_category.parse::<Category>().is_err() {
        debug!(
            correct_category = %feedback.correct_category,
            "Feedback names an unknown category"
        );
    }

    let worker = Arc::clone(&state);
    tokio::task::spawn_blocking(move || worker.feedback.append(&feedback)).await??;

    Ok(Json(StatusResponse {
        status: "success",
        message: "Feedback recorded successfully".to_string(),
    }))
}
