//! Service status handlers

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Serialize;

use crate::{AppError, AppState, SERVICE_NAME};
use finlight_core::ModelInfo;

#[derive(Debug, Serialize)]
pub struct ServiceBanner {
    pub service: &'static str,
    pub status: &'static str,
    pub version: &'static str,
}

/// GET / - Service banner
pub async fn root() -> Json<ServiceBanner> {
    Json(ServiceBanner {
        service: SERVICE_NAME,
        status: "online",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub categorizer_loaded: bool,
    pub ocr_available: bool,
    pub feedback_records: usize,
    pub model: ModelInfo,
}

/// GET /health - Readiness of the categorizer and document extraction
pub async fn health(State(state): State<Arc<AppState>>) -> Result<Json<HealthResponse>, AppError> {
    let worker = Arc::clone(&state);
    let feedback_records = tokio::task::spawn_blocking(move || worker.feedback.count()).await??;

    Ok(Json(HealthResponse {
        status: "healthy",
        categorizer_loaded: state.categorizer.is_ready(),
        ocr_available: state.extractor.is_available(),
        feedback_records,
        model: state.categorizer.model_info(),
    }))
}
