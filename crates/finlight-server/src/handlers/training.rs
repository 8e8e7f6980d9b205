//! Model training handlers

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Serialize;
use tracing::info;

use crate::{AppError, AppState};
use finlight_core::RetrainOutcome;

#[derive(Debug, Serialize)]
pub struct TrainMetrics {
    pub training_sample_count: usize,
    pub skipped_records: usize,
}

#[derive(Debug, Serialize)]
pub struct TrainResponse {
    pub status: &'static str,
    pub message: String,
    pub metrics: Option<TrainMetrics>,
}

/// POST /train - Retrain the categorizer on all recorded feedback
///
/// Runs on the blocking pool; predictions keep using the current model until
/// the new one has been persisted.
pub async fn train_model(
    State(state): State<Arc<AppState>>,
) -> Result<Json<TrainResponse>, AppError> {
    let worker = Arc::clone(&state);
    let outcome =
        tokio::task::spawn_blocking(move || worker.categorizer.retrain(&worker.feedback)).await??;

    let response = match outcome {
        RetrainOutcome::Retrained {
            training_sample_count,
            skipped_records,
        } => {
            info!(samples = training_sample_count, "Retrained via API");
            TrainResponse {
                status: "success",
                message: "Model retrained successfully".to_string(),
                metrics: Some(TrainMetrics {
                    training_sample_count,
                    skipped_records,
                }),
            }
        }
        RetrainOutcome::Skipped { reason } => TrainResponse {
            status: "skipped",
            message: reason,
            metrics: None,
        },
    };

    Ok(Json(response))
}
