//! Categorization handlers

use std::sync::Arc;

use axum::{extract::State, Json};

use crate::{AppError, AppState};
use finlight_core::{Prediction, Transaction, TransactionWithPrediction};

/// POST /categorize - Categorize a single transaction
pub async fn categorize(
    State(state): State<Arc<AppState>>,
    Json(tx): Json<Transaction>,
) -> Result<Json<Prediction>, AppError> {
    let prediction = state
        .categorizer
        .predict(&tx.description, tx.amount, tx.direction)?;
    Ok(Json(prediction))
}

/// POST /categorize/batch - Categorize several transactions at once
pub async fn categorize_batch(
    State(state): State<Arc<AppState>>,
    Json(transactions): Json<Vec<Transaction>>,
) -> Result<Json<Vec<TransactionWithPrediction>>, AppError> {
    let results = state.categorizer.predict_batch(&transactions)?;
    Ok(Json(results))
}
