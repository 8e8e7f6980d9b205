//! Document extraction handlers

use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    Json,
};
use base64::Engine;
use serde::Deserialize;

use crate::{AppError, AppState};
use finlight_core::{receipt, DocumentType, ReceiptData};

fn check_size(len: usize, max: usize) -> Result<(), AppError> {
    if len > max {
        return Err(AppError::bad_request(&format!(
            "File too large. Maximum size is {} MB",
            max / 1024 / 1024
        )));
    }
    Ok(())
}

/// POST /ocr/receipt - Extract receipt fields from an uploaded file
///
/// Expects multipart form with:
/// - file: receipt document (required)
pub async fn extract_receipt(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<ReceiptData>, AppError> {
    let max = state.config.server.max_upload_bytes;
    let mut file_data = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::bad_request(&format!("Failed to read form field: {}", e)))?
    {
        if field.name() == Some("file") {
            let bytes = field
                .bytes()
                .await
                .map_err(|_| AppError::bad_request("Failed to read file data"))?;
            check_size(bytes.len(), max)?;
            file_data = Some(bytes);
        }
    }

    let file_data = file_data.ok_or_else(|| AppError::bad_request("Missing file field"))?;
    let data = receipt::process_document(
        state.extractor.as_ref(),
        &file_data,
        DocumentType::Receipt,
    )?;
    Ok(Json(data))
}

#[derive(Debug, Deserialize)]
pub struct ProcessDocumentRequest {
    /// Base64 document content, optionally as a `data:` URL
    pub image: String,
    #[serde(default)]
    pub document_type: DocumentType,
}

/// POST /process-document - Extract fields from a base64 encoded document
pub async fn process_document(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ProcessDocumentRequest>,
) -> Result<Json<ReceiptData>, AppError> {
    let encoded = match req.image.split_once(";base64,") {
        Some((_, payload)) => payload,
        None => req.image.as_str(),
    };

    let bytes = base64::engine::general_purpose::STANDARD
        .decode(encoded.trim())
        .map_err(|e| AppError::bad_request(&format!("Invalid base64 data: {}", e)))?;
    check_size(bytes.len(), state.config.server.max_upload_bytes)?;

    let data = receipt::process_document(state.extractor.as_ref(), &bytes, req.document_type)?;
    Ok(Json(data))
}
