//! FinLight Web Server
//!
//! Axum-based REST API for the FinLight AI service:
//! - Transaction categorization (single and batch)
//! - Feedback capture and on-demand retraining
//! - Receipt and invoice extraction
//!
//! The categorizer is loaded (or seeded) once at startup and shared across
//! handlers through [`AppState`]. Retraining runs on the blocking pool so
//! predictions keep flowing while a new model is fit.

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};
use tracing::{error, info, warn};

use finlight_core::{
    Categorizer, FeedbackStore, ModelSource, PlainTextExtractor, ServiceConfig, TextExtractor,
};

mod handlers;

/// Service name reported by `GET /`
pub const SERVICE_NAME: &str = "FinLight AI Service";

/// Shared application state
pub struct AppState {
    pub categorizer: Categorizer,
    pub feedback: FeedbackStore,
    /// Text extraction backend for uploaded documents
    pub extractor: Box<dyn TextExtractor>,
    pub config: ServiceConfig,
}

impl AppState {
    /// Build state from configuration, loading or seeding the categorizer
    pub fn from_config(config: ServiceConfig) -> Self {
        Self::with_extractor(config, Box::new(PlainTextExtractor))
    }

    /// Build state with a custom text extraction backend
    pub fn with_extractor(config: ServiceConfig, extractor: Box<dyn TextExtractor>) -> Self {
        let categorizer = Categorizer::from_config(&config);
        match categorizer.load_or_initialize() {
            ModelSource::Unavailable => {
                warn!("⚠️  Categorizer unavailable, categorization requests will fail")
            }
            source => info!(source = %source, "Categorizer ready"),
        }

        if !extractor.is_available() {
            info!(
                extractor = extractor.name(),
                "ℹ️  Image OCR not configured, only text documents can be processed"
            );
        }

        Self {
            feedback: FeedbackStore::new(config.feedback_path()),
            categorizer,
            extractor,
            config,
        }
    }
}

/// Create the application router from configuration
pub fn create_router(config: ServiceConfig) -> Router {
    create_router_with_state(Arc::new(AppState::from_config(config)))
}

/// Create the application router around prepared state (for testing)
pub fn create_router_with_state(state: Arc<AppState>) -> Router {
    let settings = &state.config.server;

    // Room for base64 expansion and multipart framing around the upload limit
    let body_limit = settings.max_upload_bytes / 3 * 4 + 64 * 1024;

    let cors = build_cors(&settings.allowed_origins);

    let routes = Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        // Categorization
        .route("/categorize", post(handlers::categorize))
        .route("/categorize/batch", post(handlers::categorize_batch))
        // Feedback + retraining
        .route("/feedback", post(handlers::submit_feedback))
        .route("/train", post(handlers::train_model))
        // Documents
        .route("/ocr/receipt", post(handlers::extract_receipt))
        .route("/process-document", post(handlers::process_document));

    routes
        .with_state(state)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
}

fn build_cors(allowed_origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    if allowed_origins.is_empty() {
        // Development default: any origin
        cors.allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> = allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        cors.allow_origin(origins)
    }
}

/// Start the server
pub async fn serve(config: ServiceConfig) -> anyhow::Result<()> {
    let addr = format!("{}:{}", config.server.host, config.server.port);
    if config.server.allowed_origins.is_empty() {
        warn!("⚠️  CORS allows any origin - set server.allowed_origins before exposing to a network");
    }

    let app = create_router(config);

    info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ============================================================================
// Error Handling
// ============================================================================

/// Application error type with proper HTTP status codes
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    message: String,
    internal: Option<anyhow::Error>,
}

impl AppError {
    pub fn bad_request(msg: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn unprocessable(msg: &str) -> Self {
        Self {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn unavailable(msg: &str) -> Self {
        Self {
            status: StatusCode::SERVICE_UNAVAILABLE,
            message: msg.to_string(),
            internal: None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the full internal error if present
        if let Some(err) = &self.internal {
            error!(error = %err, "Internal error");
        }

        let body = Json(serde_json::json!({
            "error": self.message
        }));

        (self.status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        let err = err.into();

        // Client-facing core errors keep their message
        if let Some(core) = err.downcast_ref::<finlight_core::Error>() {
            match core {
                finlight_core::Error::InvalidData(msg) => return Self::bad_request(msg),
                finlight_core::Error::ModelNotReady => {
                    return Self::unavailable(&core.to_string())
                }
                finlight_core::Error::OcrUnavailable(msg) => return Self::unprocessable(msg),
                _ => {}
            }
        }

        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            // Return generic message to client
            message: "An internal error occurred".to_string(),
            // Keep full error for logging
            internal: Some(err),
        }
    }
}
