//! FinLight Core Library
//!
//! Shared functionality for the FinLight AI service:
//! - Transaction categorization (TF-IDF + multinomial naive Bayes)
//! - Feedback log and feedback-driven retraining
//! - Receipt and invoice text extraction
//! - Layered service configuration

pub mod categorizer;
pub mod classifier;
pub mod config;
pub mod error;
pub mod feedback;
pub mod models;
pub mod receipt;

pub use categorizer::Categorizer;
pub use classifier::{TextClassifier, SEED_CORPUS};
pub use config::{ServiceConfig, DEFAULT_MIN_FEEDBACK};
pub use error::{Error, Result};
pub use feedback::FeedbackStore;
pub use models::{
    Alternative, Category, Direction, FeedbackRecord, ModelInfo, ModelSource, NewFeedback,
    Prediction, RetrainOutcome, Transaction, TransactionWithPrediction,
};
pub use receipt::{
    parse_document_text, parse_receipt_text, process_document, DocumentType, PlainTextExtractor,
    ReceiptData, ReceiptItem, TextExtractor,
};
