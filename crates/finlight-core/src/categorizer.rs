//! Transaction categorization engine
//!
//! Owns the active [`TextClassifier`] and its on-disk artifact.
//!
//! ## Concurrency
//!
//! - `predict` takes a read lock only long enough to clone the `Arc` of the
//!   active classifier, then scores without holding any lock.
//! - `retrain` is serialized by `retrain_lock`. The new classifier is fit and
//!   persisted before the write lock is taken for the pointer swap, so readers
//!   see either the old or the new model, never a partial one.
//! - The active model slot is only ever replaced wholesale, so a poisoned lock
//!   still holds a consistent value and is recovered rather than propagated.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use tracing::{error, info, warn};

use crate::classifier::{vectorizer, TextClassifier};
use crate::config::ServiceConfig;
use crate::error::{Error, Result};
use crate::feedback::FeedbackStore;
use crate::models::{
    Category, Direction, FeedbackRecord, ModelInfo, ModelSource, Prediction, RetrainOutcome,
    Transaction, TransactionWithPrediction,
};

#[derive(Clone)]
struct ActiveModel {
    classifier: Arc<TextClassifier>,
    source: ModelSource,
}

pub struct Categorizer {
    model_path: PathBuf,
    min_feedback: usize,
    active: RwLock<Option<ActiveModel>>,
    retrain_lock: Mutex<()>,
}

impl Categorizer {
    /// Create an engine with no model loaded. Call
    /// [`load_or_initialize`](Self::load_or_initialize) before predicting.
    pub fn new(model_path: impl Into<PathBuf>, min_feedback: usize) -> Self {
        Self {
            model_path: model_path.into(),
            min_feedback,
            active: RwLock::new(None),
            retrain_lock: Mutex::new(()),
        }
    }

    pub fn from_config(config: &ServiceConfig) -> Self {
        Self::new(config.model_path(), config.retrain.min_feedback)
    }

    pub fn model_path(&self) -> &Path {
        &self.model_path
    }

    pub fn min_feedback(&self) -> usize {
        self.min_feedback
    }

    /// Load the persisted classifier, or fit and persist one from the seed
    /// corpus if the artifact is missing or unreadable.
    ///
    /// Never fails outward; the returned source says how the engine was
    /// initialized.
    pub fn load_or_initialize(&self) -> ModelSource {
        if self.model_path.exists() {
            match TextClassifier::load(&self.model_path) {
                Ok(classifier) => {
                    info!(
                        path = %self.model_path.display(),
                        samples = classifier.training_sample_count(),
                        "Loaded existing categorization model"
                    );
                    self.install(classifier, ModelSource::Loaded);
                    return ModelSource::Loaded;
                }
                Err(e) => {
                    warn!(error = %e, "Failed to load categorization model, recreating from seed corpus");
                }
            }
        } else {
            info!(
                path = %self.model_path.display(),
                "No categorization model found, creating from seed corpus"
            );
        }

        match TextClassifier::fit_seed() {
            Ok(classifier) => {
                if let Err(e) = classifier.save(&self.model_path) {
                    // Keep serving from memory; the next start will reseed
                    warn!(error = %e, "Failed to persist seed model");
                }
                self.install(classifier, ModelSource::Seeded);
                info!("Created and trained new categorization model");
                ModelSource::Seeded
            }
            Err(e) => {
                error!(error = %e, "Failed to fit seed corpus");
                ModelSource::Unavailable
            }
        }
    }

    pub fn is_ready(&self) -> bool {
        self.active
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Categorize a transaction description.
    ///
    /// `amount` and `direction` are accepted so callers can pass whole
    /// transactions, but only the description is scored.
    pub fn predict(
        &self,
        description: &str,
        _amount: f64,
        _direction: Direction,
    ) -> Result<Prediction> {
        if description.trim().is_empty() {
            return Err(Error::InvalidData("Description must not be empty".into()));
        }
        let classifier = self.snapshot()?;
        Ok(classifier.predict(description))
    }

    /// Categorize several transactions against one model snapshot
    pub fn predict_batch(
        &self,
        transactions: &[Transaction],
    ) -> Result<Vec<TransactionWithPrediction>> {
        if let Some(tx) = transactions.iter().find(|t| t.description.trim().is_empty()) {
            return Err(Error::InvalidData(format!(
                "Description must not be empty (amount {})",
                tx.amount
            )));
        }
        let classifier = self.snapshot()?;

        Ok(transactions
            .iter()
            .map(|tx| {
                let prediction = classifier.predict(&tx.description);
                TransactionWithPrediction {
                    description: tx.description.clone(),
                    amount: tx.amount,
                    direction: tx.direction,
                    predicted_category: prediction.category,
                    confidence: prediction.confidence,
                }
            })
            .collect())
    }

    /// Number of records that count toward the retrain threshold
    pub fn usable_feedback_count(records: &[FeedbackRecord]) -> usize {
        records
            .iter()
            .filter(|r| !vectorizer::analyze(&r.description, 1).is_empty())
            .filter(|r| r.correct_category.parse::<Category>().is_ok())
            .count()
    }

    /// Refit the classifier from scratch on all feedback.
    ///
    /// Feedback rows whose `correct_category` is not a known category, or whose
    /// description has no word tokens, are ignored. With fewer than `min_feedback` usable rows nothing changes.
    /// The new model replaces the old one only after it has been persisted.
    pub fn retrain(&self, store: &FeedbackStore) -> Result<RetrainOutcome> {
        let _guard = self
            .retrain_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let records = store.read_all()?;
        if records.is_empty() {
            return Ok(RetrainOutcome::Skipped {
                reason: "No feedback data available for retraining".to_string(),
            });
        }

        let mut samples: Vec<(&str, Category)> = Vec::with_capacity(records.len());
        let mut skipped_records = 0;
        for record in &records {
            if vectorizer::analyze(&record.description, 1).is_empty() {
                skipped_records += 1;
                warn!(
                    description = %record.description,
                    "Ignoring feedback without usable words"
                );
                continue;
            }
            match record.correct_category.parse::<Category>() {
                Ok(category) => samples.push((record.description.as_str(), category)),
                Err(_) => {
                    skipped_records += 1;
                    warn!(
                        correct_category = %record.correct_category,
                        "Ignoring feedback with unknown category"
                    );
                }
            }
        }

        if samples.len() < self.min_feedback {
            return Ok(RetrainOutcome::Skipped {
                reason: format!(
                    "Insufficient feedback data for retraining: {} usable record(s), {} required",
                    samples.len(),
                    self.min_feedback
                ),
            });
        }

        let classifier = TextClassifier::fit(&samples)?;
        classifier.save(&self.model_path)?;
        self.install(classifier, ModelSource::Retrained);

        info!(
            samples = samples.len(),
            skipped = skipped_records,
            "Model retrained successfully"
        );

        Ok(RetrainOutcome::Retrained {
            training_sample_count: samples.len(),
            skipped_records,
        })
    }

    pub fn model_info(&self) -> ModelInfo {
        let active = self
            .active
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        match active {
            Some(m) => ModelInfo {
                ready: true,
                source: m.source,
                class_count: m.classifier.classes().len(),
                feature_count: m.classifier.feature_count(),
                training_sample_count: m.classifier.training_sample_count(),
                trained_at: Some(m.classifier.trained_at()),
            },
            None => ModelInfo {
                ready: false,
                source: ModelSource::Unavailable,
                class_count: 0,
                feature_count: 0,
                training_sample_count: 0,
                trained_at: None,
            },
        }
    }

    fn snapshot(&self) -> Result<Arc<TextClassifier>> {
        self.active
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|m| Arc::clone(&m.classifier))
            .ok_or(Error::ModelNotReady)
    }

    fn install(&self, classifier: TextClassifier, source: ModelSource) {
        let mut slot = self.active.write().unwrap_or_else(PoisonError::into_inner);
        *slot = Some(ActiveModel {
            classifier: Arc::new(classifier),
            source,
        });
    }
}
