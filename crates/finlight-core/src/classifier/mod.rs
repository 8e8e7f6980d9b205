//! Text classifier for transaction descriptions
//!
//! A two-stage pipeline: TF-IDF vectorization (unigrams + bigrams) feeding a
//! multinomial naive Bayes model. The class set is always the full
//! [`Category`] enumeration, in declaration order, regardless of which
//! categories appear in the training data.
//!
//! Classifiers are immutable once fit. Retraining builds a new one.

pub mod naive_bayes;
pub mod seed;
pub mod vectorizer;

use std::fs;
use std::io::Write;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::{Alternative, Category, Prediction};

pub use naive_bayes::MultinomialNb;
pub use seed::SEED_CORPUS;
pub use vectorizer::{TfidfParams, TfidfVectorizer};

/// Bumped when the serialized layout changes
const ARTIFACT_FORMAT_VERSION: u32 = 1;

/// Number of runner-up categories reported with each prediction
pub const ALTERNATIVE_COUNT: usize = 2;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextClassifier {
    format_version: u32,
    classes: Vec<Category>,
    vectorizer: TfidfVectorizer,
    model: MultinomialNb,
    training_sample_count: usize,
    trained_at: DateTime<Utc>,
}

impl TextClassifier {
    /// Fit a new classifier on (description, category) pairs
    pub fn fit<S: AsRef<str>>(samples: &[(S, Category)]) -> Result<Self> {
        if samples.is_empty() {
            return Err(Error::Training("No training samples".into()));
        }

        let docs: Vec<&str> = samples.iter().map(|(d, _)| d.as_ref()).collect();
        let labels: Vec<usize> = samples.iter().map(|(_, c)| c.index()).collect();

        let vectorizer = TfidfVectorizer::fit(&docs, TfidfParams::default())?;
        let rows: Vec<_> = docs.iter().map(|d| vectorizer.transform(d)).collect();
        let model = MultinomialNb::fit(
            &rows,
            &labels,
            Category::COUNT,
            vectorizer.feature_count(),
            naive_bayes::DEFAULT_ALPHA,
        )?;

        debug!(
            samples = samples.len(),
            features = vectorizer.feature_count(),
            "Fit text classifier"
        );

        Ok(Self {
            format_version: ARTIFACT_FORMAT_VERSION,
            classes: Category::all().to_vec(),
            vectorizer,
            model,
            training_sample_count: samples.len(),
            trained_at: Utc::now(),
        })
    }

    /// Fit on the bundled seed corpus
    pub fn fit_seed() -> Result<Self> {
        Self::fit(SEED_CORPUS)
    }

    /// Posterior probability for every category, aligned with `classes()`
    pub fn predict_proba(&self, text: &str) -> Vec<f64> {
        let row = self.vectorizer.transform(text);
        self.model.predict_proba(&row)
    }

    /// Top category, its probability, and the next-best alternatives
    pub fn predict(&self, text: &str) -> Prediction {
        let probs = self.predict_proba(text);

        let mut ranked: Vec<(Category, f64)> =
            self.classes.iter().copied().zip(probs).collect();
        // Stable sort: equal probabilities keep class order
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));

        let (category, confidence) = ranked[0];
        let alternatives = ranked
            .iter()
            .skip(1)
            .take(ALTERNATIVE_COUNT)
            .map(|&(category, confidence)| Alternative {
                category,
                confidence,
            })
            .collect();

        Prediction {
            category,
            confidence,
            alternatives,
        }
    }

    pub fn classes(&self) -> &[Category] {
        &self.classes
    }

    pub fn feature_count(&self) -> usize {
        self.vectorizer.feature_count()
    }

    pub fn training_sample_count(&self) -> usize {
        self.training_sample_count
    }

    pub fn trained_at(&self) -> DateTime<Utc> {
        self.trained_at
    }

    /// Load a persisted classifier, rejecting artifacts that do not match the
    /// current category set or are internally inconsistent
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = fs::read(path).map_err(|e| {
            Error::Persistence(format!("Failed to read model {}: {}", path.display(), e))
        })?;
        let classifier: TextClassifier = serde_json::from_slice(&bytes).map_err(|e| {
            Error::Persistence(format!("Failed to parse model {}: {}", path.display(), e))
        })?;
        classifier.validate()?;
        Ok(classifier)
    }

    /// Write the classifier to `path`, replacing any existing artifact atomically
    ///
    /// The artifact is written to a temporary file in the same directory,
    /// synced, then renamed over the destination, so readers never observe a
    /// partially written model.
    pub fn save(&self, path: &Path) -> Result<()> {
        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir).map_err(|e| {
            Error::Persistence(format!(
                "Failed to create model directory {}: {}",
                dir.display(),
                e
            ))
        })?;

        let mut tmp = NamedTempFile::new_in(dir)
            .map_err(|e| Error::Persistence(format!("Failed to create temp file: {}", e)))?;
        serde_json::to_writer(&mut tmp, self)?;
        tmp.flush()
            .and_then(|_| tmp.as_file().sync_all())
            .map_err(|e| Error::Persistence(format!("Failed to flush model: {}", e)))?;
        tmp.persist(path).map_err(|e| {
            Error::Persistence(format!(
                "Failed to replace model {}: {}",
                path.display(),
                e.error
            ))
        })?;

        debug!(path = %path.display(), "Persisted classifier");
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.format_version != ARTIFACT_FORMAT_VERSION {
            return Err(Error::Persistence(format!(
                "Unsupported model format version {}",
                self.format_version
            )));
        }
        if self.classes != Category::all() {
            return Err(Error::Persistence(
                "Model classes do not match the category set".into(),
            ));
        }
        self.vectorizer.validate()?;
        self.model
            .validate(self.classes.len(), self.vectorizer.feature_count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_seed_corpus_predicts_its_own_labels() {
        let clf = TextClassifier::fit_seed().unwrap();
        let uniform = 1.0 / Category::COUNT as f64;
        for (description, expected) in SEED_CORPUS {
            let p = clf.predict(description);
            assert_eq!(
                p.category, *expected,
                "'{}' predicted as {}",
                description, p.category
            );
            assert!(p.confidence > uniform, "'{}' confidence too low", description);
        }
    }

    #[test]
    fn test_prediction_alternatives_shape() {
        let clf = TextClassifier::fit_seed().unwrap();
        for text in ["uber trip", "something entirely unrelated", "fee", ""] {
            let p = clf.predict(text);
            assert_eq!(p.alternatives.len(), ALTERNATIVE_COUNT);
            assert!(p.alternatives.iter().all(|a| a.category != p.category));
            assert!(p.alternatives[0].category != p.alternatives[1].category);
            assert!(p.confidence >= p.alternatives[0].confidence);
            assert!(p.alternatives[0].confidence >= p.alternatives[1].confidence);

            let total = p.confidence + p.alternatives.iter().map(|a| a.confidence).sum::<f64>();
            assert!(total <= 1.0 + 1e-9);
            for v in std::iter::once(p.confidence).chain(p.alternatives.iter().map(|a| a.confidence)) {
                assert!((0.0..=1.0).contains(&v));
            }
        }
    }

    #[test]
    fn test_single_class_fit_still_reports_alternatives() {
        let samples: Vec<(String, Category)> = (0..10)
            .map(|_| ("uber trip".to_string(), Category::Fuel))
            .collect();
        let clf = TextClassifier::fit(&samples).unwrap();
        let p = clf.predict("uber trip");
        assert_eq!(p.category, Category::Fuel);
        assert!((p.confidence - 1.0).abs() < 1e-9);
        assert_eq!(p.alternatives.len(), 2);
        // Zero-probability ties fall back to class order
        assert_eq!(p.alternatives[0].category, Category::Rent);
        assert_eq!(p.alternatives[1].category, Category::Utilities);
        assert_eq!(p.alternatives[0].confidence, 0.0);
    }

    #[test]
    fn test_fit_rejects_empty_samples() {
        let samples: Vec<(String, Category)> = Vec::new();
        assert!(TextClassifier::fit(&samples).is_err());
    }

    #[test]
    fn test_save_and_load_preserves_predictions() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("model.json");
        let clf = TextClassifier::fit_seed().unwrap();
        clf.save(&path).unwrap();

        let loaded = TextClassifier::load(&path).unwrap();
        assert_eq!(loaded.predict("taxi fare"), clf.predict("taxi fare"));
        assert_eq!(loaded.training_sample_count(), SEED_CORPUS.len());
    }

    #[test]
    fn test_save_replaces_existing_artifact() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("model.json");
        fs::write(&path, b"stale").unwrap();

        TextClassifier::fit_seed().unwrap().save(&path).unwrap();
        assert!(TextClassifier::load(&path).is_ok());

        // No temp files left behind
        let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_load_rejects_garbage() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("model.json");
        fs::write(&path, b"\x00\x01not json").unwrap();
        let err = TextClassifier::load(&path).unwrap_err();
        assert!(matches!(err, Error::Persistence(_)));
    }

    #[test]
    fn test_load_rejects_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = TextClassifier::load(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, Error::Persistence(_)));
    }
}
