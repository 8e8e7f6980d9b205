//! Multinomial naive Bayes over sparse TF-IDF rows

use serde::{Deserialize, Serialize};

use super::vectorizer::SparseVec;
use crate::error::{Error, Result};

/// Laplace smoothing used for every fit
pub const DEFAULT_ALPHA: f64 = 1.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MultinomialNb {
    alpha: f64,
    n_features: usize,
    /// Training samples per class. A zero count means the class has zero
    /// prior and can never be predicted.
    class_count: Vec<f64>,
    /// log P(feature | class), one row per class
    feature_log_prob: Vec<Vec<f64>>,
}

impl MultinomialNb {
    /// Fit on sparse rows with class indices in `0..n_classes`
    pub fn fit(
        rows: &[SparseVec],
        labels: &[usize],
        n_classes: usize,
        n_features: usize,
        alpha: f64,
    ) -> Result<Self> {
        if rows.len() != labels.len() {
            return Err(Error::Training(format!(
                "Row count {} does not match label count {}",
                rows.len(),
                labels.len()
            )));
        }
        if rows.is_empty() {
            return Err(Error::Training("Cannot fit classifier on zero samples".into()));
        }

        let mut class_count = vec![0.0; n_classes];
        let mut feature_count = vec![vec![0.0; n_features]; n_classes];

        for (row, &label) in rows.iter().zip(labels) {
            if label >= n_classes {
                return Err(Error::Training(format!("Class index {} out of range", label)));
            }
            class_count[label] += 1.0;
            for &(idx, value) in row {
                feature_count[label][idx] += value;
            }
        }

        let feature_log_prob = feature_count
            .into_iter()
            .map(|counts| {
                let total: f64 = counts.iter().sum::<f64>() + alpha * n_features as f64;
                counts
                    .into_iter()
                    .map(|c| ((c + alpha) / total).ln())
                    .collect()
            })
            .collect();

        Ok(Self {
            alpha,
            n_features,
            class_count,
            feature_log_prob,
        })
    }

    pub fn class_count(&self) -> usize {
        self.class_count.len()
    }

    fn class_log_prior(&self) -> Vec<f64> {
        let total: f64 = self.class_count.iter().sum();
        self.class_count
            .iter()
            .map(|&c| {
                if c > 0.0 {
                    (c / total).ln()
                } else {
                    f64::NEG_INFINITY
                }
            })
            .collect()
    }

    /// Unnormalized log posterior per class
    pub fn joint_log_likelihood(&self, row: &SparseVec) -> Vec<f64> {
        self.class_log_prior()
            .into_iter()
            .zip(&self.feature_log_prob)
            .map(|(prior, log_probs)| {
                if prior == f64::NEG_INFINITY {
                    return prior;
                }
                prior
                    + row
                        .iter()
                        .map(|&(idx, value)| value * log_probs[idx])
                        .sum::<f64>()
            })
            .collect()
    }

    /// Posterior distribution over classes (sums to 1)
    pub fn predict_proba(&self, row: &SparseVec) -> Vec<f64> {
        let jll = self.joint_log_likelihood(row);
        let max = jll.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        if max == f64::NEG_INFINITY {
            let uniform = 1.0 / jll.len().max(1) as f64;
            return vec![uniform; jll.len()];
        }

        let exp: Vec<f64> = jll.iter().map(|&v| (v - max).exp()).collect();
        let sum: f64 = exp.iter().sum();
        exp.into_iter().map(|v| v / sum).collect()
    }

    pub(crate) fn validate(&self, n_classes: usize, n_features: usize) -> Result<()> {
        if self.class_count.len() != n_classes || self.feature_log_prob.len() != n_classes {
            return Err(Error::Persistence(format!(
                "Model has {} classes, expected {}",
                self.class_count.len(),
                n_classes
            )));
        }
        if self.n_features != n_features
            || self.feature_log_prob.iter().any(|r| r.len() != n_features)
        {
            return Err(Error::Persistence(format!(
                "Model feature width does not match vocabulary size {}",
                n_features
            )));
        }
        if !self.class_count.iter().any(|&c| c > 0.0) {
            return Err(Error::Persistence("Model has no trained classes".into()));
        }
        if self.alpha <= 0.0 {
            return Err(Error::Persistence("Invalid smoothing parameter".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toy_model() -> MultinomialNb {
        // feature 0 = "fuel", feature 1 = "taxi"
        let rows = vec![vec![(0, 1.0)], vec![(0, 1.0)], vec![(1, 1.0)]];
        let labels = vec![0, 0, 1];
        MultinomialNb::fit(&rows, &labels, 3, 2, DEFAULT_ALPHA).unwrap()
    }

    #[test]
    fn test_predict_proba_sums_to_one() {
        let model = toy_model();
        let probs = model.predict_proba(&vec![(1, 1.0)]);
        assert_eq!(probs.len(), 3);
        let sum: f64 = probs.iter().sum();
        assert!((sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_untrained_class_has_zero_probability() {
        let model = toy_model();
        let probs = model.predict_proba(&vec![(0, 1.0)]);
        assert_eq!(probs[2], 0.0);
        assert!(probs[0] > probs[1]);
    }

    #[test]
    fn test_empty_row_falls_back_to_priors() {
        let model = toy_model();
        let probs = model.predict_proba(&Vec::new());
        assert!((probs[0] - 2.0 / 3.0).abs() < 1e-9);
        assert!((probs[1] - 1.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_fit_rejects_mismatched_labels() {
        let err = MultinomialNb::fit(&[vec![(0, 1.0)]], &[], 2, 1, DEFAULT_ALPHA).unwrap_err();
        assert!(matches!(err, Error::Training(_)));
    }

    #[test]
    fn test_fit_rejects_out_of_range_label() {
        let err = MultinomialNb::fit(&[vec![(0, 1.0)]], &[5], 2, 1, DEFAULT_ALPHA).unwrap_err();
        assert!(matches!(err, Error::Training(_)));
    }
}
