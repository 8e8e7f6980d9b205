//! TF-IDF text vectorizer
//!
//! Lowercases input, extracts word tokens of two or more characters, and
//! builds unigram + bigram features weighted by smoothed inverse document
//! frequency. Rows are L2-normalized.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Sparse feature row: (feature index, weight), sorted by index
pub type SparseVec = Vec<(usize, f64)>;

/// Vectorizer hyperparameters (fixed; there is no search over these)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TfidfParams {
    /// Vocabulary cap, keeping the most frequent terms in the corpus
    pub max_features: usize,
    /// Largest n-gram length (n-grams from 1 through this value)
    pub ngram_max: usize,
}

impl Default for TfidfParams {
    fn default() -> Self {
        Self {
            max_features: 1000,
            ngram_max: 2,
        }
    }
}

fn token_regex() -> &'static Regex {
    static TOKEN_RE: OnceLock<Regex> = OnceLock::new();
    TOKEN_RE.get_or_init(|| Regex::new(r"\b\w\w+\b").expect("valid regex"))
}

/// Split text into lowercase n-gram terms
pub fn analyze(text: &str, ngram_max: usize) -> Vec<String> {
    let lowered = text.to_lowercase();
    let tokens: Vec<&str> = token_regex()
        .find_iter(&lowered)
        .map(|m| m.as_str())
        .collect();

    let mut terms = Vec::with_capacity(tokens.len() * ngram_max.max(1));
    for n in 1..=ngram_max.max(1) {
        if tokens.len() < n {
            break;
        }
        for window in tokens.windows(n) {
            terms.push(window.join(" "));
        }
    }
    terms
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TfidfVectorizer {
    params: TfidfParams,
    /// term -> feature index (indices follow alphabetical term order)
    vocabulary: BTreeMap<String, usize>,
    idf: Vec<f64>,
}

impl TfidfVectorizer {
    /// Learn vocabulary and idf weights from a corpus
    pub fn fit<S: AsRef<str>>(docs: &[S], params: TfidfParams) -> Result<Self> {
        if docs.is_empty() {
            return Err(Error::Training("Cannot fit vectorizer on empty corpus".into()));
        }

        let mut term_counts: HashMap<String, usize> = HashMap::new();
        let mut doc_freq: HashMap<String, usize> = HashMap::new();

        for doc in docs {
            let terms = analyze(doc.as_ref(), params.ngram_max);
            let mut seen: HashSet<&str> = HashSet::new();
            for term in &terms {
                *term_counts.entry(term.clone()).or_insert(0) += 1;
                if seen.insert(term.as_str()) {
                    *doc_freq.entry(term.clone()).or_insert(0) += 1;
                }
            }
        }

        if term_counts.is_empty() {
            return Err(Error::Training(
                "Empty vocabulary: descriptions contain no usable words".into(),
            ));
        }

        // Most frequent terms first, alphabetical among equals
        let mut ranked: Vec<(String, usize)> = term_counts.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked.truncate(params.max_features.max(1));

        let mut kept: Vec<String> = ranked.into_iter().map(|(term, _)| term).collect();
        kept.sort();

        let n_docs = docs.len() as f64;
        let idf = kept
            .iter()
            .map(|term| {
                let df = doc_freq.get(term).copied().unwrap_or(0) as f64;
                ((1.0 + n_docs) / (1.0 + df)).ln() + 1.0
            })
            .collect();

        let vocabulary = kept
            .into_iter()
            .enumerate()
            .map(|(i, term)| (term, i))
            .collect();

        Ok(Self {
            params,
            vocabulary,
            idf,
        })
    }

    /// Number of features in the learned vocabulary
    pub fn feature_count(&self) -> usize {
        self.idf.len()
    }

    pub fn params(&self) -> TfidfParams {
        self.params
    }

    /// Vectorize a single document. Unknown terms are ignored; a document with
    /// no known terms yields an empty row.
    pub fn transform(&self, text: &str) -> SparseVec {
        let mut counts: BTreeMap<usize, f64> = BTreeMap::new();
        for term in analyze(text, self.params.ngram_max) {
            if let Some(&idx) = self.vocabulary.get(&term) {
                *counts.entry(idx).or_insert(0.0) += 1.0;
            }
        }

        let mut row: SparseVec = counts
            .into_iter()
            .map(|(idx, tf)| (idx, tf * self.idf[idx]))
            .collect();

        let norm = row.iter().map(|(_, v)| v * v).sum::<f64>().sqrt();
        if norm > 0.0 {
            for (_, v) in row.iter_mut() {
                *v /= norm;
            }
        }
        row
    }

    /// Check internal consistency after deserialization
    pub(crate) fn validate(&self) -> Result<()> {
        if self.vocabulary.len() != self.idf.len() {
            return Err(Error::Persistence(format!(
                "Vocabulary size {} does not match idf length {}",
                self.vocabulary.len(),
                self.idf.len()
            )));
        }
        if self.vocabulary.values().any(|&i| i >= self.idf.len()) {
            return Err(Error::Persistence("Vocabulary index out of range".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analyze_unigrams_and_bigrams() {
        let terms = analyze("Uber Trip", 2);
        assert_eq!(terms, vec!["uber", "trip", "uber trip"]);
    }

    #[test]
    fn test_analyze_drops_single_characters() {
        let terms = analyze("a b coffee", 2);
        assert_eq!(terms, vec!["coffee"]);
    }

    #[test]
    fn test_fit_rejects_empty_vocabulary() {
        let err = TfidfVectorizer::fit(&["a", "!"], TfidfParams::default()).unwrap_err();
        assert!(matches!(err, Error::Training(_)));
    }

    #[test]
    fn test_transform_is_l2_normalized() {
        let v = TfidfVectorizer::fit(
            &["electricity bill", "water bill", "taxi fare"],
            TfidfParams::default(),
        )
        .unwrap();
        let row = v.transform("electricity bill");
        let norm: f64 = row.iter().map(|(_, x)| x * x).sum::<f64>().sqrt();
        assert!((norm - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_transform_unknown_text_is_empty() {
        let v = TfidfVectorizer::fit(&["electricity bill"], TfidfParams::default()).unwrap();
        assert!(v.transform("zebra crossing").is_empty());
    }

    #[test]
    fn test_max_features_keeps_most_frequent() {
        let params = TfidfParams {
            max_features: 1,
            ngram_max: 1,
        };
        let v = TfidfVectorizer::fit(&["fee fee bank", "fee card"], params).unwrap();
        assert_eq!(v.feature_count(), 1);
        assert_eq!(v.transform("fee").len(), 1);
        assert!(v.transform("bank card").is_empty());
    }

    #[test]
    fn test_rarer_terms_weigh_more() {
        let v = TfidfVectorizer::fit(
            &["bank fee", "bank charge", "bank rent"],
            TfidfParams {
                max_features: 1000,
                ngram_max: 1,
            },
        )
        .unwrap();
        let row = v.transform("bank fee");
        assert_eq!(row.len(), 2);
        // "bank" appears everywhere, "fee" once: fee must dominate
        let bank = row.iter().map(|(_, w)| *w).fold(f64::MAX, f64::min);
        let fee = row.iter().map(|(_, w)| *w).fold(f64::MIN, f64::max);
        assert!(fee > bank);
    }
}
