//! TF-IDF feature extraction
//!
//! A [`FeatureSpace`] is fitted once on the training texts and frozen. Every
//! later text is projected into exactly that vocabulary; unknown terms are
//! dropped without error.

use crate::stop_words::StopWords;
use mindscan_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::{debug, info};

/// Feature extractor configuration, frozen into the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureConfig {
    /// Keep at most this many terms, ranked by document frequency
    #[serde(default = "default_max_features")]
    pub max_features: usize,

    /// Inclusive n-gram range; `[1, 2]` keeps unigrams and bigrams
    #[serde(default = "default_ngram_range")]
    pub ngram_range: (usize, usize),

    /// Drop terms seen in fewer documents than this
    #[serde(default = "default_min_df")]
    pub min_df: usize,

    /// Stop-word list removed before n-grams are formed
    #[serde(default)]
    pub stop_words: StopWords,

    /// Shortest token (in characters) considered a word
    #[serde(default = "default_min_token_len")]
    pub min_token_len: usize,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            max_features: default_max_features(),
            ngram_range: default_ngram_range(),
            min_df: default_min_df(),
            stop_words: StopWords::default(),
            min_token_len: default_min_token_len(),
        }
    }
}

impl FeatureConfig {
    /// Check the configuration for values that cannot produce a vocabulary
    pub fn validate(&self) -> Result<()> {
        let (low, high) = self.ngram_range;
        if low == 0 || low > high {
            return Err(Error::config(format!(
                "invalid ngram_range [{}, {}]",
                low, high
            )));
        }
        if self.max_features == 0 {
            return Err(Error::config("max_features must be positive"));
        }
        if self.min_df == 0 {
            return Err(Error::config("min_df must be at least 1"));
        }
        Ok(())
    }
}

fn default_max_features() -> usize {
    10_000
}

fn default_ngram_range() -> (usize, usize) {
    (1, 2)
}

fn default_min_df() -> usize {
    5
}

fn default_min_token_len() -> usize {
    2
}

/// Sparse document vector: `(feature index, weight)` sorted by index
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SparseVector {
    entries: Vec<(usize, f64)>,
}

impl SparseVector {
    /// Build from `(index, weight)` pairs; indices must be unique
    pub fn from_entries(mut entries: Vec<(usize, f64)>) -> Self {
        entries.sort_unstable_by_key(|(idx, _)| *idx);
        Self { entries }
    }

    /// Non-zero entries
    pub fn entries(&self) -> &[(usize, f64)] {
        &self.entries
    }

    /// Whether every term was out of vocabulary
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Dot product with a dense row
    pub fn dot(&self, dense: &[f64]) -> f64 {
        self.entries
            .iter()
            .map(|&(idx, value)| value * dense[idx])
            .sum()
    }

    /// Euclidean norm
    pub fn norm(&self) -> f64 {
        self.entries.iter().map(|(_, v)| v * v).sum::<f64>().sqrt()
    }
}

/// Frozen vocabulary plus per-term IDF weights
#[derive(Debug, Clone)]
pub struct FeatureSpace {
    config: FeatureConfig,
    terms: Vec<String>,
    idf: Vec<f64>,
    vocabulary: HashMap<String, usize>,
    stop_words: HashSet<&'static str>,
}

impl FeatureSpace {
    /// Learn the vocabulary and IDF weights from cleaned documents
    pub fn fit(config: FeatureConfig, documents: &[String]) -> Result<Self> {
        config.validate()?;
        if documents.is_empty() {
            return Err(Error::empty_input("no documents to fit the feature space on"));
        }

        let stop_words = config.stop_words.to_set();
        let mut document_frequency: HashMap<String, usize> = HashMap::new();

        for doc in documents {
            let unique: HashSet<String> = analyze(&config, &stop_words, doc).into_iter().collect();
            for term in unique {
                *document_frequency.entry(term).or_insert(0) += 1;
            }
        }

        let candidates = document_frequency.len();
        let mut ranked: Vec<(String, usize)> = document_frequency
            .into_iter()
            .filter(|(_, df)| *df >= config.min_df)
            .collect();

        if ranked.is_empty() {
            return Err(Error::empty_input(format!(
                "no term reaches min_df={} across {} documents",
                config.min_df,
                documents.len()
            )));
        }

        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked.truncate(config.max_features);
        ranked.sort_by(|a, b| a.0.cmp(&b.0));

        let n_docs = documents.len() as f64;
        let (terms, idf): (Vec<String>, Vec<f64>) = ranked
            .into_iter()
            .map(|(term, df)| {
                let idf = ((1.0 + n_docs) / (1.0 + df as f64)).ln() + 1.0;
                (term, idf)
            })
            .unzip();

        info!(
            documents = documents.len(),
            candidates,
            vocabulary = terms.len(),
            "Feature space fitted"
        );

        Self::from_parts(config, terms, idf)
    }

    /// Rebuild a feature space from persisted parts
    pub fn from_parts(config: FeatureConfig, terms: Vec<String>, idf: Vec<f64>) -> Result<Self> {
        config.validate()?;
        if terms.len() != idf.len() {
            return Err(Error::model(format!(
                "vocabulary has {} terms but {} idf weights",
                terms.len(),
                idf.len()
            )));
        }

        let mut vocabulary = HashMap::with_capacity(terms.len());
        for (idx, term) in terms.iter().enumerate() {
            if vocabulary.insert(term.clone(), idx).is_some() {
                return Err(Error::model(format!("duplicate vocabulary term '{}'", term)));
            }
        }

        let stop_words = config.stop_words.to_set();
        Ok(Self {
            config,
            terms,
            idf,
            vocabulary,
            stop_words,
        })
    }

    /// Project a cleaned document into the frozen space
    pub fn transform(&self, document: &str) -> SparseVector {
        let mut counts: BTreeMap<usize, f64> = BTreeMap::new();
        let mut dropped = 0usize;

        for term in analyze(&self.config, &self.stop_words, document) {
            match self.vocabulary.get(&term) {
                Some(&idx) => *counts.entry(idx).or_insert(0.0) += 1.0,
                None => dropped += 1,
            }
        }

        if dropped > 0 {
            debug!(dropped, "Out-of-vocabulary terms ignored");
        }

        let mut entries: Vec<(usize, f64)> = counts
            .into_iter()
            .map(|(idx, count)| (idx, count * self.idf[idx]))
            .collect();

        let norm = entries.iter().map(|(_, v)| v * v).sum::<f64>().sqrt();
        if norm > 0.0 {
            for (_, value) in &mut entries {
                *value /= norm;
            }
        }

        SparseVector { entries }
    }

    /// Number of features
    pub fn dimension(&self) -> usize {
        self.terms.len()
    }

    /// Terms in feature-index order
    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    /// IDF weight per feature index
    pub fn idf(&self) -> &[f64] {
        &self.idf
    }

    /// Index of a term, if it is in the vocabulary
    pub fn index_of(&self, term: &str) -> Option<usize> {
        self.vocabulary.get(term).copied()
    }

    /// Configuration the space was fitted with
    pub fn config(&self) -> &FeatureConfig {
        &self.config
    }
}

/// Split a cleaned document into the n-gram terms the vocabulary is built from
fn analyze(config: &FeatureConfig, stop_words: &HashSet<&'static str>, document: &str) -> Vec<String> {
    let tokens: Vec<&str> = document
        .split_whitespace()
        .filter(|t| t.chars().count() >= config.min_token_len)
        .filter(|t| !stop_words.contains(t))
        .collect();

    let (low, high) = config.ngram_range;
    let mut terms = Vec::new();
    for n in low..=high {
        if n > tokens.len() {
            break;
        }
        terms.extend(tokens.windows(n).map(|w| w.join(" ")));
    }
    terms
}
