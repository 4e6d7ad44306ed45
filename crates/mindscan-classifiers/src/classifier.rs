//! Classifier trait and common types

use crate::model::{ClassProbabilities, ClassifierModel};
use mindscan_core::Result;
use std::time::Instant;

/// Trait for anything that can label a cleaned text
pub trait Classifier: Send + Sync {
    /// Classify the given (already normalized) text
    fn classify(&self, text: &str) -> Result<ClassificationResult>;

    /// Get the classifier name
    fn name(&self) -> &str;

    /// Labels this classifier can emit
    fn classes(&self) -> &[String];
}

/// Result of classification
#[derive(Debug, Clone)]
pub struct ClassificationResult {
    /// Classification label
    pub label: String,

    /// Confidence score (0.0-1.0)
    pub score: f64,

    /// Full class distribution
    pub probabilities: ClassProbabilities,

    /// Latency in microseconds
    pub latency_us: u64,
}

impl ClassificationResult {
    /// Build a result from a class distribution
    pub fn from_probabilities(probabilities: ClassProbabilities, latency_us: u64) -> Self {
        let (label, score) = probabilities.best();
        Self {
            label: label.to_string(),
            score,
            probabilities,
            latency_us,
        }
    }
}

impl Classifier for ClassifierModel {
    fn classify(&self, text: &str) -> Result<ClassificationResult> {
        let start = Instant::now();
        let probabilities = self.predict_proba(text);
        let latency_us = start.elapsed().as_micros() as u64;

        metrics::histogram!("mindscan_predict_latency_us").record(latency_us as f64);

        Ok(ClassificationResult::from_probabilities(probabilities, latency_us))
    }

    fn name(&self) -> &str {
        "tfidf-logreg"
    }

    fn classes(&self) -> &[String] {
        ClassifierModel::classes(self)
    }
}
