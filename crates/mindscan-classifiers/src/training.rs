//! One-shot offline training run
//!
//! Clean → split 80/20 with a fixed seed → fit features and classifier on the
//! train part → evaluate on the test part. The model is always returned; the
//! report is informational and never gates persistence.

use crate::corpus::TrainingCorpus;
use crate::evaluation::ClassificationReport;
use crate::features::{FeatureConfig, FeatureSpace};
use crate::linear::{LinearConfig, LinearModel};
use crate::model::ClassifierModel;
use crate::normalize::{is_blank, TextNormalizer};
use mindscan_core::{Error, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{info, warn};

/// Training configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Feature extractor settings
    #[serde(default)]
    pub features: FeatureConfig,

    /// Linear classifier settings
    #[serde(default)]
    pub classifier: LinearConfig,

    /// Share of the cleaned corpus held out for evaluation
    #[serde(default = "default_test_ratio")]
    pub test_ratio: f64,

    /// Seed for the train/test split
    #[serde(default = "default_seed")]
    pub seed: u64,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            features: FeatureConfig::default(),
            classifier: LinearConfig::default(),
            test_ratio: default_test_ratio(),
            seed: default_seed(),
        }
    }
}

fn default_test_ratio() -> f64 {
    0.2
}

fn default_seed() -> u64 {
    42
}

/// Model plus its held-out evaluation
#[derive(Debug, Clone)]
pub struct TrainingOutcome {
    pub model: ClassifierModel,
    pub report: ClassificationReport,
    /// Cleaned examples per label, sorted by label
    pub label_distribution: BTreeMap<String, usize>,
    pub train_size: usize,
    pub test_size: usize,
}

/// Train a model from a raw corpus
pub fn train(corpus: &TrainingCorpus, config: &TrainingConfig) -> Result<TrainingOutcome> {
    if !(0.0..1.0).contains(&config.test_ratio) {
        return Err(Error::config(format!(
            "test_ratio must be in [0, 1), got {}",
            config.test_ratio
        )));
    }
    config.features.validate()?;
    config.classifier.validate()?;

    let normalizer = TextNormalizer::shared();
    let cleaned: Vec<(String, String)> = corpus
        .examples()
        .iter()
        .map(|ex| (normalizer.normalize(&ex.text), ex.label.clone()))
        .filter(|(text, _)| !is_blank(text))
        .collect();

    info!(
        before = corpus.len(),
        after = cleaned.len(),
        "Corpus cleaned"
    );

    if cleaned.is_empty() {
        return Err(Error::empty_input("corpus is empty after cleaning"));
    }

    let mut label_distribution = BTreeMap::new();
    for (_, label) in &cleaned {
        *label_distribution.entry(label.clone()).or_insert(0usize) += 1;
    }
    for (label, count) in &label_distribution {
        info!(label = %label, count, "Label distribution");
    }

    let (train_idx, test_idx) = split_indices(cleaned.len(), config.test_ratio, config.seed);

    let train_texts: Vec<String> = train_idx.iter().map(|&i| cleaned[i].0.clone()).collect();
    let train_labels: Vec<&str> = train_idx.iter().map(|&i| cleaned[i].1.as_str()).collect();

    // Classes are those seen in the training split, sorted
    let mut classes: Vec<String> = train_labels.iter().map(|l| l.to_string()).collect();
    classes.sort();
    classes.dedup();

    let features = FeatureSpace::fit(config.features.clone(), &train_texts)?;
    let vectors: Vec<_> = train_texts.iter().map(|t| features.transform(t)).collect();
    let targets: Vec<usize> = train_labels
        .iter()
        .map(|l| classes.iter().position(|c| c == l).unwrap_or_default())
        .collect();

    info!(
        samples = vectors.len(),
        features = features.dimension(),
        classes = classes.len(),
        "Training classifier"
    );
    let linear = LinearModel::fit(
        &config.classifier,
        &vectors,
        &targets,
        classes.len(),
        features.dimension(),
    )?;

    let model = ClassifierModel::new(features, linear, config.classifier.clone(), classes)?;

    let test_texts: Vec<&str> = test_idx.iter().map(|&i| cleaned[i].0.as_str()).collect();
    let actual: Vec<String> = test_idx.iter().map(|&i| cleaned[i].1.clone()).collect();
    if test_texts.is_empty() {
        warn!("Test split is empty; evaluation report will be blank");
    }
    let predicted = model.predict_batch(&test_texts);
    let report = ClassificationReport::compute(model.classes(), &actual, &predicted);

    info!(accuracy = report.accuracy, test = actual.len(), "Model evaluated");

    Ok(TrainingOutcome {
        model,
        report,
        label_distribution,
        train_size: train_idx.len(),
        test_size: test_idx.len(),
    })
}

/// Seeded shuffle, then the last `ratio` share becomes the test split
fn split_indices(n: usize, test_ratio: f64, seed: u64) -> (Vec<usize>, Vec<usize>) {
    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let test_len = ((n as f64) * test_ratio).round() as usize;
    // Never hand the classifier an empty training set
    let test_len = test_len.min(n.saturating_sub(1));
    let test = indices.split_off(n - test_len);
    (indices, test)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_sizes() {
        let (train, test) = split_indices(10, 0.2, 42);
        assert_eq!(train.len(), 8);
        assert_eq!(test.len(), 2);

        let mut all: Vec<usize> = train.iter().chain(&test).copied().collect();
        all.sort_unstable();
        assert_eq!(all, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn test_split_is_reproducible() {
        assert_eq!(split_indices(50, 0.2, 7), split_indices(50, 0.2, 7));
    }

    #[test]
    fn test_split_keeps_a_training_row() {
        let (train, test) = split_indices(1, 0.5, 42);
        assert_eq!(train.len(), 1);
        assert!(test.is_empty());
    }

    #[test]
    fn test_invalid_ratio() {
        let config = TrainingConfig {
            test_ratio: 1.0,
            ..Default::default()
        };
        let err = train(&TrainingCorpus::default(), &config).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_empty_after_cleaning() {
        let corpus = TrainingCorpus::new(vec![
            mindscan_core::LabeledExample::new("1234 !!!", "Normal"),
            mindscan_core::LabeledExample::new("😭😭", "Depression"),
        ]);
        let err = train(&corpus, &TrainingConfig::default()).unwrap_err();
        assert!(matches!(err, Error::EmptyInput(_)));
    }
}
