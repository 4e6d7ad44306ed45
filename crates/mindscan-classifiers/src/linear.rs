//! Multinomial logistic regression over sparse TF-IDF vectors
//!
//! Trained with seeded mini-batch gradient descent on the class-weighted
//! cross-entropy plus an L2 penalty. Risk categories are rare next to
//! "Normal", so the default `balanced` weighting scales every sample by
//! `n_samples / (n_classes * count(class))`.

use crate::features::SparseVector;
use mindscan_core::{Error, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Per-class sample weighting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ClassWeight {
    /// Weight inversely proportional to class frequency
    #[default]
    Balanced,
    /// Every sample weighs 1.0
    None,
}

/// Classifier hyperparameters, frozen into the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearConfig {
    /// Inverse regularization strength
    #[serde(default = "default_c")]
    pub c: f64,

    /// Class imbalance correction
    #[serde(default)]
    pub class_weight: ClassWeight,

    /// Initial step size; decays with `1 / sqrt(1 + epoch)`
    #[serde(default = "default_learning_rate")]
    pub learning_rate: f64,

    /// Upper bound on passes over the training set
    #[serde(default = "default_max_epochs")]
    pub max_epochs: usize,

    /// Samples per gradient step
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Stop once an epoch lowers the loss by less than this
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,

    /// Seed for batch shuffling
    #[serde(default = "default_seed")]
    pub seed: u64,
}

impl Default for LinearConfig {
    fn default() -> Self {
        Self {
            c: default_c(),
            class_weight: ClassWeight::default(),
            learning_rate: default_learning_rate(),
            max_epochs: default_max_epochs(),
            batch_size: default_batch_size(),
            tolerance: default_tolerance(),
            seed: default_seed(),
        }
    }
}

impl LinearConfig {
    /// Reject hyperparameters that cannot train
    pub fn validate(&self) -> Result<()> {
        if !(self.c > 0.0) {
            return Err(Error::config("c must be positive"));
        }
        if !(self.learning_rate > 0.0) {
            return Err(Error::config("learning_rate must be positive"));
        }
        if self.max_epochs == 0 || self.batch_size == 0 {
            return Err(Error::config("max_epochs and batch_size must be positive"));
        }
        Ok(())
    }
}

fn default_c() -> f64 {
    1.0
}

fn default_learning_rate() -> f64 {
    0.5
}

fn default_max_epochs() -> usize {
    1000
}

fn default_batch_size() -> usize {
    64
}

fn default_tolerance() -> f64 {
    1e-4
}

fn default_seed() -> u64 {
    42
}

/// Learned weights: one dense row per class plus an intercept
#[derive(Debug, Clone, PartialEq)]
pub struct LinearModel {
    weights: Vec<Vec<f64>>,
    intercepts: Vec<f64>,
}

impl LinearModel {
    /// Fit on sparse samples whose targets index into `0..n_classes`
    pub fn fit(
        config: &LinearConfig,
        samples: &[SparseVector],
        targets: &[usize],
        n_classes: usize,
        dimension: usize,
    ) -> Result<Self> {
        config.validate()?;
        if samples.len() != targets.len() {
            return Err(Error::internal(format!(
                "{} samples but {} targets",
                samples.len(),
                targets.len()
            )));
        }
        if samples.is_empty() {
            return Err(Error::empty_input("no training samples"));
        }
        if n_classes < 2 {
            return Err(Error::config(format!(
                "training needs at least two classes, found {}",
                n_classes
            )));
        }
        if let Some(&bad) = targets.iter().find(|&&t| t >= n_classes) {
            return Err(Error::internal(format!("target {} out of range", bad)));
        }

        let sample_weights = class_sample_weights(config.class_weight, targets, n_classes);
        let n = samples.len() as f64;
        let l2 = 1.0 / (config.c * n);

        let mut model = Self {
            weights: vec![vec![0.0; dimension]; n_classes],
            intercepts: vec![0.0; n_classes],
        };

        let mut rng = StdRng::seed_from_u64(config.seed);
        let mut order: Vec<usize> = (0..samples.len()).collect();
        let mut previous_loss = f64::INFINITY;
        let mut epochs_run = 0;

        for epoch in 0..config.max_epochs {
            order.shuffle(&mut rng);
            let step = config.learning_rate / (1.0 + epoch as f64).sqrt();

            for batch in order.chunks(config.batch_size) {
                model.gradient_step(samples, targets, &sample_weights, batch, step, l2);
            }

            epochs_run = epoch + 1;
            let loss = model.loss(samples, targets, &sample_weights, l2);
            debug!(epoch, loss, "Epoch complete");

            if previous_loss - loss < config.tolerance {
                break;
            }
            previous_loss = loss;
        }

        info!(
            epochs = epochs_run,
            samples = samples.len(),
            classes = n_classes,
            "Linear classifier trained"
        );

        Ok(model)
    }

    /// Rebuild from persisted weights
    pub fn from_parts(weights: Vec<Vec<f64>>, intercepts: Vec<f64>) -> Result<Self> {
        if weights.len() != intercepts.len() {
            return Err(Error::model(format!(
                "{} weight rows but {} intercepts",
                weights.len(),
                intercepts.len()
            )));
        }
        let dimension = weights.first().map(Vec::len).unwrap_or(0);
        if weights.iter().any(|row| row.len() != dimension) {
            return Err(Error::model("weight rows have inconsistent lengths"));
        }
        Ok(Self {
            weights,
            intercepts,
        })
    }

    /// Raw class scores
    pub fn decision(&self, x: &SparseVector) -> Vec<f64> {
        self.weights
            .iter()
            .zip(&self.intercepts)
            .map(|(row, b)| x.dot(row) + b)
            .collect()
    }

    /// Class probabilities (softmax of the scores)
    pub fn probabilities(&self, x: &SparseVector) -> Vec<f64> {
        softmax(&self.decision(x))
    }

    /// Weight rows, one per class
    pub fn weights(&self) -> &[Vec<f64>] {
        &self.weights
    }

    /// Intercept per class
    pub fn intercepts(&self) -> &[f64] {
        &self.intercepts
    }

    /// Number of input features
    pub fn dimension(&self) -> usize {
        self.weights.first().map(Vec::len).unwrap_or(0)
    }

    /// Number of classes
    pub fn n_classes(&self) -> usize {
        self.weights.len()
    }

    fn gradient_step(
        &mut self,
        samples: &[SparseVector],
        targets: &[usize],
        sample_weights: &[f64],
        batch: &[usize],
        step: f64,
        l2: f64,
    ) {
        let scale = step / batch.len() as f64;

        // Residuals are computed against the weights at the start of the batch
        let residuals: Vec<Vec<f64>> = batch
            .iter()
            .map(|&i| {
                let mut probs = self.probabilities(&samples[i]);
                probs[targets[i]] -= 1.0;
                let w = sample_weights[i];
                probs.iter_mut().for_each(|p| *p *= w);
                probs
            })
            .collect();

        let decay = 1.0 - step * l2;
        for row in &mut self.weights {
            row.iter_mut().for_each(|w| *w *= decay);
        }

        for (&i, residual) in batch.iter().zip(&residuals) {
            for (class, &r) in residual.iter().enumerate() {
                let row = &mut self.weights[class];
                for &(idx, value) in samples[i].entries() {
                    row[idx] -= scale * r * value;
                }
                self.intercepts[class] -= scale * r;
            }
        }
    }

    fn loss(&self, samples: &[SparseVector], targets: &[usize], sample_weights: &[f64], l2: f64) -> f64 {
        let data_loss: f64 = samples
            .iter()
            .zip(targets)
            .zip(sample_weights)
            .map(|((x, &t), &w)| -w * self.probabilities(x)[t].max(f64::MIN_POSITIVE).ln())
            .sum::<f64>()
            / samples.len() as f64;

        let penalty: f64 = self
            .weights
            .iter()
            .flat_map(|row| row.iter())
            .map(|w| w * w)
            .sum::<f64>()
            * l2
            / 2.0;

        data_loss + penalty
    }
}

/// Per-sample weights derived from the class weighting mode
fn class_sample_weights(mode: ClassWeight, targets: &[usize], n_classes: usize) -> Vec<f64> {
    match mode {
        ClassWeight::None => vec![1.0; targets.len()],
        ClassWeight::Balanced => {
            let mut counts = vec![0usize; n_classes];
            for &t in targets {
                counts[t] += 1;
            }
            let present = counts.iter().filter(|&&c| c > 0).count() as f64;
            let n = targets.len() as f64;
            targets
                .iter()
                .map(|&t| n / (present * counts[t] as f64))
                .collect()
        }
    }
}

/// Numerically stable softmax
pub fn softmax(scores: &[f64]) -> Vec<f64> {
    let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = scores.iter().map(|s| (s - max).exp()).collect();
    let sum: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn one_hot(idx: usize) -> SparseVector {
        SparseVector::from_entries(vec![(idx, 1.0)])
    }

    fn quick_config() -> LinearConfig {
        LinearConfig {
            c: 10.0,
            max_epochs: 300,
            batch_size: 4,
            tolerance: 1e-7,
            ..Default::default()
        }
    }

    #[test]
    fn test_softmax_sums_to_one() {
        let probs = softmax(&[1000.0, 999.0, -5.0]);
        assert!((probs.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        assert!(probs[0] > probs[1] && probs[1] > probs[2]);
    }

    #[test]
    fn test_balanced_weights() {
        let weights = class_sample_weights(ClassWeight::Balanced, &[0, 0, 0, 1], 2);
        assert!((weights[0] - 4.0 / 6.0).abs() < 1e-12);
        assert!((weights[3] - 2.0).abs() < 1e-12);

        let weighted_total: f64 = weights.iter().sum();
        assert!((weighted_total - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_separable_problem() {
        let samples: Vec<SparseVector> = (0..12).map(|i| one_hot(i % 3)).collect();
        let targets: Vec<usize> = (0..12).map(|i| i % 3).collect();

        let model = LinearModel::fit(&quick_config(), &samples, &targets, 3, 3).unwrap();

        for class in 0..3 {
            let probs = model.probabilities(&one_hot(class));
            let best = probs
                .iter()
                .enumerate()
                .max_by(|a, b| a.1.total_cmp(b.1))
                .map(|(i, _)| i)
                .unwrap();
            assert_eq!(best, class);
        }
    }

    #[test]
    fn test_minority_class_still_learned() {
        let mut samples: Vec<SparseVector> = (0..18).map(|_| one_hot(0)).collect();
        let mut targets = vec![0usize; 18];
        samples.extend((0..2).map(|_| one_hot(1)));
        targets.extend([1, 1]);

        let model = LinearModel::fit(&quick_config(), &samples, &targets, 2, 2).unwrap();
        let probs = model.probabilities(&one_hot(1));
        assert!(probs[1] > probs[0]);
    }

    #[test]
    fn test_training_is_reproducible() {
        let samples: Vec<SparseVector> = (0..8).map(|i| one_hot(i % 2)).collect();
        let targets: Vec<usize> = (0..8).map(|i| i % 2).collect();

        let a = LinearModel::fit(&quick_config(), &samples, &targets, 2, 2).unwrap();
        let b = LinearModel::fit(&quick_config(), &samples, &targets, 2, 2).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_single_class_rejected() {
        let err = LinearModel::fit(&quick_config(), &[one_hot(0)], &[0], 1, 1).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_empty_vector_gives_valid_distribution() {
        let model = LinearModel::from_parts(vec![vec![0.3], vec![-0.3]], vec![0.1, -0.2]).unwrap();
        let probs = model.probabilities(&SparseVector::default());
        assert!((probs.iter().sum::<f64>() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_inconsistent_parts_rejected() {
        assert!(LinearModel::from_parts(vec![vec![0.0], vec![0.0, 1.0]], vec![0.0, 0.0]).is_err());
        assert!(LinearModel::from_parts(vec![vec![0.0]], vec![0.0, 0.0]).is_err());
    }
}
