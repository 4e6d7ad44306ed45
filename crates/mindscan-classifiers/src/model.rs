//! Frozen classifier model and its on-disk artifact
//!
//! A [`ClassifierModel`] bundles the fitted feature space, the linear weights
//! and the class list. It has no mutating methods; share it by reference.
//!
//! The artifact is a single JSON document:
//!
//! ```text
//! { format_version, feature_config, classifier_config,
//!   vocabulary, idf, classes, weights, intercepts, checksum }
//! ```
//!
//! `checksum` is the SHA-256 (hex) of the JSON encoding of every other field.

use crate::features::{FeatureConfig, FeatureSpace};
use crate::linear::{LinearConfig, LinearModel};
use mindscan_core::{Error, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::Path;
use tracing::info;

/// Current artifact schema version
pub const MODEL_FORMAT_VERSION: u32 = 1;

/// Probability per class, in model class order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassProbabilities {
    entries: Vec<(String, f64)>,
}

impl ClassProbabilities {
    /// Pair class labels with probabilities
    pub fn new(classes: &[String], probabilities: Vec<f64>) -> Self {
        Self {
            entries: classes.iter().cloned().zip(probabilities).collect(),
        }
    }

    /// Most probable class; the first class wins exact ties
    pub fn best(&self) -> (&str, f64) {
        let mut best = ("", f64::NEG_INFINITY);
        for (label, p) in &self.entries {
            if *p > best.1 {
                best = (label.as_str(), *p);
            }
        }
        best
    }

    /// Probability of a label, if the model knows it
    pub fn get(&self, label: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, p)| *p)
    }

    /// Iterate `(label, probability)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries.iter().map(|(l, p)| (l.as_str(), *p))
    }

    /// Sum of all probabilities
    pub fn total(&self) -> f64 {
        self.entries.iter().map(|(_, p)| p).sum()
    }

    /// Entries sorted by descending probability
    pub fn ranked(&self) -> Vec<(String, f64)> {
        let mut ranked = self.entries.clone();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked
    }
}

/// Frozen feature space, weights, and class list
#[derive(Debug, Clone)]
pub struct ClassifierModel {
    features: FeatureSpace,
    linear: LinearModel,
    linear_config: LinearConfig,
    classes: Vec<String>,
}

impl ClassifierModel {
    /// Assemble a model, checking that every part agrees on its dimensions
    pub fn new(
        features: FeatureSpace,
        linear: LinearModel,
        linear_config: LinearConfig,
        classes: Vec<String>,
    ) -> Result<Self> {
        if linear.dimension() != features.dimension() {
            return Err(Error::model(format!(
                "weights cover {} features but the vocabulary has {}",
                linear.dimension(),
                features.dimension()
            )));
        }
        if linear.n_classes() != classes.len() {
            return Err(Error::model(format!(
                "{} weight rows for {} classes",
                linear.n_classes(),
                classes.len()
            )));
        }
        Ok(Self {
            features,
            linear,
            linear_config,
            classes,
        })
    }

    /// Predict the label of a cleaned text
    pub fn predict(&self, text: &str) -> String {
        self.predict_proba(text).best().0.to_string()
    }

    /// Class distribution for a cleaned text; out-of-vocabulary text is not an error
    pub fn predict_proba(&self, text: &str) -> ClassProbabilities {
        let vector = self.features.transform(text);
        ClassProbabilities::new(&self.classes, self.linear.probabilities(&vector))
    }

    /// Predict labels for a batch of cleaned texts
    pub fn predict_batch<S: AsRef<str>>(&self, texts: &[S]) -> Vec<String> {
        texts.iter().map(|t| self.predict(t.as_ref())).collect()
    }

    /// Class distributions for a batch of cleaned texts
    pub fn predict_proba_batch<S: AsRef<str>>(&self, texts: &[S]) -> Vec<ClassProbabilities> {
        texts.iter().map(|t| self.predict_proba(t.as_ref())).collect()
    }

    /// Class labels in weight-row order
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Whether the model was trained on this label
    pub fn contains_class(&self, label: &str) -> bool {
        self.classes.iter().any(|c| c == label)
    }

    /// Number of features in the frozen vocabulary
    pub fn vocabulary_size(&self) -> usize {
        self.features.dimension()
    }

    /// Feature space the model projects text into
    pub fn feature_space(&self) -> &FeatureSpace {
        &self.features
    }

    /// Feature extractor configuration
    pub fn feature_config(&self) -> &FeatureConfig {
        self.features.config()
    }

    /// Classifier hyperparameters used for training
    pub fn classifier_config(&self) -> &LinearConfig {
        &self.linear_config
    }

    /// Write the model artifact
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let body = ArtifactBody {
            format_version: MODEL_FORMAT_VERSION,
            feature_config: self.features.config().clone(),
            classifier_config: self.linear_config.clone(),
            vocabulary: self.features.terms().to_vec(),
            idf: self.features.idf().to_vec(),
            classes: self.classes.clone(),
            weights: self.linear.weights().to_vec(),
            intercepts: self.linear.intercepts().to_vec(),
        };
        let checksum = body.checksum()?;
        let artifact = ModelArtifact { body, checksum };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let tmp = path.with_extension("tmp");
        let written = std::fs::write(&tmp, serde_json::to_vec(&artifact)?)
            .and_then(|()| std::fs::rename(&tmp, path));
        if let Err(e) = written {
            let _ = std::fs::remove_file(&tmp);
            return Err(Error::model(format!(
                "Failed to write model {}: {}",
                path.display(),
                e
            )));
        }

        info!(
            path = %path.display(),
            classes = self.classes.len(),
            features = self.features.dimension(),
            "Model saved"
        );
        Ok(())
    }

    /// Read and verify a model artifact
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read(path).map_err(|e| {
            Error::model(format!("Failed to read model {}: {}", path.display(), e))
        })?;
        let model = Self::from_json(&content)?;

        info!(
            path = %path.display(),
            classes = model.classes.len(),
            features = model.vocabulary_size(),
            "Model loaded"
        );
        Ok(model)
    }

    /// Decode and verify an artifact held in memory
    pub fn from_json(content: &[u8]) -> Result<Self> {
        let artifact: ModelArtifact = serde_json::from_slice(content)
            .map_err(|e| Error::model(format!("Malformed model artifact: {}", e)))?;
        let ModelArtifact { body, checksum } = artifact;

        if body.format_version != MODEL_FORMAT_VERSION {
            return Err(Error::model(format!(
                "unsupported model format version {} (expected {})",
                body.format_version, MODEL_FORMAT_VERSION
            )));
        }
        if body.checksum()? != checksum {
            return Err(Error::model("model checksum mismatch"));
        }

        let features = FeatureSpace::from_parts(body.feature_config, body.vocabulary, body.idf)?;
        let linear = LinearModel::from_parts(body.weights, body.intercepts)?;
        Self::new(features, linear, body.classifier_config, body.classes)
    }
}

#[derive(Serialize, Deserialize)]
struct ArtifactBody {
    format_version: u32,
    feature_config: FeatureConfig,
    classifier_config: LinearConfig,
    vocabulary: Vec<String>,
    idf: Vec<f64>,
    classes: Vec<String>,
    weights: Vec<Vec<f64>>,
    intercepts: Vec<f64>,
}

impl ArtifactBody {
    fn checksum(&self) -> Result<String> {
        let encoded = serde_json::to_vec(self)?;
        Ok(format!("{:x}", Sha256::digest(&encoded)))
    }
}

#[derive(Serialize, Deserialize)]
struct ModelArtifact {
    #[serde(flatten)]
    body: ArtifactBody,
    checksum: String,
}
