//! MindScan Classifiers
//!
//! Text classification for mental-health related categories.
//!
//! The pipeline is split into small frozen pieces:
//! - [`normalize`]: the cleaning cascade shared by training and inference
//! - [`features`]: TF-IDF over unigrams and bigrams
//! - [`linear`]: multinomial logistic regression with balanced class weights
//! - [`model`]: the immutable trained model and its JSON artifact
//! - [`training`]: the offline 80/20 training run and its evaluation report
//! - [`analysis`]: batch classification of a profile's posts
//!
//! Everything runs synchronously on the CPU; a loaded model is `Send + Sync`.

pub mod analysis;
pub mod classifier;
pub mod corpus;
pub mod evaluation;
pub mod features;
pub mod linear;
pub mod model;
pub mod normalize;
pub mod posts;
pub mod stop_words;
pub mod training;
pub mod translate;

pub use analysis::ProfileAnalyzer;
pub use classifier::{ClassificationResult, Classifier};
pub use corpus::{CorpusConfig, TrainingCorpus};
pub use evaluation::ClassificationReport;
pub use features::{FeatureConfig, FeatureSpace, SparseVector};
pub use linear::{ClassWeight, LinearConfig, LinearModel};
pub use model::{ClassProbabilities, ClassifierModel};
pub use normalize::TextNormalizer;
pub use posts::{load_posts, parse_json, parse_pasted};
pub use training::{train, TrainingConfig, TrainingOutcome};
pub use translate::{IdentityTranslator, Translator};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::analysis::ProfileAnalyzer;
    pub use crate::classifier::{ClassificationResult, Classifier};
    pub use crate::corpus::TrainingCorpus;
    pub use crate::model::{ClassProbabilities, ClassifierModel};
    pub use crate::normalize::{normalize, TextNormalizer};
    pub use crate::training::{train, TrainingConfig};
    pub use crate::translate::{IdentityTranslator, Translator};
}
