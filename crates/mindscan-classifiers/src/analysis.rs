//! Batch analysis of a profile's posts
//!
//! Each post goes through normalize → translate → normalize → classify.
//! Posts without usable text and transient collaborator failures are skipped
//! with a warning; any other error aborts the batch, which also fails when
//! nothing survives.

use crate::classifier::{ClassificationResult, Classifier};
use crate::normalize::{is_blank, TextNormalizer};
use crate::translate::{translate_or_original, IdentityTranslator, Translator};
use mindscan_core::{Error, PostPrediction, RawPost, Result};
use tracing::{debug, error, info, warn};

/// Language the model was trained on
pub const DEFAULT_TARGET_LANGUAGE: &str = "en";

/// Classifies posts with a trained model
pub struct ProfileAnalyzer<'a> {
    classifier: &'a dyn Classifier,
    translator: &'a dyn Translator,
    normalizer: &'static TextNormalizer,
}

impl<'a> ProfileAnalyzer<'a> {
    /// Create an analyzer over `classifier`, translating through `translator`
    pub fn new(classifier: &'a dyn Classifier, translator: &'a dyn Translator) -> Self {
        Self {
            classifier,
            translator,
            normalizer: TextNormalizer::shared(),
        }
    }

    /// Create an analyzer that does not translate
    pub fn without_translation(classifier: &'a dyn Classifier) -> Self {
        static IDENTITY: IdentityTranslator = IdentityTranslator;
        Self::new(classifier, &IDENTITY)
    }

    /// Classify every usable post, in input order
    pub fn analyze(&self, posts: &[RawPost]) -> Result<Vec<PostPrediction>> {
        let mut predictions = Vec::with_capacity(posts.len());
        let mut skipped = 0usize;

        for (index, post) in posts.iter().enumerate() {
            match self.analyze_post(post) {
                Ok(Some(prediction)) => predictions.push(prediction),
                Ok(None) => {
                    debug!(index, "Post has no usable text");
                    skipped += 1;
                }
                Err(e) if e.is_transient() => {
                    warn!(index, error = %e, "Failed to classify post, skipping");
                    skipped += 1;
                }
                Err(e) => {
                    error!(index, error = %e, "Aborting analysis");
                    return Err(e);
                }
            }
        }

        metrics::counter!("mindscan_posts_classified_total").increment(predictions.len() as u64);
        metrics::counter!("mindscan_posts_skipped_total").increment(skipped as u64);

        info!(
            classifier = self.classifier.name(),
            classified = predictions.len(),
            skipped,
            "Posts analyzed"
        );

        if predictions.is_empty() {
            return Err(Error::empty_input("no post could be classified"));
        }
        Ok(predictions)
    }

    /// Single-phrase mode: the full class distribution for one text
    pub fn classify_text(&self, text: &str) -> Result<ClassificationResult> {
        let cleaned = self.normalizer.normalize(text);
        if is_blank(&cleaned) {
            return Err(Error::empty_input("text is empty after cleaning"));
        }
        let model_text = self.prepare(&cleaned);
        self.classifier.classify(&model_text)
    }

    fn analyze_post(&self, post: &RawPost) -> Result<Option<PostPrediction>> {
        let Some(original) = post.text.as_deref() else {
            warn!(id = ?post.id, "Post has no text field");
            return Ok(None);
        };

        let cleaned = self.normalizer.normalize(original);
        if is_blank(&cleaned) {
            return Ok(None);
        }

        let model_text = self.prepare(&cleaned);
        let result = self.classifier.classify(&model_text)?;

        Ok(Some(PostPrediction {
            original_text: original.to_string(),
            cleaned_text: cleaned,
            translated_text: model_text,
            predicted_label: result.label,
            confidence: result.score,
            timestamp: post.timestamp(),
            post_id: post.id.clone(),
        }))
    }

    /// Translate and re-normalize, keeping the cleaned text if nothing is left
    fn prepare(&self, cleaned: &str) -> String {
        let translated = translate_or_original(self.translator, cleaned, DEFAULT_TARGET_LANGUAGE);
        let renormalized = self.normalizer.normalize(&translated);
        if is_blank(&renormalized) {
            cleaned.to_string()
        } else {
            renormalized
        }
    }
}
