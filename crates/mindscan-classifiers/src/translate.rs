//! Translation seam
//!
//! The model is trained on English text. A [`Translator`] maps other
//! languages to English before classification. Callers must recover from
//! failures by keeping the untranslated text.

use mindscan_core::Result;

/// Text-to-text translation service
pub trait Translator: Send + Sync {
    /// Translate `text` into the `target` language (ISO 639-1 code)
    fn translate(&self, text: &str, target: &str) -> Result<String>;

    /// Service name for logs
    fn name(&self) -> &str;
}

/// Returns the input unchanged; used when no translation service is configured
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityTranslator;

impl Translator for IdentityTranslator {
    fn translate(&self, text: &str, _target: &str) -> Result<String> {
        Ok(text.to_string())
    }

    fn name(&self) -> &str {
        "identity"
    }
}

/// Translate, falling back to the original text on any failure
pub fn translate_or_original(translator: &dyn Translator, text: &str, target: &str) -> String {
    match translator.translate(text, target) {
        Ok(translated) => translated,
        Err(e) => {
            tracing::warn!(
                translator = translator.name(),
                error = %e,
                "Translation failed, using original text"
            );
            metrics::counter!("mindscan_translation_failures_total").increment(1);
            text.to_string()
        }
    }
}
