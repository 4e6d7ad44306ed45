//! Text normalization shared by training and inference
//!
//! The same cascade must run on corpus rows and on live posts, otherwise the
//! frozen feature space sees text it was never calibrated for.

use mindscan_core::Result;
use regex::Regex;
use std::sync::OnceLock;

/// Deterministic cleaner: lower-case, drop URLs, drop mentions, keep ASCII letters and whitespace
#[derive(Debug, Clone)]
pub struct TextNormalizer {
    url_regex: Regex,
    mention_regex: Regex,
    non_letter_regex: Regex,
}

impl TextNormalizer {
    /// Create a new normalizer
    pub fn new() -> Result<Self> {
        Ok(Self {
            url_regex: Regex::new(r"http\S+|www\S+|https\S+").map_err(|e| {
                mindscan_core::Error::internal(format!("Failed to compile URL regex: {}", e))
            })?,
            mention_regex: Regex::new(r"@\w+").map_err(|e| {
                mindscan_core::Error::internal(format!("Failed to compile mention regex: {}", e))
            })?,
            non_letter_regex: Regex::new(r"[^a-zA-Z\s]").map_err(|e| {
                mindscan_core::Error::internal(format!("Failed to compile letter regex: {}", e))
            })?,
        })
    }

    /// Process-wide instance
    pub fn shared() -> &'static TextNormalizer {
        static SHARED: OnceLock<TextNormalizer> = OnceLock::new();
        SHARED.get_or_init(TextNormalizer::default)
    }

    /// Normalize a string
    ///
    /// URL, mention, and letter stripping repeat until nothing changes: stripping
    /// punctuation can glue a new URL-like run together (`h.ttpx` -> `httpx`),
    /// and a second call must not see anything left to remove.
    pub fn normalize(&self, text: &str) -> String {
        let mut current = text.to_lowercase();

        loop {
            let next = self.strip_once(&current);
            if next == current {
                return next;
            }
            current = next;
        }
    }

    fn strip_once(&self, text: &str) -> String {
        let without_urls = self.url_regex.replace_all(text, "");
        let without_mentions = self.mention_regex.replace_all(&without_urls, "");
        self.non_letter_regex
            .replace_all(&without_mentions, "")
            .into_owned()
    }
}

impl Default for TextNormalizer {
    fn default() -> Self {
        Self::new().expect("Failed to create text normalizer")
    }
}

/// Normalize text with the shared normalizer
pub fn normalize(text: &str) -> String {
    TextNormalizer::shared().normalize(text)
}

/// Whether a normalized string carries no content
pub fn is_blank(cleaned: &str) -> bool {
    cleaned.trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_reference_example() {
        assert_eq!(normalize("Check http://x.co NOW @bob!!"), "check  now ");
    }

    #[test]
    fn test_urls_removed() {
        assert_eq!(normalize("see https://example.com/a?b=1 here"), "see  here");
        assert_eq!(normalize("visit www.example.org today"), "visit  today");
    }

    #[test]
    fn test_mentions_before_punctuation() {
        // With punctuation stripped first, "@bob" would leave "bob" behind
        assert_eq!(normalize("thanks @bob_99"), "thanks ");
    }

    #[test]
    fn test_digits_emoji_and_scripts_removed() {
        assert_eq!(normalize("I'm 100% done 😭"), "im  done ");
        assert_eq!(normalize("Привет world"), " world");
    }

    #[test]
    fn test_glued_url_is_stable() {
        let once = normalize("h.ttpx ok");
        assert_eq!(once, " ok");
        assert_eq!(normalize(&once), once);
    }

    #[test]
    fn test_blank_detection() {
        assert!(is_blank(&normalize("123 !!! 😭")));
        assert!(is_blank(""));
        assert!(!is_blank(&normalize("still here")));
    }

    proptest! {
        #[test]
        fn prop_idempotent(text in "\\PC{0,64}") {
            let once = normalize(&text);
            prop_assert_eq!(normalize(&once), once);
        }

        #[test]
        fn prop_only_lowercase_letters_and_whitespace(text in "\\PC{0,64}") {
            let cleaned = normalize(&text);
            prop_assert!(cleaned.chars().all(|c| c.is_ascii_lowercase() || c.is_whitespace()));
        }
    }
}
