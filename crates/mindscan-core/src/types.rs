//! Core types for MindScan

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Twitter/X `created_at` layout, e.g. `Wed Oct 10 20:19:24 +0000 2018`
const TWITTER_DATE_FORMAT: &str = "%a %b %d %H:%M:%S %z %Y";

/// A single labeled row of the training corpus
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabeledExample {
    /// Raw statement text
    pub text: String,

    /// Category label (e.g. "Normal", "Depression")
    pub label: String,
}

impl LabeledExample {
    /// Create a new labeled example
    pub fn new(text: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            label: label.into(),
        }
    }
}

/// A post as supplied by a scraper export or a manual paste
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawPost {
    /// Post text; a post without text is skipped during analysis
    #[serde(default)]
    pub text: Option<String>,

    /// Creation date as reported by the source
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,

    /// Source identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl RawPost {
    /// Create a post from text only
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            date: None,
            id: None,
        }
    }

    /// Attach a source date
    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = Some(date.into());
        self
    }

    /// Attach a source identifier
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Parse the source date, accepting RFC 3339 and the Twitter layout
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        let raw = self.date.as_deref()?.trim();
        DateTime::parse_from_rfc3339(raw)
            .or_else(|_| DateTime::parse_from_str(raw, TWITTER_DATE_FORMAT))
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
    }
}

/// Classification outcome for a single post
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostPrediction {
    /// Text exactly as received
    pub original_text: String,

    /// Normalized text
    pub cleaned_text: String,

    /// Text fed to the model (the cleaned text when no translation happened)
    pub translated_text: String,

    /// Predicted category
    pub predicted_label: String,

    /// Probability of the predicted category (0.0-1.0)
    pub confidence: f64,

    /// Source timestamp, when it could be parsed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,

    /// Source identifier
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post_id: Option<String>,
}

impl PostPrediction {
    /// Create a prediction carrying only a label and confidence
    pub fn new(label: impl Into<String>, confidence: f64) -> Self {
        Self {
            original_text: String::new(),
            cleaned_text: String::new(),
            translated_text: String::new(),
            predicted_label: label.into(),
            confidence,
            timestamp: None,
            post_id: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_post_deserialization() {
        let json = r#"[{"text": "hello", "date": "2024-03-01T10:00:00Z", "id": "17"}, {"text": null}]"#;
        let posts: Vec<RawPost> = serde_json::from_str(json).unwrap();

        assert_eq!(posts.len(), 2);
        assert_eq!(posts[0].text.as_deref(), Some("hello"));
        assert_eq!(posts[0].id.as_deref(), Some("17"));
        assert!(posts[1].text.is_none());
    }

    #[test]
    fn test_timestamp_formats() {
        let rfc = RawPost::new("x").with_date("2024-03-01T10:00:00+02:00");
        assert_eq!(rfc.timestamp().unwrap().to_rfc3339(), "2024-03-01T08:00:00+00:00");

        let twitter = RawPost::new("x").with_date("Wed Oct 10 20:19:24 +0000 2018");
        assert!(twitter.timestamp().is_some());

        let garbage = RawPost::new("x").with_date("yesterday");
        assert!(garbage.timestamp().is_none());
        assert!(RawPost::new("x").timestamp().is_none());
    }
}
