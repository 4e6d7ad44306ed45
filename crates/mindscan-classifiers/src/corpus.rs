//! Training corpus loading
//!
//! Reads a CSV with a header row. Only the text and label columns are used;
//! any other column (including an unnamed index) is ignored.

use mindscan_core::{Error, LabeledExample, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Where the corpus lives and which columns to read
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorpusConfig {
    /// CSV file path
    #[serde(default = "default_corpus_path")]
    pub path: PathBuf,

    /// Column holding the statement text
    #[serde(default = "default_text_column")]
    pub text_column: String,

    /// Column holding the category label
    #[serde(default = "default_label_column")]
    pub label_column: String,
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            path: default_corpus_path(),
            text_column: default_text_column(),
            label_column: default_label_column(),
        }
    }
}

fn default_corpus_path() -> PathBuf {
    PathBuf::from("data/Combined Data.csv")
}

fn default_text_column() -> String {
    "statement".to_string()
}

fn default_label_column() -> String {
    "status".to_string()
}

/// Ordered, immutable collection of labeled examples
#[derive(Debug, Clone, Default)]
pub struct TrainingCorpus {
    examples: Vec<LabeledExample>,
}

impl TrainingCorpus {
    /// Wrap already-loaded examples
    pub fn new(examples: Vec<LabeledExample>) -> Self {
        Self { examples }
    }

    /// Load the corpus described by `config`
    pub fn load(config: &CorpusConfig) -> Result<Self> {
        let file = std::fs::File::open(&config.path).map_err(|e| {
            Error::corpus(format!(
                "Failed to open corpus {}: {}",
                config.path.display(),
                e
            ))
        })?;
        let corpus = Self::from_reader(file, &config.text_column, &config.label_column)?;

        info!(
            path = %config.path.display(),
            examples = corpus.len(),
            "Corpus loaded"
        );
        Ok(corpus)
    }

    /// Load from a CSV file with the default column names
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        Self::load(&CorpusConfig {
            path: path.as_ref().to_path_buf(),
            ..Default::default()
        })
    }

    /// Parse CSV from any reader
    pub fn from_reader<R: Read>(reader: R, text_column: &str, label_column: &str) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let headers = rdr
            .headers()
            .map_err(|e| Error::corpus(format!("Failed to read CSV header: {}", e)))?
            .clone();

        let position = |name: &str| headers.iter().position(|h| h.trim() == name);
        let (text_idx, label_idx) = match (position(text_column), position(label_column)) {
            (Some(t), Some(l)) => (t, l),
            _ => {
                return Err(Error::config(format!(
                    "CSV must contain '{}' and '{}' columns. Found: {:?}",
                    text_column,
                    label_column,
                    headers.iter().collect::<Vec<_>>()
                )))
            }
        };

        let mut examples = Vec::new();
        let mut dropped = 0usize;

        for (row, record) in rdr.records().enumerate() {
            let record = record
                .map_err(|e| Error::corpus(format!("Malformed CSV row {}: {}", row + 1, e)))?;

            let text = record.get(text_idx).unwrap_or("");
            let label = record.get(label_idx).unwrap_or("").trim();

            if text.trim().is_empty() || label.is_empty() {
                dropped += 1;
                continue;
            }
            examples.push(LabeledExample::new(text, label));
        }

        if dropped > 0 {
            warn!(dropped, "Dropped corpus rows with missing text or label");
        }

        Ok(Self { examples })
    }

    /// Examples in file order
    pub fn examples(&self) -> &[LabeledExample] {
        &self.examples
    }

    /// Number of examples
    pub fn len(&self) -> usize {
        self.examples.len()
    }

    /// Whether the corpus has no examples
    pub fn is_empty(&self) -> bool {
        self.examples.is_empty()
    }

    /// Example count per label, sorted by label
    pub fn label_distribution(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for example in &self.examples {
            *counts.entry(example.label.clone()).or_insert(0) += 1;
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_named_columns() {
        let csv = ",statement,status\n0,I feel fine,Normal\n1,\"can't sleep, so worried\",Anxiety\n";
        let corpus = TrainingCorpus::from_reader(csv.as_bytes(), "statement", "status").unwrap();

        assert_eq!(corpus.len(), 2);
        assert_eq!(corpus.examples()[1].text, "can't sleep, so worried");
        assert_eq!(corpus.examples()[1].label, "Anxiety");
    }

    #[test]
    fn test_drops_rows_missing_text_or_label() {
        let csv = "statement,status\nhello,Normal\n,Depression\nbye,\n  ,Stress\n";
        let corpus = TrainingCorpus::from_reader(csv.as_bytes(), "statement", "status").unwrap();

        assert_eq!(corpus.len(), 1);
        assert_eq!(corpus.label_distribution().get("Normal"), Some(&1));
    }

    #[test]
    fn test_missing_columns_is_config_error() {
        let csv = "text,label\nhello,Normal\n";
        let err = TrainingCorpus::from_reader(csv.as_bytes(), "statement", "status").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = TrainingCorpus::from_path("/nonexistent/corpus.csv").unwrap_err();
        assert!(matches!(err, Error::Corpus(_)));
    }
}
