//! Application configuration

use anyhow::Context;
use mindscan_classifiers::{CorpusConfig, TrainingConfig};
use mindscan_policy::RuleSet;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level `mindscan.yaml`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Training corpus location and columns
    #[serde(default)]
    pub corpus: CorpusConfig,

    /// Feature, classifier, and split settings
    #[serde(default)]
    pub training: TrainingConfig,

    /// Model artifact path, written by `train` and read by `predict`/`analyze`
    #[serde(default = "default_model_path")]
    pub model_path: PathBuf,

    /// Profile rule cascade
    #[serde(default)]
    pub rules: RuleSet,
}

/// Values given on the command line, applied over the file
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub corpus: Option<PathBuf>,
    pub model_path: Option<PathBuf>,
    pub rules: Option<PathBuf>,
}

impl AppConfig {
    /// Load configuration from file and CLI overrides
    pub fn load(config_path: &Path, overrides: &Overrides) -> anyhow::Result<Self> {
        // Try to load from file, or use defaults
        let mut config = if config_path.exists() {
            let content = std::fs::read_to_string(config_path)
                .with_context(|| format!("Failed to read {}", config_path.display()))?;
            Self::from_yaml(&content)
                .with_context(|| format!("Invalid configuration in {}", config_path.display()))?
        } else {
            tracing::debug!(path = %config_path.display(), "No config file, using defaults");
            Self::default()
        };

        // Apply CLI overrides
        if let Some(corpus) = &overrides.corpus {
            config.corpus.path = corpus.clone();
        }

        if let Some(model_path) = &overrides.model_path {
            config.model_path = model_path.clone();
        }

        if let Some(rules) = &overrides.rules {
            config.rules = RuleSet::from_file(rules)
                .with_context(|| format!("Failed to load rules {}", rules.display()))?;
        }

        Ok(config)
    }

    /// Parse and validate YAML
    pub fn from_yaml(yaml: &str) -> anyhow::Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.rules.validate()?;
        Ok(config)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            corpus: CorpusConfig::default(),
            training: TrainingConfig::default(),
            model_path: default_model_path(),
            rules: RuleSet::default_cascade(),
        }
    }
}

fn default_model_path() -> PathBuf {
    PathBuf::from("models/mental_health_model.json")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_missing_file_gives_defaults() {
        let config = AppConfig::load(Path::new("/nonexistent/mindscan.yaml"), &Overrides::default())
            .unwrap();

        assert_eq!(config.model_path, default_model_path());
        assert_eq!(config.training.test_ratio, 0.2);
        assert_eq!(config.training.features.max_features, 10_000);
        assert_eq!(config.rules.rules.len(), 4);
    }

    #[test]
    fn test_partial_yaml() {
        let yaml = r#"
model_path: out/model.json
training:
  features:
    min_df: 2
  classifier:
    class_weight: none
"#;
        let config = AppConfig::from_yaml(yaml).unwrap();

        assert_eq!(config.model_path, PathBuf::from("out/model.json"));
        assert_eq!(config.training.features.min_df, 2);
        assert_eq!(config.training.features.ngram_range, (1, 2));
        assert_eq!(config.training.seed, 42);
        assert_eq!(config.corpus.text_column, "statement");
    }

    #[test]
    fn test_overrides_win() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "model_path: from-file.json").unwrap();

        let mut rules = tempfile::NamedTempFile::new().unwrap();
        writeln!(rules, "rules:\n  - name: mode\n    condition:\n      type: mode").unwrap();

        let overrides = Overrides {
            corpus: Some(PathBuf::from("other.csv")),
            model_path: Some(PathBuf::from("from-cli.json")),
            rules: Some(rules.path().to_path_buf()),
        };
        let config = AppConfig::load(file.path(), &overrides).unwrap();

        assert_eq!(config.model_path, PathBuf::from("from-cli.json"));
        assert_eq!(config.corpus.path, PathBuf::from("other.csv"));
        assert_eq!(config.rules.rules.len(), 1);
    }

    #[test]
    fn test_invalid_rules_in_config() {
        let yaml = r#"
rules:
  rules:
    - name: depression-dominant
      condition:
        type: share_above
        label: Depression
        threshold: 2.0
"#;
        assert!(AppConfig::from_yaml(yaml).is_err());
    }
}
