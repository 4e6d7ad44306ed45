//! Rule and rule set definitions

use crate::condition::Condition;
use mindscan_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::Path;

/// How urgent a verdict is
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Low,
    Medium,
    High,
    Critical,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        };
        f.write_str(name)
    }
}

/// An ordered cascade of rules; the first enabled match wins
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleSet {
    /// Rules in evaluation order
    pub rules: Vec<Rule>,
}

impl RuleSet {
    /// Load a rule set from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let rules: Self = serde_yaml::from_str(yaml)
            .map_err(|e| Error::config(format!("Invalid rule set: {}", e)))?;
        rules.validate()?;
        Ok(rules)
    }

    /// Load a rule set from a file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!("Failed to read rules {}: {}", path.display(), e))
        })?;
        Self::from_yaml(&content)
    }

    /// Suicidal risk, then dominant depression, then dominant anxiety, then the mode
    pub fn default_cascade() -> Self {
        Self {
            rules: vec![
                Rule::new(
                    "suicidal-risk",
                    Condition::AnyOf {
                        label: "Suicidal".into(),
                    },
                )
                .with_description("A single suicidal post outweighs every other signal")
                .with_verdict("Suicidal risk detected")
                .with_severity(Severity::Critical),
                Rule::new(
                    "depression-dominant",
                    Condition::ShareAbove {
                        label: "Depression".into(),
                        threshold: 0.15,
                    },
                )
                .with_description("More than 15% of posts read as depression")
                .with_verdict("Depression (dominant)")
                .with_severity(Severity::High),
                Rule::new(
                    "anxiety-dominant",
                    Condition::ShareAbove {
                        label: "Anxiety".into(),
                        threshold: 0.15,
                    },
                )
                .with_description("More than 15% of posts read as anxiety")
                .with_verdict("Anxiety (dominant)")
                .with_severity(Severity::Medium),
                Rule::new("mode", Condition::Mode)
                    .with_description("Most frequent label across the profile"),
            ],
        }
    }

    /// Check names and condition parameters
    pub fn validate(&self) -> Result<()> {
        let mut names = HashSet::new();
        for rule in &self.rules {
            if rule.name.trim().is_empty() {
                return Err(Error::config("rule name must not be empty"));
            }
            if !names.insert(rule.name.as_str()) {
                return Err(Error::config(format!("duplicate rule name '{}'", rule.name)));
            }
            rule.condition
                .validate()
                .map_err(|e| Error::config(format!("rule '{}': {}", rule.name, e)))?;
        }
        Ok(())
    }

    /// Reject enabled rules that name a label the model cannot emit
    pub fn validate_labels(&self, classes: &[String]) -> Result<()> {
        for rule in self.enabled() {
            if let Some(label) = rule.condition.label() {
                if !classes.iter().any(|c| c == label) {
                    return Err(Error::config(format!(
                        "rule '{}' references unknown label '{}' (known: {})",
                        rule.name,
                        label,
                        classes.join(", ")
                    )));
                }
            }
        }
        Ok(())
    }

    /// Enabled rules in evaluation order
    pub fn enabled(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter().filter(|r| r.enabled)
    }

    /// Look up a rule by name
    pub fn get(&self, name: &str) -> Option<&Rule> {
        self.rules.iter().find(|r| r.name == name)
    }

    /// Look up a rule by name for editing
    pub fn get_mut(&mut self, name: &str) -> Option<&mut Rule> {
        self.rules.iter_mut().find(|r| r.name == name)
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::default_cascade()
    }
}

/// A single rule within a cascade
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    /// Rule identifier
    pub name: String,

    /// Description of what this rule detects
    #[serde(default)]
    pub description: String,

    /// When the rule fires
    pub condition: Condition,

    /// Display verdict; the matched label when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verdict: Option<String>,

    /// Severity attached to the verdict
    #[serde(default)]
    pub severity: Severity,

    /// Whether this rule is enabled
    #[serde(default = "default_true")]
    pub enabled: bool,
}

fn default_true() -> bool {
    true
}

impl Rule {
    /// Create an enabled, low-severity rule
    pub fn new(name: impl Into<String>, condition: Condition) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            condition,
            verdict: None,
            severity: Severity::default(),
            enabled: true,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_verdict(mut self, verdict: impl Into<String>) -> Self {
        self.verdict = Some(verdict.into());
        self
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Keep the rule in the set but skip it during evaluation
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Verdict text for a matched label
    pub fn render_verdict(&self, label: &str) -> String {
        self.verdict.clone().unwrap_or_else(|| label.to_string())
    }
}
