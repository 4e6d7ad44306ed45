//! Rule conditions

use crate::stats::LabelStats;
use mindscan_core::{Error, Result};
use serde::{Deserialize, Serialize};

/// Condition under which a rule fires
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    /// At least one post carries the label
    AnyOf {
        /// Label to look for
        label: String,
    },

    /// The label's share of all posts is strictly above a threshold
    ShareAbove {
        /// Label to measure
        label: String,

        /// Share threshold (0.0-1.0)
        #[serde(default = "default_share_threshold")]
        threshold: f64,
    },

    /// At least `count` posts carry the label
    CountAtLeast {
        /// Label to count
        label: String,

        /// Minimum number of posts
        count: usize,
    },

    /// Most frequent label; always fires on a non-empty profile
    Mode,
}

fn default_share_threshold() -> f64 {
    0.15
}

impl Condition {
    /// Label the condition refers to, if any
    pub fn label(&self) -> Option<&str> {
        match self {
            Condition::AnyOf { label }
            | Condition::ShareAbove { label, .. }
            | Condition::CountAtLeast { label, .. } => Some(label.as_str()),
            Condition::Mode => None,
        }
    }

    /// Returns the matched label when the condition holds
    pub fn evaluate(&self, stats: &LabelStats) -> Option<String> {
        match self {
            Condition::AnyOf { label } => (stats.count(label) > 0).then(|| label.clone()),
            Condition::ShareAbove { label, threshold } => {
                (stats.share(label) > *threshold).then(|| label.clone())
            }
            Condition::CountAtLeast { label, count } => {
                (stats.count(label) >= *count).then(|| label.clone())
            }
            Condition::Mode => stats.mode().map(|(label, _)| label.to_string()),
        }
    }

    /// Reject parameters that can never be meaningful
    pub fn validate(&self) -> Result<()> {
        if let Some(label) = self.label() {
            if label.trim().is_empty() {
                return Err(Error::config("condition label must not be empty"));
            }
        }
        match self {
            Condition::ShareAbove { label, threshold } if !(0.0..=1.0).contains(threshold) => {
                Err(Error::config(format!(
                    "share threshold for '{}' must be in [0, 1], got {}",
                    label, threshold
                )))
            }
            Condition::CountAtLeast { label, count } if *count == 0 => Err(Error::config(format!(
                "count for '{}' must be at least 1",
                label
            ))),
            _ => Ok(()),
        }
    }
}
