//! Profile aggregation
//!
//! Turns per-post predictions into one verdict by walking the rule cascade.
//! Aggregation is pure: the same predictions always yield the same verdict.

use crate::condition::Condition;
use crate::rule::{RuleSet, Severity};
use crate::stats::{LabelCount, LabelStats};
use mindscan_core::{Error, PostPrediction, Result};
use serde::Serialize;
use tracing::debug;

/// Name reported when no enabled rule matched and the mode was used
pub const FALLBACK_RULE: &str = "mode";

/// Profile-level assessment
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileVerdict {
    /// Display verdict
    pub verdict: String,

    /// Underlying category
    pub label: String,

    /// Rule that produced the verdict
    pub rule: String,

    pub severity: Severity,

    /// Mean confidence over all posts
    pub average_confidence: f64,

    /// Posts per label in first-encounter order
    pub per_label_counts: Vec<LabelCount>,

    /// Number of posts
    pub total: usize,
}

impl ProfileVerdict {
    /// Posts carrying `label`
    pub fn count(&self, label: &str) -> usize {
        self.per_label_counts
            .iter()
            .find(|c| c.label == label)
            .map(|c| c.count)
            .unwrap_or(0)
    }

    /// Share of posts carrying `label`
    pub fn share(&self, label: &str) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.count(label) as f64 / self.total as f64
    }
}

/// Applies a rule cascade to a profile
#[derive(Debug, Clone, Default)]
pub struct Aggregator {
    rules: RuleSet,
}

impl Aggregator {
    /// Create an aggregator over a validated rule set
    pub fn new(rules: RuleSet) -> Result<Self> {
        rules.validate()?;
        Ok(Self { rules })
    }

    /// Rules in evaluation order
    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Aggregate a non-empty batch of predictions
    pub fn aggregate(&self, predictions: &[PostPrediction]) -> Result<ProfileVerdict> {
        if predictions.is_empty() {
            return Err(Error::empty_input("no predictions to aggregate"));
        }

        let stats = LabelStats::from_predictions(predictions);
        let (verdict, label, rule, severity) = self.decide(&stats)?;

        debug!(
            rule = %rule,
            label = %label,
            total = stats.total(),
            "Profile verdict"
        );
        metrics::counter!("mindscan_verdicts_total", "rule" => rule.clone()).increment(1);

        Ok(ProfileVerdict {
            verdict,
            label,
            rule,
            severity,
            average_confidence: stats.average_confidence(),
            per_label_counts: stats.counts().to_vec(),
            total: stats.total(),
        })
    }

    fn decide(&self, stats: &LabelStats) -> Result<(String, String, String, Severity)> {
        for rule in self.rules.enabled() {
            if let Some(label) = rule.condition.evaluate(stats) {
                return Ok((
                    rule.render_verdict(&label),
                    label,
                    rule.name.clone(),
                    rule.severity,
                ));
            }
        }

        let label = Condition::Mode
            .evaluate(stats)
            .ok_or_else(|| Error::internal("mode of a non-empty profile is undefined"))?;
        Ok((
            label.clone(),
            label,
            FALLBACK_RULE.to_string(),
            Severity::Low,
        ))
    }
}

/// Aggregate with the default cascade
pub fn aggregate(predictions: &[PostPrediction]) -> Result<ProfileVerdict> {
    Aggregator::default().aggregate(predictions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::Rule;

    fn predictions(labels: &[&str]) -> Vec<PostPrediction> {
        labels.iter().map(|l| PostPrediction::new(*l, 0.8)).collect()
    }

    #[test]
    fn test_suicidal_overrides_majority() {
        let verdict = aggregate(&predictions(&["Normal", "Normal", "Normal", "Suicidal"])).unwrap();
        assert_eq!(verdict.verdict, "Suicidal risk detected");
        assert_eq!(verdict.label, "Suicidal");
        assert_eq!(verdict.rule, "suicidal-risk");
        assert_eq!(verdict.severity, Severity::Critical);
    }

    #[test]
    fn test_empty_rejected() {
        assert!(matches!(aggregate(&[]), Err(Error::EmptyInput(_))));
    }

    #[test]
    fn test_falls_back_to_mode_when_nothing_enabled_matches() {
        let rules = RuleSet {
            rules: vec![
                Rule::new(
                    "bipolar-any",
                    Condition::AnyOf {
                        label: "Bipolar".into(),
                    },
                ),
                Rule::new(
                    "stress-any",
                    Condition::AnyOf {
                        label: "Stress".into(),
                    },
                )
                .with_severity(Severity::High)
                .disabled(),
            ],
        };
        let aggregator = Aggregator::new(rules).unwrap();

        let verdict = aggregator
            .aggregate(&predictions(&["Stress", "Normal", "Stress"]))
            .unwrap();
        assert_eq!(verdict.verdict, "Stress");
        assert_eq!(verdict.rule, FALLBACK_RULE);
        assert_eq!(verdict.severity, Severity::Low);
    }

    #[test]
    fn test_counts_and_shares() {
        let verdict = aggregate(&predictions(&["Normal", "Anxiety", "Normal", "Normal"])).unwrap();
        assert_eq!(verdict.total, 4);
        assert_eq!(verdict.count("Normal"), 3);
        assert!((verdict.share("Anxiety") - 0.25).abs() < 1e-12);
        assert_eq!(verdict.per_label_counts[0].label, "Normal");
    }

    #[test]
    fn test_invalid_rules_rejected() {
        let rules = RuleSet {
            rules: vec![Rule::new(
                "x",
                Condition::ShareAbove {
                    label: "Anxiety".into(),
                    threshold: -0.1,
                },
            )],
        };
        assert!(Aggregator::new(rules).is_err());
    }
}
