//! Label statistics over a profile's predictions

use mindscan_core::PostPrediction;
use serde::Serialize;

/// Number of posts carrying a label
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabelCount {
    pub label: String,
    pub count: usize,
}

/// Counts kept in first-encounter order, plus the confidence sum
#[derive(Debug, Clone, Default)]
pub struct LabelStats {
    counts: Vec<LabelCount>,
    /// Label index per post, in input order
    sequence: Vec<usize>,
    confidence_sum: f64,
}

impl LabelStats {
    /// Gather statistics from per-post predictions
    pub fn from_predictions(predictions: &[PostPrediction]) -> Self {
        Self::from_labels(
            predictions
                .iter()
                .map(|p| (p.predicted_label.as_str(), p.confidence)),
        )
    }

    /// Gather statistics from `(label, confidence)` pairs
    pub fn from_labels<'a>(items: impl IntoIterator<Item = (&'a str, f64)>) -> Self {
        let mut stats = Self::default();
        for (label, confidence) in items {
            let idx = match stats.counts.iter().position(|c| c.label == label) {
                Some(idx) => idx,
                None => {
                    stats.counts.push(LabelCount {
                        label: label.to_string(),
                        count: 0,
                    });
                    stats.counts.len() - 1
                }
            };
            stats.counts[idx].count += 1;
            stats.sequence.push(idx);
            stats.confidence_sum += confidence;
        }
        stats
    }

    /// Number of posts
    pub fn total(&self) -> usize {
        self.sequence.len()
    }

    /// Whether no posts were seen
    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    /// Posts carrying `label`
    pub fn count(&self, label: &str) -> usize {
        self.counts
            .iter()
            .find(|c| c.label == label)
            .map(|c| c.count)
            .unwrap_or(0)
    }

    /// Share of posts carrying `label`; 0.0 on an empty profile
    pub fn share(&self, label: &str) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        self.count(label) as f64 / self.total() as f64
    }

    /// Arithmetic mean of the confidences
    pub fn average_confidence(&self) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        self.confidence_sum / self.total() as f64
    }

    /// Per-label counts in first-encounter order
    pub fn counts(&self) -> &[LabelCount] {
        &self.counts
    }

    /// Most frequent label and its count
    ///
    /// On a tie, the label whose running count reaches the maximum first wins.
    pub fn mode(&self) -> Option<(&str, usize)> {
        let max = self.counts.iter().map(|c| c.count).max()?;
        let mut running = vec![0usize; self.counts.len()];
        for &idx in &self.sequence {
            running[idx] += 1;
            if running[idx] == max {
                return Some((self.counts[idx].label.as_str(), max));
            }
        }
        None
    }
}
