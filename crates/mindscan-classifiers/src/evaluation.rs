//! Held-out evaluation: accuracy, per-class precision/recall/F1, confusion matrix

use serde::Serialize;
use std::fmt;

/// Scores for a single class
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassMetrics {
    pub label: String,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

/// Averaged scores across classes
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AverageMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

/// Evaluation of predictions against ground truth
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationReport {
    pub accuracy: f64,
    pub per_class: Vec<ClassMetrics>,
    pub macro_avg: AverageMetrics,
    pub weighted_avg: AverageMetrics,
    /// `confusion[actual][predicted]`, indexed like `per_class`
    pub confusion: Vec<Vec<usize>>,
    pub total: usize,
}

impl ClassificationReport {
    /// Compare predicted and true labels
    ///
    /// Rows cover `classes` plus any label that only shows up in `actual` or
    /// `predicted`, in sorted order.
    pub fn compute(classes: &[String], actual: &[String], predicted: &[String]) -> Self {
        assert_eq!(
            actual.len(),
            predicted.len(),
            "actual and predicted labels must have same length"
        );

        let mut classes: Vec<String> = classes
            .iter()
            .chain(actual)
            .chain(predicted)
            .cloned()
            .collect();
        classes.sort();
        classes.dedup();

        let index = |label: &str| classes.binary_search_by(|c| c.as_str().cmp(label)).ok();
        let k = classes.len();
        let mut confusion = vec![vec![0usize; k]; k];
        let mut correct = 0usize;

        for (a, p) in actual.iter().zip(predicted) {
            if a == p {
                correct += 1;
            }
            if let (Some(ai), Some(pi)) = (index(a), index(p)) {
                confusion[ai][pi] += 1;
            }
        }

        let total = actual.len();
        let accuracy = ratio(correct, total);

        let per_class: Vec<ClassMetrics> = classes
            .iter()
            .enumerate()
            .map(|(i, label)| {
                let tp = confusion[i][i];
                let predicted_i: usize = confusion.iter().map(|row| row[i]).sum();
                let support: usize = confusion[i].iter().sum();
                let precision = ratio(tp, predicted_i);
                let recall = ratio(tp, support);
                let f1 = if precision + recall > 0.0 {
                    2.0 * precision * recall / (precision + recall)
                } else {
                    0.0
                };
                ClassMetrics {
                    label: label.clone(),
                    precision,
                    recall,
                    f1,
                    support,
                }
            })
            .collect();

        let macro_avg = average(&per_class, |_| 1.0);
        let weighted_avg = average(&per_class, |m| m.support as f64);

        Self {
            accuracy,
            per_class,
            macro_avg,
            weighted_avg,
            confusion,
            total,
        }
    }

    /// Metrics for one class
    pub fn class(&self, label: &str) -> Option<&ClassMetrics> {
        self.per_class.iter().find(|m| m.label == label)
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

fn average(per_class: &[ClassMetrics], weight: impl Fn(&ClassMetrics) -> f64) -> AverageMetrics {
    let total_weight: f64 = per_class.iter().map(&weight).sum();
    if total_weight == 0.0 {
        return AverageMetrics {
            precision: 0.0,
            recall: 0.0,
            f1: 0.0,
        };
    }
    let weighted = |f: fn(&ClassMetrics) -> f64| {
        per_class.iter().map(|m| weight(m) * f(m)).sum::<f64>() / total_weight
    };
    AverageMetrics {
        precision: weighted(|m| m.precision),
        recall: weighted(|m| m.recall),
        f1: weighted(|m| m.f1),
    }
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .per_class
            .iter()
            .map(|m| m.label.len())
            .chain(["weighted avg".len()])
            .max()
            .unwrap_or(12);

        writeln!(
            f,
            "{:>width$} {:>9} {:>9} {:>9} {:>9}",
            "", "precision", "recall", "f1-score", "support"
        )?;
        writeln!(f)?;
        for m in &self.per_class {
            writeln!(
                f,
                "{:>width$} {:>9.2} {:>9.2} {:>9.2} {:>9}",
                m.label, m.precision, m.recall, m.f1, m.support
            )?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "{:>width$} {:>9} {:>9} {:>9.2} {:>9}",
            "accuracy", "", "", self.accuracy, self.total
        )?;
        for (name, avg) in [("macro avg", self.macro_avg), ("weighted avg", self.weighted_avg)] {
            writeln!(
                f,
                "{:>width$} {:>9.2} {:>9.2} {:>9.2} {:>9}",
                name, avg.precision, avg.recall, avg.f1, self.total
            )?;
        }
        Ok(())
    }
}
