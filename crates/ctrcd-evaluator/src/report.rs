//! Thresholded classification reports.

use std::fmt;

/// Precision/recall/F1/support for one class.
#[derive(Debug, Clone, Copy)]
pub struct ClassMetrics {
    /// Fraction of predicted members that are real members.
    pub precision: f64,
    /// Fraction of real members that were predicted.
    pub recall: f64,
    /// Harmonic mean of precision and recall.
    pub f1: f64,
    /// Number of real members.
    pub support: usize,
}

impl ClassMetrics {
    #[expect(clippy::cast_precision_loss)]
    fn from_counts(tp: usize, fp: usize, fn_: usize, support: usize) -> Self {
        let precision = if tp + fp == 0 {
            0.0
        } else {
            tp as f64 / (tp + fp) as f64
        };
        let recall = if tp + fn_ == 0 {
            0.0
        } else {
            tp as f64 / (tp + fn_) as f64
        };
        let f1 = if precision + recall == 0.0 {
            0.0
        } else {
            2.0 * precision * recall / (precision + recall)
        };
        Self {
            precision,
            recall,
            f1,
            support,
        }
    }
}

/// Per-class metrics and accuracy at one decision threshold.
#[derive(Debug, Clone)]
pub struct ClassificationReport {
    /// Decision threshold used (`score >= threshold` predicts positive).
    pub threshold: f64,
    /// Metrics for the negative class.
    pub negative: ClassMetrics,
    /// Metrics for the positive class.
    pub positive: ClassMetrics,
    /// Overall accuracy.
    pub accuracy: f64,
    /// Total number of scored rows.
    pub support: usize,
}

/// Computes the report at one threshold.
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn classification_report(labels: &[f64], scores: &[f64], threshold: f64) -> ClassificationReport {
    let mut tp = 0;
    let mut fp = 0;
    let mut tn = 0;
    let mut fn_ = 0;
    for (&y, &score) in labels.iter().zip(scores) {
        let predicted_positive = score >= threshold;
        match (y == 1.0, predicted_positive) {
            (true, true) => tp += 1,
            (true, false) => fn_ += 1,
            (false, true) => fp += 1,
            (false, false) => tn += 1,
        }
    }
    let support = labels.len();
    ClassificationReport {
        threshold,
        // For the negative class, "positive prediction" means predicting 0.
        negative: ClassMetrics::from_counts(tn, fn_, fp, tn + fp),
        positive: ClassMetrics::from_counts(tp, fp, fn_, tp + fn_),
        accuracy: if support == 0 {
            0.0
        } else {
            (tp + tn) as f64 / support as f64
        },
        support,
    }
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "threshold = {:.3}", self.threshold)?;
        writeln!(
            f,
            "{:>12} {:>10} {:>10} {:>10} {:>10}",
            "", "precision", "recall", "f1-score", "support"
        )?;
        writeln!(f)?;
        for (name, class) in [("0", &self.negative), ("1", &self.positive)] {
            writeln!(
                f,
                "{:>12} {:>10.3} {:>10.3} {:>10.3} {:>10}",
                name, class.precision, class.recall, class.f1, class.support
            )?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "{:>12} {:>10} {:>10} {:>10.3} {:>10}",
            "accuracy", "", "", self.accuracy, self.support
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_a_known_confusion_matrix() {
        let labels = [1.0, 1.0, 0.0, 0.0, 0.0, 1.0];
        let scores = [0.9, 0.4, 0.2, 0.7, 0.1, 0.6];
        let report = classification_report(&labels, &scores, 0.5);
        // Predicted positive: 0.9 (y1), 0.7 (y0), 0.6 (y1). tp=2 fp=1 fn=1 tn=2.
        assert_eq!(report.positive.support, 3);
        assert_eq!(report.negative.support, 3);
        assert!((report.positive.precision - 2.0 / 3.0).abs() < 1e-12);
        assert!((report.positive.recall - 2.0 / 3.0).abs() < 1e-12);
        assert!((report.negative.precision - 2.0 / 3.0).abs() < 1e-12);
        assert!((report.accuracy - 4.0 / 6.0).abs() < 1e-12);
    }

    #[test]
    fn degenerate_classes_do_not_divide_by_zero() {
        let labels = [0.0, 0.0];
        let scores = [0.9, 0.8];
        let report = classification_report(&labels, &scores, 0.5);
        assert!(report.positive.precision.abs() < f64::EPSILON);
        assert!(report.positive.recall.abs() < f64::EPSILON);
        assert_eq!(report.positive.support, 0);
        assert!(report.accuracy.abs() < f64::EPSILON);
    }

    #[test]
    fn display_is_a_fixed_width_table() {
        let labels = [1.0, 0.0];
        let scores = [0.9, 0.1];
        let text = classification_report(&labels, &scores, 0.5).to_string();
        assert!(text.contains("precision"));
        assert!(text.contains("accuracy"));
        assert!(text.contains("1.000"));
    }
}
