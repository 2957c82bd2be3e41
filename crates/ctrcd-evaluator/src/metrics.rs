//! Ranking metrics over held-out scores.
//!
//! All curves sweep the distinct predicted scores from high to low, so tied
//! scores move as one block; a model cannot improve its curve by splitting
//! ties it does not actually resolve.

/// ROC curve points, from (0, 0) to (1, 1).
#[derive(Debug, Clone)]
pub struct RocCurve {
    /// False-positive rate at each threshold.
    pub fpr: Vec<f64>,
    /// True-positive rate at each threshold.
    pub tpr: Vec<f64>,
    /// Descending decision thresholds, one per point after the origin.
    pub thresholds: Vec<f64>,
}

/// Precision-recall curve points in increasing-recall order.
#[derive(Debug, Clone)]
pub struct PrCurve {
    /// Precision at each threshold.
    pub precision: Vec<f64>,
    /// Recall at each threshold.
    pub recall: Vec<f64>,
    /// Descending decision thresholds, one per point.
    pub thresholds: Vec<f64>,
}

/// The F1-optimal operating point along a PR curve.
#[derive(Debug, Clone, Copy)]
pub struct BestF1 {
    /// Decision threshold achieving the best F1.
    pub threshold: f64,
    /// F1 at that threshold.
    pub f1: f64,
    /// Precision at that threshold.
    pub precision: f64,
    /// Recall at that threshold.
    pub recall: f64,
}

/// Sorts row indices by descending score.
fn descending_order(scores: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));
    order
}

/// Computes the ROC curve over descending score thresholds.
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn roc_curve(labels: &[f64], scores: &[f64]) -> RocCurve {
    let order = descending_order(scores);
    let n_pos = labels.iter().filter(|&&y| y == 1.0).count();
    let n_neg = labels.len() - n_pos;

    let mut fpr = vec![0.0];
    let mut tpr = vec![0.0];
    let mut thresholds = Vec::new();

    let mut tp = 0usize;
    let mut fp = 0usize;
    let mut i = 0;
    while i < order.len() {
        let threshold = scores[order[i]];
        while i < order.len() && scores[order[i]] == threshold {
            if labels[order[i]] == 1.0 {
                tp += 1;
            } else {
                fp += 1;
            }
            i += 1;
        }
        fpr.push(if n_neg == 0 { 0.0 } else { fp as f64 / n_neg as f64 });
        tpr.push(if n_pos == 0 { 0.0 } else { tp as f64 / n_pos as f64 });
        thresholds.push(threshold);
    }

    RocCurve { fpr, tpr, thresholds }
}

/// Area under the ROC curve (trapezoidal rule).
#[must_use]
pub fn roc_auc(labels: &[f64], scores: &[f64]) -> f64 {
    let curve = roc_curve(labels, scores);
    let mut area = 0.0;
    for w in curve.fpr.windows(2).zip(curve.tpr.windows(2)) {
        let (fpr_pair, tpr_pair) = w;
        area += (fpr_pair[1] - fpr_pair[0]) * f64::midpoint(tpr_pair[0], tpr_pair[1]);
    }
    area
}

/// Computes the precision-recall curve over descending score thresholds.
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn pr_curve(labels: &[f64], scores: &[f64]) -> PrCurve {
    let order = descending_order(scores);
    let n_pos = labels.iter().filter(|&&y| y == 1.0).count();

    let mut precision = Vec::new();
    let mut recall = Vec::new();
    let mut thresholds = Vec::new();

    let mut tp = 0usize;
    let mut predicted = 0usize;
    let mut i = 0;
    while i < order.len() {
        let threshold = scores[order[i]];
        while i < order.len() && scores[order[i]] == threshold {
            if labels[order[i]] == 1.0 {
                tp += 1;
            }
            predicted += 1;
            i += 1;
        }
        precision.push(if predicted == 0 { 1.0 } else { tp as f64 / predicted as f64 });
        recall.push(if n_pos == 0 { 0.0 } else { tp as f64 / n_pos as f64 });
        thresholds.push(threshold);
    }

    PrCurve { precision, recall, thresholds }
}

/// Average precision: the step-function integral of the PR curve.
#[must_use]
pub fn average_precision(labels: &[f64], scores: &[f64]) -> f64 {
    let curve = pr_curve(labels, scores);
    let mut area = 0.0;
    let mut last_recall = 0.0;
    for (&p, &r) in curve.precision.iter().zip(&curve.recall) {
        area += (r - last_recall) * p;
        last_recall = r;
    }
    area
}

/// Finds the threshold maximizing F1 along the PR curve.
///
/// Ties keep the highest threshold. Returns `None` when there are no
/// scores at all.
#[must_use]
pub fn best_f1_threshold(labels: &[f64], scores: &[f64]) -> Option<BestF1> {
    let curve = pr_curve(labels, scores);
    let mut best: Option<BestF1> = None;
    for ((&p, &r), &threshold) in curve
        .precision
        .iter()
        .zip(&curve.recall)
        .zip(&curve.thresholds)
    {
        let f1 = if p + r == 0.0 { 0.0 } else { 2.0 * p * r / (p + r) };
        if best.is_none_or(|b| f1 > b.f1) {
            best = Some(BestF1 {
                threshold,
                f1,
                precision: p,
                recall: r,
            });
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perfect_ranking_scores_one() {
        let labels = [0.0, 0.0, 1.0, 1.0];
        let scores = [0.1, 0.2, 0.8, 0.9];
        assert!((roc_auc(&labels, &scores) - 1.0).abs() < 1e-12);
        assert!((average_precision(&labels, &scores) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn reversed_ranking_scores_zero() {
        let labels = [1.0, 1.0, 0.0, 0.0];
        let scores = [0.1, 0.2, 0.8, 0.9];
        assert!(roc_auc(&labels, &scores).abs() < 1e-12);
    }

    #[test]
    fn known_mixed_ranking() {
        let labels = [0.0, 0.0, 1.0, 1.0];
        let scores = [0.1, 0.4, 0.35, 0.8];
        assert!((roc_auc(&labels, &scores) - 0.75).abs() < 1e-12);
    }

    #[test]
    fn tied_scores_move_as_a_block() {
        let labels = [1.0, 0.0, 1.0, 0.0];
        let scores = [0.5, 0.5, 0.5, 0.5];
        // All predictions are indistinguishable: chance-level AUC.
        assert!((roc_auc(&labels, &scores) - 0.5).abs() < 1e-12);
        let curve = roc_curve(&labels, &scores);
        assert_eq!(curve.thresholds.len(), 1);
    }

    #[test]
    fn roc_curve_ends_at_the_corner() {
        let labels = [0.0, 1.0, 0.0, 1.0, 1.0];
        let scores = [0.2, 0.3, 0.5, 0.7, 0.9];
        let curve = roc_curve(&labels, &scores);
        assert!((curve.fpr[0]).abs() < 1e-12);
        assert!((curve.tpr[0]).abs() < 1e-12);
        assert!((curve.fpr.last().unwrap() - 1.0).abs() < 1e-12);
        assert!((curve.tpr.last().unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn average_precision_of_alternating_ranking() {
        // Descending: pos, neg, pos, neg.
        let labels = [1.0, 0.0, 1.0, 0.0];
        let scores = [0.9, 0.7, 0.5, 0.3];
        // AP = 0.5 * 1.0 + 0.5 * (2/3)
        let expected = 0.5 + 0.5 * (2.0 / 3.0);
        assert!((average_precision(&labels, &scores) - expected).abs() < 1e-12);
    }

    #[test]
    fn best_f1_prefers_the_informative_threshold() {
        let labels = [0.0, 0.0, 0.0, 1.0, 1.0];
        let scores = [0.1, 0.2, 0.6, 0.7, 0.9];
        let best = best_f1_threshold(&labels, &scores).unwrap();
        // Cutting at 0.7 catches both positives with one false positive
        // avoided: precision 1.0, recall 1.0 is impossible, the best cut
        // keeps both positives and excludes scores below 0.7.
        assert!((best.threshold - 0.7).abs() < 1e-12);
        assert!((best.recall - 1.0).abs() < 1e-12);
        assert!((best.precision - 1.0).abs() < 1e-12);
        assert!((best.f1 - 1.0).abs() < 1e-12);
    }

    #[test]
    fn empty_scores_have_no_operating_point() {
        assert!(best_f1_threshold(&[], &[]).is_none());
    }
}
