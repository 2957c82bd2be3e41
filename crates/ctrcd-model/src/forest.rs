//! Random forest classifier.
//!
//! Bootstrap-bagged CART trees with per-split feature subsampling. Trees
//! grow on Gini impurity over imputed rows and store positive-class
//! fractions at the leaves; the forest probability is the plain average
//! over trees.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;
use serde::{Deserialize, Serialize};

use crate::tree::TreeNode;

/// Hyperparameters for the random forest.
#[derive(Debug, Clone)]
pub struct ForestTrainer {
    /// Number of bagged trees.
    pub n_trees: usize,
    /// Depth cap per tree.
    pub max_depth: usize,
    /// Minimum rows in a leaf.
    pub min_samples_leaf: usize,
    /// RNG seed for bootstrap and feature subsampling.
    pub seed: u64,
}

impl Default for ForestTrainer {
    fn default() -> Self {
        Self {
            n_trees: 200,
            max_depth: 8,
            min_samples_leaf: 2,
            seed: 42,
        }
    }
}

impl ForestTrainer {
    /// Fits the forest on imputed training rows.
    #[expect(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    #[must_use]
    pub fn fit(&self, rows: &[Vec<f64>], labels: &[f64]) -> ForestModel {
        let n = rows.len();
        let p = rows.first().map_or(0, Vec::len);
        let features_per_split = ((p as f64).sqrt().ceil() as usize).clamp(1, p.max(1));
        let mut rng = Pcg64::seed_from_u64(self.seed);

        let trees = (0..self.n_trees)
            .map(|_| {
                let sample: Vec<usize> = (0..n).map(|_| rng.random_range(0..n)).collect();
                self.build_node(rows, labels, &sample, 0, features_per_split, &mut rng)
            })
            .collect();

        ForestModel { trees }
    }

    fn build_node(
        &self,
        rows: &[Vec<f64>],
        labels: &[f64],
        indices: &[usize],
        depth: usize,
        features_per_split: usize,
        rng: &mut Pcg64,
    ) -> TreeNode {
        let leaf = TreeNode::Leaf {
            value: positive_fraction(labels, indices),
        };
        if depth >= self.max_depth || indices.len() < 2 * self.min_samples_leaf {
            return leaf;
        }
        if indices.iter().all(|&i| labels[i] == labels[indices[0]]) {
            return leaf;
        }

        let p = rows[0].len();
        let candidates = sample_features(p, features_per_split, rng);
        let Some(split) = best_gini_split(rows, labels, indices, &candidates, self.min_samples_leaf)
        else {
            return leaf;
        };

        let (left_idx, right_idx): (Vec<usize>, Vec<usize>) = indices
            .iter()
            .copied()
            .partition(|&i| rows[i][split.feature] <= split.threshold);

        TreeNode::Split {
            feature: split.feature,
            threshold: split.threshold,
            left: Box::new(self.build_node(
                rows,
                labels,
                &left_idx,
                depth + 1,
                features_per_split,
                rng,
            )),
            right: Box::new(self.build_node(
                rows,
                labels,
                &right_idx,
                depth + 1,
                features_per_split,
                rng,
            )),
        }
    }
}

/// A fitted random forest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForestModel {
    trees: Vec<TreeNode>,
}

impl ForestModel {
    /// Positive-class probability for one imputed row: the mean of the
    /// per-tree leaf fractions.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn predict_proba(&self, row: &[f64]) -> f64 {
        if self.trees.is_empty() {
            return 0.5;
        }
        let total: f64 = self.trees.iter().map(|tree| tree.predict(row)).sum();
        total / self.trees.len() as f64
    }

    /// Number of fitted trees.
    #[must_use]
    pub fn num_trees(&self) -> usize {
        self.trees.len()
    }
}

struct SplitCandidate {
    feature: usize,
    threshold: f64,
    impurity: f64,
}

/// Draws a feature subset without replacement.
fn sample_features(p: usize, count: usize, rng: &mut Pcg64) -> Vec<usize> {
    let mut features: Vec<usize> = (0..p).collect();
    for i in 0..count.min(p) {
        let j = rng.random_range(i..p);
        features.swap(i, j);
    }
    features.truncate(count.min(p));
    features
}

#[expect(clippy::cast_precision_loss)]
fn positive_fraction(labels: &[f64], indices: &[usize]) -> f64 {
    if indices.is_empty() {
        return 0.5;
    }
    let positives = indices.iter().filter(|&&i| labels[i] == 1.0).count();
    positives as f64 / indices.len() as f64
}

#[expect(clippy::cast_precision_loss)]
fn gini(n: usize, positives: usize) -> f64 {
    if n == 0 {
        return 0.0;
    }
    let p = positives as f64 / n as f64;
    2.0 * p * (1.0 - p)
}

/// Finds the weighted-Gini-minimizing split over the candidate features.
///
/// Returns `None` when no threshold separates the node within the leaf-size
/// constraint.
#[expect(clippy::cast_precision_loss)]
fn best_gini_split(
    rows: &[Vec<f64>],
    labels: &[f64],
    indices: &[usize],
    candidate_features: &[usize],
    min_samples_leaf: usize,
) -> Option<SplitCandidate> {
    let n = indices.len();
    let mut best: Option<SplitCandidate> = None;

    for &feature in candidate_features {
        let mut ordered: Vec<(f64, f64)> = indices
            .iter()
            .map(|&i| (rows[i][feature], labels[i]))
            .collect();
        ordered.sort_by(|a, b| a.0.total_cmp(&b.0));

        let total_pos = ordered.iter().filter(|(_, y)| *y == 1.0).count();
        let mut left_n = 0;
        let mut left_pos = 0;
        for window in 0..n - 1 {
            left_n += 1;
            if ordered[window].1 == 1.0 {
                left_pos += 1;
            }
            // Only split between distinct values.
            if ordered[window].0 >= ordered[window + 1].0 {
                continue;
            }
            let right_n = n - left_n;
            if left_n < min_samples_leaf || right_n < min_samples_leaf {
                continue;
            }
            let weighted = (left_n as f64 * gini(left_n, left_pos)
                + right_n as f64 * gini(right_n, total_pos - left_pos))
                / n as f64;
            if best.as_ref().is_none_or(|b| weighted < b.impurity) {
                best = Some(SplitCandidate {
                    feature,
                    threshold: f64::midpoint(ordered[window].0, ordered[window + 1].0),
                    impurity: weighted,
                });
            }
        }
    }

    // A split that does not improve on the parent impurity is useless.
    let parent = gini(n, indices.iter().filter(|&&i| labels[i] == 1.0).count());
    best.filter(|candidate| candidate.impurity < parent)
}
