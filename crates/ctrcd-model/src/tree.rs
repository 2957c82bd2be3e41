//! Shared decision-tree node representation.
//!
//! Both the random forest and the boosting engine grow binary trees over
//! fully-imputed rows, so nodes need no missing-direction handling: a row
//! goes left when its feature value is at or below the threshold.

use serde::{Deserialize, Serialize};

/// One node of a fitted binary decision tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "node", rename_all = "snake_case")]
pub enum TreeNode {
    /// Terminal node carrying the prediction value.
    ///
    /// For forest trees this is the positive-class fraction; for boosting
    /// trees it is the (shrunken) additive score contribution.
    Leaf {
        /// Prediction value.
        value: f64,
    },
    /// Internal split: `feature <= threshold` goes left.
    Split {
        /// Feature column index.
        feature: usize,
        /// Split threshold.
        threshold: f64,
        /// Subtree for rows at or below the threshold.
        left: Box<TreeNode>,
        /// Subtree for rows above the threshold.
        right: Box<TreeNode>,
    },
}

impl TreeNode {
    /// Evaluates the tree on one imputed row.
    #[must_use]
    pub fn predict(&self, row: &[f64]) -> f64 {
        match self {
            TreeNode::Leaf { value } => *value,
            TreeNode::Split {
                feature,
                threshold,
                left,
                right,
            } => {
                if row[*feature] <= *threshold {
                    left.predict(row)
                } else {
                    right.predict(row)
                }
            }
        }
    }

    /// Number of leaves in the tree.
    #[must_use]
    pub fn num_leaves(&self) -> usize {
        match self {
            TreeNode::Leaf { .. } => 1,
            TreeNode::Split { left, right, .. } => left.num_leaves() + right.num_leaves(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stump() -> TreeNode {
        TreeNode::Split {
            feature: 1,
            threshold: 0.5,
            left: Box::new(TreeNode::Leaf { value: 0.2 }),
            right: Box::new(TreeNode::Leaf { value: 0.9 }),
        }
    }

    #[test]
    fn routes_on_the_threshold() {
        let tree = stump();
        assert!((tree.predict(&[0.0, 0.5]) - 0.2).abs() < f64::EPSILON);
        assert!((tree.predict(&[0.0, 0.51]) - 0.9).abs() < f64::EPSILON);
    }

    #[test]
    fn counts_leaves() {
        assert_eq!(stump().num_leaves(), 2);
        assert_eq!((TreeNode::Leaf { value: 0.0 }).num_leaves(), 1);
    }
}
