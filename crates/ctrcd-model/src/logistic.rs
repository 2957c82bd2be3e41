//! Balanced-class logistic regression classifier.
//!
//! A thin classifier wrapper around the maximum-likelihood solver in
//! `ctrcd_stats::logit`: balanced class weights for the imbalanced CTRCD
//! outcome, an L2 penalty for stability on collinear flag columns, and a
//! serializable coefficient set for the pipeline artifact.

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use ctrcd_stats::logit::{self, LogitError, LogitOptions};

/// Hyperparameters for the logistic classifier.
#[derive(Debug, Clone)]
pub struct LogisticTrainer {
    /// Newton iteration cap.
    pub max_iter: usize,
    /// L2 penalty on non-intercept coefficients.
    pub l2: f64,
    /// Reweight classes to equal total mass (`n / (2 * n_class)`).
    pub balanced: bool,
}

impl Default for LogisticTrainer {
    fn default() -> Self {
        Self {
            max_iter: 200,
            l2: 1.0,
            balanced: true,
        }
    }
}

impl LogisticTrainer {
    /// Fits the classifier on imputed, scaled training rows.
    ///
    /// # Errors
    ///
    /// Fails if the penalized Newton iteration cannot converge or the
    /// design is degenerate.
    #[expect(clippy::cast_precision_loss)]
    pub fn fit(&self, rows: &[Vec<f64>], labels: &[f64]) -> Result<LogisticModel, LogitError> {
        let n = rows.len();
        let p = rows.first().map_or(0, Vec::len);
        let mut design = Array2::<f64>::zeros((n, p));
        for (i, row) in rows.iter().enumerate() {
            for (j, &value) in row.iter().enumerate() {
                design[[i, j]] = value;
            }
        }
        let design = logit::add_intercept(&design);

        let weights = self.balanced.then(|| {
            let n_pos = labels.iter().filter(|&&y| y == 1.0).count().max(1);
            let n_neg = (n - labels.iter().filter(|&&y| y == 1.0).count()).max(1);
            let w_pos = n as f64 / (2.0 * n_pos as f64);
            let w_neg = n as f64 / (2.0 * n_neg as f64);
            labels
                .iter()
                .map(|&y| if y == 1.0 { w_pos } else { w_neg })
                .collect::<Vec<f64>>()
        });

        let options = LogitOptions {
            max_iter: self.max_iter,
            l2: self.l2,
            ..LogitOptions::default()
        };
        let fit = logit::fit_weighted(&design, labels, weights.as_deref(), &options)?;

        let mut coefficients = fit.coefficients.to_vec();
        let intercept = coefficients.remove(0);
        Ok(LogisticModel {
            intercept,
            weights: coefficients,
        })
    }
}

/// A fitted logistic classifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticModel {
    intercept: f64,
    weights: Vec<f64>,
}

impl LogisticModel {
    /// Positive-class probability for one (imputed, scaled) row.
    #[must_use]
    pub fn predict_proba(&self, row: &[f64]) -> f64 {
        let eta = self.intercept
            + row
                .iter()
                .zip(&self.weights)
                .map(|(&x, &w)| x * w)
                .sum::<f64>();
        logit::sigmoid(eta)
    }

    /// Fitted non-intercept coefficients.
    #[must_use]
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }
}
