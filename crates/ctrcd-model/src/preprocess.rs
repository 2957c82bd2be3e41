//! Fitted preprocessing steps.
//!
//! Both steps follow the fit-once, apply-anywhere pattern: statistics are
//! computed on the training split and frozen into the serialized pipeline,
//! so the serving path cannot drift from training.

use serde::{Deserialize, Serialize};

use ctrcd_stats::quantile::nan_median;

/// Median imputation fitted on training columns.
///
/// NaN cells are replaced by the training median of their column. A column
/// that was entirely missing in training imputes to 0.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MedianImputer {
    medians: Vec<f64>,
}

impl MedianImputer {
    /// Fits per-column medians on row-major training data.
    #[must_use]
    pub fn fit(rows: &[Vec<f64>]) -> Self {
        let num_features = rows.first().map_or(0, Vec::len);
        let medians = (0..num_features)
            .map(|j| {
                let column: Vec<f64> = rows.iter().map(|row| row[j]).collect();
                let median = nan_median(&column);
                if median.is_nan() { 0.0 } else { median }
            })
            .collect();
        Self { medians }
    }

    /// Fitted training medians, one per column.
    #[must_use]
    pub fn medians(&self) -> &[f64] {
        &self.medians
    }

    /// Imputes one row.
    #[must_use]
    pub fn transform_row(&self, row: &[f64]) -> Vec<f64> {
        row.iter()
            .zip(&self.medians)
            .map(|(&value, &median)| if value.is_nan() { median } else { value })
            .collect()
    }

    /// Imputes a row-major matrix.
    #[must_use]
    pub fn transform(&self, rows: &[Vec<f64>]) -> Vec<Vec<f64>> {
        rows.iter().map(|row| self.transform_row(row)).collect()
    }
}

/// Mean/variance standardization fitted on (already imputed) training
/// columns.
///
/// Constant columns keep a unit scale so they pass through unchanged
/// instead of dividing by zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandardScaler {
    means: Vec<f64>,
    scales: Vec<f64>,
}

impl StandardScaler {
    /// Fits column means and standard deviations.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn fit(rows: &[Vec<f64>]) -> Self {
        let num_features = rows.first().map_or(0, Vec::len);
        let n = rows.len().max(1) as f64;
        let mut means = vec![0.0; num_features];
        for row in rows {
            for (mean, &value) in means.iter_mut().zip(row) {
                *mean += value;
            }
        }
        for mean in &mut means {
            *mean /= n;
        }

        let mut scales = vec![0.0; num_features];
        for row in rows {
            for ((scale, &value), &mean) in scales.iter_mut().zip(row).zip(&means) {
                *scale += (value - mean).powi(2);
            }
        }
        for scale in &mut scales {
            *scale = (*scale / n).sqrt();
            if *scale == 0.0 || !scale.is_finite() {
                *scale = 1.0;
            }
        }

        Self { means, scales }
    }

    /// Standardizes one row.
    #[must_use]
    pub fn transform_row(&self, row: &[f64]) -> Vec<f64> {
        row.iter()
            .zip(self.means.iter().zip(&self.scales))
            .map(|(&value, (&mean, &scale))| (value - mean) / scale)
            .collect()
    }

    /// Standardizes a row-major matrix.
    #[must_use]
    pub fn transform(&self, rows: &[Vec<f64>]) -> Vec<Vec<f64>> {
        rows.iter().map(|row| self.transform_row(row)).collect()
    }
}
