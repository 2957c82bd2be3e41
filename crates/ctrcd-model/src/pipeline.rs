//! Preprocessing + classifier pipelines.
//!
//! A pipeline freezes the preprocessing fitted on the training split next
//! to the classifier itself, so a persisted model replays imputation (and
//! scaling, where used) identically at inference time.

use serde::{Deserialize, Serialize};

use ctrcd_stats::logit::LogitError;

use crate::{
    forest::{ForestModel, ForestTrainer},
    gbdt::{GbdtModel, GbdtTrainer},
    logistic::{LogisticModel, LogisticTrainer},
    preprocess::{MedianImputer, StandardScaler},
};

/// A fitted classifier of any flavor in the bank.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Classifier {
    /// Balanced logistic regression.
    Logistic(LogisticModel),
    /// Random forest.
    RandomForest(ForestModel),
    /// Gradient-boosted trees (histogram or exact).
    GradientBoosting(GbdtModel),
}

impl Classifier {
    fn predict_proba(&self, row: &[f64]) -> f64 {
        match self {
            Classifier::Logistic(model) => model.predict_proba(row),
            Classifier::RandomForest(model) => model.predict_proba(row),
            Classifier::GradientBoosting(model) => model.predict_proba(row),
        }
    }
}

/// Median imputation, optional scaling, and a classifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelPipeline {
    name: String,
    imputer: MedianImputer,
    scaler: Option<StandardScaler>,
    classifier: Classifier,
}

impl ModelPipeline {
    /// Pipeline name, e.g. `"histgbdt"`.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fits imputer → scaler → balanced logistic regression.
    ///
    /// # Errors
    ///
    /// Fails if the penalized Newton solver cannot converge.
    pub fn fit_logistic(
        name: &str,
        rows: &[Vec<f64>],
        labels: &[f64],
        trainer: &LogisticTrainer,
    ) -> Result<Self, LogitError> {
        let imputer = MedianImputer::fit(rows);
        let imputed = imputer.transform(rows);
        let scaler = StandardScaler::fit(&imputed);
        let scaled = scaler.transform(&imputed);
        let model = trainer.fit(&scaled, labels)?;
        Ok(Self {
            name: name.to_owned(),
            imputer,
            scaler: Some(scaler),
            classifier: Classifier::Logistic(model),
        })
    }

    /// Fits imputer → random forest.
    #[must_use]
    pub fn fit_forest(
        name: &str,
        rows: &[Vec<f64>],
        labels: &[f64],
        trainer: &ForestTrainer,
    ) -> Self {
        let imputer = MedianImputer::fit(rows);
        let imputed = imputer.transform(rows);
        let model = trainer.fit(&imputed, labels);
        Self {
            name: name.to_owned(),
            imputer,
            scaler: None,
            classifier: Classifier::RandomForest(model),
        }
    }

    /// Fits imputer → gradient-boosted trees.
    #[must_use]
    pub fn fit_gbdt(name: &str, rows: &[Vec<f64>], labels: &[f64], trainer: &GbdtTrainer) -> Self {
        let imputer = MedianImputer::fit(rows);
        let imputed = imputer.transform(rows);
        let model = trainer.fit(&imputed, labels);
        Self {
            name: name.to_owned(),
            imputer,
            scaler: None,
            classifier: Classifier::GradientBoosting(model),
        }
    }

    /// Positive-class probability for one raw (possibly NaN) feature row.
    #[must_use]
    pub fn predict_proba_row(&self, row: &[f64]) -> f64 {
        let mut row = self.imputer.transform_row(row);
        if let Some(scaler) = &self.scaler {
            row = scaler.transform_row(&row);
        }
        self.classifier.predict_proba(&row)
    }

    /// Positive-class probabilities for raw row-major data.
    #[must_use]
    pub fn predict_proba(&self, rows: &[Vec<f64>]) -> Vec<f64> {
        rows.iter().map(|row| self.predict_proba_row(row)).collect()
    }
}
