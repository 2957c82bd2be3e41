//! The classifier bank for the CTRCD risk pipeline.
//!
//! This crate trains and persists the binary classifiers compared by the
//! `analyze` subcommand:
//!
//! - **Logistic regression** with balanced class weights, on standardized
//!   features
//! - **Random forest**: bagged Gini trees with per-split feature
//!   subsampling
//! - **Histogram gradient boosting** with a monotonic constraint on LVEF
//! - **Weighted gradient boosting**: exact splits with a positive-class
//!   weight for the imbalanced outcome
//!
//! Every classifier is wrapped in a [`pipeline::ModelPipeline`] that owns
//! the median imputer (and, for the linear model, the scaler) fitted on the
//! training split, so inference replays preprocessing exactly.
//!
//! # Determinism
//!
//! All randomized steps (train/test split, bootstrap resampling, feature
//! subsampling) run on a seeded [`rand_pcg::Pcg64`], so a rerun over the
//! same CSV reproduces the same models and metrics.
//!
//! # Persistence
//!
//! The winning pipeline is serialized as a JSON [`artifact::ModelArtifact`]
//! carrying the ordered feature-name list; the serving shim refuses to
//! guess feature order and always follows the stored list.
//!
//! # Examples
//!
//! ```
//! use ctrcd_model::{forest::ForestTrainer, pipeline::ModelPipeline};
//!
//! // Low first feature is benign, high is an event.
//! let rows: Vec<Vec<f64>> = (0..20)
//!     .map(|i| vec![f64::from(i) / 20.0, 0.0])
//!     .collect();
//! let labels: Vec<f64> = (0..20).map(|i| f64::from(u8::from(i >= 10))).collect();
//! let trainer = ForestTrainer { n_trees: 20, ..ForestTrainer::default() };
//! let model = ModelPipeline::fit_forest("random_forest", &rows, &labels, &trainer);
//! assert!(model.predict_proba_row(&[0.9, 0.0]) > 0.5);
//! assert!(model.predict_proba_row(&[0.05, 0.0]) < 0.5);
//! ```

pub mod artifact;
pub mod forest;
pub mod gbdt;
pub mod logistic;
pub mod pipeline;
pub mod preprocess;
pub mod split;
pub mod tree;
