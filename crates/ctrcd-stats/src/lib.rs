//! Statistical primitives for the CTRCD risk pipeline.
//!
//! This crate provides the numeric core shared by the analysis and modeling
//! crates:
//!
//! - **Descriptive statistics**: NaN-aware summaries of clinical columns
//! - **Quantiles**: medians and percentiles over partially-missing data
//! - **Linear algebra**: Cholesky factorization, solve, and inverse for the
//!   symmetric positive-definite systems of the Newton solver
//! - **Logistic MLE**: maximum-likelihood logistic regression with
//!   coefficient covariance, Wald z-statistics, and p-values
//!
//! # Missing data
//!
//! Clinical columns carry NaN for missing values. The descriptive and
//! quantile functions skip NaN; the logistic fit expects a fully-imputed
//! design matrix and makes no attempt to handle NaN itself.
//!
//! # Examples
//!
//! ## Summarizing a column
//!
//! ```
//! use ctrcd_stats::descriptive::DescriptiveStats;
//!
//! let lvef = [58.0, f64::NAN, 47.0, 62.0];
//! let stats = DescriptiveStats::new(lvef).unwrap();
//! assert_eq!(stats.count, 3);
//! assert_eq!(stats.missing, 1);
//! assert!((stats.min - 47.0).abs() < 1e-12);
//! ```
//!
//! ## Fitting a logistic model
//!
//! ```
//! use ctrcd_stats::logit::{self, LogitOptions};
//! use ndarray::array;
//!
//! let x = logit::add_intercept(&array![[0.0], [1.0], [2.0], [3.0], [4.0], [5.0]]);
//! let y = [0.0, 0.0, 1.0, 0.0, 1.0, 1.0];
//! let fit = logit::fit(&x, &y, &LogitOptions::default()).unwrap();
//! assert!(fit.coefficients[1] > 0.0);
//! ```

pub mod descriptive;
pub mod linalg;
pub mod logit;
pub mod quantile;
