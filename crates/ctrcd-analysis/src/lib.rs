//! Interpretability analysis for the CTRCD risk pipeline.
//!
//! While the model bank optimizes ranking performance, clinicians read
//! effect sizes. This crate fits an unpenalized maximum-likelihood logistic
//! regression on the training split and reports odds ratios with
//! confidence intervals and p-values, one row per retained coefficient.
//!
//! # Pipeline
//!
//! 1. Median-impute the training matrix (the same imputer the model bank
//!    uses)
//! 2. Drop near-constant columns, which carry no likelihood information
//!    and break the information matrix
//! 3. Fit by Newton-Raphson; if the fit fails on the full design, retry
//!    with only the first eight feature columns
//! 4. Exponentiate coefficients and CI bounds into odds ratios
//!
//! The fallback and any dropped columns are reported in the result rather
//! than printed here, so the CLI owns all user-facing warnings.

pub mod or_table;

pub use self::or_table::{AnalysisError, OddsRatioRow, OddsRatioTable};
