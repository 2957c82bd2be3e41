//! Feature engineering for the CTRCD risk pipeline.
//!
//! This crate turns cleaned clinical columns into the fixed-order feature
//! matrix consumed by every model, and exposes the same derivations for the
//! single-record path of the prediction endpoint.
//!
//! # Overview
//!
//! Derived features:
//!
//! - **BMI** from weight and height, invalidated outside the plausible
//!   [10, 60] band
//! - **Comorbidity score**: count of ten cardiovascular risk flags
//! - **LVEF bands**: low (<50) / mid ([50, 60)) / high (≥60) indicators
//! - **Interactions**: `LVEF_low` crossed with the two active-treatment
//!   flags
//!
//! # Training/serving parity
//!
//! The batch matrix builder and the serving row builder both go through
//! [`matrix::derive_row`], so a record scored at the endpoint sees exactly
//! the arithmetic its training data saw. The serving side orders its output
//! by the feature list persisted with the model artifact, which keeps old
//! artifacts scoreable even if the canonical column order changes later.
//!
//! # Examples
//!
//! ```
//! use ctrcd_dataset::ClinicalField;
//! use ctrcd_features::matrix::{self, FEATURE_COLUMNS};
//!
//! // A record with only weight and height known.
//! let row = matrix::derive_row(|field| match field {
//!     ClinicalField::Weight => 70.0,
//!     ClinicalField::Height => 175.0,
//!     _ => f64::NAN,
//! });
//! assert_eq!(row.len(), FEATURE_COLUMNS.len());
//!
//! let bmi_idx = FEATURE_COLUMNS.iter().position(|&n| n == "BMI").unwrap();
//! assert!((row[bmi_idx] - 22.857).abs() < 1e-3);
//! ```

pub mod derive;
pub mod export;
pub mod matrix;
