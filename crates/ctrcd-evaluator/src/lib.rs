//! Held-out evaluation for the CTRCD model bank.
//!
//! Every fitted pipeline is scored the same way:
//!
//! - **ROC-AUC** and the full ROC curve
//! - **PR-AUC** (average precision) and the full precision-recall curve
//! - **Classification reports** at the fixed 0.5 threshold and at the
//!   threshold maximizing F1 along the PR curve
//! - A two-panel ROC/PR figure rendered to SVG
//!
//! # Threshold choice
//!
//! CTRCD is rare, so the 0.5 default is rarely the operating point anyone
//! wants; the best-F1 threshold gives a second, prevalence-aware reading of
//! the same scores. Both reports go into `metrics.txt` so the comparison is
//! part of the record.
//!
//! # Examples
//!
//! ```
//! use ctrcd_evaluator::metrics;
//!
//! let labels = [0.0, 0.0, 1.0, 1.0];
//! let scores = [0.1, 0.4, 0.35, 0.8];
//! let auc = metrics::roc_auc(&labels, &scores);
//! assert!((auc - 0.75).abs() < 1e-12);
//! ```

pub mod metrics;
pub mod plot;
pub mod report;
