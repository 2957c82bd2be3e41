//! Odds-ratio table fitting.

use ndarray::Array2;

use ctrcd_model::preprocess::MedianImputer;
use ctrcd_stats::logit::{self, LogitError, LogitOptions};

/// How many leading feature columns the fallback fit keeps.
const FALLBACK_FEATURES: usize = 8;

/// Confidence level for the reported intervals.
const CONFIDENCE_LEVEL: f64 = 0.95;

/// Error from the odds-ratio analysis.
#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum AnalysisError {
    /// There is nothing to fit.
    #[display("no usable feature columns after dropping near-constant ones")]
    NoUsableColumns,
    /// Both the full fit and the reduced-feature fallback failed.
    #[display("logistic fit failed even on the first {FALLBACK_FEATURES} features")]
    FitFailed(LogitError),
}

/// One coefficient of the fitted model, on the odds-ratio scale.
#[derive(Debug, Clone)]
pub struct OddsRatioRow {
    /// Feature name, or `"const"` for the intercept.
    pub feature: String,
    /// Exponentiated coefficient.
    pub odds_ratio: f64,
    /// Lower bound of the 95% confidence interval.
    pub ci_low: f64,
    /// Upper bound of the 95% confidence interval.
    pub ci_high: f64,
    /// Two-sided Wald p-value.
    pub p_value: f64,
}

/// A fitted odds-ratio table with its provenance.
#[derive(Debug, Clone)]
pub struct OddsRatioTable {
    /// One row per retained coefficient, intercept first.
    pub rows: Vec<OddsRatioRow>,
    /// Near-constant columns dropped before fitting.
    pub dropped_columns: Vec<String>,
    /// Whether the reduced-feature fallback was needed.
    pub reduced: bool,
}

/// Fits the odds-ratio table on training data.
///
/// `names` and `rows` describe the (possibly NaN) training feature matrix;
/// `labels` holds the 0/1 outcomes.
///
/// # Errors
///
/// Fails when no informative column survives, or when both the full fit
/// and the first-[`FALLBACK_FEATURES`] fallback fail.
pub fn fit_odds_ratio_table(
    names: &[String],
    rows: &[Vec<f64>],
    labels: &[f64],
) -> Result<OddsRatioTable, AnalysisError> {
    let imputer = MedianImputer::fit(rows);
    let imputed = imputer.transform(rows);

    // Near-constant columns carry no likelihood information.
    let mut kept = Vec::new();
    let mut dropped_columns = Vec::new();
    for (j, name) in names.iter().enumerate() {
        if distinct_count(&imputed, j) > 1 {
            kept.push(j);
        } else {
            dropped_columns.push(name.clone());
        }
    }
    if kept.is_empty() {
        return Err(AnalysisError::NoUsableColumns);
    }

    let options = LogitOptions::default();
    let (fit, used, reduced) = match fit_on(&imputed, &kept, labels, &options) {
        Ok(fit) => (fit, kept.clone(), false),
        Err(_) => {
            let fallback: Vec<usize> = kept.iter().copied().take(FALLBACK_FEATURES).collect();
            let fit = fit_on(&imputed, &fallback, labels, &options)
                .map_err(AnalysisError::FitFailed)?;
            (fit, fallback, true)
        }
    };

    let mut table_rows = Vec::with_capacity(used.len() + 1);
    for (coef_idx, feature) in std::iter::once("const".to_owned())
        .chain(used.iter().map(|&j| names[j].clone()))
        .enumerate()
    {
        let (lo, hi) = fit.confidence_interval(coef_idx, CONFIDENCE_LEVEL);
        table_rows.push(OddsRatioRow {
            feature,
            odds_ratio: fit.coefficients[coef_idx].exp(),
            ci_low: lo.exp(),
            ci_high: hi.exp(),
            p_value: fit.p_value(coef_idx),
        });
    }

    Ok(OddsRatioTable {
        rows: table_rows,
        dropped_columns,
        reduced,
    })
}

fn fit_on(
    imputed: &[Vec<f64>],
    columns: &[usize],
    labels: &[f64],
    options: &LogitOptions,
) -> Result<logit::LogitFit, LogitError> {
    let n = imputed.len();
    let mut design = Array2::<f64>::zeros((n, columns.len()));
    for (i, row) in imputed.iter().enumerate() {
        for (slot, &j) in columns.iter().enumerate() {
            design[[i, slot]] = row[j];
        }
    }
    logit::fit(&logit::add_intercept(&design), labels, options)
}

/// Number of distinct values in an imputed column.
fn distinct_count(rows: &[Vec<f64>], column: usize) -> usize {
    let mut values: Vec<f64> = rows.iter().map(|row| row[column]).collect();
    values.sort_by(f64::total_cmp);
    values.dedup();
    values.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|&s| s.to_owned()).collect()
    }

    fn risk_data() -> (Vec<String>, Vec<Vec<f64>>, Vec<f64>) {
        // First column drives the outcome, second is noise, third is
        // constant after imputation.
        let mut rows = Vec::new();
        let mut labels = Vec::new();
        for i in 0..60 {
            let x = f64::from(i) / 10.0;
            let noise = f64::from(i % 4);
            rows.push(vec![x, noise, 1.0]);
            labels.push(f64::from(u8::from(i % 10 >= 7 || i > 40)));
        }
        (names(&["exposure", "noise", "flat"]), rows, labels)
    }

    #[test]
    fn intercept_comes_first_and_constants_are_dropped() {
        let (names, rows, labels) = risk_data();
        let table = fit_odds_ratio_table(&names, &rows, &labels).unwrap();
        assert_eq!(table.dropped_columns, vec!["flat".to_owned()]);
        assert!(!table.reduced);
        assert_eq!(table.rows.len(), 3); // const + exposure + noise
        assert_eq!(table.rows[0].feature, "const");
        assert_eq!(table.rows[1].feature, "exposure");
    }

    #[test]
    fn risk_factor_has_odds_ratio_above_one() {
        let (names, rows, labels) = risk_data();
        let table = fit_odds_ratio_table(&names, &rows, &labels).unwrap();
        let exposure = &table.rows[1];
        assert!(exposure.odds_ratio > 1.0);
        assert!(exposure.ci_low <= exposure.odds_ratio);
        assert!(exposure.ci_high >= exposure.odds_ratio);
        assert!((0.0..=1.0).contains(&exposure.p_value));
    }

    #[test]
    fn all_constant_design_is_rejected() {
        let names = names(&["a", "b"]);
        let rows = vec![vec![1.0, 0.0]; 10];
        let labels = vec![0.0, 1.0, 0.0, 1.0, 0.0, 1.0, 0.0, 1.0, 0.0, 1.0];
        assert!(matches!(
            fit_odds_ratio_table(&names, &rows, &labels),
            Err(AnalysisError::NoUsableColumns)
        ));
    }

    #[test]
    fn separable_design_falls_back_to_leading_features() {
        // Ten noisy leading columns keep the fallback fittable; the last
        // column separates the classes perfectly and sinks the full fit.
        let mut rows = Vec::new();
        let mut labels = Vec::new();
        for i in 0..40 {
            let y = f64::from(u8::from(i % 2 == 0));
            let mut row: Vec<f64> = (0..10)
                .map(|j| f64::from((i * 7 + j * 3) % 11))
                .collect();
            row.push(y * 1000.0);
            rows.push(row);
            labels.push(y);
        }
        let mut names: Vec<String> = (0..10).map(|j| format!("x{j}")).collect();
        names.push("separator".to_owned());

        let table = fit_odds_ratio_table(&names, &rows, &labels).unwrap();
        assert!(table.reduced);
        // const + first 8 features.
        assert_eq!(table.rows.len(), 9);
        assert!(table.rows.iter().all(|row| row.feature != "separator"));
    }
}
