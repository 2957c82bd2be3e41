//! Quantiles over partially-missing data.

/// Median of pre-sorted finite values; the mean of the middle pair for even
/// counts. Returns NaN for an empty slice.
///
/// # Examples
///
/// ```
/// use ctrcd_stats::quantile::median_sorted;
///
/// assert!((median_sorted(&[1.0, 2.0, 3.0]) - 2.0).abs() < 1e-12);
/// assert!((median_sorted(&[1.0, 2.0, 3.0, 4.0]) - 2.5).abs() < 1e-12);
/// assert!(median_sorted(&[]).is_nan());
/// ```
#[must_use]
pub fn median_sorted(sorted_values: &[f64]) -> f64 {
    let n = sorted_values.len();
    if n == 0 {
        return f64::NAN;
    }
    if n % 2 == 1 {
        sorted_values[n / 2]
    } else {
        f64::midpoint(sorted_values[n / 2 - 1], sorted_values[n / 2])
    }
}

/// Median of unsorted values, skipping NaN entries.
///
/// Returns NaN when every value is missing. This is the imputation
/// statistic: a column observed nowhere has no median and the caller
/// decides what to substitute.
///
/// # Examples
///
/// ```
/// use ctrcd_stats::quantile::nan_median;
///
/// assert!((nan_median(&[3.0, f64::NAN, 1.0, 2.0]) - 2.0).abs() < 1e-12);
/// assert!(nan_median(&[f64::NAN]).is_nan());
/// ```
#[must_use]
pub fn nan_median(values: &[f64]) -> f64 {
    let mut finite: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    finite.sort_by(f64::total_cmp);
    median_sorted(&finite)
}

/// Nearest-rank quantile of pre-sorted finite values.
///
/// `q` is in [0, 1]. Returns NaN for an empty slice.
///
/// # Panics
///
/// Panics in debug builds if `sorted_values` is not sorted ascending.
///
/// # Examples
///
/// ```
/// use ctrcd_stats::quantile::quantile_sorted;
///
/// let values = [1.0, 2.0, 3.0, 4.0, 5.0];
/// assert!((quantile_sorted(&values, 0.0) - 1.0).abs() < 1e-12);
/// assert!((quantile_sorted(&values, 1.0) - 5.0).abs() < 1e-12);
/// ```
#[expect(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
#[must_use]
pub fn quantile_sorted(sorted_values: &[f64], q: f64) -> f64 {
    debug_assert!(
        sorted_values.is_sorted_by(|a, b| a <= b),
        "values must be sorted in ascending order"
    );
    if sorted_values.is_empty() {
        return f64::NAN;
    }
    let idx = ((sorted_values.len() as f64 * q) as usize).min(sorted_values.len() - 1);
    sorted_values[idx]
}
