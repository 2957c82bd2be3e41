//! Dense linear algebra for symmetric positive-definite systems.
//!
//! The Newton step of the logistic solver needs `H⁻¹g` and the coefficient
//! covariance needs `H⁻¹` itself. `H = XᵀWX` is symmetric positive-definite
//! whenever the design has full column rank, so a Cholesky factorization
//! covers both without pulling in a LAPACK binding.

use ndarray::{Array1, Array2};

/// Lower-triangular Cholesky factor of a symmetric positive-definite
/// matrix.
///
/// Returns `None` when the matrix is not positive definite (a collinear or
/// degenerate design).
#[must_use]
pub fn cholesky(a: &Array2<f64>) -> Option<Array2<f64>> {
    let n = a.nrows();
    if n != a.ncols() {
        return None;
    }
    let mut l = Array2::<f64>::zeros((n, n));
    for i in 0..n {
        for j in 0..=i {
            let mut sum = a[[i, j]];
            for k in 0..j {
                sum -= l[[i, k]] * l[[j, k]];
            }
            if i == j {
                if sum <= 0.0 || !sum.is_finite() {
                    return None;
                }
                l[[i, j]] = sum.sqrt();
            } else {
                l[[i, j]] = sum / l[[j, j]];
            }
        }
    }
    Some(l)
}

/// Solves `A x = b` for symmetric positive-definite `A` via Cholesky.
///
/// # Examples
///
/// ```
/// use ctrcd_stats::linalg::solve_spd;
/// use ndarray::array;
///
/// let a = array![[4.0, 2.0], [2.0, 3.0]];
/// let b = array![2.0, 1.0];
/// let x = solve_spd(&a, &b).unwrap();
/// assert!((a.dot(&x) - b).iter().all(|r| r.abs() < 1e-10));
/// ```
#[must_use]
pub fn solve_spd(a: &Array2<f64>, b: &Array1<f64>) -> Option<Array1<f64>> {
    let l = cholesky(a)?;
    Some(solve_with_factor(&l, b))
}

/// Inverse of a symmetric positive-definite matrix via Cholesky.
#[must_use]
pub fn invert_spd(a: &Array2<f64>) -> Option<Array2<f64>> {
    let n = a.nrows();
    let l = cholesky(a)?;
    let mut inv = Array2::<f64>::zeros((n, n));
    for j in 0..n {
        let mut unit = Array1::<f64>::zeros(n);
        unit[j] = 1.0;
        let column = solve_with_factor(&l, &unit);
        inv.column_mut(j).assign(&column);
    }
    Some(inv)
}

/// Forward then backward substitution with a precomputed lower factor.
fn solve_with_factor(l: &Array2<f64>, b: &Array1<f64>) -> Array1<f64> {
    let n = l.nrows();

    // L y = b
    let mut y = Array1::<f64>::zeros(n);
    for i in 0..n {
        let mut sum = b[i];
        for k in 0..i {
            sum -= l[[i, k]] * y[k];
        }
        y[i] = sum / l[[i, i]];
    }

    // Lᵀ x = y
    let mut x = Array1::<f64>::zeros(n);
    for i in (0..n).rev() {
        let mut sum = y[i];
        for k in (i + 1)..n {
            sum -= l[[k, i]] * x[k];
        }
        x[i] = sum / l[[i, i]];
    }
    x
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn factor_of_identity_is_identity() {
        let identity = Array2::<f64>::eye(3);
        let l = cholesky(&identity).unwrap();
        assert!((&l - &identity).iter().all(|d| d.abs() < 1e-12));
    }

    #[test]
    fn solve_recovers_known_solution() {
        let a = array![[6.0, 2.0, 1.0], [2.0, 5.0, 2.0], [1.0, 2.0, 4.0]];
        let expected = array![1.0, -2.0, 3.0];
        let b = a.dot(&expected);
        let x = solve_spd(&a, &b).unwrap();
        assert!((&x - &expected).iter().all(|d| d.abs() < 1e-9));
    }

    #[test]
    fn inverse_times_matrix_is_identity() {
        let a = array![[4.0, 1.0], [1.0, 3.0]];
        let inv = invert_spd(&a).unwrap();
        let product = a.dot(&inv);
        let identity = Array2::<f64>::eye(2);
        assert!((&product - &identity).iter().all(|d| d.abs() < 1e-10));
    }

    #[test]
    fn indefinite_matrix_is_rejected() {
        let a = array![[1.0, 2.0], [2.0, 1.0]];
        assert!(cholesky(&a).is_none());
    }

    #[test]
    fn collinear_design_is_rejected() {
        let a = array![[1.0, 1.0], [1.0, 1.0]];
        assert!(cholesky(&a).is_none());
    }
}
