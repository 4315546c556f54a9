//! Least squares solver.
//!
//! Autoregressive coefficients are estimated by conditional least squares:
//!
//! ```text
//! minimize Σ (w_t - Σ_k φ_k w_{t-k})^2
//! ```
//!
//! which is an ordinary regression of each value on its own lags. The design
//! matrix is tall (thousands of rows, a handful of columns), so we solve it
//! through an SVD rather than a square-system decomposition.

use nalgebra::{DMatrix, DVector};

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to produce a finite
/// solution at any of the tolerances tried.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    if x.nrows() != y.len() || x.nrows() < x.ncols() || x.ncols() == 0 {
        return None;
    }

    let svd = x.clone().svd(true, true);

    // Constant or near-constant differenced series produce (almost) collinear
    // lag columns; loosen the singular value cutoff before giving up.
    for &tol in &[1e-10, 1e-8, 1e-6] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}

/// Build the lag design for an AR(`p`) regression without intercept.
///
/// Row `i` holds `[w_{t-1}, .., w_{t-p}]` for `t = p + i`, and the matching
/// response entry is `w_t`.
pub fn lag_design(series: &[f64], p: usize) -> Option<(DMatrix<f64>, DVector<f64>)> {
    if p == 0 || series.len() <= p {
        return None;
    }
    let rows = series.len() - p;
    let x = DMatrix::from_fn(rows, p, |i, k| series[p + i - 1 - k]);
    let y = DVector::from_iterator(rows, series[p..].iter().copied());
    Some((x, y))
}
