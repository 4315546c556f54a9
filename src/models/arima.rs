//! Differenced autoregressive forecasting (ARIMA / seasonal ARIMA without MA terms).
//!
//! A model is described by an [`ArimaSpec`]: the autoregressive order, the
//! number of ordinary differences `d`, and the number of seasonal differences
//! `D` at lag `s`. Fitting works in three steps:
//!
//! 1. apply the differencing polynomial `(1 - B)^d (1 - B^s)^D` to the series
//! 2. regress the differenced series on its own lags (conditional least
//!    squares, no intercept, no stationarity constraint)
//! 3. keep the original history so forecasts can be integrated back
//!
//! Forecasting runs the AR recursion on the differenced scale and inverts the
//! differencing polynomial one step at a time.

use crate::error::AppError;
use crate::math::{lag_design, solve_least_squares};

/// Model orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArimaSpec {
    /// Autoregressive order `p`.
    pub ar: usize,
    /// Ordinary differencing order `d`.
    pub diff: usize,
    /// Seasonal differencing order `D`.
    pub seasonal_diff: usize,
    /// Seasonal lag `s` (ignored when `seasonal_diff == 0`).
    pub period: usize,
}

/// ARIMA(5,1,0).
pub const ARIMA_5_1_0: ArimaSpec = ArimaSpec {
    ar: 5,
    diff: 1,
    seasonal_diff: 0,
    period: 0,
};

/// SARIMA(1,1,0)(0,1,0,12).
pub const SARIMA_1_1_0_0_1_0_12: ArimaSpec = ArimaSpec {
    ar: 1,
    diff: 1,
    seasonal_diff: 1,
    period: 12,
};

impl ArimaSpec {
    /// Human-readable label for logs.
    pub fn label(&self) -> String {
        if self.seasonal_diff == 0 {
            format!("ARIMA({},{},0)", self.ar, self.diff)
        } else {
            format!(
                "SARIMA({},{},0)(0,{},0,{})",
                self.ar, self.diff, self.seasonal_diff, self.period
            )
        }
    }

    /// Coefficients `c_0..c_k` of `(1 - B)^d (1 - B^s)^D`, with `c_0 = 1`.
    pub fn difference_polynomial(&self) -> Vec<f64> {
        let mut poly = vec![1.0];
        for _ in 0..self.diff {
            poly = poly_mul(&poly, &[1.0, -1.0]);
        }
        if self.period > 0 {
            let mut seasonal = vec![0.0; self.period + 1];
            seasonal[0] = 1.0;
            seasonal[self.period] = -1.0;
            for _ in 0..self.seasonal_diff {
                poly = poly_mul(&poly, &seasonal);
            }
        }
        poly
    }

    /// Smallest series length for which the lag regression is overdetermined.
    pub fn min_observations(&self) -> usize {
        let lost = self.difference_polynomial().len() - 1;
        lost + 2 * self.ar + 1
    }

    fn validate(&self) -> Result<(), AppError> {
        if self.seasonal_diff > 0 && self.period < 2 {
            return Err(AppError::failed(format!(
                "Seasonal period must be >= 2 for seasonal differencing (got {}).",
                self.period
            )));
        }
        Ok(())
    }
}

fn poly_mul(a: &[f64], b: &[f64]) -> Vec<f64> {
    let mut out = vec![0.0; a.len() + b.len() - 1];
    for (i, &x) in a.iter().enumerate() {
        for (j, &y) in b.iter().enumerate() {
            out[i + j] += x * y;
        }
    }
    out
}

/// Apply a differencing polynomial; the first `poly.len() - 1` points are consumed.
pub fn apply_difference(series: &[f64], poly: &[f64]) -> Vec<f64> {
    let k = poly.len().saturating_sub(1);
    if series.len() <= k {
        return Vec::new();
    }
    (k..series.len())
        .map(|t| poly.iter().enumerate().map(|(j, c)| c * series[t - j]).sum())
        .collect()
}

/// A fitted model, ready to forecast.
#[derive(Debug, Clone)]
pub struct ArimaFit {
    spec: ArimaSpec,
    poly: Vec<f64>,
    coefficients: Vec<f64>,
    history: Vec<f64>,
    differenced: Vec<f64>,
    sigma2: f64,
}

/// Fit `spec` to `series`.
pub fn fit_arima(series: &[f64], spec: ArimaSpec) -> Result<ArimaFit, AppError> {
    spec.validate()?;

    let required = spec.min_observations();
    if series.len() < required {
        return Err(AppError::failed(format!(
            "{} needs at least {required} observations, got {}.",
            spec.label(),
            series.len()
        )));
    }
    if series.iter().any(|v| !v.is_finite()) {
        return Err(AppError::failed("Series contains non-finite values."));
    }

    let poly = spec.difference_polynomial();
    let differenced = apply_difference(series, &poly);

    let (coefficients, sigma2) = if spec.ar == 0 {
        let sigma2 = differenced.iter().map(|w| w * w).sum::<f64>() / differenced.len() as f64;
        (Vec::new(), sigma2)
    } else {
        let (x, y) = lag_design(&differenced, spec.ar)
            .ok_or_else(|| AppError::failed("Not enough differenced observations for the lag regression."))?;
        let beta = solve_least_squares(&x, &y).ok_or_else(|| {
            AppError::failed(format!("Least squares failed while fitting {}.", spec.label()))
        })?;
        let resid = &y - &x * &beta;
        let sigma2 = resid.norm_squared() / resid.len() as f64;
        (beta.iter().copied().collect(), sigma2)
    };

    Ok(ArimaFit {
        spec,
        poly,
        coefficients,
        history: series.to_vec(),
        differenced,
        sigma2,
    })
}

impl ArimaFit {
    pub fn spec(&self) -> ArimaSpec {
        self.spec
    }

    /// AR coefficients `φ_1..φ_p` on the differenced scale.
    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    /// Mean squared in-sample one-step error on the differenced scale.
    pub fn residual_variance(&self) -> f64 {
        self.sigma2
    }

    /// Project `steps` values past the end of the fitted series.
    pub fn forecast(&self, steps: usize) -> Vec<f64> {
        let mut y = self.history.clone();
        let mut w = self.differenced.clone();
        let mut out = Vec::with_capacity(steps);

        for _ in 0..steps {
            let w_next: f64 = self
                .coefficients
                .iter()
                .enumerate()
                .map(|(k, phi)| phi * w.get(w.len().wrapping_sub(k + 1)).copied().unwrap_or(0.0))
                .sum();

            // Invert Σ c_j y_{t-j} = w_t for y_t (c_0 = 1).
            let carried: f64 = self
                .poly
                .iter()
                .enumerate()
                .skip(1)
                .map(|(j, c)| c * y[y.len() - j])
                .sum();
            let y_next = w_next - carried;

            w.push(w_next);
            y.push(y_next);
            out.push(y_next);
        }

        out
    }
}
