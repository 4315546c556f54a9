//! Classical additive seasonal decomposition.
//!
//! `observed = trend + seasonal + residual`, where
//!
//! - `trend` is a centred moving average over one period (a `2 × m` average
//!   for even periods so the window stays centred)
//! - `seasonal` is the mean detrended value at each phase of the period,
//!   shifted to average zero over one cycle and repeated over the series
//! - `residual` is what is left
//!
//! The moving average is undefined for the first and last `period / 2`
//! observations; those trend and residual entries are `NaN`.

use crate::error::AppError;

/// Decomposed components, aligned with the input.
#[derive(Debug, Clone, PartialEq)]
pub struct Decomposition {
    pub trend: Vec<f64>,
    pub seasonal: Vec<f64>,
    pub residual: Vec<f64>,
}

/// Decompose `series` with a fixed seasonal `period` (in observations).
pub fn decompose_additive(series: &[f64], period: usize) -> Result<Decomposition, AppError> {
    if period < 2 {
        return Err(AppError::failed(format!("Seasonal period must be >= 2 (got {period}).")));
    }
    if series.iter().any(|v| !v.is_finite()) {
        return Err(AppError::failed("Decomposition requires finite values (no missing or infinite entries)."));
    }
    let n = series.len();
    if n < 2 * period {
        return Err(AppError::failed(format!(
            "Decomposition with period {period} needs two complete cycles ({} observations), got {n}.",
            2 * period
        )));
    }

    let trend = centred_moving_average(series, period);

    let detrended: Vec<f64> = series.iter().zip(&trend).map(|(x, t)| x - t).collect();

    let mut phase_means: Vec<f64> = (0..period)
        .map(|phase| {
            let (sum, count) = detrended
                .iter()
                .skip(phase)
                .step_by(period)
                .filter(|v| !v.is_nan())
                .fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
            if count == 0 { f64::NAN } else { sum / count as f64 }
        })
        .collect();
    let centre = phase_means.iter().sum::<f64>() / period as f64;
    for m in &mut phase_means {
        *m -= centre;
    }

    let seasonal: Vec<f64> = (0..n).map(|t| phase_means[t % period]).collect();

    let residual: Vec<f64> = series
        .iter()
        .zip(&trend)
        .zip(&seasonal)
        .map(|((x, t), s)| x - t - s)
        .collect();

    Ok(Decomposition {
        trend,
        seasonal,
        residual,
    })
}

/// Centred moving average; `NaN` where the window does not fit.
fn centred_moving_average(series: &[f64], period: usize) -> Vec<f64> {
    let n = series.len();
    let half = period / 2;

    let weights: Vec<f64> = if period % 2 == 1 {
        vec![1.0 / period as f64; period]
    } else {
        let mut w = vec![1.0 / period as f64; period + 1];
        w[0] = 0.5 / period as f64;
        w[period] = 0.5 / period as f64;
        w
    };

    let mut trend = vec![f64::NAN; n];
    if n < weights.len() {
        return trend;
    }
    for (t, slot) in trend.iter_mut().enumerate().take(n - half).skip(half) {
        let window = &series[t - half..t - half + weights.len()];
        *slot = window.iter().zip(&weights).map(|(x, w)| x * w).sum();
    }
    trend
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn too_short_series_is_rejected() {
        let err = decompose_additive(&[1.0; 9], 5).unwrap_err();
        assert!(err.message().contains("two complete cycles"));
        assert!(decompose_additive(&[1.0, f64::NAN, 1.0, 1.0], 2).is_err());
    }

    #[test]
    fn infinite_values_are_rejected() {
        let mut series = vec![1.0; 20];
        series[7] = f64::INFINITY;
        let err = decompose_additive(&series, 5).unwrap_err();
        assert!(err.message().contains("finite"));
        series[7] = f64::NEG_INFINITY;
        assert!(decompose_additive(&series, 5).is_err());
    }

    #[test]
    fn odd_period_edges_are_undefined() {
        let series: Vec<f64> = (0..20).map(|t| t as f64).collect();
        let d = decompose_additive(&series, 5).unwrap();
        assert!(d.trend[..2].iter().all(|v| v.is_nan()));
        assert!(d.trend[18..].iter().all(|v| v.is_nan()));
        // Moving average of a straight line is the line itself.
        for t in 2..18 {
            assert!((d.trend[t] - t as f64).abs() < 1e-12);
        }
        assert!(d.residual[0].is_nan());
    }

    #[test]
    fn even_period_uses_half_weighted_ends() {
        let series = [0.0, 4.0, 0.0, 4.0, 0.0, 4.0, 0.0, 4.0];
        let d = decompose_additive(&series, 2).unwrap();
        // Window [0, 4, 0] with weights [.25, .5, .25] = 2.
        assert!((d.trend[1] - 2.0).abs() < 1e-12);
        assert!(d.trend[0].is_nan() && d.trend[7].is_nan());
    }

    #[test]
    fn recovers_pure_seasonal_pattern() {
        let pattern = [2.0, -1.0, 0.5, -1.5];
        let series: Vec<f64> = (0..40).map(|t| 10.0 + pattern[t % 4]).collect();
        let d = decompose_additive(&series, 4).unwrap();

        for t in 0..40 {
            assert!((d.seasonal[t] - pattern[t % 4]).abs() < 1e-9, "t = {t}");
        }
        for t in 2..38 {
            assert!((d.trend[t] - 10.0).abs() < 1e-9);
            assert!(d.residual[t].abs() < 1e-9);
        }
        let cycle_sum: f64 = d.seasonal[..4].iter().sum();
        assert!(cycle_sum.abs() < 1e-9);
    }
}
