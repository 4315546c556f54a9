//! Endpoint logic shared by the HTTP server and the CLI.
//!
//! Every analytical path works on a fresh copy of the first
//! [`WORKING_WINDOW`] rows of the loaded table:
//!
//! head -> preprocess dates -> coerce target -> (drop | forward fill) -> model
//!
//! The front-ends only deal with loading, transport and presentation.

use chrono::{Days, NaiveDate};

use crate::data::{preprocess, resample_daily_sum};
use crate::domain::{
    ArimaOutput, ColumnData, DataInfo, DatasetConfig, DatasetPreview, DecompositionOutput,
    DEFAULT_PREVIEW_ROWS, DECOMPOSITION_PERIOD, SARIMA_HORIZON, SarimaOutput, Series, Table,
    TargetSeries, WORKING_WINDOW, iso_date,
};
use crate::error::AppError;
use crate::models::{ARIMA_5_1_0, SARIMA_1_1_0_0_1_0_12, decompose_additive, fit_arima};
use crate::report::{describe, format_table_info};

/// First rows of the dataset plus its total size.
///
/// `None` or `0` falls back to [`DEFAULT_PREVIEW_ROWS`]. A negative limit
/// `-k` shows every row except the last `k`.
pub fn preview(table: &Table, row_limit: Option<i64>) -> DatasetPreview {
    let total = table.n_rows();
    let shown = match row_limit {
        None | Some(0) => DEFAULT_PREVIEW_ROWS.min(total),
        Some(n) if n > 0 => usize::try_from(n).unwrap_or(usize::MAX).min(total),
        Some(n) => total.saturating_sub(usize::try_from(n.unsigned_abs()).unwrap_or(usize::MAX)),
    };
    let preview_data = (0..shown)
        .map(|i| serde_json::to_value(table.row(i)).unwrap_or(serde_json::Value::Null))
        .collect();
    DatasetPreview {
        message: "Dataset loaded successfully.".to_string(),
        rows_in_preview: shown,
        rows_in_total: total,
        preview_data,
    }
}

/// Structural report and descriptive statistics over the working window.
pub fn data_info(table: &Table) -> DataInfo {
    let window = table.head(WORKING_WINDOW);
    DataInfo {
        info: format_table_info(&window),
        description: describe(&window),
    }
}

/// Daily total of the target over the working window.
pub fn plot_energy(table: &Table, config: &DatasetConfig) -> Result<Series, AppError> {
    let series = WorkingSubset::from_table(table, config)?.drop_missing();
    let daily = resample_daily_sum(&series);
    if let Some(pos) = daily.values.iter().position(|v| !v.is_finite()) {
        return Err(AppError::failed(format!(
            "Daily total for {} is not finite.",
            iso_date(daily.dates[pos])
        )));
    }
    Ok(Series::from_dates(&daily.dates, daily.values))
}

/// Additive decomposition of the target with a period of
/// [`DECOMPOSITION_PERIOD`] observations. Undefined edges are reported as 0.
pub fn seasonal_decomposition(
    table: &Table,
    config: &DatasetConfig,
) -> Result<DecompositionOutput, AppError> {
    let series = WorkingSubset::from_table(table, config)?.drop_missing();
    let parts = decompose_additive(&series.values, DECOMPOSITION_PERIOD)?;
    let zero_nan = |v: Vec<f64>| -> Vec<f64> {
        v.into_iter().map(|x| if x.is_nan() { 0.0 } else { x }).collect()
    };
    Ok(DecompositionOutput {
        x: series.dates.iter().map(|d| iso_date(*d)).collect(),
        trend: zero_nan(parts.trend),
        seasonal: zero_nan(parts.seasonal),
        residual: zero_nan(parts.residual),
    })
}

/// ARIMA(5,1,0) fitted on the first 80% of the target, forecasting the rest.
///
/// `test` and `forecast` share the same x axis.
pub fn arima_forecast(table: &Table, config: &DatasetConfig) -> Result<ArimaOutput, AppError> {
    let series = WorkingSubset::from_table(table, config)?.drop_missing();
    let (train_len, test_len) = split_80_20(series.len());

    let fit = fit_arima(&series.values[..train_len], ARIMA_5_1_0)?;
    let predicted = fit.forecast(test_len);
    tracing::debug!(
        model = %fit.spec().label(),
        train = train_len,
        test = test_len,
        coefficients = ?fit.coefficients(),
        sigma2 = fit.residual_variance(),
        "fitted ARIMA"
    );

    let (train_dates, test_dates) = series.dates.split_at(train_len);
    let (train_values, test_values) = series.values.split_at(train_len);
    Ok(ArimaOutput {
        train: Series::from_dates(train_dates, train_values.to_vec()),
        test: Series::from_dates(test_dates, test_values.to_vec()),
        forecast: Series::from_dates(test_dates, predicted),
    })
}

/// SARIMA(1,1,0)(0,1,0,12) on the forward-filled target, projecting
/// [`SARIMA_HORIZON`] consecutive days past the last row.
///
/// Gaps before the first valid reading cannot be filled; they stay `null` in
/// `historical` and are left out of the fit.
pub fn sarima_forecast(table: &Table, config: &DatasetConfig) -> Result<SarimaOutput, AppError> {
    let subset = WorkingSubset::from_table(table, config)?;
    let filled = subset.forward_fill();

    let fit_values: Vec<f64> = filled.iter().skip_while(|v| v.is_none()).flatten().copied().collect();
    if fit_values.is_empty() {
        return Err(AppError::failed(format!(
            "Column '{}' has no numeric values to fit.",
            config.target_column
        )));
    }

    let fit = fit_arima(&fit_values, SARIMA_1_1_0_0_1_0_12)?;
    let predicted = fit.forecast(SARIMA_HORIZON);
    tracing::debug!(
        model = %fit.spec().label(),
        observations = fit_values.len(),
        coefficients = ?fit.coefficients(),
        sigma2 = fit.residual_variance(),
        "fitted SARIMA"
    );

    let last = subset
        .dates
        .last()
        .copied()
        .ok_or_else(|| AppError::failed("No dated rows to forecast from."))?;
    let forecast_dates = (1..=SARIMA_HORIZON as u64)
        .map(|i| {
            last.checked_add_days(Days::new(i))
                .ok_or_else(|| AppError::failed("Forecast date out of range."))
        })
        .collect::<Result<Vec<NaiveDate>, AppError>>()?;

    Ok(SarimaOutput {
        historical: Series::from_dates(&subset.dates, filled),
        forecast: Series::from_dates(&forecast_dates, predicted),
    })
}

/// Chronological split: `floor(0.8 * n)` for training, the rest for testing.
fn split_80_20(n: usize) -> (usize, usize) {
    let train = n * 4 / 5;
    (train, n - train)
}

/// Dates and coerced target values of the working window, row-aligned.
#[derive(Debug, Clone)]
struct WorkingSubset {
    dates: Vec<NaiveDate>,
    target: Vec<Option<f64>>,
}

impl WorkingSubset {
    fn from_table(table: &Table, config: &DatasetConfig) -> Result<Self, AppError> {
        let window = preprocess(table.head(WORKING_WINDOW), &config.date_column, &config.date_format);

        let date_col = window
            .column(&config.date_column)
            .ok_or_else(|| AppError::failed(format!("Column '{}' not found.", config.date_column)))?;
        let target_col = window
            .column(&config.target_column)
            .ok_or_else(|| AppError::failed(format!("Column '{}' not found.", config.target_column)))?;

        let ColumnData::Date(dates) = &date_col.data else {
            return Err(AppError::failed(format!(
                "Column '{}' was not parsed as dates.",
                config.date_column
            )));
        };

        // Preprocessing leaves no missing dates behind.
        let (dates, target): (Vec<NaiveDate>, Vec<Option<f64>>) = dates
            .iter()
            .zip(target_col.to_numeric())
            .filter_map(|(d, v)| d.map(|d| (d, v)))
            .unzip();

        Ok(Self { dates, target })
    }

    fn drop_missing(&self) -> TargetSeries {
        let (dates, values) = self
            .dates
            .iter()
            .zip(&self.target)
            .filter_map(|(d, v)| v.map(|v| (*d, v)))
            .unzip();
        TargetSeries { dates, values }
    }

    fn forward_fill(&self) -> Vec<Option<f64>> {
        let mut last = None;
        self.target
            .iter()
            .map(|v| {
                if v.is_some() {
                    last = *v;
                }
                last
            })
            .collect()
    }
}
