//! Descriptive statistics for the numeric columns of a table.

use rayon::prelude::*;

use crate::domain::{ColumnSummary, Description, Table};
use crate::math::{mean, quantile_sorted, sample_std, sorted};

/// Count, mean, sample std, min, quartiles and max per numeric column.
///
/// Missing cells are skipped. Statistics that come out non-finite (an
/// infinite input, a single-value std, an all-missing column) are reported
/// as `0.0`. Non-numeric columns are left out; a table without numeric
/// columns yields an empty description.
pub fn describe(table: &Table) -> Description {
    let columns = table
        .columns()
        .par_iter()
        .filter(|c| c.dtype().is_numeric())
        .map(|c| {
            let values: Vec<f64> = c.to_numeric().into_iter().flatten().collect();
            (c.name.clone(), summarize(&values))
        })
        .collect();
    Description { columns }
}

fn summarize(values: &[f64]) -> ColumnSummary {
    let s = sorted(values);
    let first = s.first().copied().unwrap_or(f64::NAN);
    let last = s.last().copied().unwrap_or(f64::NAN);
    ColumnSummary {
        count: values.len() as f64,
        mean: finite_or_zero(mean(values)),
        std: finite_or_zero(sample_std(values)),
        min: finite_or_zero(first),
        q25: finite_or_zero(quantile_sorted(&s, 0.25)),
        q50: finite_or_zero(quantile_sorted(&s, 0.50)),
        q75: finite_or_zero(quantile_sorted(&s, 0.75)),
        max: finite_or_zero(last),
    }
}

fn finite_or_zero(v: f64) -> f64 {
    if v.is_finite() { v } else { 0.0 }
}
