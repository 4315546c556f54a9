//! Daily aggregation.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::domain::TargetSeries;

/// Sum values per calendar day.
///
/// The output covers every day from the earliest to the latest date, in
/// order; days without observations are present with a sum of `0.0`.
pub fn resample_daily_sum(series: &TargetSeries) -> TargetSeries {
    let mut sums: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for (date, value) in series.dates.iter().zip(&series.values) {
        *sums.entry(*date).or_insert(0.0) += value;
    }

    let (Some(first), Some(last)) = (
        sums.keys().next().copied(),
        sums.keys().next_back().copied(),
    ) else {
        return TargetSeries::default();
    };

    let mut out = TargetSeries::default();
    for day in first.iter_days().take_while(|d| *d <= last) {
        out.dates.push(day);
        out.values.push(sums.get(&day).copied().unwrap_or(0.0));
    }
    out
}
