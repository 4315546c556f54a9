//! Date normalization.
//!
//! The date column is parsed with the configured format; rows whose date does
//! not parse are dropped (never defaulted) and the remaining rows are
//! renumbered from zero. A table without the date column passes through.

use chrono::NaiveDate;

use crate::domain::{ColumnData, Table};

/// Parse the date column and drop rows without a valid date.
///
/// Running this on an already preprocessed table is a no-op.
pub fn preprocess(mut table: Table, date_column: &str, date_format: &str) -> Table {
    let Some(idx) = table.column_index(date_column) else {
        return table;
    };

    let parse = |s: &str| NaiveDate::parse_from_str(s.trim(), date_format).ok();

    let parsed: Vec<Option<NaiveDate>> = match &table.columns()[idx].data {
        ColumnData::Date(v) => v.clone(),
        ColumnData::Text(v) => v.iter().map(|s| s.as_deref().and_then(parse)).collect(),
        ColumnData::Int(v) => v.iter().map(|x| parse(&x.to_string())).collect(),
        ColumnData::Float(v) => v
            .iter()
            .map(|x| if x.is_nan() { None } else { parse(&x.to_string()) })
            .collect(),
    };

    let keep: Vec<bool> = parsed.iter().map(Option::is_some).collect();
    let dropped = keep.iter().filter(|k| !**k).count();

    table.replace_column_data(idx, ColumnData::Date(parsed));
    if dropped > 0 {
        table.retain_rows(&keep);
    }

    tracing::debug!(
        column = date_column,
        dropped,
        remaining = table.n_rows(),
        "preprocessed date column"
    );

    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Column, DType};

    fn raw_table(dates: &[Option<&str>]) -> Table {
        let n = dates.len();
        Table::new(vec![
            Column::new(
                "Date",
                ColumnData::Text(dates.iter().map(|d| d.map(str::to_string)).collect()),
            ),
            Column::new("v", ColumnData::Int((0..n as i64).collect())),
        ])
        .unwrap()
    }

    #[test]
    fn drops_unparseable_dates() {
        let input = raw_table(&[
            Some("16/12/2006"),
            Some("2006-12-17"),
            None,
            Some("1/1/2007"),
            Some("31/02/2007"),
        ]);
        let out = preprocess(input.clone(), "Date", "%d/%m/%Y");

        // 5 rows in, 3 unparseable (ISO text, missing, impossible date).
        assert_eq!(out.n_rows(), input.n_rows() - 3);
        assert_eq!(out.column("Date").unwrap().dtype(), DType::Date);
        assert_eq!(
            out.column("Date").unwrap().data,
            ColumnData::Date(vec![
                NaiveDate::from_ymd_opt(2006, 12, 16),
                NaiveDate::from_ymd_opt(2007, 1, 1),
            ])
        );
        // Remaining rows keep their other values, renumbered from zero.
        assert_eq!(out.column("v").unwrap().data, ColumnData::Int(vec![0, 3]));
    }

    #[test]
    fn second_pass_is_a_no_op() {
        let once = preprocess(raw_table(&[Some("02/03/2020"), Some("x")]), "Date", "%d/%m/%Y");
        let twice = preprocess(once.clone(), "Date", "%d/%m/%Y");
        assert_eq!(once, twice);
    }

    #[test]
    fn table_without_date_column_passes_through() {
        let table = Table::new(vec![Column::new("v", ColumnData::Int(vec![1, 2]))]).unwrap();
        let out = preprocess(table.clone(), "Date", "%d/%m/%Y");
        assert_eq!(out, table);
    }
}
