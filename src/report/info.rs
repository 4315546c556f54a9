//! Structural report: shape, column names, non-null counts and types.

use std::collections::BTreeMap;

use crate::domain::{DType, Table};

/// Render the structure of `table` as a fixed-width text block.
///
/// ```text
/// Rows: 3 (0 to 2)
/// Columns: 2
///  #  Column  Non-Null Count  Dtype
/// --  ------  --------------  -----
///  0  Date    3 non-null      date
///  1  value   2 non-null      float64
/// dtypes: date(1), float64(1)
/// ```
pub fn format_table_info(table: &Table) -> String {
    let mut out = String::new();

    let n = table.n_rows();
    if n == 0 {
        out.push_str("Rows: 0\n");
    } else {
        out.push_str(&format!("Rows: {n} (0 to {})\n", n - 1));
    }
    out.push_str(&format!("Columns: {}\n", table.n_columns()));

    let rows: Vec<(String, String, String, &'static str)> = table
        .columns()
        .iter()
        .enumerate()
        .map(|(i, c)| {
            (
                i.to_string(),
                c.name.clone(),
                format!("{} non-null", c.non_null_count()),
                c.dtype().label(),
            )
        })
        .collect();

    let w_idx = width("#", rows.iter().map(|r| r.0.as_str()));
    let w_name = width("Column", rows.iter().map(|r| r.1.as_str()));
    let w_count = width("Non-Null Count", rows.iter().map(|r| r.2.as_str()));

    out.push_str(
        format!(" {:>w_idx$}  {:<w_name$}  {:<w_count$}  {}", "#", "Column", "Non-Null Count", "Dtype")
            .trim_end(),
    );
    out.push('\n');
    out.push_str(&format!(
        " {:-<w_idx$}  {:-<w_name$}  {:-<w_count$}  {:-<5}\n",
        "", "", "", ""
    ));
    for (idx, name, count, dtype) in &rows {
        out.push_str(&format!(" {idx:>w_idx$}  {name:<w_name$}  {count:<w_count$}  {dtype}\n"));
    }

    let mut tally: BTreeMap<DType, usize> = BTreeMap::new();
    for c in table.columns() {
        *tally.entry(c.dtype()).or_insert(0) += 1;
    }
    let parts: Vec<String> = tally
        .iter()
        .map(|(dtype, count)| format!("{}({count})", dtype.label()))
        .collect();
    out.push_str(&format!("dtypes: {}\n", parts.join(", ")));

    out
}

fn width<'a>(header: &str, cells: impl Iterator<Item = &'a str>) -> usize {
    cells
        .map(|c| c.chars().count())
        .chain(std::iter::once(header.chars().count()))
        .max()
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Column, ColumnData};
    use chrono::NaiveDate;

    #[test]
    fn reports_shape_counts_and_types() {
        let d = NaiveDate::from_ymd_opt(2020, 1, 1);
        let table = Table::new(vec![
            Column::new("Date", ColumnData::Date(vec![d, d, d])),
            Column::new("Global_active_power", ColumnData::Float(vec![1.0, f64::NAN, 2.0])),
            Column::new("Sub_metering_1", ColumnData::Int(vec![0, 1, 2])),
        ])
        .unwrap();

        let info = format_table_info(&table);
        let lines: Vec<&str> = info.lines().collect();
        assert_eq!(lines[0], "Rows: 3 (0 to 2)");
        assert_eq!(lines[1], "Columns: 3");
        assert!(lines[2].contains("Non-Null Count"));
        assert!(lines[5].contains("Global_active_power") && lines[5].contains("2 non-null"));
        assert!(lines[5].ends_with("float64"));
        assert_eq!(lines.last().copied(), Some("dtypes: int64(1), float64(1), date(1)"));
    }

    #[test]
    fn empty_table() {
        let info = format_table_info(&Table::default());
        assert!(info.starts_with("Rows: 0\nColumns: 0\n"));
        assert!(info.ends_with("dtypes: \n"));
    }
}
