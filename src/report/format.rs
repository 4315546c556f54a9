//! Terminal rendering of descriptive statistics.

use crate::domain::Description;

const STATS: [&str; 8] = ["count", "mean", "std", "min", "25%", "50%", "75%", "max"];

/// One row per numeric column, one column per statistic.
pub fn format_description(desc: &Description) -> String {
    if desc.columns.is_empty() {
        return "(no numeric columns)\n".to_string();
    }

    let w_name = desc
        .columns
        .iter()
        .map(|(n, _)| n.chars().count())
        .max()
        .unwrap_or(0)
        .max("column".len());

    let mut out = String::new();
    out.push_str(&format!("{:<w_name$}", "column"));
    for s in STATS {
        out.push_str(&format!(" {s:>12}"));
    }
    out.push('\n');
    out.push_str(&format!("{:-<w_name$}", ""));
    for _ in STATS {
        out.push_str(&format!(" {:->12}", ""));
    }
    out.push('\n');

    for (name, s) in &desc.columns {
        out.push_str(&format!("{name:<w_name$} {:>12.0}", s.count));
        for v in [s.mean, s.std, s.min, s.q25, s.q50, s.q75, s.max] {
            out.push_str(&format!(" {v:>12.4}"));
        }
        out.push('\n');
    }

    out
}
