use comfy_table::presets::UTF8_FULL;
use comfy_table::Table;

use crate::metrics::aggregate::AggregateRow;

fn cell(avg: f64, std: f64) -> String {
    if avg.is_nan() {
        "-".to_string()
    } else {
        format!("{:.2} (+- {:.2})", avg, std)
    }
}

/// Console table of aggregate rows: key columns, count, time and utility.
pub fn aggregate_table(rows: &[AggregateRow]) -> Table {
    let mut header: Vec<String> = rows
        .first()
        .map(|r| r.key.parts.iter().map(|(c, _)| c.clone()).collect())
        .unwrap_or_default();
    header.extend(["n", "time (s)", "utility"].iter().map(|s| s.to_string()));

    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(header);
    for row in rows {
        let mut cells: Vec<String> = row.key.parts.iter().map(|(_, v)| v.to_string()).collect();
        cells.push(row.count.to_string());
        cells.push(cell(row.time_avg, row.time_std));
        cells.push(cell(row.utility_avg, row.utility_std));
        table.add_row(cells);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::utils::{GroupKey, KeyValue};

    #[test]
    fn renders_rows_and_empty_groups() {
        let row = |algorithm: &str, count: usize, avg: f64| AggregateRow {
            key: GroupKey { parts: vec![("algorithm".to_string(), KeyValue::from(algorithm))] },
            count,
            time_avg: avg,
            time_std: 0.5,
            utility_avg: avg,
            utility_std: 0.0,
        };
        let rendered = aggregate_table(&[row("GA", 3, 1.25), row("TD", 0, f64::NAN)]).to_string();
        assert!(rendered.contains("algorithm"));
        assert!(rendered.contains("1.25 (+- 0.50)"));
        assert!(rendered.contains("TD"));
        assert!(rendered.contains('-'));
    }
}
