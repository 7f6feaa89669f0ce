use std::path::Path;

use tracing::{debug, warn};

use crate::data::columnar::ColumnarTable;
use crate::data::loader::{load_dataset, EXTERNAL_UTILITY, TIME};
use crate::data::utils::{GroupKey, Grouping, KeyValue};
use crate::error::{AnalysisError, Result};

/// What to do with a group key that no row matches.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EmptyGroupPolicy {
    /// Emit the row with NaN statistics.
    #[default]
    Carry,
    /// Leave the row out.
    Skip,
    /// Return [`AnalysisError::EmptyGroup`].
    Fail,
}

/// Mean and population standard deviation of time and utility for one group.
#[derive(Clone, Debug)]
pub struct AggregateRow {
    pub key: GroupKey,
    pub count: usize,
    pub time_avg: f64,
    pub time_std: f64,
    pub utility_avg: f64,
    pub utility_std: f64,
}

impl AggregateRow {
    /// Rows carried for empty groups have no statistics.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Rescale the utility statistics, e.g. by 100 for percentages.
    pub fn scale_utility(&mut self, factor: f64) {
        self.utility_avg *= factor;
        self.utility_std *= factor;
    }
}

/// Arithmetic mean, NaN for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation, NaN for an empty slice.
pub fn std_dev(values: &[f64]) -> f64 {
    let m = mean(values);
    if m.is_nan() {
        return m;
    }
    let var = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    var.sqrt()
}

/// Group `table` by `columns` and compute time/utility statistics per group key.
pub fn calc_avg(
    table: &ColumnarTable,
    columns: &[&str],
    policy: EmptyGroupPolicy,
) -> Result<Vec<AggregateRow>> {
    let time = table.require_f64(TIME)?;
    let utility = table.require_f64(EXTERNAL_UTILITY)?;
    let grouping = Grouping::new(table, columns)?;

    let mut rows = Vec::new();
    for key in grouping.keys() {
        let matched = grouping.matching_rows(&key);
        if matched.is_empty() {
            match policy {
                EmptyGroupPolicy::Carry => debug!("no rows for {}, carrying NaN", key),
                EmptyGroupPolicy::Skip => {
                    debug!("no rows for {}, skipping", key);
                    continue;
                }
                EmptyGroupPolicy::Fail => {
                    return Err(AnalysisError::EmptyGroup { key: key.to_string() })
                }
            }
        }

        let times: Vec<f64> = matched.iter().map(|&i| time[i]).collect();
        let utilities: Vec<f64> = matched.iter().map(|&i| utility[i]).collect();
        rows.push(AggregateRow {
            key,
            count: matched.len(),
            time_avg: mean(&times),
            time_std: std_dev(&times),
            utility_avg: mean(&utilities),
            utility_std: std_dev(&utilities),
        });
    }
    Ok(rows)
}

/// Load a benchmark CSV and aggregate it, see [`calc_avg`].
pub fn load_and_calc_avg(
    path: impl AsRef<Path>,
    columns: &[&str],
    policy: EmptyGroupPolicy,
) -> Result<Vec<AggregateRow>> {
    let table = load_dataset(path)?;
    calc_avg(&table, columns, policy)
}

/// Rows whose key matches every filter, in aggregation order.
pub fn select<'a>(rows: &'a [AggregateRow], filters: &[(&str, &KeyValue)]) -> Vec<&'a AggregateRow> {
    rows.iter().filter(|r| r.key.matches(filters)).collect()
}

/// The single row matching `filters`; `None` when absent or carried empty.
pub fn find<'a>(rows: &'a [AggregateRow], filters: &[(&str, &KeyValue)]) -> Option<&'a AggregateRow> {
    let row = rows.iter().find(|r| r.key.matches(filters))?;
    if row.is_empty() {
        warn!("no measurements for {}", row.key);
        return None;
    }
    Some(row)
}
