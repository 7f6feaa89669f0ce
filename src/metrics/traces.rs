use std::path::Path;

use tracing::debug;

use crate::data::columnar::ColumnarTable;
use crate::data::loader::{load_dataset, EXTERNAL_UTILITY, TIME};
use crate::data::utils::{GroupKey, Grouping, KeyValue};
use crate::error::Result;

/// Time and utility checkpoints of one repetition, in row order.
#[derive(Clone, Debug)]
pub struct Trace {
    pub key: GroupKey,
    pub time_trace: Vec<f64>,
    pub utility_trace: Vec<f64>,
}

impl Trace {
    pub fn is_empty(&self) -> bool {
        self.time_trace.is_empty()
    }

    /// Append `(end_point, last utility)` so the trace spans the plotted horizon.
    fn extend_to(&mut self, end_point: f64) {
        if let Some(&last) = self.utility_trace.last() {
            self.utility_trace.push(last);
            self.time_trace.push(end_point);
        }
    }
}

/// Collect one [`Trace`] per group key of `columns` (full cartesian product, empty
/// groups yield empty traces). A non-zero `end_point` extends every non-empty trace.
pub fn create_traces(table: &ColumnarTable, columns: &[&str], end_point: Option<f64>) -> Result<Vec<Trace>> {
    let time = table.require_f64(TIME)?;
    let utility = table.require_f64(EXTERNAL_UTILITY)?;
    let grouping = Grouping::new(table, columns)?;
    let end_point = end_point.filter(|t| *t != 0.0);

    let traces = grouping
        .keys()
        .into_iter()
        .map(|key| {
            let matched = grouping.matching_rows(&key);
            let mut trace = Trace {
                time_trace: matched.iter().map(|&i| time[i]).collect(),
                utility_trace: matched.iter().map(|&i| utility[i]).collect(),
                key,
            };
            if let Some(t) = end_point {
                trace.extend_to(t);
            }
            debug!("{}: {} checkpoints", trace.key, trace.time_trace.len());
            trace
        })
        .collect();
    Ok(traces)
}

/// Load a benchmark CSV and collect its traces, see [`create_traces`].
pub fn load_and_create_traces(
    path: impl AsRef<Path>,
    columns: &[&str],
    end_point: Option<f64>,
) -> Result<Vec<Trace>> {
    let table = load_dataset(path)?;
    create_traces(&table, columns, end_point)
}

/// Time and utility sequences of the non-empty traces matching every filter.
pub fn select_traces(traces: &[Trace], filters: &[(&str, &KeyValue)]) -> (Vec<Vec<f64>>, Vec<Vec<f64>>) {
    traces
        .iter()
        .filter(|t| !t.is_empty() && t.key.matches(filters))
        .map(|t| (t.time_trace.clone(), t.utility_trace.clone()))
        .unzip()
}
