use std::collections::HashSet;
use std::fmt;

use itertools::Itertools;
use ordered_float::OrderedFloat;

use crate::data::columnar::ColumnarTable;
use crate::error::Result;

/// One descriptive value of a measurement (algorithm name, batch number, time limit, ...)
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum KeyValue {
    Text(String),
    Number(OrderedFloat<f64>),
}

impl KeyValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            KeyValue::Number(v) => Some(v.into_inner()),
            KeyValue::Text(_) => None,
        }
    }
}

impl From<&str> for KeyValue {
    fn from(v: &str) -> Self {
        KeyValue::Text(v.to_string())
    }
}

impl From<f64> for KeyValue {
    fn from(v: f64) -> Self {
        KeyValue::Number(OrderedFloat(v))
    }
}

impl fmt::Display for KeyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyValue::Text(s) => write!(f, "{}", s),
            KeyValue::Number(v) if v.fract() == 0.0 => write!(f, "{:.0}", v.into_inner()),
            KeyValue::Number(v) => write!(f, "{}", v.into_inner()),
        }
    }
}

/// Ordered (column, value) pairs identifying one cohort of repeated measurements.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct GroupKey {
    pub parts: Vec<(String, KeyValue)>,
}

impl GroupKey {
    pub fn get(&self, column: &str) -> Option<&KeyValue> {
        self.parts.iter().find(|(c, _)| c == column).map(|(_, v)| v)
    }

    /// True when every `(column, value)` filter matches this key.
    pub fn matches(&self, filters: &[(&str, &KeyValue)]) -> bool {
        filters.iter().all(|(col, value)| self.get(col) == Some(*value))
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts = self.parts.iter().map(|(c, v)| format!("{}={}", c, v)).join(", ");
        write!(f, "({})", parts)
    }
}

/// Helper: distinct values preserving first-seen order
pub fn unique_ordered<T: Eq + std::hash::Hash + Clone>(values: &[T]) -> Vec<T> {
    let mut seen = HashSet::new();
    values.iter().filter(|v| seen.insert((*v).clone())).cloned().collect()
}

/// The descriptive columns of a table that group keys are built from.
pub struct Grouping {
    columns: Vec<String>,
    n_rows: usize,
    /// per column, one value per row
    values: Vec<Vec<KeyValue>>,
}

impl Grouping {
    pub fn new(table: &ColumnarTable, columns: &[&str]) -> Result<Self> {
        let values = columns.iter().map(|c| table.key_column(c)).collect::<Result<Vec<_>>>()?;
        Ok(Grouping {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            n_rows: table.len(),
            values,
        })
    }

    /// Cartesian product of each column's distinct values, not only the observed
    /// combinations. Columns vary in the given order, the last one fastest.
    pub fn keys(&self) -> Vec<GroupKey> {
        if self.columns.is_empty() {
            return vec![GroupKey::default()];
        }
        self.values
            .iter()
            .map(|col| unique_ordered(col))
            .multi_cartesian_product()
            .map(|combo| GroupKey { parts: self.columns.iter().cloned().zip(combo).collect() })
            .collect()
    }

    /// Indices of the rows equal to `key` on every grouping column, in row order.
    pub fn matching_rows(&self, key: &GroupKey) -> Vec<usize> {
        (0..self.n_rows)
            .filter(|&row| {
                self.values
                    .iter()
                    .zip(&key.parts)
                    .all(|(col, (_, target))| col[row] == *target)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::read_measurements;

    fn table() -> ColumnarTable {
        let csv = "algorithm;dataset;time;externalUtility\n\
                   GA;ADULT;1000;0.1\n\
                   GA;IHIS;2000;0.2\n\
                   TD;ADULT;3000;0.3\n";
        let records = read_measurements(csv.as_bytes(), "inline").unwrap();
        ColumnarTable::from_records(&records, "inline").unwrap()
    }

    #[test]
    fn keys_cover_the_full_product_in_first_seen_order() {
        let grouping = Grouping::new(&table(), &["algorithm", "dataset"]).unwrap();
        let keys: Vec<String> = grouping.keys().iter().map(|k| k.to_string()).collect();
        assert_eq!(
            keys,
            vec![
                "(algorithm=GA, dataset=ADULT)",
                "(algorithm=GA, dataset=IHIS)",
                "(algorithm=TD, dataset=ADULT)",
                "(algorithm=TD, dataset=IHIS)",
            ]
        );
    }

    #[test]
    fn matching_rows_is_a_conjunction() {
        let grouping = Grouping::new(&table(), &["algorithm", "dataset"]).unwrap();
        let keys = grouping.keys();
        assert_eq!(grouping.matching_rows(&keys[0]), vec![0]);
        assert!(grouping.matching_rows(&keys[3]).is_empty());
    }

    #[test]
    fn no_columns_yields_one_key_over_all_rows() {
        let grouping = Grouping::new(&table(), &[]).unwrap();
        let keys = grouping.keys();
        assert_eq!(keys.len(), 1);
        assert!(keys[0].parts.is_empty());
        assert_eq!(grouping.matching_rows(&keys[0]), vec![0, 1, 2]);
    }

    #[test]
    fn numbers_display_without_trailing_zeros() {
        assert_eq!(KeyValue::from(5.0).to_string(), "5");
        assert_eq!(KeyValue::from(0.5).to_string(), "0.5");
    }
}
