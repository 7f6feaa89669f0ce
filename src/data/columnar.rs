use ordered_float::OrderedFloat;
use polars::prelude::*;

use crate::data::loader::{
    MeasurementRecord, ALGORITHM, BATCH_NUMBER, DATASET, EXTERNAL_UTILITY, TIME, TIME_LIMIT,
};
use crate::data::utils::KeyValue;
use crate::error::{AnalysisError, Result};

/// A simple ColumnarTable wrapper using Polars DataFrame
#[derive(Clone, Debug)]
pub struct ColumnarTable {
    pub df: DataFrame,
    /// Where the rows came from, used in error messages
    pub source: String,
}

impl ColumnarTable {
    pub fn new(df: DataFrame, source: impl Into<String>) -> Self {
        Self { df, source: source.into() }
    }

    /// Build the table from typed records.
    ///
    /// `timeLimit` and `batchNumber` only become columns when every record carries them,
    /// so grouping on an absent experiment column fails with a descriptive error.
    pub fn from_records(records: &[MeasurementRecord], source: &str) -> Result<Self> {
        let algorithms: Vec<&str> = records.iter().map(|r| r.algorithm.as_str()).collect();
        let datasets: Vec<&str> = records.iter().map(|r| r.dataset.as_str()).collect();
        let times: Vec<f64> = records.iter().map(|r| r.time).collect();
        let utilities: Vec<f64> = records.iter().map(|r| r.external_utility).collect();

        let mut df_cols = vec![
            Series::new(ALGORITHM, algorithms),
            Series::new(DATASET, datasets),
            Series::new(TIME, times),
            Series::new(EXTERNAL_UTILITY, utilities),
        ];

        if let Some(limits) = records.iter().map(|r| r.time_limit).collect::<Option<Vec<f64>>>() {
            df_cols.push(Series::new(TIME_LIMIT, limits));
        }
        if let Some(batches) = records.iter().map(|r| r.batch_number).collect::<Option<Vec<u32>>>() {
            df_cols.push(Series::new(BATCH_NUMBER, batches));
        }

        Ok(ColumnarTable::new(DataFrame::new(df_cols)?, source))
    }

    /// Extract a column as Vec<f64>
    pub fn column_f64(&self, col: &str) -> Option<Vec<f64>> {
        self.df.column(col).ok()?.f64().ok().map(|s| s.into_no_null_iter().collect())
    }

    /// Extract a text column as owned strings
    pub fn column_str(&self, col: &str) -> Option<Vec<String>> {
        self.df
            .column(col)
            .ok()?
            .utf8()
            .ok()
            .map(|s| s.into_no_null_iter().map(str::to_owned).collect())
    }

    pub fn has_column(&self, col: &str) -> bool {
        self.df.get_column_names().iter().any(|c| *c == col)
    }

    /// Like [`column_f64`](Self::column_f64) but a missing column is an input format error.
    pub fn require_f64(&self, col: &str) -> Result<Vec<f64>> {
        self.column_f64(col).ok_or_else(|| self.missing(col))
    }

    /// Descriptive values of `col`, one per row, usable as group key components.
    pub fn key_column(&self, col: &str) -> Result<Vec<KeyValue>> {
        if !self.has_column(col) {
            return Err(self.missing(col));
        }
        let series = self.df.column(col)?;
        let values = match series.dtype() {
            DataType::Utf8 => series
                .utf8()?
                .into_iter()
                .map(|v| KeyValue::Text(v.unwrap_or_default().to_owned()))
                .collect(),
            _ => {
                let numeric = series.cast(&DataType::Float64)?;
                numeric
                    .f64()?
                    .into_iter()
                    .map(|v| KeyValue::Number(OrderedFloat(v.unwrap_or(f64::NAN))))
                    .collect()
            }
        };
        Ok(values)
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.df.height()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn missing(&self, col: &str) -> AnalysisError {
        AnalysisError::input_format(self.source.as_str(), format!("column '{}' not present", col))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(algorithm: &str, batch: Option<u32>) -> MeasurementRecord {
        MeasurementRecord {
            algorithm: algorithm.to_string(),
            dataset: "ADULT".to_string(),
            batch_number: batch,
            time_limit: None,
            time: 1.0,
            external_utility: 0.5,
        }
    }

    #[test]
    fn builds_typed_columns() {
        let table = ColumnarTable::from_records(&[record("A", Some(1)), record("B", Some(2))], "t").unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.column_str(ALGORITHM).unwrap(), vec!["A", "B"]);
        assert_eq!(table.column_f64(TIME).unwrap(), vec![1.0, 1.0]);
        assert_eq!(
            table.key_column(BATCH_NUMBER).unwrap(),
            vec![KeyValue::from(1.0), KeyValue::from(2.0)]
        );
        assert!(!table.has_column(TIME_LIMIT));
    }

    #[test]
    fn partially_present_optional_column_is_dropped() {
        let table = ColumnarTable::from_records(&[record("A", Some(1)), record("B", None)], "t").unwrap();
        assert!(!table.has_column(BATCH_NUMBER));
        assert!(matches!(
            table.key_column(BATCH_NUMBER),
            Err(AnalysisError::InputFormat { .. })
        ));
    }
}
