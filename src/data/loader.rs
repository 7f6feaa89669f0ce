use std::path::Path;

use csv::{ReaderBuilder, Trim};
use serde::Deserialize;
use tracing::{debug, info};

use crate::data::columnar::ColumnarTable;
use crate::error::{AnalysisError, Result};

pub const ALGORITHM: &str = "algorithm";
pub const DATASET: &str = "dataset";
pub const TIME: &str = "time";
pub const EXTERNAL_UTILITY: &str = "externalUtility";
pub const TIME_LIMIT: &str = "timeLimit";
pub const BATCH_NUMBER: &str = "batchNumber";

/// Columns every benchmark table must carry.
pub const REQUIRED_COLUMNS: [&str; 4] = [ALGORITHM, DATASET, TIME, EXTERNAL_UTILITY];

/// One benchmark measurement with times already converted to seconds.
#[derive(Clone, Debug, PartialEq)]
pub struct MeasurementRecord {
    pub algorithm: String,
    pub dataset: String,
    pub batch_number: Option<u32>,
    pub time_limit: Option<f64>,
    pub time: f64,
    pub external_utility: f64,
}

// Row layout as written by the benchmark; extra columns are ignored.
#[derive(Deserialize)]
struct RawRecord {
    algorithm: String,
    dataset: String,
    #[serde(rename = "batchNumber", default)]
    batch_number: Option<u32>,
    #[serde(rename = "timeLimit", default)]
    time_limit: Option<f64>,
    time: f64,
    #[serde(rename = "externalUtility")]
    external_utility: f64,
}

impl From<RawRecord> for MeasurementRecord {
    fn from(raw: RawRecord) -> Self {
        // transform ms to s
        MeasurementRecord {
            algorithm: raw.algorithm,
            dataset: raw.dataset,
            batch_number: raw.batch_number,
            time_limit: raw.time_limit.map(|t| t / 1000.0),
            time: raw.time / 1000.0,
            external_utility: raw.external_utility,
        }
    }
}

/// Parse a semicolon separated benchmark table into typed records.
///
/// Fails with [`AnalysisError::InputFormat`] when one of [`REQUIRED_COLUMNS`] is
/// missing from the header or when a numeric field cannot be parsed.
pub fn read_measurements<R: std::io::Read>(reader: R, source: &str) -> Result<Vec<MeasurementRecord>> {
    let mut rdr = ReaderBuilder::new()
        .delimiter(b';')
        .has_headers(true)
        .trim(Trim::All)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|col| !headers.iter().any(|h| h == *col))
        .collect();
    if !missing.is_empty() {
        return Err(AnalysisError::input_format(
            source,
            format!("missing column(s): {}", missing.join(", ")),
        ));
    }

    let mut records = Vec::new();
    for (i, row) in rdr.deserialize::<RawRecord>().enumerate() {
        // header is line 1
        let raw = row.map_err(|e| AnalysisError::input_format(source, format!("row {}: {}", i + 2, e)))?;
        records.push(MeasurementRecord::from(raw));
    }
    debug!("parsed {} rows from {}", records.len(), source);
    Ok(records)
}

/// Load a benchmark CSV into a [`ColumnarTable`].
pub fn load_dataset(path: impl AsRef<Path>) -> Result<ColumnarTable> {
    let path = path.as_ref();
    let source = path.display().to_string();
    info!("Loading data from {} ...", source);
    let file = std::fs::File::open(path)?;
    let records = read_measurements(file, &source)?;
    ColumnarTable::from_records(&records, &source)
}
