// Tabular import of rate series
use crate::domain::rate::{parse_timestamp, Observation};
use std::io::Read;

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("missing required column '{0}'")]
    MissingColumn(&'static str),

    #[error("row {row}: invalid {column} '{raw}'")]
    InvalidField {
        row: usize,
        column: &'static str,
        raw: String,
    },

    #[error("malformed csv: {0}")]
    Csv(#[from] csv::Error),
}

/// Reads a `timestamp,value` table. Other columns are ignored.
///
/// Files without a `timestamp` column are rejected; values are never given
/// positional timestamps.
pub fn read_series<R: Read>(reader: R) -> Result<Vec<Observation>, ImportError> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

    let headers = reader.headers()?.clone();
    let value_idx = headers
        .iter()
        .position(|h| h == "value")
        .ok_or(ImportError::MissingColumn("value"))?;
    let timestamp_idx = headers
        .iter()
        .position(|h| h == "timestamp")
        .ok_or(ImportError::MissingColumn("timestamp"))?;

    let mut series = Vec::new();
    for (i, record) in reader.records().enumerate() {
        let record = record?;
        // 1-based, counting the header line
        let row = i + 2;

        let raw_ts = record.get(timestamp_idx).unwrap_or_default();
        let timestamp = parse_timestamp(raw_ts).ok_or_else(|| ImportError::InvalidField {
            row,
            column: "timestamp",
            raw: raw_ts.to_string(),
        })?;

        let raw_value = record.get(value_idx).unwrap_or_default();
        let value = raw_value
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| ImportError::InvalidField {
                row,
                column: "value",
                raw: raw_value.to_string(),
            })?;

        series.push(Observation::new(timestamp, value));
    }

    tracing::debug!("Parsed {} rows from csv upload", series.len());
    Ok(series)
}
