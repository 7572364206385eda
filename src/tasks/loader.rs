use anyhow::Result;
use csv::ReaderBuilder;
use log::{debug, error};
use serde::{de::DeserializeOwned, Deserialize};
use std::path::Path;

/// One crash position of an error-recovery experiment.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct ErrorRecord {
    /// Item number after which the sketch crashed
    #[serde(rename = "Ni")]
    pub crash_item: u64,
    #[serde(rename = "cms_true")]
    pub cms_true: f64,
    #[serde(rename = "hist_true")]
    pub hist_true: f64,
    #[serde(rename = "rec_cms")]
    pub rec_cms: f64,
    #[serde(rename = "rec_true")]
    pub rec_true: f64,
}

impl ErrorRecord {
    pub const COLUMNS: [&'static str; 5] = ["Ni", "cms_true", "hist_true", "rec_cms", "rec_true"];
}

/// One batch of a trace, as summarised by the measurement pipeline.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct BatchRecord {
    #[serde(rename = "theta (1+cnt_len/id_len)")]
    pub theta: f64,
    #[serde(rename = "beta (B/b)")]
    pub beta: f64,
}

impl BatchRecord {
    pub const COLUMNS: [&'static str; 2] = ["theta (1+cnt_len/id_len)", "beta (B/b)"];
}

/// Read every row of a CSV file into `T`, after checking that the header row
/// carries all of `columns`. Any other column is ignored.
pub fn load_records<T: DeserializeOwned>(path: &Path, columns: &[&str]) -> Result<Vec<T>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .map_err(|e| {
            let reason = format!("error opening csv file (path={}, error={e})", path.display());
            error!("{reason}");
            anyhow::anyhow!(reason)
        })?;

    let headers = reader
        .headers()
        .map_err(|e| {
            let reason = format!("error reading csv header (path={}, error={e})", path.display());
            error!("{reason}");
            anyhow::anyhow!(reason)
        })?
        .clone();
    let mut indices = Vec::with_capacity(columns.len());
    for column in columns {
        let Some(idx) = headers.iter().position(|h| h == *column) else {
            let reason = format!(
                "missing column in csv file (path={}, column={column})",
                path.display()
            );
            error!("{reason}");
            anyhow::bail!(reason);
        };
        indices.push((*column, idx));
    }

    let parse_error = |row: usize, e: csv::Error| {
        let reason = format!(
            "error parsing csv row (path={}, row={row}, error={e})",
            path.display()
        );
        error!("{reason}");
        anyhow::anyhow!(reason)
    };

    let mut records = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        let row = idx + 1;
        let record = result.map_err(|e| parse_error(row, e))?;

        // `inf` and `NaN` parse as floats but cannot be summarised or plotted
        for (column, field_idx) in &indices {
            let value = record.get(*field_idx).unwrap_or_default().trim();
            if value.parse::<f64>().is_ok_and(|v| !v.is_finite()) {
                let reason = format!(
                    "non-finite value in csv file (path={}, row={row}, column={column}, value={value})",
                    path.display()
                );
                error!("{reason}");
                anyhow::bail!(reason);
            }
        }

        let record: T = record
            .deserialize(Some(&headers))
            .map_err(|e| parse_error(row, e))?;
        records.push(record);
    }
    debug!("loaded {} rows from {}", records.len(), path.display());

    Ok(records)
}

pub fn load_error_records(path: &Path) -> Result<Vec<ErrorRecord>> {
    load_records(path, &ErrorRecord::COLUMNS)
}

pub fn load_batch_records(path: &Path) -> Result<Vec<BatchRecord>> {
    load_records(path, &BatchRecord::COLUMNS)
}
