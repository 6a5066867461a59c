//! Reading raw location reports from JSON files.

use std::path::Path;

use lbs_bridge::RawLocationReport;
use serde_json::Value;

use crate::error::CliError;

/// Read one report object, or an array of them, from `path`.
pub fn read_reports(path: &Path) -> Result<Vec<RawLocationReport>, CliError> {
    let content = std::fs::read_to_string(path).map_err(|error| CliError::FileRead {
        path: path.to_path_buf(),
        error,
    })?;
    parse_reports(&content).map_err(|error| CliError::InvalidReport {
        path: path.to_path_buf(),
        error,
    })
}

fn parse_reports(content: &str) -> Result<Vec<RawLocationReport>, serde_json::Error> {
    match serde_json::from_str::<Value>(content)? {
        Value::Array(items) => items.into_iter().map(serde_json::from_value).collect(),
        single => Ok(vec![serde_json::from_value(single)?]),
    }
}
