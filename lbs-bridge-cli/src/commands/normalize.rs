//! Normalize command - convert raw report JSON into canonical events.

use std::path::PathBuf;

use lbs_bridge::normalize;

use super::reports::read_reports;
use crate::error::CliError;

/// Arguments for the normalize command.
pub struct NormalizeArgs {
    pub file: PathBuf,
    pub pretty: bool,
}

/// Run the normalize command. Prints one event per report.
pub fn run(args: NormalizeArgs) -> Result<(), CliError> {
    for line in render(&args)? {
        println!("{}", line);
    }
    Ok(())
}

fn render(args: &NormalizeArgs) -> Result<Vec<String>, CliError> {
    let reports = read_reports(&args.file)?;
    tracing::debug!(count = reports.len(), file = %args.file.display(), "Normalizing reports");

    reports
        .iter()
        .map(|report| {
            let event = normalize(report);
            let json = if args.pretty {
                serde_json::to_string_pretty(&event)
            } else {
                serde_json::to_string(&event)
            };
            json.map_err(|error| CliError::InvalidReport {
                path: args.file.clone(),
                error,
            })
        })
        .collect()
}
