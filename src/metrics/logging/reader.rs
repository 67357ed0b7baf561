use std::path::Path;

use tokio::{
    fs::File,
    io::{AsyncBufReadExt, BufReader},
};

use crate::error::StatsError;

use super::super::LatencySummary;
use super::parse_log_line;

/// Reads the result log line by line and aggregates it.
///
/// Only the running aggregate is kept in memory. The first malformed line
/// aborts the whole aggregation; no partial summary is returned.
///
/// # Errors
///
/// Returns an error when the log cannot be opened or read, or when any line
/// is malformed.
pub async fn aggregate_log(log_path: &Path) -> Result<LatencySummary, StatsError> {
    let file = File::open(log_path)
        .await
        .map_err(|source| StatsError::OpenLog {
            path: log_path.to_path_buf(),
            source,
        })?;
    let mut reader = BufReader::new(file);
    let mut line = String::new();
    let mut line_no: u64 = 0;
    let mut summary = LatencySummary::default();

    loop {
        line.clear();
        let bytes = reader
            .read_line(&mut line)
            .await
            .map_err(|source| StatsError::ReadLog {
                path: log_path.to_path_buf(),
                source,
            })?;
        if bytes == 0 {
            break;
        }
        line_no = line_no.saturating_add(1);

        let record = parse_log_line(&line, line_no)?;
        summary.record(record.duration(), record.status_code);
    }

    Ok(summary)
}
