mod reader;
mod writer;

use std::fmt::Write as _;

use chrono::NaiveDateTime;

use crate::error::{SinkError, StatsError};

use super::{LogRecord, RequestResult};

pub use reader::aggregate_log;
pub use writer::{SinkReport, spawn_result_sink};

/// Fields per line: `seq,start,end,success,status,"message"`.
pub const LOG_FIELD_COUNT: usize = 6;
/// Fixed-width UTC timestamp with microsecond precision.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// Appends one newline-terminated log line for `result` to `buffer`.
///
/// # Errors
///
/// Returns an error when the message cannot be quoted or the line cannot be
/// formatted.
pub fn encode_log_line(buffer: &mut String, result: &RequestResult) -> Result<(), SinkError> {
    let message = serde_json::to_string(&result.error_message)
        .map_err(|source| SinkError::QuoteMessage { source })?;
    writeln!(
        buffer,
        "{},{},{},{},{},{}",
        result.seq,
        result.started_at.format(TIMESTAMP_FORMAT),
        result.ended_at.format(TIMESTAMP_FORMAT),
        u8::from(result.succeeded),
        result.status_code,
        message
    )
    .map_err(|source| SinkError::FormatLine { source })
}

/// Parses one log line. `line_no` is 1-based and only used in errors.
///
/// The quoted message is the last field and may itself contain commas, so
/// only the first five separators split fields.
///
/// # Errors
///
/// Returns an error on a wrong field count or any unparsable field.
pub fn parse_log_line(line: &str, line_no: u64) -> Result<LogRecord, StatsError> {
    let trimmed = line.trim_end_matches(['\r', '\n']);
    let fields: Vec<&str> = trimmed.splitn(LOG_FIELD_COUNT, ',').collect();
    let [seq, start, end, flag, status, message] = fields.as_slice() else {
        return Err(StatsError::FieldCount {
            line: line_no,
            expected: LOG_FIELD_COUNT,
            found: fields.len(),
        });
    };

    let seq = parse_number::<u64>(seq, "sequence number", line_no)?;
    let started_at = parse_timestamp(start, "start time", line_no)?;
    let ended_at = parse_timestamp(end, "end time", line_no)?;
    let succeeded = match *flag {
        "0" => false,
        "1" => true,
        other => {
            return Err(StatsError::InvalidFlag {
                line: line_no,
                value: other.to_owned(),
            });
        }
    };
    let status_code = parse_number::<u16>(status, "status code", line_no)?;
    let error_message = serde_json::from_str::<String>(message).map_err(|source| {
        StatsError::InvalidMessage {
            line: line_no,
            source,
        }
    })?;

    Ok(LogRecord {
        seq,
        started_at,
        ended_at,
        succeeded,
        status_code,
        error_message,
    })
}

fn parse_timestamp(
    value: &str,
    field: &'static str,
    line_no: u64,
) -> Result<NaiveDateTime, StatsError> {
    NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT).map_err(|source| {
        StatsError::InvalidTimestamp {
            line: line_no,
            field,
            value: value.to_owned(),
            source,
        }
    })
}

fn parse_number<T>(value: &str, field: &'static str, line_no: u64) -> Result<T, StatsError>
where
    T: std::str::FromStr<Err = std::num::ParseIntError>,
{
    value.parse::<T>().map_err(|source| StatsError::InvalidNumber {
        line: line_no,
        field,
        value: value.to_owned(),
        source,
    })
}
