use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StatsError {
    #[error("Cannot open result log '{path}' for stats: {source}")]
    OpenLog {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to read result log '{path}': {source}")]
    ReadLog {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Result log line {line} is broken: expected {expected} fields, got {found}.")]
    FieldCount {
        line: u64,
        expected: usize,
        found: usize,
    },
    #[error("Result log line {line}: cannot parse {field} '{value}': {source}")]
    InvalidTimestamp {
        line: u64,
        field: &'static str,
        value: String,
        #[source]
        source: chrono::ParseError,
    },
    #[error("Result log line {line}: cannot parse {field} '{value}': {source}")]
    InvalidNumber {
        line: u64,
        field: &'static str,
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },
    #[error("Result log line {line}: success flag must be 0 or 1, got '{value}'.")]
    InvalidFlag { line: u64, value: String },
    #[error("Result log line {line}: malformed quoted message: {source}")]
    InvalidMessage {
        line: u64,
        #[source]
        source: serde_json::Error,
    },
}
