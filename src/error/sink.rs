use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("Failed to create result log '{path}': {source}")]
    CreateLog {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to write result log '{path}': {source}")]
    WriteLog {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to flush result log '{path}': {source}")]
    FlushLog {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to format result line: {source}")]
    FormatLine {
        #[source]
        source: std::fmt::Error,
    },
    #[error("Failed to quote error message: {source}")]
    QuoteMessage {
        #[source]
        source: serde_json::Error,
    },
}
