//! Result records, the persisted result log, and latency aggregation.
mod logging;
mod summary;
mod types;


pub use logging::{
    LOG_FIELD_COUNT, SinkReport, TIMESTAMP_FORMAT, aggregate_log, encode_log_line,
    parse_log_line, spawn_result_sink,
};
pub use summary::{Bucket, LatencySummary, StatusClass};
pub use types::{LogRecord, RequestResult};
