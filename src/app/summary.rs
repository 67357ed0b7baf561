use tracing::{info, warn};

use crate::error::{AppError, AppResult};
use crate::metrics::{LatencySummary, SinkReport, aggregate_log};

/// Aggregates the persisted result log, or the sink's live aggregate when
/// the log could not be written.
///
/// # Errors
///
/// Returns an error when the log exists but cannot be read or parsed.
pub async fn summarize(sink: &SinkReport) -> AppResult<LatencySummary> {
    if let Some(err) = sink.error.as_ref() {
        warn!("Result log unusable ({}); summarizing in-memory results", err);
        return Ok(sink.live.clone());
    }
    info!("Results written to {}", sink.path.display());
    aggregate_log(&sink.path).await.map_err(AppError::stats)
}
