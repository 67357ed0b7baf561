use std::time::Duration;

use chrono::{DateTime, NaiveDateTime, SubsecRound, TimeDelta, Utc};

/// Outcome of one dispatched request.
///
/// `status_code == 0` means no HTTP response was obtained; any received
/// status, 4xx and 5xx included, is a succeeded exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestResult {
    pub seq: u64,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    pub succeeded: bool,
    pub status_code: u16,
    pub error_message: String,
}

impl RequestResult {
    #[must_use]
    pub fn completed(
        seq: u64,
        started_at: DateTime<Utc>,
        elapsed: Duration,
        status_code: u16,
    ) -> Self {
        Self {
            seq,
            started_at: started_at.trunc_subsecs(LOG_SUBSEC_DIGITS),
            ended_at: advance(started_at, elapsed),
            succeeded: true,
            status_code,
            error_message: String::new(),
        }
    }

    #[must_use]
    pub fn failed(
        seq: u64,
        started_at: DateTime<Utc>,
        elapsed: Duration,
        error_message: String,
    ) -> Self {
        Self {
            seq,
            started_at: started_at.trunc_subsecs(LOG_SUBSEC_DIGITS),
            ended_at: advance(started_at, elapsed),
            succeeded: false,
            status_code: 0,
            error_message,
        }
    }

    #[must_use]
    pub fn duration(&self) -> Duration {
        self.ended_at
            .signed_duration_since(self.started_at)
            .to_std()
            .unwrap_or_default()
    }
}

/// Fractional digits kept in log timestamps. Results are stored at the
/// same precision so live and log-based summaries agree.
const LOG_SUBSEC_DIGITS: u16 = 6;

/// End timestamps are derived from a monotonic measurement so they can
/// never precede the start, even if the wall clock steps backwards.
fn advance(started_at: DateTime<Utc>, elapsed: Duration) -> DateTime<Utc> {
    let started_at = started_at.trunc_subsecs(LOG_SUBSEC_DIGITS);
    let micros = i64::try_from(elapsed.as_micros()).unwrap_or(i64::MAX);
    started_at
        .checked_add_signed(TimeDelta::microseconds(micros))
        .unwrap_or(started_at)
}

/// One line of the result log, as read back for statistics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub seq: u64,
    pub started_at: NaiveDateTime,
    pub ended_at: NaiveDateTime,
    pub succeeded: bool,
    pub status_code: u16,
    pub error_message: String,
}

impl LogRecord {
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.ended_at
            .signed_duration_since(self.started_at)
            .to_std()
            .unwrap_or_default()
    }
}
