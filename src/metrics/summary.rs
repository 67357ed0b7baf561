use std::time::Duration;

const NANOS_PER_MILLI: u128 = 1_000_000;

/// Status class a result is counted under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    /// 1..400
    Success,
    /// 400..500
    ClientError,
    /// 500 and above
    ServerError,
    /// No HTTP response (status 0)
    NetworkError,
}

impl StatusClass {
    #[must_use]
    pub const fn classify(status_code: u16) -> Self {
        match status_code {
            0 => StatusClass::NetworkError,
            1..=399 => StatusClass::Success,
            400..=499 => StatusClass::ClientError,
            _ => StatusClass::ServerError,
        }
    }
}

/// Count plus accumulated duration; the mean is only derived on read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Bucket {
    count: u64,
    total_nanos: u128,
}

impl Bucket {
    fn record(&mut self, duration: Duration) {
        self.count = self.count.saturating_add(1);
        self.total_nanos = self.total_nanos.saturating_add(duration.as_nanos());
    }

    #[must_use]
    pub const fn count(&self) -> u64 {
        self.count
    }

    #[must_use]
    pub fn average(&self) -> Duration {
        let avg = self
            .total_nanos
            .checked_div(u128::from(self.count))
            .unwrap_or(0);
        Duration::from_nanos(u64::try_from(avg).unwrap_or(u64::MAX))
    }

    #[must_use]
    pub fn average_ms(&self) -> u64 {
        let avg = self
            .total_nanos
            .checked_div(u128::from(self.count))
            .unwrap_or(0)
            .checked_div(NANOS_PER_MILLI)
            .unwrap_or(0);
        u64::try_from(avg).unwrap_or(u64::MAX)
    }
}

/// Streaming aggregate over request results. Holds no per-record data.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LatencySummary {
    pub overall: Bucket,
    pub success: Bucket,
    pub client_error: Bucket,
    pub server_error: Bucket,
    pub network_error: Bucket,
    fastest: Option<Duration>,
    slowest: Option<Duration>,
}

impl LatencySummary {
    pub fn record(&mut self, duration: Duration, status_code: u16) {
        self.overall.record(duration);
        match StatusClass::classify(status_code) {
            StatusClass::Success => self.success.record(duration),
            StatusClass::ClientError => self.client_error.record(duration),
            StatusClass::ServerError => self.server_error.record(duration),
            StatusClass::NetworkError => self.network_error.record(duration),
        }
        self.fastest = Some(self.fastest.map_or(duration, |fastest| fastest.min(duration)));
        self.slowest = Some(self.slowest.map_or(duration, |slowest| slowest.max(duration)));
    }

    #[must_use]
    pub const fn bucket(&self, class: StatusClass) -> &Bucket {
        match class {
            StatusClass::Success => &self.success,
            StatusClass::ClientError => &self.client_error,
            StatusClass::ServerError => &self.server_error,
            StatusClass::NetworkError => &self.network_error,
        }
    }

    #[must_use]
    pub const fn total(&self) -> u64 {
        self.overall.count()
    }

    #[must_use]
    pub fn fastest(&self) -> Duration {
        self.fastest.unwrap_or_default()
    }

    #[must_use]
    pub fn slowest(&self) -> Duration {
        self.slowest.unwrap_or_default()
    }

    #[must_use]
    pub fn fastest_ms(&self) -> u64 {
        duration_ms(self.fastest())
    }

    #[must_use]
    pub fn slowest_ms(&self) -> u64 {
        duration_ms(self.slowest())
    }
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
