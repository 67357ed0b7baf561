use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use tracing::debug;

use crate::error::ValidationError;

const NANOS_PER_SEC: u64 = 1_000_000_000;
/// Timer wakeups are millisecond-granular, so rates above 1000/s need more
/// than one pending permit per wakeup to keep up.
const TICKS_PER_WAKEUP_DIVISOR: u64 = 1_000;

/// Paces request admission: one permit every `1 / target_rps` seconds,
/// the first one immediately, until stopped.
#[derive(Debug)]
pub struct RateGate {
    permits: Arc<Semaphore>,
    ticker: JoinHandle<()>,
}

/// Cloneable handle workers use to wait for their next admission.
#[derive(Debug, Clone)]
pub struct Admission {
    permits: Arc<Semaphore>,
}

impl RateGate {
    /// Starts the admission timer on the current runtime.
    ///
    /// # Errors
    ///
    /// Returns an error when `target_rps` is zero.
    pub fn start(target_rps: u64) -> Result<Self, ValidationError> {
        let period = tick_period(target_rps)?;
        let max_pending = pending_cap(target_rps);
        let permits = Arc::new(Semaphore::new(0));
        let ticker = spawn_ticker(Arc::clone(&permits), period, max_pending);
        debug!(
            "Rate gate started: {} req/s, tick every {:?}",
            target_rps, period
        );
        Ok(Self { permits, ticker })
    }

    #[must_use]
    pub fn admission(&self) -> Admission {
        Admission {
            permits: Arc::clone(&self.permits),
        }
    }

    /// Stops the timer and wakes every waiting worker with a refusal.
    pub fn stop(self) {
        debug!("Rate gate stopped");
        drop(self);
    }

    fn halt(&self) {
        self.ticker.abort();
        self.permits.close();
    }
}

impl Drop for RateGate {
    fn drop(&mut self) {
        self.halt();
    }
}

impl Admission {
    /// Waits for one admission. Returns `false` once the gate is stopped.
    pub async fn acquire(&self) -> bool {
        match self.permits.acquire().await {
            Ok(permit) => {
                permit.forget();
                true
            }
            Err(_closed) => false,
        }
    }
}

pub(crate) fn tick_period(target_rps: u64) -> Result<Duration, ValidationError> {
    if target_rps == 0 {
        return Err(ValidationError::ValueTooSmall { min: 1 });
    }
    let nanos = NANOS_PER_SEC.checked_div(target_rps).unwrap_or(0).max(1);
    Ok(Duration::from_nanos(nanos))
}

pub(crate) fn pending_cap(target_rps: u64) -> usize {
    let cap = target_rps
        .checked_div(TICKS_PER_WAKEUP_DIVISOR)
        .unwrap_or(0)
        .max(1);
    usize::try_from(cap).unwrap_or(usize::MAX)
}

fn spawn_ticker(permits: Arc<Semaphore>, period: Duration, max_pending: usize) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut rate_tick = interval(period);
        rate_tick.set_missed_tick_behavior(MissedTickBehavior::Burst);
        loop {
            rate_tick.tick().await;
            if permits.is_closed() {
                break;
            }
            if permits.available_permits() < max_pending {
                permits.add_permits(1);
            }
        }
    })
}
