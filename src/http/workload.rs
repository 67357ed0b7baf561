//! Request body generation and the bounded queue feeding the workers.
mod template;

use std::sync::Arc;

use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tracing::debug;

use crate::shutdown::ShutdownReceiver;

pub use template::render_payload;

/// One request body plus its 1-based position in the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload {
    pub seq: u64,
    pub body: String,
}

/// Lazily yields payloads `1..=total`; consumed once.
#[derive(Debug)]
pub struct PayloadGenerator {
    template: String,
    total: u64,
    next_seq: u64,
}

impl PayloadGenerator {
    #[must_use]
    pub const fn new(template: String, total: u64) -> Self {
        Self {
            template,
            total,
            next_seq: 1,
        }
    }
}

impl Iterator for PayloadGenerator {
    type Item = Payload;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next_seq > self.total {
            return None;
        }
        let seq = self.next_seq;
        self.next_seq = self.next_seq.saturating_add(1);
        Some(Payload {
            seq,
            body: render_payload(&self.template, seq, self.total),
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self
            .total
            .saturating_add(1)
            .saturating_sub(self.next_seq);
        let remaining = usize::try_from(remaining).unwrap_or(usize::MAX);
        (remaining, Some(remaining))
    }
}

/// Multi-consumer side of the payload channel: every payload is handed to
/// exactly one caller of [`PayloadQueue::next`].
#[derive(Debug, Clone)]
pub struct PayloadQueue {
    rx: Arc<Mutex<mpsc::Receiver<Payload>>>,
}

impl PayloadQueue {
    #[must_use]
    pub fn new(rx: mpsc::Receiver<Payload>) -> Self {
        Self {
            rx: Arc::new(Mutex::new(rx)),
        }
    }

    /// Next unclaimed payload, or `None` once the generator is done and the
    /// buffer is drained.
    pub async fn next(&self) -> Option<Payload> {
        self.rx.lock().await.recv().await
    }

    /// Refuses further payloads; a generator blocked on a full queue is
    /// released with a send error.
    pub async fn close(&self) {
        self.rx.lock().await.close();
    }
}

/// Pushes every payload into `tx`, stopping early on cancellation or when
/// the queue is closed. Returns how many payloads were enqueued. Dropping
/// `tx` on return closes the queue for the consumers.
pub fn spawn_payload_generator(
    generator: PayloadGenerator,
    tx: mpsc::Sender<Payload>,
    mut shutdown_rx: ShutdownReceiver,
) -> JoinHandle<u64> {
    tokio::spawn(async move {
        let mut produced: u64 = 0;
        for payload in generator {
            if shutdown_rx.is_triggered() {
                break;
            }
            let sent = tokio::select! {
                biased;
                () = shutdown_rx.wait() => false,
                result = tx.send(payload) => result.is_ok(),
            };
            if !sent {
                debug!("Payload generator stopped after {} payloads", produced);
                break;
            }
            produced = produced.saturating_add(1);
        }
        produced
    })
}
