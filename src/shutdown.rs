//! Run-wide cancellation signal shared by the generator and the workers.
use std::sync::Arc;

use tokio::sync::watch;

#[derive(Debug, Clone)]
pub struct ShutdownSender {
    tx: Arc<watch::Sender<bool>>,
}

#[derive(Debug, Clone)]
pub struct ShutdownReceiver {
    rx: watch::Receiver<bool>,
}

#[must_use]
pub fn shutdown_channel() -> (ShutdownSender, ShutdownReceiver) {
    let (tx, rx) = watch::channel(false);
    (ShutdownSender { tx: Arc::new(tx) }, ShutdownReceiver { rx })
}

impl ShutdownSender {
    /// Raises the signal. Returns `true` only for the call that actually
    /// flipped it, so callers can report a cause exactly once.
    pub fn trigger(&self) -> bool {
        self.tx.send_if_modified(|stopped| {
            if *stopped {
                false
            } else {
                *stopped = true;
                true
            }
        })
    }

    #[must_use]
    pub fn is_triggered(&self) -> bool {
        *self.tx.borrow()
    }

    #[must_use]
    pub fn subscribe(&self) -> ShutdownReceiver {
        ShutdownReceiver {
            rx: self.tx.subscribe(),
        }
    }
}

impl ShutdownReceiver {
    /// Resolves once the signal is raised. Never resolves if every sender
    /// is dropped without raising it.
    pub async fn wait(&mut self) {
        if self.rx.wait_for(|stopped| *stopped).await.is_err() {
            std::future::pending::<()>().await;
        }
    }

    #[must_use]
    pub fn is_triggered(&self) -> bool {
        *self.rx.borrow()
    }
}
