//! Shutdown coordination.

use tokio::sync::broadcast;

use crate::lifecycle::signals;

/// Coordinator for graceful shutdown.
///
/// Servers and the load generator each hold a receiver and stop when the
/// signal fires.
pub struct Shutdown {
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Fire the signal. Receivers created afterwards will not see it.
    pub fn trigger(&self) {
        let _ = self.tx.send(());
    }

    /// Trigger shutdown once Ctrl+C or SIGTERM arrives.
    pub fn trigger_on_signal(&self) {
        let tx = self.tx.clone();
        tokio::spawn(async move {
            signals::wait_for_signal().await;
            let _ = tx.send(());
        });
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
