//! In-flight request accounting.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::Notify;

#[derive(Debug, Default)]
struct Inner {
    count: AtomicUsize,
    idle: Notify,
}

/// Shared count of dispatched but unsettled requests.
///
/// The count only changes through [`InFlightGuard`]: one increment when the
/// guard is created, one decrement when it is dropped. It can therefore never
/// go below zero, and a request task that panics or is aborted still settles.
#[derive(Debug, Clone, Default)]
pub struct InFlight {
    inner: Arc<Inner>,
}

impl InFlight {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> usize {
        self.inner.count.load(Ordering::SeqCst)
    }

    /// Count one more request until the returned guard is dropped.
    pub fn enter(&self) -> InFlightGuard {
        self.inner.count.fetch_add(1, Ordering::SeqCst);
        InFlightGuard {
            inner: Arc::clone(&self.inner),
        }
    }

    /// Resolve once nothing is in flight.
    pub async fn wait_idle(&self) {
        loop {
            let notified = self.inner.idle.notified();
            if self.get() == 0 {
                return;
            }
            notified.await;
        }
    }
}

/// Keeps one request counted while alive.
#[derive(Debug)]
pub struct InFlightGuard {
    inner: Arc<Inner>,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        if self.inner.count.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.inner.idle.notify_waiters();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn guards_balance() {
        let in_flight = InFlight::new();
        let a = in_flight.enter();
        let b = in_flight.enter();
        assert_eq!(in_flight.get(), 2);
        drop(a);
        assert_eq!(in_flight.get(), 1);
        drop(b);
        assert_eq!(in_flight.get(), 0);
    }

    #[tokio::test]
    async fn wait_idle_returns_immediately_when_empty() {
        tokio::time::timeout(Duration::from_secs(1), InFlight::new().wait_idle())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn wait_idle_wakes_when_last_guard_drops() {
        let in_flight = InFlight::new();
        let guards: Vec<_> = (0..3).map(|_| in_flight.enter()).collect();

        let task = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            drop(guards);
        });

        tokio::time::timeout(Duration::from_secs(5), in_flight.wait_idle())
            .await
            .unwrap();
        assert_eq!(in_flight.get(), 0);
        task.await.unwrap();
    }

    #[tokio::test]
    async fn aborted_task_releases_its_guard() {
        let in_flight = InFlight::new();
        let guard = in_flight.enter();
        let task = tokio::spawn(async move {
            let _guard = guard;
            std::future::pending::<()>().await;
        });
        assert_eq!(in_flight.get(), 1);

        task.abort();
        let _ = task.await;
        assert_eq!(in_flight.get(), 0);
    }
}
