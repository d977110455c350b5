// Wallet Engine — Cancellation
// CancelHandle / CancelSignal: a caller-owned abort switch plus an optional
// deadline, raced against every network-bound future with tokio::select!.

use std::future::Future;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::Instant;

use crate::atoms::error::{EngineError, EngineResult};

/// Owner side. Dropping the handle without calling `cancel` leaves the
/// signal armed only by its deadline.
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    pub fn new() -> (Self, CancelSignal) {
        let (tx, rx) = watch::channel(false);
        (Self { tx }, CancelSignal { rx: Some(rx), deadline: None })
    }

    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }
}

/// Passed into every network-bound engine operation.
#[derive(Debug, Clone, Default)]
pub struct CancelSignal {
    rx: Option<watch::Receiver<bool>>,
    deadline: Option<Instant>,
}

impl CancelSignal {
    /// A signal that never fires.
    pub fn never() -> Self {
        Self::default()
    }

    /// Fires once `timeout` has elapsed from now.
    pub fn timeout(timeout: Duration) -> Self {
        Self::never().with_deadline(timeout)
    }

    /// Adds (or tightens) a deadline `timeout` from now. A timeout too far
    /// out to represent as an `Instant` adds no deadline.
    pub fn with_deadline(mut self, timeout: Duration) -> Self {
        let Some(at) = Instant::now().checked_add(timeout) else {
            return self;
        };
        self.deadline = Some(match self.deadline {
            Some(existing) if existing < at => existing,
            _ => at,
        });
        self
    }

    pub fn is_cancelled(&self) -> bool {
        let flagged = self.rx.as_ref().map(|rx| *rx.borrow()).unwrap_or(false);
        let expired = self.deadline.map(|d| Instant::now() >= d).unwrap_or(false);
        flagged || expired
    }

    /// Fail fast before starting work that cannot be interrupted midway.
    pub fn check(&self) -> EngineResult<()> {
        if self.is_cancelled() {
            Err(EngineError::Cancelled)
        } else {
            Ok(())
        }
    }

    /// Drive `fut` to completion unless the signal fires first, in which case
    /// the future is dropped and `Cancelled` is returned.
    pub async fn run<T, F>(&self, fut: F) -> EngineResult<T>
    where
        F: Future<Output = EngineResult<T>>,
    {
        self.check()?;
        tokio::select! {
            biased;
            _ = self.fired() => Err(EngineError::Cancelled),
            out = fut => out,
        }
    }

    async fn fired(&self) {
        let flag = async {
            match self.rx.clone() {
                Some(mut rx) => {
                    // Sender gone without cancelling: only the deadline remains.
                    if rx.wait_for(|c| *c).await.is_err() {
                        std::future::pending::<()>().await;
                    }
                }
                None => std::future::pending::<()>().await,
            }
        };
        let deadline = async {
            match self.deadline {
                Some(at) => tokio::time::sleep_until(at).await,
                None => std::future::pending::<()>().await,
            }
        };
        tokio::select! {
            _ = flag => {}
            _ = deadline => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn never_lets_work_finish() {
        let out = CancelSignal::never().run(async { Ok::<_, EngineError>(7) }).await;
        assert_eq!(out.unwrap(), 7);
    }

    #[tokio::test]
    async fn cancel_aborts_pending_work() {
        let (handle, signal) = CancelHandle::new();
        let task = tokio::spawn(async move {
            signal.run(async {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Ok::<_, EngineError>(())
            }).await
        });
        tokio::time::sleep(Duration::from_millis(10)).await;
        handle.cancel();
        assert!(matches!(task.await.unwrap(), Err(EngineError::Cancelled)));
    }

    #[tokio::test]
    async fn already_cancelled_skips_work() {
        let (handle, signal) = CancelHandle::new();
        handle.cancel();
        assert!(signal.is_cancelled());
        let ran = std::sync::atomic::AtomicBool::new(false);
        let out = signal.run(async {
            ran.store(true, std::sync::atomic::Ordering::SeqCst);
            Ok::<_, EngineError>(())
        }).await;
        assert!(matches!(out, Err(EngineError::Cancelled)));
        assert!(!ran.load(std::sync::atomic::Ordering::SeqCst));
    }

    #[tokio::test]
    async fn deadline_fires() {
        let signal = CancelSignal::timeout(Duration::from_millis(20));
        let out = signal.run(async {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok::<_, EngineError>(())
        }).await;
        assert!(matches!(out, Err(EngineError::Cancelled)));
    }

    #[tokio::test]
    async fn unrepresentable_deadline_never_fires() {
        let signal = CancelSignal::timeout(Duration::MAX);
        assert!(!signal.is_cancelled());
        let out = signal.run(async { Ok::<_, EngineError>(1) }).await;
        assert_eq!(out.unwrap(), 1);

        let tight = CancelSignal::timeout(Duration::from_millis(5)).with_deadline(Duration::MAX);
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(tight.is_cancelled());
    }

    #[tokio::test]
    async fn dropped_handle_does_not_cancel() {
        let (handle, signal) = CancelHandle::new();
        drop(handle);
        assert!(!signal.is_cancelled());
        let out = signal.run(async { Ok::<_, EngineError>("done") }).await;
        assert_eq!(out.unwrap(), "done");
    }
}
