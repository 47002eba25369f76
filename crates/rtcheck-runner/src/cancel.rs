//! Per-test cancellation.
//!
//! A [`CancellationSource`] owns the deadline for one test; the
//! [`CancellationToken`]s it hands out are cheap clones observed by the
//! process supervisor. A token fires either when `cancel()` is called or when
//! its deadline passes, whichever comes first.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::Notify;
use tokio::time::Instant;

#[derive(Debug)]
struct Inner {
    cancelled: AtomicBool,
    notify: Notify,
    armed_at: Instant,
    deadline: Option<Instant>,
}

impl Inner {
    fn fire(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
        self.notify.notify_waiters();
    }

    fn deadline_passed(&self) -> bool {
        self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    async fn wait_for_flag(&self) {
        loop {
            let notified = self.notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            if self.cancelled.load(Ordering::SeqCst) {
                return;
            }
            notified.await;
        }
    }
}

/// Observer side of a cancellation scope.
#[derive(Debug, Clone)]
pub struct CancellationToken {
    inner: Option<Arc<Inner>>,
}

impl CancellationToken {
    /// A token that can be cancelled manually and has no deadline.
    #[must_use]
    pub fn new() -> Self {
        Self::armed(None)
    }

    /// A token that never fires.
    #[must_use]
    pub fn none() -> Self {
        Self { inner: None }
    }

    fn armed(timeout: Option<Duration>) -> Self {
        let armed_at = Instant::now();
        Self {
            inner: Some(Arc::new(Inner {
                cancelled: AtomicBool::new(false),
                notify: Notify::new(),
                armed_at,
                // A deadline past the end of the clock never fires.
                deadline: timeout.and_then(|t| armed_at.checked_add(t)),
            })),
        }
    }

    pub fn cancel(&self) {
        if let Some(inner) = &self.inner {
            inner.fire();
        }
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.inner
            .as_ref()
            .is_some_and(|inner| inner.cancelled.load(Ordering::SeqCst) || inner.deadline_passed())
    }

    /// Time since the token was created.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.inner
            .as_ref()
            .map_or(Duration::ZERO, |inner| inner.armed_at.elapsed())
    }

    /// Resolves once the token is cancelled. Never resolves for [`none`](Self::none).
    pub async fn cancelled(&self) {
        let Some(inner) = &self.inner else {
            return std::future::pending().await;
        };

        match inner.deadline {
            Some(deadline) => {
                tokio::select! {
                    () = inner.wait_for_flag() => {}
                    () = tokio::time::sleep_until(deadline) => inner.fire(),
                }
            }
            None => inner.wait_for_flag().await,
        }
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

/// Owner of a per-test cancellation scope.
#[derive(Debug)]
pub struct CancellationSource {
    token: CancellationToken,
}

impl CancellationSource {
    /// Arm a deadline `timeout` from now. `Duration::ZERO` never fires.
    #[must_use]
    pub fn with_timeout(timeout: Duration) -> Self {
        let timeout = (!timeout.is_zero()).then_some(timeout);
        Self {
            token: CancellationToken::armed(timeout),
        }
    }

    /// Like [`with_timeout`](Self::with_timeout), `None` meaning no deadline.
    #[must_use]
    pub fn with_optional_timeout(timeout: Option<Duration>) -> Self {
        Self::with_timeout(timeout.unwrap_or(Duration::ZERO))
    }

    #[must_use]
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }
}
