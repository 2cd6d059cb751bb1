//! Cooperative cancellation shared between a controller and its tasks.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use futures::channel::oneshot;
use futures::future::{self, Either, FutureExt, Shared};

/// A cloneable, idempotent cancellation signal.
///
/// Every clone observes the same signal. Cancelling twice, or after the
/// task that watches the token has already finished, is harmless.
///
/// # Example
///
/// ```
/// use hue_govee_bridge::runtime::CancelToken;
///
/// let token = CancelToken::new();
/// let watcher = token.clone();
/// assert!(!watcher.is_cancelled());
///
/// token.cancel();
/// token.cancel();
/// assert!(watcher.is_cancelled());
/// ```
#[derive(Clone)]
pub struct CancelToken {
    inner: Arc<Inner>,
}

struct Inner {
    cancelled: AtomicBool,
    trigger: Mutex<Option<oneshot::Sender<()>>>,
    signal: Shared<oneshot::Receiver<()>>,
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CancelToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CancelToken")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

impl CancelToken {
    pub fn new() -> Self {
        let (trigger, signal) = oneshot::channel();
        CancelToken {
            inner: Arc::new(Inner {
                cancelled: AtomicBool::new(false),
                trigger: Mutex::new(Some(trigger)),
                signal: signal.shared(),
            }),
        }
    }

    /// Request cancellation and wake every task waiting on this token.
    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::SeqCst);
        // Dropping the sender resolves every clone of the shared receiver.
        let trigger = self
            .inner
            .trigger
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        drop(trigger);
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    /// Resolves once [`CancelToken::cancel`] has been called.
    pub async fn cancelled(&self) {
        if self.is_cancelled() {
            return;
        }
        let _ = self.inner.signal.clone().await;
    }

    /// Sleep for `duration` unless cancelled first.
    ///
    /// Returns `true` when the full duration elapsed and the token is still
    /// live, `false` when cancellation cut the wait short.
    pub async fn sleep(&self, duration: Duration) -> bool {
        let sleep = std::pin::pin!(super::sleep(duration));
        let cancelled = std::pin::pin!(self.cancelled());
        match future::select(sleep, cancelled).await {
            Either::Left(_) => !self.is_cancelled(),
            Either::Right(_) => false,
        }
    }
}
