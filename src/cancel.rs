//! Caller cancellation merged with an internal deadline.
//!
//! A [`CancelHandle`] / [`CancelSignal`] pair is the caller's side: the
//! handle cancels, any number of cloned signals observe it. [`compose`] pairs
//! an optional caller signal with a deadline fixed at call start and
//! remembers which of the two fired, so the client can tell a timeout (which
//! may be answered with offline data) from an explicit cancellation (which
//! must always reach the caller).
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use finance_feasibility_sdk::cancel::{cancel_pair, compose};
//!
//! # async fn example() {
//! let (handle, signal) = cancel_pair();
//! let composed = compose(Some(signal), Duration::from_millis(2500));
//! handle.cancel();
//! let outcome = composed.guard(async { 42 }).await;
//! assert!(outcome.is_err());
//! assert!(!composed.was_timeout());
//! # }
//! ```

use std::future::Future;
use std::sync::OnceLock;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::Instant;

use crate::error::AbortCause;

// ---------------------------------------------------------------------------
// CancelHandle / CancelSignal
// ---------------------------------------------------------------------------

/// The cancelling side. Dropping it without calling [`cancel`](Self::cancel)
/// never cancels anything.
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

/// The observing side. Cheap to clone.
#[derive(Debug, Clone)]
pub struct CancelSignal {
    rx: watch::Receiver<bool>,
}

/// Create a connected handle and signal.
pub fn cancel_pair() -> (CancelHandle, CancelSignal) {
    let (tx, rx) = watch::channel(false);
    (CancelHandle { tx }, CancelSignal { rx })
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }

    /// Another signal observing this handle.
    pub fn signal(&self) -> CancelSignal {
        CancelSignal {
            rx: self.tx.subscribe(),
        }
    }
}

impl CancelSignal {
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolve once the handle cancels. Pends forever if the handle is
    /// dropped first.
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        loop {
            if *rx.borrow_and_update() {
                return;
            }
            if rx.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }
}

// ---------------------------------------------------------------------------
// ComposedSignal
// ---------------------------------------------------------------------------

/// Effective signal for one call: aborts when the caller cancels or when the
/// deadline passes, whichever comes first.
#[derive(Debug)]
pub struct ComposedSignal {
    caller: Option<CancelSignal>,
    timeout: Duration,
    deadline: Instant,
    fired: OnceLock<AbortCause>,
}

/// Start the deadline clock now and attach the caller's signal, if any.
pub fn compose(caller: Option<CancelSignal>, timeout: Duration) -> ComposedSignal {
    ComposedSignal {
        caller,
        timeout,
        deadline: Instant::now() + timeout,
        fired: OnceLock::new(),
    }
}

impl ComposedSignal {
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Which source aborted the call, if either has.
    pub fn cause(&self) -> Option<AbortCause> {
        self.fired.get().copied()
    }

    pub fn was_timeout(&self) -> bool {
        matches!(self.cause(), Some(AbortCause::Timeout { .. }))
    }

    pub fn was_cancelled(&self) -> bool {
        matches!(self.cause(), Some(AbortCause::Caller))
    }

    /// Drive `fut` until it finishes or the composed signal aborts.
    ///
    /// The caller signal is checked first, so a cancellation that is already
    /// visible wins over both a ready result and an expired deadline. When
    /// this returns, the deadline timer and the caller watcher have been
    /// dropped along with `fut`.
    pub async fn guard<F: Future>(&self, fut: F) -> Result<F::Output, AbortCause> {
        if let Some(cause) = self.cause() {
            return Err(cause);
        }
        if self.caller.as_ref().is_some_and(CancelSignal::is_cancelled) {
            return Err(self.record(AbortCause::Caller));
        }

        let caller = async {
            match &self.caller {
                Some(signal) => signal.cancelled().await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            _ = caller => Err(self.record(AbortCause::Caller)),
            out = fut => Ok(out),
            _ = tokio::time::sleep_until(self.deadline) => Err(self.record(AbortCause::Timeout {
                timeout: self.timeout,
            })),
        }
    }

    /// First recorded cause wins.
    fn record(&self, cause: AbortCause) -> AbortCause {
        let _ = self.fired.set(cause);
        self.cause().unwrap_or(cause)
    }
}
