//! Cooperative cancellation for counter operations.
//!
//! A [`Cancellation`] is the receiving side of a `tokio::sync::watch`
//! channel carrying `false` until the paired [`CancelHandle`] fires. Backends
//! check it before touching storage and race it against I/O.

use tokio::sync::watch;

use crate::CounterError;

/// Sending side: flips the shared flag to cancelled.
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    /// Requests cancellation. Idempotent.
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    /// Returns true once `cancel` has been called.
    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }

    /// Returns another signal observing this handle.
    pub fn signal(&self) -> Cancellation {
        Cancellation {
            rx: Some(self.tx.subscribe()),
        }
    }
}

/// Receiving side, passed into every counter operation.
///
/// The default value never fires.
#[derive(Debug, Clone, Default)]
pub struct Cancellation {
    rx: Option<watch::Receiver<bool>>,
}

impl Cancellation {
    /// A signal that never fires.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Creates a connected handle/signal pair.
    #[must_use]
    pub fn channel() -> (CancelHandle, Cancellation) {
        let (tx, rx) = watch::channel(false);
        (CancelHandle { tx }, Cancellation { rx: Some(rx) })
    }

    /// Wraps an existing shutdown-style channel (`true` means cancelled).
    #[must_use]
    pub fn from_receiver(rx: watch::Receiver<bool>) -> Self {
        Self { rx: Some(rx) }
    }

    /// Returns true if cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.rx.as_ref().is_some_and(|rx| *rx.borrow())
    }

    /// Fails with [`CounterError::Cancelled`] if cancellation has been requested.
    pub fn check(&self) -> Result<(), CounterError> {
        if self.is_cancelled() {
            return Err(CounterError::Cancelled);
        }
        Ok(())
    }

    /// Resolves once cancellation is requested.
    ///
    /// Never resolves for [`Cancellation::none`] or when the handle is dropped
    /// without cancelling.
    pub async fn cancelled(&self) {
        let Some(rx) = &self.rx else {
            return std::future::pending().await;
        };

        let mut rx = rx.clone();
        loop {
            if *rx.borrow_and_update() {
                return;
            }
            if rx.changed().await.is_err() {
                return std::future::pending().await;
            }
        }
    }
}
