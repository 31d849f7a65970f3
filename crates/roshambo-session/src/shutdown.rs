//! Process-wide shutdown signal
//!
//! A single cancellation object passed to every long-lived task. Tasks
//! observe it in the same `select!` they use for all other blocking
//! waits; cancellation is level-triggered and irreversible.

use tokio::sync::watch;

/// The triggering side of the shutdown signal.
///
/// Dropping the `Shutdown` also cancels every derived signal.
#[derive(Debug)]
pub struct Shutdown {
    tx: watch::Sender<bool>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Shutdown { tx }
    }

    /// Derive an observer for a task.
    pub fn signal(&self) -> ShutdownSignal {
        ShutdownSignal {
            rx: self.tx.subscribe(),
        }
    }

    /// Fire the signal. Idempotent.
    pub fn trigger(&self) {
        let _ = self.tx.send(true);
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Shutdown::new()
    }
}

/// The observing side of the shutdown signal.
#[derive(Clone, Debug)]
pub struct ShutdownSignal {
    rx: watch::Receiver<bool>,
}

impl ShutdownSignal {
    /// Resolves once the signal has fired (or the trigger side is
    /// gone). Cancel-safe: may be raced in a `select!`.
    pub async fn cancelled(&mut self) {
        while !*self.rx.borrow_and_update() {
            if self.rx.changed().await.is_err() {
                return;
            }
        }
    }

    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_trigger_wakes_signal() {
        let shutdown = Shutdown::new();
        let mut signal = shutdown.signal();
        assert!(!signal.is_cancelled());

        shutdown.trigger();
        signal.cancelled().await;
        assert!(signal.is_cancelled());
    }

    #[tokio::test]
    async fn test_drop_cancels_signal() {
        let shutdown = Shutdown::new();
        let mut signal = shutdown.signal();
        drop(shutdown);
        signal.cancelled().await;
    }

    #[tokio::test]
    async fn test_signal_derived_after_trigger() {
        let shutdown = Shutdown::new();
        shutdown.trigger();
        let mut signal = shutdown.signal();
        signal.cancelled().await;
        assert!(signal.is_cancelled());
    }
}
