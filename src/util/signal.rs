//! Single-slot coalescing signal.
//!
//! A [`Signal`] is a cloneable sender backed by a bounded channel of
//! capacity 1. Notifying never blocks: if a token is already waiting in the
//! slot, further notifications are dropped until the receiver takes it. Any
//! number of notifications between two receives therefore collapse into one.

use tokio::sync::mpsc::{self, error::TrySendError};

/// Sending half of a coalescing signal.
#[derive(Debug, Clone)]
pub struct Signal {
    tx: mpsc::Sender<()>,
}

/// Receiving half of a coalescing signal.
#[derive(Debug)]
pub struct SignalReceiver {
    rx: mpsc::Receiver<()>,
}

impl Signal {
    /// Create a connected signal pair.
    pub fn channel() -> (Self, SignalReceiver) {
        let (tx, rx) = mpsc::channel(1);
        (Self { tx }, SignalReceiver { rx })
    }

    /// Deposit a token if the slot is empty.
    ///
    /// Returns `true` when a token was deposited, `false` when one was
    /// already pending or the receiver is gone.
    pub fn notify(&self) -> bool {
        match self.tx.try_send(()) {
            Ok(()) => true,
            Err(TrySendError::Full(())) => false,
            Err(TrySendError::Closed(())) => {
                tracing::trace!("signal receiver dropped, notification discarded");
                false
            }
        }
    }

    /// Whether the receiving half has been dropped.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

impl SignalReceiver {
    /// Wait for the next token. Returns `None` once every sender is dropped
    /// and no token is pending.
    pub async fn recv(&mut self) -> Option<()> {
        self.rx.recv().await
    }

    /// Take a pending token without waiting.
    pub fn try_recv(&mut self) -> bool {
        self.rx.try_recv().is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notifications_coalesce() {
        let (signal, mut rx) = Signal::channel();
        assert!(signal.notify());
        assert!(!signal.notify());
        assert!(!signal.clone().notify());

        assert!(rx.try_recv());
        assert!(!rx.try_recv());
    }

    #[test]
    fn test_slot_reopens_after_receive() {
        let (signal, mut rx) = Signal::channel();
        assert!(signal.notify());
        assert!(rx.try_recv());
        assert!(signal.notify());
        assert!(rx.try_recv());
    }

    #[test]
    fn test_closed_receiver_is_not_an_error() {
        let (signal, rx) = Signal::channel();
        drop(rx);
        assert!(signal.is_closed());
        assert!(!signal.notify());
    }

    #[tokio::test]
    async fn test_recv_ends_when_senders_drop() {
        let (signal, mut rx) = Signal::channel();
        signal.notify();
        drop(signal);
        assert_eq!(rx.recv().await, Some(()));
        assert_eq!(rx.recv().await, None);
    }
}
