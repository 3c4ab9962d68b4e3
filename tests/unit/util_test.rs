//! Tests for utility functions

use cicd_scheduler::util::{now_ms, Signal};

#[test]
fn test_now_ms_is_monotonic_enough() {
    let first = now_ms();
    let second = now_ms();
    assert!(first > 0);
    assert!(second >= first);
}

#[tokio::test]
async fn test_signal_wakes_waiting_receiver() {
    let (signal, mut rx) = Signal::channel();
    let waiter = tokio::spawn(async move { rx.recv().await });

    tokio::task::yield_now().await;
    assert!(signal.notify());
    assert_eq!(waiter.await.unwrap(), Some(()));
}

#[tokio::test]
async fn test_signal_reports_dropped_receiver() {
    let (signal, rx) = Signal::channel();
    drop(rx);
    assert!(signal.is_closed());
    assert!(!signal.notify());
}

#[test]
fn test_init_tracing_is_idempotent() {
    cicd_scheduler::util::init_tracing();
    cicd_scheduler::util::init_tracing();
    tracing::info!("tracing initialized twice");
}
