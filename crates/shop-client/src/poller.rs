//! # Payment Polling
//!
//! After a PIX code is shown, the client asks the server for the payment
//! status until it settles or the attempt budget runs out.
//!
//! ```text
//!  Idle ──start──▶ Awaiting{1} ──pending──▶ Awaiting{2} ─ … ─▶ TimedOut
//!                     │                          │
//!                     ├─approved─▶ Approved      ├─ …
//!                     ├─rejected─▶ Rejected
//!                     └─error────▶ Failed
//!  any non-terminal ──cancel/drop──▶ Cancelled
//! ```
//!
//! The first check runs immediately; every pending result waits one
//! interval. The task lives exactly as long as its `PollHandle`.

use crate::error::ClientResult;
use crate::notify::{Notification, SharedNotifier};
use async_trait::async_trait;
use shop_core::PaymentStatus;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Something that can report the status of the pending payment
#[async_trait]
pub trait PaymentStatusSource: Send + Sync {
    async fn check_payment_status(&self) -> ClientResult<PaymentStatus>;
}

/// Attempt budget and spacing for status checks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    pub max_attempts: u32,
    pub interval: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            max_attempts: 30,
            interval: Duration::from_millis(2000),
        }
    }
}

/// Observable poll state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollState {
    Idle,
    /// Check number `attempt` is in flight or scheduled
    Awaiting { attempt: u32 },
    Approved,
    Rejected,
    /// Attempt budget exhausted while still pending
    TimedOut,
    Cancelled,
    /// A status check failed
    Failed(String),
}

impl PollState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, PollState::Idle | PollState::Awaiting { .. })
    }
}

/// Starts payment status polls
#[derive(Clone)]
pub struct PaymentPoller {
    source: Arc<dyn PaymentStatusSource>,
    notifier: SharedNotifier,
    config: PollConfig,
}

impl PaymentPoller {
    pub fn new(
        source: Arc<dyn PaymentStatusSource>,
        notifier: SharedNotifier,
        config: PollConfig,
    ) -> Self {
        Self {
            source,
            notifier,
            config,
        }
    }

    /// Spawn the poll task. Must be called inside a tokio runtime.
    pub fn start(&self) -> PollHandle {
        let (state_tx, state_rx) = watch::channel(PollState::Idle);
        let (cancel_tx, cancel_rx) = oneshot::channel();

        let task = tokio::spawn(run(
            self.source.clone(),
            self.notifier.clone(),
            self.config,
            state_tx,
            cancel_rx,
        ));

        PollHandle {
            state: state_rx,
            cancel: Some(cancel_tx),
            task: Some(task),
        }
    }
}

async fn run(
    source: Arc<dyn PaymentStatusSource>,
    notifier: SharedNotifier,
    config: PollConfig,
    state: watch::Sender<PollState>,
    mut cancel: oneshot::Receiver<()>,
) {
    let mut attempt = 0;

    let outcome = loop {
        attempt += 1;
        state.send_replace(PollState::Awaiting { attempt });

        // A dropped sender counts as a cancel too
        let result = tokio::select! {
            _ = &mut cancel => break PollState::Cancelled,
            result = source.check_payment_status() => result,
        };

        match result {
            Ok(PaymentStatus::Approved) => {
                notifier.notify(Notification::success(
                    "Payment confirmed",
                    "Your PIX payment was approved.",
                ));
                break PollState::Approved;
            }
            Ok(PaymentStatus::Rejected) => break PollState::Rejected,
            Ok(PaymentStatus::Pending) if attempt >= config.max_attempts => {
                break PollState::TimedOut
            }
            Ok(PaymentStatus::Pending) => {
                debug!(attempt, "Payment pending, checking again in {:?}", config.interval);
                tokio::select! {
                    _ = &mut cancel => break PollState::Cancelled,
                    _ = tokio::time::sleep(config.interval) => {}
                }
            }
            Err(err) => {
                notifier.notify(Notification::error(
                    "Payment error",
                    format!("Failed to check payment status: {}", err.user_message()),
                ));
                break PollState::Failed(err.to_string());
            }
        }
    };

    info!(attempts = attempt, state = ?outcome, "Payment poll finished");
    state.send_replace(outcome);
}

/// Handle to a running poll. Dropping it cancels the poll.
pub struct PollHandle {
    state: watch::Receiver<PollState>,
    cancel: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl PollHandle {
    /// Subscribe to state changes
    pub fn state(&self) -> watch::Receiver<PollState> {
        self.state.clone()
    }

    /// Latest state
    pub fn current(&self) -> PollState {
        self.state.borrow().clone()
    }

    /// Stop polling. No effect once the poll has finished.
    pub fn cancel(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            let _ = cancel.send(());
        }
    }

    /// Wait for the poll to reach a terminal state
    pub async fn wait(mut self) -> PollState {
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
        self.state.borrow().clone()
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClientError;
    use crate::notify::{ChannelNotifier, NotificationKind};
    use std::sync::atomic::{AtomicU32, Ordering};
    use tokio::time::Instant;

    /// Reports `pending` for the first `pending` checks, then `then`
    struct Scripted {
        pending: u32,
        then: ClientResult<PaymentStatus>,
        calls: AtomicU32,
    }

    impl Scripted {
        fn new(pending: u32, then: ClientResult<PaymentStatus>) -> Arc<Self> {
            Arc::new(Self {
                pending,
                then,
                calls: AtomicU32::new(0),
            })
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl PaymentStatusSource for Scripted {
        async fn check_payment_status(&self) -> ClientResult<PaymentStatus> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if call <= self.pending {
                Ok(PaymentStatus::Pending)
            } else {
                self.then.clone()
            }
        }
    }

    fn poller(source: Arc<Scripted>) -> (PaymentPoller, tokio::sync::mpsc::UnboundedReceiver<Notification>) {
        let (notifier, rx) = ChannelNotifier::new();
        let poller = PaymentPoller::new(source, Arc::new(notifier), PollConfig::default());
        (poller, rx)
    }

    #[tokio::test(start_paused = true)]
    async fn test_approved_after_five_pending() {
        let source = Scripted::new(5, Ok(PaymentStatus::Approved));
        let (poller, mut rx) = poller(source.clone());
        let interval = PollConfig::default().interval;

        let started = Instant::now();
        let state = poller.start().wait().await;

        assert_eq!(state, PollState::Approved);
        assert_eq!(source.calls(), 6);
        assert!(started.elapsed() <= interval * 6);

        let notification = rx.try_recv().unwrap();
        assert_eq!(notification.kind, NotificationKind::Success);
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_check_is_immediate() {
        let source = Scripted::new(0, Ok(PaymentStatus::Approved));
        let (poller, _rx) = poller(source.clone());

        let started = Instant::now();
        assert_eq!(poller.start().wait().await, PollState::Approved);
        assert_eq!(started.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_times_out_after_max_attempts() {
        let source = Scripted::new(u32::MAX, Ok(PaymentStatus::Pending));
        let (poller, mut rx) = poller(source.clone());

        assert_eq!(poller.start().wait().await, PollState::TimedOut);
        assert_eq!(source.calls(), 30);
        // Silent stop
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_rejected_stops() {
        let source = Scripted::new(2, Ok(PaymentStatus::Rejected));
        let (poller, _rx) = poller(source.clone());

        assert_eq!(poller.start().wait().await, PollState::Rejected);
        assert_eq!(source.calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_error_stops_and_notifies() {
        let source = Scripted::new(1, Err(ClientError::Network("refused".into())));
        let (poller, mut rx) = poller(source.clone());

        let state = poller.start().wait().await;
        assert!(matches!(state, PollState::Failed(_)));
        assert_eq!(source.calls(), 2);
        assert_eq!(rx.try_recv().unwrap().kind, NotificationKind::Error);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_stops_polling() {
        let source = Scripted::new(u32::MAX, Ok(PaymentStatus::Pending));
        let (poller, _rx) = poller(source.clone());

        let mut handle = poller.start();
        let mut state = handle.state();
        state
            .wait_for(|s| *s == PollState::Awaiting { attempt: 2 })
            .await
            .unwrap();

        handle.cancel();
        assert_eq!(handle.wait().await, PollState::Cancelled);
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels() {
        let source = Scripted::new(u32::MAX, Ok(PaymentStatus::Pending));
        let (poller, _rx) = poller(source.clone());

        let handle = poller.start();
        let mut state = handle.state();
        drop(handle);

        state.wait_for(|s| s.is_terminal()).await.unwrap();
        assert_eq!(*state.borrow(), PollState::Cancelled);

        tokio::time::sleep(PollConfig::default().interval * 5).await;
        assert!(source.calls() <= 1);
    }
}
